//! Backend abstractions for the console.
//!
//! Two repositories cover the REST surface:
//!
//! ```text
//! LambdaRepository
//! ├── GET  /clients/{clientId}/lambdas
//! ├── GET  /clients/{clientId}/lambdas/{id}
//! ├── PUT  /clients/{clientId}/lambdas/{id}
//! └── GET  /clients/{clientId}/lambdas/{id}/logs
//! BatchRepository
//! ├── GET  /s3/list-folders-images
//! ├── POST /s3/download-images-batch/{batchId}  (then GET downloadUrl)
//! └── GET  /s3/preview-images-batch/{batchId}
//! ```
//!
//! `HttpBackend` calls the real API; `MemoryBackend` serves an in-process
//! dataset for development and tests.

pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    ConfigMap, Config, DownloadRequest, DownloadTicket, ImageBatch, LambdaConfig, LogEntry,
    UpdateOutcome,
};
use crate::utils::http::create_async_client;

// Re-export for convenience
pub use http::HttpBackend;
pub use memory::MemoryBackend;

/// Lambda configuration and logs.
#[async_trait]
pub trait LambdaRepository: Send + Sync {
    /// List the client's lambdas (summaries).
    async fn list_lambdas(&self) -> Result<Vec<LambdaConfig>>;

    /// Fetch one lambda with its full configuration.
    async fn get_lambda(&self, id: &str) -> Result<LambdaConfig>;

    /// Replace a lambda's configuration wholesale.
    async fn update_lambda(&self, id: &str, config: &ConfigMap) -> Result<UpdateOutcome>;

    /// Fetch a lambda's execution log.
    async fn lambda_logs(&self, id: &str) -> Result<Vec<LogEntry>>;
}

/// Image batches in object storage.
#[async_trait]
pub trait BatchRepository: Send + Sync {
    /// List available image batches.
    async fn list_batches(&self) -> Result<Vec<ImageBatch>>;

    /// Ask the backend to prepare an archive of a batch.
    async fn request_download(
        &self,
        batch_id: &str,
        request: &DownloadRequest,
    ) -> Result<DownloadTicket>;

    /// Fetch the archive a ticket points to.
    async fn fetch_archive(&self, ticket: &DownloadTicket) -> Result<Vec<u8>>;

    /// Thumbnail URLs for a batch.
    async fn preview_batch(&self, batch_id: &str) -> Result<Vec<String>>;
}

/// Everything the console needs from a backend.
pub trait ConsoleBackend: LambdaRepository + BatchRepository {}

impl<T: LambdaRepository + BatchRepository> ConsoleBackend for T {}

/// Build the backend selected by the configuration.
pub fn from_config(config: &Config) -> Result<Arc<dyn ConsoleBackend>> {
    match (&config.api.base_url, config.use_mock()) {
        (Some(base_url), false) => {
            log::info!("Using HTTP backend at {}", base_url);
            let client = create_async_client(&config.api)?;
            let backend = HttpBackend::new(
                client,
                base_url,
                &config.api.client_id,
                config.storage.batch_id_strategy,
            )?;
            Ok(Arc::new(backend))
        }
        _ => {
            log::info!("Using in-memory mock backend");
            Ok(Arc::new(MemoryBackend::seeded()))
        }
    }
}

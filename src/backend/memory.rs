//! In-memory backend.
//!
//! Serves a development dataset without any network access. Each instance
//! owns its data, so tests can build isolated backends and updates made
//! through one instance never leak into another.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::{
    ConfigMap, DownloadRequest, DownloadTicket, ImageBatch, LambdaConfig, LogEntry,
    UpdateOutcome,
};

use super::{BatchRepository, LambdaRepository};

/// Prefix of the download URLs handed out by the mock.
const TICKET_SCHEME: &str = "memory://archives/";

/// Smallest valid ZIP file: an end-of-central-directory record with no entries.
const EMPTY_ZIP: [u8; 22] = [
    0x50, 0x4b, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

#[derive(Debug, Default)]
struct Dataset {
    lambdas: Vec<LambdaConfig>,
    logs: HashMap<String, Vec<LogEntry>>,
    batches: Vec<ImageBatch>,
    previews: HashMap<String, Vec<String>>,
}

/// Backend over an in-process dataset.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<Dataset>,
}

impl MemoryBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend with the development dataset.
    pub fn seeded() -> Self {
        Self::new()
            .with_lambdas(seed::lambdas())
            .with_logs(seed::logs())
            .with_batches(seed::batches())
            .with_previews(seed::previews())
    }

    pub fn with_lambdas(self, lambdas: Vec<LambdaConfig>) -> Self {
        self.edit(|data| data.lambdas = lambdas)
    }

    pub fn with_logs(self, logs: HashMap<String, Vec<LogEntry>>) -> Self {
        self.edit(|data| data.logs = logs)
    }

    pub fn with_batches(self, batches: Vec<ImageBatch>) -> Self {
        self.edit(|data| data.batches = batches)
    }

    pub fn with_previews(self, previews: HashMap<String, Vec<String>>) -> Self {
        self.edit(|data| data.previews = previews)
    }

    fn edit(mut self, f: impl FnOnce(&mut Dataset)) -> Self {
        f(self.data.get_mut());
        self
    }

    async fn find_batch(&self, batch_id: &str) -> Result<ImageBatch> {
        self.data
            .read()
            .await
            .batches
            .iter()
            .find(|b| b.batch_id == batch_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("batch", batch_id))
    }
}

#[async_trait]
impl LambdaRepository for MemoryBackend {
    async fn list_lambdas(&self) -> Result<Vec<LambdaConfig>> {
        Ok(self.data.read().await.lambdas.clone())
    }

    async fn get_lambda(&self, id: &str) -> Result<LambdaConfig> {
        self.data
            .read()
            .await
            .lambdas
            .iter()
            .find(|l| l.lambda_name == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("lambda", id))
    }

    async fn update_lambda(&self, id: &str, config: &ConfigMap) -> Result<UpdateOutcome> {
        let mut data = self.data.write().await;
        let lambda = data
            .lambdas
            .iter_mut()
            .find(|l| l.lambda_name == id)
            .ok_or_else(|| AppError::not_found("lambda", id))?;
        lambda.config = config.clone();
        log::debug!("Mock update of {} ({} keys)", id, config.len());
        Ok(UpdateOutcome::Updated(lambda.clone()))
    }

    async fn lambda_logs(&self, id: &str) -> Result<Vec<LogEntry>> {
        let data = self.data.read().await;
        if !data.lambdas.iter().any(|l| l.lambda_name == id) {
            return Err(AppError::not_found("lambda", id));
        }
        Ok(data.logs.get(id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl BatchRepository for MemoryBackend {
    async fn list_batches(&self) -> Result<Vec<ImageBatch>> {
        Ok(self.data.read().await.batches.clone())
    }

    async fn request_download(
        &self,
        batch_id: &str,
        request: &DownloadRequest,
    ) -> Result<DownloadTicket> {
        let batch = self.find_batch(batch_id).await?;
        log::debug!(
            "Mock archive of {} from bucket {} as {}",
            batch.prefix,
            request.bucket,
            request.zip_name
        );
        Ok(DownloadTicket {
            download_url: format!("{TICKET_SCHEME}{batch_id}"),
        })
    }

    async fn fetch_archive(&self, ticket: &DownloadTicket) -> Result<Vec<u8>> {
        let batch_id = ticket
            .download_url
            .strip_prefix(TICKET_SCHEME)
            .ok_or_else(|| AppError::not_found("archive", &ticket.download_url))?;
        self.find_batch(batch_id).await?;
        Ok(EMPTY_ZIP.to_vec())
    }

    async fn preview_batch(&self, batch_id: &str) -> Result<Vec<String>> {
        let data = self.data.read().await;
        if !data.batches.iter().any(|b| b.batch_id == batch_id) {
            return Err(AppError::not_found("batch", batch_id));
        }
        Ok(data.previews.get(batch_id).cloned().unwrap_or_default())
    }
}

/// Development dataset.
mod seed {
    use std::collections::HashMap;

    use crate::models::{ImageBatch, LambdaConfig, LogEntry};

    pub fn lambdas() -> Vec<LambdaConfig> {
        vec![
            LambdaConfig {
                lambda_name: "emailing".to_string(),
                display_name: "Service Emailing".to_string(),
                description: "Envoi automatique d'emails clients.".to_string(),
                config: [
                    ("sender", "noreply@entreprise.com"),
                    ("dailyLimit", "500"),
                    ("enabled", "true"),
                ]
                .into_iter()
                .collect(),
                active: true,
            },
            LambdaConfig {
                lambda_name: "facturation".to_string(),
                display_name: "Service Facturation".to_string(),
                description: "Génération automatique des factures.".to_string(),
                config: [("tva", "20"), ("autoSend", "false")].into_iter().collect(),
                active: true,
            },
        ]
    }

    pub fn logs() -> HashMap<String, Vec<LogEntry>> {
        let entry = |timestamp: i64, message: &str| LogEntry {
            timestamp,
            message: message.to_string(),
        };
        HashMap::from([
            (
                "emailing".to_string(),
                vec![
                    entry(1_705_314_600_000, "START RequestId: 3f2a Version: $LATEST"),
                    entry(
                        1_705_314_600_120,
                        "2024-01-15T10:30:00.120Z 3f2a INFO 42 emails queued",
                    ),
                    entry(
                        1_705_314_601_870,
                        "2024-01-15T10:30:01.870Z 3f2a WARN daily limit at 90%",
                    ),
                    entry(1_705_314_602_000, "END RequestId: 3f2a"),
                ],
            ),
            (
                "facturation".to_string(),
                vec![entry(
                    1_707_574_800_000,
                    "2024-02-10T14:20:00.000Z 9b7e ERROR invoice template not found",
                )],
            ),
        ])
    }

    pub fn batches() -> Vec<ImageBatch> {
        [
            ("batch-001", "annonces-2024-01", 45, "2024-01-15T10:30:00Z"),
            ("batch-002", "annonces-2024-02", 52, "2024-02-10T14:20:00Z"),
            ("batch-003", "annonces-2024-03", 38, "2024-03-05T09:15:00Z"),
        ]
        .into_iter()
        .map(|(id, prefix, count, modified)| ImageBatch {
            batch_id: id.to_string(),
            prefix: prefix.to_string(),
            count,
            last_modified: Some(modified.to_string()),
        })
        .collect()
    }

    pub fn previews() -> HashMap<String, Vec<String>> {
        (1..=3)
            .map(|n| {
                let urls: Vec<String> = (1..=4)
                    .map(|i| format!("https://picsum.photos/200?random={}", (n - 1) * 4 + i))
                    .collect();
                (format!("batch-00{n}"), urls)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_dataset() {
        let backend = MemoryBackend::seeded();
        let lambdas = backend.list_lambdas().await.unwrap();
        assert_eq!(lambdas.len(), 2);
        assert_eq!(lambdas[0].config.get("dailyLimit"), Some("500"));
        assert_eq!(backend.list_batches().await.unwrap().len(), 3);
        assert_eq!(
            backend.preview_batch("batch-002").await.unwrap()[0],
            "https://picsum.photos/200?random=5"
        );
    }

    #[tokio::test]
    async fn update_replaces_config_wholesale() {
        let backend = MemoryBackend::seeded();
        let config: ConfigMap = [("tva", "5.5")].into_iter().collect();
        let outcome = backend.update_lambda("facturation", &config).await.unwrap();

        let UpdateOutcome::Updated(updated) = outcome else {
            panic!("expected updated lambda");
        };
        assert_eq!(updated.config, config);
        assert!(!updated.config.contains_key("autoSend"));
        assert_eq!(
            backend.get_lambda("facturation").await.unwrap().config,
            config
        );
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let backend = MemoryBackend::seeded();
        assert!(matches!(
            backend.get_lambda("reporting").await,
            Err(AppError::NotFound { kind: "lambda", .. })
        ));
        assert!(matches!(
            backend.update_lambda("reporting", &ConfigMap::new()).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            backend.lambda_logs("reporting").await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            backend.preview_batch("batch-999").await,
            Err(AppError::NotFound { kind: "batch", .. })
        ));
    }

    #[tokio::test]
    async fn instances_do_not_share_state() {
        let first = MemoryBackend::seeded();
        let second = MemoryBackend::seeded();
        first
            .update_lambda("emailing", &ConfigMap::new())
            .await
            .unwrap();

        assert!(first.get_lambda("emailing").await.unwrap().config.is_empty());
        assert_eq!(
            second.get_lambda("emailing").await.unwrap().config.len(),
            3
        );
    }

    #[tokio::test]
    async fn download_roundtrip_yields_zip() {
        let backend = MemoryBackend::seeded();
        let batch = backend.list_batches().await.unwrap().remove(0);
        let request = DownloadRequest::for_batch("annonces-images", &batch);
        let ticket = backend
            .request_download(&batch.batch_id, &request)
            .await
            .unwrap();
        let bytes = backend.fetch_archive(&ticket).await.unwrap();
        assert!(bytes.starts_with(b"PK\x05\x06"));
    }

    #[tokio::test]
    async fn empty_backend() {
        let backend = MemoryBackend::new();
        assert!(backend.list_lambdas().await.unwrap().is_empty());
        assert!(backend.list_batches().await.unwrap().is_empty());
    }
}

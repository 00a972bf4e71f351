//! REST API backend.
//!
//! Every JSON answer goes through [`codec::decode`](crate::codec::decode), so
//! gateway-wrapped responses are accepted on all endpoints. Any non-2xx
//! status is a failure regardless of body.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::codec::{self, listing};
use crate::error::Result;
use crate::models::{
    BatchIdStrategy, ConfigMap, DownloadRequest, DownloadTicket, ImageBatch, LambdaConfig,
    LogEntry, UpdateOutcome, UpdateRequest,
};
use crate::utils::{endpoint, http};

use super::{BatchRepository, LambdaRepository};

/// Backend calling the console REST API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    client_id: String,
    strategy: BatchIdStrategy,
}

impl HttpBackend {
    pub fn new(
        client: Client,
        base_url: &str,
        client_id: impl Into<String>,
        strategy: BatchIdStrategy,
    ) -> Result<Self> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            client_id: client_id.into(),
            strategy,
        })
    }

    /// URL of a lambda-scoped endpoint.
    pub fn lambdas_url(&self, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["clients", self.client_id.as_str(), "lambdas"];
        segments.extend_from_slice(rest);
        endpoint(&self.base_url, &segments)
    }

    /// URL of an object-storage endpoint.
    pub fn s3_url(&self, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["s3"];
        segments.extend_from_slice(rest);
        endpoint(&self.base_url, &segments)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        codec::decode(http::read_json(response).await?)
    }
}

#[async_trait]
impl LambdaRepository for HttpBackend {
    async fn list_lambdas(&self) -> Result<Vec<LambdaConfig>> {
        let lambdas: Vec<LambdaConfig> = self.get_json(self.lambdas_url(&[])?).await?;
        log::info!("Fetched {} lambdas", lambdas.len());
        Ok(lambdas)
    }

    async fn get_lambda(&self, id: &str) -> Result<LambdaConfig> {
        self.get_json(self.lambdas_url(&[id])?).await
    }

    async fn update_lambda(&self, id: &str, config: &ConfigMap) -> Result<UpdateOutcome> {
        let url = self.lambdas_url(&[id])?;
        log::info!("PUT {} ({} keys)", url, config.len());
        let response = self
            .client
            .put(url)
            .json(&UpdateRequest { config })
            .send()
            .await?;
        codec::decode(http::read_json(response).await?)
    }

    async fn lambda_logs(&self, id: &str) -> Result<Vec<LogEntry>> {
        self.get_json(self.lambdas_url(&[id, "logs"])?).await
    }
}

#[async_trait]
impl BatchRepository for HttpBackend {
    async fn list_batches(&self) -> Result<Vec<ImageBatch>> {
        let url = self.s3_url(&["list-folders-images"])?;
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let payload = codec::unwrap_response(http::read_json(response).await?)?;
        Ok(listing::to_batches(payload, self.strategy))
    }

    async fn request_download(
        &self,
        batch_id: &str,
        request: &DownloadRequest,
    ) -> Result<DownloadTicket> {
        let url = self.s3_url(&["download-images-batch", batch_id])?;
        log::info!("POST {} (prefix {})", url, request.prefix);
        let response = self.client.post(url).json(request).send().await?;
        codec::decode(http::read_json(response).await?)
    }

    async fn fetch_archive(&self, ticket: &DownloadTicket) -> Result<Vec<u8>> {
        let url = Url::parse(&ticket.download_url)?;
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        http::read_bytes(response).await
    }

    async fn preview_batch(&self, batch_id: &str) -> Result<Vec<String>> {
        self.get_json(self.s3_url(&["preview-images-batch", batch_id])?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(
            Client::new(),
            base,
            "clientA",
            BatchIdStrategy::LastSegment,
        )
        .unwrap()
    }

    #[test]
    fn builds_lambda_urls() {
        let backend = backend("https://api.example.com/prod");
        assert_eq!(
            backend.lambdas_url(&[]).unwrap().as_str(),
            "https://api.example.com/prod/clients/clientA/lambdas"
        );
        assert_eq!(
            backend.lambdas_url(&["emailing", "logs"]).unwrap().as_str(),
            "https://api.example.com/prod/clients/clientA/lambdas/emailing/logs"
        );
    }

    #[test]
    fn builds_s3_urls() {
        let backend = backend("http://localhost:4000/");
        assert_eq!(
            backend
                .s3_url(&["download-images-batch", "batch-001"])
                .unwrap()
                .as_str(),
            "http://localhost:4000/s3/download-images-batch/batch-001"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(
            HttpBackend::new(Client::new(), "::", "clientA", BatchIdStrategy::LastSegment)
                .is_err()
        );
    }
}

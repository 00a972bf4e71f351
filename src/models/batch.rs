// src/models/batch.rs

//! Image batch records from the object store.

use serde::{Deserialize, Serialize};

/// A group of images sharing a storage-path prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBatch {
    /// Identifier derived from the prefix
    pub batch_id: String,

    /// Storage path of the batch
    pub prefix: String,

    /// Number of images (0 when unknown at listing time)
    pub count: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl ImageBatch {
    /// Archive file name for this batch.
    pub fn zip_name(&self) -> String {
        format!("{}.zip", self.batch_id)
    }
}

/// Body of a batch download request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub bucket: String,
    pub prefix: String,
    pub zip_name: String,
}

impl DownloadRequest {
    pub fn for_batch(bucket: impl Into<String>, batch: &ImageBatch) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: batch.prefix.clone(),
            zip_name: batch.zip_name(),
        }
    }
}

/// Signed location of a prepared archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadTicket {
    pub download_url: String,
}

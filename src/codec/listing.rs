//! Folder listing to image batch conversion.
//!
//! The listing endpoint answers either with ready-made batch records or with
//! a bare `{ "folders": [...] }` path listing. Both are normalized into
//! `Vec<ImageBatch>`; any other shape yields no batches.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::{BatchIdStrategy, ImageBatch};

/// A listing payload, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Batches(Vec<ImageBatch>),
    Folders(Vec<String>),
    Unrecognized(Value),
}

impl Listing {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(_) => match Vec::<ImageBatch>::deserialize(&value) {
                Ok(batches) => Listing::Batches(batches),
                Err(_) => Listing::Unrecognized(value),
            },
            Value::Object(map) => match map.get("folders").and_then(string_array) {
                Some(folders) => Listing::Folders(folders),
                None => Listing::Unrecognized(Value::Object(map)),
            },
            other => Listing::Unrecognized(other),
        }
    }

    pub fn into_batches(self, strategy: BatchIdStrategy) -> Vec<ImageBatch> {
        match self {
            Listing::Batches(batches) => batches,
            Listing::Folders(folders) => folders
                .into_iter()
                .enumerate()
                .map(|(i, folder)| ImageBatch {
                    batch_id: batch_id(&folder, i, strategy),
                    prefix: folder,
                    count: 0,
                    last_modified: None,
                })
                .collect(),
            Listing::Unrecognized(value) => {
                log::warn!("Unrecognized batch listing shape, showing no batches: {value}");
                Vec::new()
            }
        }
    }
}

fn string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Convert a listing payload into batches.
pub fn to_batches(value: Value, strategy: BatchIdStrategy) -> Vec<ImageBatch> {
    Listing::classify(value).into_batches(strategy)
}

/// Last non-empty `/`-separated segment of a path.
pub fn last_segment(path: &str) -> Option<&str> {
    path.split('/').filter(|s| !s.is_empty()).next_back()
}

/// Derive the batch id for the folder at `index`.
pub fn batch_id(folder: &str, index: usize, strategy: BatchIdStrategy) -> String {
    match strategy {
        BatchIdStrategy::LastSegment => last_segment(folder)
            .map(str::to_string)
            .unwrap_or_else(|| format!("batch-{index}")),
        BatchIdStrategy::PrefixHash => {
            let digest = hex::encode(Sha256::digest(folder.as_bytes()));
            format!("{}-{}", last_segment(folder).unwrap_or("batch"), &digest[..8])
        }
    }
}

/// Batch ids that occur more than once, in first-seen order.
pub fn duplicate_ids(batches: &[ImageBatch]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for batch in batches {
        let count = seen.entry(batch.batch_id.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(batch.batch_id.clone());
        }
    }
    duplicates
}

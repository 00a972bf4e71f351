//! Service layer for the console.
//!
//! This module contains the operator workflows:
//! - Lambda listing, configuration edits and logs (`LambdaService`)
//! - Image batch listing, previews and downloads (`BatchService`)

mod batches;
mod lambdas;

pub use batches::{BatchService, DownloadedArchive};
pub use lambdas::{EditPolicy, LambdaService, apply_changes, parse_assignment};

// src/models/mod.rs

//! Domain models for the console.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod batch;
mod config;
mod lambda;
mod log_entry;
mod value;

// Re-export all public types
pub use batch::{DownloadRequest, DownloadTicket, ImageBatch};
pub use config::{ApiConfig, BatchIdStrategy, Config, StorageConfig};
pub use lambda::{ConfigMap, LambdaConfig, UpdateAck, UpdateOutcome, UpdateRequest};
pub use log_entry::{LogEntry, LogLevel};
pub use value::ValueKind;

//! Response normalization.
//!
//! - `envelope`: strip gateway `{statusCode, body}` wrappers
//! - `listing`: turn folder listings into image batches

pub mod envelope;
pub mod listing;

pub use envelope::{Payload, decode, unwrap_response};
pub use listing::{Listing, duplicate_ids, to_batches};

//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::error::{AppError, Result};

/// Append percent-encoded path segments to a base URL.
///
/// The base keeps its own path, so `https://host/prod` + `["clients", "a"]`
/// becomes `https://host/prod/clients/a`.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::config(format!("Base URL cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("https://api.example.com/prod").unwrap();
        assert_eq!(
            endpoint(&base, &["clients", "clientA", "lambdas"])
                .unwrap()
                .as_str(),
            "https://api.example.com/prod/clients/clientA/lambdas"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let base = Url::parse("https://api.example.com/prod/").unwrap();
        assert_eq!(
            endpoint(&base, &["s3", "list-folders-images"])
                .unwrap()
                .as_str(),
            "https://api.example.com/prod/s3/list-folders-images"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = Url::parse("http://localhost:3000").unwrap();
        assert_eq!(
            endpoint(&base, &["lambdas", "a b/c"]).unwrap().as_str(),
            "http://localhost:3000/lambdas/a%20b%2Fc"
        );
    }

    #[test]
    fn test_endpoint_rejects_opaque_base() {
        let base = Url::parse("mailto:ops@example.com").unwrap();
        assert!(endpoint(&base, &["x"]).is_err());
    }
}

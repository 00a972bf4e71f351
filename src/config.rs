// src/config.rs

//! Configuration loading utilities.
//!
//! Settings are layered: TOML file, then `CONSOLE_*` environment variables,
//! then command-line overrides. The result is validated before use.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub mock: bool,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api.base_url = Some(url.clone());
        }
        if self.mock {
            config.mock = true;
        }
    }
}

/// Load, layer and validate the configuration.
///
/// A missing file means defaults; an unreadable one is an error.
pub fn load(path: &Path, overrides: &Overrides) -> Result<Config> {
    load_with_env(path, overrides, |k| std::env::var(k).ok())
}

/// Same as [`load`] with an explicit environment lookup.
pub fn load_with_env<F>(path: &Path, overrides: &Overrides, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = if path.exists() {
        Config::load(path)?
    } else {
        log::debug!("No config file at {:?}, using defaults", path);
        Config::default()
    };

    config.apply_env(env)?;
    overrides.apply(&mut config);

    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config =
            load_with_env(&tmp.path().join("console.toml"), &Overrides::default(), no_env)
                .unwrap();
        assert!(config.use_mock());
    }

    #[test]
    fn layers_file_env_and_flags() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("console.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://file.example.com\"\nclient_id = \"fromFile\"\n",
        )
        .unwrap();

        let env = |k: &str| (k == "CONSOLE_CLIENT_ID").then(|| "fromEnv".to_string());
        let overrides = Overrides {
            api_url: Some("https://flag.example.com/dev".to_string()),
            mock: false,
        };
        let config = load_with_env(&path, &overrides, env).unwrap();

        assert_eq!(config.api.client_id, "fromEnv");
        assert_eq!(
            config.api.base_url.as_deref(),
            Some("https://flag.example.com/dev")
        );
        assert!(!config.use_mock());
    }

    #[test]
    fn broken_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("console.toml");
        std::fs::write(&path, "[api\n").unwrap();
        assert!(matches!(
            load_with_env(&path, &Overrides::default(), no_env),
            Err(AppError::Toml(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("console.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 0\n").unwrap();
        assert!(matches!(
            load_with_env(&path, &Overrides::default(), no_env),
            Err(AppError::Config(_))
        ));
    }
}

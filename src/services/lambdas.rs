//! Lambda configuration workflows.
//!
//! Edits are applied to a freshly fetched copy and the whole configuration
//! is sent back; the backend copy is overwritten wholesale.

use crate::backend::LambdaRepository;
use crate::error::{AppError, Result};
use crate::models::{
    ConfigMap, LambdaConfig, LogEntry, LogLevel, UpdateAck, UpdateOutcome, ValueKind,
};

/// Whether edits may introduce keys the lambda does not have yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPolicy {
    #[default]
    ExistingKeysOnly,
    AllowNewKeys,
}

/// Parse a `KEY=VALUE` assignment.
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| AppError::validation(format!("expected KEY=VALUE, got '{raw}'")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::validation(format!("empty key in '{raw}'")));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Apply edits to a configuration.
///
/// Values are checked against `kind` when given. Otherwise an existing value
/// keeps the kind inferred from its current text: a number stays a number
/// and a boolean stays `true`/`false`. The wire carries no type tags, so a
/// string that merely looks numeric needs an explicit `ValueKind::String`.
pub fn apply_changes(
    current: &ConfigMap,
    changes: &[(String, String)],
    policy: EditPolicy,
    kind: Option<ValueKind>,
) -> Result<ConfigMap> {
    let mut next = current.clone();
    for (key, value) in changes {
        if !current.contains_key(key) && policy == EditPolicy::ExistingKeysOnly {
            return Err(AppError::validation(format!(
                "unknown configuration key '{key}'"
            )));
        }
        if let Some(kind) = kind.or_else(|| current.kind_of(key)) {
            kind.check(key, value)?;
        }
        next.insert(key.clone(), value.clone());
    }
    Ok(next)
}

/// Operator actions on lambdas.
pub struct LambdaService<'a, R: LambdaRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: LambdaRepository + ?Sized> LambdaService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<LambdaConfig>> {
        self.repo.list_lambdas().await
    }

    pub async fn details(&self, id: &str) -> Result<LambdaConfig> {
        self.repo.get_lambda(id).await
    }

    /// Fetch, edit and save a lambda's configuration.
    pub async fn edit(
        &self,
        id: &str,
        changes: &[(String, String)],
        policy: EditPolicy,
        kind: Option<ValueKind>,
    ) -> Result<UpdateOutcome> {
        let lambda = self.repo.get_lambda(id).await?;
        let config = apply_changes(&lambda.config, changes, policy, kind)?;
        if config == lambda.config {
            log::info!("No configuration change for {}", id);
        }

        let outcome = self.repo.update_lambda(id, &config).await?;
        if let UpdateOutcome::Ack(UpdateAck {
            success: false,
            message,
        }) = &outcome
        {
            return Err(AppError::Rejected(
                message.clone().unwrap_or_else(|| "no message".to_string()),
            ));
        }
        log::info!("Saved {} configuration keys for {}", config.len(), id);
        Ok(outcome)
    }

    /// Log entries at or above `min_level`, oldest first.
    pub async fn logs(&self, id: &str, min_level: LogLevel) -> Result<Vec<LogEntry>> {
        let mut entries: Vec<LogEntry> = self
            .repo
            .lambda_logs(id)
            .await?
            .into_iter()
            .filter(|e| e.level() >= min_level)
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }
}

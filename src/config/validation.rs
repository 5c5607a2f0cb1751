//! Configuration validation
//!
//! Validates GitInsights configuration for correctness:
//! - API URL is an http(s) URL
//! - Timeout, commit window and concurrency cap are non-zero
//! - A token environment variable name is configured

use super::insights_config::InsightsConfig;
use crate::InsightsError;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a GitInsights configuration, collecting every violation
pub fn validate_config(config: &InsightsConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.api_url.is_empty() {
        errors.push(ValidationError::new("api_url", "API URL cannot be empty"));
    } else if !config.api_url.starts_with("http://") && !config.api_url.starts_with("https://") {
        errors.push(ValidationError::new(
            "api_url",
            format!("Invalid API URL: {}", config.api_url),
        ));
    }

    if config.token_env.trim().is_empty() {
        errors.push(ValidationError::new(
            "token_env",
            "Token environment variable name cannot be empty",
        ));
    }

    if config.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "timeout_secs",
            "Timeout must be greater than 0",
        ));
    }

    if config.recent_commit_window == 0 {
        errors.push(ValidationError::new(
            "recent_commit_window",
            "Commit window must be greater than 0",
        ));
    }

    if config.max_concurrent_requests == Some(0) {
        errors.push(ValidationError::new(
            "max_concurrent_requests",
            "Concurrency cap must be greater than 0 (omit it for no cap)",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate configuration and return a Result
pub fn validate_config_result(config: &InsightsConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        InsightsError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}

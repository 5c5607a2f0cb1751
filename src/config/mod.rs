//! Configuration system
//!
//! Loads ~/.config/gitinsights/config.yaml. Every field has a default, so a
//! missing file is only an error when a path was given explicitly.

mod insights_config;
pub mod validation;

pub use insights_config::{InsightsConfig, PrivateScope};
pub use validation::{validate_config, validate_config_result, ValidationError};

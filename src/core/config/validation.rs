#![allow(clippy::result_large_err)]

use super::ChoresConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::collections::HashSet;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &ChoresConfig) -> Result<(), AppError> {
        if config.blog.endpoint.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "blog.endpoint cannot be empty",
            ));
        }

        if url::Url::parse(&config.blog.endpoint).is_err() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!("blog.endpoint is not a valid URL: {}", config.blog.endpoint),
            ));
        }

        if config.blog.timeout_secs == 0 {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "blog.timeout_secs must be greater than zero",
            ));
        }

        for (name, base) in [
            ("drive.api_base", &config.drive.api_base),
            ("drive.upload_base", &config.drive.upload_base),
        ] {
            if url::Url::parse(base).is_err() {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    format!("{} is not a valid URL: {}", name, base),
                ));
            }
        }

        let mut seen = HashSet::new();
        for rule in &config.rewire.rules {
            if rule.deprecated.trim().is_empty() || rule.replacement.trim().is_empty() {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    "rewire.rules entries need both deprecated and replacement names",
                ));
            }
            if !seen.insert(rule.deprecated.as_str()) {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    format!("rewire.rules lists '{}' more than once", rule.deprecated),
                ));
            }
        }

        Ok(())
    }
}

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub mod defaults;

use defaults::*;

use crate::errors::{AppError, AppResult};

/// Name matching configuration
///
/// Vocabularies are matched case-insensitively against the end of a channel
/// name. Each strip applies once; see [`crate::matching::NameNormalizer`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchingConfig {
    /// Trailing quality markers removed during normalization
    #[serde(default = "default_quality_tokens")]
    pub quality_tokens: Vec<String>,

    /// Trailing region/timezone markers removed after quality markers
    #[serde(default = "default_region_tokens")]
    pub region_tokens: Vec<String>,

    /// Characters that may separate a trailing marker from the name
    #[serde(default = "default_separator_chars")]
    pub separator_chars: String,

    /// Regex recognising a leading country prefix; capture group 1 is the code
    #[serde(default = "default_country_prefix_pattern")]
    pub country_prefix_pattern: String,
}

/// Resolution workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowConfig {
    /// Number of channels between analysis progress notifications
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Emit an unassigned entry for every explicitly skipped channel on commit
    #[serde(default = "default_emit_skipped_assignments")]
    pub emit_skipped_assignments: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

fn default_quality_tokens() -> Vec<String> {
    DEFAULT_QUALITY_TOKENS.iter().map(|s| s.to_string()).collect()
}

fn default_region_tokens() -> Vec<String> {
    DEFAULT_REGION_TOKENS.iter().map(|s| s.to_string()).collect()
}

fn default_separator_chars() -> String {
    DEFAULT_SEPARATOR_CHARS.to_string()
}

fn default_country_prefix_pattern() -> String {
    DEFAULT_COUNTRY_PREFIX_PATTERN.to_string()
}

fn default_progress_interval() -> usize {
    DEFAULT_PROGRESS_INTERVAL
}

fn default_emit_skipped_assignments() -> bool {
    DEFAULT_EMIT_SKIPPED_ASSIGNMENTS
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            quality_tokens: default_quality_tokens(),
            region_tokens: default_region_tokens(),
            separator_chars: default_separator_chars(),
            country_prefix_pattern: default_country_prefix_pattern(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            progress_interval: default_progress_interval(),
            emit_skipped_assignments: default_emit_skipped_assignments(),
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.quality_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(AppError::configuration(
                "matching.quality_tokens must contain at least one token",
            ));
        }
        if self.region_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(AppError::configuration(
                "matching.region_tokens must contain at least one token",
            ));
        }
        if self.separator_chars.is_empty() {
            return Err(AppError::configuration(
                "matching.separator_chars must not be empty",
            ));
        }

        let prefix = Regex::new(&self.country_prefix_pattern)
            .map_err(|e| AppError::pattern(&self.country_prefix_pattern, e))?;
        if prefix.captures_len() < 2 {
            return Err(AppError::configuration(format!(
                "matching.country_prefix_pattern '{}' needs a capture group for the country code",
                self.country_prefix_pattern
            )));
        }
        Ok(())
    }
}

impl WorkflowConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.progress_interval == 0 {
            return Err(AppError::configuration(
                "workflow.progress_interval must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config = if Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)
                .with_context(|| format!("Failed to read config file {config_file}"))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {config_file}"))?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            default_config
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.matching.validate()?;
        self.workflow.validate()
    }
}

//! Configuration
//!
//! Every section deserializes with defaults for missing fields, so a config
//! file only needs the values it changes. `LEXICARD_*` environment variables
//! override file values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fsrs::{SchedulerParameters, DEFAULT_FAST_ANSWER_SECS};
use crate::progress::DEFAULT_MASTERY_THRESHOLD;

/// Configuration error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Value out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    /// Environment variable present but unparsable
    #[error("Invalid value '{value}' for {var}")]
    Env { var: String, value: String },
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed config file
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Widest fast-answer window accepted, in seconds
pub const MAX_FAST_ANSWER_SECS: f64 = 86_400.0;

/// Review session behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// A correct answer within this many seconds is graded Easy
    pub fast_answer_secs: f64,
    /// Consecutive lapses before an item is reported as a problem
    pub problem_item_threshold: u32,
    /// Due items returned by `upcoming`
    pub prefetch_due: usize,
    /// New items returned by `upcoming`
    pub prefetch_new: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fast_answer_secs: DEFAULT_FAST_ANSWER_SECS,
            problem_item_threshold: 2,
            prefetch_due: 3,
            prefetch_new: 2,
        }
    }
}

impl SessionConfig {
    pub fn fast_answer_threshold(&self) -> chrono::Duration {
        let secs = self.fast_answer_secs.clamp(0.0, MAX_FAST_ANSWER_SECS);
        chrono::Duration::milliseconds((secs * 1000.0).round() as i64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=MAX_FAST_ANSWER_SECS).contains(&self.fast_answer_secs) {
            return Err(ConfigError::Invalid(format!(
                "fast answer window must be between 0 and {} seconds, got {}",
                MAX_FAST_ANSWER_SECS, self.fast_answer_secs
            )));
        }
        if self.problem_item_threshold == 0 {
            return Err(ConfigError::Invalid("problem item threshold must be at least 1".into()));
        }
        Ok(())
    }
}

/// Dashboard reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressConfig {
    /// Difficulty below which a reviewed item counts as mastered
    pub mastery_threshold: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            mastery_threshold: DEFAULT_MASTERY_THRESHOLD,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LexicardConfig {
    pub scheduler: SchedulerParameters,
    pub session: SessionConfig,
    pub progress: ProgressConfig,
}

impl LexicardConfig {
    /// Read a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply `LEXICARD_*` overrides from `lookup`, then validate
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "LEXICARD_DESIRED_RETENTION")? {
            self.scheduler.desired_retention = v;
        }
        if let Some(v) = parse_var(&lookup, "LEXICARD_MAXIMUM_INTERVAL")? {
            self.scheduler.maximum_interval = v;
        }
        if let Some(v) = parse_var(&lookup, "LEXICARD_FAST_ANSWER_SECS")? {
            self.session.fast_answer_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "LEXICARD_PROBLEM_THRESHOLD")? {
            self.session.problem_item_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "LEXICARD_MASTERY_THRESHOLD")? {
            self.progress.mastery_threshold = v;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler.validate()?;
        self.session.validate()?;
        if !self.progress.mastery_threshold.is_finite() || self.progress.mastery_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "mastery threshold must be positive, got {}",
                self.progress.mastery_threshold
            )));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env {
                var: var.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

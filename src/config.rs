//! Analysis settings, optionally loaded from a YAML file.
//!
//! A settings file tunes rule selection, detector thresholds and the AI
//! scoring collaborator. Every field is optional; the zero-config default
//! enables all rules with the stock thresholds.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Settings file names searched in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["trucode.yaml", ".trucode.yaml"];

/// Top-level analysis settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Rule ids to switch off (e.g. `missing_docstring`).
    #[serde(default)]
    pub disabled_rules: Vec<String>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub ai: AiConfig,
}

impl Config {
    /// Parse settings from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Look for a settings file in the current directory.
    pub fn discover() -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    pub fn rule_enabled(&self, rule: &str) -> bool {
        !self.disabled_rules.iter().any(|r| r == rule)
    }
}

/// Numeric limits for the structural detectors.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Thresholds {
    /// Functions longer than this many lines are reported.
    #[serde(default = "default_max_function_lines")]
    pub max_function_lines: usize,
    /// Functions with more parameters than this are reported.
    #[serde(default = "default_max_function_args")]
    pub max_function_args: usize,
    /// Literals repeated more often than this are reported.
    #[serde(default = "default_max_literal_repeats")]
    pub max_literal_repeats: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_function_lines: default_max_function_lines(),
            max_function_args: default_max_function_args(),
            max_literal_repeats: default_max_literal_repeats(),
        }
    }
}

/// Settings for the optional AI scoring collaborator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// HTTP endpoint of the scoring service. AI scoring stays off when
    /// unset, regardless of `enabled`.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Lines of surrounding source sent along with each finding.
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            endpoint: None,
            timeout_ms: default_timeout_ms(),
            context_lines: default_context_lines(),
        }
    }
}

fn default_max_function_lines() -> usize {
    50
}

fn default_max_function_args() -> usize {
    5
}

fn default_max_literal_repeats() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_context_lines() -> usize {
    3
}

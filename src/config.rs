//! User configuration
//!
//! Defaults for required keys, goal fields and output live in a TOML file
//! under the platform config directory. Missing files and missing sections
//! fall back to [`Config::default`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ExportFormat;
use crate::resolver::MergeDetection;

/// Configuration for docqa, stored as TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub goals: GoalConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Labels are kept when they contain any of these substrings.
    /// An empty list keeps every label.
    pub required_keys: Vec<String>,
    pub merge_detection: MergeDetection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// Field labels whose values are scanned for goal codes.
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: ExportFormat,
    pub field_header: String,
    pub value_header: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            required_keys: ["课程代码", "课程名称", "学时", "学分", "课程目标 (Course Object)"]
                .map(String::from)
                .to_vec(),
            merge_detection: MergeDetection::default(),
        }
    }
}

impl Default for GoalConfig {
    fn default() -> Self {
        GoalConfig {
            keys: ["课程目标 (Course Object)", "*课程目标 (Course Object)"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: ExportFormat::Table,
            field_header: "Field".to_string(),
            value_header: "Value".to_string(),
        }
    }
}

impl Config {
    /// Load config from the user config directory, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Get the path to the default config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docqa").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [extraction]
            required_keys = ["Code"]

            [output]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.extraction.required_keys, vec!["Code"]);
        assert_eq!(config.extraction.merge_detection, MergeDetection::RepeatedText);
        assert_eq!(config.output.format, ExportFormat::Json);
        assert_eq!(config.output.field_header, "Field");
        assert_eq!(config.goals, GoalConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.extraction.merge_detection = MergeDetection::SpanMetadata;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "extraction = 3").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}

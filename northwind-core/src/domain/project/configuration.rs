// src/domain/project/configuration.rs

use crate::domain::quality::QualityConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/neo4j-contrib/northwind-neo4j/master/data";

/// On-disk format of the DQ log tables.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Parquet,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Parquet => "parquet",
            Self::Json => "json",
        })
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "parquet" => Ok(Self::Parquet),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown DQ log format '{}' (expected parquet|json)", other)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct DqConfig {
    #[serde(rename = "log-format", default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,

    #[serde(rename = "data-path", default = "default_data_path")]
    pub data_path: String,

    #[serde(rename = "use-products", default = "default_true")]
    pub use_products: bool,

    #[serde(rename = "auto-download", default = "default_true")]
    pub auto_download: bool,

    #[serde(rename = "source-url", default = "default_source_url")]
    pub source_url: String,

    #[serde(rename = "config-paths", default = "default_config_paths")]
    pub config_paths: Vec<String>,

    #[serde(default)]
    pub dq: DqConfig,

    /// Loaded from `<config-path>/quality.yml`, never from the main file.
    #[serde(skip)]
    pub quality: QualityConfig,
}

impl ProjectConfig {
    /// Directory layout of one project, resolved against its root.
    pub fn layout(&self, project_dir: &Path) -> DataLayout {
        DataLayout::new(project_dir.join(&self.data_path))
    }
}

/// `00-raw` / `01-clean` / `02-model` under the data path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw(&self) -> PathBuf {
        self.root.join("00-raw")
    }

    pub fn clean(&self) -> PathBuf {
        self.root.join("01-clean")
    }

    pub fn dq(&self) -> PathBuf {
        self.clean().join("_dq")
    }

    pub fn model(&self) -> PathBuf {
        self.root.join("02-model")
    }
}

fn default_data_path() -> String {
    "data".to_string()
}
fn default_true() -> bool {
    true
}
fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}
fn default_config_paths() -> Vec<String> {
    vec!["config".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_minimal_config_uses_defaults() -> Result<()> {
        let config: ProjectConfig = serde_yaml::from_str("name: northwind\nversion: 0.1.0\n")?;
        assert_eq!(config.data_path, "data");
        assert!(config.use_products);
        assert!(config.auto_download);
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.config_paths, vec!["config"]);
        assert_eq!(config.dq.log_format, LogFormat::Parquet);
        Ok(())
    }

    #[test]
    fn test_kebab_case_keys() -> Result<()> {
        let yaml = r#"
name: northwind
version: 0.2.0
data-path: warehouse
use-products: false
auto-download: false
dq:
  log-format: json
"#;
        let config: ProjectConfig = serde_yaml::from_str(yaml)?;
        assert_eq!(config.data_path, "warehouse");
        assert!(!config.use_products);
        assert!(!config.auto_download);
        assert_eq!(config.dq.log_format, LogFormat::Json);
        Ok(())
    }

    #[test]
    fn test_layout_paths() {
        let layout = DataLayout::new("/p/data");
        assert_eq!(layout.raw(), PathBuf::from("/p/data/00-raw"));
        assert_eq!(layout.dq(), PathBuf::from("/p/data/01-clean/_dq"));
        assert_eq!(layout.model(), PathBuf::from("/p/data/02-model"));
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("csv".parse::<LogFormat>().is_err());
    }
}

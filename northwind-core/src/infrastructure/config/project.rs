// northwind-core/src/infrastructure/config/project.rs

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::project::configuration::{LogFormat, ProjectConfig};
use crate::domain::quality::QualityConfig;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["northwind_project_conf.yaml", "northwind.yaml"];

pub const ENV_DATA_PATH: &str = "NORTHWIND_DATA_PATH";
pub const ENV_DQ_FORMAT: &str = "NORTHWIND_DQ_FORMAT";
pub const ENV_OFFLINE: &str = "NORTHWIND_OFFLINE";

// --- LOADER ---

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    load_project_config_with(project_dir, |key| std::env::var(key).ok())
}

/// Same as [`load_project_config`], reading overrides through `env`.
pub fn load_project_config_with<F>(
    project_dir: &Path,
    env: F,
) -> Result<ProjectConfig, InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    // 1. Main file
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project manifest");

    let mut config: ProjectConfig = load_fragment(&config_path)?;

    // 2. Satellites (config/quality.yml)
    if let Some(config_folder) = config.config_paths.first() {
        let config_dir = project_dir.join(config_folder);
        if config_dir.exists() {
            load_satellite_configs(&mut config, &config_dir)?;
        }
    }

    // 3. Environment (layering): NORTHWIND_DATA_PATH=/tmp/nw northwind run
    apply_env_overrides(&mut config, env)?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

/// Loads one typed YAML file.
fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {:?}", path))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML at {:?}", path))
        .map_err(Into::into)
}

fn load_satellite_configs(
    config: &mut ProjectConfig,
    config_dir: &Path,
) -> Result<(), InfrastructureError> {
    let qual_path = config_dir.join("quality.yml");
    if qual_path.exists() {
        // A broken quality file stops the run rather than silently dropping rules.
        let quality: QualityConfig = load_fragment(&qual_path)?;
        info!(
            rules = quality.rules.len(),
            enabled = quality.enabled,
            "Quality rules loaded"
        );
        config.quality = quality;
    }
    Ok(())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn apply_env_overrides<F>(config: &mut ProjectConfig, env: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = env(ENV_DATA_PATH) {
        info!(old = ?config.data_path, new = ?val, "Overriding data path via ENV");
        config.data_path = val;
    }
    if let Some(val) = env(ENV_DQ_FORMAT) {
        let format: LogFormat = val.parse().map_err(InfrastructureError::ConfigError)?;
        info!(new = ?format, "Overriding DQ log format via ENV");
        config.dq.log_format = format;
    }
    if env(ENV_OFFLINE).is_some_and(|v| is_truthy(&v)) {
        info!("Offline mode: raw source download disabled");
        config.auto_download = false;
    }
    Ok(())
}

use crate::apply::ConflictPolicy;
use crate::classifier::DEFAULT_EXTENSIONS;
use crate::discovery::TraversalMode;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extensions: Vec<String>,
    pub traversal: TraversalMode,
    pub skip_unreadable: bool,
    pub on_conflict: ConflictPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            traversal: TraversalMode::default(),
            skip_unreadable: false,
            on_conflict: ConflictPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("", "", "phototime")
        .context("failure locating the user configuration directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&app_paths()?.config_path)
}

/// A missing file yields the defaults; missing keys fall back individually.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failure reading config file {}", path.display()))?;
    let config = toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("failure parsing config file {}", path.display()))?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<PathBuf> {
    let paths = app_paths()?;
    save_config_to(config, &paths.config_path)?;
    Ok(paths.config_path)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failure creating config directory {}", dir.display()))?;
    }
    let body = toml::to_string_pretty(config).context("failure serializing config")?;
    fs::write(path, body)
        .with_context(|| format!("failure writing config file {}", path.display()))?;
    Ok(())
}

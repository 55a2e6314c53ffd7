use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::loader::DEFAULT_SAMPLE_IMAGES;
use crate::surface::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "anicap";
const APP_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_CAPTION_SAMPLES: [&str; 5] = [
    "Dreamy sakura blossoms",
    "Cyberpunk city night",
    "Cute neko with scarf",
    "Samurai at sunset",
    "Magical girl power",
];

/// Application settings from `config.json`; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sample_images: Option<Vec<String>>,
    #[serde(default)]
    pub caption_samples: Option<Vec<String>>,
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default)]
    pub surface_width: Option<i32>,
    #[serde(default)]
    pub surface_height: Option<i32>,
}

impl AppConfig {
    pub fn sample_images(&self) -> Vec<String> {
        non_empty_or(self.sample_images.as_deref(), &DEFAULT_SAMPLE_IMAGES)
    }

    pub fn caption_samples(&self) -> Vec<String> {
        non_empty_or(self.caption_samples.as_deref(), &DEFAULT_CAPTION_SAMPLES)
    }

    pub fn surface_size(&self) -> (i32, i32) {
        (
            self.surface_width
                .filter(|width| *width > 0)
                .unwrap_or(DEFAULT_SURFACE_WIDTH),
            self.surface_height
                .filter(|height| *height > 0)
                .unwrap_or(DEFAULT_SURFACE_HEIGHT),
        )
    }
}

fn non_empty_or(configured: Option<&[String]>, defaults: &[&str]) -> Vec<String> {
    let configured = configured
        .unwrap_or_default()
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    if configured.is_empty() {
        defaults.iter().map(|value| value.to_string()).collect()
    } else {
        configured
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

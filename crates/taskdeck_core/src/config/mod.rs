use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKDECK_CONFIG_PATH";
const APP_DIR_NAME: &str = "taskdeck";

/// Storage backend selected at composition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Local,
    Rest,
}

pub fn canonical_backend_name(raw: &str) -> Option<Backend> {
    match canonicalize_name(raw)?.as_str() {
        "local" | "file" | "json" => Some(Backend::Local),
        "rest" | "remote" | "api" | "http" => Some(Backend::Rest),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name) {
        Some(ref name) if name == "noir" => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        Some(ref name) if name == "solarized" => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            accent: "",
            muted: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonicalize_name(raw).unwrap_or_else(|| "default".to_string());

    match cleaned.as_str() {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// Lowercases and collapses separators; `None` when nothing is left.
fn canonicalize_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub auth_url: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

impl Config {
    pub fn backend(&self) -> Result<Backend, AppError> {
        match self.backend.as_deref() {
            None => Ok(Backend::default()),
            Some(raw) => canonical_backend_name(raw)
                .ok_or_else(|| AppError::invalid_input(format!("unknown backend '{raw}'"))),
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or(crate::storage::rest_store::DEFAULT_API_URL)
    }

    pub fn auth_url(&self) -> &str {
        self.auth_url.as_deref().unwrap_or(crate::auth::DEFAULT_AUTH_URL)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub backend: Option<String>,
    pub api_url: Option<String>,
    pub auth_url: Option<String>,
    pub theme: Option<String>,
}

/// Resolves an app file path: env override first, then the platform config
/// directory. Shared by the config, task-store and session files.
pub(crate) fn app_file_path(env_var: &str, file_name: &str) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(env_var)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME).join(file_name))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join(APP_DIR_NAME)
            .join(file_name))
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    app_file_path(CONFIG_ENV_VAR, CONFIG_FILE_NAME)
}

pub fn load_config() -> Result<Config, AppError> {
    let path = config_path()?;
    load_config_from_path(&path)
}

/// A broken config never blocks the session: defaults are returned alongside
/// the error so the caller can report it.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    Ok(normalize_config_theme(config))
}

fn normalize_config_theme(mut config: Config) -> Config {
    config.theme = config.theme.as_deref().and_then(canonical_theme_name);
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();

    if let Some(backend) = overrides.backend.as_ref() {
        merged.backend = Some(backend.clone());
    }
    if let Some(api_url) = overrides.api_url.as_ref() {
        merged.api_url = Some(api_url.clone());
    }
    if let Some(auth_url) = overrides.auth_url.as_ref() {
        merged.auth_url = Some(auth_url.clone());
    }
    if let Some(theme) = overrides.theme.as_ref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }

    merged
}

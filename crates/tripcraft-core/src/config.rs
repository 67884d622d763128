//! Application settings
//!
//! Settings resolve in two layers, file first then environment:
//! 1. Optional TOML file in the platform config dir
//!    (`~/.config/tripcraft/config.toml` on Linux/Mac)
//! 2. Environment variables override any file value

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Resolved application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// DashScope API key for the generation service
    #[serde(default)]
    pub dashscope_api_key: Option<String>,
    /// DashScope host override
    #[serde(default)]
    pub dashscope_host: Option<String>,
    /// Generation model name
    #[serde(default)]
    pub dashscope_model: Option<String>,
    /// Transcription service URL
    #[serde(default)]
    pub speech_service_url: Option<String>,
    /// Plan/expense store URL
    #[serde(default)]
    pub store_url: Option<String>,
    /// Optional bearer key for the store
    #[serde(default)]
    pub store_api_key: Option<String>,
}

impl Settings {
    /// Load settings from the default config file location plus environment
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load settings from a specific file path plus environment
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        let mut settings = match path {
            Some(ref p) if p.exists() => {
                let raw = fs::read_to_string(p)?;
                toml::from_str(&raw)
                    .map_err(|e| Error::Config(format!("{}: {}", p.display(), e)))?
            }
            _ => Settings::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    /// Overlay environment variables onto file values
    fn apply_env(&mut self) {
        for (var, field) in [
            ("DASHSCOPE_API_KEY", &mut self.dashscope_api_key),
            ("DASHSCOPE_HOST", &mut self.dashscope_host),
            ("DASHSCOPE_MODEL", &mut self.dashscope_model),
            ("SPEECH_SERVICE_URL", &mut self.speech_service_url),
            ("STORE_URL", &mut self.store_url),
            ("STORE_API_KEY", &mut self.store_api_key),
        ] {
            if let Ok(value) = std::env::var(var) {
                *field = Some(value);
            }
        }
    }
}

/// Default config file path (~/.config/tripcraft/config.toml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tripcraft").join("config.toml"))
}

use std::{collections::HashMap, fs, path::PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api_url: String,
    pub session_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".into(),
            session_file: PathBuf::from("./.caseworks/session.json"),
        }
    }
}

/// Defaults, overridden by `console.toml` in the working directory,
/// overridden in turn by environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("console.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_url") {
                settings.api_url = v.clone();
            }
            if let Some(v) = file_cfg.get("session_file") {
                settings.session_file = PathBuf::from(v);
            }
        }
    }

    if let Ok(v) = std::env::var("CASEWORKS_API_URL") {
        settings.api_url = v;
    }
    if let Ok(v) = std::env::var("CASEWORKS_SESSION_FILE") {
        settings.session_file = PathBuf::from(v);
    }

    settings
}

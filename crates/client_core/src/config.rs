use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Disc, Player, Role},
    protocol::PLAY_PATH,
};
use url::Url;

use crate::{error::ConfigError, session::SessionOptions};

pub const DEFAULT_CONFIG_FILE: &str = "trainer.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub play_path: String,
    pub human_first: bool,
    pub swap_on_reset: bool,
    pub min_input_interval_ms: u64,
    pub drop_step_ms: u64,
    pub warm_on_start: bool,
    pub human_colour: String,
    pub ai_colour: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            play_path: PLAY_PATH.into(),
            human_first: true,
            swap_on_reset: true,
            min_input_interval_ms: 200,
            drop_step_ms: 25,
            warm_on_start: true,
            human_colour: "#fff700".into(),
            ai_colour: "#e33333".into(),
        }
    }
}

impl Settings {
    /// Full URL every game request is POSTed to.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let invalid = |source| ConfigError::InvalidUrl {
            url: self.server_url.clone(),
            source,
        };
        let base = Url::parse(&self.server_url).map_err(invalid)?;
        base.join(&self.play_path).map_err(invalid)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;
        if self.drop_step_ms == 0 {
            return Err(ConfigError::Validation("drop_step_ms must be > 0".into()));
        }
        if !self.play_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "play_path must start with '/'".into(),
            ));
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            human: Player::new(Role::Human, Disc::Yellow, self.human_colour.clone()),
            ai: Player::new(Role::Ai, Disc::Red, self.ai_colour.clone()),
            human_first: self.human_first,
            swap_on_reset: self.swap_on_reset,
            min_input_interval: Duration::from_millis(self.min_input_interval_ms),
            drop_step: Duration::from_millis(self.drop_step_ms),
        }
    }
}

/// Defaults, overlaid by `path` when it exists, then by environment variables.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<Settings>(&raw)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Settings::default(),
        Err(source) => {
            return Err(ConfigError::FileRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    apply_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.validate()?;
    Ok(settings)
}

pub fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("C4_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__PLAY_PATH") {
        settings.play_path = v;
    }

    if let Some(parsed) = lookup("APP__HUMAN_FIRST").and_then(|v| v.parse::<bool>().ok()) {
        settings.human_first = parsed;
    }
    if let Some(parsed) = lookup("APP__SWAP_ON_RESET").and_then(|v| v.parse::<bool>().ok()) {
        settings.swap_on_reset = parsed;
    }
    if let Some(parsed) = lookup("APP__WARM_ON_START").and_then(|v| v.parse::<bool>().ok()) {
        settings.warm_on_start = parsed;
    }

    if let Some(parsed) = lookup("APP__MIN_INPUT_INTERVAL_MS").and_then(|v| v.parse::<u64>().ok())
    {
        settings.min_input_interval_ms = parsed;
    }
    if let Some(parsed) = lookup("APP__DROP_STEP_MS").and_then(|v| v.parse::<u64>().ok()) {
        settings.drop_step_ms = parsed;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

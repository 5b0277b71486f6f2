use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SETTINGS_PATH_ENV: &str = "COMPANION_SETTINGS_PATH";
pub const DEFAULT_API_KEY_ENV: &str = "COMPANION_CHAT_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSettings {
    /// Store file. Relative paths resolve against the working directory.
    pub store_path: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            store_path: default_config_dir().join("store.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSettings {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Name of the environment variable holding the bearer key.
    pub api_key_env: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.deepseek.com/v1/chat/completions".to_string(),
            model: "deepseek-chat".to_string(),
            max_tokens: 200,
            temperature: 0.7,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl ChatSettings {
    pub fn clamp(mut self) -> Self {
        self.max_tokens = self.max_tokens.clamp(1, 4096);
        self.temperature = if self.temperature.is_finite() {
            self.temperature.clamp(0.0, 2.0)
        } else {
            Self::default().temperature
        };
        if self.api_key_env.trim().is_empty() {
            self.api_key_env = DEFAULT_API_KEY_ENV.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSettings {
    pub endpoint: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.open-meteo.com/v1/forecast".to_string(),
            latitude: 39.9042,
            longitude: 116.4074,
        }
    }
}

impl WeatherSettings {
    pub fn clamp(mut self) -> Self {
        let defaults = Self::default();
        if !self.latitude.is_finite() {
            self.latitude = defaults.latitude;
        }
        if !self.longitude.is_finite() {
            self.longitude = defaults.longitude;
        }
        self.latitude = self.latitude.clamp(-90.0, 90.0);
        self.longitude = self.longitude.clamp(-180.0, 180.0);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InviteSettings {
    pub base_url: String,
}

impl Default for InviteSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanionSettings {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
    #[serde(default)]
    pub invite: InviteSettings,
}

impl CompanionSettings {
    pub fn sanitized(mut self) -> Self {
        self.chat = self.chat.clamp();
        self.weather = self.weather.clamp();
        if self.invite.base_url.trim().is_empty() {
            self.invite = InviteSettings::default();
        }
        self
    }
}

fn default_config_dir() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| {
                let mut p = PathBuf::from(home);
                p.push(".config");
                p
            })
        })
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("companion")
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os(SETTINGS_PATH_ENV) {
            return Self {
                path: PathBuf::from(explicit),
            };
        }
        Self {
            path: default_config_dir().join("settings.json"),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn load(&self) -> CompanionSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            return CompanionSettings::default();
        };
        serde_json::from_slice::<CompanionSettings>(&bytes)
            .map(CompanionSettings::sanitized)
            .unwrap_or_else(|err| {
                warn!(path = %self.path.display(), %err, "malformed settings, using defaults");
                CompanionSettings::default()
            })
    }

    pub fn save(&self, settings: &CompanionSettings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_clamps_chat_and_weather() {
        let settings = CompanionSettings {
            chat: ChatSettings {
                max_tokens: 0,
                temperature: 9.0,
                api_key_env: " ".into(),
                ..ChatSettings::default()
            },
            weather: WeatherSettings {
                latitude: 120.0,
                longitude: f64::NAN,
                ..WeatherSettings::default()
            },
            ..CompanionSettings::default()
        }
        .sanitized();

        assert_eq!(settings.chat.max_tokens, 1);
        assert_eq!(settings.chat.temperature, 2.0);
        assert_eq!(settings.chat.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(settings.weather.latitude, 90.0);
        assert_eq!(settings.weather.longitude, WeatherSettings::default().longitude);
    }

    #[test]
    fn serde_defaults_fill_missing_sections() {
        let parsed: CompanionSettings =
            serde_json::from_str(r#"{"chat":{"endpoint":"http://x","model":"m","max_tokens":50,"temperature":0.1,"api_key_env":"K"}}"#)
                .expect("settings JSON should parse");
        assert_eq!(parsed.chat.max_tokens, 50);
        assert_eq!(parsed.weather, WeatherSettings::default());
        assert_eq!(parsed.invite, InviteSettings::default());
    }

    #[test]
    fn missing_or_malformed_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(&path);
        assert_eq!(store.load(), CompanionSettings::default());

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(store.load(), CompanionSettings::default());

        let custom = CompanionSettings {
            invite: InviteSettings {
                base_url: "https://us.example".into(),
            },
            ..CompanionSettings::default()
        };
        store.save(&custom).unwrap();
        assert_eq!(store.load(), custom);
    }
}

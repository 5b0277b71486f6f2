use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::settings::WeatherSettings;

pub const NO_WEATHER: &str = "no weather";

#[derive(Debug, Clone, Error)]
pub enum WeatherError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("http {0}")]
    Http(u16),
    #[error("json error: {0}")]
    Serde(String),
}

/// Short description for a WMO weather interpretation code.
pub fn describe(code: i64) -> &'static str {
    match code {
        0 => "clear",
        1 => "partly cloudy",
        2 | 3 => "overcast",
        45 | 48 => "fog",
        51 | 53 | 55 => "drizzle",
        61 | 63 | 65 => "rain",
        66 | 67 => "freezing rain",
        71 | 73 | 75 => "snow",
        77 => "snow grains",
        80..=82 => "showers",
        85 | 86 => "snow showers",
        95 | 96 | 99 => "thunderstorm",
        _ => "partly cloudy",
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weather {
    pub temperature: f64,
    pub code: i64,
}

impl Weather {
    pub fn description(&self) -> &'static str {
        describe(self.code)
    }

    pub fn summary(&self) -> String {
        format!("{} {:.0}°C", self.description(), self.temperature)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Current {
    temperature_2m: f64,
    weather_code: i64,
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    endpoint: String,
    latitude: f64,
    longitude: f64,
}

impl WeatherClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn from_settings(settings: &WeatherSettings) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WeatherError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            latitude: settings.latitude,
            longitude: settings.longitude,
        })
    }

    pub async fn current(&self) -> Result<Weather, WeatherError> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("current", "temperature_2m,weather_code".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            return Err(WeatherError::Http(res.status().as_u16()));
        }
        let body = res
            .json::<ForecastResponse>()
            .await
            .map_err(|e| WeatherError::Serde(e.to_string()))?;
        Ok(Weather {
            temperature: body.current.temperature_2m,
            code: body.current.weather_code,
        })
    }

    /// One-line summary, or [`NO_WEATHER`] when the lookup fails.
    pub async fn summary(&self) -> String {
        match self.current().await {
            Ok(weather) => weather.summary(),
            Err(err) => {
                warn!(%err, "weather lookup failed");
                NO_WEATHER.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wmo_table() {
        assert_eq!(describe(0), "clear");
        assert_eq!(describe(3), "overcast");
        assert_eq!(describe(81), "showers");
        assert_eq!(describe(99), "thunderstorm");
        assert_eq!(describe(42), "partly cloudy");
    }

    #[test]
    fn summary_rounds_temperature() {
        let weather = Weather {
            temperature: 21.6,
            code: 61,
        };
        assert_eq!(weather.summary(), "rain 22°C");
    }
}

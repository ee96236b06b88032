use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;
use tracing::info;

use crate::models::{AirQualityReading, NoiseReading, UserHealthProfile, WeatherReading};

#[derive(Debug, Error)]
pub enum WeatherUnavailable {
    #[error("no weather reading for {0}")]
    NoReading(String),
    #[error("failed to read weather file {path}: {reason}")]
    Source { path: PathBuf, reason: String },
}

/// Supplies the current weather for a city, or reports that it can't.
pub trait WeatherSource {
    fn current(&self, city: &str) -> Result<WeatherReading, WeatherUnavailable>;
}

pub trait AirQualityProvider {
    fn air_quality(&self, city: &str) -> anyhow::Result<AirQualityReading>;
}

pub trait NoiseProvider {
    fn noise(&self, city: &str) -> anyhow::Result<NoiseReading>;
}

/// Weather handed in directly by the caller.
#[derive(Debug, Clone)]
pub struct StaticWeather {
    pub reading: Option<WeatherReading>,
}

impl WeatherSource for StaticWeather {
    fn current(&self, city: &str) -> Result<WeatherReading, WeatherUnavailable> {
        let mut reading = self
            .reading
            .clone()
            .ok_or_else(|| WeatherUnavailable::NoReading(city.to_string()))?;
        if reading.city.trim().is_empty() {
            reading.city = city.to_string();
        }
        Ok(reading)
    }
}

/// Weather stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonWeather {
    pub path: PathBuf,
}

impl WeatherSource for JsonWeather {
    fn current(&self, city: &str) -> Result<WeatherReading, WeatherUnavailable> {
        let source_error = |reason: String| WeatherUnavailable::Source {
            path: self.path.clone(),
            reason,
        };
        let raw = std::fs::read_to_string(&self.path).map_err(|e| source_error(e.to_string()))?;
        let mut reading: WeatherReading =
            serde_json::from_str(&raw).map_err(|e| source_error(e.to_string()))?;
        if reading.city.trim().is_empty() {
            reading.city = city.to_string();
        }
        Ok(reading)
    }
}

/// Air quality from configured constants. There is no live sensor feed.
#[derive(Debug, Clone)]
pub struct FixedAirQuality {
    pub reading: AirQualityReading,
}

impl Default for FixedAirQuality {
    fn default() -> Self {
        Self {
            reading: AirQualityReading {
                pm25: 35.0,
                pm10: 60.0,
                aqi: 80,
                category: "Moderate".to_string(),
            },
        }
    }
}

impl AirQualityProvider for FixedAirQuality {
    fn air_quality(&self, _city: &str) -> anyhow::Result<AirQualityReading> {
        Ok(self.reading.clone())
    }
}

#[derive(Debug, Clone)]
pub struct FixedNoise {
    pub reading: NoiseReading,
}

impl Default for FixedNoise {
    fn default() -> Self {
        Self {
            reading: NoiseReading {
                noise_db: 65.0,
                likely_source: "Vehicle traffic".to_string(),
            },
        }
    }
}

impl NoiseProvider for FixedNoise {
    fn noise(&self, _city: &str) -> anyhow::Result<NoiseReading> {
        Ok(self.reading.clone())
    }
}

pub fn load_profile(path: &Path) -> anyhow::Result<UserHealthProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    let profile: UserHealthProfile = serde_json::from_str(&raw)
        .with_context(|| format!("invalid profile in {}", path.display()))?;
    info!(path = %path.display(), "loaded health profile");
    Ok(profile)
}

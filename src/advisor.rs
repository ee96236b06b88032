use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{
    AirQualityReading, NoiseReading, RecommendationSet, RiskVerdict, ScoringPolicy,
    UserHealthProfile, WeatherReading,
};
use crate::providers::{AirQualityProvider, NoiseProvider, WeatherSource, WeatherUnavailable};
use crate::{recommend, risk};

#[derive(Debug, Error)]
pub enum AssessError {
    #[error("enter a city")]
    MissingCity,
    #[error("could not obtain the weather: {0}")]
    WeatherUnavailable(#[from] WeatherUnavailable),
    #[error("air quality provider failed: {0:#}")]
    AirQuality(anyhow::Error),
    #[error("noise provider failed: {0:#}")]
    Noise(anyhow::Error),
}

/// Everything shown to the user for one city.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub city: String,
    pub assessed_at: DateTime<Utc>,
    pub policy: ScoringPolicy,
    pub weather: WeatherReading,
    pub air: AirQualityReading,
    pub noise: NoiseReading,
    pub verdict: RiskVerdict,
    pub recommendations: RecommendationSet,
}

/// Gather readings for `city` and run them through the scorer and the
/// recommendation generator. The core only runs once every reading is in.
pub fn assess(
    city: &str,
    assessed_at: DateTime<Utc>,
    weather_source: &dyn WeatherSource,
    air_provider: &dyn AirQualityProvider,
    noise_provider: &dyn NoiseProvider,
    profile: Option<&UserHealthProfile>,
) -> Result<Assessment, AssessError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(AssessError::MissingCity);
    }

    let weather = weather_source.current(city).map_err(|e| {
        warn!(city, error = %e, "weather unavailable");
        AssessError::from(e)
    })?;
    let air = air_provider.air_quality(city).map_err(|e| {
        warn!(city, error = %format!("{e:#}"), "air quality unavailable");
        AssessError::AirQuality(e)
    })?;
    let noise = noise_provider.noise(city).map_err(|e| {
        warn!(city, error = %format!("{e:#}"), "noise reading unavailable");
        AssessError::Noise(e)
    })?;

    let verdict = risk::score(&weather, &air, &noise, profile);
    let recommendations = recommend::recommend(&verdict, &weather, &air, &noise, profile);
    let policy = ScoringPolicy::for_profile(profile);

    info!(
        city = %weather.city,
        ?policy,
        score = verdict.score,
        level = %verdict.level,
        "assessment complete"
    );

    Ok(Assessment {
        city: weather.city.clone(),
        assessed_at,
        policy,
        weather,
        air,
        noise,
        verdict,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::models::{Answer, RiskLevel};
    use crate::providers::{FixedAirQuality, FixedNoise, StaticWeather};
    use crate::risk::fixtures::weather;

    struct BrokenSensor;

    impl NoiseProvider for BrokenSensor {
        fn noise(&self, _city: &str) -> anyhow::Result<NoiseReading> {
            anyhow::bail!("sensor offline")
        }
    }

    impl AirQualityProvider for BrokenSensor {
        fn air_quality(&self, _city: &str) -> anyhow::Result<AirQualityReading> {
            anyhow::bail!("station unreachable")
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn assess_logged(
        air: &dyn AirQualityProvider,
        noise: &dyn NoiseProvider,
    ) -> (Result<Assessment, AssessError>, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let source = StaticWeather {
            reading: Some(weather(20.0, 50)),
        };
        let result = tracing::subscriber::with_default(subscriber, || {
            assess("Lima", now(), &source, air, noise, None)
        });
        (result, logs.text())
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-14T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn blank_city_is_rejected_before_any_lookup() {
        let source = StaticWeather {
            reading: Some(weather(20.0, 50)),
        };
        let err = assess(
            "   ",
            now(),
            &source,
            &FixedAirQuality::default(),
            &FixedNoise::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AssessError::MissingCity));
    }

    #[test]
    fn missing_weather_stops_the_pipeline() {
        let err = assess(
            "Lima",
            now(),
            &StaticWeather { reading: None },
            &FixedAirQuality::default(),
            &FixedNoise::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AssessError::WeatherUnavailable(_)));
        assert!(err.to_string().starts_with("could not obtain the weather"));
    }

    #[test]
    fn collaborator_failures_are_logged() {
        let (result, logs) = assess_logged(&BrokenSensor, &FixedNoise::default());
        assert!(matches!(result, Err(AssessError::AirQuality(_))));
        assert!(logs.contains("air quality unavailable"));
        assert!(logs.contains("station unreachable"));

        let (result, logs) = assess_logged(&FixedAirQuality::default(), &BrokenSensor);
        assert!(matches!(result, Err(AssessError::Noise(_))));
        assert!(logs.contains("noise reading unavailable"));
        assert!(logs.contains("sensor offline"));
    }

    #[test]
    fn provider_failure_is_reported() {
        let source = StaticWeather {
            reading: Some(weather(20.0, 50)),
        };
        let err = assess(
            "Lima",
            now(),
            &source,
            &FixedAirQuality::default(),
            &BrokenSensor,
            None,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "noise provider failed: sensor offline");
    }

    #[test]
    fn default_providers_with_profile() {
        let source = StaticWeather {
            reading: Some(weather(20.0, 50)),
        };
        let profile = UserHealthProfile {
            allergies: Answer::Yes,
            ..UserHealthProfile::default()
        };
        let assessment = assess(
            "Monterrey",
            now(),
            &source,
            &FixedAirQuality::default(),
            &FixedNoise::default(),
            Some(&profile),
        )
        .unwrap();

        // aqi 80 -> 1, allergies over 70 -> 2, 65 dB -> 1
        assert_eq!(assessment.policy, ScoringPolicy::Personalized);
        assert_eq!(assessment.verdict.score, 4);
        assert_eq!(assessment.verdict.level, RiskLevel::Low);
        assert_eq!(assessment.city, "Monterrey");
        assert_eq!(assessment.recommendations.messages.len(), 2);
        assert_eq!(assessment.assessed_at, now());
    }

    #[test]
    fn default_providers_without_profile() {
        let source = StaticWeather {
            reading: Some(weather(20.0, 50)),
        };
        let assessment = assess(
            "Monterrey",
            now(),
            &source,
            &FixedAirQuality::default(),
            &FixedNoise::default(),
            None,
        )
        .unwrap();

        assert_eq!(assessment.policy, ScoringPolicy::Basic);
        assert_eq!(assessment.verdict.score, 2);
        assert_eq!(assessment.verdict.level, RiskLevel::Low);
    }
}

use tracing::debug;

use crate::models::{
    AirQualityReading, NoiseReading, OutdoorExposure, RiskVerdict, ScoringPolicy,
    UserHealthProfile, WeatherReading,
};

/// Score one snapshot. A profile selects the personalized rule set, no
/// profile selects the basic one.
pub fn score(
    weather: &WeatherReading,
    air: &AirQualityReading,
    noise: &NoiseReading,
    profile: Option<&UserHealthProfile>,
) -> RiskVerdict {
    let policy = ScoringPolicy::for_profile(profile);
    let temp = weather.temperature_c;

    let mut total = temperature_points(policy, temp)
        + humidity_points(weather.humidity_pct)
        + aqi_points(policy, air.aqi)
        + noise_points(noise.noise_db);

    if let Some(profile) = profile {
        total += profile_points(profile, temp, air.aqi, noise.noise_db);
    }

    let verdict = RiskVerdict::classify(total, policy);
    debug!(
        ?policy,
        score = verdict.score,
        level = %verdict.level,
        "scored snapshot for {}",
        weather.city
    );
    verdict
}

pub fn temperature_points(policy: ScoringPolicy, temp: f64) -> u32 {
    let extreme = temp < 5.0 || temp > 32.0;
    let uncomfortable = temp < 10.0 || temp > 28.0;
    match policy {
        ScoringPolicy::Personalized if extreme => 3,
        ScoringPolicy::Personalized if uncomfortable => 2,
        ScoringPolicy::Basic if extreme => 2,
        ScoringPolicy::Basic if uncomfortable => 1,
        _ => 0,
    }
}

pub fn humidity_points(humidity_pct: u8) -> u32 {
    if humidity_pct > 80 {
        1
    } else {
        0
    }
}

pub fn aqi_points(policy: ScoringPolicy, aqi: u16) -> u32 {
    match (policy, aqi) {
        (_, 0..=50) => 0,
        (_, 51..=100) => 1,
        (ScoringPolicy::Personalized, 101..=150) => 3,
        (ScoringPolicy::Personalized, _) => 5,
        (ScoringPolicy::Basic, 101..=150) => 2,
        (ScoringPolicy::Basic, _) => 3,
    }
}

pub fn noise_points(noise_db: f64) -> u32 {
    if noise_db > 80.0 {
        3
    } else if noise_db > 70.0 {
        2
    } else if noise_db > 60.0 {
        1
    } else {
        0
    }
}

/// Terms that only exist when the user has told us about themselves.
fn profile_points(profile: &UserHealthProfile, temp: f64, aqi: u16, noise_db: f64) -> u32 {
    let mut points = 0;

    if profile.heat_sensitive.is_yes() && temp > 28.0 {
        points += 2;
    }
    if profile.cold_sensitive.is_yes() && temp < 10.0 {
        points += 2;
    }

    if profile.has_respiratory_risk() {
        if aqi > 80 {
            points += 3;
        }
        if aqi > 120 {
            points += 5;
        }
    }
    if profile.allergies.is_yes() && aqi > 70 {
        points += 2;
    }

    if profile.noise_sensitive.is_yes() && noise_db > 60.0 {
        points += 2;
    }

    if profile.hypertension.is_yes() {
        points += 2;
    }
    if profile.diabetes.is_yes() {
        points += 1;
    }
    points += age_points(profile.age_years);

    if profile.is_highly_active() {
        if temp > 28.0 || temp < 10.0 {
            points += 2;
        }
        if aqi > 100 {
            points += 3;
        }
    }

    points += match profile.outdoor_exposure_hours {
        Some(OutdoorExposure::OverFourHours) => 2,
        Some(OutdoorExposure::TwoToFourHours) => 1,
        Some(OutdoorExposure::UnderTwoHours) | None => 0,
    };

    debug!(points, "profile contribution");
    points
}

pub fn age_points(age_years: u32) -> u32 {
    match age_years {
        65.. => 3,
        50..=64 => 1,
        _ => 0,
    }
}

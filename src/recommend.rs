use tracing::debug;

use crate::models::{
    AirQualityReading, NoiseReading, RecommendationSet, RiskLevel, RiskVerdict, TransportMode,
    UserHealthProfile, WeatherReading,
};

pub const LOW_RISK_MESSAGE: &str = "Conditions are good for outdoor activities.";
pub const MEDIUM_RISK_MESSAGE: &str = "Avoid intense effort and stay hydrated.";
pub const HIGH_RISK_MESSAGE: &str = "Risk is high. Limit your time outdoors.";

pub const SUN_MESSAGE: &str = "Avoid direct sun and drink water frequently.";
pub const HEAT_WINDOW_MESSAGE: &str =
    "You are sensitive to heat: avoid going out between 12:00 and 16:00.";
pub const DRESS_WARM_MESSAGE: &str = "Dress warmly if you go out.";
pub const SHORT_OUTINGS_MESSAGE: &str = "Your sensitivity to cold calls for short outings.";
pub const POLLUTION_EXERCISE_MESSAGE: &str =
    "Avoid intense outdoor exercise because of the pollution.";
pub const MASK_MESSAGE: &str = "Wear a mask outside because of your respiratory condition.";
pub const ALLERGY_MESSAGE: &str = "The air may aggravate your allergies.";
pub const QUIET_ROUTES_MESSAGE: &str = "Noise is high. Prefer quiet routes.";
pub const AVOID_AVENUES_MESSAGE: &str = "You are sensitive to noise: avoid major avenues.";
pub const EXERCISE_INDOORS_MESSAGE: &str = "Exercise indoors today.";
pub const NO_WALKING_MESSAGE: &str = "Walking is not advisable because of the pollution.";
pub const QUIET_BIKEWAYS_MESSAGE: &str = "Look for quieter bike lanes.";
pub const TRANSIT_MASK_MESSAGE: &str = "Wear a mask on public transport.";

pub fn base_message(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => LOW_RISK_MESSAGE,
        RiskLevel::Medium => MEDIUM_RISK_MESSAGE,
        RiskLevel::High => HIGH_RISK_MESSAGE,
    }
}

/// Best time to be outside. Depends on the risk level alone.
pub fn suggested_window(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "avoid outdoors 11:00–17:00",
        RiskLevel::Medium => "prefer before 10:00 or after 18:00",
        RiskLevel::Low => "any time is suitable.",
    }
}

/// Build the advice for a verdict. The base message always comes first,
/// followed by every conditional message whose guard holds, in a fixed
/// order. Profile-dependent messages are skipped when there is no profile.
pub fn recommend(
    verdict: &RiskVerdict,
    weather: &WeatherReading,
    air: &AirQualityReading,
    noise: &NoiseReading,
    profile: Option<&UserHealthProfile>,
) -> RecommendationSet {
    let temp = weather.temperature_c;
    let aqi = air.aqi;
    let noise_db = noise.noise_db;
    let has = |check: fn(&UserHealthProfile) -> bool| profile.is_some_and(check);

    let mut messages = vec![base_message(verdict.level).to_string()];
    let mut push = |message: &str| messages.push(message.to_string());

    if temp > 30.0 {
        push(SUN_MESSAGE);
        if has(|p| p.heat_sensitive.is_yes()) {
            push(HEAT_WINDOW_MESSAGE);
        }
    }

    if temp < 10.0 {
        push(DRESS_WARM_MESSAGE);
        if has(|p| p.cold_sensitive.is_yes()) {
            push(SHORT_OUTINGS_MESSAGE);
        }
    }

    if aqi > 100 {
        push(POLLUTION_EXERCISE_MESSAGE);
    }
    if aqi > 80 && has(UserHealthProfile::has_respiratory_risk) {
        push(MASK_MESSAGE);
    }
    if aqi > 70 && has(|p| p.allergies.is_yes()) {
        push(ALLERGY_MESSAGE);
    }

    if noise_db > 70.0 {
        push(QUIET_ROUTES_MESSAGE);
    }
    if has(|p| p.noise_sensitive.is_yes()) {
        push(AVOID_AVENUES_MESSAGE);
    }

    if (temp > 28.0 || aqi > 100) && has(UserHealthProfile::is_highly_active) {
        push(EXERCISE_INDOORS_MESSAGE);
    }

    let transport = profile.and_then(|p| p.transport_mode);
    match transport {
        Some(TransportMode::Walking) if aqi > 120 => push(NO_WALKING_MESSAGE),
        Some(TransportMode::Bicycle) if noise_db > 70.0 => push(QUIET_BIKEWAYS_MESSAGE),
        Some(TransportMode::PublicTransport) if aqi > 120 => push(TRANSIT_MASK_MESSAGE),
        _ => {}
    }

    debug!(count = messages.len(), level = %verdict.level, "built recommendations");

    RecommendationSet {
        messages,
        suggested_window: suggested_window(verdict.level).to_string(),
    }
}

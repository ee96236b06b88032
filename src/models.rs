use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    pub city: String,
    #[serde(default)]
    pub country_code: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    #[serde(deserialize_with = "humidity_pct")]
    pub humidity_pct: u8,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityReading {
    pub pm25: f64,
    pub pm10: f64,
    pub aqi: u16,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoiseReading {
    pub noise_db: f64,
    pub likely_source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("unknown {field} label: {value:?}")]
    UnknownLabel { field: &'static str, value: String },
    #[error("invalid age: {0:?}")]
    InvalidAge(String),
}

/// Yes/No answer to a profile question. Unset answers read as `No`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Answer {
    Yes,
    #[default]
    No,
}

impl Answer {
    pub fn is_yes(self) -> bool {
        self == Answer::Yes
    }
}

impl FromStr for Answer {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "yes" | "si" | "sí" | "true" => Ok(Answer::Yes),
            "no" | "false" => Ok(Answer::No),
            _ => Err(unknown("answer", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
}

impl FromStr for ActivityLevel {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "low" | "bajo" => Ok(ActivityLevel::Low),
            "moderate" | "moderado" | "medio" => Ok(ActivityLevel::Moderate),
            "high" | "alto" => Ok(ActivityLevel::High),
            _ => Err(unknown("activity level", value)),
        }
    }
}

/// Daily hours spent outdoors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutdoorExposure {
    #[serde(rename = "<2h")]
    UnderTwoHours,
    #[serde(rename = "2-4h")]
    TwoToFourHours,
    #[serde(rename = ">4h")]
    OverFourHours,
}

impl FromStr for OutdoorExposure {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "<2h" | "menos de 2h" => Ok(OutdoorExposure::UnderTwoHours),
            "2-4h" => Ok(OutdoorExposure::TwoToFourHours),
            ">4h" | "más de 4h" | "mas de 4h" => Ok(OutdoorExposure::OverFourHours),
            _ => Err(unknown("outdoor exposure", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransportMode {
    Walking,
    Bicycle,
    PublicTransport,
    Other,
}

impl FromStr for TransportMode {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "walking" | "caminata" => Ok(TransportMode::Walking),
            "bicycle" | "bicicleta" => Ok(TransportMode::Bicycle),
            "publictransport" | "public transport" | "transporte público"
            | "transporte publico" => Ok(TransportMode::PublicTransport),
            "other" | "otro" => Ok(TransportMode::Other),
            _ => Err(unknown("transport mode", value)),
        }
    }
}

/// Health and habits a user reports about themselves.
///
/// Every field is optional on input. Missing flags read as `No`, missing
/// enums as unset and a missing age as `0`, so a partial profile is always
/// a valid profile. Field names also accept the keys of legacy profile
/// records (`edad`, `asma`, `sensible_calor`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserHealthProfile {
    #[serde(alias = "edad", deserialize_with = "age_years")]
    pub age_years: u32,
    #[serde(alias = "sexo", deserialize_with = "optional_text")]
    pub sex: Option<String>,
    #[serde(alias = "asma", deserialize_with = "answer")]
    pub asthma: Answer,
    #[serde(alias = "alergias", deserialize_with = "answer")]
    pub allergies: Answer,
    #[serde(alias = "hipertension", deserialize_with = "answer")]
    pub hypertension: Answer,
    #[serde(deserialize_with = "answer")]
    pub diabetes: Answer,
    #[serde(alias = "respiratorio", deserialize_with = "answer")]
    pub respiratory_condition: Answer,
    #[serde(alias = "sensible_calor", deserialize_with = "answer")]
    pub heat_sensitive: Answer,
    #[serde(alias = "sensible_frio", deserialize_with = "answer")]
    pub cold_sensitive: Answer,
    #[serde(alias = "sensibilidad_ruido", deserialize_with = "answer")]
    pub noise_sensitive: Answer,
    #[serde(alias = "sensibilidad_contaminacion", deserialize_with = "answer")]
    pub pollution_sensitive: Answer,
    #[serde(alias = "actividad", deserialize_with = "optional_label")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(alias = "aire_libre", deserialize_with = "optional_label")]
    pub outdoor_exposure_hours: Option<OutdoorExposure>,
    #[serde(alias = "transporte", deserialize_with = "optional_label")]
    pub transport_mode: Option<TransportMode>,
}

impl UserHealthProfile {
    pub fn has_respiratory_risk(&self) -> bool {
        self.asthma.is_yes() || self.respiratory_condition.is_yes()
    }

    pub fn is_highly_active(&self) -> bool {
        self.activity_level == Some(ActivityLevel::High)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn color(self) -> ColorTag {
        match self {
            RiskLevel::Low => ColorTag::Green,
            RiskLevel::Medium => ColorTag::Yellow,
            RiskLevel::High => ColorTag::Red,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorTag::Green => write!(f, "green"),
            ColorTag::Yellow => write!(f, "yellow"),
            ColorTag::Red => write!(f, "red"),
        }
    }
}

/// Rule set used to score a snapshot.
///
/// `Personalized` sums more terms than `Basic`, so each policy carries its
/// own classification thresholds. They are tuned independently and must
/// not be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringPolicy {
    Personalized,
    Basic,
}

impl ScoringPolicy {
    pub fn for_profile(profile: Option<&UserHealthProfile>) -> Self {
        match profile {
            Some(_) => ScoringPolicy::Personalized,
            None => ScoringPolicy::Basic,
        }
    }

    /// Inclusive upper bounds of the Low and Medium bands.
    pub fn thresholds(self) -> (u32, u32) {
        match self {
            ScoringPolicy::Personalized => (5, 12),
            ScoringPolicy::Basic => (2, 5),
        }
    }

    pub fn classify(self, score: u32) -> RiskLevel {
        let (low_max, medium_max) = self.thresholds();
        if score <= low_max {
            RiskLevel::Low
        } else if score <= medium_max {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskVerdict {
    pub score: u32,
    pub level: RiskLevel,
    pub color_tag: ColorTag,
}

impl RiskVerdict {
    pub fn classify(score: u32, policy: ScoringPolicy) -> Self {
        let level = policy.classify(score);
        Self {
            score,
            level,
            color_tag: level.color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub messages: Vec<String>,
    pub suggested_window: String,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn unknown(field: &'static str, value: &str) -> ProfileError {
    ProfileError::UnknownLabel {
        field,
        value: value.to_string(),
    }
}

/// Profile values as they show up in stored records: form checkboxes
/// become booleans, form text fields become strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

fn answer<'de, D>(deserializer: D) -> Result<Answer, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawValue>::deserialize(deserializer)? {
        None => Ok(Answer::No),
        Some(RawValue::Flag(true)) => Ok(Answer::Yes),
        Some(RawValue::Flag(false)) => Ok(Answer::No),
        Some(RawValue::Number(n)) => Err(serde::de::Error::custom(unknown(
            "answer",
            &n.to_string(),
        ))),
        Some(RawValue::Text(text)) if text.trim().is_empty() => Ok(Answer::No),
        Some(RawValue::Text(text)) => text.parse().map_err(serde::de::Error::custom),
    }
}

fn optional_label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = ProfileError>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) if !text.trim().is_empty() => {
            text.parse().map(Some).map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    Ok(text
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// Relative humidity as a whole percentage. Sources may report fractions.
fn humidity_pct<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(serde::de::Error::custom(format!(
            "humidity must be between 0 and 100, got {value}"
        )));
    }
    // bounds checked above, so the rounded value fits
    Ok(value.round() as u8)
}

fn age_years<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let age = match Option::<RawValue>::deserialize(deserializer)? {
        None => return Ok(0),
        Some(RawValue::Number(n)) => {
            u32::try_from(n).map_err(|_| ProfileError::InvalidAge(n.to_string()))
        }
        Some(RawValue::Text(text)) if text.trim().is_empty() => return Ok(0),
        Some(RawValue::Text(text)) => text
            .trim()
            .parse::<u32>()
            .map_err(|_| ProfileError::InvalidAge(text)),
        Some(RawValue::Flag(flag)) => Err(ProfileError::InvalidAge(flag.to_string())),
    };
    age.map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_reads_as_defaults() {
        let profile: UserHealthProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile, UserHealthProfile::default());
        assert_eq!(profile.age_years, 0);
        assert_eq!(profile.asthma, Answer::No);
        assert!(profile.activity_level.is_none());
    }

    #[test]
    fn legacy_keys_and_labels_are_accepted() {
        let profile: UserHealthProfile = serde_json::from_str(
            r#"{
                "edad": "70",
                "respiratorio": "Si",
                "sensible_calor": "No",
                "actividad": "Alto",
                "aire_libre": "Más de 4h",
                "transporte": "Transporte público"
            }"#,
        )
        .unwrap();

        assert_eq!(profile.age_years, 70);
        assert_eq!(profile.respiratory_condition, Answer::Yes);
        assert_eq!(profile.heat_sensitive, Answer::No);
        assert_eq!(profile.activity_level, Some(ActivityLevel::High));
        assert_eq!(
            profile.outdoor_exposure_hours,
            Some(OutdoorExposure::OverFourHours)
        );
        assert_eq!(profile.transport_mode, Some(TransportMode::PublicTransport));
        assert!(profile.has_respiratory_risk());
    }

    #[test]
    fn blank_and_null_fields_fall_back_to_defaults() {
        let profile: UserHealthProfile = serde_json::from_str(
            r#"{"ageYears": "", "asthma": null, "activityLevel": "", "sex": "  "}"#,
        )
        .unwrap();
        assert_eq!(profile, UserHealthProfile::default());
    }

    #[test]
    fn checkbox_booleans_map_to_answers() {
        let profile: UserHealthProfile =
            serde_json::from_str(r#"{"allergies": true, "diabetes": false}"#).unwrap();
        assert_eq!(profile.allergies, Answer::Yes);
        assert_eq!(profile.diabetes, Answer::No);
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let err = serde_json::from_str::<UserHealthProfile>(r#"{"activityLevel": "Extreme"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown activity level label"));

        let err = serde_json::from_str::<UserHealthProfile>(r#"{"ageYears": "seventy"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid age"));

        let err = serde_json::from_str::<UserHealthProfile>(r#"{"ageYears": -4}"#).unwrap_err();
        assert!(err.to_string().contains("invalid age"));
    }

    #[test]
    fn serialized_profile_reads_back_unchanged() {
        let profile = UserHealthProfile {
            age_years: 52,
            heat_sensitive: Answer::Yes,
            activity_level: Some(ActivityLevel::Moderate),
            outdoor_exposure_hours: Some(OutdoorExposure::UnderTwoHours),
            transport_mode: Some(TransportMode::Bicycle),
            ..UserHealthProfile::default()
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains(r#""outdoorExposureHours":"<2h""#));
        let parsed: UserHealthProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, profile);
    }

    #[test]
    fn thresholds_partition_each_policy() {
        let personalized = ScoringPolicy::Personalized;
        assert_eq!(personalized.classify(0), RiskLevel::Low);
        assert_eq!(personalized.classify(5), RiskLevel::Low);
        assert_eq!(personalized.classify(6), RiskLevel::Medium);
        assert_eq!(personalized.classify(12), RiskLevel::Medium);
        assert_eq!(personalized.classify(13), RiskLevel::High);

        let basic = ScoringPolicy::Basic;
        assert_eq!(basic.classify(2), RiskLevel::Low);
        assert_eq!(basic.classify(3), RiskLevel::Medium);
        assert_eq!(basic.classify(5), RiskLevel::Medium);
        assert_eq!(basic.classify(6), RiskLevel::High);
    }

    #[test]
    fn color_follows_level() {
        let verdict = RiskVerdict::classify(9, ScoringPolicy::Basic);
        assert_eq!(verdict.level, RiskLevel::High);
        assert_eq!(verdict.color_tag, ColorTag::Red);
        assert_eq!(RiskLevel::Medium.color(), ColorTag::Yellow);
        assert_eq!(RiskLevel::Low.color(), ColorTag::Green);
    }

    fn reading_with_humidity(humidity: &str) -> serde_json::Result<WeatherReading> {
        serde_json::from_str(&format!(
            r#"{{"city": "Lima", "temperatureC": 21.0, "feelsLikeC": 21.0, "humidityPct": {humidity}}}"#
        ))
    }

    #[test]
    fn fractional_humidity_is_rounded() {
        assert_eq!(reading_with_humidity("72.4").unwrap().humidity_pct, 72);
        assert_eq!(reading_with_humidity("80.6").unwrap().humidity_pct, 81);
        assert_eq!(reading_with_humidity("100").unwrap().humidity_pct, 100);
        assert_eq!(reading_with_humidity("0").unwrap().humidity_pct, 0);
    }

    #[test]
    fn humidity_outside_percent_range_is_rejected() {
        for humidity in ["100.5", "255", "-1"] {
            let err = reading_with_humidity(humidity).unwrap_err();
            assert!(err.to_string().contains("humidity must be between 0 and 100"));
        }
    }

    #[test]
    fn policy_follows_profile_presence() {
        let profile = UserHealthProfile::default();
        assert_eq!(
            ScoringPolicy::for_profile(Some(&profile)),
            ScoringPolicy::Personalized
        );
        assert_eq!(ScoringPolicy::for_profile(None), ScoringPolicy::Basic);
    }
}

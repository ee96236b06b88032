use std::fmt::Write;

use crate::advisor::Assessment;
use crate::models::ScoringPolicy;

fn policy_label(policy: ScoringPolicy) -> &'static str {
    match policy {
        ScoringPolicy::Personalized => "personalized (health profile applied)",
        ScoringPolicy::Basic => "basic (no health profile)",
    }
}

pub fn build_report(assessment: &Assessment) -> String {
    let weather = &assessment.weather;
    let air = &assessment.air;
    let noise = &assessment.noise;
    let verdict = &assessment.verdict;

    let mut output = String::new();
    let location = if weather.country_code.is_empty() {
        assessment.city.clone()
    } else {
        format!("{}, {}", assessment.city, weather.country_code)
    };

    let _ = writeln!(output, "# Environmental Health Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        location,
        assessment.assessed_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Conditions");

    let description = if weather.description.is_empty() {
        String::new()
    } else {
        format!(" ({})", weather.description)
    };
    let _ = writeln!(
        output,
        "- Temperature: {:.1} °C, feels like {:.1} °C{}",
        weather.temperature_c, weather.feels_like_c, description
    );
    let _ = writeln!(output, "- Humidity: {}%", weather.humidity_pct);
    let _ = writeln!(
        output,
        "- Air quality: AQI {} ({}), PM2.5 {:.0}, PM10 {:.0}",
        air.aqi, air.category, air.pm25, air.pm10
    );
    let _ = writeln!(
        output,
        "- Noise: {:.0} dB, likely source {}",
        noise.noise_db, noise.likely_source
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk");
    let _ = writeln!(
        output,
        "- Level {} ({}) with score {}",
        verdict.level, verdict.color_tag, verdict.score
    );
    let _ = writeln!(output, "- Scoring: {}", policy_label(assessment.policy));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendations");
    for message in &assessment.recommendations.messages {
        let _ = writeln!(output, "- {message}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Suggested Window");
    let _ = writeln!(output, "{}", assessment.recommendations.suggested_window);

    output
}

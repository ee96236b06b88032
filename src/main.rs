use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod advisor;
mod models;
mod providers;
mod recommend;
mod report;
mod risk;

use models::{AirQualityReading, NoiseReading, WeatherReading};
use providers::{FixedAirQuality, FixedNoise, JsonWeather, StaticWeather, WeatherSource};

#[derive(Parser)]
#[command(name = "enviro-risk-advisor")]
#[command(about = "Personalized environmental health risk advisor", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score current conditions for a city and print recommendations
    Assess(AssessArgs),
    /// Show how a profile file is read, with defaults filled in
    Profile {
        #[arg(long, env = "ADVISOR_PROFILE")]
        profile: PathBuf,
    },
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("weather")
        .args(["temp", "weather_json"])
        .multiple(false)
))]
struct AssessArgs {
    #[arg(long)]
    city: String,
    #[arg(long, default_value = "", conflicts_with = "weather_json")]
    country: String,
    /// Current temperature in °C
    #[arg(long, allow_negative_numbers = true)]
    temp: Option<f64>,
    /// Apparent temperature in °C, defaults to --temp
    #[arg(long, allow_negative_numbers = true, conflicts_with = "weather_json")]
    feels_like: Option<f64>,
    #[arg(
        long,
        default_value_t = 50,
        value_parser = clap::value_parser!(u8).range(0..=100),
        conflicts_with = "weather_json"
    )]
    humidity: u8,
    #[arg(long, default_value = "", conflicts_with = "weather_json")]
    description: String,
    /// Read the weather reading from a JSON file instead
    #[arg(long)]
    weather_json: Option<PathBuf>,
    /// Health profile (JSON); without it the basic rule set is used
    #[arg(long, env = "ADVISOR_PROFILE")]
    profile: Option<PathBuf>,
    #[arg(long, env = "ADVISOR_AQI", default_value_t = 80, value_parser = clap::value_parser!(u16).range(0..=500))]
    aqi: u16,
    #[arg(long, env = "ADVISOR_PM25", default_value_t = 35.0)]
    pm25: f64,
    #[arg(long, env = "ADVISOR_PM10", default_value_t = 60.0)]
    pm10: f64,
    #[arg(long, env = "ADVISOR_AIR_CATEGORY", default_value = "Moderate")]
    air_category: String,
    #[arg(long, env = "ADVISOR_NOISE_DB", default_value_t = 65.0)]
    noise_db: f64,
    #[arg(long, env = "ADVISOR_NOISE_SOURCE", default_value = "Vehicle traffic")]
    noise_source: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,
    /// Write the output to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn weather_source(args: &AssessArgs) -> Box<dyn WeatherSource> {
    if let Some(path) = &args.weather_json {
        return Box::new(JsonWeather { path: path.clone() });
    }
    let reading = args.temp.map(|temperature_c| WeatherReading {
        city: args.city.clone(),
        country_code: args.country.clone(),
        temperature_c,
        feels_like_c: args.feels_like.unwrap_or(temperature_c),
        humidity_pct: args.humidity,
        description: args.description.clone(),
    });
    Box::new(StaticWeather { reading })
}

fn run_assess(args: AssessArgs) -> anyhow::Result<()> {
    let profile = args
        .profile
        .as_deref()
        .map(providers::load_profile)
        .transpose()?;
    let air = FixedAirQuality {
        reading: AirQualityReading {
            pm25: args.pm25,
            pm10: args.pm10,
            aqi: args.aqi,
            category: args.air_category.clone(),
        },
    };
    let noise = FixedNoise {
        reading: NoiseReading {
            noise_db: args.noise_db,
            likely_source: args.noise_source.clone(),
        },
    };

    let source = weather_source(&args);
    let assessment = advisor::assess(
        &args.city,
        Utc::now(),
        source.as_ref(),
        &air,
        &noise,
        profile.as_ref(),
    )?;

    let rendered = match args.format {
        OutputFormat::Markdown => report::build_report(&assessment),
        OutputFormat::Json => serde_json::to_string_pretty(&assessment)?,
    };

    match args.out {
        Some(out) => {
            std::fs::write(&out, rendered)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Assess(args) => run_assess(args)?,
        Commands::Profile { profile } => {
            let profile = providers::load_profile(&profile)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
    }

    Ok(())
}

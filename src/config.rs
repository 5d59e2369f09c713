//! Run-scoped configuration.
//!
//! [`StationConfig`] holds the station credentials and endpoints, resolved from
//! CLI flags or the environment (`.env` is loaded by the binary). [`PipelineConfig`]
//! selects the conversion and naming policy; the three historical report
//! flavours are available as [`Profile`] presets.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Args, ValueEnum};

use crate::error::WeatherError;
use crate::units::{Conversions, RainfallUnit, SolarPolicy};

pub const DEFAULT_BASE_URL: &str = "https://app.realmfive.com";
pub const DEFAULT_S3_PREFIX: &str = "dashboard/data";

/// Metrics collected for the hourly rollup, in output order.
pub static HOURLY_METRICS: &[&str] = &[
    "dew_point_c",
    "temperature_c",
    "sea_level_pressure_hPa",
    "wind_speed_kph",
    "wind_direction_degrees",
    "wind_gust_kph_max",
    "solar_radiation_watts_per_meter_squared",
    "humidity_percent",
    "pressure_hPa",
    "rainfall_in",
];

/// Source metric name to its US-unit output name.
static CANONICAL_NAMES: &[(&str, &str)] = &[
    ("dew_point_c", "dew_point"),
    ("temperature_c", "temperature"),
    ("sea_level_pressure_hPa", "sea_level_pressure"),
    ("wind_speed_kph", "wind_speed"),
    ("wind_direction_degrees", "wind_direction"),
    ("wind_gust_kph_max", "wind_gust"),
    ("solar_radiation_watts_per_meter_squared", "solar_radiation"),
    ("humidity_percent", "humidity"),
    ("pressure_hPa", "pressure"),
    ("rainfall_in", "rainfall"),
];

/// Station API credentials and publish destination.
#[derive(Debug, Clone, Args)]
pub struct StationConfig {
    /// Station API key
    #[arg(long, env = "REALM5_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Weather station device EUI
    #[arg(long, env = "WEATHER_STATION_DEVICE")]
    pub device: Option<String>,

    /// Station API base URL
    #[arg(long, env = "REALM5_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// S3 bucket to publish artifacts to; publishing is skipped when unset
    #[arg(long, env = "AWS_BUCKET_NAME")]
    pub s3_bucket: Option<String>,

    /// Key prefix for published artifacts
    #[arg(long, env = "AWS_S3_PREFIX", default_value = DEFAULT_S3_PREFIX)]
    pub s3_prefix: String,

    /// Gzip artifacts before publishing
    #[arg(long, default_value_t = false)]
    pub gzip: bool,
}

/// Joins a key prefix and a file name, tolerating an empty or slash-terminated prefix.
pub fn object_key(prefix: &str, file_name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{prefix}/{file_name}")
    }
}

/// Named presets for the report flavours that have been published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Profile {
    /// Dashboard feed: tenths rainfall, raw solar, canonical keys, fixed file name.
    #[default]
    Dashboard,
    /// Station report: tenths rainfall, area-scaled solar, source keys, hour-stamped file.
    Station,
    /// Observation report: millimetre rainfall, area-scaled solar, source keys, hour-stamped file.
    Observation,
}

/// How hourly output keys are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum KeyNaming {
    /// `temperature_c` becomes `temperature`, and so on.
    #[default]
    Canonical,
    /// Keep the station's metric names.
    Source,
}

impl KeyNaming {
    pub fn output_key<'a>(self, metric: &'a str) -> &'a str {
        match self {
            Self::Source => metric,
            Self::Canonical => CANONICAL_NAMES
                .iter()
                .find(|(source, _)| *source == metric)
                .map(|(_, canonical)| *canonical)
                .unwrap_or(metric),
        }
    }
}

/// File naming for the hourly artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourlyFileName {
    /// Always `weather_summary.json`, overwritten every hour.
    Fixed,
    /// `weather_summary_YYYY-MM-DDTHH.json`.
    HourStamped,
}

impl HourlyFileName {
    pub fn file_name(self, hour_start: DateTime<Utc>) -> String {
        match self {
            Self::Fixed => "weather_summary.json".to_string(),
            Self::HourStamped => {
                format!("weather_summary_{}.json", hour_start.format("%Y-%m-%dT%H"))
            }
        }
    }
}

/// Everything the aggregators need to know, threaded explicitly through a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub conversions: Conversions,
    pub key_naming: KeyNaming,
    pub hourly_file: HourlyFileName,
    /// Reference timezone for calendar grouping.
    pub timezone: Tz,
    pub temperature_metric: String,
    pub rainfall_metric: String,
    pub hourly_metrics: Vec<String>,
}

impl PipelineConfig {
    pub fn from_profile(profile: Profile) -> Self {
        let (rainfall, solar, key_naming, hourly_file) = match profile {
            Profile::Dashboard => (
                RainfallUnit::Tenths,
                SolarPolicy::Passthrough,
                KeyNaming::Canonical,
                HourlyFileName::Fixed,
            ),
            Profile::Station => (
                RainfallUnit::Tenths,
                SolarPolicy::AreaScaled,
                KeyNaming::Source,
                HourlyFileName::HourStamped,
            ),
            Profile::Observation => (
                RainfallUnit::Millimetres,
                SolarPolicy::AreaScaled,
                KeyNaming::Source,
                HourlyFileName::HourStamped,
            ),
        };

        Self {
            conversions: Conversions::new(rainfall, solar),
            key_naming,
            hourly_file,
            timezone: chrono_tz::US::Eastern,
            temperature_metric: "temperature".to_string(),
            rainfall_metric: "rainfall".to_string(),
            hourly_metrics: HOURLY_METRICS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_rainfall_unit(mut self, unit: RainfallUnit) -> Self {
        self.conversions.rainfall = unit;
        self
    }

    pub fn with_solar_policy(mut self, policy: SolarPolicy) -> Self {
        self.conversions.solar = policy;
        self
    }

    pub fn with_key_naming(mut self, naming: KeyNaming) -> Self {
        self.key_naming = naming;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_profile(Profile::default())
    }
}

/// CLI flags that build a [`PipelineConfig`].
#[derive(Debug, Clone, Args)]
pub struct PipelineArgs {
    /// Report flavour to produce
    #[arg(long, value_enum, default_value_t = Profile::Dashboard)]
    pub profile: Profile,

    /// Override the profile's raw rainfall unit
    #[arg(long, value_enum)]
    pub rainfall_unit: Option<RainfallUnit>,

    /// Override the profile's solar radiation policy
    #[arg(long, value_enum)]
    pub solar_policy: Option<SolarPolicy>,

    /// Override the profile's hourly key naming
    #[arg(long, value_enum)]
    pub key_naming: Option<KeyNaming>,

    /// Reference timezone for calendar days (IANA name)
    #[arg(long, env = "WEATHER_TIMEZONE", default_value = "US/Eastern")]
    pub timezone: String,
}

impl PipelineArgs {
    pub fn to_config(&self) -> Result<PipelineConfig, WeatherError> {
        let timezone: Tz = parse_timezone(&self.timezone)?;
        let mut config = PipelineConfig::from_profile(self.profile).with_timezone(timezone);
        if let Some(unit) = self.rainfall_unit {
            config = config.with_rainfall_unit(unit);
        }
        if let Some(policy) = self.solar_policy {
            config = config.with_solar_policy(policy);
        }
        if let Some(naming) = self.key_naming {
            config = config.with_key_naming(naming);
        }
        Ok(config)
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, WeatherError> {
    name.parse::<Tz>()
        .map_err(|_| WeatherError::UnknownTimezone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_profiles() {
        let dashboard = PipelineConfig::from_profile(Profile::Dashboard);
        assert_eq!(dashboard.conversions.rainfall, RainfallUnit::Tenths);
        assert_eq!(dashboard.conversions.solar, SolarPolicy::Passthrough);
        assert_eq!(dashboard.key_naming, KeyNaming::Canonical);

        let observation = PipelineConfig::from_profile(Profile::Observation);
        assert_eq!(observation.conversions.rainfall, RainfallUnit::Millimetres);
        assert_eq!(observation.conversions.solar, SolarPolicy::AreaScaled);
        assert_eq!(observation.key_naming, KeyNaming::Source);
        assert_eq!(observation.hourly_metrics.len(), 10);
    }

    #[test]
    fn test_overrides_apply_on_top_of_profile() {
        let args = PipelineArgs {
            profile: Profile::Station,
            rainfall_unit: Some(RainfallUnit::Millimetres),
            solar_policy: None,
            key_naming: Some(KeyNaming::Canonical),
            timezone: "UTC".to_string(),
        };

        let config = args.to_config().unwrap();

        assert_eq!(config.conversions.rainfall, RainfallUnit::Millimetres);
        assert_eq!(config.conversions.solar, SolarPolicy::AreaScaled);
        assert_eq!(config.key_naming, KeyNaming::Canonical);
        assert_eq!(config.timezone, chrono_tz::UTC);
    }

    #[test]
    fn test_unknown_timezone() {
        assert!(matches!(
            parse_timezone("Mars/Olympus_Mons"),
            Err(WeatherError::UnknownTimezone(_))
        ));
    }

    #[test]
    fn test_output_key() {
        assert_eq!(KeyNaming::Canonical.output_key("temperature_c"), "temperature");
        assert_eq!(KeyNaming::Canonical.output_key("rainfall_in"), "rainfall");
        assert_eq!(KeyNaming::Canonical.output_key("leaf_wetness"), "leaf_wetness");
        assert_eq!(KeyNaming::Source.output_key("temperature_c"), "temperature_c");
    }

    #[test]
    fn test_hourly_file_name() {
        let hour = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

        assert_eq!(HourlyFileName::Fixed.file_name(hour), "weather_summary.json");
        assert_eq!(
            HourlyFileName::HourStamped.file_name(hour),
            "weather_summary_2025-06-01T09.json"
        );
    }

    #[test]
    fn test_object_key() {
        assert_eq!(object_key("dashboard/data", "a.csv"), "dashboard/data/a.csv");
        assert_eq!(object_key("dashboard/data/", "a.csv"), "dashboard/data/a.csv");
        assert_eq!(object_key("", "a.csv"), "a.csv");
    }
}

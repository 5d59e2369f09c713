//! Metric to US customary unit conversion.
//!
//! Raw station values arrive in metric units (°C, hPa, kph, W/m², and a
//! station-specific rainfall unit). [`Conversions::convert`] maps a value to
//! its US unit and rounds it the same way the published reports always have.

use clap::ValueEnum;

/// Conversion rule chosen by metric name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricClass {
    Temperature,
    Rainfall,
    Pressure,
    WindSpeed,
    SolarRadiation,
    Other,
}

impl MetricClass {
    pub fn of(metric: &str) -> Self {
        match metric {
            "temperature_c" | "dew_point_c" | "temperature" | "dew_point" => Self::Temperature,
            "rainfall_in" | "rainfall" => Self::Rainfall,
            "wind_speed_kph" | "wind_gust_kph_max" => Self::WindSpeed,
            "solar_radiation_watts_per_meter_squared" => Self::SolarRadiation,
            m if m.contains("pressure") => Self::Pressure,
            _ => Self::Other,
        }
    }
}

/// Raw rainfall unit reported by the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RainfallUnit {
    /// Accumulation counter in tenths of an inch.
    #[default]
    Tenths,
    /// Millimetres.
    Millimetres,
}

impl RainfallUnit {
    pub fn factor(self) -> f64 {
        match self {
            Self::Tenths => 0.1,
            Self::Millimetres => 0.0393701,
        }
    }
}

/// What to do with solar radiation readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SolarPolicy {
    /// Keep W/m² and only round.
    #[default]
    Passthrough,
    /// Scale W/m² to W/mi².
    AreaScaled,
}

const SQUARE_METRES_PER_SQUARE_MILE: f64 = 2589988.11;
const INHG_PER_HPA: f64 = 0.02953;
const MPH_PER_KPH: f64 = 0.621371;

/// The active conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Conversions {
    pub rainfall: RainfallUnit,
    pub solar: SolarPolicy,
}

impl Conversions {
    pub fn new(rainfall: RainfallUnit, solar: SolarPolicy) -> Self {
        Self { rainfall, solar }
    }

    /// Converts `value` for `metric` to US units. Absent stays absent.
    pub fn convert(&self, metric: &str, value: Option<f64>) -> Option<f64> {
        let value = value?;
        let converted = match MetricClass::of(metric) {
            MetricClass::Temperature => round_to(value * 9.0 / 5.0 + 32.0, 1),
            MetricClass::Rainfall => round_to(value * self.rainfall.factor(), 2),
            MetricClass::Pressure => round_to(value * INHG_PER_HPA, 2),
            MetricClass::WindSpeed => round_to(value * MPH_PER_KPH, 1),
            MetricClass::SolarRadiation => match self.solar {
                SolarPolicy::Passthrough => round_to(value, 1),
                SolarPolicy::AreaScaled => round_to(value * SQUARE_METRES_PER_SQUARE_MILE, 1),
            },
            MetricClass::Other if value.fract() != 0.0 => round_to(value, 1),
            MetricClass::Other => value,
        };
        Some(converted)
    }
}

/// Rounds to `places` decimals using the exact decimal expansion of `value`.
///
/// Formatting at a fixed precision rounds the true binary value, so
/// `round_to(2.675, 2)` is `2.67` because 2.675 is stored as 2.67499999...
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.places$}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(metric: &str, value: f64) -> Option<f64> {
        Conversions::default().convert(metric, Some(value))
    }

    #[test]
    fn test_metric_class() {
        assert_eq!(MetricClass::of("temperature_c"), MetricClass::Temperature);
        assert_eq!(MetricClass::of("dew_point_c"), MetricClass::Temperature);
        assert_eq!(MetricClass::of("rainfall_in"), MetricClass::Rainfall);
        assert_eq!(MetricClass::of("sea_level_pressure_hPa"), MetricClass::Pressure);
        assert_eq!(MetricClass::of("pressure_hPa"), MetricClass::Pressure);
        assert_eq!(MetricClass::of("wind_gust_kph_max"), MetricClass::WindSpeed);
        assert_eq!(
            MetricClass::of("solar_radiation_watts_per_meter_squared"),
            MetricClass::SolarRadiation
        );
        assert_eq!(MetricClass::of("humidity_percent"), MetricClass::Other);
    }

    #[test]
    fn test_temperature() {
        assert_eq!(convert("temperature_c", 0.0), Some(32.0));
        assert_eq!(convert("temperature_c", 100.0), Some(212.0));
        assert_eq!(convert("dew_point_c", 21.3), Some(70.3));
        assert_eq!(convert("temperature", -40.0), Some(-40.0));
    }

    #[test]
    fn test_rainfall_units() {
        let tenths = Conversions::new(RainfallUnit::Tenths, SolarPolicy::Passthrough);
        let mm = Conversions::new(RainfallUnit::Millimetres, SolarPolicy::Passthrough);

        assert_eq!(tenths.convert("rainfall_in", Some(5.0)), Some(0.5));
        assert_eq!(mm.convert("rainfall_in", Some(25.4)), Some(1.0));
    }

    #[test]
    fn test_pressure_and_wind() {
        assert_eq!(convert("pressure_hPa", 1013.25), Some(29.92));
        assert_eq!(convert("wind_speed_kph", 10.0), Some(6.2));
        assert_eq!(convert("wind_gust_kph_max", 100.0), Some(62.1));
    }

    #[test]
    fn test_solar_policies() {
        let passthrough = Conversions::new(RainfallUnit::Tenths, SolarPolicy::Passthrough);
        let scaled = Conversions::new(RainfallUnit::Tenths, SolarPolicy::AreaScaled);
        let metric = "solar_radiation_watts_per_meter_squared";

        assert_eq!(passthrough.convert(metric, Some(512.34)), Some(512.3));
        assert_eq!(scaled.convert(metric, Some(1.0)), Some(2589988.1));
    }

    #[test]
    fn test_other_metrics() {
        assert_eq!(convert("humidity_percent", 54.0), Some(54.0));
        assert_eq!(convert("humidity_percent", 54.26), Some(54.3));
        assert_eq!(convert("wind_direction_degrees", 182.5), Some(182.5));
    }

    #[test]
    fn test_absent_stays_absent() {
        let c = Conversions::default();
        for metric in ["temperature_c", "rainfall_in", "pressure_hPa", "humidity_percent"] {
            assert_eq!(c.convert(metric, None), None);
        }
    }

    #[test]
    fn test_convert_is_pure() {
        let c = Conversions::default();
        let first = c.convert("temperature_c", Some(17.77));
        let second = c.convert("temperature_c", Some(17.77));
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_to_uses_binary_value() {
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(1.26, 1), 1.3);
        assert_eq!(round_to(-0.04, 1), -0.0);
        assert!(round_to(f64::NAN, 1).is_nan());
    }
}

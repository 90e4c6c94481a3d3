use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of forecast samples the provider reports per day (one every 3 hours).
pub const SAMPLES_PER_DAY: usize = 8;

/// A trimmed, non-empty city name. Case and inner whitespace are passed
/// through to the provider untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CityQuery(String);

impl CityQuery {
    /// Trim `input`; `None` if nothing is left.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// For compile-time constants that are known to be trimmed and non-empty.
    pub(crate) fn from_known(name: &str) -> Self {
        debug_assert!(Self::parse(name).is_some());
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CityQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CityQuery {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| "city name must not be blank".to_string())
    }
}

impl From<CityQuery> for String {
    fn from(value: CityQuery) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
    pub observed_at: DateTime<Utc>,
}

impl CurrentConditions {
    pub fn icon_url(&self) -> String {
        icon_url(&self.icon)
    }

    pub fn rounded_temperature(&self) -> i64 {
        self.temperature_c.round() as i64
    }
}

/// One time-stamped entry of the provider's forecast series.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub at: DateTime<Utc>,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}

impl ForecastSample {
    /// Short weekday label, e.g. "Mon".
    pub fn weekday(&self) -> String {
        self.at.format("%a").to_string()
    }

    pub fn icon_url(&self) -> String {
        icon_url(&self.icon)
    }

    pub fn rounded_temperature(&self) -> i64 {
        self.temperature_c.round() as i64
    }
}

pub type ForecastSeries = Vec<ForecastSample>;

/// Result of one successful lookup: both payloads or nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub current: CurrentConditions,
    pub forecast: ForecastSeries,
}

/// Pick one representative sample per day: every `SAMPLES_PER_DAY`-th entry,
/// starting with the first.
pub fn daily_forecast(series: &[ForecastSample]) -> Vec<ForecastSample> {
    series.iter().step_by(SAMPLES_PER_DAY).cloned().collect()
}

fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn sample(index: usize) -> ForecastSample {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        ForecastSample {
            at: start + chrono::Duration::hours(3 * index as i64),
            temperature_c: index as f64,
            humidity_pct: 50,
            wind_speed: 3.5,
            description: "clear sky".into(),
            icon: "01d".into(),
        }
    }

    pub fn series(len: usize) -> ForecastSeries {
        (0..len).map(sample).collect()
    }

    pub fn current(name: &str) -> CurrentConditions {
        CurrentConditions {
            name: name.to_string(),
            temperature_c: 21.6,
            feels_like_c: 20.9,
            humidity_pct: 40,
            wind_speed: 4.1,
            description: "few clouds".into(),
            icon: "02d".into(),
            observed_at: Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap(),
        }
    }

    pub fn lookup(name: &str) -> Lookup {
        Lookup {
            current: current(name),
            forecast: series(40),
        }
    }
}

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    error::LookupError,
    model::{CityQuery, CurrentConditions, ForecastSample, ForecastSeries, Lookup},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Unit system sent with every request.
const UNITS: &str = "metric";

/// Anything that can turn a city into current conditions plus a forecast.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn lookup(&self, city: &CityQuery) -> Result<Lookup, LookupError>;
}

/// Where to reach the provider and which credential to present.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    config: ClientConfig,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        city: &CityQuery,
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'));

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city.as_str()),
                ("appid", self.config.api_key.as_str()),
                ("units", UNITS),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {endpoint} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse OpenWeather {endpoint} JSON"))
    }

    async fn fetch_current(&self, city: &CityQuery) -> Result<CurrentConditions> {
        let parsed: OwCurrentResponse = self.get_json("weather", city).await?;
        let weather = first_weather(parsed.weather, "current")?;

        Ok(CurrentConditions {
            name: parsed.name,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            description: weather.description,
            icon: weather.icon,
            observed_at: unix_to_utc(parsed.dt)?,
        })
    }

    async fn fetch_forecast(&self, city: &CityQuery) -> Result<ForecastSeries> {
        let parsed: OwForecastResponse = self.get_json("forecast", city).await?;

        parsed
            .list
            .into_iter()
            .map(|entry| {
                let weather = first_weather(entry.weather, "forecast")?;
                Ok(ForecastSample {
                    at: unix_to_utc(entry.dt)?,
                    temperature_c: entry.main.temp,
                    humidity_pct: entry.main.humidity,
                    wind_speed: entry.wind.speed,
                    description: weather.description,
                    icon: weather.icon,
                })
            })
            .collect()
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn lookup(&self, city: &CityQuery) -> Result<Lookup, LookupError> {
        // Both requests are in flight together; neither result is surfaced alone.
        let (current, forecast) = tokio::join!(self.fetch_current(city), self.fetch_forecast(city));

        match (current, forecast) {
            (Ok(current), Ok(forecast)) => Ok(Lookup { current, forecast }),
            (Err(e), _) | (_, Err(e)) => Err(LookupError::failed(e)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn first_weather(weather: Vec<OwWeather>, what: &str) -> Result<OwWeather> {
    weather
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("OpenWeather {what} response has an empty weather array"))
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0).ok_or_else(|| anyhow!("timestamp {ts} is out of range"))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

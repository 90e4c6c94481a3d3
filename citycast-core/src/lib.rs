//! Core library for `citycast`.
//!
//! This crate defines:
//! - The OpenWeather client that fetches current conditions and the forecast
//!   series for a city in one lookup
//! - Daily sampling of the forecast series
//! - The bounded recent-search history and its key-value persistence
//! - The lookup controller whose state the CLI renders
//!
//! It is used by `citycast-cli`, but can also drive other front ends.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod model;
pub mod store;

pub use client::{ClientConfig, OpenWeatherClient, WeatherSource};
pub use config::Config;
pub use controller::{LookupController, LookupPhase, LookupState, LookupTicket, Theme};
pub use error::{LookupError, StoreError};
pub use history::RecentSearches;
pub use model::{CityQuery, CurrentConditions, ForecastSample, ForecastSeries, Lookup};
pub use store::{FileStore, KeyValueStore, MemoryStore};

//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - A read-through client for current conditions
//! - A file-backed response cache with time-based expiry
//! - The OpenWeather provider and payload decoding
//! - Unit conversion, location/URL building and configuration
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod units;

pub use cache::{CacheLookup, CacheStore};
pub use client::{Client, ClientConfig};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{CacheError, DecodeError, WeatherError};
pub use location::{Query, location_from_args};
pub use model::Conditions;
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use units::TemperatureUnit;

use async_trait::async_trait;
use std::fmt::Debug;
use url::Url;

use crate::{error::WeatherError, model::Conditions};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Upstream weather source. Returns the decoded record with raw Kelvin temperatures;
/// conversion and caching are the client's job.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, url: &Url) -> Result<Conditions, WeatherError>;
}

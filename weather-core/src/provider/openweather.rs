use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{
    error::{DecodeError, WeatherError},
    location::redact_token,
    model::Conditions,
};

use super::WeatherProvider;

#[derive(Debug, Clone, Default)]
pub struct OpenWeatherProvider {
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    pub fn with_http_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, url: &Url) -> Result<Conditions, WeatherError> {
        debug!(url = %redact_token(url.as_str()), "requesting current conditions");

        let res = self.http.get(url.clone()).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(WeatherError::UpstreamStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body = res.bytes().await?;
        Ok(decode(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    weather: Vec<OwWeather>,
    main: OwMain,
}

/// Decode an OpenWeather current-weather payload. Temperatures stay in Kelvin.
pub fn decode(body: &[u8]) -> Result<Conditions, DecodeError> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(DecodeError::NotJson)?;
    let parsed: OwCurrentResponse =
        serde_json::from_value(value).map_err(DecodeError::UnexpectedShape)?;

    let weather = parsed.weather.first().ok_or(DecodeError::NoWeather)?;

    Ok(Conditions {
        name: parsed.name,
        summary: weather.main.clone(),
        description: weather.description.clone(),
        temperature: parsed.main.temp,
        temp_min: parsed.main.temp_min,
        temp_max: parsed.main.temp_max,
        longitude: parsed.coord.lon,
        latitude: parsed.coord.lat,
        ..Default::default()
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

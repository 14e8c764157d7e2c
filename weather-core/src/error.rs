use std::path::PathBuf;

/// Errors surfaced by [`crate::Client::current`] and the location helpers.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("input location cannot be empty")]
    EmptyLocation,
    #[error("invalid API endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("received HTTP status {status} on request: {body}")]
    UpstreamStatus { status: u16, body: String },
    #[error("failed to decode weather response: {0}")]
    Decode(#[from] DecodeError),
}

/// Why an upstream payload could not be turned into conditions.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("response body is not JSON: {0}")]
    NotJson(#[source] serde_json::Error),
    #[error("response JSON has an unexpected shape: {0}")]
    UnexpectedShape(#[source] serde_json::Error),
    #[error("response contains no weather entries")]
    NoWeather,
}

/// Cache store failures. Only `delete` reports these to callers as-is;
/// the fetch path logs and drops them.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache key cannot be empty")]
    InvalidKey,
    #[error("no cache entry for key '{key}'")]
    NotFound { key: String },
    #[error("cache I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to replace cache entry: {0}")]
    Persist(#[from] tempfile::PersistError),
}

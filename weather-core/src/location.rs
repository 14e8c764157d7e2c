use url::Url;

use crate::error::WeatherError;

/// OpenWeather current-conditions endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org/data/2.5/weather";

/// What a client asks the upstream for.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Free-text location, already encoded by [`location_from_args`] or equivalent.
    Location(String),
    Coordinates { lat: f64, lon: f64 },
}

impl Query {
    /// Cache key for this query.
    ///
    /// Location keys are lowercased because the upstream matches names
    /// case-insensitively. Coordinates are truncated to whole degrees, so all
    /// points inside the same one-degree cell share an entry.
    pub fn cache_key(&self) -> String {
        match self {
            Query::Location(location) => location.to_lowercase(),
            Query::Coordinates { lat, lon } => {
                format!("{}_{}", lat.trunc() as i64, lon.trunc() as i64)
            }
        }
    }

    pub fn url(&self, base: &str, token: &str) -> Result<Url, WeatherError> {
        match self {
            Query::Location(location) => url_by_location(base, location, token),
            Query::Coordinates { lat, lon } => url_by_coordinates(base, *lat, *lon, token),
        }
    }
}

/// Request target for a location query. The `%20` joins emitted by
/// [`location_from_args`] are decoded first; every parameter is then
/// form-encoded, so reserved characters cannot leak out of `q`.
pub fn url_by_location(base: &str, location: &str, token: &str) -> Result<Url, WeatherError> {
    let location = location.replace("%20", " ");
    Ok(Url::parse_with_params(
        base,
        &[("q", location.as_str()), ("appid", token)],
    )?)
}

pub fn url_by_coordinates(
    base: &str,
    lat: f64,
    lon: f64,
    token: &str,
) -> Result<Url, WeatherError> {
    Ok(Url::parse_with_params(
        base,
        &[
            ("lat", format!("{lat:.2}")),
            ("lon", format!("{lon:.2}")),
            ("appid", token.to_string()),
        ],
    )?)
}

/// Join command-line words into a location query.
///
/// Words are joined with an encoded space. A standalone `,` word is emitted
/// raw, and every word after it is appended with no separator at all.
pub fn location_from_args<S: AsRef<str>>(input: &[S]) -> Result<String, WeatherError> {
    if input.is_empty() {
        return Err(WeatherError::EmptyLocation);
    }

    let mut output = String::new();
    let mut unparsed_comma = false;
    for (i, word) in input.iter().map(AsRef::as_ref).enumerate() {
        if i > 0 && word != "," && !unparsed_comma {
            output.push_str("%20");
        } else if word == "," {
            unparsed_comma = true;
        }
        output.push_str(word);
    }

    Ok(output)
}

/// Hide the `appid` value so URLs can be logged.
pub(crate) fn redact_token(url: &str) -> String {
    match url.find("appid=") {
        Some(idx) => {
            let start = idx + "appid=".len();
            let end = url[start..].find('&').map_or(url.len(), |e| start + e);
            format!("{}***{}", &url[..start], &url[end..])
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn formats_url_by_location() {
        let got = url_by_location(DEFAULT_API_BASE, "London", "dummy_token").unwrap();
        assert_eq!(
            got.as_str(),
            "https://api.openweathermap.org/data/2.5/weather?q=London&appid=dummy_token"
        );
    }

    #[test]
    fn formats_url_by_coordinates() {
        let got = url_by_coordinates(DEFAULT_API_BASE, 44.0, 33.0, "dummy_token").unwrap();
        assert_eq!(
            got.as_str(),
            "https://api.openweathermap.org/data/2.5/weather?lat=44.00&lon=33.00&appid=dummy_token"
        );
    }

    #[test]
    fn encoded_spaces_reach_upstream_as_spaces() {
        let got = url_by_location(DEFAULT_API_BASE, "los%20angeles,%20us", "dummy_token").unwrap();
        assert_eq!(
            pairs(&got),
            [
                ("q".to_string(), "los angeles, us".to_string()),
                ("appid".to_string(), "dummy_token".to_string()),
            ]
        );
    }

    #[test]
    fn reserved_characters_stay_inside_the_location() {
        let query = Query::Location("new#york".into());
        let url = query.url(DEFAULT_API_BASE, "dummy_token").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(
            pairs(&url),
            [
                ("q".to_string(), "new#york".to_string()),
                ("appid".to_string(), "dummy_token".to_string()),
            ]
        );

        let query = Query::Location("a&appid=evil".into());
        let url = query.url(DEFAULT_API_BASE, "dummy_token").unwrap();
        assert_eq!(
            pairs(&url),
            [
                ("q".to_string(), "a&appid=evil".to_string()),
                ("appid".to_string(), "dummy_token".to_string()),
            ]
        );
    }

    #[test]
    fn token_is_encoded_too() {
        let url = url_by_location(DEFAULT_API_BASE, "london", "to#k&en").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(pairs(&url)[1], ("appid".to_string(), "to#k&en".to_string()));
    }

    #[test]
    fn invalid_base_is_an_error() {
        let err = url_by_location("not a url", "london", "dummy_token").unwrap_err();
        assert!(matches!(err, WeatherError::InvalidUrl(_)));
    }

    #[test]
    fn location_from_args_joins_words() {
        let cases: &[(&[&str], &str)] = &[
            (&["london"], "london"),
            (&["london,", "uk"], "london,%20uk"),
            (&["london", ",", "uk"], "london,uk"),
            (&["santo", "domingo"], "santo%20domingo"),
            (&["los", "angeles,", "us"], "los%20angeles,%20us"),
        ];

        for &(input, want) in cases {
            let got = location_from_args(input).expect("non-empty input");
            assert_eq!(got, want, "input: {input:?}");
        }
    }

    #[test]
    fn location_from_args_rejects_empty_input() {
        let err = location_from_args::<&str>(&[]).unwrap_err();
        assert!(matches!(err, WeatherError::EmptyLocation));
    }

    #[test]
    fn location_key_is_case_insensitive() {
        let a = Query::Location("London".into()).cache_key();
        let b = Query::Location("london".into()).cache_key();
        assert_eq!(a, b);
        assert_eq!(a, "london");
    }

    #[test]
    fn coordinate_key_truncates_to_whole_degrees() {
        let london = Query::Coordinates { lat: 51.51, lon: -0.13 };
        let nearby = Query::Coordinates { lat: 51.99, lon: -0.9 };
        assert_eq!(london.cache_key(), "51_0");
        assert_eq!(london.cache_key(), nearby.cache_key());

        let west = Query::Coordinates { lat: 40.7, lon: -74.0 };
        assert_eq!(west.cache_key(), "40_-74");
    }

    #[test]
    fn coordinate_keys_do_not_collide_across_digits() {
        let a = Query::Coordinates { lat: 5.0, lon: 10.0 };
        let b = Query::Coordinates { lat: 51.0, lon: 0.0 };
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn redacts_token_in_urls() {
        let url = url_by_location(DEFAULT_API_BASE, "london", "secret").unwrap();
        assert!(!redact_token(url.as_str()).contains("secret"));
        assert!(redact_token(url.as_str()).ends_with("appid=***"));
    }
}

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Select};
use tracing::debug;
use weather_core::{
    Client, ClientConfig, Config, Query, TemperatureUnit, config::TOKEN_ENV_VAR,
    location_from_args,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather",
    version,
    about = "Report the current weather conditions for a location"
)]
pub struct Cli {
    /// Log cache and network activity to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and output defaults.
    Configure,

    /// Show current conditions for a location or coordinate pair.
    Show {
        #[command(flatten)]
        query: QueryArgs,

        /// Unit: celsius (default), fahrenheit or kelvin; first letter works too.
        #[arg(short, long)]
        unit: Option<String>,

        /// Include name, description and min/max temperatures.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Remove the cached entry for a location or coordinate pair.
    Forget {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Print the directory holding cached responses.
    CacheDir,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Location, e.g. `london`, `santo domingo` or `london , uk`.
    #[arg(required_unless_present = "lat")]
    pub location: Vec<String>,

    /// Latitude; takes precedence over the location words.
    #[arg(
        long,
        visible_alias = "latitude",
        requires = "lon",
        allow_negative_numbers = true,
        value_parser = parse_coordinate
    )]
    pub lat: Option<f64>,

    /// Longitude; takes precedence over the location words.
    #[arg(
        long,
        visible_alias = "longitude",
        requires = "lat",
        allow_negative_numbers = true,
        value_parser = parse_coordinate
    )]
    pub lon: Option<f64>,
}

fn parse_coordinate(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{s}' is not a finite number"))
    }
}

impl QueryArgs {
    pub fn to_query(&self) -> Result<Query> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Query::Coordinates { lat, lon }),
            _ => Ok(Query::Location(location_from_args(self.location.as_slice())?)),
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config)?,
            Command::Show {
                query,
                unit,
                detailed,
            } => {
                let env_token = std::env::var(TOKEN_ENV_VAR).ok();
                let client_config =
                    show_config(&config, env_token, &query, unit.as_deref(), detailed)?;
                let client = Client::new(client_config)?;

                let cond = client.current().await?;
                println!("{cond}");
            }
            Command::Forget { query } => {
                let client_config = ClientConfig::new(
                    String::new(),
                    query.to_query()?,
                    config.cache_root(),
                );
                let client = Client::new(client_config)?;

                client.forget().with_context(|| {
                    format!("Failed to remove cache entry in {}", client.cache().root().display())
                })?;
                println!("Removed cached conditions for '{}'", client.cache_key());
            }
            Command::CacheDir => println!("{}", config.cache_root().display()),
        }

        Ok(())
    }
}

/// Merge flags, environment and the config file into a client configuration.
fn show_config(
    config: &Config,
    env_token: Option<String>,
    query: &QueryArgs,
    unit: Option<&str>,
    detailed: bool,
) -> Result<ClientConfig> {
    let token = config.resolve_token(env_token)?;

    let mut client_config = ClientConfig::new(token, query.to_query()?, config.cache_root());
    client_config.unit = unit.unwrap_or(config.unit().as_str()).to_string();
    client_config.detailed = detailed || config.detailed();
    client_config.cache_ttl = config.cache_ttl();

    debug!(
        cache_root = %client_config.cache_root.display(),
        unit = %client_config.unit,
        detailed = client_config.detailed,
        "resolved client configuration"
    );
    Ok(client_config)
}

fn configure(mut config: Config) -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let units = TemperatureUnit::all().to_vec();
    let current = units.iter().position(|u| *u == config.unit()).unwrap_or(0);
    let unit = Select::new("Default unit:", units)
        .with_starting_cursor(current)
        .prompt()?;

    let detailed = Confirm::new("Show detailed output by default?")
        .with_default(config.detailed())
        .prompt()?;

    config.api_key = Some(api_key.trim().to_string());
    config.unit = Some(unit);
    config.detailed = Some(detailed);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("weather").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    fn show_parts(cli: Cli) -> (QueryArgs, Option<String>, bool) {
        match cli.command {
            Command::Show {
                query,
                unit,
                detailed,
            } => (query, unit, detailed),
            other => panic!("expected show, got {other:?}"),
        }
    }

    fn test_config() -> Config {
        Config {
            api_key: Some("FILE_KEY".into()),
            cache_dir: Some(PathBuf::from("/tmp/weather-cli-test")),
            ..Default::default()
        }
    }

    #[test]
    fn show_joins_location_words() {
        let (query, unit, detailed) = show_parts(parse(&["show", "-u", "f", "-d", "santo", "domingo"]));

        assert_eq!(
            query.to_query().unwrap(),
            Query::Location("santo%20domingo".into())
        );
        assert_eq!(unit.as_deref(), Some("f"));
        assert!(detailed);
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let (query, _, _) = show_parts(parse(&["show", "--lat", "51.51", "--lon", "-0.13"]));

        assert_eq!(
            query.to_query().unwrap(),
            Query::Coordinates { lat: 51.51, lon: -0.13 }
        );
    }

    #[test]
    fn coordinates_require_both_halves() {
        let err = Cli::try_parse_from(["weather", "show", "--lat", "51.5"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        for args in [
            ["weather", "show", "--lat", "NaN", "--lon", "0"],
            ["weather", "show", "--lat", "0", "--lon", "inf"],
        ] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{args:?}");
        }
    }

    #[test]
    fn show_requires_a_location() {
        assert!(Cli::try_parse_from(["weather", "show"]).is_err());
    }

    #[test]
    fn flags_override_config_defaults() {
        let mut config = test_config();
        config.unit = Some(TemperatureUnit::Kelvin);
        let (query, unit, detailed) = show_parts(parse(&["show", "-u", "fahrenheit", "london"]));

        let client_config =
            show_config(&config, None, &query, unit.as_deref(), detailed).unwrap();

        assert_eq!(client_config.token, "FILE_KEY");
        assert_eq!(client_config.unit, "fahrenheit");
        assert!(!client_config.detailed);
        assert_eq!(client_config.cache_root, PathBuf::from("/tmp/weather-cli-test"));
    }

    #[test]
    fn config_defaults_apply_without_flags() {
        let mut config = test_config();
        config.unit = Some(TemperatureUnit::Kelvin);
        config.detailed = Some(true);
        let (query, unit, detailed) = show_parts(parse(&["show", "london"]));

        let client_config =
            show_config(&config, Some("ENV_KEY".into()), &query, unit.as_deref(), detailed)
                .unwrap();

        assert_eq!(client_config.token, "ENV_KEY");
        assert_eq!(client_config.unit, "kelvin");
        assert!(client_config.detailed);
    }

    #[test]
    fn show_without_token_errors() {
        let (query, unit, detailed) = show_parts(parse(&["show", "london"]));

        let err = show_config(&Config::default(), None, &query, unit.as_deref(), detailed)
            .unwrap_err();
        assert!(err.to_string().contains(TOKEN_ENV_VAR));
    }

    #[test]
    fn forget_parses_location() {
        let cli = parse(&["forget", "london", ",", "uk"]);
        let Command::Forget { query } = cli.command else {
            panic!("expected forget");
        };

        assert_eq!(query.to_query().unwrap().cache_key(), "london,uk");
    }

    #[test]
    fn verbose_is_global() {
        assert!(parse(&["show", "london", "-v"]).verbose);
        assert!(parse(&["-v", "cache-dir"]).verbose);
    }
}

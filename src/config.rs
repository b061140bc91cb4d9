use std::env;
use std::str::FromStr;

use crate::errors::BackendError;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_ADMIN_PORT: u16 = 8001;
const DEFAULT_API_PREFIX: &str = "api";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Returns the value of the named environment variable if it exists.
pub fn get_variable(name: &str) -> Result<String, BackendError> {
    env::var(name).map_err(|_| BackendError::MissingVariable {
        name: name.to_owned(),
    })
}

/// Parses the named environment variable, falling back to `default`
/// when it isn't set.
pub fn parse_variable_or<T: FromStr>(name: &str, default: T) -> Result<T, BackendError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| BackendError::InvalidVariable {
                name: name.to_owned(),
                value,
            }),
        Err(_) => Ok(default),
    }
}

/// Which origins may call the API from a browser.
#[derive(Clone, Debug, PartialEq)]
pub enum CorsOrigins {
    Any,

    /// Each entry is `scheme://host[:port]`.
    List(Vec<String>),
}

impl FromStr for CorsOrigins {
    /// The first origin that isn't `scheme://host`.
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let origins = s
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            return Ok(CorsOrigins::Any);
        }

        if let Some(bad) = origins.iter().find(|o| !is_origin(o)) {
            return Err(bad.clone());
        }

        Ok(CorsOrigins::List(origins))
    }
}

fn is_origin(s: &str) -> bool {
    match s.split_once("://") {
        Some((scheme, host)) => !scheme.is_empty() && !host.is_empty() && !host.contains('/'),
        None => false,
    }
}

/// Process-wide settings read once at startup.
#[derive(Clone, Debug)]
pub struct Settings {
    pub connection_string: String,
    pub port: u16,
    pub admin_port: u16,
    pub max_connections: u32,
    pub seed_on_startup: bool,
    pub config: Config,
}

impl Settings {
    pub fn from_env() -> Result<Self, BackendError> {
        let api_prefix = env::var("HERITAGE_API_PREFIX")
            .unwrap_or_else(|_| DEFAULT_API_PREFIX.to_owned());
        let cors_origins = parse_variable_or("HERITAGE_CORS_ORIGINS", CorsOrigins::Any)?;
        let seed_on_startup: u8 = parse_variable_or("HERITAGE_SEED_ON_STARTUP", 1)?;

        Ok(Settings {
            connection_string: get_variable("HERITAGE_DB_CONNECTION_STRING")?,
            port: parse_variable_or("HERITAGE_PORT", DEFAULT_PORT)?,
            admin_port: parse_variable_or("HERITAGE_ADMIN_PORT", DEFAULT_ADMIN_PORT)?,
            max_connections: parse_variable_or(
                "HERITAGE_DB_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            seed_on_startup: seed_on_startup != 0,
            config: Config::new(api_prefix, cors_origins),
        })
    }
}

/// The part of the settings that routes need.
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) api_prefix: String,
    pub(crate) cors_origins: CorsOrigins,
}

impl Config {
    /// `api_prefix` should *not* include slashes.
    pub fn new(api_prefix: impl Into<String>, cors_origins: CorsOrigins) -> Self {
        Self {
            api_prefix: api_prefix.into().trim_matches('/').to_owned(),
            cors_origins,
        }
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_API_PREFIX, CorsOrigins::Any)
    }
}

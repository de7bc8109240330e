use std::{env, fmt::Display, fs, str::FromStr};

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {message}")]
  Invalid { key: String, message: String },

  #[error("Failed to read {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

/// Key used to check identities issued by the authentication provider.
#[derive(Clone, Debug)]
pub enum IdentityKey {
  /// HS256 shared secret.
  Secret(String),
  /// RS256 public key, PEM encoded.
  RsaPem(Vec<u8>),
}

#[derive(Clone, Debug)]
pub struct Config {
  pub host: String,
  pub master_key: String,
  pub identity_key: IdentityKey,
  pub identity_issuer: Option<String>,
  pub identity_audience: Option<String>,
  pub places_api_key: Option<String>,
  pub places_base_url: String,
  pub places_requests_per_second: u64,
  pub places_burst_size: u32,
  pub mongodb_uri: String,
  pub mongodb_database: String,
}

impl Config {
  pub fn load() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Builds the configuration from any key lookup, environment or not.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let vars = Vars { lookup };

    let identity_key = match vars.optional("IDENTITY_PUBLIC_KEY_PEM") {
      Some(path) => IdentityKey::RsaPem(
        fs::read(&path).map_err(|source| ConfigError::Read { path, source })?,
      ),
      None => IdentityKey::Secret(
        vars.or_default("IDENTITY_JWT_SECRET", "DEV_IDENTITY_SECRET"),
      ),
    };

    let places_api_key = vars.optional("PLACES_API_KEY");
    if places_api_key.is_none() {
      warn!("PLACES_API_KEY not set, address lookup will be unavailable");
    }

    Ok(Self {
      host: vars.or_default("HOST", "0.0.0.0:3000"),
      master_key: vars.or_default("MASTER_KEY", "DEV_MASTER_KEY"),
      identity_key,
      identity_issuer: vars.optional("IDENTITY_ISSUER"),
      identity_audience: vars.optional("IDENTITY_AUDIENCE"),
      places_api_key,
      places_base_url: vars.or_default(
        "PLACES_BASE_URL",
        "https://maps.googleapis.com/maps/api/place",
      ),
      places_requests_per_second: vars
        .positive("PLACES_REQUESTS_PER_SECOND", 2)?,
      places_burst_size: vars.positive("PLACES_BURST_SIZE", 5)?,
      mongodb_uri: vars.or_default("MONGODB_URI", "mongodb://localhost:27017"),
      mongodb_database: vars.or_default("MONGODB_DATABASE", "anagrafe"),
    })
  }
}

struct Vars<F> {
  lookup: F,
}

impl<F> Vars<F>
where
  F: Fn(&str) -> Option<String>,
{
  fn optional(&self, key: &str) -> Option<String> {
    (self.lookup)(key)
      .map(|value| value.trim().to_string())
      .filter(|value| !value.is_empty())
  }

  fn or_default(&self, key: &str, default: &str) -> String {
    self.optional(key).unwrap_or_else(|| {
      warn!("{key} not set, using default");
      default.to_string()
    })
  }

  fn positive<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
  where
    T: FromStr + PartialOrd + Default + Display,
    T::Err: Display,
  {
    let Some(raw) = self.optional(key) else {
      warn!("{key} not set, using default: {default}");
      return Ok(default);
    };
    let value = raw.parse::<T>().map_err(|error| ConfigError::Invalid {
      key: key.to_string(),
      message: error.to_string(),
    })?;
    if value <= T::default() {
      return Err(ConfigError::Invalid {
        key: key.to_string(),
        message: "must be greater than zero".to_string(),
      });
    }
    Ok(value)
  }
}

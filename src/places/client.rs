use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::shared::{config::Config, model::address::Address};

#[derive(Debug, Error)]
pub enum PlacesError {
  #[error("Places API key is not configured")]
  MissingApiKey,

  #[error("Places API responded with {status}: {body}")]
  Upstream { status: u16, body: String },

  #[error("Places request failed: {0}")]
  Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
  pub long_name: String,
  #[serde(default)]
  pub types: Vec<String>,
}

#[derive(Deserialize)]
struct AutocompleteResponse {
  #[serde(default)]
  predictions: Vec<Value>,
}

#[derive(Deserialize)]
struct DetailsResponse {
  #[serde(default)]
  result: Option<DetailsResult>,
}

#[derive(Deserialize)]
struct DetailsResult {
  #[serde(default)]
  address_components: Vec<AddressComponent>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlacesClient {
  fn is_configured(&self) -> bool;

  /// Raw predictions for a free-text query.
  async fn autocomplete(&self, input: &str) -> Result<Vec<Value>, PlacesError>;

  /// Street address of a place, reshaped to the registry address fields.
  async fn details(&self, place_id: &str) -> Result<Address, PlacesError>;
}

/// Reshapes provider address components; missing ones become empty strings.
pub fn parse_address_components(components: &[AddressComponent]) -> Address {
  let component = |kind: &str| {
    components
      .iter()
      .find(|component| component.types.iter().any(|t| t == kind))
      .map(|component| component.long_name.clone())
      .unwrap_or_default()
  };

  Address {
    street: component("route"),
    street_number: component("street_number"),
    city: component("locality"),
    province: component("administrative_area_level_2"),
    postal_code: component("postal_code"),
  }
}

pub struct GooglePlacesClient {
  http: reqwest::Client,
  base_url: String,
  api_key: Option<String>,
}

impl GooglePlacesClient {
  pub fn new(config: &Config) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url: config.places_base_url.trim_end_matches('/').to_string(),
      api_key: config.places_api_key.clone(),
    }
  }

  fn api_key(&self) -> Result<&str, PlacesError> {
    self.api_key.as_deref().ok_or(PlacesError::MissingApiKey)
  }

  async fn get<T: for<'de> Deserialize<'de>>(
    &self,
    endpoint: &str,
    query: &[(&str, &str)],
  ) -> Result<T, PlacesError> {
    let url = format!("{}/{endpoint}/json", self.base_url);
    debug!(%url, "querying places API");

    let response = self.http.get(&url).query(query).send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(PlacesError::Upstream {
        status: status.as_u16(),
        body,
      });
    }
    Ok(response.json::<T>().await?)
  }
}

#[async_trait]
impl PlacesClient for GooglePlacesClient {
  fn is_configured(&self) -> bool {
    self.api_key.is_some()
  }

  async fn autocomplete(&self, input: &str) -> Result<Vec<Value>, PlacesError> {
    let key = self.api_key()?;
    let response: AutocompleteResponse = self
      .get(
        "autocomplete",
        &[
          ("input", input),
          ("key", key),
          ("language", "it"),
          ("components", "country:it"),
        ],
      )
      .await?;
    Ok(response.predictions)
  }

  async fn details(&self, place_id: &str) -> Result<Address, PlacesError> {
    let key = self.api_key()?;
    let response: DetailsResponse = self
      .get(
        "details",
        &[
          ("place_id", place_id),
          ("fields", "address_components"),
          ("key", key),
          ("language", "it"),
        ],
      )
      .await?;
    let components = response
      .result
      .map(|result| result.address_components)
      .unwrap_or_default();
    Ok(parse_address_components(&components))
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_parse_address_components() {
    let components: Vec<AddressComponent> = serde_json::from_value(json!([
      { "long_name": "12", "short_name": "12", "types": ["street_number"] },
      { "long_name": "Via Roma", "short_name": "Via Roma", "types": ["route"] },
      {
        "long_name": "Milano",
        "short_name": "Milano",
        "types": ["locality", "political"]
      },
      {
        "long_name": "Città Metropolitana di Milano",
        "short_name": "MI",
        "types": ["administrative_area_level_2", "political"]
      },
      {
        "long_name": "Italia",
        "short_name": "IT",
        "types": ["country", "political"]
      },
      { "long_name": "20121", "short_name": "20121", "types": ["postal_code"] }
    ]))
    .unwrap();

    let address = parse_address_components(&components);
    assert_eq!(address.street, "Via Roma");
    assert_eq!(address.street_number, "12");
    assert_eq!(address.city, "Milano");
    assert_eq!(address.province, "Città Metropolitana di Milano");
    assert_eq!(address.postal_code, "20121");
  }

  #[test]
  fn test_missing_components_are_empty() {
    let components = vec![AddressComponent {
      long_name: "Bergamo".to_string(),
      types: vec!["locality".to_string()],
    }];
    let address = parse_address_components(&components);
    assert_eq!(address.city, "Bergamo");
    assert!(address.street.is_empty());
    assert!(address.postal_code.is_empty());
  }

  #[actix_web::test]
  async fn test_client_without_key_fails_before_any_request() {
    let config = Config::from_lookup(|key| match key {
      "PLACES_BASE_URL" => Some("http://127.0.0.1:9".to_string()),
      _ => None,
    })
    .unwrap();
    let client = GooglePlacesClient::new(&config);

    assert!(!client.is_configured());
    assert!(matches!(
      client.autocomplete("via roma").await,
      Err(PlacesError::MissingApiKey)
    ));
    assert!(matches!(
      client.details("abc").await,
      Err(PlacesError::MissingApiKey)
    ));
  }
}

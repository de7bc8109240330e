use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator_derive::Validate;

use crate::shared::slug::slugify;

pub const UNSPECIFIED_RESIDENCE: &str = "Non specificata";

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  ToSchema,
  Validate,
)]
pub struct Address {
  #[serde(rename = "via", default)]
  #[validate(length(max = 200))]
  pub street: String,
  #[serde(rename = "numeroCivico", default)]
  #[validate(length(max = 20))]
  pub street_number: String,
  #[serde(rename = "citta", default)]
  #[validate(length(max = 100))]
  pub city: String,
  #[serde(rename = "provincia", default)]
  #[validate(length(max = 100))]
  pub province: String,
  #[serde(rename = "cap", default)]
  #[validate(length(max = 10))]
  pub postal_code: String,
}

impl Address {
  pub fn is_empty(&self) -> bool {
    [
      &self.street,
      &self.street_number,
      &self.city,
      &self.province,
      &self.postal_code,
    ]
    .iter()
    .all(|part| part.trim().is_empty())
  }

  /// "via numeroCivico, citta (provincia) cap", skipping empty parts.
  pub fn residence(&self) -> Option<String> {
    let province = self.province.trim();
    let province = if province.is_empty() {
      String::new()
    } else {
      format!("({province})")
    };

    let street = join_non_empty(&[&self.street, &self.street_number], " ");
    let locality =
      join_non_empty(&[&self.city, &province, &self.postal_code], " ");
    let residence = join_non_empty(&[&street, &locality], ", ");

    (!residence.is_empty()).then_some(residence)
  }

  pub fn residence_or_unspecified(&self) -> String {
    self
      .residence()
      .unwrap_or_else(|| UNSPECIFIED_RESIDENCE.to_string())
  }

  /// Family identity derived from the formatted address.
  pub fn slug(&self) -> Option<String> {
    self
      .residence()
      .map(|residence| slugify(&residence))
      .filter(|slug| !slug.is_empty())
  }
}

fn join_non_empty(parts: &[&str], separator: &str) -> String {
  parts
    .iter()
    .map(|part| part.trim())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(separator)
}

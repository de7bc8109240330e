use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::person::Person;

/// Document of the flat `familiari` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Relative {
  pub id: String,
  #[serde(flatten)]
  pub person: Person,
  #[serde(
    rename = "indirizzo",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub address: Option<String>,
  #[serde(
    rename = "telefonoPrincipale",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub phone_primary: Option<String>,
  #[serde(
    rename = "telefonoSecondario",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub phone_secondary: Option<String>,
  #[serde(rename = "registratoDa")]
  pub registered_by: String,
  #[serde(rename = "emailRiferimento")]
  pub reference_email: String,
  pub created_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::address::Address;
use crate::shared::role::Role;

/// Document of the `users` collection, keyed by the identity provider uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: String,
  pub email: String,
  pub email_verified: bool,
  #[serde(default)]
  pub display_name: String,
  pub roles: Vec<Role>,
  #[serde(flatten)]
  pub profile: Profile,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  pub fn has_role(&self, role: Role) -> bool {
    self.roles.contains(&role)
  }
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema,
)]
pub struct Profile {
  #[serde(rename = "nome", default)]
  pub first_name: String,
  #[serde(rename = "cognome", default)]
  pub last_name: String,
  #[serde(
    rename = "dataNascita",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub birth_date: Option<String>,
  #[serde(
    rename = "luogoNascita",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub birth_place: Option<String>,
  #[serde(
    rename = "codiceFiscale",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub tax_code: Option<String>,
  #[serde(flatten)]
  pub address: Address,
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
}

impl Profile {
  pub fn display_name(&self) -> String {
    format!("{} {}", self.first_name.trim(), self.last_name.trim())
      .trim()
      .to_string()
  }
}

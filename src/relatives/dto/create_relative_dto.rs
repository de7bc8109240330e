use chrono::{DateTime, Utc};
use nanoid::nanoid;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;
use validator_derive::Validate;

use crate::shared::{
  identity::Identity,
  model::{
    person::{non_blank, Person},
    relative::Relative,
  },
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRelativeDto {
  #[serde(flatten)]
  #[validate(nested)]
  pub person: Person,
  #[serde(rename = "indirizzo", default)]
  #[validate(length(max = 300))]
  pub address: Option<String>,
  #[serde(rename = "telefonoPrincipale", default)]
  #[validate(length(max = 32))]
  pub phone_primary: Option<String>,
  #[serde(rename = "telefonoSecondario", default)]
  #[validate(length(max = 32))]
  pub phone_secondary: Option<String>,
}

impl CreateRelativeDto {
  /// Ownership fields come from the caller, never from the body.
  pub fn into_relative(
    self,
    identity: Identity,
    now: DateTime<Utc>,
  ) -> Relative {
    Relative {
      id: nanoid!(),
      person: self.person.normalized(),
      address: non_blank(self.address),
      phone_primary: non_blank(self.phone_primary),
      phone_secondary: non_blank(self.phone_secondary),
      registered_by: identity.uid,
      reference_email: identity.email,
      created_at: now,
    }
  }
}

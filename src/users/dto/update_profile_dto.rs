use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;
use validator_derive::Validate;

use crate::shared::model::{
  address::Address,
  person::{non_blank, not_blank},
  user::Profile,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
  #[serde(rename = "nome")]
  #[validate(
    custom(function = "not_blank", message = "Nome is required"),
    length(max = 100)
  )]
  pub first_name: String,
  #[serde(rename = "cognome")]
  #[validate(
    custom(function = "not_blank", message = "Cognome is required"),
    length(max = 100)
  )]
  pub last_name: String,
  #[serde(rename = "dataNascita", default)]
  #[validate(length(max = 32))]
  pub birth_date: Option<String>,
  #[serde(rename = "luogoNascita", default)]
  #[validate(length(max = 100))]
  pub birth_place: Option<String>,
  #[serde(rename = "codiceFiscale", default)]
  #[validate(length(max = 32))]
  pub tax_code: Option<String>,
  #[serde(flatten)]
  #[validate(nested)]
  pub address: Address,
  #[serde(rename = "telefonoPrincipale", default)]
  #[validate(length(max = 32))]
  pub phone_primary: Option<String>,
  #[serde(rename = "telefonoSecondario", default)]
  #[validate(length(max = 32))]
  pub phone_secondary: Option<String>,
}

impl From<UpdateProfileDto> for Profile {
  fn from(dto: UpdateProfileDto) -> Self {
    Self {
      first_name: dto.first_name.trim().to_string(),
      last_name: dto.last_name.trim().to_string(),
      birth_date: non_blank(dto.birth_date),
      birth_place: non_blank(dto.birth_place),
      tax_code: non_blank(dto.tax_code).map(|code| code.to_uppercase()),
      address: dto.address,
      phone_primary: non_blank(dto.phone_primary),
      phone_secondary: non_blank(dto.phone_secondary),
    }
  }
}

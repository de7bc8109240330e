use serde::Deserialize;
use utoipa::ToSchema;
use validator_derive::Validate;

use crate::shared::model::person::not_blank;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterProfileDto {
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
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;
use validator_derive::Validate;

/// Identity and birth data shared by family members and relatives.
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
pub struct Person {
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
  #[serde(rename = "dataNascita")]
  #[validate(
    custom(function = "not_blank", message = "Data di nascita is required"),
    length(max = 32)
  )]
  pub birth_date: String,
  #[serde(
    rename = "luogoNascita",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  #[validate(length(max = 100))]
  pub birth_place: Option<String>,
  #[serde(
    rename = "codiceFiscale",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  #[validate(length(max = 32))]
  pub tax_code: Option<String>,
}

impl Person {
  /// Trims every field, drops blank optionals and uppercases the tax code.
  pub fn normalized(self) -> Self {
    Self {
      first_name: self.first_name.trim().to_string(),
      last_name: self.last_name.trim().to_string(),
      birth_date: self.birth_date.trim().to_string(),
      birth_place: non_blank(self.birth_place),
      tax_code: non_blank(self.tax_code).map(|code| code.to_uppercase()),
    }
  }
}

/// Required text fields must carry more than whitespace.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::new("blank"));
  }
  Ok(())
}

/// Form fields left empty are stored as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

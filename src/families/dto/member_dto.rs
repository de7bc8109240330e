use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;
use validator_derive::Validate;

use crate::shared::model::person::Person;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MemberDto {
  #[serde(flatten)]
  #[validate(nested)]
  pub person: Person,
}

use serde::Deserialize;
use utoipa::ToSchema;
use validator_derive::Validate;

use crate::shared::role::Role;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetRolesDto {
  #[validate(length(min = 1, message = "At least one role is required"))]
  pub roles: Vec<Role>,
}

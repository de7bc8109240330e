use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::model::user::User;

/// A user document plus the id of the family the user heads, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FindUserRto {
  #[serde(flatten)]
  pub user: User,
  #[serde(
    rename = "famigliaId",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub family_id: Option<String>,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::model::family::{Family, Member};

/// The caller's family with its formatted residence and members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FamilyRto {
  #[serde(flatten)]
  pub family: Family,
  #[serde(rename = "residenza")]
  pub residence: String,
  #[serde(rename = "membri")]
  pub members: Vec<Member>,
}

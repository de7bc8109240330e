use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{address::Address, person::Person};

/// Document of the `famiglie` collection. The id is the slug of the address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Family {
  pub id: String,
  #[serde(rename = "uidCapofamiglia")]
  pub head_user_id: String,
  #[serde(flatten)]
  pub address: Address,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Document of the `membri` collection, contained in one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
  pub id: String,
  #[serde(rename = "famigliaId")]
  pub family_id: String,
  #[serde(flatten)]
  pub person: Person,
  pub created_at: DateTime<Utc>,
}

/// Family write performed together with a profile update.
#[derive(Debug, Clone, PartialEq)]
pub enum HouseholdChange {
  /// The profile carries no usable address, families stay as they are.
  Keep,
  /// Create the family, or refresh it in place.
  Upsert(Family),
  /// The head moved: the family is re-keyed and its members follow.
  Move { from: String, to: Family },
}

impl HouseholdChange {
  pub fn target(&self) -> Option<&Family> {
    match self {
      HouseholdChange::Keep => None,
      HouseholdChange::Upsert(family) => Some(family),
      HouseholdChange::Move { to, .. } => Some(to),
    }
  }

  /// Whether the change was planned against `current`, the id of the family
  /// the head heads right now.
  pub fn planned_from(&self, current: Option<&str>) -> bool {
    match self {
      HouseholdChange::Keep => true,
      HouseholdChange::Upsert(family) => {
        current.is_none() || current == Some(family.id.as_str())
      }
      HouseholdChange::Move { from, .. } => current == Some(from.as_str()),
    }
  }

  /// Decides the family write for `head_user_id` now living at `address`.
  pub fn plan(
    existing: Option<&Family>,
    head_user_id: &str,
    address: &Address,
    now: DateTime<Utc>,
  ) -> Self {
    let Some(id) = address.slug() else {
      return HouseholdChange::Keep;
    };

    let family = |created_at| Family {
      id: id.clone(),
      head_user_id: head_user_id.to_string(),
      address: address.clone(),
      created_at,
      updated_at: now,
    };

    match existing {
      None => HouseholdChange::Upsert(family(now)),
      Some(current) if current.id == id => {
        HouseholdChange::Upsert(family(current.created_at))
      }
      Some(current) => HouseholdChange::Move {
        from: current.id.clone(),
        to: family(current.created_at),
      },
    }
  }
}

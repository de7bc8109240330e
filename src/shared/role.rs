use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Deserialize,
  Serialize,
  ToSchema,
)]
pub enum Role {
  #[serde(rename = "admin")]
  Admin,
  #[serde(rename = "educatore")]
  Educator,
  #[serde(rename = "genitore")]
  Parent,
  #[serde(rename = "utente")]
  Member,
}

impl Role {
  pub const ALL: [Role; 4] =
    [Role::Admin, Role::Educator, Role::Parent, Role::Member];
}

/// Sorts and deduplicates a role set as stored on a user document.
pub fn normalize_roles(mut roles: Vec<Role>) -> Vec<Role> {
  roles.sort();
  roles.dedup();
  roles
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_roles_use_document_names() {
    let json = serde_json::to_string(&Role::ALL).unwrap();
    assert_eq!(json, r#"["admin","educatore","genitore","utente"]"#);
  }

  #[test]
  fn test_normalize_roles_removes_duplicates() {
    let roles =
      normalize_roles(vec![Role::Member, Role::Admin, Role::Member]);
    assert_eq!(roles, vec![Role::Admin, Role::Member]);
  }
}

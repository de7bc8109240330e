use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::role::Role;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  ToSchema,
)]
pub enum Permission {
  #[serde(rename = "read:users")]
  ReadUsers,
  #[serde(rename = "write:users")]
  WriteUsers,
  #[serde(rename = "delete:users")]
  DeleteUsers,
  #[serde(rename = "read:groups")]
  ReadGroups,
  #[serde(rename = "write:groups")]
  WriteGroups,
  #[serde(rename = "delete:groups")]
  DeleteGroups,
  #[serde(rename = "read:accounting")]
  ReadAccounting,
  #[serde(rename = "write:accounting")]
  WriteAccounting,
  #[serde(rename = "manage:roles")]
  ManageRoles,
}

impl Permission {
  pub const ALL: [Permission; 9] = [
    Permission::ReadUsers,
    Permission::WriteUsers,
    Permission::DeleteUsers,
    Permission::ReadGroups,
    Permission::WriteGroups,
    Permission::DeleteGroups,
    Permission::ReadAccounting,
    Permission::WriteAccounting,
    Permission::ManageRoles,
  ];
}

/// One row of the role -> permissions matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RolePermissions {
  pub role: Role,
  pub permissions: Vec<Permission>,
}

pub fn default_permissions() -> Vec<RolePermissions> {
  use Permission::*;

  vec![
    RolePermissions {
      role: Role::Admin,
      permissions: Permission::ALL.to_vec(),
    },
    RolePermissions {
      role: Role::Educator,
      permissions: vec![ReadUsers, ReadGroups, WriteGroups],
    },
    RolePermissions {
      role: Role::Parent,
      permissions: vec![ReadUsers],
    },
    RolePermissions {
      role: Role::Member,
      permissions: Vec::new(),
    },
  ]
}

/// One row per role in role order, permissions merged, sorted and unique.
pub fn normalize_permissions(
  rows: Vec<RolePermissions>,
) -> Vec<RolePermissions> {
  let mut matrix: BTreeMap<Role, BTreeSet<Permission>> =
    Role::ALL.iter().map(|role| (*role, BTreeSet::new())).collect();

  for row in rows {
    matrix.entry(row.role).or_default().extend(row.permissions);
  }

  matrix
    .into_iter()
    .map(|(role, permissions)| RolePermissions {
      role,
      permissions: permissions.into_iter().collect(),
    })
    .collect()
}

pub fn grants(
  rows: &[RolePermissions],
  role: Role,
  permission: Permission,
) -> bool {
  rows
    .iter()
    .any(|row| row.role == role && row.permissions.contains(&permission))
}

#[cfg(feature = "mongodb")]
use mongodb::bson::doc;

use super::RepositoryError;
#[cfg(feature = "mongodb")]
use crate::shared::database::MongoDatabase;
use crate::shared::{
  database::InMemoryDatabase, model::permission::RolePermissions,
};

pub trait PermissionRepository {
  /// `None` until an admin saves the matrix for the first time.
  async fn find_permissions(
    &self,
  ) -> Result<Option<Vec<RolePermissions>>, RepositoryError>;
  async fn save_permissions(
    &self,
    rows: &[RolePermissions],
  ) -> Result<(), RepositoryError>;
}

impl PermissionRepository for InMemoryDatabase {
  async fn find_permissions(
    &self,
  ) -> Result<Option<Vec<RolePermissions>>, RepositoryError> {
    Ok(self.read()?.permissions.clone())
  }

  async fn save_permissions(
    &self,
    rows: &[RolePermissions],
  ) -> Result<(), RepositoryError> {
    self.write()?.permissions = Some(rows.to_vec());
    Ok(())
  }
}

#[cfg(feature = "mongodb")]
const MATRIX_ID: &str = "ruoli";

#[cfg(feature = "mongodb")]
#[derive(serde::Serialize, serde::Deserialize)]
struct PermissionsDocument {
  id: String,
  roles: Vec<RolePermissions>,
}

#[cfg(feature = "mongodb")]
impl PermissionRepository for MongoDatabase {
  async fn find_permissions(
    &self,
  ) -> Result<Option<Vec<RolePermissions>>, RepositoryError> {
    let document = self
      .permissions::<PermissionsDocument>()
      .find_one(doc! { "id": MATRIX_ID })
      .await?;
    Ok(document.map(|document| document.roles))
  }

  async fn save_permissions(
    &self,
    rows: &[RolePermissions],
  ) -> Result<(), RepositoryError> {
    let document = PermissionsDocument {
      id: MATRIX_ID.to_string(),
      roles: rows.to_vec(),
    };
    self
      .permissions::<PermissionsDocument>()
      .replace_one(doc! { "id": MATRIX_ID }, document)
      .upsert(true)
      .await?;
    Ok(())
  }
}

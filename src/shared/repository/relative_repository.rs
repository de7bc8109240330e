#[cfg(feature = "mongodb")]
use mongodb::bson::doc;

use super::RepositoryError;
#[cfg(feature = "mongodb")]
use crate::shared::database::{collect, MongoDatabase};
use crate::shared::{database::InMemoryDatabase, model::relative::Relative};

pub trait RelativeRepository {
  async fn create_relative(
    &self,
    relative: &Relative,
  ) -> Result<(), RepositoryError>;
  async fn find_relatives_by(
    &self,
    registered_by: &str,
  ) -> Result<Vec<Relative>, RepositoryError>;
  async fn find_all_relatives(&self) -> Result<Vec<Relative>, RepositoryError>;
  /// Only removes relatives registered by `registered_by`.
  async fn delete_relative(
    &self,
    registered_by: &str,
    id: &str,
  ) -> Result<(), RepositoryError>;
}

impl RelativeRepository for InMemoryDatabase {
  async fn create_relative(
    &self,
    relative: &Relative,
  ) -> Result<(), RepositoryError> {
    self.write()?.relatives.push(relative.clone());
    Ok(())
  }

  async fn find_relatives_by(
    &self,
    registered_by: &str,
  ) -> Result<Vec<Relative>, RepositoryError> {
    Ok(
      self
        .read()?
        .relatives
        .iter()
        .filter(|relative| relative.registered_by == registered_by)
        .cloned()
        .collect(),
    )
  }

  async fn find_all_relatives(&self) -> Result<Vec<Relative>, RepositoryError> {
    Ok(self.read()?.relatives.clone())
  }

  async fn delete_relative(
    &self,
    registered_by: &str,
    id: &str,
  ) -> Result<(), RepositoryError> {
    let mut collections = self.write()?;
    let before = collections.relatives.len();
    collections.relatives.retain(|relative| {
      !(relative.id == id && relative.registered_by == registered_by)
    });
    if collections.relatives.len() == before {
      return Err(RepositoryError::NotFound);
    }
    Ok(())
  }
}

#[cfg(feature = "mongodb")]
impl RelativeRepository for MongoDatabase {
  async fn create_relative(
    &self,
    relative: &Relative,
  ) -> Result<(), RepositoryError> {
    self.relatives().insert_one(relative).await?;
    Ok(())
  }

  async fn find_relatives_by(
    &self,
    registered_by: &str,
  ) -> Result<Vec<Relative>, RepositoryError> {
    collect(
      self
        .relatives()
        .find(doc! { "registratoDa": registered_by })
        .await?,
    )
    .await
  }

  async fn find_all_relatives(&self) -> Result<Vec<Relative>, RepositoryError> {
    collect(self.relatives().find(doc! {}).await?).await
  }

  async fn delete_relative(
    &self,
    registered_by: &str,
    id: &str,
  ) -> Result<(), RepositoryError> {
    let result = self
      .relatives()
      .delete_one(doc! { "id": id, "registratoDa": registered_by })
      .await?;
    if result.deleted_count == 0 {
      return Err(RepositoryError::NotFound);
    }
    Ok(())
  }
}

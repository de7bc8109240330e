#[cfg(feature = "mongodb")]
use mongodb::bson::{doc, Document};

use super::RepositoryError;
#[cfg(feature = "mongodb")]
use crate::shared::database::{collect, MongoDatabase};
use crate::shared::{database::InMemoryDatabase, model::user::User};

/// Users are looked up by the provider uid only.
pub enum FindOneProperty<'a> {
  Id(&'a str),
}

impl FindOneProperty<'_> {
  #[cfg(feature = "mongodb")]
  fn to_mongo_filter(&self) -> Document {
    match self {
      FindOneProperty::Id(id) => doc! { "id": *id },
    }
  }
}

pub trait UserRepository {
  async fn find_user(
    &self,
    property: FindOneProperty<'_>,
  ) -> Result<Option<User>, RepositoryError>;
  async fn find_all_users(&self) -> Result<Vec<User>, RepositoryError>;
  /// Fails with `Conflict` when a user with the same id exists.
  async fn create_user(&self, user: &User) -> Result<(), RepositoryError>;
  /// Fails with `NotFound` when the user does not exist.
  async fn update_user(&self, user: &User) -> Result<(), RepositoryError>;
}

// ### In-memory implementation ###

impl UserRepository for InMemoryDatabase {
  async fn find_user(
    &self,
    property: FindOneProperty<'_>,
  ) -> Result<Option<User>, RepositoryError> {
    let collections = self.read()?;
    Ok(match property {
      FindOneProperty::Id(id) => collections.users.get(id).cloned(),
    })
  }

  async fn find_all_users(&self) -> Result<Vec<User>, RepositoryError> {
    Ok(self.read()?.users.values().cloned().collect())
  }

  async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
    let mut collections = self.write()?;
    if collections.users.contains_key(&user.id) {
      return Err(RepositoryError::Conflict(String::from(
        "User already exists",
      )));
    }
    collections.users.insert(user.id.clone(), user.clone());
    Ok(())
  }

  async fn update_user(&self, user: &User) -> Result<(), RepositoryError> {
    let mut collections = self.write()?;
    match collections.users.get_mut(&user.id) {
      Some(stored) => {
        *stored = user.clone();
        Ok(())
      }
      None => Err(RepositoryError::NotFound),
    }
  }
}

// ### MongoDB implementation ###

#[cfg(feature = "mongodb")]
impl UserRepository for MongoDatabase {
  async fn find_user(
    &self,
    property: FindOneProperty<'_>,
  ) -> Result<Option<User>, RepositoryError> {
    Ok(self.users().find_one(property.to_mongo_filter()).await?)
  }

  async fn find_all_users(&self) -> Result<Vec<User>, RepositoryError> {
    collect(self.users().find(doc! {}).await?).await
  }

  async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
    let existing = self
      .users()
      .find_one(doc! { "id": user.id.as_str() })
      .await?;
    if existing.is_some() {
      return Err(RepositoryError::Conflict(String::from(
        "User already exists",
      )));
    }
    self.users().insert_one(user).await?;
    Ok(())
  }

  async fn update_user(&self, user: &User) -> Result<(), RepositoryError> {
    let result = self
      .users()
      .replace_one(doc! { "id": user.id.as_str() }, user)
      .await?;
    if result.matched_count == 0 {
      return Err(RepositoryError::NotFound);
    }
    Ok(())
  }
}

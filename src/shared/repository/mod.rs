use thiserror::Error;

use super::{
  database::InMemoryDatabase,
  model::{family::HouseholdChange, user::User},
};

pub mod family_repository;
pub mod permission_repository;
pub mod relative_repository;
pub mod user_repository;

pub use family_repository::FamilyRepository;
pub use permission_repository::PermissionRepository;
pub use relative_repository::RelativeRepository;
pub use user_repository::{FindOneProperty, UserRepository};

pub const ADDRESS_TAKEN: &str =
  "Address already registered to another household";
pub const HOUSEHOLD_CHANGED: &str =
  "The household changed in the meantime, retry the update";

#[derive(Debug, Error)]
pub enum RepositoryError {
  #[error("Document not found")]
  NotFound,

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("In-memory store lock poisoned")]
  Poisoned,

  #[cfg(feature = "mongodb")]
  #[error("MongoDB error: {0}")]
  Mongo(#[from] mongodb::error::Error),
}

#[derive(Debug, Clone)]
pub struct DatabaseStats {
  pub connected: bool,
  pub name: String,
}

/// Every collection the registry touches, plus the writes spanning several
/// documents.
pub trait Store:
  UserRepository + FamilyRepository + RelativeRepository + PermissionRepository
{
  /// Writes the user and the household change in one atomic step. Fails with
  /// `Conflict` when the target family belongs to another head, or when the
  /// family the head heads is no longer the one the change was planned from.
  async fn commit_household(
    &self,
    user: &User,
    change: &HouseholdChange,
  ) -> Result<(), RepositoryError>;

  async fn stats(&self) -> DatabaseStats;
}

impl Store for InMemoryDatabase {
  async fn commit_household(
    &self,
    user: &User,
    change: &HouseholdChange,
  ) -> Result<(), RepositoryError> {
    let mut collections = self.write()?;

    let current = collections
      .families
      .values()
      .find(|family| family.head_user_id == user.id)
      .map(|family| family.id.as_str());
    if !change.planned_from(current) {
      return Err(RepositoryError::Conflict(HOUSEHOLD_CHANGED.to_string()));
    }
    if let Some(target) = change.target() {
      let taken = collections
        .families
        .get(&target.id)
        .is_some_and(|owner| owner.head_user_id != target.head_user_id);
      if taken {
        return Err(RepositoryError::Conflict(ADDRESS_TAKEN.to_string()));
      }
    }
    if !collections.users.contains_key(&user.id) {
      return Err(RepositoryError::NotFound);
    }

    collections.users.insert(user.id.clone(), user.clone());
    match change {
      HouseholdChange::Keep => {}
      HouseholdChange::Upsert(family) => {
        collections.families.insert(family.id.clone(), family.clone());
      }
      HouseholdChange::Move { from, to } => {
        collections.families.remove(from);
        collections.families.insert(to.id.clone(), to.clone());
        let mut moved = collections.members.remove(from).unwrap_or_default();
        for member in &mut moved {
          member.family_id = to.id.clone();
        }
        collections
          .members
          .entry(to.id.clone())
          .or_default()
          .extend(moved);
      }
    }
    Ok(())
  }

  async fn stats(&self) -> DatabaseStats {
    DatabaseStats {
      connected: self.read().is_ok(),
      name: String::from("in-memory"),
    }
  }
}

#[cfg(feature = "mongodb")]
mod mongo {
  use mongodb::{bson::doc, ClientSession};
  use tracing::warn;

  use super::*;
  use crate::shared::database::MongoDatabase;

  impl MongoDatabase {
    async fn apply_household(
      &self,
      session: &mut ClientSession,
      user: &User,
      change: &HouseholdChange,
    ) -> Result<(), RepositoryError> {
      let current = self
        .families()
        .find_one(doc! { "uidCapofamiglia": user.id.as_str() })
        .session(&mut *session)
        .await?;
      if !change.planned_from(current.as_ref().map(|family| family.id.as_str()))
      {
        return Err(RepositoryError::Conflict(HOUSEHOLD_CHANGED.to_string()));
      }
      if let Some(target) = change.target() {
        let owner = self
          .families()
          .find_one(doc! { "id": target.id.as_str() })
          .session(&mut *session)
          .await?;
        if owner.is_some_and(|owner| owner.head_user_id != target.head_user_id)
        {
          return Err(RepositoryError::Conflict(ADDRESS_TAKEN.to_string()));
        }
      }

      let replaced = self
        .users()
        .replace_one(doc! { "id": user.id.as_str() }, user)
        .session(&mut *session)
        .await?;
      if replaced.matched_count == 0 {
        return Err(RepositoryError::NotFound);
      }

      match change {
        HouseholdChange::Keep => {}
        HouseholdChange::Upsert(family) => {
          self
            .families()
            .replace_one(doc! { "id": family.id.as_str() }, family)
            .upsert(true)
            .session(&mut *session)
            .await?;
        }
        HouseholdChange::Move { from, to } => {
          self
            .families()
            .delete_one(doc! { "id": from.as_str() })
            .session(&mut *session)
            .await?;
          self
            .families()
            .replace_one(doc! { "id": to.id.as_str() }, to)
            .upsert(true)
            .session(&mut *session)
            .await?;
          self
            .members()
            .update_many(
              doc! { "famigliaId": from.as_str() },
              doc! { "$set": { "famigliaId": to.id.as_str() } },
            )
            .session(&mut *session)
            .await?;
        }
      }
      Ok(())
    }
  }

  impl Store for MongoDatabase {
    async fn commit_household(
      &self,
      user: &User,
      change: &HouseholdChange,
    ) -> Result<(), RepositoryError> {
      let mut session = self.client.start_session().await?;
      session.start_transaction().await?;

      match self.apply_household(&mut session, user, change).await {
        Ok(()) => {
          session.commit_transaction().await?;
          Ok(())
        }
        Err(error) => {
          if let Err(abort_error) = session.abort_transaction().await {
            warn!(
              error = %abort_error,
              "failed to abort household transaction"
            );
          }
          Err(error)
        }
      }
    }

    async fn stats(&self) -> DatabaseStats {
      let connected = self
        .database
        .run_command(doc! { "ping": 1 })
        .await
        .is_ok();
      DatabaseStats {
        connected,
        name: self.database.name().to_string(),
      }
    }
  }
}

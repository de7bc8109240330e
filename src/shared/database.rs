use std::{
  collections::HashMap,
  sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use super::{
  model::{
    family::{Family, Member},
    permission::RolePermissions,
    relative::Relative,
    user::User,
  },
  repository::RepositoryError,
};

pub const USERS: &str = "users";
pub const FAMILIES: &str = "famiglie";
pub const MEMBERS: &str = "membri";
pub const RELATIVES: &str = "familiari";
pub const PERMISSIONS: &str = "permessi";

/// Every collection of the registry, held behind a single lock so that
/// multi-document writes are atomic.
#[derive(Default)]
pub struct Collections {
  pub users: HashMap<String, User>,
  pub families: HashMap<String, Family>,
  /// Keyed by family id.
  pub members: HashMap<String, Vec<Member>>,
  pub relatives: Vec<Relative>,
  pub permissions: Option<Vec<RolePermissions>>,
}

#[derive(Clone, Default)]
pub struct InMemoryDatabase {
  collections: Arc<RwLock<Collections>>,
}

impl InMemoryDatabase {
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn read(
    &self,
  ) -> Result<RwLockReadGuard<'_, Collections>, RepositoryError> {
    self.collections.read().map_err(|_| RepositoryError::Poisoned)
  }

  pub(crate) fn write(
    &self,
  ) -> Result<RwLockWriteGuard<'_, Collections>, RepositoryError> {
    self.collections.write().map_err(|_| RepositoryError::Poisoned)
  }
}

#[cfg(feature = "mongodb")]
pub use mongo::MongoDatabase;

#[cfg(feature = "mongodb")]
mod mongo {
  use mongodb::{Client, Collection, Cursor, Database};
  use serde::de::DeserializeOwned;
  use tracing::info;

  use super::*;
  use crate::shared::config::Config;

  #[derive(Clone)]
  pub struct MongoDatabase {
    pub client: Client,
    pub database: Database,
  }

  impl MongoDatabase {
    pub async fn connect(
      config: &Config,
    ) -> Result<Self, mongodb::error::Error> {
      let client = Client::with_uri_str(&config.mongodb_uri).await?;
      let database = client.database(&config.mongodb_database);
      info!(database = %config.mongodb_database, "connected to MongoDB");
      Ok(Self { client, database })
    }

    pub fn users(&self) -> Collection<User> {
      self.database.collection(USERS)
    }

    pub fn families(&self) -> Collection<Family> {
      self.database.collection(FAMILIES)
    }

    pub fn members(&self) -> Collection<Member> {
      self.database.collection(MEMBERS)
    }

    pub fn relatives(&self) -> Collection<Relative> {
      self.database.collection(RELATIVES)
    }

    pub fn permissions<T: Send + Sync>(&self) -> Collection<T> {
      self.database.collection(PERMISSIONS)
    }
  }

  /// Drains a cursor into memory.
  pub async fn collect<T>(
    mut cursor: Cursor<T>,
  ) -> Result<Vec<T>, RepositoryError>
  where
    T: DeserializeOwned,
  {
    let mut items = Vec::new();
    while cursor.advance().await? {
      items.push(cursor.deserialize_current()?);
    }
    Ok(items)
  }
}

#[cfg(feature = "mongodb")]
pub use mongo::collect;

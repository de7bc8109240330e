#[cfg(feature = "mongodb")]
use mongodb::bson::doc;

use super::RepositoryError;
#[cfg(feature = "mongodb")]
use crate::shared::database::{collect, MongoDatabase};
use crate::shared::{
  database::InMemoryDatabase,
  model::family::{Family, Member},
};

/// `famiglie` documents and the `membri` they contain. Families themselves
/// are only written through `Store::commit_household`.
pub trait FamilyRepository {
  async fn find_family(
    &self,
    id: &str,
  ) -> Result<Option<Family>, RepositoryError>;
  async fn find_family_by_head(
    &self,
    user_id: &str,
  ) -> Result<Option<Family>, RepositoryError>;
  async fn find_all_families(&self) -> Result<Vec<Family>, RepositoryError>;
  async fn find_members(
    &self,
    family_id: &str,
  ) -> Result<Vec<Member>, RepositoryError>;
  async fn find_all_members(&self) -> Result<Vec<Member>, RepositoryError>;
  async fn create_member(&self, member: &Member) -> Result<(), RepositoryError>;
  /// Fails with `NotFound` unless the member exists in `member.family_id`.
  async fn update_member(&self, member: &Member) -> Result<(), RepositoryError>;
  async fn delete_member(
    &self,
    family_id: &str,
    member_id: &str,
  ) -> Result<(), RepositoryError>;
}

// ### In-memory implementation ###

impl FamilyRepository for InMemoryDatabase {
  async fn find_family(
    &self,
    id: &str,
  ) -> Result<Option<Family>, RepositoryError> {
    Ok(self.read()?.families.get(id).cloned())
  }

  async fn find_family_by_head(
    &self,
    user_id: &str,
  ) -> Result<Option<Family>, RepositoryError> {
    Ok(
      self
        .read()?
        .families
        .values()
        .find(|family| family.head_user_id == user_id)
        .cloned(),
    )
  }

  async fn find_all_families(&self) -> Result<Vec<Family>, RepositoryError> {
    Ok(self.read()?.families.values().cloned().collect())
  }

  async fn find_members(
    &self,
    family_id: &str,
  ) -> Result<Vec<Member>, RepositoryError> {
    Ok(
      self
        .read()?
        .members
        .get(family_id)
        .cloned()
        .unwrap_or_default(),
    )
  }

  async fn find_all_members(&self) -> Result<Vec<Member>, RepositoryError> {
    Ok(self.read()?.members.values().flatten().cloned().collect())
  }

  async fn create_member(
    &self,
    member: &Member,
  ) -> Result<(), RepositoryError> {
    let mut collections = self.write()?;
    if !collections.families.contains_key(&member.family_id) {
      return Err(RepositoryError::NotFound);
    }
    collections
      .members
      .entry(member.family_id.clone())
      .or_default()
      .push(member.clone());
    Ok(())
  }

  async fn update_member(
    &self,
    member: &Member,
  ) -> Result<(), RepositoryError> {
    let mut collections = self.write()?;
    let stored = collections
      .members
      .get_mut(&member.family_id)
      .and_then(|members| members.iter_mut().find(|m| m.id == member.id))
      .ok_or(RepositoryError::NotFound)?;
    *stored = member.clone();
    Ok(())
  }

  async fn delete_member(
    &self,
    family_id: &str,
    member_id: &str,
  ) -> Result<(), RepositoryError> {
    let mut collections = self.write()?;
    let members = collections
      .members
      .get_mut(family_id)
      .ok_or(RepositoryError::NotFound)?;
    let before = members.len();
    members.retain(|member| member.id != member_id);
    if members.len() == before {
      return Err(RepositoryError::NotFound);
    }
    Ok(())
  }
}

// ### MongoDB implementation ###

#[cfg(feature = "mongodb")]
impl FamilyRepository for MongoDatabase {
  async fn find_family(
    &self,
    id: &str,
  ) -> Result<Option<Family>, RepositoryError> {
    Ok(self.families().find_one(doc! { "id": id }).await?)
  }

  async fn find_family_by_head(
    &self,
    user_id: &str,
  ) -> Result<Option<Family>, RepositoryError> {
    Ok(
      self
        .families()
        .find_one(doc! { "uidCapofamiglia": user_id })
        .await?,
    )
  }

  async fn find_all_families(&self) -> Result<Vec<Family>, RepositoryError> {
    collect(self.families().find(doc! {}).await?).await
  }

  async fn find_members(
    &self,
    family_id: &str,
  ) -> Result<Vec<Member>, RepositoryError> {
    collect(self.members().find(doc! { "famigliaId": family_id }).await?).await
  }

  async fn find_all_members(&self) -> Result<Vec<Member>, RepositoryError> {
    collect(self.members().find(doc! {}).await?).await
  }

  async fn create_member(
    &self,
    member: &Member,
  ) -> Result<(), RepositoryError> {
    if self.find_family(&member.family_id).await?.is_none() {
      return Err(RepositoryError::NotFound);
    }
    self.members().insert_one(member).await?;
    Ok(())
  }

  async fn update_member(
    &self,
    member: &Member,
  ) -> Result<(), RepositoryError> {
    let result = self
      .members()
      .replace_one(
        doc! {
          "id": member.id.as_str(),
          "famigliaId": member.family_id.as_str(),
        },
        member,
      )
      .await?;
    if result.matched_count == 0 {
      return Err(RepositoryError::NotFound);
    }
    Ok(())
  }

  async fn delete_member(
    &self,
    family_id: &str,
    member_id: &str,
  ) -> Result<(), RepositoryError> {
    let result = self
      .members()
      .delete_one(doc! { "id": member_id, "famigliaId": family_id })
      .await?;
    if result.deleted_count == 0 {
      return Err(RepositoryError::NotFound);
    }
    Ok(())
  }
}

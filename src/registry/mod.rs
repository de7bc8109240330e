pub mod joiner;
pub mod rto;

use actix_web::{web, HttpResponse, Responder};
use joiner::{join, search, sort, RegistrySource};
use rto::registry_entry_rto::RegistryEntryRto;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::shared::{
  http_error::{repository_failure, HttpError},
  repository::{RepositoryError, Store},
};
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct RegistryQuery {
  /// Matched against name, surname and tax code.
  pub q: Option<String>,
}

#[utoipa::path(
  get,
  path = "/v1/admin/registry",
  tag = "admin",
  params(RegistryQuery),
  responses(
    (
      status = 200,
      description = "Everyone known to the organization",
      body = [RegistryEntryRto]
    ),
    (status = 403, description = "Not an admin", body = HttpError)
  ),
  security(("bearer" = []))
)]
pub async fn get_registry<S: Store>(
  data: web::Data<AppState<S>>,
  query: web::Query<RegistryQuery>,
) -> impl Responder {
  let source = match load_source(&data.store).await {
    Ok(source) => source,
    Err(error) => return repository_failure(error),
  };

  let mut entries =
    search(join(source), query.q.as_deref().unwrap_or_default());
  sort(&mut entries);

  HttpResponse::Ok().json(entries)
}

async fn load_source<S: Store>(
  store: &S,
) -> Result<RegistrySource, RepositoryError> {
  Ok(RegistrySource {
    users: store.find_all_users().await?,
    families: store.find_all_families().await?,
    members: store.find_all_members().await?,
    relatives: store.find_all_relatives().await?,
  })
}

use actix_web::{web, HttpResponse, Responder};
use tracing::info;

use crate::shared::{
  http_error::{bad_request, repository_failure, HttpError},
  model::permission::{
    default_permissions, grants, normalize_permissions, Permission,
    RolePermissions,
  },
  repository::Store,
  role::Role,
};
use crate::AppState;

const ADMIN_KEEPS_MANAGE_ROLES: &str = "The admin role must keep manage:roles";

/// The stored matrix, or the defaults until one is saved.
#[utoipa::path(
  get,
  path = "/v1/admin/permissions",
  tag = "admin",
  responses(
    (status = 200, description = "One row per role", body = [RolePermissions]),
    (status = 403, description = "Not an admin", body = HttpError)
  ),
  security(("bearer" = []))
)]
pub async fn get_permissions<S: Store>(
  data: web::Data<AppState<S>>,
) -> impl Responder {
  match data.store.find_permissions().await {
    Ok(stored) => HttpResponse::Ok().json(normalize_permissions(
      stored.unwrap_or_else(default_permissions),
    )),
    Err(error) => repository_failure(error),
  }
}

#[utoipa::path(
  put,
  path = "/v1/admin/permissions",
  tag = "admin",
  request_body = [RolePermissions],
  responses(
    (status = 200, description = "Matrix saved", body = [RolePermissions]),
    (
      status = 400,
      description = "The admin role would lose manage:roles",
      body = HttpError
    ),
    (status = 403, description = "Not an admin", body = HttpError)
  ),
  security(("bearer" = []))
)]
pub async fn save_permissions<S: Store>(
  data: web::Data<AppState<S>>,
  rows: web::Json<Vec<RolePermissions>>,
) -> impl Responder {
  let rows = normalize_permissions(rows.into_inner());
  if !grants(&rows, Role::Admin, Permission::ManageRoles) {
    return bad_request(ADMIN_KEEPS_MANAGE_ROLES);
  }

  match data.store.save_permissions(&rows).await {
    Ok(()) => {
      info!("permission matrix saved");
      HttpResponse::Ok().json(rows)
    }
    Err(error) => repository_failure(error),
  }
}

#[cfg(test)]
mod tests {
  use actix_web::{http::StatusCode, test, App};
  use serde_json::json;

  use super::*;
  use crate::{
    app_config,
    helpers::tests::{bearer, test_state, TEST_MASTER_KEY},
    shared::{
      database::InMemoryDatabase, repository::PermissionRepository,
    },
  };

  #[actix_web::test]
  async fn test_defaults_until_saved() {
    let app = test::init_service(
      App::new().configure(app_config(test_state(InMemoryDatabase::new()))),
    )
    .await;

    let request = test::TestRequest::get()
      .uri("/v1/admin/permissions")
      .insert_header(bearer(TEST_MASTER_KEY))
      .to_request();
    let rows: Vec<RolePermissions> =
      test::call_and_read_body_json(&app, request).await;
    assert_eq!(rows, normalize_permissions(default_permissions()));
    assert!(grants(&rows, Role::Educator, Permission::WriteGroups));
  }

  #[actix_web::test]
  async fn test_save_normalizes_matrix() {
    let store = InMemoryDatabase::new();
    let app = test::init_service(
      App::new().configure(app_config(test_state(store.clone()))),
    )
    .await;

    let request = test::TestRequest::put()
      .uri("/v1/admin/permissions")
      .insert_header(bearer(TEST_MASTER_KEY))
      .set_json(json!([
        { "role": "admin", "permissions": ["manage:roles"] },
        { "role": "genitore", "permissions": ["read:users", "read:users"] },
        { "role": "admin", "permissions": ["read:users"] }
      ]))
      .to_request();
    let rows: Vec<RolePermissions> =
      test::call_and_read_body_json(&app, request).await;

    assert_eq!(rows.len(), Role::ALL.len());
    assert_eq!(
      rows[0],
      RolePermissions {
        role: Role::Admin,
        permissions: vec![Permission::ReadUsers, Permission::ManageRoles],
      }
    );
    let stored = store.find_permissions().await.unwrap();
    assert_eq!(stored, Some(rows));
  }

  #[actix_web::test]
  async fn test_admin_cannot_lose_manage_roles() {
    let store = InMemoryDatabase::new();
    let app = test::init_service(
      App::new().configure(app_config(test_state(store.clone()))),
    )
    .await;

    let request = test::TestRequest::put()
      .uri("/v1/admin/permissions")
      .insert_header(bearer(TEST_MASTER_KEY))
      .set_json(json!([{ "role": "admin", "permissions": ["read:users"] }]))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: HttpError = test::read_body_json(response).await;
    assert_eq!(error.message, ADMIN_KEEPS_MANAGE_ROLES);
    assert_eq!(store.find_permissions().await.unwrap(), None);
  }
}

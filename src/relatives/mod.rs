pub mod dto;

use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use dto::create_relative_dto::CreateRelativeDto;
use tracing::info;
use validator::Validate;

use crate::shared::{
  http_error::{not_found, repository_failure, HttpError},
  identity::Identity,
  model::relative::Relative,
  repository::{RepositoryError, Store},
  rto::created_rto::CreatedRto,
};
use crate::AppState;

#[utoipa::path(
  post,
  path = "/v1/relatives",
  tag = "relatives",
  request_body = CreateRelativeDto,
  responses(
    (status = 201, description = "Relative registered", body = CreatedRto),
    (status = 400, description = "Validation failed")
  ),
  security(("bearer" = []))
)]
pub async fn create_relative<S: Store>(
  data: web::Data<AppState<S>>,
  identity: Identity,
  dto: web::Json<CreateRelativeDto>,
) -> impl Responder {
  if let Err(validation_errors) = dto.validate() {
    return HttpResponse::BadRequest().json(validation_errors);
  }

  let relative = dto.into_inner().into_relative(identity, Utc::now());
  match data.store.create_relative(&relative).await {
    Ok(()) => {
      info!(
        relative = %relative.id,
        registered_by = %relative.registered_by,
        "relative registered"
      );
      HttpResponse::Created()
        .content_type("application/json")
        .append_header((
          header::LOCATION,
          format!("/v1/relatives/{}", relative.id),
        ))
        .json(CreatedRto { id: relative.id })
    }
    Err(error) => repository_failure(error),
  }
}

/// Relatives registered by the caller, newest first.
#[utoipa::path(
  get,
  path = "/v1/relatives",
  tag = "relatives",
  responses(
    (status = 200, description = "The caller's relatives", body = [Relative])
  ),
  security(("bearer" = []))
)]
pub async fn list_relatives<S: Store>(
  data: web::Data<AppState<S>>,
  identity: Identity,
) -> impl Responder {
  match data.store.find_relatives_by(&identity.uid).await {
    Ok(mut relatives) => {
      relatives.sort_by(|a, b| b.created_at.cmp(&a.created_at));
      HttpResponse::Ok().json(relatives)
    }
    Err(error) => repository_failure(error),
  }
}

#[utoipa::path(
  delete,
  path = "/v1/relatives/{id}",
  tag = "relatives",
  params(("id" = String, Path, description = "Relative id")),
  responses(
    (status = 204, description = "Relative removed"),
    (
      status = 404,
      description = "No such relative registered by the caller",
      body = HttpError
    )
  ),
  security(("bearer" = []))
)]
pub async fn delete_relative<S: Store>(
  data: web::Data<AppState<S>>,
  identity: Identity,
  path: web::Path<String>,
) -> impl Responder {
  match data.store.delete_relative(&identity.uid, &path).await {
    Ok(()) => HttpResponse::NoContent().finish(),
    Err(RepositoryError::NotFound) => not_found("Relative not found"),
    Err(error) => repository_failure(error),
  }
}

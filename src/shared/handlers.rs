use actix_web::{http::StatusCode, web, HttpResponse, Responder};

use super::{
  health_check::HealthCheckStats, http_error::HttpError, repository::Store,
};
use crate::AppState;

#[utoipa::path(
  get,
  path = "/health",
  tag = "health",
  responses(
    (
      status = 200,
      description = "Last sampled service health",
      body = HealthCheckStats
    ),
    (status = 503, description = "Health not sampled yet", body = HttpError)
  )
)]
pub async fn check_health<S: Store>(
  data: web::Data<AppState<S>>,
) -> impl Responder {
  match data.health.collect() {
    Some(stats) => HttpResponse::Ok().json(stats),
    None => HttpError::response(
      StatusCode::SERVICE_UNAVAILABLE,
      "Health not sampled yet",
    ),
  }
}

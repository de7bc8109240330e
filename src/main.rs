mod families;
mod openapi;
mod permissions;
mod places;
mod registry;
mod relatives;
mod shared;
mod users;

#[cfg(test)]
mod helpers;

use std::{sync::Arc, time::Duration};

use actix_governor::Governor;
use actix_web::{middleware::Logger, web, App, HttpServer};
use actix_web_httpauth::middleware::HttpAuthentication;
use families::{add_member, delete_member, get_family, update_member};
use openapi::ApiDoc;
use permissions::{get_permissions, save_permissions};
use places::{
  client::{GooglePlacesClient, PlacesClient},
  limiter, lookup_places, PlacesLimiter,
};
use registry::get_registry;
use relatives::{create_relative, delete_relative, list_relatives};
use shared::{
  config::Config,
  handlers::check_health,
  health_check::HealthCheck,
  identity::IdentityVerifier,
  middleware::auth_middleware::{admin_validator, bearer_validator},
  repository::Store,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use users::{
  get_profile, get_user, list_users, register_profile, set_roles,
  update_profile,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};
use utoipa_swagger_ui::SwaggerUi;

#[cfg(not(feature = "mongodb"))]
type AppStore = shared::database::InMemoryDatabase;
#[cfg(feature = "mongodb")]
type AppStore = shared::database::MongoDatabase;

const HEALTH_SAMPLE_PERIOD: Duration = Duration::from_secs(60);

// Shared by every worker.
pub struct AppState<S: Store> {
  pub store: S,
  pub config: Config,
  pub identity: IdentityVerifier,
  pub places: Arc<dyn PlacesClient + Send + Sync>,
  pub places_limiter: PlacesLimiter,
  pub health: HealthCheck,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let config = Config::load().map_err(std::io::Error::other)?;
  let store = connect_store(&config).await?;
  let identity =
    IdentityVerifier::new(&config).map_err(std::io::Error::other)?;
  let health = HealthCheck::new();
  health.spawn_sampler(store.clone(), HEALTH_SAMPLE_PERIOD);

  let state = web::Data::new(AppState {
    places: Arc::new(GooglePlacesClient::new(&config)),
    places_limiter: limiter(&config),
    store,
    identity,
    health,
    config: config.clone(),
  });

  info!("Listening on http://{}", config.host);
  HttpServer::new(move || {
    App::new()
      .wrap(Logger::default())
      .configure(app_config(state.clone()))
  })
  .bind(&config.host)?
  .run()
  .await
}

#[cfg(not(feature = "mongodb"))]
async fn connect_store(_config: &Config) -> std::io::Result<AppStore> {
  info!("using the in-memory store");
  Ok(AppStore::new())
}

#[cfg(feature = "mongodb")]
async fn connect_store(config: &Config) -> std::io::Result<AppStore> {
  AppStore::connect(config)
    .await
    .map_err(std::io::Error::other)
}

// Registers the state and every route of the service.
pub fn app_config<S: Store + 'static>(
  state: web::Data<AppState<S>>,
) -> impl FnOnce(&mut web::ServiceConfig) {
  move |config| {
    // Every worker wraps the same limiter.
    let places_governor = Governor::new(&state.places_limiter);

    config
      .app_data(state)
      .route("/health", web::get().to(check_health::<S>))
      .service(
        SwaggerUi::new("/swagger-ui/{_:.*}")
          .url("/api-docs/openapi.json", ApiDoc::openapi()),
      )
      .service(Scalar::with_url("/scalar", ApiDoc::openapi()))
      .service(
        web::scope("/v1")
          .service(
            web::scope("/admin")
              .wrap(HttpAuthentication::with_fn(admin_validator::<S>))
              .route("/users", web::get().to(list_users::<S>))
              .route("/users/{id}", web::get().to(get_user::<S>))
              .route("/users/{id}/roles", web::put().to(set_roles::<S>))
              .route("/registry", web::get().to(get_registry::<S>))
              .route("/permissions", web::get().to(get_permissions::<S>))
              .route("/permissions", web::put().to(save_permissions::<S>)),
          )
          .service(
            web::scope("/me")
              .wrap(HttpAuthentication::with_fn(bearer_validator::<S>))
              .route("", web::get().to(get_profile::<S>))
              .route("", web::post().to(register_profile::<S>))
              .route("", web::put().to(update_profile::<S>)),
          )
          .service(
            web::scope("/family")
              .wrap(HttpAuthentication::with_fn(bearer_validator::<S>))
              .route("", web::get().to(get_family::<S>))
              .route("/members", web::post().to(add_member::<S>))
              .route("/members/{id}", web::put().to(update_member::<S>))
              .route("/members/{id}", web::delete().to(delete_member::<S>)),
          )
          .service(
            web::scope("/relatives")
              .wrap(HttpAuthentication::with_fn(bearer_validator::<S>))
              .route("", web::get().to(list_relatives::<S>))
              .route("", web::post().to(create_relative::<S>))
              .route("/{id}", web::delete().to(delete_relative::<S>)),
          )
          .service(
            web::scope("/places")
              .wrap(places_governor)
              .wrap(HttpAuthentication::with_fn(bearer_validator::<S>))
              .route("", web::get().to(lookup_places::<S>)),
          ),
      );
  }
}

#[cfg(test)]
mod tests {
  use actix_web::{http::StatusCode, test, App};

  use super::*;
  use crate::{
    helpers::tests::{bearer, test_state},
    shared::{
      database::InMemoryDatabase,
      health_check::HealthCheckStats,
      http_error::HttpError,
      identity::tests::{identity_token, signed_token, TEST_IDENTITY_SECRET},
    },
  };

  #[actix_rt::test]
  async fn test_health_reports_sampled_stats() {
    let store = InMemoryDatabase::new();
    let state = test_state(store.clone());
    state.health.sample(&store).await;
    let app = test::init_service(App::new().configure(app_config(state))).await;

    let request = test::TestRequest::get().uri("/health").to_request();
    let stats: HealthCheckStats =
      test::call_and_read_body_json(&app, request).await;
    assert_eq!(stats.database_status, "connected");
  }

  #[actix_rt::test]
  async fn test_unverified_email_is_turned_away() {
    let state = test_state(InMemoryDatabase::new());
    let app = test::init_service(App::new().configure(app_config(state))).await;

    let request = test::TestRequest::get()
      .uri("/v1/me")
      .insert_header(bearer(&identity_token("uid-1", "a@example.com", false)))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: HttpError = test::read_body_json(response).await;
    assert_eq!(body.message, "email_not_verified");
  }

  #[actix_rt::test]
  async fn test_garbage_token_is_unauthorized() {
    let state = test_state(InMemoryDatabase::new());
    let app = test::init_service(App::new().configure(app_config(state))).await;

    let request = test::TestRequest::get()
      .uri("/v1/family")
      .insert_header(bearer("not-a-jwt"))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: HttpError = test::read_body_json(response).await;
    assert_eq!(body.message, "Unauthorized");
  }

  #[actix_rt::test]
  async fn test_missing_credentials_get_json_error() {
    let state = test_state(InMemoryDatabase::new());
    let app = test::init_service(App::new().configure(app_config(state))).await;

    for uri in ["/v1/me", "/v1/admin/users"] {
      let request = test::TestRequest::get().uri(uri).to_request();
      let response = test::call_service(&app, request).await;
      assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

      let body: HttpError = test::read_body_json(response).await;
      assert_eq!(body.message, "Unauthorized");
    }
  }

  #[actix_rt::test]
  async fn test_expired_token_gets_json_error() {
    let state = test_state(InMemoryDatabase::new());
    let app = test::init_service(App::new().configure(app_config(state))).await;
    let expired = signed_token(
      TEST_IDENTITY_SECRET,
      "uid-1",
      "a@example.com",
      true,
      -3600,
    );

    let request = test::TestRequest::get()
      .uri("/v1/relatives")
      .insert_header(bearer(&expired))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: HttpError = test::read_body_json(response).await;
    assert_eq!(body.message, "Unauthorized");
  }

  #[actix_rt::test]
  async fn test_openapi_document_is_served() {
    let state = test_state(InMemoryDatabase::new());
    let app = test::init_service(App::new().configure(app_config(state))).await;

    let request = test::TestRequest::get()
      .uri("/api-docs/openapi.json")
      .to_request();
    let document: serde_json::Value =
      test::call_and_read_body_json(&app, request).await;
    assert!(document["paths"]["/v1/admin/registry"].is_object());
  }
}

pub mod client;

use actix_governor::{
  governor::middleware::NoOpMiddleware, GovernorConfig,
  GovernorConfigBuilder, PeerIpKeyExtractor,
};
use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use client::PlacesError;
use serde::Deserialize;
use tracing::error;
use utoipa::IntoParams;

use crate::shared::{
  config::Config,
  http_error::{bad_request, internal_server_error, HttpError},
  model::address::Address,
  repository::Store,
};
use crate::AppState;

pub type PlacesLimiter = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per peer IP quota of the address lookups. Clones share one limiter, so
/// build it once and hand it to every worker.
pub fn limiter(config: &Config) -> PlacesLimiter {
  GovernorConfigBuilder::default()
    .requests_per_second(config.places_requests_per_second)
    .burst_size(config.places_burst_size)
    .finish()
    .unwrap_or_default()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PlacesQuery {
  /// Free text to autocomplete.
  pub input: Option<String>,
  /// Place to resolve into a street address. Wins over `input`.
  #[serde(rename = "placeId")]
  pub place_id: Option<String>,
}

#[utoipa::path(
  get,
  path = "/v1/places",
  tag = "places",
  params(PlacesQuery),
  responses(
    (
      status = 200,
      description = "Autocomplete predictions, or the parsed address when \
                     placeId is given",
      body = Address
    ),
    (
      status = 400,
      description = "Neither input nor placeId given",
      body = HttpError
    ),
    (status = 429, description = "Too many lookups from this address"),
    (
      status = 500,
      description = "Missing API key or unexpected failure",
      body = HttpError
    )
  ),
  security(("bearer" = []))
)]
pub async fn lookup_places<S: Store>(
  data: web::Data<AppState<S>>,
  query: web::Query<PlacesQuery>,
) -> impl Responder {
  if !data.places.is_configured() {
    error!("places lookup requested but PLACES_API_KEY is not set");
    return HttpError::response(
      StatusCode::INTERNAL_SERVER_ERROR,
      "Server configuration error: Missing API key.",
    );
  }

  if let Some(place_id) = non_blank(&query.place_id) {
    return match data.places.details(place_id).await {
      Ok(address) => HttpResponse::Ok().json(address),
      Err(places_error) => {
        places_failure(places_error, "Failed to fetch place details")
      }
    };
  }

  if let Some(input) = non_blank(&query.input) {
    return match data.places.autocomplete(input).await {
      Ok(predictions) => HttpResponse::Ok().json(predictions),
      Err(places_error) => {
        places_failure(places_error, "Failed to fetch autocomplete suggestions")
      }
    };
  }

  bad_request("Missing \"input\" or \"placeId\" parameter")
}

fn non_blank(value: &Option<String>) -> Option<&str> {
  value
    .as_deref()
    .map(str::trim)
    .filter(|value| !value.is_empty())
}

fn places_failure(
  places_error: PlacesError,
  upstream_message: &str,
) -> HttpResponse {
  match places_error {
    PlacesError::Upstream { status, body } => {
      error!(status, %body, "places API error");
      let status =
        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
      HttpError::response(status, upstream_message)
    }
    PlacesError::MissingApiKey => HttpError::response(
      StatusCode::INTERNAL_SERVER_ERROR,
      "Server configuration error: Missing API key.",
    ),
    other => {
      error!(error = %other, "places lookup failed");
      internal_server_error()
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use actix_web::{http::StatusCode, test, App};
  use mockall::predicate::eq;
  use serde_json::{json, Value};

  use super::client::MockPlacesClient;
  use super::*;
  use crate::{
    app_config,
    helpers::tests::{
      bearer, peer, state_with_config, test_config, test_state_with_places,
    },
    shared::database::InMemoryDatabase,
    shared::identity::tests::identity_token,
  };

  fn configured_mock() -> MockPlacesClient {
    let mut places = MockPlacesClient::new();
    places.expect_is_configured().return_const(true);
    places
  }

  #[actix_web::test]
  async fn test_autocomplete_returns_predictions() {
    let mut places = configured_mock();
    places
      .expect_autocomplete()
      .with(eq("via roma"))
      .times(1)
      .returning(|_| {
        Ok(vec![json!({
          "place_id": "abc",
          "description": "Via Roma, Milano"
        })])
      });

    let state = test_state_with_places(Arc::new(places));
    let app = test::init_service(App::new().configure(app_config(state))).await;

    let request = test::TestRequest::get()
      .uri("/v1/places?input=via%20roma")
      .peer_addr(peer())
      .insert_header(bearer(&identity_token("uid-1", "a@example.com", true)))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body[0]["place_id"], "abc");
  }

  #[actix_web::test]
  async fn test_place_id_wins_and_is_reshaped() {
    let mut places = configured_mock();
    places.expect_autocomplete().times(0);
    places.expect_details().with(eq("abc")).times(1).returning(|_| {
      Ok(Address {
        street: "Via Roma".to_string(),
        city: "Milano".to_string(),
        ..Default::default()
      })
    });

    let state = test_state_with_places(Arc::new(places));
    let app = test::init_service(App::new().configure(app_config(state))).await;

    let request = test::TestRequest::get()
      .uri("/v1/places?input=ignored&placeId=abc")
      .peer_addr(peer())
      .insert_header(bearer(&identity_token("uid-1", "a@example.com", true)))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = test::read_body_json(response).await;
    assert_eq!(
      body,
      json!({
        "via": "Via Roma",
        "numeroCivico": "",
        "citta": "Milano",
        "provincia": "",
        "cap": ""
      })
    );
  }

  #[actix_web::test]
  async fn test_missing_parameters_is_bad_request() {
    let state = test_state_with_places(Arc::new(configured_mock()));
    let app = test::init_service(App::new().configure(app_config(state))).await;

    let request = test::TestRequest::get()
      .uri("/v1/places?input=%20%20")
      .peer_addr(peer())
      .insert_header(bearer(&identity_token("uid-1", "a@example.com", true)))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: HttpError = test::read_body_json(response).await;
    assert_eq!(body.message, "Missing \"input\" or \"placeId\" parameter");
  }

  #[actix_web::test]
  async fn test_missing_api_key_is_server_error() {
    let mut places = MockPlacesClient::new();
    places.expect_is_configured().return_const(false);
    let state = test_state_with_places(Arc::new(places));
    let app = test::init_service(App::new().configure(app_config(state))).await;

    let request = test::TestRequest::get()
      .uri("/v1/places?input=via")
      .peer_addr(peer())
      .insert_header(bearer(&identity_token("uid-1", "a@example.com", true)))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: HttpError = test::read_body_json(response).await;
    assert_eq!(body.message, "Server configuration error: Missing API key.");
  }

  #[actix_web::test]
  async fn test_upstream_status_is_forwarded() {
    let mut places = configured_mock();
    places.expect_autocomplete().returning(|_| {
      Err(PlacesError::Upstream {
        status: 403,
        body: "REQUEST_DENIED".to_string(),
      })
    });
    let state = test_state_with_places(Arc::new(places));
    let app = test::init_service(App::new().configure(app_config(state))).await;

    let request = test::TestRequest::get()
      .uri("/v1/places?input=via")
      .peer_addr(peer())
      .insert_header(bearer(&identity_token("uid-1", "a@example.com", true)))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: HttpError = test::read_body_json(response).await;
    assert_eq!(body.message, "Failed to fetch autocomplete suggestions");
  }

  #[actix_web::test]
  async fn test_lookup_requires_identity() {
    let state = test_state_with_places(Arc::new(MockPlacesClient::new()));
    let app = test::init_service(App::new().configure(app_config(state))).await;

    let request = test::TestRequest::get()
      .uri("/v1/places?input=via")
      .peer_addr(peer())
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
  }

  #[actix_web::test]
  async fn test_lookups_are_rate_limited_per_peer() {
    let mut places = configured_mock();
    places
      .expect_autocomplete()
      .times(1)
      .returning(|_| Ok(Vec::new()));
    let mut config = test_config();
    config.places_requests_per_second = 1;
    config.places_burst_size = 1;
    let state =
      state_with_config(config, InMemoryDatabase::new(), Arc::new(places));
    let app = test::init_service(App::new().configure(app_config(state))).await;
    let token = identity_token("uid-1", "a@example.com", true);

    let request = test::TestRequest::get()
      .uri("/v1/places?input=via")
      .peer_addr(peer())
      .insert_header(bearer(&token))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = test::TestRequest::get()
      .uri("/v1/places?input=via")
      .peer_addr(peer())
      .insert_header(bearer(&token))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
  }
}

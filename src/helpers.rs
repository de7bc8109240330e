#[cfg(test)]
pub mod tests {
  use std::{net::SocketAddr, sync::Arc};

  use actix_web::{http::header, web};

  use crate::{
    places::{
      client::{MockPlacesClient, PlacesClient},
      limiter,
    },
    shared::{
      config::Config,
      database::InMemoryDatabase,
      health_check::HealthCheck,
      identity::{tests::TEST_IDENTITY_SECRET, IdentityVerifier},
      model::user::User,
      repository::{user_repository::tests::fake_user, UserRepository},
      role::Role,
    },
    AppState,
  };

  pub const TEST_MASTER_KEY: &str = "test-master-key";

  pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
      "IDENTITY_JWT_SECRET" => Some(TEST_IDENTITY_SECRET.to_string()),
      "MASTER_KEY" => Some(TEST_MASTER_KEY.to_string()),
      "PLACES_API_KEY" => Some("test-places-key".to_string()),
      "PLACES_BURST_SIZE" => Some("100".to_string()),
      _ => None,
    })
    .expect("test configuration is valid")
  }

  pub fn state_with_config(
    config: Config,
    store: InMemoryDatabase,
    places: Arc<dyn PlacesClient + Send + Sync>,
  ) -> web::Data<AppState<InMemoryDatabase>> {
    web::Data::new(AppState {
      identity: IdentityVerifier::new(&config)
        .expect("test identity key is valid"),
      places_limiter: limiter(&config),
      store,
      config,
      places,
      health: HealthCheck::new(),
    })
  }

  pub fn app_state(
    store: InMemoryDatabase,
    places: Arc<dyn PlacesClient + Send + Sync>,
  ) -> web::Data<AppState<InMemoryDatabase>> {
    state_with_config(test_config(), store, places)
  }

  pub fn test_state(
    store: InMemoryDatabase,
  ) -> web::Data<AppState<InMemoryDatabase>> {
    app_state(store, Arc::new(MockPlacesClient::new()))
  }

  pub fn test_state_with_places(
    places: Arc<dyn PlacesClient + Send + Sync>,
  ) -> web::Data<AppState<InMemoryDatabase>> {
    app_state(InMemoryDatabase::new(), places)
  }

  pub async fn seed_user(store: &InMemoryDatabase, roles: Vec<Role>) -> User {
    let user = fake_user(roles);
    store.create_user(&user).await.expect("seeded user is new");
    user
  }

  pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
  }

  pub fn peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 12345))
  }
}

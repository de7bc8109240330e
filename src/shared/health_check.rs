use std::{
  sync::{Arc, RwLock},
  time::Duration,
};

use actix_web::rt::{spawn, time::interval};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::repository::Store;

#[derive(ToSchema, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckStats {
  pub database_status: String,
  pub database_name: String,
}

/// Last sampled database health, refreshed in the background.
#[derive(Clone, Default)]
pub struct HealthCheck {
  last_stats: Arc<RwLock<Option<HealthCheckStats>>>,
}

impl HealthCheck {
  pub fn new() -> Self {
    Self::default()
  }

  /// Samples the store every `period`. Must run inside an actix system.
  pub fn spawn_sampler<S: Store + 'static>(&self, store: S, period: Duration) {
    let health = self.clone();
    spawn(async move {
      let mut interval = interval(period);
      loop {
        interval.tick().await;
        health.sample(&store).await;
      }
    });
  }

  pub async fn sample<S: Store>(&self, store: &S) {
    let database_stats = store.stats().await;
    let stats = HealthCheckStats {
      database_status: String::from(if database_stats.connected {
        "connected"
      } else {
        "connecting"
      }),
      database_name: database_stats.name,
    };
    if let Ok(mut last_stats) = self.last_stats.write() {
      *last_stats = Some(stats);
    }
  }

  pub fn collect(&self) -> Option<HealthCheckStats> {
    self
      .last_stats
      .read()
      .ok()
      .and_then(|stats| stats.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shared::database::InMemoryDatabase;

  #[actix_web::test]
  async fn test_collect_is_empty_until_sampled() {
    let health = HealthCheck::new();
    assert!(health.collect().is_none());

    health.sample(&InMemoryDatabase::new()).await;
    assert_eq!(
      health.collect(),
      Some(HealthCheckStats {
        database_status: "connected".to_string(),
        database_name: "in-memory".to_string(),
      })
    );
  }

  #[actix_web::test]
  async fn test_sampler_refreshes_in_background() {
    let health = HealthCheck::new();
    health.spawn_sampler(InMemoryDatabase::new(), Duration::from_millis(10));
    actix_web::rt::time::sleep(Duration::from_millis(50)).await;
    assert!(health.collect().is_some());
  }
}

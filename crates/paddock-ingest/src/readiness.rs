//! Startup wait for the results store.

use std::{fmt::Display, future::Future};

use tracing::{info, warn};

use crate::{Error, Result, config::Readiness};

/// Call `connect` until it succeeds, at most `policy.attempts` times with a
/// fixed pause in between.
///
/// `connect` is expected to open the store and prove it reachable.
pub async fn wait_for_store<S, E, F, Fut>(policy: &Readiness, mut connect: F) -> Result<S>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<S, E>>,
  E: Display,
{
  let attempts = policy.attempts.max(1);
  let mut last = String::new();

  for attempt in 1..=attempts {
    match connect().await {
      Ok(store) => {
        info!(attempt, "store is ready");
        return Ok(store);
      }
      Err(e) => {
        last = e.to_string();
        warn!(attempt, attempts, error = %last, "store not ready");
        if attempt < attempts {
          tokio::time::sleep(policy.interval()).await;
        }
      }
    }
  }

  Err(Error::StoreUnavailable { attempts, last })
}

//! Upstream source adapters for Paddock.
//!
//! - [`openf1`]: the OpenF1 session API (drivers, meetings, sessions,
//!   position time-series).
//! - [`files`]: season-result and lookup CSV files in a remote file store.
//! - [`tabular`]: pure CSV → row decoding shared by the file adapter.
//!
//! Both HTTP adapters degrade a failed request (network error, non-2xx) to
//! an empty result and log it; only undecodable payloads surface as errors.

pub mod error;
pub mod files;
pub mod openf1;
pub mod tabular;

pub use error::{Error, Result};
pub use files::FileStore;
pub use openf1::OpenF1Client;

use reqwest::Url;

/// Parse `base` as a directory URL, so joined paths append to it rather
/// than replacing its last segment.
fn base_url(base: &str) -> Result<Url> {
  let mut base = base.to_owned();
  if !base.ends_with('/') {
    base.push('/');
  }
  Url::parse(&base).map_err(|_| Error::InvalidUrl(base))
}

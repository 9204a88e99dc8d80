//! Error types for the upstream source adapters.
//!
//! Transport failures and non-2xx responses are not errors here: the
//! adapters log them and return an empty result. What remains are failures
//! the pipeline cannot paper over.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),

  #[error("invalid base URL {0:?}")]
  InvalidUrl(String),

  #[error("could not decode {endpoint} response: {source}")]
  Decode {
    endpoint: String,
    #[source]
    source:   serde_json::Error,
  },

  #[error("malformed CSV in {file}: {source}")]
  Csv {
    file:   String,
    #[source]
    source: csv::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Remote file store holding the season-result and lookup CSV files.

use std::time::Duration;

use paddock_core::{model::TabularRow, resolve::LookupTable};
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  tabular::{CODE_COLUMN, LookupKind, parse_rows},
};

pub const DEFAULT_BASE_URL: &str =
  "https://raw.githubusercontent.com/Shubhanflash22/F1-Quali-V-Race/refs/heads/main/Files/";

/// Fetches named files relative to a base URL.
#[derive(Clone)]
pub struct FileStore {
  client: Client,
  base:   Url,
}

impl FileStore {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base: crate::base_url(base_url)? })
  }

  /// Raw bytes of `filename`, or `None` when the file could not be fetched.
  pub async fn fetch(&self, filename: &str) -> Result<Option<Vec<u8>>> {
    let url = self
      .base
      .join(filename)
      .map_err(|_| Error::InvalidUrl(format!("{}{filename}", self.base)))?;
    debug!(%url, "fetching file");

    let resp = match self.client.get(url).send().await {
      Ok(resp) => resp,
      Err(e) => {
        warn!(filename, error = %e, "file request failed; treating as empty");
        return Ok(None);
      }
    };
    if !resp.status().is_success() {
      warn!(filename, status = %resp.status(), "file not available; treating as empty");
      return Ok(None);
    }
    match resp.bytes().await {
      Ok(body) => Ok(Some(body.to_vec())),
      Err(e) => {
        warn!(filename, error = %e, "reading file failed; treating as empty");
        Ok(None)
      }
    }
  }

  /// Fetch `filename` and decode it into header-keyed rows.
  ///
  /// An unreachable file yields no rows. Malformed CSV is an error.
  pub async fn read_rows(&self, filename: &str) -> Result<Vec<TabularRow>> {
    let Some(bytes) = self.fetch(filename).await? else {
      return Ok(Vec::new());
    };
    let rows = parse_rows(&bytes).map_err(|source| Error::Csv {
      file: filename.to_owned(),
      source,
    })?;
    info!(filename, rows = rows.len(), "read file");
    Ok(rows)
  }

  /// Load a name → code lookup table from `filename`.
  pub async fn load_lookup(&self, filename: &str, kind: LookupKind) -> Result<LookupTable> {
    let rows = self.read_rows(filename).await?;
    let table = LookupTable::from_rows(&rows, kind.name_column(), CODE_COLUMN);
    if table.is_empty() {
      warn!(filename, ?kind, "lookup table is empty; every name will resolve to UNKNOWN");
    }
    Ok(table)
  }
}

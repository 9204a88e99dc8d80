//! paddock-ingest binary.
//!
//! Reads `paddock.toml` (or the file named by `PADDOCK_CONFIG`), waits for the
//! SQLite results store, ensures its schema and runs one ingest.
//!
//! Exits non-zero only when the store never becomes reachable (or the
//! configuration cannot be read). A run that aborts part way is logged and
//! still exits zero.

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::Context as _;
use paddock_core::store::ResultStore;
use paddock_ingest::{Error, Ingest, IngestConfig, wait_for_store};
use paddock_store_sqlite::SqliteStore;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "PADDOCK_CONFIG";
const DEFAULT_CONFIG: &str = "paddock.toml";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let config_path = std::env::var_os(CONFIG_ENV)
    .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
  let config = IngestConfig::load(&config_path)
    .with_context(|| format!("failed to read config from {config_path:?}"))?;

  let store_path = expand_tilde(&config.store_path);
  let store = match wait_for_store(&config.readiness, || open_store(&store_path)).await {
    Ok(store) => store,
    Err(e) => {
      error!(error = %e, path = ?store_path, "results store unavailable");
      return Ok(ExitCode::FAILURE);
    }
  };

  match run(&store, &config).await {
    Ok(()) => info!("ingest complete"),
    Err(e) => error!(error = %e, "ingest aborted"),
  }
  Ok(ExitCode::SUCCESS)
}

/// Open the store and prove it answers.
async fn open_store(path: &Path) -> paddock_store_sqlite::Result<SqliteStore> {
  let store = SqliteStore::open(path).await?;
  store.ping().await?;
  Ok(store)
}

async fn run(store: &SqliteStore, config: &IngestConfig) -> paddock_ingest::Result<()> {
  store.ensure_schema().await.map_err(Error::store)?;
  let report = Ingest::new(store, config)?.run().await?;
  if report.failed() > 0 {
    error!(failed = report.failed(), "some records were not written");
  }
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

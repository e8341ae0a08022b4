//! Wiring for the WorkLyft recording server: configuration and the
//! top-level router.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use worklyft_hms::{HmsClient, HmsConfig};
use worklyft_recording::{RecordingConfig, RecordingService};
use worklyft_store_sqlite::SqliteStore;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

/// Runtime server configuration, deserialised from `config.toml` and
/// `WORKLYFT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
  pub hms:        HmsConfig,
  #[serde(default)]
  pub recording:  RecordingConfig,
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment.
  ///
  /// Nested keys use a double underscore: `WORKLYFT_HMS__SECRET`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("WORKLYFT")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }
}

// ─── Application ─────────────────────────────────────────────────────────────

pub type Service = RecordingService<SqliteStore, HmsClient>;

/// The full HTTP application with request tracing.
pub fn router(service: Service) -> Router {
  worklyft_api::api_router(service).layer(TraceLayer::new_for_http())
}

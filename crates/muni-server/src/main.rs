//! muni-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite entity directory, and serves the recipient/visibility API over HTTP.
//!
//! ```text
//! cargo run -p muni-server -- --config config.toml --fixtures seed.sql
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use muni_core::AccessCore;
use muni_store_sqlite::SqliteDirectory;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Recipient resolution and visibility service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// SQL file to execute against the directory at startup; overrides the
  /// `fixtures` config key.
  #[arg(long, value_name = "FILE")]
  fixtures: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let directory = SqliteDirectory::open(&store_path)
    .await
    .with_context(|| format!("failed to open directory at {store_path:?}"))?;

  if let Some(fixtures) = cli.fixtures.as_ref().or(server_cfg.fixtures.as_ref()) {
    let fixtures = expand_tilde(fixtures);
    let sql = tokio::fs::read_to_string(&fixtures)
      .await
      .with_context(|| format!("failed to read fixtures {fixtures:?}"))?;
    directory
      .execute_batch(sql)
      .await
      .with_context(|| format!("failed to load fixtures {fixtures:?}"))?;
    tracing::info!(path = ?fixtures, "loaded fixtures");
  }

  tracing::info!(
    top_admin = ?server_cfg.roles.top_admin,
    global = ?server_cfg.roles.global,
    "global role set"
  );
  let core = AccessCore::new(Arc::new(directory), Arc::new(server_cfg.roles.clone()));

  let app = Router::new()
    .nest("/api", muni_api::api_router(Arc::new(core)))
    .layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

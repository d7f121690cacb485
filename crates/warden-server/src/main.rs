//! warden server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the facility API over HTTP under
//! `/api`.
//!
//! Authentication is delegated to a trusted fronting proxy: if the
//! `x-member-id`, `x-rank`, and `x-citizen-id` headers are all present and
//! well-formed, they are attached to the request as an
//! [`Identity`] extension. No verification happens here, so the
//! listener must not be exposed without that proxy in front.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{
  Router,
  extract::Request,
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use clap::Parser;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use warden_core::identity::{Identity, Rank};
use warden_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Warden facility server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml` and the
/// `WARDEN_*` environment.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:       String,
  #[serde(default = "default_port")]
  port:       u16,
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_host() -> String {
  "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
  8080
}

fn default_store_path() -> PathBuf {
  PathBuf::from("warden.db")
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("WARDEN"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let app = Router::new()
    .nest("/api", warden_api::api_router(Arc::new(store)))
    .layer(axum::middleware::from_fn(attach_identity))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Attach the caller identity asserted by the fronting proxy, if any.
async fn attach_identity(mut req: Request, next: Next) -> Response {
  if let Some(identity) = identity_from_headers(req.headers()) {
    req.extensions_mut().insert(identity);
  }
  next.run(req).await
}

/// All three headers present and well-formed, or no identity at all.
fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
  let member_id = headers.get("x-member-id")?.to_str().ok()?.parse().ok()?;
  let rank = Rank::parse(headers.get("x-rank")?.to_str().ok()?)?;
  let citizen_id = headers.get("x-citizen-id")?.to_str().ok()?.to_owned();
  Some(Identity { member_id, rank, citizen_id })
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

#[cfg(test)]
mod tests {
  use super::*;

  fn headers(entries: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in entries {
      map.insert(
        axum::http::HeaderName::try_from(*name).unwrap(),
        value.parse().unwrap(),
      );
    }
    map
  }

  #[test]
  fn identity_requires_all_three_headers() {
    let full = headers(&[
      ("x-member-id", "42"),
      ("x-rank", "relative"),
      ("x-citizen-id", "1100000000001"),
    ]);
    let identity = identity_from_headers(&full).unwrap();
    assert_eq!(identity.member_id, 42);
    assert_eq!(identity.rank, Rank::Relative);

    let partial = headers(&[("x-member-id", "42"), ("x-rank", "staff")]);
    assert!(identity_from_headers(&partial).is_none());
  }

  #[test]
  fn malformed_header_values_yield_no_identity() {
    let bad_rank = headers(&[
      ("x-member-id", "42"),
      ("x-rank", "warlord"),
      ("x-citizen-id", "1100000000001"),
    ]);
    assert!(identity_from_headers(&bad_rank).is_none());

    let bad_id = headers(&[
      ("x-member-id", "forty-two"),
      ("x-rank", "staff"),
      ("x-citizen-id", "1100000000001"),
    ]);
    assert!(identity_from_headers(&bad_id).is_none());
  }
}

//! factwall HTTP server.
//!
//! Serves the JSON API under `/api`, optionally the built front-end from
//! `static_dir`, and stamps `Cache-Control` headers on every response.

pub mod admin;
pub mod cache;
pub mod error;
pub mod facts;
pub mod session;
pub mod visitor;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router, middleware,
  routing::{delete, get, post},
};
use factwall_core::store::FactStore;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::cache::ShellCaching;

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  #[default]
  Development,
  Production,
}

/// Server configuration, loaded from TOML and `FACTWALL_*` variables.
#[derive(Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  /// The parent directory is created at start-up if missing.
  #[serde(default = "default_database_path")]
  pub database_path:  PathBuf,
  pub admin_password: String,
  #[serde(default)]
  pub environment:    Environment,
  /// Built front-end assets, served for any path the API does not claim.
  #[serde(default)]
  pub static_dir:     Option<PathBuf>,
  /// Cache the app shell for this many seconds instead of forbidding storage.
  #[serde(default)]
  pub shell_max_age:  Option<u64>,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 3000 }
fn default_database_path() -> PathBuf { PathBuf::from("./data/facts.db") }

impl ServerConfig {
  /// Cookies carry the `Secure` attribute only in production.
  pub fn secure_cookies(&self) -> bool { self.environment == Environment::Production }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: FactStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the whole application.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: FactStore + Clone + 'static,
{
  let shell = ShellCaching::from_max_age(state.config.shell_max_age);
  let static_dir = state.config.static_dir.clone();

  let api = Router::new()
    .route("/api/session",            get(visitor::session::<S>))
    .route("/api/feed",               get(visitor::feed::<S>))
    .route("/api/username",           post(visitor::set_username::<S>))
    .route("/api/stats",              get(visitor::stats::<S>))
    .route("/api/facts",              get(facts::random::<S>).post(facts::create::<S>))
    .route("/api/facts/top",          get(facts::top::<S>))
    .route("/api/facts/{id}",         get(facts::get_one::<S>))
    .route("/api/facts/{id}/vote",    post(facts::vote::<S>))
    .route("/api/admin/login",        post(admin::login::<S>))
    .route("/api/admin/logout",       post(admin::logout))
    .route("/api/admin/overview",     get(admin::overview::<S>))
    .route("/api/admin/stats",        get(admin::stats::<S>))
    .route("/api/admin/facts/{id}",   delete(admin::delete_fact::<S>))
    .route("/api/admin/users/{id}",   delete(admin::delete_user::<S>))
    .route("/api/admin/remap",        post(admin::remap::<S>))
    .with_state(state);

  let app = match static_dir {
    Some(dir) => api.fallback_service(ServeDir::new(dir)),
    None => api,
  };

  app
    .layer(middleware::from_fn_with_state(shell, cache::cache_headers))
    .layer(TraceLayer::new_for_http())
}

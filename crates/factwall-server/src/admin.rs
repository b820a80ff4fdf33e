//! Admin routes, gated by the `admin_auth` cookie.
//!
//! The cookie holds the configured password itself. This only keeps casual
//! visitors out of the admin view; there is no hashing or rate limiting.

use axum::{
  Json,
  extract::{FromRequestParts, Path, State, rejection::JsonRejection},
  http::request::Parts,
};
use axum_extra::extract::CookieJar;
use factwall_core::{
  fact::{Fact, SessionId},
  stats::{AdminStats, AuthorSummary, SessionSummary},
  store::FactStore,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{AppState, error::Error, facts::parse_fact_id, session};

/// Zero-size marker: present in the handler means the request carried a
/// valid admin cookie.
pub struct Admin;

impl<S> FromRequestParts<AppState<S>> for Admin
where
  S: FactStore + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let jar = CookieJar::from_headers(&parts.headers);
    if session::is_admin(&jar, &state.config.admin_password) {
      Ok(Admin)
    } else {
      Err(Error::Unauthorized)
    }
  }
}

// ─── Login / logout ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub password: String,
}

/// `POST /api/admin/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>), Error>
where
  S: FactStore + Clone + 'static,
{
  let Json(body) = body?;
  let expected = &state.config.admin_password;
  if expected.is_empty() || body.password != *expected {
    warn!("rejected admin login");
    return Err(Error::Unauthorized);
  }
  info!("admin logged in");
  Ok((session::grant_admin(jar, &state.config), Json(json!({ "success": true }))))
}

/// `POST /api/admin/logout`
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
  (session::revoke_admin(jar), Json(json!({ "success": true })))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Overview {
  pub facts:    Vec<Fact>,
  pub sessions: Vec<SessionSummary>,
  pub users:    Vec<AuthorSummary>,
}

/// `GET /api/admin/overview`
pub async fn overview<S>(_: Admin, State(state): State<AppState<S>>) -> Result<Json<Overview>, Error>
where
  S: FactStore + Clone + 'static,
{
  let store = &state.store;
  let facts = store.list_all().await.map_err(|e| Error::Store(Box::new(e)))?;
  let sessions = store.sessions().await.map_err(|e| Error::Store(Box::new(e)))?;
  let users = store.authors().await.map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(Overview { facts, sessions, users }))
}

/// `GET /api/admin/stats`
pub async fn stats<S>(_: Admin, State(state): State<AppState<S>>) -> Result<Json<AdminStats>, Error>
where
  S: FactStore + Clone + 'static,
{
  let stats = state
    .store
    .admin_stats()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(stats))
}

// ─── Moderation ───────────────────────────────────────────────────────────────

/// `DELETE /api/admin/facts/{id}`
pub async fn delete_fact<S>(
  _: Admin,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Value>, Error>
where
  S: FactStore + Clone + 'static,
{
  let id = parse_fact_id(&id)?;
  let removed = state
    .store
    .delete_by_id(id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  if !removed {
    return Err(Error::not_found("fact"));
  }
  info!(fact_id = %id, "admin deleted fact");
  Ok(Json(json!({ "success": true })))
}

/// `DELETE /api/admin/users/{id}`: delete every fact submitted by a session.
pub async fn delete_user<S>(
  _: Admin,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Value>, Error>
where
  S: FactStore + Clone + 'static,
{
  let session = SessionId::from(id);
  let removed = state
    .store
    .delete_all_by_session(session.clone())
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  if removed == 0 {
    return Err(Error::not_found("user"));
  }
  info!(session = %session, facts = removed, "admin deleted user");
  Ok(Json(json!({ "success": true, "count": removed })))
}

#[derive(Debug, Deserialize)]
pub struct RemapBody {
  pub from: Option<String>,
  pub to:   Option<String>,
}

/// `POST /api/admin/remap`: move every fact of one session to another.
pub async fn remap<S>(
  _: Admin,
  State(state): State<AppState<S>>,
  body: Result<Json<RemapBody>, JsonRejection>,
) -> Result<Json<Value>, Error>
where
  S: FactStore + Clone + 'static,
{
  let Json(body) = body?;
  let non_empty = |s: Option<String>| s.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
  let (Some(from), Some(to)) = (non_empty(body.from), non_empty(body.to)) else {
    return Err(Error::BadRequest("both from and to session ids are required".to_string()));
  };
  if from == to {
    return Err(Error::BadRequest("from and to must differ".to_string()));
  }

  let moved = state
    .store
    .reassign_session(SessionId::from(from.clone()), SessionId::from(to.clone()))
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  if moved == 0 {
    return Err(Error::NotFound("no facts found for that session".to_string()));
  }
  info!(%from, %to, facts = moved, "admin remapped session");
  Ok(Json(json!({ "success": true, "count": moved })))
}

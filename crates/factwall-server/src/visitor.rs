//! Visitor-facing page payloads and the public statistics aggregate.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use axum_extra::extract::CookieJar;
use factwall_core::{
  fact::{FactView, SessionId},
  stats::Stats,
  store::FactStore,
  validate::check_name,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{AppState, error::Error, facts::DEFAULT_FEED_LIMIT, session};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
  pub session_id: SessionId,
  pub username:   Option<String>,
}

/// `GET /api/session`
pub async fn session<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
) -> (CookieJar, Json<SessionInfo>)
where
  S: FactStore + Clone + 'static,
{
  let (jar, session_id) = session::get_or_create(jar, &state.config);
  let username = session::username(&jar);
  (jar, Json(SessionInfo { session_id, username }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
  pub session_id:    SessionId,
  pub username:      Option<String>,
  pub initial_facts: Vec<FactView>,
}

/// `GET /api/feed`: everything the home page renders on first load.
pub async fn feed<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
) -> Result<(CookieJar, Json<Feed>), Error>
where
  S: FactStore + Clone + 'static,
{
  let (jar, session_id) = session::get_or_create(jar, &state.config);
  let initial_facts = state
    .store
    .random_sample(DEFAULT_FEED_LIMIT, session_id.clone())
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  let username = session::username(&jar);
  Ok((jar, Json(Feed { session_id, username, initial_facts })))
}

#[derive(Debug, Deserialize)]
pub struct UsernameBody {
  pub username: String,
}

/// `POST /api/username`: remember a display name in a readable cookie.
pub async fn set_username<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  body: Result<Json<UsernameBody>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>), Error>
where
  S: FactStore + Clone + 'static,
{
  let Json(body) = body?;
  let name = check_name(&body.username)?;
  let jar = session::set_username(jar, name, &state.config);
  Ok((jar, Json(json!({ "success": true }))))
}

/// `GET /api/stats`
pub async fn stats<S>(State(state): State<AppState<S>>) -> Result<Json<Stats>, Error>
where
  S: FactStore + Clone + 'static,
{
  let stats = state
    .store
    .stats()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(stats))
}

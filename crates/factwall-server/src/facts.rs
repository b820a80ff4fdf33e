//! Handlers for `/api/facts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/facts` | `?limit=N`, random sample |
//! | `GET`  | `/api/facts/top` | `?limit=N`, by score |
//! | `GET`  | `/api/facts/{id}` | Single fact |
//! | `POST` | `/api/facts` | Body: [`CreateBody`]; returns 201 + stored fact |
//! | `POST` | `/api/facts/{id}/vote` | Body: [`VoteBody`]; returns the updated fact |
//!
//! Every handler resolves the caller's session first, so the session cookie
//! is minted on whichever request arrives first.

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use factwall_core::{
  fact::{Fact, FactView, NewFact},
  store::{FactStore, MAX_FEED_LIMIT},
  vote::VoteType,
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{AppState, error::Error, session};

/// Feed size when `limit` is absent or unparseable.
pub const DEFAULT_FEED_LIMIT: usize = 10;

// ─── Feeds ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FeedParams {
  /// Kept as text so a malformed value falls back to the default instead of
  /// rejecting the request.
  pub limit: Option<String>,
}

impl FeedParams {
  pub fn limit(&self) -> usize {
    self
      .limit
      .as_deref()
      .and_then(|s| s.trim().parse::<i64>().ok())
      .map_or(DEFAULT_FEED_LIMIT, |n| n.clamp(0, MAX_FEED_LIMIT as i64) as usize)
  }
}

/// `GET /api/facts[?limit=N]`
pub async fn random<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  Query(params): Query<FeedParams>,
) -> Result<(CookieJar, Json<Vec<FactView>>), Error>
where
  S: FactStore + Clone + 'static,
{
  let (jar, session) = session::get_or_create(jar, &state.config);
  let facts = state
    .store
    .random_sample(params.limit(), session)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok((jar, Json(facts)))
}

/// `GET /api/facts/top[?limit=N]`
pub async fn top<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  Query(params): Query<FeedParams>,
) -> Result<(CookieJar, Json<Vec<FactView>>), Error>
where
  S: FactStore + Clone + 'static,
{
  let (jar, session) = session::get_or_create(jar, &state.config);
  let facts = state
    .store
    .top_ranked(params.limit(), session)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok((jar, Json(facts)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// Path ids that are not UUIDs cannot name a fact, so they are reported as
/// missing rather than malformed.
pub(crate) fn parse_fact_id(raw: &str) -> Result<Uuid, Error> {
  Uuid::parse_str(raw).map_err(|_| Error::not_found("fact"))
}

/// `GET /api/facts/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  Path(id): Path<String>,
) -> Result<(CookieJar, Json<FactView>), Error>
where
  S: FactStore + Clone + 'static,
{
  let (jar, session) = session::get_or_create(jar, &state.config);
  let id = parse_fact_id(&id)?;
  let fact = state
    .store
    .get_by_id(id, session)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or_else(|| Error::not_found("fact"))?;
  Ok((jar, Json(fact)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub content:     String,
  pub author_name: String,
}

/// `POST /api/facts`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, Error>
where
  S: FactStore + Clone + 'static,
{
  let (jar, session) = session::get_or_create(jar, &state.config);
  let Json(body) = body?;
  let input = NewFact::new(&body.content, &body.author_name, session)?;

  let fact: Fact = state
    .store
    .create(input)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  info!(fact_id = %fact.id, author = %fact.author_name, "fact submitted");
  Ok((StatusCode::CREATED, jar, Json(fact)))
}

// ─── Vote ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteBody {
  /// `"up"` or `"down"`.
  pub vote_type: String,
}

/// `POST /api/facts/{id}/vote`
///
/// Repeating a vote withdraws it; voting the other way flips it. Voting on
/// one's own fact is forbidden.
pub async fn vote<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  Path(id): Path<String>,
  body: Result<Json<VoteBody>, JsonRejection>,
) -> Result<(CookieJar, Json<FactView>), Error>
where
  S: FactStore + Clone + 'static,
{
  let (jar, session) = session::get_or_create(jar, &state.config);
  let Json(body) = body?;
  let vote_type: VoteType = body
    .vote_type
    .parse()
    .map_err(|_| Error::BadRequest("invalid vote type".to_string()))?;
  let id = parse_fact_id(&id)?;

  let target = state
    .store
    .get_by_id(id, session.clone())
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or_else(|| Error::not_found("fact"))?;
  if target.fact.is_owned_by(&session) {
    return Err(Error::Forbidden("cannot vote on your own fact".to_string()));
  }

  let updated = state
    .store
    .cast_vote(id, session, vote_type)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or_else(|| Error::not_found("fact"))?;

  debug!(fact_id = %id, vote = vote_type.as_str(), "vote applied");
  Ok((jar, Json(updated)))
}

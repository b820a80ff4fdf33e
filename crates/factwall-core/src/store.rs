//! The `FactStore` trait.
//!
//! Implemented by storage backends (e.g. `factwall-store-sqlite`). The server
//! depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  fact::{Fact, FactView, NewFact, SessionId},
  stats::{AdminStats, AuthorSummary, SessionSummary, Stats},
  vote::VoteType,
};

/// Upper bound on any feed request.
pub const MAX_FEED_LIMIT: usize = 50;

/// Abstraction over a factwall store backend.
///
/// Every mutation runs as one atomic unit in the backend. Methods that take a
/// `viewer` annotate each returned fact with that session's own vote.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait FactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Facts ─────────────────────────────────────────────────────────────

  /// Persist a new fact with zero votes. The id and `created_at` are
  /// assigned by the store.
  fn create(
    &self,
    input: NewFact,
  ) -> impl Future<Output = Result<Fact, Self::Error>> + Send + '_;

  /// Up to `limit` facts in no particular order.
  fn random_sample(
    &self,
    limit: usize,
    viewer: SessionId,
  ) -> impl Future<Output = Result<Vec<FactView>, Self::Error>> + Send + '_;

  /// Up to `limit` facts by score descending, newest first among equal
  /// scores.
  fn top_ranked(
    &self,
    limit: usize,
    viewer: SessionId,
  ) -> impl Future<Output = Result<Vec<FactView>, Self::Error>> + Send + '_;

  /// Retrieve a fact by id. Returns `None` if not found.
  fn get_by_id(
    &self,
    id: Uuid,
    viewer: SessionId,
  ) -> impl Future<Output = Result<Option<FactView>, Self::Error>> + Send + '_;

  /// Delete a fact and, through the cascade, its votes. Returns whether a
  /// fact was removed.
  fn delete_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Every fact, newest first.
  fn list_all(&self) -> impl Future<Output = Result<Vec<Fact>, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Apply `vote_type` from `voter` to a fact following
  /// [`VoteTransition`](crate::vote::VoteTransition), reading the existing
  /// vote and writing the outcome in a single transaction.
  ///
  /// Does not check ownership; callers reject self-votes first. Returns the
  /// updated fact as seen by `voter`, or `None` if the fact does not exist.
  fn cast_vote(
    &self,
    id: Uuid,
    voter: SessionId,
    vote_type: VoteType,
  ) -> impl Future<Output = Result<Option<FactView>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Per-session fact counts, largest first.
  fn sessions(
    &self,
  ) -> impl Future<Output = Result<Vec<SessionSummary>, Self::Error>> + Send + '_;

  /// Per-author-name rollups, largest first.
  fn authors(
    &self,
  ) -> impl Future<Output = Result<Vec<AuthorSummary>, Self::Error>> + Send + '_;

  /// Delete every fact submitted by `session`. Returns the number removed.
  fn delete_all_by_session(
    &self,
    session: SessionId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Move every fact owned by `from` to `to`. Facts already owned by `to`
  /// are left alone. Returns the number moved.
  fn reassign_session(
    &self,
    from: SessionId,
    to: SessionId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Aggregates ────────────────────────────────────────────────────────

  fn stats(&self) -> impl Future<Output = Result<Stats, Self::Error>> + Send + '_;

  fn admin_stats(&self) -> impl Future<Output = Result<AdminStats, Self::Error>> + Send + '_;
}

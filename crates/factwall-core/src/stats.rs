//! Aggregate read models: admin listings, the public statistics page, and
//! the admin time series.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  fact::{Fact, SessionId},
  vote::VoteType,
};

// ─── Admin listings ──────────────────────────────────────────────────────────

/// Facts grouped by the session that submitted them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
  pub session_id:   SessionId,
  /// Author name on the session's most recent fact.
  pub author_name:  String,
  pub fact_count:   u64,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub last_fact_at: DateTime<Utc>,
}

/// Facts grouped by the raw author-name string.
///
/// Distinct sessions that typed the same name are merged here, unlike in
/// [`SessionSummary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSummary {
  pub author_name:   String,
  pub fact_count:    u64,
  /// Upvotes plus downvotes received across all of the author's facts.
  pub total_votes:   u64,
  pub session_count: u64,
}

// ─── Public statistics ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveAuthor {
  pub author_name: String,
  pub fact_count:  u64,
  pub total_votes: u64,
}

/// A fact that received votes within the trending window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingFact {
  #[serde(flatten)]
  pub fact:         Fact,
  pub recent_votes: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VotesBreakdown {
  pub upvotes:   u64,
  pub downvotes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
  pub total_facts:         u64,
  pub total_votes:         u64,
  /// Distinct sessions that have submitted at least one fact.
  pub total_users:         u64,
  pub top_fact:            Option<Fact>,
  pub recent_facts:        Vec<Fact>,
  pub most_active_users:   Vec<ActiveAuthor>,
  pub controversial_facts: Vec<Fact>,
  pub trending_facts:      Vec<TrendingFact>,
  /// Mean score over all facts; `0.0` when there are none.
  pub avg_score:           f64,
  pub votes_breakdown:     VotesBreakdown,
}

// ─── Admin time series ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
  pub date:  NaiveDate,
  pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteActivity {
  pub date:      NaiveDate,
  pub vote_type: VoteType,
  pub count:     u64,
}

/// Sessions whose first fact was submitted on `join_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGrowth {
  pub join_date: NaiveDate,
  pub new_users: u64,
}

/// Day-bucketed activity, most recent day first. Days are local calendar
/// days of the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
  pub facts_by_day:  Vec<DayCount>,
  pub vote_activity: Vec<VoteActivity>,
  pub user_growth:   Vec<UserGrowth>,
}

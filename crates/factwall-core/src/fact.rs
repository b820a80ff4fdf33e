//! Fact types — the unit of content on the wall.
//!
//! A fact is a short anonymous text submitted by a browser session. Its text
//! never changes after submission; only the vote counters move, and an admin
//! may reassign the owning session.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, validate, vote::VoteType};

// ─── Session identity ────────────────────────────────────────────────────────

/// An anonymous, cookie-carried browser identity.
///
/// Sessions are never stored as their own rows; the identifier only appears
/// as a foreign-key value on facts and votes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
  /// Mint a fresh identifier from a random (v4) UUID.
  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_inner(self) -> String { self.0 }
}

impl From<String> for SessionId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for SessionId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// A persisted fact.
///
/// `created_at` is serialised as milliseconds since the Unix epoch, which is
/// also how the store keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
  pub id:                 Uuid,
  pub content:            String,
  pub author_name:        String,
  pub created_by_session: SessionId,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub created_at:         DateTime<Utc>,
  pub upvotes:            u32,
  pub downvotes:          u32,
}

impl Fact {
  /// Upvotes minus downvotes.
  pub fn score(&self) -> i64 { i64::from(self.upvotes) - i64::from(self.downvotes) }

  pub fn is_owned_by(&self, session: &SessionId) -> bool {
    &self.created_by_session == session
  }
}

/// A fact as seen by one viewer: the stored fact plus that viewer's own vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactView {
  #[serde(flatten)]
  pub fact:      Fact,
  pub user_vote: Option<VoteType>,
}

/// Input for [`FactStore::create`](crate::store::FactStore::create).
#[derive(Debug, Clone)]
pub struct NewFact {
  pub content:     String,
  pub author_name: String,
  pub session:     SessionId,
}

impl NewFact {
  /// Normalise and validate raw user input.
  ///
  /// Content is checked before the author name; the first failing rule is
  /// returned.
  pub fn new(content: &str, author_name: &str, session: SessionId) -> Result<Self> {
    let content     = validate::check_content(content)?;
    let author_name = validate::check_name(author_name)?;
    Ok(Self { content, author_name, session })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::{Error, validate::Rejection};

  fn sample() -> Fact {
    Fact {
      id:                 Uuid::nil(),
      content:            "Octopuses have three hearts.".into(),
      author_name:        "Alice".into(),
      created_by_session: SessionId::from("s-1"),
      created_at:         Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
      upvotes:            4,
      downvotes:          6,
    }
  }

  #[test]
  fn score_can_go_negative() {
    assert_eq!(sample().score(), -2);
  }

  #[test]
  fn view_serialises_flat_with_millisecond_timestamp() {
    let view = FactView { fact: sample(), user_vote: Some(VoteType::Down) };
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["created_at"], 1_700_000_000_123_i64);
    assert_eq!(json["created_by_session"], "s-1");
    assert_eq!(json["user_vote"], "down");
    assert_eq!(json["upvotes"], 4);
  }

  #[test]
  fn missing_vote_serialises_as_null() {
    let view = FactView { fact: sample(), user_vote: None };
    let json = serde_json::to_value(&view).unwrap();
    assert!(json["user_vote"].is_null());
  }

  #[test]
  fn new_fact_normalises_both_fields() {
    let input = NewFact::new("  Honey   never\tspoils.  ", " Bob  Smith ", "s".into()).unwrap();
    assert_eq!(input.content, "Honey never spoils.");
    assert_eq!(input.author_name, "Bob Smith");
  }

  #[test]
  fn new_fact_reports_content_before_name() {
    let err = NewFact::new("short", "x", "s".into()).unwrap_err();
    assert!(matches!(err, Error::Invalid(Rejection::ContentTooShort)));
  }

  #[test]
  fn generated_sessions_are_distinct() {
    assert_ne!(SessionId::generate(), SessionId::generate());
  }
}

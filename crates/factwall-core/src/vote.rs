//! Vote types and the per-(session, fact) vote state machine.
//!
//! A session holds at most one vote per fact. Submitting a vote type moves
//! the pair between three states:
//!
//! | current  | submitted | result   | counters                 |
//! |----------|-----------|----------|--------------------------|
//! | none     | X         | X        | X + 1                    |
//! | X        | X         | none     | X - 1 (toggle-off)       |
//! | X        | Y         | Y        | X - 1, Y + 1             |
//!
//! The machine only decides; the store applies the decision inside one
//! transaction.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
  Up,
  Down,
}

impl VoteType {
  pub fn as_str(self) -> &'static str {
    match self {
      VoteType::Up => "up",
      VoteType::Down => "down",
    }
  }

  /// `(upvotes, downvotes)` adjustment for adding `n` votes of this type.
  fn deltas(self, n: i64) -> (i64, i64) {
    match self {
      VoteType::Up => (n, 0),
      VoteType::Down => (0, n),
    }
  }
}

impl FromStr for VoteType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "up" => Ok(VoteType::Up),
      "down" => Ok(VoteType::Down),
      other => Err(Error::UnknownVoteType(other.to_owned())),
    }
  }
}

/// What a submitted vote does to an existing (session, fact) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
  /// No previous vote: record one.
  Cast(VoteType),
  /// Same type resubmitted: remove the vote.
  Withdraw(VoteType),
  /// Opposite type submitted: change the stored vote in place.
  Flip { from: VoteType, to: VoteType },
}

impl VoteTransition {
  pub fn decide(existing: Option<VoteType>, submitted: VoteType) -> Self {
    match existing {
      None => VoteTransition::Cast(submitted),
      Some(prev) if prev == submitted => VoteTransition::Withdraw(prev),
      Some(prev) => VoteTransition::Flip { from: prev, to: submitted },
    }
  }

  /// Signed `(upvotes, downvotes)` change to apply to the fact's counters.
  pub fn counter_deltas(self) -> (i64, i64) {
    match self {
      VoteTransition::Cast(t) => t.deltas(1),
      VoteTransition::Withdraw(t) => t.deltas(-1),
      VoteTransition::Flip { from, to } => {
        let (up_a, down_a) = from.deltas(-1);
        let (up_b, down_b) = to.deltas(1);
        (up_a + up_b, down_a + down_b)
      }
    }
  }

  /// The session's vote after the transition.
  pub fn resulting_vote(self) -> Option<VoteType> {
    match self {
      VoteTransition::Cast(t) => Some(t),
      VoteTransition::Withdraw(_) => None,
      VoteTransition::Flip { to, .. } => Some(to),
    }
  }
}

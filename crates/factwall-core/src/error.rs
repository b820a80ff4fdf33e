//! Error types for `factwall-core`.

use thiserror::Error;

use crate::validate::Rejection;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Invalid(#[from] Rejection),

  #[error("unknown vote type: {0:?}")]
  UnknownVoteType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as integer milliseconds since the Unix epoch, UUIDs
//! as hyphenated lowercase strings, and vote types as `'up'` / `'down'`.
//!
//! Decoders run inside `tokio_rusqlite` closures, so failures are reported
//! as [`rusqlite::Error::FromSqlConversionFailure`] carrying the column index.

use chrono::{DateTime, NaiveDate, Utc};
use factwall_core::{
  fact::{Fact, FactView, SessionId},
  vote::VoteType,
};
use rusqlite::{Row, types::Type};
use uuid::Uuid;

/// Column list for a fact aliased as `f`, in [`fact_from_row`] order.
pub const FACT_COLUMNS: &str =
  "f.id, f.content, f.author_name, f.created_by_session, f.created_at, f.upvotes, f.downvotes";

/// Number of columns in [`FACT_COLUMNS`].
pub const FACT_WIDTH: usize = 7;

fn conversion_error<E>(idx: usize, ty: Type, err: E) -> rusqlite::Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

fn decode_uuid(idx: usize, s: &str) -> rusqlite::Result<Uuid> {
  Uuid::parse_str(s).map_err(|e| conversion_error(idx, Type::Text, e))
}

// ─── Timestamps ───────────────────────────────────────────────────────────────

pub fn encode_ms(dt: DateTime<Utc>) -> i64 { dt.timestamp_millis() }

pub fn decode_ms(idx: usize, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
  DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

/// Parse a `DATE(...)` result (`YYYY-MM-DD`).
pub fn decode_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| conversion_error(idx, Type::Text, e))
}

// ─── Vote types ───────────────────────────────────────────────────────────────

pub fn decode_vote_type(idx: usize, s: &str) -> rusqlite::Result<VoteType> {
  s.parse().map_err(|e| conversion_error(idx, Type::Text, e))
}

// ─── Counts ───────────────────────────────────────────────────────────────────

/// Read a non-negative aggregate; `NULL` (e.g. `SUM` over no rows) is zero.
pub fn count(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
  let n: Option<i64> = row.get(idx)?;
  let n = n.unwrap_or(0);
  u64::try_from(n).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, n))
}

// ─── Rows ─────────────────────────────────────────────────────────────────────

/// Decode the [`FACT_COLUMNS`] block starting at column `at`.
pub fn fact_from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Fact> {
  let id: String = row.get(at)?;
  let session: String = row.get(at + 3)?;
  Ok(Fact {
    id:                 decode_uuid(at, &id)?,
    content:            row.get(at + 1)?,
    author_name:        row.get(at + 2)?,
    created_by_session: SessionId::from(session),
    created_at:         decode_ms(at + 4, row.get(at + 4)?)?,
    upvotes:            row.get(at + 5)?,
    downvotes:          row.get(at + 6)?,
  })
}

/// Decode [`FACT_COLUMNS`] followed by the viewer's nullable `vote_type`.
pub fn view_from_row(row: &Row<'_>) -> rusqlite::Result<FactView> {
  let fact = fact_from_row(row, 0)?;
  let vote: Option<String> = row.get(FACT_WIDTH)?;
  let user_vote = vote
    .map(|v| decode_vote_type(FACT_WIDTH, &v))
    .transpose()?;
  Ok(FactView { fact, user_vote })
}

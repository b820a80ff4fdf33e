//! [`SqliteStore`] — the SQLite implementation of [`FactStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use factwall_core::{
  fact::{Fact, FactView, NewFact, SessionId},
  stats::{
    ActiveAuthor, AdminStats, AuthorSummary, DayCount, SessionSummary, Stats,
    TrendingFact, UserGrowth, VoteActivity, VotesBreakdown,
  },
  store::FactStore,
  vote::{VoteTransition, VoteType},
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    FACT_COLUMNS, FACT_WIDTH, count, decode_date, decode_ms, decode_vote_type,
    encode_ms, encode_uuid, fact_from_row, view_from_row,
  },
  schema::SCHEMA,
};

/// Votes newer than this many milliseconds count towards a fact trending.
const TRENDING_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Length of each list on the statistics page.
const STATS_LIST_LEN: i64 = 5;

const FACTS_BY_DAY_ROWS: i64 = 30;
const VOTE_ACTIVITY_ROWS: i64 = 60;
const USER_GROWTH_ROWS: i64 = 30;

/// Server-local calendar day of a millisecond `created_at` column.
const LOCAL_DAY: &str = "DATE(created_at / 1000, 'unixepoch', 'localtime')";

const SCORE: &str = "(f.upvotes - f.downvotes)";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A factwall store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }
}

// ─── Query helpers (run on the connection thread) ────────────────────────────

fn select_view(conn: &Connection, id: &str, viewer: &str) -> rusqlite::Result<Option<FactView>> {
  conn
    .query_row(
      &format!(
        "SELECT {FACT_COLUMNS}, v.vote_type
         FROM facts f
         LEFT JOIN votes v ON v.fact_id = f.id AND v.session_id = ?2
         WHERE f.id = ?1"
      ),
      params![id, viewer],
      view_from_row,
    )
    .optional()
}

/// Annotated feed query. `order_by` is always a constant from this module.
fn select_views(
  conn:     &Connection,
  order_by: &str,
  viewer:   &str,
  limit:    i64,
) -> rusqlite::Result<Vec<FactView>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {FACT_COLUMNS}, v.vote_type
     FROM facts f
     LEFT JOIN votes v ON v.fact_id = f.id AND v.session_id = ?1
     ORDER BY {order_by}
     LIMIT ?2"
  ))?;
  let rows = stmt
    .query_map(params![viewer, limit], view_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Unannotated fact query; `tail` holds the WHERE/ORDER/LIMIT clauses.
fn select_facts(conn: &Connection, tail: &str) -> rusqlite::Result<Vec<Fact>> {
  let mut stmt = conn.prepare(&format!("SELECT {FACT_COLUMNS} FROM facts f {tail}"))?;
  let rows = stmt
    .query_map([], |row| fact_from_row(row, 0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn sql_limit(limit: usize) -> i64 { i64::try_from(limit).unwrap_or(i64::MAX) }

// ─── FactStore impl ──────────────────────────────────────────────────────────

impl FactStore for SqliteStore {
  type Error = crate::Error;

  // ── Facts ─────────────────────────────────────────────────────────────────

  async fn create(&self, input: NewFact) -> Result<Fact> {
    let fact = Fact {
      id:                 Uuid::new_v4(),
      content:            input.content,
      author_name:        input.author_name,
      created_by_session: input.session,
      created_at:         Utc::now().trunc_subsecs(3),
      upvotes:            0,
      downvotes:          0,
    };

    let id_str      = encode_uuid(fact.id);
    let content     = fact.content.clone();
    let author_name = fact.author_name.clone();
    let session     = fact.created_by_session.to_string();
    let created_at  = encode_ms(fact.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO facts (id, content, author_name, created_by_session, created_at, upvotes, downvotes)
           VALUES (?1, ?2, ?3, ?4, ?5, 0, 0)",
          params![id_str, content, author_name, session, created_at],
        )?;
        Ok(())
      })
      .await?;

    debug!(fact_id = %fact.id, session = %fact.created_by_session, "fact created");
    Ok(fact)
  }

  async fn random_sample(&self, limit: usize, viewer: SessionId) -> Result<Vec<FactView>> {
    let limit = sql_limit(limit);
    Ok(
      self
        .conn
        .call(move |conn| Ok(select_views(conn, "RANDOM()", viewer.as_str(), limit)?))
        .await?,
    )
  }

  async fn top_ranked(&self, limit: usize, viewer: SessionId) -> Result<Vec<FactView>> {
    let limit = sql_limit(limit);
    let order = format!("{SCORE} DESC, f.created_at DESC");
    Ok(
      self
        .conn
        .call(move |conn| Ok(select_views(conn, &order, viewer.as_str(), limit)?))
        .await?,
    )
  }

  async fn get_by_id(&self, id: Uuid, viewer: SessionId) -> Result<Option<FactView>> {
    let id_str = encode_uuid(id);
    Ok(
      self
        .conn
        .call(move |conn| Ok(select_view(conn, &id_str, viewer.as_str())?))
        .await?,
    )
  }

  async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM facts WHERE id = ?1", params![id_str])?))
      .await?;
    Ok(removed > 0)
  }

  async fn list_all(&self) -> Result<Vec<Fact>> {
    Ok(
      self
        .conn
        .call(|conn| Ok(select_facts(conn, "ORDER BY f.created_at DESC")?))
        .await?,
    )
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn cast_vote(
    &self,
    id:        Uuid,
    voter:     SessionId,
    vote_type: VoteType,
  ) -> Result<Option<FactView>> {
    let id_str = encode_uuid(id);
    let now    = encode_ms(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        let voter = voter.as_str();
        // IMMEDIATE takes the write lock before the read, so the decision
        // below cannot be based on a stale vote row.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists = tx
          .query_row("SELECT 1 FROM facts WHERE id = ?1", params![id_str], |_| Ok(()))
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        let existing = tx
          .query_row(
            "SELECT vote_type FROM votes WHERE session_id = ?1 AND fact_id = ?2",
            params![voter, id_str],
            |row| decode_vote_type(0, &row.get::<_, String>(0)?),
          )
          .optional()?;

        let transition = VoteTransition::decide(existing, vote_type);
        match transition {
          VoteTransition::Cast(ty) => tx.execute(
            "INSERT INTO votes (session_id, fact_id, vote_type, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![voter, id_str, ty.as_str(), now],
          )?,
          VoteTransition::Withdraw(_) => tx.execute(
            "DELETE FROM votes WHERE session_id = ?1 AND fact_id = ?2",
            params![voter, id_str],
          )?,
          VoteTransition::Flip { to, .. } => tx.execute(
            "UPDATE votes SET vote_type = ?1, created_at = ?2 WHERE session_id = ?3 AND fact_id = ?4",
            params![to.as_str(), now, voter, id_str],
          )?,
        };

        let (up, down) = transition.counter_deltas();
        tx.execute(
          "UPDATE facts SET upvotes = upvotes + ?1, downvotes = downvotes + ?2 WHERE id = ?3",
          params![up, down, id_str],
        )?;

        let view = select_view(&tx, &id_str, voter)?;
        tx.commit()?;
        Ok(view.map(|v| (transition, v)))
      })
      .await?;

    Ok(outcome.map(|(transition, view)| {
      debug!(fact_id = %id, ?transition, "vote applied");
      view
    }))
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn sessions(&self) -> Result<Vec<SessionSummary>> {
    Ok(
      self
        .conn
        .call(|conn| {
          // `author_name` is a bare column: SQLite takes it from the row that
          // supplies MAX(created_at).
          let mut stmt = conn.prepare(
            "SELECT created_by_session, author_name, COUNT(*) AS fact_count, MAX(created_at) AS last_at
             FROM facts
             GROUP BY created_by_session
             ORDER BY fact_count DESC, last_at DESC",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(SessionSummary {
                session_id:   SessionId::from(row.get::<_, String>(0)?),
                author_name:  row.get(1)?,
                fact_count:   count(row, 2)?,
                last_fact_at: decode_ms(3, row.get(3)?)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn authors(&self) -> Result<Vec<AuthorSummary>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(
            "SELECT author_name,
                    COUNT(*) AS fact_count,
                    SUM(upvotes + downvotes),
                    COUNT(DISTINCT created_by_session)
             FROM facts
             GROUP BY author_name
             ORDER BY fact_count DESC, author_name",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(AuthorSummary {
                author_name:   row.get(0)?,
                fact_count:    count(row, 1)?,
                total_votes:   count(row, 2)?,
                session_count: count(row, 3)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn delete_all_by_session(&self, session: SessionId) -> Result<u64> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM facts WHERE created_by_session = ?1",
          params![session.as_str()],
        )?)
      })
      .await?;
    Ok(removed as u64)
  }

  async fn reassign_session(&self, from: SessionId, to: SessionId) -> Result<u64> {
    let moved = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE facts SET created_by_session = ?1 WHERE created_by_session = ?2",
          params![to.as_str(), from.as_str()],
        )?)
      })
      .await?;
    Ok(moved as u64)
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn stats(&self) -> Result<Stats> {
    let since = encode_ms(Utc::now()) - TRENDING_WINDOW_MS;

    Ok(
      self
        .conn
        .call(move |conn| {
          // One read transaction so every figure comes from the same snapshot.
          let tx = conn.transaction()?;

          let total_facts = tx.query_row("SELECT COUNT(*) FROM facts", [], |r| count(r, 0))?;
          let total_votes = tx.query_row("SELECT COUNT(*) FROM votes", [], |r| count(r, 0))?;
          let total_users = tx.query_row(
            "SELECT COUNT(DISTINCT created_by_session) FROM facts",
            [],
            |r| count(r, 0),
          )?;

          let top_fact = select_facts(
            &tx,
            &format!("ORDER BY {SCORE} DESC, f.created_at DESC LIMIT 1"),
          )?
          .into_iter()
          .next();

          let recent_facts = select_facts(
            &tx,
            &format!("ORDER BY f.created_at DESC LIMIT {STATS_LIST_LEN}"),
          )?;

          let most_active_users = {
            let mut stmt = tx.prepare(&format!(
              "SELECT author_name, COUNT(*) AS fact_count, SUM(upvotes + downvotes) AS total_votes
               FROM facts
               GROUP BY author_name
               ORDER BY fact_count DESC, total_votes DESC
               LIMIT {STATS_LIST_LEN}"
            ))?;
            stmt
              .query_map([], |row| {
                Ok(ActiveAuthor {
                  author_name: row.get(0)?,
                  fact_count:  count(row, 1)?,
                  total_votes: count(row, 2)?,
                })
              })?
              .collect::<rusqlite::Result<Vec<_>>>()?
          };

          let controversial_facts = select_facts(
            &tx,
            &format!(
              "WHERE f.upvotes > 0 AND f.downvotes > 0
               ORDER BY (f.upvotes + f.downvotes) DESC, ABS(f.upvotes - f.downvotes) ASC
               LIMIT {STATS_LIST_LEN}"
            ),
          )?;

          let trending_facts = {
            let mut stmt = tx.prepare(&format!(
              "SELECT {FACT_COLUMNS}, COUNT(v.session_id) AS recent_votes
               FROM facts f
               JOIN votes v ON v.fact_id = f.id AND v.created_at > ?1
               GROUP BY f.id
               ORDER BY recent_votes DESC, {SCORE} DESC
               LIMIT {STATS_LIST_LEN}"
            ))?;
            stmt
              .query_map(params![since], |row| {
                Ok(TrendingFact {
                  fact:         fact_from_row(row, 0)?,
                  recent_votes: count(row, FACT_WIDTH)?,
                })
              })?
              .collect::<rusqlite::Result<Vec<_>>>()?
          };

          let avg_score: Option<f64> =
            tx.query_row("SELECT AVG(upvotes - downvotes) FROM facts", [], |r| r.get(0))?;

          let votes_breakdown = tx.query_row(
            "SELECT SUM(vote_type = 'up'), SUM(vote_type = 'down') FROM votes",
            [],
            |row| {
              Ok(VotesBreakdown {
                upvotes:   count(row, 0)?,
                downvotes: count(row, 1)?,
              })
            },
          )?;

          tx.commit()?;

          Ok(Stats {
            total_facts,
            total_votes,
            total_users,
            top_fact,
            recent_facts,
            most_active_users,
            controversial_facts,
            trending_facts,
            avg_score: avg_score.unwrap_or(0.0),
            votes_breakdown,
          })
        })
        .await?,
    )
  }

  async fn admin_stats(&self) -> Result<AdminStats> {
    Ok(
      self
        .conn
        .call(|conn| {
          let tx = conn.transaction()?;

          let facts_by_day = {
            let mut stmt = tx.prepare(&format!(
              "SELECT {LOCAL_DAY} AS day, COUNT(*)
               FROM facts
               GROUP BY day
               ORDER BY day DESC
               LIMIT {FACTS_BY_DAY_ROWS}"
            ))?;
            stmt
              .query_map([], |row| {
                Ok(DayCount {
                  date:  decode_date(0, &row.get::<_, String>(0)?)?,
                  count: count(row, 1)?,
                })
              })?
              .collect::<rusqlite::Result<Vec<_>>>()?
          };

          let vote_activity = {
            let mut stmt = tx.prepare(&format!(
              "SELECT {LOCAL_DAY} AS day, vote_type, COUNT(*)
               FROM votes
               GROUP BY day, vote_type
               ORDER BY day DESC, vote_type
               LIMIT {VOTE_ACTIVITY_ROWS}"
            ))?;
            stmt
              .query_map([], |row| {
                Ok(VoteActivity {
                  date:      decode_date(0, &row.get::<_, String>(0)?)?,
                  vote_type: decode_vote_type(1, &row.get::<_, String>(1)?)?,
                  count:     count(row, 2)?,
                })
              })?
              .collect::<rusqlite::Result<Vec<_>>>()?
          };

          // A session "joins" on the local day of its first fact.
          let user_growth = {
            let mut stmt = tx.prepare(&format!(
              "SELECT join_date, COUNT(*)
               FROM (
                 SELECT DATE(MIN(created_at) / 1000, 'unixepoch', 'localtime') AS join_date
                 FROM facts
                 GROUP BY created_by_session
               )
               GROUP BY join_date
               ORDER BY join_date DESC
               LIMIT {USER_GROWTH_ROWS}"
            ))?;
            stmt
              .query_map([], |row| {
                Ok(UserGrowth {
                  join_date: decode_date(0, &row.get::<_, String>(0)?)?,
                  new_users: count(row, 1)?,
                })
              })?
              .collect::<rusqlite::Result<Vec<_>>>()?
          };

          tx.commit()?;

          Ok(AdminStats { facts_by_day, vote_activity, user_growth })
        })
        .await?,
    )
  }
}

//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use factwall_core::{
  fact::{Fact, NewFact, SessionId},
  store::FactStore,
  vote::VoteType::{self, Down, Up},
};
use rusqlite::params;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn session(s: &str) -> SessionId { SessionId::from(s) }

async fn add(s: &SqliteStore, content: &str, author: &str, owner: &str) -> Fact {
  s.create(NewFact::new(content, author, session(owner)).unwrap())
    .await
    .unwrap()
}

async fn vote(s: &SqliteStore, fact: &Fact, voter: &str, ty: VoteType) {
  s.cast_vote(fact.id, session(voter), ty)
    .await
    .unwrap()
    .expect("fact exists");
}

/// Stored vote rows for a fact as `(up, down)`.
async fn vote_rows(s: &SqliteStore, fact_id: Uuid) -> (u32, u32) {
  let id = fact_id.to_string();
  s.connection()
    .call(move |conn| {
      Ok(conn.query_row(
        "SELECT COALESCE(SUM(vote_type = 'up'), 0), COALESCE(SUM(vote_type = 'down'), 0)
         FROM votes WHERE fact_id = ?1",
        params![id],
        |r| Ok((r.get(0)?, r.get(1)?)),
      )?)
    })
    .await
    .unwrap()
}

/// Move a fact's `created_at` to a fixed millisecond timestamp.
async fn backdate(s: &SqliteStore, fact_id: Uuid, ms: i64) {
  let id = fact_id.to_string();
  s.connection()
    .call(move |conn| {
      conn.execute("UPDATE facts SET created_at = ?1 WHERE id = ?2", params![ms, id])?;
      Ok(())
    })
    .await
    .unwrap();
}

// ─── Facts ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_fact() {
  let s = store().await;
  let fact = add(&s, "This is a test fact.", "Alice", "x").await;
  assert_eq!((fact.upvotes, fact.downvotes), (0, 0));

  let fetched = s.get_by_id(fact.id, session("y")).await.unwrap().unwrap();
  assert_eq!(fetched.fact, fact);
  assert_eq!(fetched.user_vote, None);
}

#[tokio::test]
async fn get_missing_fact_returns_none() {
  let s = store().await;
  assert!(s.get_by_id(Uuid::new_v4(), session("x")).await.unwrap().is_none());
}

#[tokio::test]
async fn random_sample_respects_limit_and_annotates() {
  let s = store().await;
  for i in 0..5 {
    add(&s, &format!("Fact number {i} is here"), "Alice", "x").await;
  }
  let target = add(&s, "One more fact to vote on", "Bob", "y").await;
  vote(&s, &target, "viewer", Down).await;

  let sample = s.random_sample(3, session("viewer")).await.unwrap();
  assert_eq!(sample.len(), 3);

  let all = s.random_sample(50, session("viewer")).await.unwrap();
  assert_eq!(all.len(), 6);
  for view in all {
    let expected = (view.fact.id == target.id).then_some(Down);
    assert_eq!(view.user_vote, expected);
  }
}

#[tokio::test]
async fn list_all_is_newest_first() {
  let s = store().await;
  let a = add(&s, "The oldest fact around", "Alice", "x").await;
  let b = add(&s, "The newest fact around", "Alice", "x").await;
  backdate(&s, a.id, 1_000).await;
  backdate(&s, b.id, 2_000).await;

  let ids: Vec<_> = s.list_all().await.unwrap().into_iter().map(|f| f.id).collect();
  assert_eq!(ids, vec![b.id, a.id]);
}

// ─── Ranking ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn top_ranked_orders_by_score_then_newest() {
  let s = store().await;
  let low   = add(&s, "Scored minus one here", "A1", "owner").await;
  let old   = add(&s, "Scored one but older", "A2", "owner").await;
  let new   = add(&s, "Scored one and newer", "A3", "owner").await;
  let best  = add(&s, "Scored two, the best", "A4", "owner").await;
  backdate(&s, old.id, 1_000).await;
  backdate(&s, new.id, 2_000).await;

  vote(&s, &low, "v1", Down).await;
  vote(&s, &old, "v1", Up).await;
  vote(&s, &new, "v1", Up).await;
  vote(&s, &best, "v1", Up).await;
  vote(&s, &best, "v2", Up).await;

  let ranked: Vec<_> = s
    .top_ranked(10, session("v1"))
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.fact.id)
    .collect();
  assert_eq!(ranked, vec![best.id, new.id, old.id, low.id]);
}

// ─── Voting ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upvote_twice_toggles_off() {
  let s = store().await;
  let fact = add(&s, "This is a test fact.", "Alice", "x").await;

  let once = s.cast_vote(fact.id, session("y"), Up).await.unwrap().unwrap();
  assert_eq!(once.fact.upvotes, 1);
  assert_eq!(once.user_vote, Some(Up));

  let twice = s.cast_vote(fact.id, session("y"), Up).await.unwrap().unwrap();
  assert_eq!(twice.fact.upvotes, 0);
  assert_eq!(twice.user_vote, None);
  assert_eq!(vote_rows(&s, fact.id).await, (0, 0));
}

#[tokio::test]
async fn flip_moves_the_vote_between_counters() {
  let s = store().await;
  let fact = add(&s, "This is a test fact.", "Alice", "x").await;

  vote(&s, &fact, "y", Up).await;
  let flipped = s.cast_vote(fact.id, session("y"), Down).await.unwrap().unwrap();

  assert_eq!((flipped.fact.upvotes, flipped.fact.downvotes), (0, 1));
  assert_eq!(flipped.user_vote, Some(Down));
  assert_eq!(vote_rows(&s, fact.id).await, (0, 1));
}

#[tokio::test]
async fn counters_match_vote_rows_after_any_sequence() {
  let s = store().await;
  let fact = add(&s, "A heavily contested fact", "Alice", "owner").await;

  let script = [
    ("a", Up), ("b", Down), ("a", Down), ("c", Up), ("b", Down),
    ("c", Up), ("a", Up), ("d", Down), ("b", Up), ("a", Up),
  ];
  for (voter, ty) in script {
    let view = s.cast_vote(fact.id, session(voter), ty).await.unwrap().unwrap();
    assert_eq!(
      vote_rows(&s, fact.id).await,
      (view.fact.upvotes, view.fact.downvotes),
      "after {voter} voted {ty:?}"
    );
  }

  let view = s.get_by_id(fact.id, session("a")).await.unwrap().unwrap();
  // a: none (up toggled off), b: up, c: none, d: down
  assert_eq!((view.fact.upvotes, view.fact.downvotes), (1, 1));
  assert_eq!(view.user_vote, None);
}

#[tokio::test]
async fn votes_from_many_sessions_are_not_lost() {
  let s = store().await;
  let fact = add(&s, "Everybody loves this fact", "Alice", "owner").await;

  let mut handles = Vec::new();
  for i in 0..20 {
    let s = s.clone();
    let id = fact.id;
    handles.push(tokio::spawn(async move {
      s.cast_vote(id, SessionId::from(format!("voter-{i}")), Up).await
    }));
  }
  for h in handles {
    h.await.unwrap().unwrap();
  }

  let view = s.get_by_id(fact.id, session("owner")).await.unwrap().unwrap();
  assert_eq!(view.fact.upvotes, 20);
  assert_eq!(vote_rows(&s, fact.id).await, (20, 0));
}

#[tokio::test]
async fn vote_on_missing_fact_returns_none() {
  let s = store().await;
  let outcome = s.cast_vote(Uuid::new_v4(), session("y"), Up).await.unwrap();
  assert!(outcome.is_none());
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_fact_cascades_to_votes() {
  let s = store().await;
  let fact = add(&s, "This is a test fact.", "Alice", "x").await;
  vote(&s, &fact, "y", Up).await;
  vote(&s, &fact, "z", Down).await;

  assert!(s.delete_by_id(fact.id).await.unwrap());
  assert!(s.get_by_id(fact.id, session("y")).await.unwrap().is_none());
  assert_eq!(vote_rows(&s, fact.id).await, (0, 0));

  assert!(!s.delete_by_id(fact.id).await.unwrap());
}

#[tokio::test]
async fn delete_all_by_session_only_touches_that_session() {
  let s = store().await;
  let mine  = add(&s, "First fact from x here", "Alice", "x").await;
  add(&s, "Second fact from x here", "Alice", "x").await;
  let other = add(&s, "A fact from y instead", "Bob", "y").await;
  vote(&s, &mine, "y", Up).await;

  assert_eq!(s.delete_all_by_session(session("x")).await.unwrap(), 2);
  assert_eq!(vote_rows(&s, mine.id).await, (0, 0));

  let left: Vec<_> = s.list_all().await.unwrap().into_iter().map(|f| f.id).collect();
  assert_eq!(left, vec![other.id]);

  assert_eq!(s.delete_all_by_session(session("x")).await.unwrap(), 0);
}

// ─── Sessions & authors ──────────────────────────────────────────────────────

#[tokio::test]
async fn reassign_moves_facts_between_sessions() {
  let s = store().await;
  add(&s, "First fact from x here", "Alice", "x").await;
  add(&s, "Second fact from x here", "Alice", "x").await;
  add(&s, "A fact that y wrote", "Bob", "y").await;

  assert_eq!(s.reassign_session(session("x"), session("y")).await.unwrap(), 2);

  let sessions = s.sessions().await.unwrap();
  assert_eq!(sessions.len(), 1);
  assert_eq!(sessions[0].session_id, session("y"));
  assert_eq!(sessions[0].fact_count, 3);

  assert_eq!(s.reassign_session(session("x"), session("y")).await.unwrap(), 0);
}

#[tokio::test]
async fn sessions_report_latest_author_name() {
  let s = store().await;
  let first  = add(&s, "Written under old name", "Ally", "x").await;
  let second = add(&s, "Written under new name", "Alice", "x").await;
  backdate(&s, first.id, 1_000).await;
  backdate(&s, second.id, 2_000).await;

  let sessions = s.sessions().await.unwrap();
  assert_eq!(sessions[0].author_name, "Alice");
  assert_eq!(sessions[0].fact_count, 2);
  assert_eq!(sessions[0].last_fact_at.timestamp_millis(), 2_000);
}

#[tokio::test]
async fn authors_merge_sessions_sharing_a_name() {
  let s = store().await;
  let a = add(&s, "Alice number one speaks", "Alice", "x").await;
  add(&s, "Alice number two speaks", "Alice", "y").await;
  add(&s, "Bob has a thing to say", "Bob", "z").await;
  vote(&s, &a, "z", Up).await;
  vote(&s, &a, "w", Down).await;

  let authors = s.authors().await.unwrap();
  assert_eq!(authors[0].author_name, "Alice");
  assert_eq!(authors[0].fact_count, 2);
  assert_eq!(authors[0].session_count, 2);
  assert_eq!(authors[0].total_votes, 2);
  assert_eq!(authors[1].author_name, "Bob");

  // The per-session view keeps them apart.
  assert_eq!(s.sessions().await.unwrap().len(), 3);
}

// ─── Statistics ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_on_empty_store() {
  let s = store().await;
  let stats = s.stats().await.unwrap();
  assert_eq!(stats.total_facts, 0);
  assert_eq!(stats.total_votes, 0);
  assert!(stats.top_fact.is_none());
  assert_eq!(stats.avg_score, 0.0);
  assert_eq!(stats.votes_breakdown.upvotes, 0);
  assert!(stats.trending_facts.is_empty());
}

#[tokio::test]
async fn stats_aggregate_votes_and_facts() {
  let s = store().await;
  let liked   = add(&s, "Everyone agrees on this", "Alice", "x").await;
  let split   = add(&s, "Opinions differ on this", "Bob", "y").await;
  let ignored = add(&s, "Nobody looked at this one", "Bob", "y").await;

  vote(&s, &liked, "a", Up).await;
  vote(&s, &liked, "b", Up).await;
  vote(&s, &split, "a", Up).await;
  vote(&s, &split, "b", Down).await;

  let stats = s.stats().await.unwrap();
  assert_eq!(stats.total_facts, 3);
  assert_eq!(stats.total_votes, 4);
  assert_eq!(stats.total_users, 2);
  assert_eq!(stats.top_fact.as_ref().map(|f| f.id), Some(liked.id));
  assert_eq!(stats.recent_facts.len(), 3);
  assert_eq!(stats.votes_breakdown.upvotes, 3);
  assert_eq!(stats.votes_breakdown.downvotes, 1);
  assert!((stats.avg_score - 2.0 / 3.0).abs() < 1e-9);

  let controversial: Vec<_> = stats.controversial_facts.iter().map(|f| f.id).collect();
  assert_eq!(controversial, vec![split.id]);

  assert_eq!(stats.trending_facts.len(), 2);
  assert_eq!(stats.trending_facts[0].fact.id, liked.id);
  assert_eq!(stats.trending_facts[0].recent_votes, 2);
  assert!(stats.trending_facts.iter().all(|t| t.fact.id != ignored.id));

  assert_eq!(stats.most_active_users[0].author_name, "Bob");
  assert_eq!(stats.most_active_users[0].fact_count, 2);
}

#[tokio::test]
async fn old_votes_do_not_trend() {
  let s = store().await;
  let fact = add(&s, "This was popular once", "Alice", "x").await;
  vote(&s, &fact, "y", Up).await;

  let stale = Utc::now().timestamp_millis() - 2 * 24 * 60 * 60 * 1000;
  s.connection()
    .call(move |conn| {
      conn.execute("UPDATE votes SET created_at = ?1", params![stale])?;
      Ok(())
    })
    .await
    .unwrap();

  assert!(s.stats().await.unwrap().trending_facts.is_empty());
}

#[tokio::test]
async fn admin_stats_bucket_by_day() {
  let s = store().await;
  let a = add(&s, "First fact of the day", "Alice", "x").await;
  add(&s, "Second fact of the day", "Bob", "y").await;
  add(&s, "Third fact, same author", "Bob", "y").await;
  vote(&s, &a, "y", Up).await;
  vote(&s, &a, "z", Down).await;

  let stats = s.admin_stats().await.unwrap();

  assert_eq!(stats.facts_by_day.len(), 1);
  assert_eq!(stats.facts_by_day[0].count, 3);

  assert_eq!(stats.vote_activity.len(), 2);
  assert_eq!(stats.vote_activity.iter().map(|v| v.count).sum::<u64>(), 2);

  assert_eq!(stats.user_growth.len(), 1);
  assert_eq!(stats.user_growth[0].new_users, 2);
  assert_eq!(stats.user_growth[0].join_date, stats.facts_by_day[0].date);
}

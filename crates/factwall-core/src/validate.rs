//! Validation of user-submitted text.
//!
//! Every check normalises its input first (trim, then collapse whitespace
//! runs to one space) and returns the normalised string on success. Lengths
//! are counted in Unicode scalar values.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const MIN_CONTENT_LEN: usize = 10;
pub const MAX_CONTENT_LEN: usize = 280;
pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 30;

/// A run of this many identical characters is rejected as spam.
pub const MAX_REPEAT_RUN: usize = 10;

const FORBIDDEN_NAME_CHARS: &[char] = &['<', '>', '{', '}', '[', ']', '\\', '/'];

static URL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("static regex"));

static HTML_TAG: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));

/// Why a piece of text was rejected. The display strings are shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
  #[error("content is required")]
  ContentMissing,
  #[error("content is too short (min. {} characters)", MIN_CONTENT_LEN)]
  ContentTooShort,
  #[error("content is too long (max. {} characters)", MAX_CONTENT_LEN)]
  ContentTooLong,
  #[error("URLs are not allowed")]
  ContainsUrl,
  #[error("HTML tags are not allowed")]
  ContainsHtml,
  #[error("too many repeated characters")]
  RepeatedCharacters,

  #[error("name is required")]
  NameMissing,
  #[error("name is too short (min. {} characters)", MIN_NAME_LEN)]
  NameTooShort,
  #[error("name is too long (max. {} characters)", MAX_NAME_LEN)]
  NameTooLong,
  #[error("name contains invalid characters")]
  NameInvalidCharacters,
}

/// Trim and collapse every internal whitespace run to a single space.
pub fn normalize(input: &str) -> String {
  input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check fact content. Rules run in order and the first failure wins.
pub fn check_content(raw: &str) -> Result<String, Rejection> {
  let text = normalize(raw);
  let len  = text.chars().count();

  if len == 0 {
    return Err(Rejection::ContentMissing);
  }
  if len < MIN_CONTENT_LEN {
    return Err(Rejection::ContentTooShort);
  }
  if len > MAX_CONTENT_LEN {
    return Err(Rejection::ContentTooLong);
  }
  if URL.is_match(&text) {
    return Err(Rejection::ContainsUrl);
  }
  if HTML_TAG.is_match(&text) {
    return Err(Rejection::ContainsHtml);
  }
  if longest_run(&text) >= MAX_REPEAT_RUN {
    return Err(Rejection::RepeatedCharacters);
  }
  Ok(text)
}

/// Check an author name or display name.
pub fn check_name(raw: &str) -> Result<String, Rejection> {
  let name = normalize(raw);
  let len  = name.chars().count();

  if len == 0 {
    return Err(Rejection::NameMissing);
  }
  if len < MIN_NAME_LEN {
    return Err(Rejection::NameTooShort);
  }
  if len > MAX_NAME_LEN {
    return Err(Rejection::NameTooLong);
  }
  if name.contains(FORBIDDEN_NAME_CHARS) {
    return Err(Rejection::NameInvalidCharacters);
  }
  Ok(name)
}

/// Length of the longest run of one repeated character.
fn longest_run(text: &str) -> usize {
  let mut longest = 0;
  let mut current = 0;
  let mut prev    = None;
  for c in text.chars() {
    current = if prev == Some(c) { current + 1 } else { 1 };
    longest = longest.max(current);
    prev = Some(c);
  }
  longest
}

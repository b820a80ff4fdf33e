//! `Cache-Control` middleware.
//!
//! | Path | Header |
//! |------|--------|
//! | `/_app/immutable/*` | `public, max-age=31536000, immutable` |
//! | `/`, `/_app/*` | no-store, or `public, max-age=N` with [`ShellCaching::MaxAge`] |
//! | media extensions | `public, max-age=86400` |
//!
//! Other responses pass through untouched.

use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, header},
  middleware::Next,
  response::Response,
};

const IMMUTABLE: &str = "public, max-age=31536000, immutable";
const NO_STORE: &str = "no-cache, no-store, must-revalidate";
const MEDIA: &str = "public, max-age=86400";

const MEDIA_EXTENSIONS: &[&str] = &[
  "png", "jpg", "jpeg", "gif", "webp", "avif", "svg", "ico", "woff", "woff2",
];

/// How the app shell (`/` and `/_app/*`) may be cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCaching {
  NoStore,
  MaxAge(u64),
}

impl ShellCaching {
  pub fn from_max_age(secs: Option<u64>) -> Self { secs.map_or(Self::NoStore, Self::MaxAge) }
}

pub async fn cache_headers(
  State(shell): State<ShellCaching>,
  req: Request,
  next: Next,
) -> Response {
  let path = req.uri().path().to_owned();
  let mut res = next.run(req).await;
  apply(&path, shell, res.headers_mut());
  res
}

fn apply(path: &str, shell: ShellCaching, headers: &mut HeaderMap) {
  if path.starts_with("/_app/immutable/") {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(IMMUTABLE));
  } else if path == "/" || path.starts_with("/_app/") {
    match shell {
      ShellCaching::NoStore => {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
      }
      ShellCaching::MaxAge(secs) => {
        if let Ok(v) = HeaderValue::from_str(&format!("public, max-age={secs}")) {
          headers.insert(header::CACHE_CONTROL, v);
        }
      }
    }
  } else if is_media(path) {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(MEDIA));
  }
}

fn is_media(path: &str) -> bool {
  path
    .rsplit_once('.')
    .is_some_and(|(_, ext)| MEDIA_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
}

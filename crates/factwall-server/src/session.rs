//! Session, username and admin cookies.
//!
//! A session is an opaque random id stored in an HTTP-only cookie and minted
//! on the first request that needs one. It is the only identity a visitor
//! has: it owns the facts they submit and keys the votes they cast.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use factwall_core::fact::SessionId;
use time::Duration;
use tracing::debug;

use crate::ServerConfig;

pub const SESSION_COOKIE: &str = "factwall_session";
pub const USERNAME_COOKIE: &str = "factwall_username";
pub const ADMIN_COOKIE: &str = "admin_auth";

const ONE_YEAR: Duration = Duration::days(365);
const ONE_DAY: Duration = Duration::days(1);

/// Attributes applied to a cookie when it is set.
#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
  pub path:      &'static str,
  pub max_age:   Duration,
  pub http_only: bool,
  pub same_site: SameSite,
  pub secure:    bool,
}

impl CookieOptions {
  pub fn session(secure: bool) -> Self {
    Self { path: "/", max_age: ONE_YEAR, http_only: true, same_site: SameSite::Lax, secure }
  }

  /// Readable from the front-end so it can prefill the author field.
  pub fn username(secure: bool) -> Self {
    Self { path: "/", max_age: ONE_YEAR, http_only: false, same_site: SameSite::Lax, secure }
  }

  pub fn admin(secure: bool) -> Self {
    Self { path: "/", max_age: ONE_DAY, http_only: true, same_site: SameSite::Lax, secure }
  }

  pub fn build(&self, name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
      .path(self.path)
      .max_age(self.max_age)
      .http_only(self.http_only)
      .same_site(self.same_site)
      .secure(self.secure)
      .build()
  }
}

fn value_of(jar: &CookieJar, name: &str) -> Option<String> {
  jar
    .get(name)
    .map(|c| c.value().to_owned())
    .filter(|v| !v.is_empty())
}

/// Return the caller's session, minting one (and adding its cookie to the
/// returned jar) if the request carried none.
pub fn get_or_create(jar: CookieJar, config: &ServerConfig) -> (CookieJar, SessionId) {
  if let Some(existing) = value_of(&jar, SESSION_COOKIE) {
    return (jar, SessionId::from(existing));
  }
  let id = SessionId::generate();
  debug!(session = %id, "minted session");
  let cookie = CookieOptions::session(config.secure_cookies()).build(SESSION_COOKIE, id.to_string());
  (jar.add(cookie), id)
}

/// The remembered display name, if any.
pub fn username(jar: &CookieJar) -> Option<String> { value_of(jar, USERNAME_COOKIE) }

pub fn set_username(jar: CookieJar, name: String, config: &ServerConfig) -> CookieJar {
  jar.add(CookieOptions::username(config.secure_cookies()).build(USERNAME_COOKIE, name))
}

// ─── Admin ────────────────────────────────────────────────────────────────────

/// The admin cookie carries the configured password verbatim. An empty
/// password never authenticates.
pub fn is_admin(jar: &CookieJar, password: &str) -> bool {
  !password.is_empty() && value_of(jar, ADMIN_COOKIE).is_some_and(|v| v == password)
}

pub fn grant_admin(jar: CookieJar, config: &ServerConfig) -> CookieJar {
  jar.add(CookieOptions::admin(config.secure_cookies()).build(ADMIN_COOKIE, config.admin_password.clone()))
}

pub fn revoke_admin(jar: CookieJar) -> CookieJar {
  jar.remove(Cookie::build(ADMIN_COOKIE).path("/"))
}

#[cfg(test)]
mod tests {
  use axum::http::{HeaderMap, HeaderValue, header};

  use super::*;
  use crate::tests::test_config;

  fn jar_with(cookie: &str) -> CookieJar {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
    CookieJar::from_headers(&headers)
  }

  #[test]
  fn existing_session_is_reused() {
    let (jar, id) = get_or_create(jar_with("factwall_session=abc"), &test_config());
    assert_eq!(id.as_str(), "abc");
    assert_eq!(jar.get(SESSION_COOKIE).unwrap().value(), "abc");
  }

  #[test]
  fn empty_session_cookie_mints_a_new_one() {
    let (jar, id) = get_or_create(jar_with("factwall_session="), &test_config());
    assert!(!id.as_str().is_empty());
    let cookie = jar.get(SESSION_COOKIE).unwrap();
    assert_eq!(cookie.value(), id.as_str());
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.max_age(), Some(ONE_YEAR));
  }

  #[test]
  fn username_cookie_is_readable_by_scripts() {
    let jar = set_username(CookieJar::new(), "Ada".into(), &test_config());
    let cookie = jar.get(USERNAME_COOKIE).unwrap();
    assert_eq!(cookie.http_only(), Some(false));
    assert_eq!(username(&jar).as_deref(), Some("Ada"));
  }

  #[test]
  fn secure_flag_follows_environment() {
    let mut cfg = test_config();
    assert!(!CookieOptions::session(cfg.secure_cookies()).secure);
    cfg.environment = crate::Environment::Production;
    assert!(CookieOptions::session(cfg.secure_cookies()).secure);
  }

  #[test]
  fn admin_cookie_must_match_password() {
    assert!(is_admin(&jar_with("admin_auth=hunter2"), "hunter2"));
    assert!(!is_admin(&jar_with("admin_auth=wrong"), "hunter2"));
    assert!(!is_admin(&jar_with("admin_auth="), ""));
    assert!(!is_admin(&CookieJar::new(), "hunter2"));
  }
}

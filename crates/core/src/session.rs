//! Browser-session credentials for the private API.
//!
//! The private `rest/` surface only accepts requests that carry the cookies of
//! a browser session and echo the session's CSRF cookie back as a header.
//! [`SessionAdapter::prepare`] turns a baseline request from a [`BaseClient`]
//! into such a request:
//!
//! 1. Ask the base client for a baseline request (basic auth).
//! 2. `GET rest/user/session` through the base client.
//! 3. Copy every cookie from that response onto the request.
//! 4. Mirror the `CLM-CSRF-TOKEN` cookie, when present, into `X-CSRF-TOKEN`.
//!
//! A missing CSRF cookie is not a local error; the server rejects the request
//! itself if it needs one.
//!
//! With [`SessionPolicy::Reuse`] the bootstrapped session is kept for its TTL
//! instead of being fetched on every call. The dispatcher reports rejections
//! back through [`SessionAdapter::invalidate`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use reqwest::header::{COOKIE, HeaderName, HeaderValue};
use reqwest::{Method, Request};
use tracing::debug;

use crate::config::SessionPolicy;
use crate::error::{Error, Result};
use crate::server::{BaseClient, RequestBody, SessionCookie};

/// Path that hands out a fresh browser session.
pub const SESSION_PATH: &str = "rest/user/session";
/// Cookie holding the anti-forgery token.
pub const CSRF_COOKIE: &str = "CLM-CSRF-TOKEN";
/// Header the server expects the anti-forgery token in.
pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

/// Cookies of one bootstrapped session plus its CSRF token, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	pub cookies: Vec<SessionCookie>,
	pub csrf_token: Option<String>,
}

impl Session {
	pub fn from_cookies(cookies: Vec<SessionCookie>) -> Self {
		let csrf_token = cookies.iter().find(|c| c.name == CSRF_COOKIE).map(|c| c.value.clone());
		Self { cookies, csrf_token }
	}

	/// Value of a single `Cookie` request header carrying every session cookie.
	pub fn cookie_header(&self) -> Option<String> {
		if self.cookies.is_empty() {
			return None;
		}
		Some(
			self.cookies
				.iter()
				.map(|c| format!("{}={}", c.name, c.value))
				.collect::<Vec<_>>()
				.join("; "),
		)
	}

	/// Decorates `request` with this session's cookies and CSRF header.
	pub fn apply(&self, request: &mut Request) -> Result<()> {
		let headers = request.headers_mut();
		if let Some(cookie) = self.cookie_header() {
			headers.append(COOKIE, HeaderValue::from_str(&cookie)?);
		}
		if let Some(token) = &self.csrf_token {
			headers.insert(HeaderName::from_static("x-csrf-token"), HeaderValue::from_str(token)?);
		}
		Ok(())
	}
}

/// Where the session used by a prepared request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
	Fresh,
	Cached,
}

/// A request ready to be sent to the private API.
#[derive(Debug)]
pub struct AuthenticatedRequest {
	pub request: Request,
	pub origin: SessionOrigin,
}

struct CachedSession {
	session: Session,
	fetched_at: Instant,
}

/// Wraps a [`BaseClient`] and produces session-authenticated requests.
pub struct SessionAdapter {
	base: Arc<dyn BaseClient>,
	policy: SessionPolicy,
	cached: Mutex<Option<CachedSession>>,
}

impl SessionAdapter {
	pub fn new(base: Arc<dyn BaseClient>) -> Self {
		Self::with_policy(base, SessionPolicy::Fresh)
	}

	pub fn with_policy(base: Arc<dyn BaseClient>, policy: SessionPolicy) -> Self {
		Self {
			base,
			policy,
			cached: Mutex::new(None),
		}
	}

	pub fn base(&self) -> &Arc<dyn BaseClient> {
		&self.base
	}

	pub fn policy(&self) -> SessionPolicy {
		self.policy
	}

	/// Builds an authenticated request for `method` and the server-relative `path`.
	///
	/// # Errors
	///
	/// Returns the base client's error if the baseline request cannot be
	/// built or the session bootstrap fails (transport error or non-2xx
	/// status). No request is produced in that case.
	pub async fn prepare(&self, method: Method, path: &str, body: &RequestBody) -> Result<AuthenticatedRequest> {
		let mut request = self.base.new_request(method, path, body)?;
		let (session, origin) = self.session().await?;
		session.apply(&mut request)?;

		debug!(
			target: "iq.session",
			path,
			cookies = session.cookies.len(),
			csrf = session.csrf_token.is_some(),
			cached = origin == SessionOrigin::Cached,
			"prepared private request"
		);
		Ok(AuthenticatedRequest { request, origin })
	}

	/// Drops a cached session so the next [`prepare`](Self::prepare) bootstraps again.
	pub fn invalidate(&self) {
		if self.cached.lock().take().is_some() {
			debug!(target: "iq.session", "discarded cached session");
		}
	}

	async fn session(&self) -> Result<(Session, SessionOrigin)> {
		let Some(ttl) = self.policy.ttl() else {
			return Ok((self.bootstrap().await?, SessionOrigin::Fresh));
		};

		if let Some(session) = self.cached_session(ttl) {
			return Ok((session, SessionOrigin::Cached));
		}

		let session = self.bootstrap().await?;
		*self.cached.lock() = Some(CachedSession {
			session: session.clone(),
			fetched_at: Instant::now(),
		});
		Ok((session, SessionOrigin::Fresh))
	}

	fn cached_session(&self, ttl: Duration) -> Option<Session> {
		let mut cached = self.cached.lock();
		match cached.as_ref() {
			Some(entry) if entry.fetched_at.elapsed() < ttl => Some(entry.session.clone()),
			Some(_) => {
				debug!(target: "iq.session", ttl_secs = ttl.as_secs(), "cached session expired");
				*cached = None;
				None
			}
			None => None,
		}
	}

	async fn bootstrap(&self) -> Result<Session> {
		let response = self.base.get(SESSION_PATH).await?;
		if !response.is_success() {
			return Err(Error::RemoteStatus {
				status: response.status,
				path: SESSION_PATH.to_string(),
				body: response.text(),
			});
		}
		Ok(Session::from_cookies(response.cookies))
	}
}

//! Verb façade over the session adapter.
//!
//! [`PrivateClient`] is the only way endpoint functions reach the private
//! API. It never turns a status code into an error: several endpoints signal
//! success with `204 No Content`, so callers check statuses themselves (see
//! [`expect_success`] and [`expect_deleted`]).

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{ServerConfig, SessionPolicy};
use crate::error::{Error, Result};
use crate::server::{BaseClient, IqServer, RawResponse, RequestBody};
use crate::session::{SessionAdapter, SessionOrigin};

/// Session-authenticated client for the private `rest/` API.
pub struct PrivateClient {
	adapter: SessionAdapter,
}

impl PrivateClient {
	pub fn new(base: Arc<dyn BaseClient>) -> Self {
		Self {
			adapter: SessionAdapter::new(base),
		}
	}

	pub fn with_policy(base: Arc<dyn BaseClient>, policy: SessionPolicy) -> Self {
		Self {
			adapter: SessionAdapter::with_policy(base, policy),
		}
	}

	/// Connects a reqwest-backed client described by `config`.
	pub fn from_config(config: &ServerConfig) -> Result<Self> {
		let base: Arc<dyn BaseClient> = Arc::new(IqServer::from_config(config)?);
		Ok(Self::with_policy(base, config.session))
	}

	pub fn adapter(&self) -> &SessionAdapter {
		&self.adapter
	}

	pub fn base(&self) -> &Arc<dyn BaseClient> {
		self.adapter.base()
	}

	pub async fn get(&self, path: &str) -> Result<RawResponse> {
		self.send(Method::GET, path, RequestBody::Empty).await
	}

	pub async fn post(&self, path: &str, body: RequestBody) -> Result<RawResponse> {
		self.send(Method::POST, path, body).await
	}

	pub async fn put(&self, path: &str, body: RequestBody) -> Result<RawResponse> {
		self.send(Method::PUT, path, body).await
	}

	/// Returns only the status; delete endpoints answer `204` with no body.
	pub async fn delete(&self, path: &str) -> Result<StatusCode> {
		Ok(self.send(Method::DELETE, path, RequestBody::Empty).await?.status)
	}

	/// Uploads `content` as the `file` field of a multipart form.
	pub async fn post_multipart(&self, path: &str, content: impl Into<bytes::Bytes>) -> Result<RawResponse> {
		self.send(Method::POST, path, RequestBody::file(content)).await
	}

	pub async fn post_json<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<RawResponse> {
		self.post(path, RequestBody::json(value)?).await
	}

	pub async fn put_json<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<RawResponse> {
		self.put(path, RequestBody::json(value)?).await
	}

	/// GET `path`, require a 2xx and decode the body.
	pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
		let response = expect_success(self.get(path).await?, path)?;
		response.json(path)
	}

	/// Prepares and sends one request.
	///
	/// A request that went out with a cached session and came back `401` or
	/// `403` is retried once with a freshly bootstrapped session.
	pub async fn send(&self, method: Method, path: &str, body: RequestBody) -> Result<RawResponse> {
		let prepared = self.adapter.prepare(method.clone(), path, &body).await?;
		let origin = prepared.origin;
		let response = self.adapter.base().execute(prepared.request).await?;
		debug!(target: "iq.private", %method, path, status = response.status.as_u16(), "private request completed");

		if origin == SessionOrigin::Cached && is_session_rejection(response.status) {
			warn!(target: "iq.private", path, status = response.status.as_u16(), "cached session rejected; bootstrapping a new one");
			self.adapter.invalidate();
			let prepared = self.adapter.prepare(method, path, &body).await?;
			return self.adapter.base().execute(prepared.request).await;
		}

		Ok(response)
	}
}

fn is_session_rejection(status: StatusCode) -> bool {
	status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Requires a 2xx response.
pub fn expect_success(response: RawResponse, path: &str) -> Result<RawResponse> {
	response.error_for_status(path)
}

/// Requires a delete-style success: `204 No Content` or any other 2xx.
pub fn expect_deleted(status: StatusCode, path: &str) -> Result<()> {
	if status.is_success() {
		Ok(())
	} else {
		Err(Error::RemoteStatus {
			status,
			path: path.to_string(),
			body: String::new(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fake::{FakeReply, FakeServer};
	use crate::session::{CSRF_COOKIE, SESSION_PATH};

	fn client(fake: &Arc<FakeServer>) -> PrivateClient {
		fake.set_session_cookies(&[("JSESSIONID", "s1"), (CSRF_COOKIE, "tok")]);
		PrivateClient::new(fake.clone())
	}

	#[tokio::test]
	async fn delete_accepts_204_and_200_with_body() {
		let fake = Arc::new(FakeServer::new());
		let client = client(&fake);
		fake.route(Method::DELETE, "rest/organization/a", FakeReply::status(StatusCode::NO_CONTENT));
		fake.route(Method::DELETE, "rest/organization/b", FakeReply::json(StatusCode::OK, serde_json::json!({"deleted": true})));

		let status = client.delete("rest/organization/a").await.unwrap();
		assert_eq!(status, StatusCode::NO_CONTENT);
		expect_deleted(status, "rest/organization/a").unwrap();

		let status = client.delete("rest/organization/b").await.unwrap();
		assert_eq!(status, StatusCode::OK);
		expect_deleted(status, "rest/organization/b").unwrap();
	}

	#[tokio::test]
	async fn dispatcher_returns_error_statuses_unmodified() {
		let fake = Arc::new(FakeServer::new());
		let client = client(&fake);
		fake.route(Method::DELETE, "rest/organization/missing", FakeReply::status(StatusCode::NOT_FOUND));
		fake.route(Method::GET, "rest/product/license", FakeReply::text(StatusCode::INTERNAL_SERVER_ERROR, "boom"));

		let status = client.delete("rest/organization/missing").await.unwrap();
		assert_eq!(status, StatusCode::NOT_FOUND);
		let err = expect_deleted(status, "rest/organization/missing").unwrap_err();
		assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

		let response = client.get("rest/product/license").await.unwrap();
		assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(response.text(), "boom");
		assert!(expect_success(response, "rest/product/license").is_err());
	}

	#[tokio::test]
	async fn every_verb_is_decorated_with_the_session() {
		let fake = Arc::new(FakeServer::new());
		let client = client(&fake);
		fake.route(Method::PUT, "rest/config/systemNotice", FakeReply::status(StatusCode::NO_CONTENT));
		fake.route(Method::POST, "rest/config/webhook", FakeReply::status(StatusCode::NO_CONTENT));

		client.put_json("rest/config/systemNotice", &serde_json::json!({"enabled": false})).await.unwrap();
		client.post("rest/config/webhook", RequestBody::Empty).await.unwrap();

		for recorded in fake.requests().iter().filter(|r| r.path != SESSION_PATH) {
			assert_eq!(recorded.header("x-csrf-token").as_deref(), Some("tok"), "{} lacked csrf", recorded.path);
			assert_eq!(recorded.header("cookie").as_deref(), Some("JSESSIONID=s1; CLM-CSRF-TOKEN=tok"));
		}
		assert_eq!(fake.requests_to(SESSION_PATH), 2);
	}

	#[tokio::test]
	async fn transport_failure_of_the_call_propagates() {
		let fake = Arc::new(FakeServer::new());
		let client = client(&fake);
		fake.route(Method::GET, "rest/product/license", FakeReply::fail("connection reset"));

		let err = client.get("rest/product/license").await.unwrap_err();
		assert!(err.is_transport());
	}

	#[tokio::test]
	async fn rejected_cached_session_is_replaced_transparently() {
		let fake = Arc::new(FakeServer::new());
		fake.set_session_cookies(&[(CSRF_COOKIE, "stale")]);
		let client = PrivateClient::with_policy(fake.clone(), SessionPolicy::Reuse { ttl_secs: 600 });
		fake.route(Method::GET, "rest/product/license", FakeReply::json(StatusCode::OK, serde_json::json!({})));

		client.get("rest/product/license").await.unwrap();
		assert_eq!(fake.requests_to(SESSION_PATH), 1);

		// Server-side session expired: the stale token is refused once.
		fake.route_sequence(
			Method::GET,
			"rest/product/license",
			vec![
				FakeReply::status(StatusCode::FORBIDDEN),
				FakeReply::json(StatusCode::OK, serde_json::json!({"fingerprint": "f"})),
			],
		);
		fake.set_session_cookies(&[(CSRF_COOKIE, "renewed")]);

		let response = client.get("rest/product/license").await.unwrap();
		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(fake.requests_to(SESSION_PATH), 2);
		let last = fake.requests().into_iter().last().unwrap();
		assert_eq!(last.header("x-csrf-token").as_deref(), Some("renewed"));
	}

	#[tokio::test]
	async fn fresh_session_rejection_is_not_retried() {
		let fake = Arc::new(FakeServer::new());
		let client = client(&fake);
		fake.route(Method::GET, "rest/product/license", FakeReply::status(StatusCode::FORBIDDEN));

		let response = client.get("rest/product/license").await.unwrap();
		assert_eq!(response.status, StatusCode::FORBIDDEN);
		assert_eq!(fake.requests_to("rest/product/license"), 1);
	}
}

//! Base client: host, credentials and raw request execution.
//!
//! [`BaseClient`] is the seam between the session adapter and the network.
//! [`IqServer`] implements it with `reqwest` and basic auth; tests use
//! [`FakeServer`](crate::fake::FakeServer) instead.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::config::ServerConfig;
use crate::error::{Error, Result};

/// Cookie carried by a response's `Set-Cookie` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
	pub name: String,
	pub value: String,
}

impl SessionCookie {
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
		}
	}
}

/// Request payload. Kept as plain data so a request can be rebuilt when a
/// cached session has to be replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
	#[default]
	Empty,
	/// Serialized JSON, sent with `Content-Type: application/json`.
	Json(Bytes),
	/// Single-file `multipart/form-data` upload.
	Multipart { field: String, file_name: String, content: Bytes },
}

impl RequestBody {
	pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
		Ok(RequestBody::Json(Bytes::from(serde_json::to_vec(value)?)))
	}

	pub fn file(content: impl Into<Bytes>) -> Self {
		RequestBody::Multipart {
			field: "file".into(),
			file_name: "file".into(),
			content: content.into(),
		}
	}
}

/// Fully read response.
#[derive(Debug, Clone)]
pub struct RawResponse {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub cookies: Vec<SessionCookie>,
	pub body: Bytes,
}

impl RawResponse {
	pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			cookies: Vec::new(),
			body: body.into(),
		}
	}

	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	pub fn cookie(&self, name: &str) -> Option<&SessionCookie> {
		self.cookies.iter().find(|c| c.name == name)
	}

	/// Decodes the body as JSON.
	pub fn json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
		serde_json::from_slice(&self.body).map_err(|source| Error::Decode {
			path: path.to_string(),
			source,
		})
	}

	/// Turns a non-2xx response into [`Error::RemoteStatus`].
	pub fn error_for_status(self, path: &str) -> Result<Self> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(Error::RemoteStatus {
				status: self.status,
				path: path.to_string(),
				body: self.text(),
			})
		}
	}
}

/// A client already authenticated against the public API.
#[async_trait]
pub trait BaseClient: Send + Sync {
	/// Builds a request for the server-relative `path` carrying this
	/// client's own credentials.
	fn new_request(&self, method: Method, path: &str, body: &RequestBody) -> Result<Request>;

	/// Sends `request` and reads the whole response, whatever its status.
	async fn execute(&self, request: Request) -> Result<RawResponse>;

	/// Authenticated GET of `path`.
	async fn get(&self, path: &str) -> Result<RawResponse> {
		let request = self.new_request(Method::GET, path, &RequestBody::Empty)?;
		self.execute(request).await
	}
}

/// Joins a host and a server-relative path into an absolute URL.
pub fn endpoint_url(host: &str, path: &str) -> Result<url::Url> {
	let joined = format!("{}/{}", host.trim_end_matches('/'), path.trim_start_matches('/'));
	url::Url::parse(&joined).map_err(|source| Error::InvalidUrl { url: joined, source })
}

/// Builds a request with `http`, attaching `body` appropriately.
pub(crate) fn build_request(http: &reqwest::Client, method: Method, url: url::Url, body: &RequestBody) -> Result<reqwest::RequestBuilder> {
	let builder = http.request(method, url);
	Ok(match body {
		RequestBody::Empty => builder,
		RequestBody::Json(bytes) => builder
			.header(reqwest::header::CONTENT_TYPE, "application/json")
			.body(bytes.clone()),
		RequestBody::Multipart { field, file_name, content } => {
			let part = Part::bytes(content.to_vec()).file_name(file_name.clone());
			builder.multipart(Form::new().part(field.clone(), part))
		}
	})
}

/// `reqwest`-backed [`BaseClient`] using HTTP basic auth.
#[derive(Clone)]
pub struct IqServer {
	http: reqwest::Client,
	host: String,
	username: String,
	password: String,
}

impl std::fmt::Debug for IqServer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("IqServer")
			.field("host", &self.host)
			.field("username", &self.username)
			.finish_non_exhaustive()
	}
}

impl IqServer {
	pub fn new(host: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
		Self::from_config(&ServerConfig::new(host, username, password))
	}

	pub fn from_config(config: &ServerConfig) -> Result<Self> {
		config.validate()?;
		let http = reqwest::Client::builder()
			.user_agent(format!("iq-private/{}", env!("CARGO_PKG_VERSION")))
			.timeout(config.timeout())
			.build()?;

		Ok(Self {
			http,
			host: config.host.trim_end_matches('/').to_string(),
			username: config.username.clone(),
			password: config.password.clone(),
		})
	}
}

#[async_trait]
impl BaseClient for IqServer {
	fn new_request(&self, method: Method, path: &str, body: &RequestBody) -> Result<Request> {
		let url = endpoint_url(&self.host, path)?;
		let request = build_request(&self.http, method, url, body)?
			.basic_auth(&self.username, Some(&self.password))
			.build()?;
		Ok(request)
	}

	async fn execute(&self, request: Request) -> Result<RawResponse> {
		trace!(target: "iq.public", method = %request.method(), url = %request.url(), "sending request");
		let response = self.http.execute(request).await?;
		let status = response.status();
		let headers = response.headers().clone();
		let cookies = response.cookies().map(|c| SessionCookie::new(c.name(), c.value())).collect();
		let body = response.bytes().await?;

		Ok(RawResponse {
			status,
			headers,
			cookies,
			body,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn endpoint_url_joins_without_double_slash() {
		let url = endpoint_url("http://localhost:8070/", "/rest/user/session").unwrap();
		assert_eq!(url.as_str(), "http://localhost:8070/rest/user/session");

		let url = endpoint_url("http://iq.local/iq", "rest/support?noLimit=true").unwrap();
		assert_eq!(url.as_str(), "http://iq.local/iq/rest/support?noLimit=true");
	}

	#[test]
	fn new_request_uses_basic_auth_and_json_body() {
		let server = IqServer::new("http://localhost:8070", "admin", "admin123").unwrap();
		let body = RequestBody::json(&serde_json::json!({"enabled": true})).unwrap();
		let request = server.new_request(Method::PUT, "rest/config/automaticApplications", &body).unwrap();

		assert_eq!(request.method(), Method::PUT);
		assert_eq!(request.url().path(), "/rest/config/automaticApplications");
		let auth = request.headers().get(reqwest::header::AUTHORIZATION).unwrap();
		assert_eq!(auth.to_str().unwrap(), "Basic YWRtaW46YWRtaW4xMjM=");
		assert_eq!(request.headers().get(reqwest::header::CONTENT_TYPE).unwrap(), "application/json");
		assert_eq!(request.body().and_then(|b| b.as_bytes()), Some(&br#"{"enabled":true}"#[..]));
	}

	#[test]
	fn multipart_body_sets_form_content_type() {
		let server = IqServer::new("http://localhost:8070", "admin", "admin123").unwrap();
		let request = server
			.new_request(Method::POST, "rest/product/license", &RequestBody::file(&b"license-bytes"[..]))
			.unwrap();
		let content_type = request.headers().get(reqwest::header::CONTENT_TYPE).unwrap().to_str().unwrap();
		assert!(content_type.starts_with("multipart/form-data; boundary="));
	}

	#[test]
	fn error_for_status_keeps_body() {
		let response = RawResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");
		let err = response.error_for_status("rest/x").unwrap_err();
		assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
		assert!(err.to_string().contains("boom"));
	}

	#[test]
	fn from_config_rejects_invalid_host() {
		assert!(IqServer::new("localhost:8070 nope", "a", "b").is_err());
	}
}

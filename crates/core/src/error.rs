//! Error types for private IQ API access.

use reqwest::StatusCode;
use thiserror::Error;

use crate::aggregate::SubFetchFailure;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// Connection-level failure talking to the server (refused, reset, TLS, timeout).
	#[error("Transport error: {0}")]
	Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

	/// The server answered with a status the operation does not accept.
	#[error("HTTP {status} from {path}: {body}")]
	RemoteStatus { status: StatusCode, path: String, body: String },

	#[error("Failed to decode response from {path}: {source}")]
	Decode {
		path: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("Invalid URL '{url}': {source}")]
	InvalidUrl {
		url: String,
		#[source]
		source: url::ParseError,
	},

	#[error("Invalid header value: {0}")]
	InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Timeout: {0}")]
	Timeout(String),

	#[error("Aggregation cancelled after {completed} key(s)")]
	Cancelled { completed: usize },

	/// Fail-fast aggregation stopped at the first failed sub-fetch.
	#[error("Aggregation aborted after {collected} item(s): {}", .failures.first().map(|f| f.to_string()).unwrap_or_default())]
	AggregationAborted { collected: usize, failures: Vec<SubFetchFailure> },

	#[error("Worker task failed: {0}")]
	Worker(String),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		Error::Transport(Box::new(err))
	}
}

impl Error {
	/// Builds a transport error from a plain message.
	pub fn transport(message: impl Into<String>) -> Self {
		let message: String = message.into();
		Error::Transport(message.into())
	}

	/// Status code carried by a [`Error::RemoteStatus`].
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Error::RemoteStatus { status, .. } => Some(*status),
			_ => None,
		}
	}

	pub fn is_transport(&self) -> bool {
		matches!(self, Error::Transport(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn remote_status_display_includes_path_and_body() {
		let err = Error::RemoteStatus {
			status: StatusCode::NOT_FOUND,
			path: "rest/organization/abc".into(),
			body: "no such organization".into(),
		};
		assert_eq!(err.to_string(), "HTTP 404 Not Found from rest/organization/abc: no such organization");
		assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
	}

	#[test]
	fn transport_helper_builds_transport_variant() {
		let err = Error::transport("connection refused");
		assert!(err.is_transport());
		assert_eq!(err.to_string(), "Transport error: connection refused");
	}
}

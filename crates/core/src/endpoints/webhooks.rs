use iq_protocol::Webhook;
use tracing::info;

use crate::error::Result;
use crate::private::{PrivateClient, expect_success};

const WEBHOOK_PATH: &str = "rest/config/webhook";

/// Registers a webhook posting `event_types` to `url`, signed with `secret`.
pub async fn create_webhook(private: &PrivateClient, url: &str, secret: &str, event_types: &[&str]) -> Result<()> {
	let webhook = Webhook {
		id: None,
		url: url.to_string(),
		secret_key: secret.to_string(),
		event_types: event_types.iter().map(|t| t.to_string()).collect(),
	};
	expect_success(private.post_json(WEBHOOK_PATH, &webhook).await?, WEBHOOK_PATH)?;
	info!(target: "iq.endpoint", url, events = event_types.len(), "created webhook");
	Ok(())
}

#[cfg(test)]
mod tests {
	use iq_protocol::{WEBHOOK_EVENT_APP_EVALUATION, WEBHOOK_EVENT_VIOLATION_ALERT};
	use reqwest::{Method, StatusCode};

	use super::*;
	use crate::endpoints::test_support::setup;
	use crate::fake::FakeReply;

	#[tokio::test]
	async fn posts_webhook_payload() {
		let (fake, private) = setup();
		fake.route(Method::POST, WEBHOOK_PATH, FakeReply::json(StatusCode::OK, serde_json::json!({"id": "hook-1"})));

		create_webhook(
			&private,
			"http://hooks.local/iq",
			"s3cret",
			&[WEBHOOK_EVENT_APP_EVALUATION, WEBHOOK_EVENT_VIOLATION_ALERT],
		)
		.await
		.unwrap();

		let sent = fake.requests().into_iter().find(|r| r.path == WEBHOOK_PATH).unwrap();
		let body = sent.json().unwrap();
		assert_eq!(body["url"], "http://hooks.local/iq");
		assert_eq!(body["secretKey"], "s3cret");
		assert_eq!(body["eventTypes"][1], "Violation Alert");
		assert_eq!(sent.header("content-type").as_deref(), Some("application/json"));
	}
}

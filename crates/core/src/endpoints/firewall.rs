use iq_protocol::FirewallComponent;

use crate::error::Result;
use crate::private::PrivateClient;

/// Components reported for the repository manager repository `repository_id`.
pub async fn firewall_state(private: &PrivateClient, repository_id: &str) -> Result<Vec<FirewallComponent>> {
	private.get_json(&format!("rest/repositories/{}/report/details", repository_id)).await
}

#[cfg(test)]
mod tests {
	use reqwest::{Method, StatusCode};
	use serde_json::json;

	use super::*;
	use crate::endpoints::test_support::setup;
	use crate::fake::FakeReply;

	#[tokio::test]
	async fn decodes_quarantined_components() {
		let (fake, private) = setup();
		fake.route(
			Method::GET,
			"rest/repositories/maven-central/report/details",
			FakeReply::json(
				StatusCode::OK,
				json!([{
					"componentIdentifier": {"format": "maven", "coordinates": {"groupId": "g", "artifactId": "a", "version": "1"}},
					"componentDisplayText": "g : a : 1",
					"pathname": "g/a/1/a-1.jar",
					"hash": "abc",
					"matchState": "exact",
					"quarantined": true,
					"waived": false,
					"threatLevel": 9,
					"highestThreatLevel": true,
					"policyName": "Security-Critical"
				}]),
			),
		);

		let components = firewall_state(&private, "maven-central").await.unwrap();
		assert_eq!(components.len(), 1);
		assert!(components[0].quarantined);
		assert_eq!(components[0].threat_level, 9);
	}

	#[tokio::test]
	async fn error_status_is_not_decoded() {
		let (fake, private) = setup();
		fake.route(
			Method::GET,
			"rest/repositories/x/report/details",
			FakeReply::text(StatusCode::FORBIDDEN, "forbidden"),
		);
		let err = firewall_state(&private, "x").await.unwrap_err();
		assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
	}
}

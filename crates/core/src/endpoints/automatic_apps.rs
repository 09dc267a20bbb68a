use iq_protocol::AutomaticApplicationsRequest;
use tracing::info;

use crate::error::Result;
use crate::private::{PrivateClient, expect_success};
use crate::public::PublicApi;

const AUTO_APPS_PATH: &str = "rest/config/automaticApplications";

/// Turns on automatic application creation under the organization named `organization`.
pub async fn enable_automatic_applications(public: &dyn PublicApi, private: &PrivateClient, organization: &str) -> Result<()> {
	let org = public.organization_by_name(organization).await?;
	put(private, AutomaticApplicationsRequest {
		enabled: true,
		parent_organization_id: org.id,
	})
	.await?;
	info!(target: "iq.endpoint", organization, "enabled automatic applications");
	Ok(())
}

pub async fn disable_automatic_applications(private: &PrivateClient) -> Result<()> {
	put(private, AutomaticApplicationsRequest {
		enabled: false,
		parent_organization_id: String::new(),
	})
	.await
}

async fn put(private: &PrivateClient, request: AutomaticApplicationsRequest) -> Result<()> {
	expect_success(private.put_json(AUTO_APPS_PATH, &request).await?, AUTO_APPS_PATH)?;
	Ok(())
}

//! Policy export and import for the root organization.

use bytes::Bytes;
use iq_protocol::PolicySet;
use tracing::info;

use super::ROOT_ORGANIZATION_ID;
use crate::error::Result;
use crate::private::{PrivateClient, expect_success};

fn export_path() -> String {
	format!("rest/policy/organization/{}/export", ROOT_ORGANIZATION_ID)
}

fn import_path() -> String {
	format!("rest/policy/organization/{}/import", ROOT_ORGANIZATION_ID)
}

pub async fn export_policies(private: &PrivateClient) -> Result<PolicySet> {
	let policies: PolicySet = private.get_json(&export_path()).await?;
	info!(target: "iq.endpoint", policies = policies.policies.len(), "exported policies");
	Ok(policies)
}

/// Imports a document previously produced by [`export_policies`].
pub async fn import_policies(private: &PrivateClient, document: impl Into<Bytes>) -> Result<()> {
	let path = import_path();
	expect_success(private.post_multipart(&path, document).await?, &path)?;
	Ok(())
}

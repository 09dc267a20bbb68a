//! Organization removal and root-organization component evaluation.

use iq_protocol::{Component, Evaluation};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::private::{PrivateClient, expect_deleted};
use crate::public::PublicApi;

/// Deletes the organization with internal id `organization_id`.
pub async fn delete_organization(private: &PrivateClient, organization_id: &str) -> Result<()> {
	let path = format!("rest/organization/{}", organization_id);
	let status = private.delete(&path).await?;
	expect_deleted(status, &path)?;
	info!(target: "iq.endpoint", organization = organization_id, "deleted organization");
	Ok(())
}

/// Evaluates `components` against root-organization policies only.
///
/// A throwaway organization and `{name}_app` application are created for the
/// evaluation and removed afterwards. Cleanup failures are logged, not
/// returned.
pub async fn evaluate_components_with_root_org(public: &dyn PublicApi, private: &PrivateClient, components: &[Component]) -> Result<Evaluation> {
	let name = Uuid::new_v4().simple().to_string();
	let organization_id = public.create_organization(&name).await?;

	let app_name = format!("{}_app", name);
	let application_id = match public.create_application(&app_name, &organization_id).await {
		Ok(id) => id,
		Err(err) => {
			remove_temp_organization(private, &organization_id).await;
			return Err(err);
		}
	};
	info!(target: "iq.endpoint", application = %app_name, "created temporary application");

	let evaluation = public.evaluate_components(components, &application_id).await;

	if let Err(err) = public.delete_application(&application_id).await {
		warn!(target: "iq.endpoint", application = %app_name, error = %err, "failed to delete temporary application");
	}
	remove_temp_organization(private, &organization_id).await;

	evaluation
}

async fn remove_temp_organization(private: &PrivateClient, organization_id: &str) {
	if let Err(err) = delete_organization(private, organization_id).await {
		warn!(target: "iq.endpoint", organization = organization_id, error = %err, "failed to delete temporary organization");
	}
}

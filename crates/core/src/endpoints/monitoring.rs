//! Continuous policy monitoring for applications and organizations.

use iq_protocol::{PolicyMonitoringRequest, Stage};
use tracing::info;

use crate::error::Result;
use crate::private::{PrivateClient, expect_deleted, expect_success};
use crate::public::PublicApi;
use crate::server::RequestBody;

const TRIGGER_PATH: &str = "rest/tasks/triggerPolicyMonitor";

fn application_path(application_id: &str) -> String {
	format!("rest/policyMonitoring/application/{}", application_id)
}

fn organization_path(organization_id: &str) -> String {
	format!("rest/policyMonitoring/organization/{}", organization_id)
}

async fn enable(private: &PrivateClient, path: &str, stage: Stage) -> Result<()> {
	let request = PolicyMonitoringRequest { stage_type_id: stage };
	expect_success(private.put_json(path, &request).await?, path)?;
	info!(target: "iq.endpoint", path, %stage, "enabled continuous monitoring");
	Ok(())
}

async fn disable(private: &PrivateClient, path: &str) -> Result<()> {
	expect_deleted(private.delete(path).await?, path)
}

/// Monitors application `application` (public id) at `stage`.
pub async fn enable_application_monitoring(public: &dyn PublicApi, private: &PrivateClient, application: &str, stage: Stage) -> Result<()> {
	let app = public.application_by_public_id(application).await?;
	enable(private, &application_path(&app.id), stage).await
}

/// Monitors the organization named `organization` at `stage`.
pub async fn enable_organization_monitoring(public: &dyn PublicApi, private: &PrivateClient, organization: &str, stage: Stage) -> Result<()> {
	let org = public.organization_by_name(organization).await?;
	enable(private, &organization_path(&org.id), stage).await
}

pub async fn disable_application_monitoring(public: &dyn PublicApi, private: &PrivateClient, application: &str) -> Result<()> {
	let app = public.application_by_public_id(application).await?;
	disable(private, &application_path(&app.id)).await
}

pub async fn disable_organization_monitoring(public: &dyn PublicApi, private: &PrivateClient, organization: &str) -> Result<()> {
	let org = public.organization_by_name(organization).await?;
	disable(private, &organization_path(&org.id)).await
}

/// Runs the monitoring task now instead of waiting for its schedule.
pub async fn trigger_monitoring(private: &PrivateClient) -> Result<()> {
	expect_success(private.post(TRIGGER_PATH, RequestBody::Empty).await?, TRIGGER_PATH)?;
	Ok(())
}

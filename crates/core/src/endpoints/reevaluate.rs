//! Policy re-evaluation of existing reports.

use std::sync::Arc;

use iq_protocol::{Application, Stage};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::aggregate::{Aggregate, AggregationEngine, Contribution};
use crate::error::{Error, Result};
use crate::private::{PrivateClient, expect_success};
use crate::public::PublicApi;
use crate::server::RequestBody;

/// A report that was re-evaluated by [`reevaluate_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReevaluatedReport {
	pub application_public_id: String,
	pub stage: Stage,
	pub report_id: String,
}

/// Re-evaluates report `report_id` of application `application` (public id).
pub async fn reevaluate_report(private: &PrivateClient, application: &str, report_id: &str) -> Result<()> {
	let path = format!("rest/report/{}/{}/reevaluatePolicy", application, report_id);
	expect_success(private.post(&path, RequestBody::Empty).await?, &path)?;
	Ok(())
}

/// Re-evaluates the latest `stage` report of `application` (public id).
pub async fn reevaluate_stage(public: &dyn PublicApi, private: &PrivateClient, application: &str, stage: Stage) -> Result<()> {
	let app = public.application_by_public_id(application).await?;
	let info = public
		.report_infos(&app.id)
		.await?
		.into_iter()
		.find(|info| info.stage == stage)
		.ok_or_else(|| Error::NotFound(format!("no {} report for '{}'", stage, application)))?;
	reevaluate_report(private, application, info.report_id()).await?;
	info!(target: "iq.endpoint", application, %stage, "re-evaluated report");
	Ok(())
}

async fn reevaluate_application(public: &dyn PublicApi, private: &PrivateClient, app: &Application) -> Contribution<ReevaluatedReport> {
	let mut contribution = Contribution::default();
	let infos = match public.report_infos(&app.id).await {
		Ok(infos) => infos,
		Err(err) => {
			contribution.fail(&app.public_id, "report infos", &err);
			return contribution;
		}
	};
	for info in infos {
		let report_id = info.report_id().to_string();
		match reevaluate_report(private, &app.public_id, &report_id).await {
			Ok(()) => contribution.push(ReevaluatedReport {
				application_public_id: app.public_id.clone(),
				stage: info.stage,
				report_id,
			}),
			Err(err) => contribution.fail(&app.public_id, format!("reevaluate {}", report_id), &err),
		}
	}
	contribution
}

/// Re-evaluates every report of every application.
///
/// Failures are counted per report on the returned [`Aggregate`].
pub async fn reevaluate_all(
	public: Arc<dyn PublicApi>,
	private: Arc<PrivateClient>,
	engine: &AggregationEngine,
	cancel: CancellationToken,
) -> Result<Aggregate<ReevaluatedReport>> {
	let listing = Arc::clone(&public);
	engine
		.run(
			async move { listing.applications().await },
			move |app: Application| {
				let public = Arc::clone(&public);
				let private = Arc::clone(&private);
				async move { reevaluate_application(public.as_ref(), &private, &app).await }
			},
			cancel,
		)
		.await
}

//! Policy waivers, per component and across the whole server.

use std::collections::HashSet;
use std::sync::Arc;

use iq_protocol::{ComponentWaivers, Stage, Waiver};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::aggregate::{Aggregate, AggregationEngine, Contribution};
use crate::error::{Error, Result};
use crate::private::PrivateClient;
use crate::public::PublicApi;

/// Stages searched for waived components, in lookup order.
pub const WAIVER_STAGES: [Stage; 4] = [Stage::Build, Stage::StageRelease, Stage::Release, Stage::Operate];

/// A waiver together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedWaiver {
	pub application_public_id: String,
	pub stage: Stage,
	pub component_hash: String,
	pub owner_id: String,
	pub owner_name: String,
	pub owner_type: String,
	pub waiver: Waiver,
}

impl AggregatedWaiver {
	/// Identity used when comparing results regardless of order.
	pub fn sort_key(&self) -> (&str, Stage, &str, &str) {
		(&self.application_public_id, self.stage, &self.component_hash, &self.waiver.id)
	}
}

fn waiver_path(application: &str, hash: &str) -> String {
	format!("rest/policyWaiver/application/{}/component/{}", application, hash)
}

/// Waivers applying to component `hash` in `application` (public id), grouped by owner.
pub async fn component_waivers(private: &PrivateClient, application: &str, hash: &str) -> Result<ComponentWaivers> {
	private.get_json(&waiver_path(application, hash)).await
}

/// Flattens owner groups into one record per waiver, tagged with the queried triple.
pub fn flatten(application: &str, stage: Stage, hash: &str, waivers: ComponentWaivers) -> Vec<AggregatedWaiver> {
	waivers
		.waivers_by_owner
		.into_iter()
		.flat_map(|owner| {
			let (owner_id, owner_name, owner_type) = (owner.owner_id, owner.owner_name, owner.owner_type);
			owner.waivers.into_iter().map(move |waiver| AggregatedWaiver {
				application_public_id: application.to_string(),
				stage,
				component_hash: hash.to_string(),
				owner_id: owner_id.clone(),
				owner_name: owner_name.clone(),
				owner_type: owner_type.clone(),
				waiver,
			})
		})
		.collect()
}

/// Walks every stage report of one application and collects its waivers.
///
/// With `strict` the first failed fetch is returned; otherwise failures are
/// recorded on the contribution and the walk continues.
async fn collect_application(public: &dyn PublicApi, private: &PrivateClient, application: &str, strict: bool) -> Result<Contribution<AggregatedWaiver>> {
	let mut contribution = Contribution::default();
	let mut seen: HashSet<(String, String)> = HashSet::new();

	for stage in WAIVER_STAGES {
		let report = match public.raw_report(application, stage).await {
			Ok(Some(report)) => report,
			Ok(None) => continue,
			Err(err) if strict => return Err(err),
			Err(err) => {
				contribution.fail(application, format!("report {}", stage), &err);
				continue;
			}
		};

		for hash in report.component_hashes() {
			let owners = match component_waivers(private, application, hash).await {
				Ok(owners) => owners,
				Err(err) if strict => return Err(err),
				Err(err) => {
					contribution.fail(application, format!("waivers {} {}", stage, hash), &err);
					continue;
				}
			};
			for waiver in flatten(application, stage, hash, owners) {
				if seen.insert((waiver.component_hash.clone(), waiver.waiver.id.clone())) {
					contribution.push(waiver);
				}
			}
		}
	}

	debug!(
		target: "iq.endpoint",
		application,
		waivers = contribution.items.len(),
		failures = contribution.failures.len(),
		"collected application waivers"
	);
	Ok(contribution)
}

/// Every waiver reachable from `application`'s stage reports, fetched sequentially.
///
/// Fails on the first failed report or waiver fetch.
pub async fn application_waivers(public: &dyn PublicApi, private: &PrivateClient, application: &str) -> Result<Vec<AggregatedWaiver>> {
	Ok(collect_application(public, private, application, true).await?.items)
}

/// Every waiver in the system, fanned out over all applications with `engine`.
///
/// Listing the applications is the only fatal step; per-application failures
/// follow the engine's failure policy.
pub async fn all_waivers(
	public: Arc<dyn PublicApi>,
	private: Arc<PrivateClient>,
	engine: &AggregationEngine,
	cancel: CancellationToken,
) -> Result<Aggregate<AggregatedWaiver>> {
	let listing = Arc::clone(&public);
	let enumerate = async move {
		let applications = listing.applications().await?;
		Ok::<_, Error>(applications.into_iter().map(|app| app.public_id).collect::<Vec<_>>())
	};

	engine
		.run(
			enumerate,
			move |application: String| {
				let public = Arc::clone(&public);
				let private = Arc::clone(&private);
				async move {
					match collect_application(public.as_ref(), &private, &application, false).await {
						Ok(contribution) => contribution,
						Err(err) => {
							let mut contribution = Contribution::default();
							contribution.fail(&application, "application", &err);
							contribution
						}
					}
				}
			},
			cancel,
		)
		.await
}

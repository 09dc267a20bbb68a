use std::sync::Arc;

use privateiq::{all_waivers, application_waivers};
use serde_json::Value;
use tracing::info;

use crate::context::{CommandContext, InterruptGuard};
use crate::error::Result;
use crate::output::aggregate_json;

pub async fn execute(application: Option<&str>, ctx: &CommandContext) -> Result<Value> {
	if let Some(application) = application {
		let waivers = application_waivers(ctx.public.as_ref(), &ctx.private, application).await?;
		return Ok(serde_json::to_value(waivers)?);
	}

	let interrupt = InterruptGuard::install();
	let mut aggregate = all_waivers(Arc::clone(&ctx.public), Arc::clone(&ctx.private), &ctx.engine, interrupt.token()).await?;
	aggregate.items.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
	info!(
		target: "iqp",
		waivers = aggregate.items.len(),
		applications = aggregate.keys_processed,
		skipped = aggregate.skipped(),
		"collected waivers"
	);
	aggregate_json(&aggregate)
}

#[cfg(test)]
mod tests {
	use iq_protocol::Stage;
	use serde_json::json;

	use super::*;
	use crate::commands::test_support::fake_context;

	fn owner(app: &str, id: &str, hash: &str) -> Value {
		json!([{
			"ownerId": app,
			"ownerName": app,
			"ownerType": "application",
			"waivers": [{
				"id": id,
				"hash": hash,
				"policyId": "p1",
				"ownerId": app,
				"createTime": 0,
				"constraintFactsJson": null,
				"constraintFacts": null,
				"policyName": "Security-High"
			}]
		}])
	}

	#[tokio::test]
	async fn all_applications_sorted_with_skip_count() {
		let (fake, ctx) = fake_context();
		fake.add_application("app-B");
		fake.add_application("app-A");
		fake.add_report("app-A", Stage::Build, &["h1"]);
		fake.add_report("app-B", Stage::Release, &["h2"]);
		fake.add_waivers("app-A", "h1", owner("app-A", "w1", "h1"));
		fake.add_waivers("app-B", "h2", owner("app-B", "w2", "h2"));
		fake.fail_report("app-B", Stage::Operate, "HTTP 500");

		let value = execute(None, &ctx).await.unwrap();
		let ids: Vec<&str> = value["items"]
			.as_array()
			.unwrap()
			.iter()
			.map(|w| w["waiver"]["id"].as_str().unwrap())
			.collect();
		assert_eq!(ids, vec!["w1", "w2"]);
		assert_eq!(value["keysProcessed"], 2);
		assert_eq!(value["skipped"], 1);
	}

	#[tokio::test]
	async fn single_application_is_a_plain_list() {
		let (fake, ctx) = fake_context();
		fake.add_application("app-A");
		fake.add_report("app-A", Stage::Build, &["h1"]);
		fake.add_waivers("app-A", "h1", owner("app-A", "w1", "h1"));

		let value = execute(Some("app-A"), &ctx).await.unwrap();
		assert_eq!(value.as_array().map(Vec::len), Some(1));
		assert_eq!(value[0]["componentHash"], "h1");
	}
}

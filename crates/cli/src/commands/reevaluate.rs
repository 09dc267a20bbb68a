use std::sync::Arc;

use iq_protocol::Stage;
use privateiq::endpoints::reevaluate::{reevaluate_all, reevaluate_report, reevaluate_stage};
use serde_json::{Value, json};

use crate::context::{CommandContext, InterruptGuard};
use crate::error::{CliError, Result};
use crate::output::aggregate_json;

pub async fn execute(application: Option<&str>, stage: Option<Stage>, report: Option<&str>, ctx: &CommandContext) -> Result<Value> {
	match (application, stage, report) {
		(Some(application), _, Some(report)) => {
			reevaluate_report(&ctx.private, application, report).await?;
			Ok(json!({ "ok": true, "application": application, "reportId": report }))
		}
		(Some(application), Some(stage), None) => {
			reevaluate_stage(ctx.public.as_ref(), &ctx.private, application, stage).await?;
			Ok(json!({ "ok": true, "application": application, "stage": stage }))
		}
		(Some(_), None, None) => Err(CliError::Usage("--application needs --stage or --report".into())),
		(None, _, _) => {
			let interrupt = InterruptGuard::install();
			let aggregate = reevaluate_all(Arc::clone(&ctx.public), Arc::clone(&ctx.private), &ctx.engine, interrupt.token()).await?;
			aggregate_json(&aggregate)
		}
	}
}

#[cfg(test)]
mod tests {
	use privateiq::fake::FakeReply;
	use reqwest::{Method, StatusCode};

	use super::*;
	use crate::commands::test_support::fake_context;

	#[tokio::test]
	async fn application_alone_is_a_usage_error() {
		let (_fake, ctx) = fake_context();
		let err = execute(Some("app-A"), None, None, &ctx).await.unwrap_err();
		assert!(matches!(err, CliError::Usage(_)));
	}

	#[tokio::test]
	async fn everything_counts_failed_reports() {
		let (fake, ctx) = fake_context();
		fake.add_application("app-A");
		fake.add_report("app-A", Stage::Build, &["h1"]);
		fake.add_report("app-A", Stage::Release, &["h1"]);
		fake.route(Method::POST, "rest/report/app-A/app-A-build/reevaluatePolicy", FakeReply::status(StatusCode::OK));
		fake.route(
			Method::POST,
			"rest/report/app-A/app-A-release/reevaluatePolicy",
			FakeReply::status(StatusCode::INTERNAL_SERVER_ERROR),
		);

		let value = execute(None, None, None, &ctx).await.unwrap();
		assert_eq!(value["items"].as_array().map(Vec::len), Some(1));
		assert_eq!(value["items"][0]["stage"], "build");
		assert_eq!(value["skipped"], 1);
	}
}

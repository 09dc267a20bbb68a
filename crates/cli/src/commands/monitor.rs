use privateiq::endpoints::monitoring::{
	disable_application_monitoring, disable_organization_monitoring, enable_application_monitoring, enable_organization_monitoring,
	trigger_monitoring,
};
use serde_json::{Value, json};

use crate::cli::{MonitorAction, MonitorTarget};
use crate::context::CommandContext;
use crate::error::{CliError, Result};
use crate::output::done;

fn target_error() -> CliError {
	CliError::Usage("one of --application or --organization is required".into())
}

pub async fn execute(action: MonitorAction, ctx: &CommandContext) -> Result<Value> {
	let public = ctx.public.as_ref();
	match action {
		MonitorAction::Enable { target, stage } => {
			match target {
				MonitorTarget {
					application: Some(application),
					..
				} => enable_application_monitoring(public, &ctx.private, &application, stage).await?,
				MonitorTarget {
					organization: Some(organization),
					..
				} => enable_organization_monitoring(public, &ctx.private, &organization, stage).await?,
				_ => return Err(target_error()),
			}
			Ok(json!({ "ok": true, "action": "monitor enable", "stage": stage }))
		}
		MonitorAction::Disable { target } => {
			match target {
				MonitorTarget {
					application: Some(application),
					..
				} => disable_application_monitoring(public, &ctx.private, &application).await?,
				MonitorTarget {
					organization: Some(organization),
					..
				} => disable_organization_monitoring(public, &ctx.private, &organization).await?,
				_ => return Err(target_error()),
			}
			Ok(done("monitor disable"))
		}
		MonitorAction::Trigger => {
			trigger_monitoring(&ctx.private).await?;
			Ok(done("monitor trigger"))
		}
	}
}

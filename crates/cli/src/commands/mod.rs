mod files;
mod monitor;
mod organizations;
mod reevaluate;
mod settings;
mod waivers;

use serde_json::Value;

use crate::cli::{AutoAppsAction, Commands, LabelsAction, LicenseAction, NoticeAction, OrgAction, PolicyAction, WebhookAction};
use crate::context::CommandContext;
use crate::error::Result;
use crate::output;

/// Runs `command` and prints its JSON result to stdout.
pub async fn dispatch(command: Commands, ctx: &CommandContext) -> Result<()> {
	let value = execute(command, ctx).await?;
	output::print(&value)
}

pub async fn execute(command: Commands, ctx: &CommandContext) -> Result<Value> {
	match command {
		Commands::Waivers { application } => waivers::execute(application.as_deref(), ctx).await,
		Commands::Org {
			action: OrgAction::Delete { id },
		} => organizations::delete(&id, ctx).await,
		Commands::License { action } => match action {
			LicenseAction::Show => settings::license_show(ctx).await,
			LicenseAction::Install { file } => settings::license_install(&file, ctx).await,
		},
		Commands::Policy { action } => match action {
			PolicyAction::Export { output } => files::policy_export(output.as_deref(), ctx).await,
			PolicyAction::Import { file } => files::policy_import(&file, ctx).await,
		},
		Commands::Notice { action } => match action {
			NoticeAction::Enable { message } => settings::notice(Some(&message), ctx).await,
			NoticeAction::Disable => settings::notice(None, ctx).await,
		},
		Commands::AutoApps { action } => match action {
			AutoAppsAction::Enable { organization } => settings::auto_apps(Some(&organization), ctx).await,
			AutoAppsAction::Disable => settings::auto_apps(None, ctx).await,
		},
		Commands::Reevaluate { application, stage, report } => {
			reevaluate::execute(application.as_deref(), stage, report.as_deref(), ctx).await
		}
		Commands::Monitor { action } => monitor::execute(action, ctx).await,
		Commands::Firewall { repository } => organizations::firewall(&repository, ctx).await,
		Commands::Labels { action } => match action {
			LabelsAction::List { organization_id } => organizations::labels(&organization_id, ctx).await,
			LabelsAction::Create {
				label,
				organization_id,
				description,
				color,
			} => organizations::create_label(&organization_id, &label, &description, &color, ctx).await,
		},
		Commands::Webhook {
			action: WebhookAction::Create { url, secret, events },
		} => settings::webhook(&url, &secret, &events, ctx).await,
		Commands::SupportZip { output } => files::support_zip(&output, ctx).await,
		Commands::Evaluate { hashes } => organizations::evaluate(&hashes, ctx).await,
	}
}

use std::path::Path;

use iq_protocol::WEBHOOK_EVENT_TYPES;
use privateiq::endpoints::automatic_apps::{disable_automatic_applications, enable_automatic_applications};
use privateiq::endpoints::license::{install_license, license_info};
use privateiq::endpoints::system_notice::{disable_notice, enable_notice};
use privateiq::endpoints::webhooks::create_webhook;
use serde_json::{Value, json};

use crate::context::CommandContext;
use crate::error::{CliError, Result};
use crate::output::done;

pub async fn license_show(ctx: &CommandContext) -> Result<Value> {
	Ok(serde_json::to_value(license_info(&ctx.private).await?)?)
}

pub async fn license_install(file: &Path, ctx: &CommandContext) -> Result<Value> {
	let content = std::fs::read(file).map_err(|e| CliError::file(file, e))?;
	install_license(&ctx.private, content).await?;
	Ok(done("license install"))
}

/// Enables the notice with `message`, or disables it when `None`.
pub async fn notice(message: Option<&str>, ctx: &CommandContext) -> Result<Value> {
	match message {
		Some(message) => {
			enable_notice(&ctx.private, message).await?;
			Ok(done("notice enable"))
		}
		None => {
			disable_notice(&ctx.private).await?;
			Ok(done("notice disable"))
		}
	}
}

pub async fn auto_apps(organization: Option<&str>, ctx: &CommandContext) -> Result<Value> {
	match organization {
		Some(organization) => {
			enable_automatic_applications(ctx.public.as_ref(), &ctx.private, organization).await?;
			Ok(json!({ "ok": true, "action": "auto-apps enable", "organization": organization }))
		}
		None => {
			disable_automatic_applications(&ctx.private).await?;
			Ok(done("auto-apps disable"))
		}
	}
}

/// Subscribes `url` to `events`, or to every known event type when empty.
pub async fn webhook(url: &str, secret: &str, events: &[String], ctx: &CommandContext) -> Result<Value> {
	let events: Vec<&str> = if events.is_empty() {
		WEBHOOK_EVENT_TYPES.to_vec()
	} else {
		events.iter().map(String::as_str).collect()
	};
	create_webhook(&ctx.private, url, secret, &events).await?;
	Ok(json!({ "ok": true, "action": "webhook create", "eventTypes": events }))
}

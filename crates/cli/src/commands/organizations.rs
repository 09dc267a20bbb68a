use iq_protocol::Component;
use privateiq::endpoints::firewall::firewall_state;
use privateiq::endpoints::labels::{component_labels, create_component_label};
use privateiq::endpoints::organizations::{delete_organization, evaluate_components_with_root_org};
use serde_json::{Value, json};

use crate::context::CommandContext;
use crate::error::Result;

pub async fn delete(organization_id: &str, ctx: &CommandContext) -> Result<Value> {
	delete_organization(&ctx.private, organization_id).await?;
	Ok(json!({ "ok": true, "deleted": organization_id }))
}

pub async fn firewall(repository: &str, ctx: &CommandContext) -> Result<Value> {
	Ok(serde_json::to_value(firewall_state(&ctx.private, repository).await?)?)
}

pub async fn labels(organization_id: &str, ctx: &CommandContext) -> Result<Value> {
	Ok(serde_json::to_value(component_labels(&ctx.private, organization_id).await?)?)
}

pub async fn create_label(organization_id: &str, label: &str, description: &str, color: &str, ctx: &CommandContext) -> Result<Value> {
	let created = create_component_label(&ctx.private, organization_id, label, description, color).await?;
	Ok(serde_json::to_value(created)?)
}

/// Evaluates bare component hashes.
pub async fn evaluate(hashes: &[String], ctx: &CommandContext) -> Result<Value> {
	let components: Vec<Component> = hashes.iter().map(Component::from_hash).collect();
	let evaluation = evaluate_components_with_root_org(ctx.public.as_ref(), &ctx.private, &components).await?;
	Ok(serde_json::to_value(evaluation)?)
}

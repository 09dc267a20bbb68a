use iq_protocol::ComponentLabel;
use tracing::info;

use crate::error::Result;
use crate::private::{PrivateClient, expect_success};

fn labels_path(organization_id: &str) -> String {
	format!("rest/label/organization/{}", organization_id)
}

/// Component labels defined on organization `organization_id`.
pub async fn component_labels(private: &PrivateClient, organization_id: &str) -> Result<Vec<ComponentLabel>> {
	private.get_json(&labels_path(organization_id)).await
}

/// Creates a label and returns it as stored by the server.
pub async fn create_component_label(
	private: &PrivateClient,
	organization_id: &str,
	label: &str,
	description: &str,
	color: &str,
) -> Result<ComponentLabel> {
	let path = labels_path(organization_id);
	let request = ComponentLabel {
		id: None,
		owner_id: Some(organization_id.to_string()),
		label: label.to_string(),
		label_lowercase: None,
		description: (!description.is_empty()).then(|| description.to_string()),
		color: color.to_string(),
	};
	let created: ComponentLabel = expect_success(private.post_json(&path, &request).await?, &path)?.json(&path)?;
	info!(target: "iq.endpoint", organization = organization_id, label, "created component label");
	Ok(created)
}

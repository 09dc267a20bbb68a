//! Component labels (`rest/label/organization/{organizationId}`).

use serde::{Deserialize, Serialize};

/// Label as stored by the server. `id`, `owner_id` and `label_lowercase` are
/// assigned by the server on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentLabel {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub owner_id: Option<String>,
	pub label: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label_lowercase: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub color: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_created_label() {
		let json = r#"{"id":"87068951ec494e79842b0cef4294b371","ownerId":"ROOT_ORGANIZATION_ID","label":"foo","labelLowercase":"foo","description":"bar","color":"orange"}"#;
		let label: ComponentLabel = serde_json::from_str(json).unwrap();
		assert_eq!(label.owner_id.as_deref(), Some("ROOT_ORGANIZATION_ID"));
		assert_eq!(label.color, "orange");
	}
}

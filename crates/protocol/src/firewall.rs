//! Repository firewall report details.

use serde::{Deserialize, Serialize};

use crate::report::ComponentIdentifier;

/// One entry of `GET rest/repositories/{repositoryId}/report/details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallComponent {
	#[serde(rename = "componentIdentifier", default)]
	pub component_id: Option<ComponentIdentifier>,
	#[serde(default)]
	pub component_display_text: String,
	#[serde(default)]
	pub pathname: String,
	#[serde(default)]
	pub hash: String,
	#[serde(default)]
	pub match_state: String,
	#[serde(default)]
	pub quarantined: bool,
	#[serde(default)]
	pub waived: bool,
	#[serde(default)]
	pub threat_level: i32,
	#[serde(default)]
	pub highest_threat_level: bool,
	#[serde(default)]
	pub policy_name: String,
}

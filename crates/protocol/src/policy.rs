//! Policy export/import document (`rest/policy/organization/{id}/export`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything the server exports for an organization's policy configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicySet {
	pub policies: Vec<Policy>,
	pub license_threat_groups: Vec<LicenseThreatGroup>,
	pub license_threat_group_licenses: Vec<LicenseThreatGroupLicense>,
	pub labels: Vec<PolicyLabel>,
	pub policy_tags: Vec<PolicyTag>,
	pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
	pub id: String,
	pub name: String,
	pub owner_id: String,
	pub threat_level: i32,
	pub policy_violation_grandfathering_allowed: bool,
	/// Action per stage id (`build`, `stage-release`, `proxy`, ...), e.g. `"fail"`.
	pub actions: BTreeMap<String, String>,
	pub constraints: Vec<PolicyConstraint>,
	/// Jira/role/user/webhook notification lists, passed through untouched.
	pub notifications: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyConstraint {
	pub id: String,
	pub name: String,
	pub operator: String,
	pub conditions: Vec<PolicyCondition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyCondition {
	pub condition_index: i32,
	pub condition_type_id: String,
	pub operator: String,
	pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LicenseThreatGroup {
	pub id: String,
	pub name: String,
	pub name_lowercase_no_whitespace: String,
	pub owner_id: String,
	pub threat_level: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LicenseThreatGroupLicense {
	pub id: String,
	pub license_id: String,
	pub license_threat_group_id: String,
	pub owner_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyLabel {
	pub id: String,
	pub label: String,
	pub label_lowercase: String,
	pub description: String,
	pub color: String,
	pub owner_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyTag {
	pub id: String,
	pub policy_id: String,
	pub tag_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
	pub id: String,
	pub name: String,
	pub name_lowercase_no_whitespace: String,
	pub description: String,
	pub color: String,
	pub organization_id: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_partial_export() {
		let json = r#"{
  "policies": [{
    "id": "0cac09264717402f93960fd9af89f058",
    "name": "Security-High",
    "ownerId": "ROOT_ORGANIZATION_ID",
    "threatLevel": 9,
    "actions": {"build": "warn", "stage-release": "fail", "proxy": "fail"},
    "constraints": [{
      "id": "c1", "name": "High risk CVSS score", "operator": "AND",
      "conditions": [{"conditionIndex": 0, "conditionTypeId": "SecurityVulnerabilitySeverity", "operator": ">=", "value": "7"}]
    }],
    "notifications": {"jiraNotifications": [], "webhookNotifications": []}
  }],
  "tags": []
}"#;
		let set: PolicySet = serde_json::from_str(json).unwrap();
		assert_eq!(set.policies.len(), 1);
		let policy = &set.policies[0];
		assert_eq!(policy.actions.get("stage-release").map(String::as_str), Some("fail"));
		assert_eq!(policy.constraints[0].conditions[0].value, "7");
		assert!(set.labels.is_empty());
	}
}

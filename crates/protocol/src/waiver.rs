//! Policy waivers as returned by `rest/policyWaiver/...`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `GET rest/policyWaiver/application/{applicationId}/component/{hash}`.
///
/// ```json
/// {"waiversByOwner":[{"ownerId":"agileteam","ownerName":"agileteam","ownerType":"application",
///   "waivers":[{"id":"da78...","hash":"37f4...","policyId":"0cac...","ownerId":"agileteam",
///   "comment":"","createTime":1565707371130,"constraintFactsJson":null,
///   "constraintFacts":null,"policyName":"Security-High"}]}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentWaivers {
	#[serde(default)]
	pub waivers_by_owner: Vec<WaiversByOwner>,
}

/// Waivers grouped under the application or organization that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiversByOwner {
	pub owner_id: String,
	#[serde(default)]
	pub owner_name: String,
	/// `application`, `organization` or `repository`.
	#[serde(default)]
	pub owner_type: String,
	#[serde(default)]
	pub waivers: Vec<Waiver>,
}

/// A single waiver exempting a component from a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waiver {
	pub id: String,
	#[serde(default)]
	pub hash: Option<String>,
	pub policy_id: String,
	pub owner_id: String,
	#[serde(default)]
	pub comment: Option<String>,
	#[serde(default)]
	pub create_time: i64,
	#[serde(default)]
	pub constraint_facts_json: Value,
	#[serde(default)]
	pub constraint_facts: Value,
	#[serde(default)]
	pub policy_name: String,
}

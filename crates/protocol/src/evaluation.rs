//! Component evaluation on the `api/v2/evaluation` surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::report::ComponentIdentifier;

/// Component submitted for evaluation. At least one of the fields must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hash: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub component_identifier: Option<ComponentIdentifier>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub package_url: Option<String>,
}

impl Component {
	pub fn from_hash(hash: impl Into<String>) -> Self {
		Self {
			hash: Some(hash.into()),
			..Default::default()
		}
	}
}

/// Body of `POST api/v2/evaluation/applications/{applicationId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
	pub components: Vec<Component>,
}

/// Response to an evaluation request; results are polled at `results_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSubmission {
	pub result_id: String,
	#[serde(default)]
	pub submitted_date: Option<String>,
	#[serde(default)]
	pub application_id: Option<String>,
	pub results_url: String,
}

/// Finished evaluation. Per-component details are kept as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
	#[serde(default)]
	pub submitted_date: Option<String>,
	#[serde(default)]
	pub evaluation_date: Option<String>,
	#[serde(default)]
	pub application_id: Option<String>,
	#[serde(default)]
	pub results: Vec<Value>,
	#[serde(default)]
	pub is_error: bool,
	#[serde(default)]
	pub error_message: Option<String>,
}

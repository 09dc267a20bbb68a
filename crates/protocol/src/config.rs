//! Server configuration payloads under `rest/config` and `rest/policyMonitoring`.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

pub const WEBHOOK_EVENT_APP_EVALUATION: &str = "Application Evaluation";
pub const WEBHOOK_EVENT_POLICY_MANAGEMENT: &str = "Policy Management";
pub const WEBHOOK_EVENT_VIOLATION_ALERT: &str = "Violation Alert";
pub const WEBHOOK_EVENT_LICENSE_OVERRIDE: &str = "License Override Management";
pub const WEBHOOK_EVENT_SECURITY_OVERRIDE: &str = "Security Vulnerability Override Management";

/// Every webhook event type the server recognizes.
pub const WEBHOOK_EVENT_TYPES: [&str; 5] = [
	WEBHOOK_EVENT_APP_EVALUATION,
	WEBHOOK_EVENT_POLICY_MANAGEMENT,
	WEBHOOK_EVENT_VIOLATION_ALERT,
	WEBHOOK_EVENT_LICENSE_OVERRIDE,
	WEBHOOK_EVENT_SECURITY_OVERRIDE,
];

/// Body of `POST rest/config/webhook`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	pub url: String,
	pub secret_key: String,
	pub event_types: Vec<String>,
}

/// Body of `PUT rest/config/automaticApplications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticApplicationsRequest {
	pub enabled: bool,
	/// Empty when disabling.
	#[serde(default)]
	pub parent_organization_id: String,
}

/// Id of the single system notice the server keeps.
pub const SYSTEM_NOTICE_ID: &str = "system-notice";

/// Body of `PUT rest/config/systemNotice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemNotice {
	pub id: String,
	#[serde(default)]
	pub message: String,
	pub enabled: bool,
}

/// Body of `PUT rest/policyMonitoring/{owner}/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyMonitoringRequest {
	pub stage_type_id: Stage,
}

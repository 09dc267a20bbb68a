//! Applications and organizations from the `api/v2` surface.

use serde::{Deserialize, Serialize};

/// Application as listed by `api/v2/applications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
	/// Internal id (used by most `rest/` endpoints and report listings).
	pub id: String,
	/// Human-assigned identifier (used in report URLs and waiver lookups).
	pub public_id: String,
	pub name: String,
	pub organization_id: String,
	#[serde(default)]
	pub contact_user_name: Option<String>,
}

/// Envelope of `GET api/v2/applications`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationList {
	#[serde(default)]
	pub applications: Vec<Application>,
}

/// Body of `POST api/v2/applications`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
	pub public_id: String,
	pub name: String,
	pub organization_id: String,
}

/// Organization as listed by `api/v2/organizations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub parent_organization_id: Option<String>,
}

/// Envelope of `GET api/v2/organizations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationList {
	#[serde(default)]
	pub organizations: Vec<Organization>,
}

/// Body of `POST api/v2/organizations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganizationRequest {
	pub name: String,
}

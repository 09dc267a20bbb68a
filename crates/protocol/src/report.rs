//! Report listings and raw report data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// One entry of `GET api/v2/reports/applications/{applicationId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInfo {
	pub stage: Stage,
	pub application_id: String,
	#[serde(default)]
	pub evaluation_date: Option<String>,
	pub report_html_url: String,
	#[serde(default)]
	pub report_pdf_url: Option<String>,
	/// Server-relative path of the raw report JSON.
	pub report_data_url: String,
}

impl ReportInfo {
	/// Report id, taken from the last segment of the HTML report link.
	pub fn report_id(&self) -> &str {
		self.report_html_url.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
	}
}

/// Maven-style or ecosystem-specific component coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentIdentifier {
	pub format: String,
	#[serde(default)]
	pub coordinates: BTreeMap<String, String>,
}

/// Component entry of a raw report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReportComponent {
	/// Content hash; `None` for components the server could not fingerprint.
	#[serde(default)]
	pub hash: Option<String>,
	#[serde(default)]
	pub component_identifier: Option<ComponentIdentifier>,
	#[serde(default)]
	pub package_url: Option<String>,
	#[serde(default)]
	pub proprietary: bool,
	#[serde(default)]
	pub match_state: Option<String>,
	#[serde(default)]
	pub pathnames: Vec<String>,
}

/// Body of a report's `reportDataUrl`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
	#[serde(default)]
	pub components: Vec<RawReportComponent>,
}

impl RawReport {
	/// Hashes of every fingerprinted component, in report order.
	pub fn component_hashes(&self) -> impl Iterator<Item = &str> {
		self.components.iter().filter_map(|c| c.hash.as_deref())
	}
}

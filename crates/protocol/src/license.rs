//! Product license information (`rest/product/license`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductLicense {
	pub product_edition: String,
	pub fingerprint: String,
	pub expiry_timestamp: i64,
	pub licensed_users_to_display: i64,
	/// Either a number or a display string such as `"Unlimited"`.
	pub application_limit_to_display: Value,
	pub firewall_users_to_display: i64,
	pub contact_name: String,
	pub contact_company: String,
	pub contact_email: String,
	pub products: Vec<String>,
}

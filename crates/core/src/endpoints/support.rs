use bytes::Bytes;
use reqwest::header::CONTENT_DISPOSITION;
use tracing::info;

use crate::error::{Error, Result};
use crate::private::{PrivateClient, expect_success};

const SUPPORT_PATH: &str = "rest/support?noLimit=true";

/// A generated support archive.
#[derive(Debug, Clone)]
pub struct SupportZip {
	pub file_name: String,
	pub content: Bytes,
}

/// Generates a support zip without size limits.
pub async fn support_zip(private: &PrivateClient) -> Result<SupportZip> {
	let response = expect_success(private.get(SUPPORT_PATH).await?, SUPPORT_PATH)?;
	let disposition = response
		.headers
		.get(CONTENT_DISPOSITION)
		.and_then(|v| v.to_str().ok())
		.ok_or_else(|| Error::NotFound("Content-Disposition header on support zip".into()))?;
	let file_name = disposition_filename(disposition)
		.ok_or_else(|| Error::NotFound(format!("filename in Content-Disposition '{}'", disposition)))?;

	info!(target: "iq.endpoint", file = %file_name, bytes = response.body.len(), "downloaded support zip");
	Ok(SupportZip {
		file_name,
		content: response.body,
	})
}

/// `filename` parameter of a `Content-Disposition` value.
fn disposition_filename(value: &str) -> Option<String> {
	value.split(';').skip(1).find_map(|param| {
		let (name, value) = param.split_once('=')?;
		name.trim()
			.eq_ignore_ascii_case("filename")
			.then(|| value.trim().trim_matches('"').to_string())
			.filter(|file| !file.is_empty())
	})
}

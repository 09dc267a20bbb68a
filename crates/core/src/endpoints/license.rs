//! Product license inspection and installation.

use bytes::Bytes;
use iq_protocol::ProductLicense;
use tracing::info;

use crate::error::Result;
use crate::private::{PrivateClient, expect_success};

const LICENSE_PATH: &str = "rest/product/license";

pub async fn license_info(private: &PrivateClient) -> Result<ProductLicense> {
	private.get_json(LICENSE_PATH).await
}

/// Uploads a license file. `204 No Content` and any other 2xx count as installed.
pub async fn install_license(private: &PrivateClient, license: impl Into<Bytes>) -> Result<()> {
	let license = license.into();
	let size = license.len();
	expect_success(private.post_multipart(LICENSE_PATH, license).await?, LICENSE_PATH)?;
	info!(target: "iq.endpoint", bytes = size, "installed license");
	Ok(())
}

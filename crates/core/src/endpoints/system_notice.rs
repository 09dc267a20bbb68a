use iq_protocol::{SYSTEM_NOTICE_ID, SystemNotice};

use crate::error::Result;
use crate::private::{PrivateClient, expect_success};

const NOTICE_PATH: &str = "rest/config/systemNotice";

/// Shows `message` as a banner to every user.
pub async fn enable_notice(private: &PrivateClient, message: &str) -> Result<()> {
	put(private, message, true).await
}

pub async fn disable_notice(private: &PrivateClient) -> Result<()> {
	put(private, "", false).await
}

async fn put(private: &PrivateClient, message: &str, enabled: bool) -> Result<()> {
	let notice = SystemNotice {
		id: SYSTEM_NOTICE_ID.to_string(),
		message: message.to_string(),
		enabled,
	};
	expect_success(private.put_json(NOTICE_PATH, &notice).await?, NOTICE_PATH)?;
	Ok(())
}

//! Typed wrappers around individual private endpoints.
//!
//! Each function issues one (occasionally a few) private calls through a
//! [`PrivateClient`](crate::PrivateClient) and checks the status itself.

pub mod automatic_apps;
pub mod firewall;
pub mod labels;
pub mod license;
pub mod monitoring;
pub mod organizations;
pub mod policy;
pub mod reevaluate;
pub mod support;
pub mod system_notice;
pub mod webhooks;

/// Id of the organization at the top of every hierarchy.
pub const ROOT_ORGANIZATION_ID: &str = "ROOT_ORGANIZATION_ID";

#[cfg(test)]
pub(crate) mod test_support {
	use std::sync::Arc;

	use crate::fake::FakeServer;
	use crate::private::PrivateClient;
	use crate::session::CSRF_COOKIE;

	pub fn setup() -> (Arc<FakeServer>, PrivateClient) {
		let fake = Arc::new(FakeServer::new());
		fake.set_session_cookies(&[("JSESSIONID", "s"), (CSRF_COOKIE, "tok")]);
		let private = PrivateClient::new(fake.clone());
		(fake, private)
	}
}

// iq-private: session-authenticated access to the private Nexus IQ REST API
//
// The public API authenticates with basic auth; the `rest/` surface the web UI
// uses additionally wants browser-session cookies and a CSRF header. This
// crate bridges the two and adds a bounded fan-out engine for queries that
// span every application on a server.

pub mod aggregate;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod fake;
pub mod private;
pub mod public;
pub mod server;
pub mod session;
pub mod waivers;

pub use aggregate::{Aggregate, AggregationEngine, Contribution, SubFetchFailure};
pub use config::{AggregationConfig, FailurePolicy, ServerConfig, SessionPolicy};
pub use error::{Error, Result};
pub use private::{PrivateClient, expect_deleted, expect_success};
pub use public::{PublicApi, PublicClient};
pub use server::{BaseClient, IqServer, RawResponse, RequestBody, SessionCookie};
pub use session::{AuthenticatedRequest, Session, SessionAdapter, SessionOrigin};
pub use waivers::{AggregatedWaiver, WAIVER_STAGES, all_waivers, application_waivers, component_waivers};

pub use iq_protocol as protocol;

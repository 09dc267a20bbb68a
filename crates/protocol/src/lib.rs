//! Wire types for the Nexus IQ REST APIs.
//!
//! This crate contains the serde-serializable shapes exchanged with an IQ
//! server, both on the documented `api/v2` surface and on the undocumented
//! `rest/` surface reached through a browser session.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization and small accessors
//! * 1:1 with the server: Field names follow the JSON the server emits (camelCase)
//! * Lenient: Optional or rarely populated fields default instead of failing decode
//!
//! Request plumbing and session handling live in `iq-private`.

pub mod application;
pub mod config;
pub mod evaluation;
pub mod firewall;
pub mod label;
pub mod license;
pub mod policy;
pub mod report;
pub mod stage;
pub mod waiver;

pub use application::*;
pub use config::*;
pub use evaluation::*;
pub use firewall::*;
pub use label::*;
pub use license::*;
pub use policy::*;
pub use report::*;
pub use stage::*;
pub use waiver::*;

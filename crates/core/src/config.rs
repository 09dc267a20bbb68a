//! Connection, session and aggregation settings.
//!
//! A [`ServerConfig`] is usually loaded from `<config_dir>/iq-private/config.json`
//! and then overridden from the environment (`IQ_HOST`, `IQ_USERNAME`,
//! `IQ_PASSWORD`) and command-line flags by the caller.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "http://localhost:8070";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin123";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Worker count of the reference waiver aggregation.
pub const DEFAULT_WORKERS: usize = 20;
pub const DEFAULT_QUEUE_CAPACITY: usize = 20;

pub const ENV_HOST: &str = "IQ_HOST";
pub const ENV_USERNAME: &str = "IQ_USERNAME";
pub const ENV_PASSWORD: &str = "IQ_PASSWORD";

/// How the session adapter obtains browser sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SessionPolicy {
	/// Bootstrap a new session before every private call.
	#[default]
	Fresh,
	/// Keep a session for up to `ttl_secs`; a rejected cached session is
	/// replaced and the request re-sent once.
	#[serde(rename_all = "camelCase")]
	Reuse { ttl_secs: u64 },
}

impl SessionPolicy {
	pub fn ttl(&self) -> Option<Duration> {
		match self {
			SessionPolicy::Fresh => None,
			SessionPolicy::Reuse { ttl_secs } => Some(Duration::from_secs(*ttl_secs)),
		}
	}
}

/// What the aggregation engine does when a sub-fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
	/// Record the failure, contribute nothing for it, keep going.
	#[default]
	FailOpen,
	/// Stop at the first failure and return it with the partial tally.
	FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregationConfig {
	pub workers: usize,
	pub queue_capacity: usize,
	pub failure_policy: FailurePolicy,
}

impl Default for AggregationConfig {
	fn default() -> Self {
		Self {
			workers: DEFAULT_WORKERS,
			queue_capacity: DEFAULT_QUEUE_CAPACITY,
			failure_policy: FailurePolicy::FailOpen,
		}
	}
}

impl AggregationConfig {
	pub fn with_workers(mut self, workers: usize) -> Self {
		self.workers = workers;
		self
	}

	pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
		self.failure_policy = policy;
		self
	}

	pub fn validate(&self) -> Result<()> {
		if self.workers == 0 {
			return Err(Error::Config("aggregation.workers must be at least 1".into()));
		}
		if self.queue_capacity == 0 {
			return Err(Error::Config("aggregation.queueCapacity must be at least 1".into()));
		}
		Ok(())
	}
}

/// Everything needed to reach one IQ server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
	pub host: String,
	pub username: String,
	pub password: String,
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
	#[serde(default)]
	pub session: SessionPolicy,
	#[serde(default)]
	pub aggregation: AggregationConfig,
}

fn default_timeout_secs() -> u64 {
	DEFAULT_TIMEOUT_SECS
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self::new(DEFAULT_HOST, DEFAULT_USERNAME, DEFAULT_PASSWORD)
	}
}

impl ServerConfig {
	pub fn new(host: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			host: host.into(),
			username: username.into(),
			password: password.into(),
			timeout_secs: DEFAULT_TIMEOUT_SECS,
			session: SessionPolicy::default(),
			aggregation: AggregationConfig::default(),
		}
	}

	/// Default location of the config file, if a config directory exists.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("iq-private").join("config.json"))
	}

	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)
			.map_err(|e| Error::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;
		let config: Self =
			serde_json::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config file {}: {}", path.display(), e)))?;
		config.validate()?;
		Ok(config)
	}

	/// Loads `path` if it exists, otherwise returns the defaults.
	pub fn load_or_default(path: &Path) -> Result<Self> {
		if path.exists() { Self::load(path) } else { Ok(Self::default()) }
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		let json = serde_json::to_string_pretty(self)?;
		fs::write(path, json)?;
		Ok(())
	}

	/// Applies `IQ_HOST`, `IQ_USERNAME` and `IQ_PASSWORD` when set.
	pub fn apply_env(&mut self) {
		self.apply_overrides(std::env::var(ENV_HOST).ok(), std::env::var(ENV_USERNAME).ok(), std::env::var(ENV_PASSWORD).ok());
	}

	pub fn apply_overrides(&mut self, host: Option<String>, username: Option<String>, password: Option<String>) {
		if let Some(host) = host {
			self.host = host;
		}
		if let Some(username) = username {
			self.username = username;
		}
		if let Some(password) = password {
			self.password = password;
		}
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	pub fn validate(&self) -> Result<()> {
		let url = url::Url::parse(&self.host).map_err(|source| Error::InvalidUrl {
			url: self.host.clone(),
			source,
		})?;
		if !matches!(url.scheme(), "http" | "https") {
			return Err(Error::Config(format!("host must be an http(s) URL, got '{}'", self.host)));
		}
		if self.timeout_secs == 0 {
			return Err(Error::Config("timeoutSecs must be at least 1".into()));
		}
		self.aggregation.validate()
	}
}

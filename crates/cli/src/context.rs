use std::sync::Arc;

use privateiq::{AggregationEngine, BaseClient, FailurePolicy, IqServer, PrivateClient, PublicApi, PublicClient, ServerConfig};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::GlobalArgs;
use crate::error::Result;

/// Builds the effective configuration: defaults, then the config file, then
/// `IQ_*` environment variables, then flags.
pub fn resolve_config(args: &GlobalArgs) -> Result<ServerConfig> {
	let mut config = match (&args.config, ServerConfig::default_path()) {
		(Some(path), _) => ServerConfig::load(path)?,
		(None, Some(path)) => ServerConfig::load_or_default(&path)?,
		(None, None) => ServerConfig::default(),
	};
	config.apply_env();
	apply_flags(&mut config, args);
	config.validate()?;
	debug!(target: "iqp", host = %config.host, username = %config.username, "resolved configuration");
	Ok(config)
}

fn apply_flags(config: &mut ServerConfig, args: &GlobalArgs) {
	config.apply_overrides(args.host.clone(), args.username.clone(), args.password.clone());
	if let Some(workers) = args.workers {
		config.aggregation.workers = workers;
	}
	if args.fail_fast {
		config.aggregation.failure_policy = FailurePolicy::FailFast;
	}
}

/// Clients shared by every command.
pub struct CommandContext {
	pub config: ServerConfig,
	pub public: Arc<dyn PublicApi>,
	pub private: Arc<PrivateClient>,
	pub engine: AggregationEngine,
}

impl CommandContext {
	pub fn new(config: ServerConfig) -> Result<Self> {
		let base: Arc<dyn BaseClient> = Arc::new(IqServer::from_config(&config)?);
		let public: Arc<dyn PublicApi> = Arc::new(PublicClient::from_config(Arc::clone(&base), &config));
		Ok(Self::with_clients(config, base, public))
	}

	/// Context over caller-supplied clients, e.g. an in-memory fake.
	pub fn with_clients(config: ServerConfig, base: Arc<dyn BaseClient>, public: Arc<dyn PublicApi>) -> Self {
		let private = Arc::new(PrivateClient::with_policy(base, config.session));
		let engine = AggregationEngine::new(config.aggregation);
		Self {
			config,
			public,
			private,
			engine,
		}
	}
}

/// Cancels its token on Ctrl-C until dropped.
pub struct InterruptGuard {
	token: CancellationToken,
	watcher: JoinHandle<()>,
}

impl InterruptGuard {
	pub fn install() -> Self {
		let token = CancellationToken::new();
		let trigger = token.clone();
		let watcher = tokio::spawn(async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				warn!(target: "iqp", "interrupted, cancelling outstanding fetches");
				trigger.cancel();
			}
		});
		Self { token, watcher }
	}

	pub fn token(&self) -> CancellationToken {
		self.token.clone()
	}
}

impl Drop for InterruptGuard {
	fn drop(&mut self) {
		self.watcher.abort();
	}
}

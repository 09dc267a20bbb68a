use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use iq_protocol::Stage;

#[derive(Parser, Debug)]
#[command(name = "iqp")]
#[command(about = "Call private Nexus IQ endpoints through a browser session")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(flatten)]
	pub global: GlobalArgs,

	#[command(subcommand)]
	pub command: Commands,
}

/// Connection settings layered over the config file and environment.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
	/// Config file (defaults to <config dir>/iq-private/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// IQ server URL, e.g. http://localhost:8070
	#[arg(long, global = true)]
	pub host: Option<String>,

	#[arg(short, long, global = true)]
	pub username: Option<String>,

	#[arg(short, long, global = true)]
	pub password: Option<String>,

	/// Concurrent workers for commands that span every application
	#[arg(long, global = true)]
	pub workers: Option<usize>,

	/// Stop an aggregation at the first failed sub-fetch
	#[arg(long, global = true)]
	pub fail_fast: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// List waivers for one application or, by default, every application
	Waivers {
		/// Application public id; fails on the first error when given
		#[arg(long)]
		application: Option<String>,
	},

	/// Manage organizations
	#[command(alias = "organization")]
	Org {
		#[command(subcommand)]
		action: OrgAction,
	},

	/// Show or install the product license
	License {
		#[command(subcommand)]
		action: LicenseAction,
	},

	/// Export or import the root organization's policies
	Policy {
		#[command(subcommand)]
		action: PolicyAction,
	},

	/// Set or clear the system notice banner
	Notice {
		#[command(subcommand)]
		action: NoticeAction,
	},

	/// Toggle automatic application creation
	AutoApps {
		#[command(subcommand)]
		action: AutoAppsAction,
	},

	/// Re-evaluate policy for a report, an application stage, or everything
	Reevaluate {
		/// Application public id (all applications when omitted)
		#[arg(long)]
		application: Option<String>,
		/// Stage to re-evaluate (requires --application)
		#[arg(long, requires = "application", conflicts_with = "report")]
		stage: Option<Stage>,
		/// Report id to re-evaluate (requires --application)
		#[arg(long, requires = "application")]
		report: Option<String>,
	},

	/// Continuous monitoring
	#[command(alias = "monitoring")]
	Monitor {
		#[command(subcommand)]
		action: MonitorAction,
	},

	/// Firewall quarantine state of a repository
	Firewall { repository: String },

	/// Component labels of an organization
	Labels {
		#[command(subcommand)]
		action: LabelsAction,
	},

	/// Webhook configuration
	Webhook {
		#[command(subcommand)]
		action: WebhookAction,
	},

	/// Download a support zip without size limits
	SupportZip {
		/// Directory the archive is written to
		#[arg(short, long, default_value = ".")]
		output: PathBuf,
	},

	/// Evaluate component hashes under a throwaway organization
	Evaluate {
		#[arg(required = true)]
		hashes: Vec<String>,
	},
}

#[derive(Subcommand, Debug)]
pub enum OrgAction {
	/// Delete an organization by internal id
	Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum LicenseAction {
	/// Show the installed license
	Show,
	/// Install a license file
	Install { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum PolicyAction {
	/// Export policies as JSON (stdout unless --output)
	Export {
		#[arg(short, long)]
		output: Option<PathBuf>,
	},
	/// Import a policy export file
	Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum NoticeAction {
	Enable { message: String },
	Disable,
}

#[derive(Subcommand, Debug)]
pub enum AutoAppsAction {
	/// Enable, creating applications under the named organization
	Enable { organization: String },
	Disable,
}

/// Application or organization a monitoring command applies to.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct MonitorTarget {
	/// Application public id
	#[arg(long)]
	pub application: Option<String>,
	/// Organization name
	#[arg(long)]
	pub organization: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum MonitorAction {
	Enable {
		#[command(flatten)]
		target: MonitorTarget,
		#[arg(long, default_value = "build")]
		stage: Stage,
	},
	Disable {
		#[command(flatten)]
		target: MonitorTarget,
	},
	/// Run the monitoring task now
	Trigger,
}

#[derive(Subcommand, Debug)]
pub enum LabelsAction {
	List {
		#[arg(default_value = privateiq::endpoints::ROOT_ORGANIZATION_ID)]
		organization_id: String,
	},
	Create {
		label: String,
		#[arg(long, default_value = privateiq::endpoints::ROOT_ORGANIZATION_ID)]
		organization_id: String,
		#[arg(long, default_value = "")]
		description: String,
		#[arg(long, default_value = "light-blue")]
		color: String,
	},
}

#[derive(Subcommand, Debug)]
pub enum WebhookAction {
	Create {
		url: String,
		#[arg(long)]
		secret: String,
		/// Event type to subscribe to; repeatable (all types when omitted)
		#[arg(long = "event")]
		events: Vec<String>,
	},
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	fn parse(args: &[&str]) -> Cli {
		Cli::try_parse_from(std::iter::once("iqp").chain(args.iter().copied())).unwrap()
	}

	#[test]
	fn command_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn global_flags_parse_after_subcommand() {
		let cli = parse(&["waivers", "--host", "http://iq:8070", "-u", "ci", "--workers", "4", "--fail-fast", "-vv"]);
		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.global.host.as_deref(), Some("http://iq:8070"));
		assert_eq!(cli.global.username.as_deref(), Some("ci"));
		assert_eq!(cli.global.workers, Some(4));
		assert!(cli.global.fail_fast);
		assert!(matches!(cli.command, Commands::Waivers { application: None }));
	}

	#[test]
	fn stage_uses_server_spelling() {
		let cli = parse(&["reevaluate", "--application", "app-A", "--stage", "stage-release"]);
		match cli.command {
			Commands::Reevaluate { application, stage, report } => {
				assert_eq!(application.as_deref(), Some("app-A"));
				assert_eq!(stage, Some(Stage::StageRelease));
				assert!(report.is_none());
			}
			other => panic!("unexpected command: {:?}", other),
		}
		assert!(Cli::try_parse_from(["iqp", "reevaluate", "--application", "a", "--stage", "staging"]).is_err());
	}

	#[test]
	fn reevaluate_stage_requires_application() {
		assert!(Cli::try_parse_from(["iqp", "reevaluate", "--stage", "build"]).is_err());
	}

	#[test]
	fn monitor_target_is_exclusive() {
		let cli = parse(&["monitor", "enable", "--organization", "Sandbox"]);
		match cli.command {
			Commands::Monitor {
				action: MonitorAction::Enable { target, stage },
			} => {
				assert_eq!(target.organization.as_deref(), Some("Sandbox"));
				assert_eq!(stage, Stage::Build);
			}
			other => panic!("unexpected command: {:?}", other),
		}
		assert!(Cli::try_parse_from(["iqp", "monitor", "disable"]).is_err());
		assert!(Cli::try_parse_from(["iqp", "monitor", "disable", "--application", "a", "--organization", "o"]).is_err());
	}

	#[test]
	fn webhook_events_repeat() {
		let cli = parse(&["webhook", "create", "http://hook", "--secret", "s", "--event", "Violation Alert", "--event", "Policy Management"]);
		match cli.command {
			Commands::Webhook {
				action: WebhookAction::Create { events, .. },
			} => assert_eq!(events, vec!["Violation Alert", "Policy Management"]),
			other => panic!("unexpected command: {:?}", other),
		}
	}

	#[test]
	fn evaluate_requires_hashes() {
		assert!(Cli::try_parse_from(["iqp", "evaluate"]).is_err());
		assert!(matches!(parse(&["evaluate", "h1", "h2"]).command, Commands::Evaluate { hashes } if hashes.len() == 2));
	}
}

//! Policy evaluation stages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stage of the software lifecycle a report or policy action applies to.
///
/// Serialized exactly as the server spells the stage id (`stage-release`,
/// not `stageRelease`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
	Develop,
	Source,
	Build,
	StageRelease,
	Release,
	Operate,
}

impl Stage {
	/// Stage id as used in URLs and request bodies.
	pub fn as_str(self) -> &'static str {
		match self {
			Stage::Develop => "develop",
			Stage::Source => "source",
			Stage::Build => "build",
			Stage::StageRelease => "stage-release",
			Stage::Release => "release",
			Stage::Operate => "operate",
		}
	}
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when a string is not a known stage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStage(pub String);

impl fmt::Display for UnknownStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unknown stage '{}'", self.0)
	}
}

impl std::error::Error for UnknownStage {}

impl FromStr for Stage {
	type Err = UnknownStage;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"develop" => Ok(Stage::Develop),
			"source" => Ok(Stage::Source),
			"build" => Ok(Stage::Build),
			"stage-release" => Ok(Stage::StageRelease),
			"release" => Ok(Stage::Release),
			"operate" => Ok(Stage::Operate),
			other => Err(UnknownStage(other.to_string())),
		}
	}
}

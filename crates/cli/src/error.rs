use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Iq(#[from] privateiq::Error),

	#[error("I/O error on {path}: {source}")]
	File {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("{0}")]
	Usage(String),
}

impl CliError {
	pub fn file(path: &std::path::Path, source: std::io::Error) -> Self {
		CliError::File {
			path: path.display().to_string(),
			source,
		}
	}
}

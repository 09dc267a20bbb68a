use std::path::{Path, PathBuf};

use privateiq::endpoints::policy::{export_policies, import_policies};
use privateiq::endpoints::support::support_zip as download_support_zip;
use serde_json::{Value, json};
use tracing::info;

use crate::context::CommandContext;
use crate::error::{CliError, Result};
use crate::output::done;

const FALLBACK_SUPPORT_NAME: &str = "support.zip";

/// Exports policies, writing them to `output` when given.
pub async fn policy_export(output: Option<&Path>, ctx: &CommandContext) -> Result<Value> {
	let policies = serde_json::to_value(export_policies(&ctx.private).await?)?;
	let Some(output) = output else {
		return Ok(policies);
	};
	let document = serde_json::to_vec_pretty(&policies)?;
	std::fs::write(output, &document).map_err(|e| CliError::file(output, e))?;
	info!(target: "iqp", file = %output.display(), "wrote policy export");
	Ok(json!({ "ok": true, "action": "policy export", "file": output.display().to_string() }))
}

pub async fn policy_import(file: &Path, ctx: &CommandContext) -> Result<Value> {
	let document = std::fs::read(file).map_err(|e| CliError::file(file, e))?;
	import_policies(&ctx.private, document).await?;
	Ok(done("policy import"))
}

/// Downloads a support zip into `directory` under the server-provided name.
pub async fn support_zip(directory: &Path, ctx: &CommandContext) -> Result<Value> {
	let zip = download_support_zip(&ctx.private).await?;
	let target = archive_path(directory, &zip.file_name);
	std::fs::write(&target, &zip.content).map_err(|e| CliError::file(&target, e))?;
	Ok(json!({
		"ok": true,
		"file": target.display().to_string(),
		"bytes": zip.content.len(),
	}))
}

/// `directory` joined with the final component of `file_name`.
fn archive_path(directory: &Path, file_name: &str) -> PathBuf {
	let name = Path::new(file_name)
		.file_name()
		.and_then(|n| n.to_str())
		.unwrap_or(FALLBACK_SUPPORT_NAME);
	directory.join(name)
}

use std::io::Write;

use privateiq::Aggregate;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::Result;

/// JSON document for an aggregation: the items plus what was skipped.
pub fn aggregate_json<T: Serialize>(aggregate: &Aggregate<T>) -> Result<Value> {
	Ok(json!({
		"items": serde_json::to_value(&aggregate.items)?,
		"keysProcessed": aggregate.keys_processed,
		"skipped": aggregate.skipped(),
		"failures": aggregate.failures.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
	}))
}

/// Status document for commands that only change server state.
pub fn done(action: &str) -> Value {
	json!({ "ok": true, "action": action })
}

/// Pretty-prints `value` to stdout.
pub fn print(value: &Value) -> Result<()> {
	let mut stdout = std::io::stdout().lock();
	serde_json::to_writer_pretty(&mut stdout, value)?;
	writeln!(stdout)?;
	Ok(())
}

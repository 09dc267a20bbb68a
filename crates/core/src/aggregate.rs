//! Bounded fan-out/fan-in over many top-level keys.
//!
//! A run enumerates its keys once, feeds them through a bounded channel to a
//! fixed pool of workers and merges each key's whole [`Contribution`] into a
//! single accumulator. Result order is unspecified.
//!
//! Sub-fetch failures inside a key are handled by [`FailurePolicy`]: fail-open
//! records them on the returned [`Aggregate`] and keeps going, fail-fast stops
//! feeding keys, aborts in-flight work and returns
//! [`Error::AggregationAborted`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{AggregationConfig, FailurePolicy};
use crate::error::{Error, Result};

/// One sub-fetch that contributed nothing because it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubFetchFailure {
	/// Top-level key being processed.
	pub key: String,
	/// What was being fetched, e.g. `report build`.
	pub scope: String,
	pub message: String,
}

impl fmt::Display for SubFetchFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({}): {}", self.key, self.scope, self.message)
	}
}

/// Everything one key produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution<T> {
	pub items: Vec<T>,
	pub failures: Vec<SubFetchFailure>,
}

impl<T> Default for Contribution<T> {
	fn default() -> Self {
		Self {
			items: Vec::new(),
			failures: Vec::new(),
		}
	}
}

impl<T> Contribution<T> {
	pub fn push(&mut self, item: T) {
		self.items.push(item);
	}

	pub fn fail(&mut self, key: &str, scope: impl Into<String>, error: &Error) {
		self.failures.push(SubFetchFailure {
			key: key.to_string(),
			scope: scope.into(),
			message: error.to_string(),
		});
	}

	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Merged result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate<T> {
	pub items: Vec<T>,
	/// Sub-fetches absorbed under fail-open.
	pub failures: Vec<SubFetchFailure>,
	pub keys_processed: usize,
}

impl<T> Aggregate<T> {
	/// Number of sub-fetches lost to failures.
	pub fn skipped(&self) -> usize {
		self.failures.len()
	}

	pub fn is_complete(&self) -> bool {
		self.failures.is_empty()
	}
}

struct Accumulator<T> {
	items: Vec<T>,
	failures: Vec<SubFetchFailure>,
	keys_processed: usize,
}

impl<T> Accumulator<T> {
	fn merge(&mut self, contribution: Contribution<T>) {
		for failure in &contribution.failures {
			warn!(target: "iq.aggregate", key = %failure.key, scope = %failure.scope, error = %failure.message, "sub-fetch failed");
		}
		self.items.extend(contribution.items);
		self.failures.extend(contribution.failures);
		self.keys_processed += 1;
	}
}

/// Runs aggregations with a fixed worker count and queue capacity.
#[derive(Debug, Clone)]
pub struct AggregationEngine {
	config: AggregationConfig,
}

impl Default for AggregationEngine {
	fn default() -> Self {
		Self::new(AggregationConfig::default())
	}
}

impl AggregationEngine {
	pub fn new(config: AggregationConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &AggregationConfig {
		&self.config
	}

	/// Enumerates keys with `enumerate`, then runs `fetch` once per key on the
	/// worker pool.
	///
	/// # Errors
	///
	/// - the enumerate error, unchanged
	/// - [`Error::Cancelled`] if `cancel` fires before the run completes
	/// - [`Error::AggregationAborted`] on the first failed sub-fetch under fail-fast
	/// - [`Error::Worker`] if a worker task panics
	/// - [`Error::Config`] for a zero worker count or queue capacity
	pub async fn run<K, T, E, F, Fut>(&self, enumerate: E, fetch: F, cancel: CancellationToken) -> Result<Aggregate<T>>
	where
		K: Send + 'static,
		T: Send + 'static,
		E: Future<Output = Result<Vec<K>>>,
		F: Fn(K) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Contribution<T>> + Send + 'static,
	{
		self.config.validate()?;
		let keys = tokio::select! {
			biased;
			_ = cancel.cancelled() => {
				info!(target: "iq.aggregate", "aggregation cancelled before enumeration finished");
				return Err(Error::Cancelled { completed: 0 });
			}
			keys = enumerate => keys?,
		};
		let total = keys.len();
		let fail_fast = self.config.failure_policy == FailurePolicy::FailFast;
		info!(
			target: "iq.aggregate",
			keys = total,
			workers = self.config.workers,
			fail_fast,
			"starting aggregation"
		);

		let (tx, rx) = mpsc::channel::<K>(self.config.queue_capacity);
		let rx = Arc::new(tokio::sync::Mutex::new(rx));
		let accumulator = Arc::new(Mutex::new(Accumulator {
			items: Vec::new(),
			failures: Vec::new(),
			keys_processed: 0,
		}));
		// Fires on external cancellation or on a fail-fast abort.
		let stop = cancel.child_token();
		let fetch = Arc::new(fetch);

		let mut workers = JoinSet::new();
		for worker in 0..self.config.workers {
			let rx = Arc::clone(&rx);
			let accumulator = Arc::clone(&accumulator);
			let stop = stop.clone();
			let fetch = Arc::clone(&fetch);
			workers.spawn(async move {
				loop {
					let key = tokio::select! {
						biased;
						_ = stop.cancelled() => break,
						key = async { rx.lock().await.recv().await } => match key {
							Some(key) => key,
							None => break,
						},
					};
					let contribution = tokio::select! {
						biased;
						_ = stop.cancelled() => break,
						contribution = fetch(key) => contribution,
					};
					let clean = contribution.is_clean();
					accumulator.lock().merge(contribution);
					if fail_fast && !clean {
						stop.cancel();
						break;
					}
				}
				debug!(target: "iq.aggregate", worker, "worker exiting");
			});
		}
		drop(rx);

		let feeder_stop = stop.clone();
		let feeder = tokio::spawn(async move {
			for key in keys {
				tokio::select! {
					biased;
					_ = feeder_stop.cancelled() => break,
					sent = tx.send(key) => if sent.is_err() {
						break;
					},
				}
			}
		});

		let mut worker_error = None;
		while let Some(joined) = workers.join_next().await {
			if let Err(err) = joined {
				stop.cancel();
				worker_error.get_or_insert_with(|| err.to_string());
			}
		}
		if let Err(err) = feeder.await {
			worker_error.get_or_insert_with(|| err.to_string());
		}

		let Accumulator {
			items,
			failures,
			keys_processed,
		} = std::mem::replace(
			&mut *accumulator.lock(),
			Accumulator {
				items: Vec::new(),
				failures: Vec::new(),
				keys_processed: 0,
			},
		);

		if let Some(message) = worker_error {
			return Err(Error::Worker(message));
		}
		if cancel.is_cancelled() {
			info!(target: "iq.aggregate", completed = keys_processed, total, "aggregation cancelled");
			return Err(Error::Cancelled { completed: keys_processed });
		}
		if fail_fast && !failures.is_empty() {
			return Err(Error::AggregationAborted {
				collected: items.len(),
				failures,
			});
		}

		info!(
			target: "iq.aggregate",
			keys = keys_processed,
			items = items.len(),
			skipped = failures.len(),
			"aggregation complete"
		);
		Ok(Aggregate {
			items,
			failures,
			keys_processed,
		})
	}
}

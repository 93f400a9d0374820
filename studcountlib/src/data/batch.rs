//! Batch stud counting over many top-level parts.
//!
//! One `ProcessedCache` is shared by every part of the run, so primitives
//! are read once per batch instead of once per part. A part whose reference
//! chain cannot be resolved is recorded as failed and the batch moves on.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::source::library::LibraryConfig;
use crate::source::parts::{list_parts_to_process, PartFilter};
use crate::source::resolver::FileResolver;
use crate::Result;

use super::aggregator::{Aggregator, VisitCounter};
use super::stats::StudCounts;

/// Default number of parts between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 500;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Log progress every N parts (0 disables progress logging)
    pub progress_interval: usize,
    /// Keep a per-location visit counter
    pub track_visits: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            track_visits: false,
        }
    }
}

impl BatchOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the progress logging interval.
    pub fn progress_interval(mut self, parts: usize) -> Self {
        self.progress_interval = parts;
        self
    }

    /// Enable or disable visit tracking.
    pub fn track_visits(mut self, enabled: bool) -> Self {
        self.track_visits = enabled;
        self
    }
}

/// Result for one top-level part: counts or the recorded error, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartOutcome {
    Counts(StudCounts),
    Failed { processing_errors: Vec<String> },
}

impl PartOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        PartOutcome::Failed {
            processing_errors: vec![message.into()],
        }
    }

    pub fn counts(&self) -> Option<&StudCounts> {
        match self {
            PartOutcome::Counts(counts) => Some(counts),
            PartOutcome::Failed { .. } => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            PartOutcome::Counts(_) => &[],
            PartOutcome::Failed { processing_errors } => processing_errors,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, PartOutcome::Counts(_))
    }
}

/// Outcome of a batch run, keyed by part id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    /// Part id (lowercase file stem) to outcome
    pub parts: BTreeMap<String, PartOutcome>,
    /// Number of distinct files in the shared cache at the end of the run
    pub cached_files: usize,
    /// Visit counts, when tracking was enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visits: Option<VisitCounter>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, part_id: &str) -> Option<&PartOutcome> {
        self.parts.get(part_id)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Parts that were counted successfully.
    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &StudCounts)> {
        self.parts
            .iter()
            .filter_map(|(id, outcome)| outcome.counts().map(|c| (id.as_str(), c)))
    }

    /// Parts that failed, with their errors.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.parts
            .iter()
            .filter(|(_, outcome)| !outcome.is_ok())
            .map(|(id, outcome)| (id.as_str(), outcome.errors()))
    }

    pub fn error_count(&self) -> usize {
        self.failed().count()
    }

    /// Sum over all successfully counted parts.
    pub fn total(&self) -> StudCounts {
        self.succeeded().map(|(_, c)| *c).sum()
    }

    /// The externally consumed mapping: part id to counts or
    /// `{"processing_errors": [...]}`.
    pub fn to_json_map(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&self.parts)
    }
}

/// Part id of a top-level file: its lowercase file stem.
pub fn part_id(location: &Path) -> String {
    location
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Count studs for every part in `parts`, sharing one cache.
///
/// Per-part failures are recorded in the result and never abort the run.
pub fn run_batch(
    parts: &[PathBuf],
    resolver: &FileResolver,
    options: &BatchOptions,
) -> BatchResult {
    let mut aggregator = Aggregator::new(resolver);
    if options.track_visits {
        aggregator = aggregator.with_visit_tracking();
    }

    let mut result = BatchResult::new();
    let run_start = Instant::now();
    let mut interval_start = run_start;

    for (idx, location) in parts.iter().enumerate() {
        let id = part_id(location);

        let outcome = match aggregator.aggregate(location) {
            Ok(counts) => PartOutcome::Counts(counts),
            Err(e) => {
                warn!(part = %id, error = %e, "Failed to count part");
                PartOutcome::failed(e.to_string())
            }
        };
        result.parts.insert(id, outcome);

        let processed = idx + 1;
        if options.progress_interval > 0 && processed % options.progress_interval == 0 {
            let now = Instant::now();
            info!(
                processed,
                seconds = (now - interval_start).as_secs_f64(),
                "Processed parts"
            );
            interval_start = now;
        }
    }

    let (cache, visits) = aggregator.into_parts();
    result.cached_files = cache.len();
    result.visits = visits;

    info!(
        parts = result.len(),
        errors = result.error_count(),
        cached_files = result.cached_files,
        seconds = run_start.elapsed().as_secs_f64(),
        "Batch finished"
    );

    result
}

/// Index a library, list its parts and count them all.
///
/// Fails only on setup problems (missing roots, duplicate official files,
/// bad filter); per-part problems end up in the result.
pub fn count_library(
    config: &LibraryConfig,
    filter: &PartFilter,
    options: &BatchOptions,
) -> Result<BatchResult> {
    let resolver = config.build_resolver()?;
    let parts = list_parts_to_process(&config.part_dirs(), filter)?;
    info!(parts = parts.len(), "Number of parts to process");
    Ok(run_batch(&parts, &resolver, options))
}

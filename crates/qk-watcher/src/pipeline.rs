//! One regeneration pass: scan, expand, render, guarded write.

use std::fmt;
use std::time::{Duration, Instant};

use qk_codegen::{SelfEditGuard, WriteOutcome, commit, render};
use qk_core::{Fingerprint, expand_hierarchy};
use qk_scanner::Scanner;
use tracing::{error, info, warn};

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The artifact was rewritten.
    Written,
    /// The rendered document matched the last write; nothing was touched.
    Unchanged,
    /// The pass could not complete; the guard was left unchanged.
    Failed(String),
}

impl PassOutcome {
    /// Returns `true` for [`PassOutcome::Failed`].
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for PassOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Written => f.write_str("written"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Summary of one completed pass.
///
/// Sent to the session's report channel after every pass. Bundler
/// integrations reload when [`artifact_changed`](Self::artifact_changed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// How the pass ended.
    pub outcome: PassOutcome,
    /// Entries in the rendered document, parents included.
    pub pattern_count: usize,
    /// Candidate files read and parsed.
    pub files_scanned: usize,
    /// Files skipped because they could not be read or parsed.
    pub file_errors: usize,
    /// Fingerprint of the rendered document, if rendering happened.
    pub fingerprint: Option<Fingerprint>,
    /// Wall-clock time of the pass.
    pub elapsed: Duration,
}

impl PassReport {
    /// Returns `true` if the artifact on disk was rewritten.
    #[inline]
    #[must_use]
    pub fn artifact_changed(&self) -> bool {
        self.outcome == PassOutcome::Written
    }

    fn failed(reason: String, elapsed: Duration) -> Self {
        Self {
            outcome: PassOutcome::Failed(reason),
            pattern_count: 0,
            files_scanned: 0,
            file_errors: 0,
            fingerprint: None,
            elapsed,
        }
    }
}

/// Runs one full regeneration pass.
///
/// The candidate set is re-resolved, every candidate is scanned, the
/// patterns are closed under their parents, and the document is written if
/// `guard` allows it. Never returns an error: failures become
/// [`PassOutcome::Failed`] and leave `guard` untouched so the next pass
/// retries.
pub async fn run_pass(scanner: &Scanner, guard: &mut SelfEditGuard) -> PassReport {
    let start = Instant::now();

    let scan = match scanner.scan().await {
        Ok(scan) => scan,
        Err(scan_error) => {
            error!(error = %scan_error, "Scan failed");
            return PassReport::failed(scan_error.to_string(), start.elapsed());
        }
    };
    for file_error in &scan.errors {
        warn!(error = %file_error, "Skipped file");
    }

    let patterns = expand_hierarchy(scan.patterns);
    let rendered = render(&patterns, &scanner.config().module_name);

    let outcome = match commit(guard, &rendered).await {
        Ok(WriteOutcome::Written) => PassOutcome::Written,
        Ok(WriteOutcome::Skipped) => PassOutcome::Unchanged,
        Err(write_error) => {
            error!(error = %write_error, "Failed to write query keys");
            PassOutcome::Failed(write_error.to_string())
        }
    };

    let elapsed = start.elapsed();
    let report = PassReport {
        outcome,
        pattern_count: rendered.pattern_count,
        files_scanned: scan.files_scanned,
        file_errors: scan.errors.len(),
        fingerprint: Some(rendered.fingerprint),
        elapsed,
    };

    match report.outcome {
        PassOutcome::Written => info!(
            patterns = report.pattern_count,
            files = report.files_scanned,
            elapsed_ms = elapsed.as_millis(),
            path = %guard.output_path(),
            "Regenerated query keys"
        ),
        PassOutcome::Unchanged => info!(
            patterns = report.pattern_count,
            files = report.files_scanned,
            elapsed_ms = elapsed.as_millis(),
            "Query keys up to date"
        ),
        PassOutcome::Failed(_) => {}
    }

    report
}

/// Runs a single pass against the artifact currently on disk.
///
/// The guard is seeded from the existing file, so an up-to-date artifact is
/// left alone.
pub async fn generate_once(scanner: &Scanner) -> PassReport {
    let config = scanner.config();
    let mut guard = SelfEditGuard::new(&config.root, &config.output_path);
    guard.seed_from_disk().await;
    run_pass(scanner, &mut guard).await
}

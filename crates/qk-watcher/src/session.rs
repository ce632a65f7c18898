//! The watch session driver.
//!
//! A [`WatchSession`] owns everything mutable about one watch: the
//! [`SelfEditGuard`], the [`Scheduler`] and the event source. It runs on a
//! single task; the only concurrency is between waiting for events and
//! polling the pass in flight, so at most one pass runs at a time.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use futures_util::future::OptionFuture;
use qk_codegen::SelfEditGuard;
use qk_core::ResolvedConfig;
use qk_scanner::Scanner;
use tokio::sync::mpsc;
use tokio::time::Sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::error::WatchError;
use crate::events::{FileEventBatch, WatchSignal};
use crate::filter::CandidateFilter;
use crate::pipeline::{PassOutcome, PassReport, run_pass};
use crate::scheduler::{Directive, Scheduler};
use crate::source::EventSource;
use crate::watcher::FileWatcher;

/// Delay between a completed pass and the rerun it owes.
pub const RERUN_COOLDOWN: Duration = Duration::from_millis(100);

type PassFuture = Pin<Box<dyn Future<Output = (PassReport, SelfEditGuard)> + Send>>;

/// Counters returned when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Passes completed, the initial one included.
    pub passes: usize,
    /// Passes that rewrote the artifact.
    pub writes: usize,
    /// Passes that failed.
    pub failures: usize,
}

/// One watch session over one project.
///
/// The session starts with an unconditional pass, then regenerates whenever
/// a candidate file changes or the artifact is edited by someone else.
/// Events for our own writes and for paths outside the candidate set are
/// dropped. Events arriving during a pass collapse into a single rerun.
///
/// The session stops when its stop token is cancelled or the event source is
/// exhausted. A pass already running is allowed to finish; a pending rerun is
/// dropped.
///
/// # Examples
///
/// ```no_run
/// use qk_scanner::Scanner;
/// use qk_watcher::{WatchSession, WatchSignal};
/// use tokio::sync::mpsc;
///
/// # async fn example(scanner: Scanner) {
/// let (events, source) = mpsc::channel::<WatchSignal>(16);
/// let session = WatchSession::new(scanner, source);
/// let stop = session.stop_token();
/// let handle = tokio::spawn(session.run());
/// // ... send events ...
/// stop.cancel();
/// let summary = handle.await.ok();
/// # drop((events, summary));
/// # }
/// ```
pub struct WatchSession<S> {
    scanner: Scanner,
    guard: SelfEditGuard,
    source: S,
    scheduler: Scheduler,
    reports: Option<mpsc::Sender<PassReport>>,
    stop: CancellationToken,
    cooldown: Duration,
    summary: SessionSummary,
}

impl<S> std::fmt::Debug for WatchSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSession")
            .field("root", &self.scanner.config().root)
            .field("state", &self.scheduler.state())
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl<S: EventSource> WatchSession<S> {
    /// Creates a session that has not written anything yet.
    #[must_use]
    pub fn new(scanner: Scanner, source: S) -> Self {
        let config = Arc::clone(scanner.config());
        Self {
            guard: SelfEditGuard::new(&config.root, &config.output_path),
            scanner,
            source,
            scheduler: Scheduler::new(),
            reports: None,
            stop: CancellationToken::new(),
            cooldown: RERUN_COOLDOWN,
            summary: SessionSummary::default(),
        }
    }

    /// Sends a [`PassReport`] to `reports` after every pass.
    #[must_use]
    pub fn with_reports(mut self, reports: mpsc::Sender<PassReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    /// Uses `stop` instead of a private token.
    #[must_use]
    pub fn with_stop_token(mut self, stop: CancellationToken) -> Self {
        self.stop = stop;
        self
    }

    /// Overrides [`RERUN_COOLDOWN`].
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// A token that stops the session when cancelled.
    #[must_use]
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Runs the session to completion.
    pub async fn run(mut self) -> SessionSummary {
        let mut in_flight: Option<PassFuture> = None;
        let mut cooldown: Option<Pin<Box<Sleep>>> = None;
        let mut deferred: Vec<Utf8PathBuf> = Vec::new();
        let mut accepting = true;

        info!(
            root = %self.scanner.config().root,
            output = %self.guard.output_path(),
            "Watch session started"
        );
        if self.scheduler.start() == Directive::StartPass {
            in_flight = Some(self.start_pass());
        }

        loop {
            if !accepting && in_flight.is_none() {
                break;
            }

            tokio::select! {
                biased;

                () = self.stop.cancelled(), if accepting => {
                    info!("Stop requested, no longer accepting events");
                    accepting = false;
                    cooldown = None;
                    self.scheduler.cancel_pending();
                }

                signal = self.source.next_signal(), if accepting => match signal {
                    Some(WatchSignal::Batch(batch)) => {
                        let busy = in_flight.is_some();
                        if self.is_relevant(&batch, busy, &mut deferred).await
                            && self.scheduler.on_event() == Directive::StartPass
                        {
                            in_flight = Some(self.start_pass());
                        }
                    }
                    Some(WatchSignal::Error(message)) => {
                        error!(error = %message, "File watcher error");
                    }
                    None => {
                        debug!("Event source closed");
                        accepting = false;
                        cooldown = None;
                        self.scheduler.cancel_pending();
                    }
                },

                Some(()) = OptionFuture::from(cooldown.as_mut()) => {
                    cooldown = None;
                    in_flight = Some(self.start_pass());
                }

                Some((report, guard)) = OptionFuture::from(in_flight.as_mut()) => {
                    in_flight = None;
                    self.guard = guard;
                    self.record(report).await;

                    if accepting && self.recheck_deferred(&mut deferred).await {
                        self.scheduler.on_event();
                    }
                    deferred.clear();

                    if self.scheduler.on_pass_complete() == Directive::StartAfterCooldown && accepting {
                        trace!(cooldown_ms = self.cooldown.as_millis(), "Rerun scheduled");
                        cooldown = Some(Box::pin(tokio::time::sleep(self.cooldown)));
                    }
                }

                else => break,
            }
        }

        let summary = self.summary;
        info!(
            passes = summary.passes,
            writes = summary.writes,
            failures = summary.failures,
            "Watch session stopped"
        );
        summary
    }

    fn start_pass(&self) -> PassFuture {
        let scanner = self.scanner.clone();
        let mut guard = self.guard.clone();
        Box::pin(async move {
            let report = run_pass(&scanner, &mut guard).await;
            (report, guard)
        })
    }

    /// Decides whether `batch` warrants a pass.
    ///
    /// Artifact events seen while a pass is running are parked in `deferred`:
    /// the guard only learns about that pass's write once it completes.
    async fn is_relevant(&mut self, batch: &FileEventBatch, busy: bool, deferred: &mut Vec<Utf8PathBuf>) -> bool {
        let mut relevant = false;
        for event in batch {
            let path = event.path.as_path();
            if self.guard.is_output(path) {
                if busy {
                    trace!(path = %path, "Deferring artifact event until the pass completes");
                    if !deferred.iter().any(|parked| parked == path) {
                        deferred.push(path.to_owned());
                    }
                } else if self.guard.check_echo(path).await {
                    debug!(path = %path, "Ignoring our own write");
                } else {
                    info!(path = %path, kind = %event.kind, "Artifact changed externally, regenerating");
                    self.guard.invalidate();
                    relevant = true;
                }
            } else if self.scanner.matcher().is_scannable(path) {
                debug!(path = %path, kind = %event.kind, "Source changed");
                relevant = true;
            } else {
                trace!(path = %path, "Ignoring event outside the candidate set");
            }
        }
        relevant
    }

    async fn recheck_deferred(&mut self, deferred: &mut Vec<Utf8PathBuf>) -> bool {
        let mut external = false;
        for path in deferred.drain(..) {
            if self.guard.check_echo(&path).await {
                debug!(path = %path, "Ignoring our own write");
            } else {
                info!(path = %path, "Artifact changed externally, regenerating");
                self.guard.invalidate();
                external = true;
            }
        }
        external
    }

    async fn record(&mut self, report: PassReport) {
        self.summary.passes += 1;
        match report.outcome {
            PassOutcome::Written => self.summary.writes += 1,
            PassOutcome::Failed(_) => self.summary.failures += 1,
            PassOutcome::Unchanged => {}
        }

        let delivered = match &self.reports {
            Some(reports) => reports.send(report).await.is_ok(),
            None => true,
        };
        if !delivered {
            debug!("Report receiver dropped");
            self.reports = None;
        }
    }
}

/// Watches `config.root` until `stop` is cancelled.
///
/// Builds the scanner, starts a [`FileWatcher`] filtered to candidates and
/// the artifact, and runs a [`WatchSession`] over it.
///
/// # Errors
///
/// Returns an error if the globs do not compile or the watcher cannot start.
/// Nothing after startup is fatal.
pub async fn watch(
    config: Arc<ResolvedConfig>,
    stop: CancellationToken,
    reports: Option<mpsc::Sender<PassReport>>,
) -> Result<SessionSummary, WatchError> {
    let scanner = Scanner::new(Arc::clone(&config))?;
    let filter = CandidateFilter::new(Arc::clone(scanner.matcher()));
    let watcher = FileWatcher::new(&config.root, &config.watch, filter).await?;

    let mut session = WatchSession::new(scanner, watcher).with_stop_token(stop);
    if let Some(reports) = reports {
        session = session.with_reports(reports);
    }
    Ok(session.run().await)
}

//! File watching and regeneration scheduling for qk-gen.
//!
//! This crate turns file-system churn into a serialized sequence of
//! regeneration passes.
//!
//! # Overview
//!
//! - [`FileWatcher`] bridges `notify` with `notify-debouncer-mini` to tokio
//!   and emits [`WatchSignal`]s
//! - [`Scheduler`] is the `Idle` / `Scanning` / `PendingRerun` state machine
//! - [`run_pass`] runs one scan, expand, render and guarded write
//! - [`WatchSession`] ties them together: an unconditional initial pass,
//!   echo suppression, candidate filtering and coalesced reruns
//!
//! Any [`EventSource`] can drive a session, so tests feed it from an
//! `mpsc::Receiver<WatchSignal>` instead of the real file system.
//!
//! # Architecture
//!
//! ```text
//! FileWatcher ──► WatchSignal ──► WatchSession
//!  (notify,                         │
//!   debouncer,                      ├── SelfEditGuard (echo check)
//!   CandidateFilter)                ├── FileMatcher   (candidate check)
//!                                   ├── Scheduler     (serialize, coalesce)
//!                                   └── run_pass ──► Scanner ──► expand_hierarchy
//!                                                              ──► render ──► commit
//! ```
//!
//! # Crate Dependencies
//!
//! ```text
//! qk-cli ──► qk-watcher ──► qk-scanner ──► qk-ts-parser ──► qk-core
//!                      └──► qk-codegen ──────────────────────►
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use qk_core::Config;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(Config::default().resolve()?);
//! let stop = CancellationToken::new();
//! let summary = qk_watcher::watch(config, stop, None).await?;
//! println!("{} passes, {} writes", summary.passes, summary.writes);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod events;
mod filter;
mod pipeline;
mod scheduler;
mod session;
mod source;
mod watcher;

pub use error::WatchError;
pub use events::{FileEvent, FileEventBatch, FileEventKind, WatchSignal};
pub use filter::{CandidateFilter, FileFilter};
pub use pipeline::{PassOutcome, PassReport, generate_once, run_pass};
pub use scheduler::{Directive, Scheduler, SchedulerState};
pub use session::{RERUN_COOLDOWN, SessionSummary, WatchSession, watch};
pub use source::EventSource;
pub use watcher::FileWatcher;

//! The regeneration scheduler.
//!
//! A pure state machine: it never touches the file system or the clock. The
//! session feeds it relevant events and pass completions and acts on the
//! returned [`Directive`].
//!
//! ```text
//!            event                     event
//!   Idle ──────────────► Scanning ──────────────► PendingRerun ◄─┐
//!    ▲                      │  ▲                      │    │     │ event
//!    │   pass complete      │  │  pass complete       │    └─────┘
//!    └──────────────────────┘  └──────────────────────┘
//!                                (rerun after cooldown)
//! ```
//!
//! However many events arrive during a pass, at most one rerun follows it.

use std::fmt;

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// No pass is running.
    #[default]
    Idle,
    /// A pass is running (or waiting out the rerun cooldown).
    Scanning,
    /// A pass is running and at least one event arrived during it.
    PendingRerun,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::PendingRerun => "pending-rerun",
        })
    }
}

/// What the session should do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Start a pass now.
    StartPass,
    /// Start a pass once the rerun cooldown has elapsed.
    StartAfterCooldown,
    /// The event was folded into the pending rerun.
    Coalesced,
    /// Nothing to do.
    Rest,
}

/// The `Idle` / `Scanning` / `PendingRerun` state machine.
///
/// # Examples
///
/// ```
/// use qk_watcher::{Directive, Scheduler, SchedulerState};
///
/// let mut scheduler = Scheduler::new();
/// assert_eq!(scheduler.on_event(), Directive::StartPass);
/// assert_eq!(scheduler.on_event(), Directive::Coalesced);
/// assert_eq!(scheduler.on_event(), Directive::Coalesced);
/// assert_eq!(scheduler.state(), SchedulerState::PendingRerun);
///
/// assert_eq!(scheduler.on_pass_complete(), Directive::StartAfterCooldown);
/// assert_eq!(scheduler.on_pass_complete(), Directive::Rest);
/// assert_eq!(scheduler.state(), SchedulerState::Idle);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    state: SchedulerState,
}

impl Scheduler {
    /// Creates an idle scheduler.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Returns `true` while a pass is running or pending.
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state != SchedulerState::Idle
    }

    /// Begins the unconditional initial pass.
    ///
    /// Only valid from `Idle`; otherwise behaves like [`on_event`](Self::on_event).
    pub fn start(&mut self) -> Directive {
        self.on_event()
    }

    /// Records a relevant event.
    pub fn on_event(&mut self) -> Directive {
        let (next, directive) = match self.state {
            SchedulerState::Idle => (SchedulerState::Scanning, Directive::StartPass),
            SchedulerState::Scanning | SchedulerState::PendingRerun => {
                (SchedulerState::PendingRerun, Directive::Coalesced)
            }
        };
        self.transition(next);
        directive
    }

    /// Records the end of the running pass.
    pub fn on_pass_complete(&mut self) -> Directive {
        let (next, directive) = match self.state {
            SchedulerState::PendingRerun => (SchedulerState::Scanning, Directive::StartAfterCooldown),
            SchedulerState::Scanning | SchedulerState::Idle => (SchedulerState::Idle, Directive::Rest),
        };
        self.transition(next);
        directive
    }

    /// Drops a pending rerun without affecting the running pass.
    ///
    /// Used when the session stops accepting events.
    pub fn cancel_pending(&mut self) {
        if self.state == SchedulerState::PendingRerun {
            self.transition(SchedulerState::Scanning);
        }
    }

    fn transition(&mut self, next: SchedulerState) {
        if next != self.state {
            tracing::trace!(from = %self.state, to = %next, "Scheduler transition");
            self.state = next;
        }
    }
}

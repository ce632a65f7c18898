//! The self-edit guard.
//!
//! The generator's own writes show up as file-system events for the output
//! path. [`SelfEditGuard`] remembers the fingerprint of the last write so that
//! those events can be discarded and unchanged documents are not rewritten.

use camino::{Utf8Path, Utf8PathBuf};
use qk_core::Fingerprint;
use qk_core::config::absolutize;

/// Write arbitration for one artifact.
///
/// Owned by a single session; nothing here is process-global, so independent
/// sessions can coexist.
#[derive(Debug, Clone)]
pub struct SelfEditGuard {
    root: Utf8PathBuf,
    output_path: Utf8PathBuf,
    last: Option<Fingerprint>,
}

impl SelfEditGuard {
    /// Creates a guard with no recorded write.
    ///
    /// `output_path` is resolved against `root` if relative.
    #[must_use]
    pub fn new(root: &Utf8Path, output_path: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            output_path: absolutize(root, output_path),
            last: None,
        }
    }

    /// Returns `true` if `fingerprint` differs from the last recorded write.
    ///
    /// Does not change state; call [`record_write`](Self::record_write) once
    /// the write succeeded.
    #[must_use]
    pub fn should_write(&self, fingerprint: &Fingerprint) -> bool {
        self.last.as_ref() != Some(fingerprint)
    }

    /// Records a successful write.
    pub fn record_write(&mut self, fingerprint: Fingerprint) {
        tracing::trace!(fingerprint = fingerprint.short(), "Recorded artifact write");
        self.last = Some(fingerprint);
    }

    /// Forgets the last write, forcing the next pass to write.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Fingerprint of the last recorded write.
    #[inline]
    #[must_use]
    pub fn last_fingerprint(&self) -> Option<&Fingerprint> {
        self.last.as_ref()
    }

    /// The absolute artifact path.
    #[inline]
    #[must_use]
    pub fn output_path(&self) -> &Utf8Path {
        &self.output_path
    }

    /// Returns `true` if `changed_path` names the artifact.
    #[must_use]
    pub fn is_output(&self, changed_path: &Utf8Path) -> bool {
        absolutize(&self.root, changed_path) == self.output_path
    }

    /// Returns `true` if a change to `changed_path` is an echo of our own
    /// write.
    ///
    /// `current` is the fingerprint of the file as it is on disk now, or
    /// `None` if it could not be read; an unreadable file is never an echo.
    #[must_use]
    pub fn is_self_echo(&self, changed_path: &Utf8Path, current: Option<&Fingerprint>) -> bool {
        self.is_output(changed_path) && current.is_some() && current == self.last.as_ref()
    }

    /// Reads the artifact and decides whether `changed_path` is an echo.
    pub async fn check_echo(&self, changed_path: &Utf8Path) -> bool {
        if !self.is_output(changed_path) || self.last.is_none() {
            return false;
        }
        let current = read_fingerprint(&self.output_path).await;
        let echo = self.is_self_echo(changed_path, current.as_ref());
        tracing::trace!(path = %changed_path, echo, "Checked artifact event");
        echo
    }

    /// Seeds the guard with the artifact currently on disk, if any.
    ///
    /// Used for one-shot generation so an up-to-date artifact is left alone.
    pub async fn seed_from_disk(&mut self) {
        self.last = read_fingerprint(&self.output_path).await;
    }
}

/// Fingerprints the file at `path`, or returns `None` if it cannot be read.
pub async fn read_fingerprint(path: &Utf8Path) -> Option<Fingerprint> {
    tokio::fs::read(path)
        .await
        .ok()
        .map(|bytes| Fingerprint::of_bytes(&bytes))
}

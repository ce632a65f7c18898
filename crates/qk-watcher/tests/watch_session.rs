//! Watch sessions driven by simulated event sources.

use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use qk_core::{Config, DEFAULT_MODULE_NAME, Fingerprint};
use qk_scanner::Scanner;
use qk_watcher::{FileEvent, PassOutcome, PassReport, SessionSummary, WatchSession, WatchSignal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const REPORT_TIMEOUT: Duration = Duration::from_secs(10);
const QUIET_PERIOD: Duration = Duration::from_millis(300);

struct Harness {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
    output: Utf8PathBuf,
    events: mpsc::Sender<WatchSignal>,
    source: Option<mpsc::Receiver<WatchSignal>>,
    scanner: Scanner,
}

impl Harness {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        for (path, body) in files {
            write_file(&root.join(path), body);
        }

        let mut config = Config::default();
        config.scan.root = root;
        let resolved = Arc::new(config.resolve().expect("resolve"));
        let scanner = Scanner::new(Arc::clone(&resolved)).expect("scanner");
        let (events, source) = mpsc::channel(64);

        Self {
            _dir: dir,
            root: resolved.root.clone(),
            output: resolved.output_path.clone(),
            events,
            source: Some(source),
            scanner,
        }
    }

    fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// Queues an event before or after the session starts.
    async fn send(&self, event: FileEvent) {
        self.events.send(event.into()).await.expect("session receiving");
    }

    fn start(&mut self) -> Running {
        let source = self.source.take().expect("session already started");
        let (reports_tx, reports) = mpsc::channel(16);
        let session = WatchSession::new(self.scanner.clone(), source)
            .with_reports(reports_tx)
            .with_cooldown(Duration::from_millis(10));
        let stop = session.stop_token();
        Running {
            reports,
            stop,
            handle: tokio::spawn(session.run()),
        }
    }

    fn artifact(&self) -> String {
        std::fs::read_to_string(&self.output).expect("read artifact")
    }
}

struct Running {
    reports: mpsc::Receiver<PassReport>,
    stop: CancellationToken,
    handle: JoinHandle<SessionSummary>,
}

impl Running {
    async fn next_report(&mut self) -> PassReport {
        tokio::time::timeout(REPORT_TIMEOUT, self.reports.recv())
            .await
            .expect("timed out waiting for a pass")
            .expect("session ended early")
    }

    async fn assert_quiet(&mut self) {
        let extra = tokio::time::timeout(QUIET_PERIOD, self.reports.recv()).await;
        assert!(extra.is_err(), "unexpected pass: {extra:?}");
    }

    async fn finish(self) -> SessionSummary {
        self.stop.cancel();
        tokio::time::timeout(REPORT_TIMEOUT, self.handle)
            .await
            .expect("session did not stop")
            .expect("session panicked")
    }
}

fn write_file(path: &Utf8Path, body: &str) {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, body).expect("write");
}

fn entry(pattern: &str) -> String {
    format!("    \"{pattern}\": true;")
}

#[tokio::test]
async fn test_initial_pass_writes_pattern_and_parents() {
    let mut harness = Harness::new(&[("src/user.ts", "export const key = qk('users/$userId');")]);
    let mut running = harness.start();

    let report = running.next_report().await;
    assert_eq!(report.outcome, PassOutcome::Written);
    assert!(report.artifact_changed());
    assert_eq!(report.pattern_count, 2);

    let artifact = harness.artifact();
    assert!(artifact.contains(&entry("users")));
    assert!(artifact.contains(&entry("users/$userId")));

    let summary = running.finish().await;
    assert_eq!(summary, SessionSummary { passes: 1, writes: 1, failures: 0 });
}

#[tokio::test]
async fn test_shared_parent_is_emitted_once() {
    let mut harness = Harness::new(&[
        ("src/list.ts", "qk('posts');"),
        ("src/detail.tsx", "qk('posts/$id');"),
    ]);
    let mut running = harness.start();

    let report = running.next_report().await;
    assert_eq!(report.pattern_count, 2);
    assert_eq!(harness.artifact().matches(&entry("posts")).count(), 1);
    assert!(harness.artifact().contains(&entry("posts/$id")));

    running.finish().await;
}

#[tokio::test]
async fn test_empty_project_writes_placeholder() {
    let mut harness = Harness::new(&[("src/plain.ts", "export const nothing = 1;")]);
    let mut running = harness.start();

    let report = running.next_report().await;
    let expected = qk_codegen::template::empty(DEFAULT_MODULE_NAME);
    assert_eq!(report.outcome, PassOutcome::Written);
    assert_eq!(report.pattern_count, 0);
    assert_eq!(harness.artifact(), expected);
    assert_eq!(report.fingerprint, Some(Fingerprint::of(&expected)));

    running.finish().await;
}

#[tokio::test]
async fn test_unchanged_rescan_does_not_write() {
    let mut harness = Harness::new(&[("src/a.ts", "qk('posts');")]);
    let mut running = harness.start();
    let first = running.next_report().await;

    harness.send(FileEvent::changed(harness.path("src/a.ts"))).await;
    let second = running.next_report().await;
    assert_eq!(second.outcome, PassOutcome::Unchanged);
    assert_eq!(second.fingerprint, first.fingerprint);

    let summary = running.finish().await;
    assert_eq!(summary, SessionSummary { passes: 2, writes: 1, failures: 0 });
}

#[tokio::test]
async fn test_deleted_file_drops_its_patterns() {
    let mut harness = Harness::new(&[
        ("src/posts.ts", "qk('posts');"),
        ("src/comments.ts", "qk('comments/$commentId');"),
    ]);
    let mut running = harness.start();
    running.next_report().await;
    assert!(harness.artifact().contains(&entry("comments")));

    std::fs::remove_file(harness.path("src/comments.ts")).expect("remove");
    harness.send(FileEvent::removed(harness.path("src/comments.ts"))).await;

    let report = running.next_report().await;
    assert_eq!(report.outcome, PassOutcome::Written);
    assert_eq!(report.pattern_count, 1);
    assert!(!harness.artifact().contains("comments"));

    running.finish().await;
}

#[tokio::test]
async fn test_added_file_contributes_patterns() {
    let mut harness = Harness::new(&[("src/posts.ts", "qk('posts');")]);
    let mut running = harness.start();
    running.next_report().await;

    write_file(&harness.path("src/feature/users.tsx"), "qk('users');");
    harness.send(FileEvent::added(harness.path("src/feature/users.tsx"))).await;

    let report = running.next_report().await;
    assert_eq!(report.outcome, PassOutcome::Written);
    assert!(harness.artifact().contains(&entry("users")));

    running.finish().await;
}

#[tokio::test]
async fn test_self_echo_is_ignored() {
    let mut harness = Harness::new(&[("src/a.ts", "qk('posts');")]);
    let mut running = harness.start();
    running.next_report().await;

    harness.send(FileEvent::changed(harness.output.clone())).await;
    running.assert_quiet().await;

    let summary = running.finish().await;
    assert_eq!(summary.passes, 1);
}

#[tokio::test]
async fn test_echo_arriving_during_pass_is_ignored() {
    let mut harness = Harness::new(&[("src/a.ts", "qk('posts');")]);
    // Queued before the session starts, so it is seen while the initial pass runs.
    harness.send(FileEvent::changed(harness.output.clone())).await;
    let mut running = harness.start();

    running.next_report().await;
    running.assert_quiet().await;

    let summary = running.finish().await;
    assert_eq!(summary.passes, 1);
}

#[tokio::test]
async fn test_external_edit_restores_artifact() {
    let mut harness = Harness::new(&[("src/a.ts", "qk('posts/$id');")]);
    let mut running = harness.start();
    running.next_report().await;
    let original = harness.artifact();

    std::fs::write(&harness.output, "// hand edited").expect("edit");
    harness.send(FileEvent::changed(harness.output.clone())).await;

    let report = running.next_report().await;
    assert_eq!(report.outcome, PassOutcome::Written);
    assert_eq!(harness.artifact(), original);

    running.finish().await;
}

#[tokio::test]
async fn test_deleted_artifact_is_regenerated() {
    let mut harness = Harness::new(&[("src/a.ts", "qk('posts');")]);
    let mut running = harness.start();
    running.next_report().await;

    std::fs::remove_file(&harness.output).expect("remove");
    harness.send(FileEvent::removed(harness.output.clone())).await;

    let report = running.next_report().await;
    assert_eq!(report.outcome, PassOutcome::Written);
    assert!(harness.output.exists());

    running.finish().await;
}

#[tokio::test]
async fn test_events_during_pass_coalesce_into_one_rerun() {
    let mut harness = Harness::new(&[("src/a.ts", "qk('posts');"), ("src/b.ts", "qk('users');")]);
    // Three events queued before the session starts all land while the
    // initial pass is scanning.
    harness.send(FileEvent::changed(harness.path("src/a.ts"))).await;
    harness.send(FileEvent::changed(harness.path("src/b.ts"))).await;
    harness.send(FileEvent::changed(harness.path("src/a.ts"))).await;
    let mut running = harness.start();

    assert_eq!(running.next_report().await.outcome, PassOutcome::Written);
    assert_eq!(running.next_report().await.outcome, PassOutcome::Unchanged);
    running.assert_quiet().await;

    let summary = running.finish().await;
    assert_eq!(summary.passes, 2);
}

#[tokio::test]
async fn test_events_outside_candidates_are_ignored() {
    let mut harness = Harness::new(&[("src/a.ts", "qk('posts');")]);
    let mut running = harness.start();
    running.next_report().await;

    harness.send(FileEvent::changed(harness.path("README.md"))).await;
    harness.send(FileEvent::changed(harness.path("node_modules/pkg/index.ts"))).await;
    harness.send(FileEvent::changed(harness.path("vite.config.ts"))).await;
    running.assert_quiet().await;

    let summary = running.finish().await;
    assert_eq!(summary.passes, 1);
}

#[tokio::test]
async fn test_events_for_gitignored_and_hidden_files_are_ignored() {
    let mut harness = Harness::new(&[
        (".gitignore", "dist/\n"),
        ("src/a.ts", "qk('posts');"),
        ("dist/bundle.js", "qk('built');"),
        (".storybook/preview.ts", "qk('story');"),
    ]);
    let mut running = harness.start();
    let report = running.next_report().await;
    assert_eq!(report.files_scanned, 1);

    harness.send(FileEvent::changed(harness.path("dist/bundle.js"))).await;
    harness.send(FileEvent::changed(harness.path(".storybook/preview.ts"))).await;
    running.assert_quiet().await;

    let summary = running.finish().await;
    assert_eq!(summary.passes, 1);
}

#[tokio::test]
async fn test_watcher_error_does_not_stop_session() {
    let mut harness = Harness::new(&[("src/a.ts", "qk('posts');")]);
    let mut running = harness.start();
    running.next_report().await;

    harness
        .events
        .send(WatchSignal::Error("inotify queue overflow".to_owned()))
        .await
        .expect("send");
    harness.send(FileEvent::changed(harness.path("src/a.ts"))).await;

    assert_eq!(running.next_report().await.outcome, PassOutcome::Unchanged);
    running.finish().await;
}

#[tokio::test]
async fn test_stop_lets_in_flight_pass_finish() {
    let mut harness = Harness::new(&[("src/a.ts", "qk('posts');")]);
    harness.send(FileEvent::changed(harness.path("src/a.ts"))).await;
    let mut running = harness.start();
    running.stop.cancel();

    let report = running.next_report().await;
    assert_eq!(report.outcome, PassOutcome::Written);

    let summary = running.finish().await;
    assert_eq!(summary.passes, 1);
}

#[tokio::test]
async fn test_closed_source_ends_session() {
    let mut harness = Harness::new(&[("src/a.ts", "qk('posts');")]);
    let mut running = harness.start();
    running.next_report().await;

    let Harness { events, .. } = harness;
    drop(events);

    let summary = tokio::time::timeout(REPORT_TIMEOUT, running.handle)
        .await
        .expect("session did not stop")
        .expect("session panicked");
    assert_eq!(summary.passes, 1);
}

#[tokio::test]
async fn test_write_failure_is_retried_on_next_event() {
    let mut harness = Harness::new(&[("src/a.ts", "qk('posts');")]);
    // A regular file where the output directory should be.
    std::fs::write(harness.path(".generated"), "").expect("block");
    let mut running = harness.start();

    let failed = running.next_report().await;
    assert!(failed.outcome.is_failure());
    assert!(!failed.artifact_changed());

    std::fs::remove_file(harness.path(".generated")).expect("unblock");
    harness.send(FileEvent::changed(harness.path("src/a.ts"))).await;

    let retried = running.next_report().await;
    assert_eq!(retried.outcome, PassOutcome::Written);
    assert!(harness.artifact().contains(&entry("posts")));

    let summary = running.finish().await;
    assert_eq!(summary, SessionSummary { passes: 2, writes: 1, failures: 1 });
}

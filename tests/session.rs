//! Session lifecycle tests against a scripted transport.
//!
//! No network: `ScriptedTransport` answers every payload from a fixed
//! script and records what it was asked to send. Artifacts land in a
//! per-test temp directory.

use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use swiftconvert::session::{FAILURE_MESSAGE, PROCESSING_MESSAGE};
use swiftconvert::{
    ArtifactDownloader, CandidateFile, Completion, Format, Operation, OperationError,
    OperationSession, OperationTransport, RequestPayload, ResultArtifact, RotationAngle,
    SessionState, SwiftConvertError,
};
use tokio_test::{assert_err, assert_ok};

// ── Test helpers ─────────────────────────────────────────────────────────────

#[derive(Clone)]
enum Script {
    Body(&'static [u8]),
    Fail(OperationError),
    /// Answer with `body` after `delay`.
    Slow(Duration, &'static [u8]),
}

struct ScriptedTransport {
    script: Script,
    seen: Mutex<Vec<RequestPayload>>,
}

impl ScriptedTransport {
    fn new(script: Script) -> Self {
        Self {
            script,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<RequestPayload> {
        self.seen.lock().unwrap().clone()
    }
}

impl OperationTransport for ScriptedTransport {
    fn execute<'a>(
        &'a self,
        payload: &'a RequestPayload,
    ) -> BoxFuture<'a, Result<ResultArtifact, OperationError>> {
        self.seen.lock().unwrap().push(payload.clone());
        let script = self.script.clone();
        Box::pin(async move {
            match script {
                Script::Body(body) => Ok(ResultArtifact::new(body)),
                Script::Fail(e) => Err(e),
                Script::Slow(delay, body) => {
                    tokio::time::sleep(delay).await;
                    Ok(ResultArtifact::new(body))
                }
            }
        })
    }
}

fn file(name: &str, bytes: &[u8]) -> CandidateFile {
    CandidateFile::from_bytes(name, bytes.to_vec())
}

fn saved_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

// ── Happy paths ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn convert_docx_saves_pdf_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = ScriptedTransport::new(Script::Body(b"%PDF-1.7 converted"));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Convert);
    assert_ok!(session.select_files(vec![file("report.docx", b"PK docx")]));

    let completion = session.run(&transport, &downloader).await;
    let saved = match completion {
        Some(Completion::Saved(saved)) => saved,
        other => panic!("expected Saved, got {other:?}"),
    };

    assert!(saved.filename.starts_with("convert_"));
    assert!(saved.filename.ends_with(".pdf"));
    assert_eq!(std::fs::read(&saved.path).unwrap(), b"%PDF-1.7 converted");

    let sent = transport.seen();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].endpoint, "/api/convert");
    assert_eq!(sent[0].text_field("from"), Some("docx"));
    assert_eq!(sent[0].text_field("to"), Some("pdf"));
    assert_eq!(sent[0].file_fields("file"), vec!["report.docx"]);

    match session.state() {
        SessionState::Success { message, .. } => {
            assert_eq!(message, &format!("Operation successful! Saved {}.", saved.filename));
        }
        other => panic!("expected Success, got {other:?}"),
    }
    // Files stay staged so the action can run again.
    assert!(session.action_enabled());
}

#[tokio::test]
async fn merge_sends_every_file_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = ScriptedTransport::new(Script::Body(b"%PDF merged"));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Merge);
    assert_ok!(session.select_files(vec![
        file("a.pdf", b"1"),
        file("b.pdf", b"2"),
        file("c.pdf", b"3"),
    ]));

    let completion = session.run(&transport, &downloader).await;
    assert!(matches!(completion, Some(Completion::Saved(_))));

    let sent = transport.seen();
    assert_eq!(sent[0].endpoint, "/api/merge");
    assert_eq!(sent[0].file_fields("files"), vec!["a.pdf", "b.pdf", "c.pdf"]);

    let names = saved_files(dir.path());
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("merge_") && names[0].ends_with(".pdf"));
}

#[tokio::test]
async fn rotate_and_split_use_their_parameters_and_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = ScriptedTransport::new(Script::Body(b"PK\x03\x04"));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Rotate);
    assert_ok!(session.select_files(vec![file("scan.pdf", b"%PDF")]));
    session.set_angle(RotationAngle::Deg270);
    let rotated = session.run(&transport, &downloader).await;
    assert!(matches!(rotated, Some(Completion::Saved(ref s)) if s.filename.ends_with(".pdf")));

    session.select_tool(Operation::Split);
    assert_ok!(session.select_files(vec![file("scan.pdf", b"%PDF")]));
    let split = session.run(&transport, &downloader).await;
    assert!(matches!(split, Some(Completion::Saved(ref s)) if s.filename.ends_with(".zip")));

    let sent = transport.seen();
    assert_eq!(sent[0].text_field("angle"), Some("270"));
    assert_eq!(sent[1].endpoint, "/api/split");
    assert_eq!(sent[1].field_names(), vec!["file"]);
}

#[tokio::test]
async fn single_file_tools_send_only_the_first_file() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = ScriptedTransport::new(Script::Body(b"%PDF"));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Compress);
    assert_ok!(session.select_files(vec![file("first.pdf", b"1"), file("second.pdf", b"2")]));
    assert_eq!(session.selection_summary().as_deref(), Some("first.pdf"));

    session.run(&transport, &downloader).await;
    assert_eq!(transport.seen()[0].file_fields("file"), vec!["first.pdf"]);
}

// ── Failure paths ────────────────────────────────────────────────────────────

#[tokio::test]
async fn remote_failure_shows_generic_message_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = ScriptedTransport::new(Script::Fail(OperationError::Remote { status: 500 }));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Compress);
    assert_ok!(session.select_files(vec![file("big.pdf", b"%PDF")]));

    let completion = session.run(&transport, &downloader).await;
    match completion {
        Some(Completion::Failed(SwiftConvertError::Operation(OperationError::Remote {
            status,
        }))) => assert_eq!(status, 500),
        other => panic!("expected remote failure, got {other:?}"),
    }

    assert_eq!(
        session.state(),
        &SessionState::Error {
            message: FAILURE_MESSAGE.to_string()
        }
    );
    assert_eq!(session.last_error().map(|e| e.kind()), Some("remote"));
    assert!(session.action_enabled());
    assert!(saved_files(dir.path()).is_empty());
}

#[tokio::test]
async fn oversized_selection_never_reaches_the_transport() {
    let transport = ScriptedTransport::new(Script::Body(b"%PDF"));
    let downloader = ArtifactDownloader::new(std::env::temp_dir());

    let mut session = OperationSession::default();
    session.select_tool(Operation::Merge);
    let big = CandidateFile::from_bytes("huge.pdf", vec![0u8; 20 * 1024 * 1024 + 1]);
    assert_err!(session.select_files(vec![file("small.pdf", b"1"), big]));

    assert_eq!(
        session.status_message(),
        Some("One or more files exceed 20MB limit.")
    );
    assert!(session.run(&transport, &downloader).await.is_none());
    assert!(transport.seen().is_empty());
}

#[tokio::test]
async fn exactly_the_limit_is_accepted() {
    let mut session = OperationSession::default();
    let at_limit = CandidateFile::from_bytes("edge.pdf", vec![0u8; 20 * 1024 * 1024]);
    assert_ok!(session.select_files(vec![at_limit]));
    assert_eq!(session.state(), &SessionState::Staged);
}

#[tokio::test]
async fn empty_selection_is_reported() {
    let mut session = OperationSession::default();
    assert_err!(session.select_files(Vec::new()));
    assert_eq!(session.status_message(), Some("No files selected."));
    assert!(!session.action_enabled());
}

#[tokio::test]
async fn unwritable_output_dir_fails_the_attempt() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the output directory should be.
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    let downloader = ArtifactDownloader::new(&blocker);
    let transport = ScriptedTransport::new(Script::Body(b"%PDF"));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Compress);
    assert_ok!(session.select_files(vec![file("a.pdf", b"1")]));

    let completion = session.run(&transport, &downloader).await;
    assert!(matches!(
        completion,
        Some(Completion::Failed(SwiftConvertError::OutputWriteFailed { .. }))
    ));
    assert_eq!(session.state().name(), "error");
}

// ── Leaving a finished attempt ───────────────────────────────────────────────

#[tokio::test]
async fn success_then_reselect_returns_to_staged() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = ScriptedTransport::new(Script::Body(b"%PDF"));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Compress);
    assert_ok!(session.select_files(vec![file("a.pdf", b"1")]));
    session.run(&transport, &downloader).await;
    assert_eq!(session.state().name(), "success");

    assert_ok!(session.select_files(vec![file("b.pdf", b"2")]));
    assert_eq!(session.state(), &SessionState::Staged);
    assert_eq!(session.status_message(), None);
    assert_eq!(session.selection_summary().as_deref(), Some("b.pdf"));
    assert!(session.action_enabled());
}

#[tokio::test]
async fn error_then_reselect_returns_to_staged_and_forgets_the_failure() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = ScriptedTransport::new(Script::Fail(OperationError::Network {
        detail: "connection refused".into(),
    }));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Compress);
    assert_ok!(session.select_files(vec![file("a.pdf", b"1")]));
    session.run(&transport, &downloader).await;
    assert_eq!(session.last_error().map(|e| e.kind()), Some("network"));

    assert_ok!(session.select_files(vec![file("a.pdf", b"1")]));
    assert_eq!(session.state(), &SessionState::Staged);
    assert_eq!(session.status_message(), None);
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn tool_switch_forgets_the_last_failure() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = ScriptedTransport::new(Script::Fail(OperationError::Remote { status: 503 }));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Rotate);
    assert_ok!(session.select_files(vec![file("a.pdf", b"1")]));
    session.run(&transport, &downloader).await;
    assert!(session.last_error().is_some());

    session.select_tool(Operation::Split);
    assert!(session.last_error().is_none());
    assert_eq!(session.state(), &SessionState::Idle { message: None });
}

// ── Concurrency ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn dispatch_runs_in_background_and_blocks_a_second_action() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = Arc::new(ScriptedTransport::new(Script::Slow(
        Duration::from_millis(50),
        b"%PDF",
    )));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Compress);
    assert_ok!(session.select_files(vec![file("a.pdf", b"1")]));

    let pending = session.dispatch(transport.clone()).expect("attempt started");
    assert_eq!(session.status_message(), Some(PROCESSING_MESSAGE));
    assert_eq!(session.pending_requests(), 1);
    assert!(session.dispatch(transport.clone()).is_none());

    let (seq, result) = pending.join().await;
    let completion = session.complete(seq, result, &downloader).await;
    assert!(matches!(completion, Completion::Saved(_)));
    assert_eq!(session.pending_requests(), 0);
    assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn switching_tools_discards_the_late_result() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = Arc::new(ScriptedTransport::new(Script::Slow(
        Duration::from_millis(30),
        b"%PDF",
    )));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Compress);
    assert_ok!(session.select_files(vec![file("a.pdf", b"1")]));
    let pending = session.dispatch(transport.clone()).expect("attempt started");

    session.select_tool(Operation::Rotate);
    assert_eq!(session.pending_requests(), 0);

    let (seq, result) = pending.join().await;
    assert!(result.is_ok());
    let completion = session.complete(seq, result, &downloader).await;

    assert!(matches!(completion, Completion::Superseded));
    assert_eq!(session.state(), &SessionState::Idle { message: None });
    assert_eq!(session.operation(), Operation::Rotate);
    assert!(saved_files(dir.path()).is_empty());
}

#[tokio::test]
async fn reselecting_files_discards_the_late_result() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = Arc::new(ScriptedTransport::new(Script::Slow(
        Duration::from_millis(30),
        b"%PDF",
    )));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Compress);
    assert_ok!(session.select_files(vec![file("old.pdf", b"1")]));
    let pending = session.dispatch(transport.clone()).expect("attempt started");

    assert_ok!(session.select_files(vec![file("new.pdf", b"2")]));
    assert_eq!(session.pending_requests(), 0);
    assert!(session.action_enabled());

    let (seq, result) = pending.join().await;
    let completion = session.complete(seq, result, &downloader).await;

    assert!(matches!(completion, Completion::Superseded));
    assert_eq!(session.state(), &SessionState::Staged);
    assert_eq!(session.selection_summary().as_deref(), Some("new.pdf"));
    assert!(saved_files(dir.path()).is_empty());
}

#[tokio::test]
async fn aborted_attempt_is_a_network_failure() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = Arc::new(ScriptedTransport::new(Script::Slow(
        Duration::from_secs(30),
        b"%PDF",
    )));

    let mut session = OperationSession::default();
    session.select_tool(Operation::Compress);
    assert_ok!(session.select_files(vec![file("a.pdf", b"1")]));

    let pending = session.dispatch(transport).expect("attempt started");
    pending.abort();
    let (seq, result) = pending.join().await;
    let completion = session.complete(seq, result, &downloader).await;

    assert!(matches!(completion, Completion::Failed(_)));
    assert_eq!(session.last_error().map(|e| e.kind()), Some("network"));
    assert_eq!(session.status_message(), Some(FAILURE_MESSAGE));
}

#[tokio::test]
async fn conversion_flags_survive_until_the_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ArtifactDownloader::new(dir.path());
    let transport = ScriptedTransport::new(Script::Body(b"\x89PNG"));

    let mut session = OperationSession::default();
    assert_ok!(session.select_files(vec![file("slides.pdf", b"%PDF")]));
    assert_ok!(session.set_conversion(Format::Pdf, Format::Png));

    let completion = session.run(&transport, &downloader).await;
    assert!(matches!(completion, Some(Completion::Saved(ref s)) if s.filename.ends_with(".png")));
    assert_eq!(transport.seen()[0].text_field("to"), Some("png"));
}

mod common;

use std::path::Path;
use std::sync::Arc;

use office_to_pdf::error::{ConvertError, ErrorKind};
use office_to_pdf::facade::orchestrator::ConversionOrchestrator;
use office_to_pdf::models::backend::{BackendKind, SelectionPolicy};
use office_to_pdf::models::conversion::{ConversionOutcome, ExtensionSet};
use office_to_pdf::models::run::{RunEvent, RunState};
use office_to_pdf::service::file::collect_files;
use tokio::sync::mpsc::unbounded_channel;

use common::{write_files, FakeOffice, SharedOffice};

fn orchestrator(office: &Arc<FakeOffice>) -> ConversionOrchestrator {
    ConversionOrchestrator::with_automation(Arc::new(SharedOffice(office.clone())))
}

#[test]
fn discovery_matches_extensions_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.docx", "B.DOC", "c.txt", "sub/d.Docx", "sub/e.pdf"]);

    let files = collect_files(dir.path(), &ExtensionSet::default(), 32).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["B.DOC", "a.docx", "sub/d.Docx"]);
    assert_eq!(collect_files(dir.path(), &ExtensionSet::default(), 32).unwrap(), files);
}

#[test]
fn no_backend_fails_before_any_task() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.docx", "b.docx", "c.docx"]);
    let office = Arc::new(FakeOffice::with_installed(&[]));
    let mut orch = orchestrator(&office);

    assert_eq!(orch.configure(dir.path(), &ExtensionSet::default(), SelectionPolicy::Auto).unwrap(), 3);
    let (tx, mut rx) = unbounded_channel();
    let err = orch.start(&tx).unwrap_err();

    assert!(matches!(err, ConvertError::NoBackendAvailable));
    assert!(office.opened().is_empty());
    assert!(rx.try_recv().is_err());
    assert_eq!(orch.state(), RunState::Ready);
}

#[test]
fn missing_automation_layer_fails_before_any_task() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.docx", "b.docx"]);
    let office = Arc::new(FakeOffice::with_installed(&[BackendKind::Word, BackendKind::Wps]));
    office.remove_automation();
    let mut orch = orchestrator(&office);

    orch.configure(dir.path(), &ExtensionSet::default(), SelectionPolicy::Auto).unwrap();
    let (tx, mut rx) = unbounded_channel();
    let err = orch.start(&tx).unwrap_err();

    assert!(matches!(err, ConvertError::DependencyMissing(_)));
    assert!(office.launches().is_empty());
    assert!(office.opened().is_empty());
    assert!(rx.try_recv().is_err());
    assert_eq!(orch.state(), RunState::Ready);
}

#[test]
fn failed_restart_after_completed_run_returns_to_ready() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.docx"]);
    let office = Arc::new(FakeOffice::with_installed(&[BackendKind::Word]));
    let mut orch = orchestrator(&office);
    orch.configure(dir.path(), &ExtensionSet::default(), SelectionPolicy::Auto).unwrap();
    let (tx, _rx) = unbounded_channel();

    assert_eq!(orch.start(&tx).unwrap().state, RunState::Completed);
    office.uninstall(BackendKind::Word);

    assert!(matches!(orch.start(&tx), Err(ConvertError::NoBackendAvailable)));
    assert_eq!(orch.state(), RunState::Ready);
    assert_eq!(office.opened(), vec!["a.docx"]);
}

#[test]
fn forced_unavailable_backend_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.docx"]);
    let office = Arc::new(FakeOffice::with_installed(&[BackendKind::Wps]));
    let mut orch = orchestrator(&office);

    orch.configure(dir.path(), &ExtensionSet::default(), SelectionPolicy::Force(BackendKind::Word))
        .unwrap();
    let (tx, _rx) = unbounded_channel();

    assert!(matches!(orch.start(&tx), Err(ConvertError::BackendUnavailable(BackendKind::Word))));
    assert!(office.opened().is_empty());
}

#[test]
fn one_failure_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.docx", "b.docx", "c.docx"]);
    let office = Arc::new(
        FakeOffice::with_installed(&[BackendKind::Word, BackendKind::Wps])
            .failing("b.docx", "此命令無效。"),
    );
    let mut orch = orchestrator(&office);
    orch.configure(dir.path(), &ExtensionSet::default(), SelectionPolicy::Auto).unwrap();
    let (tx, mut rx) = unbounded_channel();

    let run = orch.start(&tx).unwrap();

    assert_eq!(run.state, RunState::Completed);
    assert_eq!(run.backend, BackendKind::Word);
    assert_eq!((run.succeeded, run.failed), (2, 1));
    assert_eq!(run.failed_files(), vec!["b.docx".to_string()]);
    assert_eq!(office.opened(), vec!["a.docx", "b.docx", "c.docx"]);
    assert_eq!(run.records[1].outcome.error_kind(), Some(ErrorKind::DocumentIncompatible));
    assert!(dir.path().join("a.pdf").is_file());
    assert!(!dir.path().join("b.pdf").exists());
    assert!(dir.path().join("c.pdf").is_file());

    let mut outcomes = 0;
    let mut completed = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            RunEvent::TaskOutcome(_) => outcomes += 1,
            RunEvent::RunComplete(done) => completed = done.processed() == 3,
            RunEvent::Progress { .. } => {}
        }
    }
    assert_eq!(outcomes, 3);
    assert!(completed);
}

#[test]
fn wps_is_used_when_word_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.doc"]);
    let office = Arc::new(FakeOffice::with_installed(&[BackendKind::Wps]));
    let mut orch = orchestrator(&office);
    orch.configure(dir.path(), &ExtensionSet::default(), SelectionPolicy::Auto).unwrap();
    let (tx, _rx) = unbounded_channel();

    let run = orch.start(&tx).unwrap();

    assert_eq!(run.backend, BackendKind::Wps);
    assert!(matches!(run.records[0].outcome, ConversionOutcome::Success { .. }));
    assert_eq!(run.records[0].backend, BackendKind::Wps);
}

#[test]
fn rerun_overwrites_outputs_with_same_result() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.docx", "b.docx"]);
    let office = Arc::new(FakeOffice::with_installed(&[BackendKind::Word]));
    let mut orch = orchestrator(&office);
    orch.configure(dir.path(), &ExtensionSet::default(), SelectionPolicy::Auto).unwrap();
    let (tx, _rx) = unbounded_channel();

    let first = orch.start(&tx).unwrap();
    let second = orch.start(&tx).unwrap();

    assert_eq!(first.succeeded, 2);
    assert_eq!(second.succeeded, 2);
    assert_eq!(second.state, RunState::Completed);
    assert!(Path::new(&dir.path().join("b.pdf")).is_file());
}

#[test]
fn cancel_lets_running_task_finish_then_stops() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.docx", "b.docx", "c.docx"]);
    let office = Arc::new(FakeOffice::with_installed(&[BackendKind::Word]));
    let mut orch = orchestrator(&office);
    orch.configure(dir.path(), &ExtensionSet::default(), SelectionPolicy::Auto).unwrap();
    office.cancel_when_opening("b.docx", orch.control());
    let (tx, _rx) = unbounded_channel();

    let run = orch.start(&tx).unwrap();

    assert_eq!(run.state, RunState::Stopped);
    assert_eq!(run.processed(), 2);
    assert_eq!(run.succeeded, 2);
    assert!(run.processed() <= run.total);
    assert_eq!(office.opened(), vec!["a.docx", "b.docx"]);
    assert!(!dir.path().join("c.pdf").exists());
    assert_eq!(orch.state(), RunState::Stopped);
}

#[test]
fn cancel_outside_conversion_is_ignored() {
    let office = Arc::new(FakeOffice::with_installed(&[BackendKind::Word]));
    let orch = orchestrator(&office);

    assert!(!orch.request_cancel());
    assert!(!orch.control().is_cancel_requested());
    assert_eq!(orch.state(), RunState::Idle);
}

#[test]
fn missing_root_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let office = Arc::new(FakeOffice::with_installed(&[BackendKind::Word]));
    let mut orch = orchestrator(&office);

    let err = orch
        .configure(&dir.path().join("missing"), &ExtensionSet::default(), SelectionPolicy::Auto)
        .unwrap_err();

    assert!(matches!(err, ConvertError::PathNotFound(_)));
    assert_eq!(orch.state(), RunState::Idle);
}

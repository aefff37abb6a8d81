// tests/runtime_process.rs
//
// Drives real child processes through the supervisor. A small shell script
// stands in for the PICO-8 binary.
#![cfg(unix)]

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use cartwatch::engine::{Command, Orchestrator, RuntimeEvent, RuntimeId};
use cartwatch::errors::CartwatchError;
use cartwatch::supervisor::ProcessSupervisor;
use cartwatch::types::RuntimeStatus;
use cartwatch_test_utils::builders::{
    write_exiting_runtime_script, write_trapping_runtime_script, CartProject,
};
use cartwatch_test_utils::fakes::{
    steps, timeline, FakeBuilder, RecordingLog, RecordingReload, Step,
};
use cartwatch_test_utils::{init_tracing, with_timeout};

async fn next_event(rx: &mut mpsc::UnboundedReceiver<RuntimeEvent>) -> RuntimeEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a runtime event")
        .expect("event channel closed")
}

/// Receive events until the first output line of `id`, returning everything
/// seen on the way (that line included).
async fn until_output_of(
    rx: &mut mpsc::UnboundedReceiver<RuntimeEvent>,
    id: RuntimeId,
) -> Vec<RuntimeEvent> {
    let mut seen = Vec::new();
    loop {
        let event = next_event(rx).await;
        let done = matches!(&event, RuntimeEvent::RuntimeOutput { id: got, .. } if *got == id);
        seen.push(event);
        if done {
            return seen;
        }
    }
}

async fn until_exit_of(
    rx: &mut mpsc::UnboundedReceiver<RuntimeEvent>,
    id: RuntimeId,
) -> Option<i32> {
    loop {
        if let RuntimeEvent::RuntimeExited { id: got, code } = next_event(rx).await {
            if got == id {
                return code;
            }
        }
    }
}

#[tokio::test]
async fn runtime_is_started_with_the_cart_path() {
    init_tracing();
    let project = CartProject::new().with_fake_runtime();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut sup = ProcessSupervisor::new(tx, Box::new(RecordingReload::new(timeline())));

    let id = sup.open(&project.config()).await.unwrap();
    assert_eq!(sup.status().id(), Some(id));

    let seen = until_output_of(&mut rx, id).await;
    match seen.last() {
        Some(RuntimeEvent::RuntimeOutput { line, .. }) => {
            assert_eq!(line, &format!("running {}", project.output().display()));
        }
        other => panic!("expected output, got {other:?}"),
    }

    sup.shutdown().await;
    assert_eq!(sup.status(), RuntimeStatus::Stopped);
}

#[tokio::test]
async fn reopening_tears_down_the_old_runtime_first() {
    init_tracing();
    let project = CartProject::new().with_fake_runtime();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut sup = ProcessSupervisor::new(tx, Box::new(RecordingReload::new(timeline())));

    let first = sup.open(&project.config()).await.unwrap();
    until_output_of(&mut rx, first).await;

    let second = sup.open(&project.config()).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(sup.status().id(), Some(second));

    let seen = until_output_of(&mut rx, second).await;
    let exit_of_first = seen
        .iter()
        .position(|e| matches!(e, RuntimeEvent::RuntimeExited { id, .. } if *id == first))
        .expect("first runtime never reported its exit");
    assert!(exit_of_first < seen.len() - 1);

    // The late exit of the first process must not stop the second.
    assert!(!sup.on_exit(first, None));
    assert!(sup.is_running());

    sup.shutdown().await;
}

#[tokio::test]
async fn kill_is_observed_through_the_exit_event() {
    init_tracing();
    let project = CartProject::new().with_fake_runtime();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut sup = ProcessSupervisor::new(tx, Box::new(RecordingReload::new(timeline())));

    let id = sup.open(&project.config()).await.unwrap();
    until_output_of(&mut rx, id).await;

    assert!(sup.kill());
    // Still Running until the exit is seen.
    assert!(sup.is_running());

    let code = until_exit_of(&mut rx, id).await;
    assert_eq!(code, None, "a killed process has no exit code");
    assert!(sup.on_exit(id, code));
    assert_eq!(sup.status(), RuntimeStatus::Stopped);
    assert!(!sup.kill());
}

#[tokio::test]
async fn kill_lets_the_runtime_exit_cleanly_first() {
    init_tracing();
    let project = CartProject::new();
    let exe = write_trapping_runtime_script(project.root());
    let project = project.with_executable(exe);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut sup = ProcessSupervisor::new(tx, Box::new(RecordingReload::new(timeline())));

    let id = sup.open(&project.config()).await.unwrap();
    until_output_of(&mut rx, id).await;

    assert!(sup.kill());

    match next_event(&mut rx).await {
        RuntimeEvent::RuntimeOutput { id: got, line } => {
            assert_eq!(got, id);
            assert_eq!(line, "stopping");
        }
        other => panic!("expected the runtime's own shutdown output, got {other:?}"),
    }
    assert_eq!(until_exit_of(&mut rx, id).await, Some(0));
    assert!(sup.on_exit(id, Some(0)));
    assert!(!sup.is_running());
}

#[tokio::test]
async fn runtime_exiting_on_its_own_reports_its_code() {
    init_tracing();
    let project = CartProject::new();
    let exe = write_exiting_runtime_script(project.root(), 3);
    let project = project.with_executable(exe);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut sup = ProcessSupervisor::new(tx, Box::new(RecordingReload::new(timeline())));

    let id = sup.open(&project.config()).await.unwrap();

    match next_event(&mut rx).await {
        RuntimeEvent::RuntimeOutput { id: got, line } => {
            assert_eq!(got, id);
            assert!(line.starts_with("bye "));
        }
        other => panic!("expected output before exit, got {other:?}"),
    }
    assert_eq!(until_exit_of(&mut rx, id).await, Some(3));
    assert!(sup.on_exit(id, Some(3)));
    assert!(!sup.is_running());
}

#[tokio::test]
async fn missing_executable_keeps_the_supervisor_stopped() {
    init_tracing();
    let project = CartProject::new().with_executable("/definitely/not/a/pico8");
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut sup = ProcessSupervisor::new(tx, Box::new(RecordingReload::new(timeline())));

    match sup.open(&project.config()).await {
        Err(CartwatchError::SpawnFailed { path, .. }) => {
            assert_eq!(path.to_str(), Some("/definitely/not/a/pico8"));
        }
        other => panic!("expected SpawnFailed, got {other:?}"),
    }
    assert_eq!(sup.status(), RuntimeStatus::Stopped);
}

#[tokio::test]
async fn reload_reaches_the_notifier_only_while_running() {
    init_tracing();
    let project = CartProject::new().with_fake_runtime();
    let tl = timeline();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut sup = ProcessSupervisor::new(tx, Box::new(RecordingReload::new(tl.clone())));

    assert!(!sup.reload(&project.output()));
    assert!(steps(&tl).is_empty());

    let id = sup.open(&project.config()).await.unwrap();
    until_output_of(&mut rx, id).await;
    assert!(sup.reload(&project.output()));
    assert_eq!(steps(&tl), vec![Step::Reload(project.output())]);

    sup.shutdown().await;
}

#[tokio::test]
async fn source_change_while_running_rebuilds_then_reloads() {
    init_tracing();
    let project = CartProject::new().with_fake_runtime();
    let tl = timeline();
    let (tx, rx) = mpsc::unbounded_channel();
    let supervisor =
        ProcessSupervisor::new(tx.clone(), Box::new(RecordingReload::new(tl.clone())));
    let log = RecordingLog::new();
    let orchestrator = Orchestrator::new(
        project.config(),
        FakeBuilder::new(tl.clone()),
        log.clone(),
        supervisor,
        rx,
    );

    for event in [
        RuntimeEvent::Command(Command::OpenRuntime),
        RuntimeEvent::SourceChanged {
            path: project.input().join("main.lua"),
            kind: cartwatch::engine::ChangeKind::Modified,
        },
        RuntimeEvent::Command(Command::Quit),
    ] {
        tx.send(event).unwrap();
    }

    let summary = with_timeout(orchestrator.run()).await.unwrap();

    assert_eq!(summary.runtimes_opened, 1);
    assert_eq!(summary.rebuilds, 2);
    assert_eq!(summary.reloads, 1);
    assert_eq!(summary.final_status, RuntimeStatus::Stopped);
    assert_eq!(
        steps(&tl),
        vec![Step::Build, Step::Build, Step::Reload(project.output())]
    );
}

#[tokio::test]
async fn opening_twice_leaves_no_runtime_behind_on_quit() {
    init_tracing();
    let project = CartProject::new().with_fake_runtime();
    let tl = timeline();
    let (tx, rx) = mpsc::unbounded_channel();
    let supervisor =
        ProcessSupervisor::new(tx.clone(), Box::new(RecordingReload::new(tl.clone())));
    let orchestrator = Orchestrator::new(
        project.config(),
        FakeBuilder::new(tl.clone()),
        RecordingLog::new(),
        supervisor,
        rx,
    );

    for command in [Command::OpenRuntime, Command::OpenRuntime, Command::Quit] {
        tx.send(RuntimeEvent::Command(command)).unwrap();
    }

    let summary = with_timeout(orchestrator.run()).await.unwrap();

    assert_eq!(summary.runtimes_opened, 2);
    assert_eq!(summary.final_status, RuntimeStatus::Stopped);
}

// src/supervisor/process.rs

//! Spawning and monitoring a single runtime process.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, RuntimeId};
use crate::errors::{CartwatchError, Result};

/// How long to keep draining output once the process has exited.
///
/// A grandchild that inherited the pipe could otherwise keep the reader
/// (and with it the teardown of this process) alive forever.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// How long the runtime gets to exit after SIGTERM before it is killed.
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// Supervisor-side handle of a live runtime process.
///
/// Dropping the handle drops the kill sender, which the monitor treats as a
/// kill request.
#[derive(Debug)]
pub(crate) struct ProcessHandle {
    pub id: RuntimeId,
    pub pid: Option<u32>,
    kill_tx: Option<oneshot::Sender<()>>,
    teardown_rx: oneshot::Receiver<Option<i32>>,
}

impl ProcessHandle {
    /// Ask the monitor to terminate the process.
    ///
    /// Returns false if a kill was already requested.
    pub fn request_kill(&mut self) -> bool {
        match self.kill_tx.take() {
            Some(tx) => {
                // An Err only means the monitor already finished.
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    /// Wait until the monitor has seen the process exit and flushed its
    /// output and exit events. Returns the exit code, if any.
    pub async fn wait_teardown(self) -> Option<i32> {
        let ProcessHandle {
            kill_tx,
            teardown_rx,
            ..
        } = self;
        let code = teardown_rx.await.unwrap_or(None);
        drop(kill_tx);
        code
    }
}

/// Spawn `<executable> -run <cart>` and start its monitor task.
pub(crate) fn spawn_runtime(
    id: RuntimeId,
    executable: &Path,
    cart: &Path,
    event_tx: mpsc::UnboundedSender<RuntimeEvent>,
) -> Result<ProcessHandle> {
    let mut cmd = Command::new(executable);
    cmd.arg("-run")
        .arg(cart)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| CartwatchError::SpawnFailed {
        path: executable.to_path_buf(),
        source,
    })?;

    let pid = child.id();
    info!(%id, ?pid, executable = ?executable, cart = ?cart, "runtime process started");

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (kill_tx, kill_rx) = oneshot::channel::<()>();
    let (teardown_tx, teardown_rx) = oneshot::channel::<Option<i32>>();

    tokio::spawn(monitor(
        id,
        child,
        stdout,
        stderr,
        kill_rx,
        teardown_tx,
        event_tx,
    ));

    Ok(ProcessHandle {
        id,
        pid,
        kill_tx: Some(kill_tx),
        teardown_rx,
    })
}

/// Own the child until it is gone.
///
/// Event order per process is: all `RuntimeOutput`s, then one
/// `RuntimeExited`, then the teardown signal to the supervisor.
async fn monitor(
    id: RuntimeId,
    mut child: Child,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    kill_rx: oneshot::Receiver<()>,
    teardown_tx: oneshot::Sender<Option<i32>>,
    event_tx: mpsc::UnboundedSender<RuntimeEvent>,
) {
    let stdout_task = stdout.map(|out| tokio::spawn(forward_stdout(id, out, event_tx.clone())));
    let stderr_task = stderr.map(|err| tokio::spawn(drain_stderr(id, err)));

    let status = tokio::select! {
        status = child.wait() => status,
        // Fires on an explicit kill and when the handle is dropped.
        _ = kill_rx => {
            info!(%id, "terminating runtime process");
            terminate(id, &mut child).await
        }
    };

    let code = match status {
        Ok(status) => status.code(),
        Err(e) => {
            warn!(%id, error = %e, "failed to wait for runtime process");
            None
        }
    };

    for task in [stdout_task, stderr_task].into_iter().flatten() {
        let abort = task.abort_handle();
        if tokio::time::timeout(OUTPUT_DRAIN_GRACE, task).await.is_err() {
            debug!(%id, "output still open after exit; dropping the rest");
            abort.abort();
        }
    }

    info!(%id, exit_code = ?code, "runtime process exited");
    let _ = event_tx.send(RuntimeEvent::RuntimeExited { id, code });
    let _ = teardown_tx.send(code);
}

/// Ask the process to exit, then kill it if it is still there after
/// [`TERMINATE_GRACE`].
async fn terminate(id: RuntimeId, child: &mut Child) -> std::io::Result<ExitStatus> {
    if request_exit(id, child) {
        if let Ok(status) = tokio::time::timeout(TERMINATE_GRACE, child.wait()).await {
            return status;
        }
        debug!(%id, "runtime ignored SIGTERM; killing");
    }
    if let Err(e) = child.start_kill() {
        warn!(%id, error = %e, "failed to kill runtime process");
    }
    child.wait().await
}

#[cfg(unix)]
fn request_exit(id: RuntimeId, child: &Child) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return false;
    };
    match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) => true,
        Err(e) => {
            warn!(%id, error = %e, "failed to send SIGTERM to runtime process");
            false
        }
    }
}

#[cfg(not(unix))]
fn request_exit(_id: RuntimeId, _child: &Child) -> bool {
    false
}

async fn forward_stdout(
    id: RuntimeId,
    stdout: ChildStdout,
    event_tx: mpsc::UnboundedSender<RuntimeEvent>,
) {
    let mut lines = BufReader::new(stdout).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if event_tx
            .send(RuntimeEvent::RuntimeOutput { id, line })
            .is_err()
        {
            break;
        }
    }
    debug!(%id, "stdout closed");
}

async fn drain_stderr(id: RuntimeId, stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(%id, "stderr: {}", line);
    }
}

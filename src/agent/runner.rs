//! Process supervision for the consensus agent binary

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, info};

use super::AgentRunner;
use crate::timeout::Timeout;
use crate::Error;

/// How long the freshly spawned process must stay up before it counts as
/// minimally alive. Join verification is the Controller's job; this only
/// filters out immediate crashes (bad flags, missing data dir).
const STARTUP_GRACE: Duration = Duration::from_millis(500);

/// Liveness poll interval during the startup and shutdown waits
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a signalled agent gets to exit on its own before the stop
/// escalates to SIGKILL
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Agent runner that spawns and supervises the agent binary
pub struct ProcessRunner {
    binary: PathBuf,
    args: Vec<String>,
    child: Mutex<Option<Child>>,
}

impl ProcessRunner {
    /// Create a runner for the given agent binary and arguments
    pub fn new(binary: PathBuf, args: Vec<String>) -> Self {
        Self {
            binary,
            args,
            child: Mutex::new(None),
        }
    }
}

impl AgentRunner for ProcessRunner {
    fn run(&self, timeout: &Timeout) -> Result<(), Error> {
        let mut guard = self
            .child
            .lock()
            .map_err(|_| Error::runner("runner state poisoned"))?;
        if guard.is_some() {
            return Err(Error::runner("agent process is already running"));
        }

        info!(binary = %self.binary.display(), "Starting agent process");

        let mut child = Command::new(&self.binary)
            .args(&self.args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| Error::runner(format!("failed to spawn {}: {}", self.binary.display(), e)))?;

        // Block until the process survives the grace period or fails.
        let spawned = std::time::Instant::now();
        loop {
            if let Some(status) = child
                .try_wait()
                .map_err(|e| Error::runner(format!("failed to poll agent process: {}", e)))?
            {
                return Err(Error::runner(format!(
                    "agent process exited during startup: {}",
                    status
                )));
            }

            if spawned.elapsed() >= STARTUP_GRACE {
                break;
            }

            if timeout.expired() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::runner(
                    "deadline expired while waiting for agent process to start",
                ));
            }

            std::thread::sleep(POLL_INTERVAL);
        }

        debug!(pid = child.id(), "Agent process is minimally alive");
        *guard = Some(child);
        Ok(())
    }

    fn stop(&self) -> Result<(), Error> {
        let mut guard = self
            .child
            .lock()
            .map_err(|_| Error::runner("runner state poisoned"))?;

        let mut child = guard
            .take()
            .ok_or_else(|| Error::runner("agent process is not running"))?;

        info!(pid = child.id(), "Stopping agent process");

        // SIGTERM first: the agent may still be flushing state after its
        // cluster departure.
        signal::kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM)
            .map_err(|e| Error::runner(format!("failed to signal agent process: {}", e)))?;

        let signalled = std::time::Instant::now();
        loop {
            if child
                .try_wait()
                .map_err(|e| Error::runner(format!("failed to poll agent process: {}", e)))?
                .is_some()
            {
                return Ok(());
            }

            if signalled.elapsed() >= STOP_GRACE {
                debug!(pid = child.id(), "Agent ignored SIGTERM, escalating");
                child
                    .kill()
                    .map_err(|e| Error::runner(format!("failed to terminate agent process: {}", e)))?;
                child
                    .wait()
                    .map_err(|e| Error::runner(format!("failed to reap agent process: {}", e)))?;
                return Ok(());
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

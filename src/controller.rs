//! Retry-bounded lifecycle state machine for the consensus agent
//!
//! The Controller composes the agent runner, a control-plane client, and a
//! clock into three operations: boot as client, boot as server, and stop.
//! Every operation is a fail-fast linear sequence: the first failing step
//! aborts the remainder and its error is returned to the caller verbatim.
//!
//! Boot-as-server walks the full state machine:
//!
//! ```text
//! NotStarted -> Running(unverified) -> Joined
//!            -> {sync barrier, last node only} -> Synced
//!            -> KeysConfigured -> Ready
//! ```
//!
//! There is no rollback: a failed sync barrier does not un-join the agent.

use std::sync::Arc;

use tracing::{debug, info};

use crate::agent::{AgentClient, AgentRunner};
use crate::clock::Clock;
use crate::config::ControllerConfig;
use crate::timeout::Timeout;
use crate::Error;

/// Lifecycle state machine over the agent collaborators
///
/// Stateless across calls beyond its config: each boot/stop invocation is
/// an independent, complete sequence.
pub struct Controller {
    runner: Arc<dyn AgentRunner>,
    client: Arc<dyn AgentClient>,
    clock: Arc<dyn Clock>,
    config: ControllerConfig,
}

impl Controller {
    /// Compose a controller from its collaborators
    pub fn new(
        runner: Arc<dyn AgentRunner>,
        client: Arc<dyn AgentClient>,
        clock: Arc<dyn Clock>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            runner,
            client,
            clock,
            config,
        }
    }

    /// Boot the agent as a non-authoritative cluster member
    ///
    /// A client node only needs join verification.
    pub fn boot_client(&self, timeout: &Timeout) -> Result<(), Error> {
        self.boot_agent(timeout)
    }

    /// Boot the agent as a consensus server
    ///
    /// After join verification: query whether this is the last node to
    /// boot, run the sync barrier if so, then install the encryption
    /// keyring unless SSL is disabled.
    pub fn boot_server(&self, timeout: &Timeout) -> Result<(), Error> {
        self.boot_agent(timeout)?;
        self.configure_cluster(self.client.as_ref())
    }

    /// Run the server configuration steps over an established RPC session
    ///
    /// Same sequence as the tail of [`boot_server`](Self::boot_server),
    /// carried over the handle the Server constructed against the fixed
    /// control-plane endpoint. The deadline token is accepted for
    /// signature parity with the boot operations; only the agent runner
    /// interprets it, so it is never examined here.
    pub fn configure_server(&self, rpc: &dyn AgentClient, _timeout: &Timeout) -> Result<(), Error> {
        self.configure_cluster(rpc)
    }

    /// Gracefully depart the cluster, then terminate the agent process
    ///
    /// Leave-before-stop is mandatory: the rest of the cluster must
    /// observe a clean departure rather than a crash.
    pub fn stop_agent(&self) -> Result<(), Error> {
        self.leave_and_stop(self.client.as_ref())
    }

    /// Stop variant that carries the leave request over an established
    /// RPC session instead of the boot-time client
    pub fn stop_agent_with(&self, rpc: &dyn AgentClient) -> Result<(), Error> {
        self.leave_and_stop(rpc)
    }

    /// Start the process and verify the join, bounded by `max_retries`
    ///
    /// This is the whole of [`boot_client`](Self::boot_client); the
    /// Server shell also boots with it in server mode, leaving the
    /// configure steps to [`configure_server`](Self::configure_server)
    /// over the RPC session.
    pub fn boot_agent(&self, timeout: &Timeout) -> Result<(), Error> {
        // No retries at this level: a failed process start is terminal.
        self.runner.run(timeout)?;
        self.verify_with_retries("join", || self.client.verify_joined())?;
        info!("Agent booted and joined");
        Ok(())
    }

    fn configure_cluster(&self, client: &dyn AgentClient) -> Result<(), Error> {
        if client.is_last_node()? {
            // Barrier: the final node waits until the whole cluster has
            // converged before proceeding.
            info!("Last node to boot, verifying cluster sync");
            self.verify_with_retries("sync", || client.verify_synced())?;
        }

        if !self.config.ssl_disabled {
            if self.config.encrypt_keys.is_empty() {
                return Err(Error::validation(
                    "encrypt keys cannot be empty if ssl is enabled",
                ));
            }
            client.set_keys(&self.config.encrypt_keys)?;
            info!(keys = self.config.encrypt_keys.len(), "Keyring installed");
        }

        Ok(())
    }

    fn leave_and_stop(&self, client: &dyn AgentClient) -> Result<(), Error> {
        client.leave()?;
        self.runner.stop()?;
        info!("Agent left the cluster and stopped");
        Ok(())
    }

    /// Bounded verification loop with constant delay
    ///
    /// Attempts are 1-indexed up to `max_retries`. The last attempt's
    /// error is returned on exhaustion; earlier errors are discarded. The
    /// delay never grows and is never slept after the final attempt.
    fn verify_with_retries<F>(&self, what: &str, mut verify: F) -> Result<(), Error>
    where
        F: FnMut() -> Result<(), Error>,
    {
        for attempt in 1..=self.config.max_retries {
            match verify() {
                Ok(()) => {
                    debug!(what, attempt, "Verification succeeded");
                    return Ok(());
                }
                Err(err) if attempt == self.config.max_retries => return Err(err),
                Err(err) => {
                    debug!(what, attempt, error = %err, "Verification failed, retrying");
                    self.clock.sleep(self.config.sync_retry_delay);
                }
            }
        }

        Ok(())
    }
}

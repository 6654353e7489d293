//! Outer orchestration shell invoked by the deployment tool
//!
//! `Server` sequences file writing, agent boot, RPC-client construction,
//! and server configuration into the single `start`/`stop` surface the
//! deployment automation calls. It holds no retry state of its own: all
//! retry and verification semantics live in the [`Controller`].

use tracing::info;

use crate::agent::AgentClient;
use crate::config::Mode;
use crate::controller::Controller;
use crate::files::ConfigWriter;
use crate::timeout::Timeout;
use crate::Error;

/// Fixed local loopback control-plane endpoint
///
/// Not configurable: the orchestrator only ever manages the agent running
/// beside it.
pub const RPC_ENDPOINT: &str = "localhost:8400";

/// Injected strategy that produces an RPC-client handle for an endpoint
pub type RpcClientFactory = Box<dyn Fn(&str) -> Result<Box<dyn AgentClient>, Error> + Send + Sync>;

/// Thin sequencing shell over the Controller and the file writer
pub struct Server {
    controller: Controller,
    writer: Box<dyn ConfigWriter>,
    rpc_factory: RpcClientFactory,
    mode: Mode,
}

impl Server {
    /// Assemble the server shell
    pub fn new(
        controller: Controller,
        writer: Box<dyn ConfigWriter>,
        rpc_factory: RpcClientFactory,
        mode: Mode,
    ) -> Self {
        Self {
            controller,
            writer,
            rpc_factory,
            mode,
        }
    }

    /// Bring the node from "not running" to "joined and verified"
    ///
    /// Boot is join-only in both modes; the barrier and keyring steps run
    /// exactly once, over the RPC handle. Fail-fast: the first error
    /// anywhere aborts the sequence and is propagated unchanged.
    pub fn start(&self, timeout: &Timeout) -> Result<(), Error> {
        info!(mode = ?self.mode, "Starting node");

        self.writer.write_agent_config()?;
        self.writer.write_service_definitions()?;

        match self.mode {
            Mode::Client => self.controller.boot_client(timeout)?,
            Mode::Server => self.controller.boot_agent(timeout)?,
        }

        let rpc = (self.rpc_factory)(RPC_ENDPOINT)?;
        self.controller.configure_server(rpc.as_ref(), timeout)?;

        info!("Node is ready");
        Ok(())
    }

    /// Bring the node back down through a graceful cluster departure
    ///
    /// If RPC-client construction fails, the stop call is never attempted.
    pub fn stop(&self) -> Result<(), Error> {
        info!("Stopping node");
        let rpc = (self.rpc_factory)(RPC_ENDPOINT)?;
        self.controller.stop_agent_with(rpc.as_ref())
    }
}

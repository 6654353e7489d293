//! Collaborator interfaces for the supervised consensus agent
//!
//! The orchestrator never touches the agent process or its control plane
//! directly. It works through two capability traits:
//!
//! - [`AgentRunner`] - the supervised process: start it and block until it
//!   is minimally alive, or ask it to terminate.
//! - [`AgentClient`] - the control-plane surface of the running agent:
//!   join/sync verification, the last-node query, key rotation, and
//!   graceful departure.
//!
//! Production implementations live in [`runner`] and [`client`]; tests
//! substitute mocks, so the Controller's sequencing can be verified
//! without a real agent process.

pub mod client;
pub mod runner;

pub use client::HttpAgentClient;
pub use runner::ProcessRunner;

#[cfg(test)]
use mockall::automock;

use crate::timeout::Timeout;
use crate::Error;

/// The supervised agent process
#[cfg_attr(test, automock)]
pub trait AgentRunner: Send + Sync {
    /// Start the agent process and block until it is minimally alive or
    /// has failed. The deadline token bounds the blocking wait; its
    /// interpretation belongs to the implementation.
    fn run(&self, timeout: &Timeout) -> Result<(), Error>;

    /// Request graceful termination of the agent process
    fn stop(&self) -> Result<(), Error>;
}

/// Control-plane surface of a running agent
///
/// One implementation speaks to the agent's local HTTP API during boot;
/// the RPC-client factory produces another bound to an established
/// control-plane session. The Controller treats both identically.
#[cfg_attr(test, automock)]
pub trait AgentClient: Send + Sync {
    /// Verify the agent has joined the cluster
    fn verify_joined(&self) -> Result<(), Error>;

    /// Verify the cluster has converged (a leader is established and this
    /// node is in sync with it)
    fn verify_synced(&self) -> Result<(), Error>;

    /// Whether this node is the last one expected to boot
    fn is_last_node(&self) -> Result<bool, Error>;

    /// Install the gossip encryption keyring, in the given order
    fn set_keys(&self, keys: &[String]) -> Result<(), Error>;

    /// Request graceful departure from the cluster
    fn leave(&self) -> Result<(), Error>;
}

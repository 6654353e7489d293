//! Palisade - local lifecycle orchestrator for a consensus-cluster agent
//!
//! Palisade brings a gossip/consensus daemon from "not running" to "joined
//! and verified" and back down again, giving deployment automation
//! deterministic, retryable node bootstrap semantics instead of ad-hoc
//! shell scripting.
//!
//! # Architecture
//!
//! The core is the [`controller::Controller`] state machine: a
//! retry-bounded join/sync verification loop, a last-node synchronization
//! barrier, and the encryption-key/SSL precondition check. The
//! [`server::Server`] shell sequences config-file writing, agent boot,
//! RPC-client construction, and server configuration around it. Both run
//! single-threaded and blocking: one orchestration sequence per
//! invocation, no state surviving a crash.
//!
//! # Modules
//!
//! - [`controller`] - The boot/verify/configure/stop state machine
//! - [`server`] - Outer sequencing shell invoked by the deployment tool
//! - [`agent`] - Collaborator traits plus the process runner and HTTP client
//! - [`clock`] - Blocking delay abstraction pacing the retry loops
//! - [`config`] - Node and controller configuration
//! - [`files`] - Agent config and service-definition file writing
//! - [`timeout`] - Opaque deadline token for the agent's startup wait
//! - [`error`] - Error types for the orchestrator

#![deny(missing_docs)]

pub mod agent;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod files;
pub mod server;
pub mod timeout;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

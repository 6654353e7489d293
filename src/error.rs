//! Error types for the palisade orchestrator

use thiserror::Error;

/// Main error type for orchestration operations
///
/// Every collaborator (agent runner, control-plane client, RPC factory,
/// config writer) reports failures through this type, and the Controller
/// and Server propagate them to the caller unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Precondition violated before a step was attempted
    #[error("{0}")]
    Validation(String),

    /// Agent process supervision error
    #[error("agent runner error: {0}")]
    Runner(String),

    /// Control-plane call against the running agent failed
    #[error("agent client error: {0}")]
    Agent(String),

    /// RPC-client construction or session error
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Configuration load or write error
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an agent runner error with the given message
    pub fn runner(msg: impl Into<String>) -> Self {
        Self::Runner(msg.into())
    }

    /// Create an agent client error with the given message
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(msg.into())
    }

    /// Create an RPC error with the given message
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    /// Create a config error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The SSL precondition failure is raised locally with a fixed message;
    /// callers match on the full text, so it must not pick up a prefix.
    #[test]
    fn validation_errors_display_the_bare_message() {
        let err = Error::validation("encrypt keys cannot be empty if ssl is enabled");
        assert_eq!(
            err.to_string(),
            "encrypt keys cannot be empty if ssl is enabled"
        );
    }

    #[test]
    fn collaborator_errors_name_their_origin() {
        assert_eq!(
            Error::runner("spawn failed").to_string(),
            "agent runner error: spawn failed"
        );
        assert_eq!(
            Error::agent("members unreachable").to_string(),
            "agent client error: members unreachable"
        );
        assert_eq!(
            Error::rpc("connection refused").to_string(),
            "rpc error: connection refused"
        );
        assert_eq!(
            Error::config("missing node name").to_string(),
            "config error: missing node name"
        );
    }

    #[test]
    fn constructors_accept_both_str_and_string() {
        let name = "node-3";
        let err = Error::agent(format!("{} not found", name));
        assert!(err.to_string().contains("node-3"));

        match Error::validation("static") {
            Error::Validation(msg) => assert_eq!(msg, "static"),
            _ => panic!("expected Validation variant"),
        }
    }
}

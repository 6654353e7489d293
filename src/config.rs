//! Node and controller configuration
//!
//! A [`NodeConfig`] is loaded once per invocation from a JSON file written
//! by the deployment tool. It feeds the [`ControllerConfig`] that bounds
//! the verification loops and the file writer that renders the agent's
//! own configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

fn default_max_retries() -> u32 {
    10
}

fn default_sync_retry_delay_ms() -> u64 {
    1_000
}

/// Whether the node boots as a non-authoritative client or as a server
/// participating in consensus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Joins the cluster; only join verification is required
    Client,
    /// Participates in consensus; runs the sync barrier and key rotation
    Server,
}

/// A service the agent should advertise, rendered into a definition file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Service name
    pub name: String,
    /// Port the service listens on
    pub port: u16,
}

/// Retry bounds and key material for the Controller's state machine
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Bound on join/sync verification attempts (must be positive)
    pub max_retries: u32,
    /// Constant delay between verification attempts
    pub sync_retry_delay: Duration,
    /// Gossip encryption keyring, primary key first (may be empty)
    pub encrypt_keys: Vec<String>,
    /// When false, the key-rotation step requires a non-empty keyring
    pub ssl_disabled: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            sync_retry_delay: Duration::from_millis(default_sync_retry_delay_ms()),
            encrypt_keys: Vec::new(),
            ssl_disabled: false,
        }
    }
}

/// Per-node configuration for one orchestration invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Name this node registers with the cluster
    pub node_name: String,
    /// Boot mode
    pub mode: Mode,
    /// Path to the agent binary
    pub agent_binary: PathBuf,
    /// Extra arguments passed to the agent binary
    #[serde(default)]
    pub agent_args: Vec<String>,
    /// Directory the agent stores its state in
    pub data_dir: PathBuf,
    /// Directory the agent config and service definitions are written to
    pub config_dir: PathBuf,
    /// Number of nodes the deployment intends to boot
    pub expected_members: usize,
    /// Services to advertise
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
    /// Gossip encryption keyring, primary key first
    #[serde(default)]
    pub encrypt_keys: Vec<String>,
    /// Disable SSL (and with it the keyring requirement)
    #[serde(default)]
    pub ssl_disabled: bool,
    /// Bound on verification attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay between verification attempts, in milliseconds
    #[serde(default = "default_sync_retry_delay_ms")]
    pub sync_retry_delay_ms: u64,
}

impl NodeConfig {
    /// Load and validate a config file
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| Error::config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants that the rest of the orchestrator assumes
    pub fn validate(&self) -> Result<(), Error> {
        if self.node_name.is_empty() {
            return Err(Error::validation("node_name cannot be empty"));
        }
        if self.max_retries == 0 {
            return Err(Error::validation("max_retries must be positive"));
        }
        if self.expected_members == 0 {
            return Err(Error::validation("expected_members must be positive"));
        }
        Ok(())
    }

    /// Derive the Controller's retry bounds and key material
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            max_retries: self.max_retries,
            sync_retry_delay: Duration::from_millis(self.sync_retry_delay_ms),
            encrypt_keys: self.encrypt_keys.clone(),
            ssl_disabled: self.ssl_disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn minimal_json() -> serde_json::Value {
        serde_json::json!({
            "node_name": "node-1",
            "mode": "server",
            "agent_binary": "/usr/local/bin/agent",
            "data_dir": "/var/lib/agent",
            "config_dir": "/etc/agent",
            "expected_members": 3
        })
    }

    #[test]
    fn loads_a_minimal_config_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", minimal_json()).unwrap();

        let config = NodeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.node_name, "node-1");
        assert_eq!(config.mode, Mode::Server);
        assert_eq!(config.max_retries, 10);
        assert_eq!(config.sync_retry_delay_ms, 1_000);
        assert!(config.encrypt_keys.is_empty());
        assert!(!config.ssl_disabled);
    }

    #[test]
    fn rejects_zero_max_retries() {
        let mut json = minimal_json();
        json["max_retries"] = serde_json::json!(0);
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();

        let err = NodeConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("max_retries"));
    }

    #[test]
    fn rejects_an_empty_node_name() {
        let mut json = minimal_json();
        json["node_name"] = serde_json::json!("");
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();

        assert!(NodeConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = NodeConfig::from_file(Path::new("/nonexistent/node.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn controller_config_carries_keys_in_order() {
        let mut json = minimal_json();
        json["encrypt_keys"] = serde_json::json!(["first", "second"]);
        json["sync_retry_delay_ms"] = serde_json::json!(250);
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();

        let config = NodeConfig::from_file(file.path()).unwrap();
        let controller = config.controller_config();
        assert_eq!(controller.encrypt_keys, vec!["first", "second"]);
        assert_eq!(controller.sync_retry_delay, Duration::from_millis(250));
    }

    #[test]
    fn mode_round_trips_through_serde() {
        assert_eq!(
            serde_json::to_string(&Mode::Client).unwrap(),
            r#""client""#
        );
        assert_eq!(
            serde_json::from_str::<Mode>(r#""server""#).unwrap(),
            Mode::Server
        );
    }
}

//! HTTP control-plane client for the running agent
//!
//! Speaks to the agent's local HTTP API over the loopback interface. The
//! Controller only sees the [`AgentClient`] trait; endpoint paths and
//! response shapes are this module's concern alone.
//!
//! The same type backs the RPC-client factory: `Server` constructs a
//! fresh handle against the fixed control-plane endpoint for the
//! configure and stop paths.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::AgentClient;
use crate::Error;

/// Member status code reported by the agent for a live member
const STATUS_ALIVE: u32 = 1;

/// A cluster member as reported by the agent's members endpoint
#[derive(Debug, Clone, Deserialize)]
struct Member {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Status")]
    status: u32,
}

/// Control-plane client bound to one agent endpoint
pub struct HttpAgentClient {
    base_url: String,
    node_name: String,
    expected_members: usize,
    http: reqwest::blocking::Client,
}

impl HttpAgentClient {
    /// Construct a client for the agent listening at `endpoint`
    /// (a `host:port` pair, e.g. `localhost:8400`).
    ///
    /// `expected_members` is the number of nodes the deployment intends to
    /// boot; the last-node query compares the live member count against it.
    pub fn new(endpoint: &str, node_name: &str, expected_members: usize) -> Result<Self, Error> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::rpc(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            base_url: format!("http://{}", endpoint),
            node_name: node_name.to_string(),
            expected_members,
            http,
        })
    }

    fn members(&self) -> Result<Vec<Member>, Error> {
        let url = format!("{}/v1/agent/members", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| Error::agent(format!("members request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| Error::agent(format!("members request rejected: {}", e)))?;

        response
            .json()
            .map_err(|e| Error::agent(format!("malformed members response: {}", e)))
    }

    fn put(&self, path: &str, body: Option<serde_json::Value>) -> Result<(), Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.put(&url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        request
            .send()
            .map_err(|e| Error::agent(format!("{} request failed: {}", path, e)))?
            .error_for_status()
            .map_err(|e| Error::agent(format!("{} request rejected: {}", path, e)))?;
        Ok(())
    }
}

impl AgentClient for HttpAgentClient {
    fn verify_joined(&self) -> Result<(), Error> {
        let members = self.members()?;
        let joined = members
            .iter()
            .any(|m| m.name == self.node_name && m.status == STATUS_ALIVE);

        if joined {
            debug!(node = %self.node_name, members = members.len(), "Agent is joined");
            Ok(())
        } else {
            Err(Error::agent("agent has not joined the cluster"))
        }
    }

    fn verify_synced(&self) -> Result<(), Error> {
        let url = format!("{}/v1/status/leader", self.base_url);
        let leader: String = self
            .http
            .get(&url)
            .send()
            .map_err(|e| Error::agent(format!("leader request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| Error::agent(format!("leader request rejected: {}", e)))?
            .json()
            .map_err(|e| Error::agent(format!("malformed leader response: {}", e)))?;

        if leader.is_empty() {
            Err(Error::agent("cluster has not elected a leader"))
        } else {
            debug!(leader = %leader, "Cluster is synced");
            Ok(())
        }
    }

    fn is_last_node(&self) -> Result<bool, Error> {
        let members = self.members()?;
        let alive = members.iter().filter(|m| m.status == STATUS_ALIVE).count();
        debug!(alive, expected = self.expected_members, "Checked member count");
        Ok(alive >= self.expected_members)
    }

    fn set_keys(&self, keys: &[String]) -> Result<(), Error> {
        for key in keys {
            self.put("/v1/operator/keyring", Some(json!({ "Key": key })))?;
        }
        // The first key is the primary; the agent encrypts with it and
        // accepts the rest for decryption.
        if let Some(primary) = keys.first() {
            self.put("/v1/operator/keyring/use", Some(json!({ "Key": primary })))?;
        }
        Ok(())
    }

    fn leave(&self) -> Result<(), Error> {
        self.put("/v1/agent/leave", None)
    }
}

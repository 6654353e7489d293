//! Config-file rendering for the agent
//!
//! The deployment tool hands the orchestrator a [`NodeConfig`]; before the
//! agent boots, its own configuration and the service-definition files
//! must exist on disk. The Controller and Server only depend on the
//! [`ConfigWriter`] trait; content format is internal here.

use std::fs;

use serde_json::json;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::config::NodeConfig;
use crate::Error;

/// File-writing collaborator invoked at the start of `Server::start`
#[cfg_attr(test, automock)]
pub trait ConfigWriter: Send + Sync {
    /// Render the agent's own configuration file
    fn write_agent_config(&self) -> Result<(), Error>;

    /// Render one definition file per advertised service
    fn write_service_definitions(&self) -> Result<(), Error>;
}

/// Production writer that renders JSON files into the config directory
pub struct FsConfigWriter {
    config: NodeConfig,
}

impl FsConfigWriter {
    /// Create a writer for the given node configuration
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    fn write_json(&self, filename: &str, value: &serde_json::Value) -> Result<(), Error> {
        fs::create_dir_all(&self.config.config_dir).map_err(|e| {
            Error::config(format!(
                "failed to create {}: {}",
                self.config.config_dir.display(),
                e
            ))
        })?;

        let path = self.config.config_dir.join(filename);
        let contents = serde_json::to_string_pretty(value)
            .map_err(|e| Error::config(format!("failed to render {}: {}", filename, e)))?;
        fs::write(&path, contents)
            .map_err(|e| Error::config(format!("failed to write {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Wrote config file");
        Ok(())
    }
}

impl ConfigWriter for FsConfigWriter {
    fn write_agent_config(&self) -> Result<(), Error> {
        let config = &self.config;
        let agent_config = json!({
            "node_name": config.node_name,
            "server": config.mode == crate::config::Mode::Server,
            "data_dir": config.data_dir,
            "encrypt": config.encrypt_keys.first(),
            "verify_incoming": !config.ssl_disabled,
            "verify_outgoing": !config.ssl_disabled,
        });
        self.write_json("agent.json", &agent_config)
    }

    fn write_service_definitions(&self) -> Result<(), Error> {
        for service in &self.config.services {
            let definition = json!({
                "service": {
                    "name": service.name,
                    "port": service.port,
                }
            });
            self.write_json(&format!("service-{}.json", service.name), &definition)?;
        }
        Ok(())
    }
}

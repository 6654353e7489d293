//! Palisade - local lifecycle orchestrator for a consensus-cluster agent

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use palisade::agent::{AgentClient, HttpAgentClient, ProcessRunner};
use palisade::clock::SystemClock;
use palisade::config::NodeConfig;
use palisade::controller::Controller;
use palisade::files::FsConfigWriter;
use palisade::server::{RpcClientFactory, Server, RPC_ENDPOINT};
use palisade::timeout::Timeout;

/// Palisade - boot a consensus-cluster agent and verify it joined
#[derive(Parser, Debug)]
#[command(name = "palisade", version, about, long_about = None)]
struct Cli {
    /// Path to the node configuration file (JSON)
    #[arg(long, global = true, default_value = "/etc/palisade/node.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Boot the agent and drive it to "joined and verified"
    Start {
        /// Bound on the agent's blocking startup wait, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Gracefully leave the cluster and stop the agent
    Stop,
}

fn build_server(config: &NodeConfig) -> palisade::Result<Server> {
    let runner = ProcessRunner::new(config.agent_binary.clone(), config.agent_args.clone());
    let client = HttpAgentClient::new(RPC_ENDPOINT, &config.node_name, config.expected_members)?;

    let controller = Controller::new(
        Arc::new(runner),
        Arc::new(client),
        Arc::new(SystemClock),
        config.controller_config(),
    );

    let node_name = config.node_name.clone();
    let expected_members = config.expected_members;
    let rpc_factory: RpcClientFactory = Box::new(move |endpoint| {
        let handle = HttpAgentClient::new(endpoint, &node_name, expected_members)?;
        Ok(Box::new(handle) as Box<dyn AgentClient>)
    });

    let writer = FsConfigWriter::new(config.clone());

    Ok(Server::new(
        controller,
        Box::new(writer),
        rpc_factory,
        config.mode,
    ))
}

fn run(cli: Cli) -> palisade::Result<()> {
    let config = NodeConfig::from_file(&cli.config)?;
    let server = build_server(&config)?;

    match cli.command {
        Commands::Start { timeout_secs } => {
            let timeout = match timeout_secs {
                Some(secs) => Timeout::start(Duration::from_secs(secs)),
                None => Timeout::unbounded(),
            };
            server.start(&timeout)
        }
        Commands::Stop => server.stop(),
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("palisade=info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!(error = %err, "Orchestration failed");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palisade::config::Mode;

    #[test]
    fn cli_parses_start_with_a_timeout() {
        let cli = Cli::parse_from([
            "palisade",
            "start",
            "--timeout-secs",
            "55",
            "--config",
            "/tmp/node.json",
        ]);
        assert_eq!(cli.config, PathBuf::from("/tmp/node.json"));
        match cli.command {
            Commands::Start { timeout_secs } => assert_eq!(timeout_secs, Some(55)),
            _ => panic!("expected start"),
        }
    }

    #[test]
    fn cli_parses_stop_with_the_default_config_path() {
        let cli = Cli::parse_from(["palisade", "stop"]);
        assert_eq!(cli.config, PathBuf::from("/etc/palisade/node.json"));
        assert!(matches!(cli.command, Commands::Stop));
    }

    #[test]
    fn build_server_wires_a_valid_config() {
        let config = NodeConfig {
            node_name: "node-1".to_string(),
            mode: Mode::Server,
            agent_binary: PathBuf::from("/usr/local/bin/agent"),
            agent_args: vec![],
            data_dir: PathBuf::from("/var/lib/agent"),
            config_dir: PathBuf::from("/etc/agent"),
            expected_members: 3,
            services: vec![],
            encrypt_keys: vec![],
            ssl_disabled: true,
            max_retries: 5,
            sync_retry_delay_ms: 100,
        };
        assert!(build_server(&config).is_ok());
    }
}

//! Command-line configuration.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use corelib::RingConfig;
use tracing::debug;

use crate::commands::Command;
use crate::logging;

/// Consistent hash ring simulator.
#[derive(Debug, Parser)]
#[command(name = "ring-sim", version)]
pub struct CliConfig {
    /// Virtual nodes per physical node (overrides the config file)
    #[arg(long, global = true)]
    pub replicas: Option<usize>,

    /// Ring width in bits, 16..=64 (overrides the config file)
    #[arg(long, global = true)]
    pub hash_width: Option<u32>,

    /// JSON ring configuration, e.g. {"replicas": 150, "hash_width": 64}
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Resolve the ring configuration: defaults, then the JSON file, then
    /// explicit flags.
    pub fn ring_config(&self) -> anyhow::Result<RingConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                RingConfig::from_json(&raw)
                    .with_context(|| format!("invalid ring configuration in {}", path.display()))?
            }
            None => RingConfig::default(),
        };
        if let Some(replicas) = self.replicas {
            config.replicas = replicas;
        }
        if let Some(hash_width) = self.hash_width {
            config.hash_width = hash_width;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn run(&self) -> anyhow::Result<()> {
        logging::init(&self.log_level);
        let config = self.ring_config()?;
        debug!(?config, "resolved ring configuration");

        let result = self.command.execute(config)?;
        println!("{result}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = CliConfig::parse_from(["ring-sim", "--replicas", "150", "simulate"]);
        let config = cli.ring_config().unwrap();

        assert_eq!(config.replicas, 150);
        assert_eq!(config.hash_width, 64);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = CliConfig::parse_from([
            "ring-sim",
            "lookup",
            "--nodes",
            "a,b",
            "--hash-width",
            "32",
            "k1",
        ]);
        assert_eq!(cli.ring_config().unwrap().hash_width, 32);
        match cli.command {
            Command::Lookup { nodes, keys } => {
                assert_eq!(nodes, vec!["a", "b"]);
                assert_eq!(keys, vec!["k1"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cli = CliConfig::parse_from(["ring-sim", "--replicas", "0", "simulate"]);
        assert!(cli.ring_config().is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let path = std::env::temp_dir().join(format!("ring-sim-{}.json", std::process::id()));
        fs::write(&path, r#"{ "replicas": 40, "hash_width": 48 }"#).unwrap();

        let cli = CliConfig::parse_from([
            "ring-sim".to_string(),
            "--config".to_string(),
            path.display().to_string(),
            "--hash-width".to_string(),
            "56".to_string(),
            "simulate".to_string(),
        ]);
        let config = cli.ring_config().unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.replicas, 40);
        assert_eq!(config.hash_width, 56);
    }

    #[test]
    fn test_simulate_defaults() {
        let cli = CliConfig::parse_from(["ring-sim", "simulate"]);
        match cli.command {
            Command::Simulate {
                keys,
                nodes,
                add,
                remove,
            } => {
                assert_eq!(keys, 100_000);
                assert_eq!(nodes, vec!["Node_A", "Node_B", "Node_C"]);
                assert_eq!(add, "Node_D");
                assert_eq!(remove, "Node_A");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}

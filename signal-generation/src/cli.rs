// Command line interface for the trading-pipeline binary

use anyhow::Result;
use clap::{Parser, Subcommand};
use common::{create_config_template, save_config, PipelineConfig};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "trading-pipeline",
    about = "KOL + on-chain analysis into a single trading strategy"
)]
pub struct Cli {
    /// Defaults to `run`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the pipeline once and print the report.
    Run,
    /// Write the commented configuration template.
    InitConfig {
        #[arg(default_value = "pipeline.toml")]
        path: String,
    },
    /// Write the effective configuration (file + environment, without API keys).
    DumpConfig {
        #[arg(default_value = "pipeline.toml")]
        path: String,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

impl Command {
    /// Handle the config commands. Returns false for `Run`.
    pub fn write_config(&self, config: &PipelineConfig) -> Result<bool> {
        match self {
            Command::Run => Ok(false),
            Command::InitConfig { path } => {
                create_config_template(path)?;
                info!("📝 Wrote configuration template to {}", path);
                Ok(true)
            }
            Command::DumpConfig { path } => {
                save_config(config, path)?;
                info!("📝 Wrote effective configuration to {}", path);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::load_config;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        let argv = std::iter::once("trading-pipeline").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(|cli| cli.command())
    }

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("{}-{}.toml", name, std::process::id()))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse(&[]).unwrap(), Command::Run);
        assert_eq!(parse(&["run"]).unwrap(), Command::Run);
        assert_eq!(
            parse(&["init-config"]).unwrap(),
            Command::InitConfig { path: "pipeline.toml".into() }
        );
        assert_eq!(
            parse(&["dump-config", "/tmp/p.toml"]).unwrap(),
            Command::DumpConfig { path: "/tmp/p.toml".into() }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_input() {
        assert!(parse(&["backtest"]).is_err());
        assert!(parse(&["init-config", "a.toml", "b.toml"]).is_err());
    }

    #[test]
    fn test_run_writes_nothing() {
        assert!(!Command::Run.write_config(&PipelineConfig::default()).unwrap());
    }

    #[test]
    fn test_init_config_writes_loadable_template() {
        let path = temp_path("init-config");
        assert!(Command::InitConfig { path: path.clone() }
            .write_config(&PipelineConfig::default())
            .unwrap());

        let loaded = load_config(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, PipelineConfig::default());
    }

    #[test]
    fn test_dump_config_keeps_overrides_but_not_keys() {
        let path = temp_path("dump-config");
        let mut config = PipelineConfig::default();
        config.kol.hours = 24;
        config.llm.deepseek.api_key = Some("sk-secret".into());

        Command::DumpConfig { path: path.clone() }
            .write_config(&config)
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let loaded = load_config(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.kol.hours, 24);
        assert!(!written.contains("sk-secret"));
        assert_eq!(loaded.llm.deepseek.api_key, None);
    }
}

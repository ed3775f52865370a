//! Command-line interface.
//!
//! ```text
//! suiact actions
//! suiact extract MINT_NFT "mint a poem called Spring Poem ..."
//! suiact run SWAP_TOKEN "swap 1.5 SUI for USDC"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::actions::{ActionKind, diagnostic};
use crate::bootstrap::LogFormat;
use crate::config::Config;
use crate::intent::Extractor;
use crate::llm::HttpCompletionClient;
use crate::pipeline::{self, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "suiact", version, about = "Run natural-language Sui actions")]
pub struct Cli {
    /// TOML settings file layered over ~/.suiact/config.toml.
    #[arg(long, global = true, env = "SUIACT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List actions and whether the current config can run them.
    Actions,

    /// Extract and validate an intent without touching the chain.
    Extract {
        /// Action name or simile, e.g. MINT_NFT or swap_tokens.
        action: ActionKind,
        /// Free-text request.
        text: String,
    },

    /// Run the full pipeline and print the outcome as JSON.
    Run {
        action: ActionKind,
        text: String,
    },
}

/// Dispatch a parsed command. The exit code reflects the business outcome.
pub async fn run_command(command: Command, config: Config) -> anyhow::Result<ExitCode> {
    match command {
        Command::Actions => {
            list_actions(&config);
            Ok(ExitCode::SUCCESS)
        }
        Command::Extract { action, text } => extract(action, &text, &config).await,
        Command::Run { action, text } => run(action, &text, config).await,
    }
}

fn list_actions(config: &Config) {
    println!("Actions on {}", config.network.network);
    println!("==========\n");
    for action in ActionKind::ALL {
        let missing = action.missing_config(config);
        let status = if missing.is_empty() {
            "[ready]".to_string()
        } else {
            format!("[needs {}]", missing.join(", "))
        };
        println!("  {} {status}", action.name());
        println!("      {}", action.description());
        println!("      aliases: {}", action.similes().join(", "));
        if action.is_network_gated() && !config.swap.allows(config.network.network) {
            let allowed = config
                .swap
                .allowed_networks
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            println!("      only runs on: {allowed}");
        }
    }
}

async fn extract(action: ActionKind, text: &str, config: &Config) -> anyhow::Result<ExitCode> {
    let completion = HttpCompletionClient::from_config(&config.llm)?;
    let extractor = Extractor::new(Arc::new(completion), config.llm.timeout());

    match pipeline::extract_intent(&extractor, config, action, text).await {
        Ok(intent) => {
            println!("{}", serde_json::to_string_pretty(&intent.to_json())?);
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            let report = serde_json::json!({
                "message": diagnostic(&failure),
                "error": failure.to_error_payload(),
                "candidate": failure.intent(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(action: ActionKind, text: &str, config: Config) -> anyhow::Result<ExitCode> {
    let pipeline = Pipeline::from_config(config)?;
    let outcome = pipeline.run_to_outcome(action, text).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_simile_and_global_flags() {
        let cli = Cli::try_parse_from([
            "suiact",
            "run",
            "swap_tokens",
            "swap 1 SUI for USDC",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Command::Run { action, text } => {
                assert_eq!(action, ActionKind::SwapToken);
                assert_eq!(text, "swap 1 SUI for USDC");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_actions() {
        let err = Cli::try_parse_from(["suiact", "extract", "bridge", "text"]).unwrap_err();
        assert!(err.to_string().contains("unknown action"));
    }

    #[test]
    fn verifies_the_command_tree() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

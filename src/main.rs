use std::process::ExitCode;

use clap::Parser;

use suiact::bootstrap::init_tracing;
use suiact::cli::{Cli, run_command};
use suiact::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = Config::load(cli.config.as_deref())?;
    run_command(cli.command, config).await
}

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use wgctl::cli::commands::{self, Answer};
use wgctl::cli::{Cli, Commands};
use wgctl::platform::strategy_for;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string().to_lowercase()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let platform = cli.tools.platform();
    let tools = cli.tools.to_tool_config();
    tracing::debug!(%platform, ?tools, "Using WireGuard tools");
    let strategy = strategy_for(platform, tools);
    let strategy = strategy.as_ref();

    let result = match cli.command {
        Commands::Installed => commands::cmd_installed(strategy).await,
        Commands::Active => commands::cmd_active(strategy).await,
        Commands::Up { config } => commands::cmd_up(strategy, config).await.map(|_| Answer::Yes),
        Commands::Down { config } => {
            commands::cmd_down(strategy, config).await.map(|_| Answer::Yes)
        }
        Commands::Status { device } => commands::cmd_status(strategy, device).await,
        Commands::Genkey { offline } => {
            commands::cmd_genkey(strategy, offline).await.map(|_| Answer::Yes)
        }
        Commands::Pubkey {
            private_key,
            offline,
        } => commands::cmd_pubkey(strategy, private_key, offline)
            .await
            .map(|_| Answer::Yes),
        Commands::Check { config } => commands::cmd_check(config).map(|_| Answer::Yes),
    };

    match result {
        Ok(Answer::Yes) => {}
        Ok(Answer::No) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

mod command;
mod config;
mod terminal;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::info;
use wallet_flows::{EventListener, FlowEvent, WalletFlowsBuilder, default_storage};

use crate::{
    command::{Command, execute_command},
    config::Settings,
    terminal::{TerminalNavigator, terminal_platform},
};

#[derive(Parser)]
#[command(version, about = "Terminal driver for the wallet receive, onboarding and captcha flows", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

fn expand_path(path: &str) -> Result<PathBuf> {
    if let Some(stripped) = path.strip_prefix("~/") {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .join(stripped))
    } else {
        Ok(PathBuf::from(path))
    }
}

struct CliEventListener {}

#[async_trait::async_trait]
impl EventListener for CliEventListener {
    async fn on_event(&self, event: FlowEvent) {
        info!(
            "Event: {}",
            serde_json::to_string(&event)
                .unwrap_or_else(|_| "Failed to serialize event".to_string())
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let settings = cli.settings.resolve()?;

    let data_dir = expand_path(&settings.data_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    let data_dir = data_dir.to_string_lossy().to_string();
    wallet_flows::init_logging(&data_dir, None, settings.log_filter.clone())?;

    let navigator = Arc::new(TerminalNavigator::new());
    let flows = WalletFlowsBuilder::new(
        settings.flows_config(),
        default_storage(&data_dir)?,
        terminal_platform(navigator.clone()),
    )
    .with_auth_token(settings.auth_token.clone())
    .build()?;
    flows
        .add_event_listener(Box::new(CliEventListener {}))
        .await;

    info!("Running {:?}", cli.command);
    execute_command(cli.command, &flows, &navigator).await
}

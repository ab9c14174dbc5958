use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Subcommand;
use tokio::sync::watch;
use tracing::info;
use wallet_flows::{OnboardingStep, Route, StepContent, WalletFlows};

use crate::terminal::{TerminalCaptchaWidget, TerminalNavigator, read_line};

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Create an invoice, show it as a QR code and wait until it is paid
    Receive {
        /// Amount in sats. Anything that is not a non-negative number counts as 0
        #[arg(short, long, default_value = "0")]
        amount: String,

        /// Optional note attached to the invoice
        #[arg(short, long, default_value = "")]
        memo: String,
    },
    /// Walk through the welcome sequence and claim the reward
    Onboard,
    /// Print the onboarding progress
    Status,
    /// Register a captcha challenge and wait for the dialog result
    Captcha,
}

pub async fn execute_command(
    command: Command,
    flows: &WalletFlows,
    navigator: &TerminalNavigator,
) -> Result<()> {
    match command {
        Command::Receive { amount, memo } => receive(flows, navigator, &amount, &memo).await,
        Command::Onboard => onboard(flows, navigator).await,
        Command::Status => {
            let progress = flows.onboarding_progress().await?;
            println!("Onboarding: {progress:?}");
            println!("Initial screen: {}", progress.initial_route());
            Ok(())
        }
        Command::Captcha => captcha(flows).await,
    }
}

async fn wait_for_route(routes: &mut watch::Receiver<Option<Route>>, expected: &Route) -> Result<()> {
    tokio::select! {
        res = routes.wait_for(|route| route.as_ref() == Some(expected)) => {
            res.map_err(|e| anyhow!("Navigation closed: {e}"))?;
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => Err(anyhow!("Interrupted")),
    }
}

async fn receive(
    flows: &WalletFlows,
    navigator: &TerminalNavigator,
    amount: &str,
    memo: &str,
) -> Result<()> {
    let screen = flows.receive_bitcoin_screen();
    screen.set_memo(memo);
    let amount = screen.set_amount_input(amount);
    info!("Requesting invoice for {amount} sats");

    let Some(record) = screen.create_invoice().await? else {
        return Err(anyhow!("The backend returned an invalid invoice"));
    };

    let mut routes = navigator.subscribe();
    let show = flows.show_qr_code_screen(record);
    println!("{}\n", show.render_qr_code()?);
    println!("{}", show.caption());
    show.share_invoice().await;
    println!("Waiting for payment...");

    wait_for_route(&mut routes, &Route::Back).await?;
    show.unmount();
    Ok(())
}

fn print_step(content: Option<StepContent>, header: Option<String>) {
    let Some(content) = content else {
        return;
    };
    println!();
    println!("[{}]", content.image);
    if let Some(header) = header.or(content.header.map(str::to_string)) {
        println!("{header}");
    }
    println!("{}", content.text);
}

async fn onboard(flows: &WalletFlows, navigator: &TerminalNavigator) -> Result<()> {
    let mut step = OnboardingStep::Galoy;
    while step.is_static() {
        let screen = flows.static_step_screen(step)?;
        print_step(screen.content(), None);
        read_line("Press Enter to continue ").await?;
        match screen.next() {
            Route::Onboarding(next) => step = next,
            other => return Err(anyhow!("Unexpected route {other}")),
        }
    }
    println!("Phone verification happens in the app, continuing with the reward claim");

    let welcome_back = flows.welcome_back_completed_screen();
    print_step(welcome_back.content(), None);
    read_line("Press Enter to claim your reward ").await?;
    welcome_back.claim_reward().await?;

    let first_reward = flows.first_reward_screen();
    let mut balance = first_reward.subscribe();
    print_step(first_reward.content(), Some(first_reward.header()));
    let confirm = read_line("Press Enter once the reward arrived ");
    tokio::pin!(confirm);
    loop {
        tokio::select! {
            line = &mut confirm => {
                line?;
                break;
            }
            changed = balance.changed() => {
                changed?;
                println!("{}", first_reward.header());
            }
        }
    }
    first_reward.next();
    first_reward.unmount();

    let mut routes = navigator.subscribe();
    let all_done = flows.all_done_screen();
    print_step(all_done.content(), None);
    read_line("Press Enter to finish ").await?;
    all_done.finish().await?;
    wait_for_route(&mut routes, &Route::PrimaryStack).await
}

async fn captcha(flows: &WalletFlows) -> Result<()> {
    let controller = flows.captcha_controller(Arc::new(TerminalCaptchaWidget::new()));
    let mut state = controller.subscribe();
    controller.register_captcha().await?;

    let outcome = tokio::select! {
        res = state.wait_for(|s| s.geetest_validation_data.is_some() || s.geetest_error.is_some()) => {
            res?.clone()
        }
        _ = tokio::signal::ctrl_c() => return Err(anyhow!("Interrupted")),
    };
    controller.unmount();

    match (outcome.geetest_validation_data, outcome.geetest_error) {
        (Some(data), _) => {
            println!("Validated: {}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        (None, Some(error)) => Err(anyhow!("Captcha failed: {error}")),
        (None, None) => Err(anyhow!("Captcha finished without a result")),
    }
}

//! Terminal stand-ins for the device capabilities.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rustyline::{DefaultEditor, error::ReadlineError};
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, warn};
use wallet_flows::{
    Alert, CaptchaWidget, Clipboard, Dialogs, GEETEST_DIALOG_RESULT_EVENT, GEETEST_FAILED_EVENT,
    HapticFeedback, HapticOptions, Haptics, NativeEventEmitter, Navigator, Platform,
    PlatformError, Route, ShareOutcome, ShareSheet,
};

/// Prompts for one line on a blocking thread. End of input reads as an
/// empty line.
pub async fn read_line(prompt: &str) -> Result<String> {
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || {
        let mut rl = DefaultEditor::new()?;
        prompt_answer(rl.readline(&prompt))
    })
    .await?
}

fn prompt_answer(readline: Result<String, ReadlineError>) -> Result<String> {
    match readline {
        Ok(line) => Ok(line.trim().to_string()),
        Err(ReadlineError::Eof) => Ok(String::new()),
        Err(ReadlineError::Interrupted) => Err(anyhow!("Interrupted")),
        Err(e) => Err(e.into()),
    }
}

/// Prints navigation and keeps the latest route observable
pub struct TerminalNavigator {
    route: watch::Sender<Option<Route>>,
}

impl TerminalNavigator {
    pub fn new() -> Self {
        let (route, _) = watch::channel(None);
        Self { route }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Route>> {
        self.route.subscribe()
    }
}

impl Default for TerminalNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        println!("-> {route}");
        self.route.send_replace(Some(route));
    }
}

pub struct TerminalDialogs;

#[async_trait]
impl Dialogs for TerminalDialogs {
    async fn alert(&self, alert: Alert) {
        match &alert.title {
            Some(title) => println!("[{title}] {}", alert.message),
            None => println!("[!] {}", alert.message),
        }
        if let Err(e) = read_line("Press Enter to dismiss ").await {
            warn!("Failed to read dismissal: {e}");
        }
    }
}

pub struct TerminalHaptics;

impl Haptics for TerminalHaptics {
    fn trigger(&self, feedback: HapticFeedback, options: HapticOptions) {
        debug!("Haptic {feedback:?} with {options:?}");
        // Terminal bell
        print!("\x07");
    }
}

pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn set_string(&self, _text: String) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable(
            "No clipboard available in the terminal".to_string(),
        ))
    }
}

/// "Shares" by printing the message for the user to copy
pub struct TerminalShareSheet;

#[async_trait]
impl ShareSheet for TerminalShareSheet {
    async fn share(&self, message: String) -> Result<ShareOutcome, PlatformError> {
        println!("{message}");
        Ok(ShareOutcome::Shared {
            activity_type: Some("stdout".to_string()),
        })
    }
}

pub fn terminal_platform(navigator: Arc<TerminalNavigator>) -> Platform {
    Platform {
        navigator,
        dialogs: Arc::new(TerminalDialogs),
        haptics: Arc::new(TerminalHaptics),
        clipboard: Arc::new(TerminalClipboard),
        share_sheet: Arc::new(TerminalShareSheet),
    }
}

/// Verification widget driven from the terminal. The user solves the
/// challenge elsewhere and pastes the dialog result JSON; an empty line
/// reports the dialog as failed.
pub struct TerminalCaptchaWidget {
    events: Arc<NativeEventEmitter>,
}

impl TerminalCaptchaWidget {
    pub fn new() -> Self {
        Self {
            events: Arc::new(NativeEventEmitter::new()),
        }
    }
}

impl Default for TerminalCaptchaWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptchaWidget for TerminalCaptchaWidget {
    fn set_up(&self) {
        debug!("Captcha widget set up");
    }

    fn tear_down(&self) {
        debug!("Captcha widget torn down");
    }

    fn handle_registered_captcha(&self, params: String) {
        println!("Challenge parameters: {params}");
        let events = self.events.clone();
        tokio::spawn(async move {
            match read_line("Paste the dialog result JSON (empty to cancel): ").await {
                Ok(line) if !line.is_empty() => {
                    events.emit(GEETEST_DIALOG_RESULT_EVENT, &json!({ "result": line }));
                }
                Ok(_) => events.emit(GEETEST_FAILED_EVENT, &json!({ "error": "Dialog closed" })),
                Err(e) => events.emit(GEETEST_FAILED_EVENT, &json!({ "error": e.to_string() })),
            }
        });
    }

    fn events(&self) -> Arc<NativeEventEmitter> {
        self.events.clone()
    }
}

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use wallet_flows_common::invoice::DecodedInvoice;

use crate::{error::FlowError, onboarding::OnboardingStep};

/// Configuration shared by the flows and the remote services
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// GraphQL endpoint serving the captcha, invoice and balance operations
    pub graphql_url: String,
    /// Base URL of the HTTPS callable functions
    pub functions_url: String,
    /// Wallet user id sent along with invoice and balance requests
    pub uid: String,
    pub payment_poll_interval_secs: u64,
    pub balance_poll_interval_secs: u64,
    pub reward_amount_sats: u64,
    pub reward_memo: String,
}

pub fn default_config(graphql_url: String, functions_url: String) -> Config {
    Config {
        graphql_url,
        functions_url,
        uid: "1234".to_string(),
        payment_poll_interval_secs: 2,
        balance_poll_interval_secs: 1,
        reward_amount_sats: 6000,
        reward_memo: "Claimed Rewards".to_string(),
    }
}

impl Config {
    /// Rejects settings the background polls can't run with
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.payment_poll_interval_secs == 0 {
            return Err(FlowError::InvalidInput(
                "payment_poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.balance_poll_interval_secs == 0 {
            return Err(FlowError::InvalidInput(
                "balance_poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    // Screens mounted without a validated config poll at least once per second
    pub(crate) fn payment_poll_interval(&self) -> Duration {
        Duration::from_secs(self.payment_poll_interval_secs.max(1))
    }

    pub(crate) fn balance_poll_interval(&self) -> Duration {
        Duration::from_secs(self.balance_poll_interval_secs.max(1))
    }
}

/// Trait for receiving the log stream of the flows
pub trait Logger: Send + Sync {
    fn log(&self, l: LogEntry);
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub line: String,
    pub level: String,
}

/// Destinations the flows can navigate to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Invoice display screen, carrying what it needs to poll for payment
    ShowQrCode {
        invoice: String,
        amount: u64,
        hash: String,
    },
    Onboarding(OnboardingStep),
    PrimaryStack,
    /// Pop the current screen
    Back,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::ShowQrCode { .. } => "showQRCode",
            Route::Onboarding(step) => step.route_name(),
            Route::PrimaryStack => "primaryStack",
            Route::Back => "back",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Captcha
// ---------------------------------------------------------------------------

/// Challenge issued by the backend for the verification widget
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaChallenge {
    pub id: String,
    pub challenge_code: String,
    pub new_captcha: bool,
    pub failback_mode: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CaptchaErrorMessage {
    pub message: String,
}

/// Payload of the `captchaCreateChallenge` mutation
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CaptchaCreateChallengePayload {
    #[serde(default)]
    pub errors: Vec<CaptchaErrorMessage>,
    pub result: Option<CaptchaChallenge>,
}

/// Parameters forwarded to the native widget once a challenge is issued
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptchaRegistrationParams {
    pub success: u8,
    pub challenge: String,
    pub gt: String,
    pub new_captcha: bool,
}

impl From<&CaptchaChallenge> for CaptchaRegistrationParams {
    fn from(challenge: &CaptchaChallenge) -> Self {
        Self {
            success: u8::from(!challenge.failback_mode),
            challenge: challenge.challenge_code.clone(),
            gt: challenge.id.clone(),
            new_captcha: challenge.new_captcha,
        }
    }
}

/// Validation result produced by the widget after the user solved the challenge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptchaValidationData {
    pub geetest_challenge: String,
    pub geetest_sec_code: String,
    pub geetest_validate: String,
}

// ---------------------------------------------------------------------------
// Invoices and balances
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AddInvoiceRequest {
    pub amount_sats: u64,
    pub memo: String,
}

/// An invoice being displayed for payment. The hash can only come from
/// decoding the invoice itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvoiceRecord {
    invoice: String,
    payment_hash: String,
    amount_sats: u64,
}

impl InvoiceRecord {
    pub fn new(decoded: DecodedInvoice, amount_sats: u64) -> Self {
        Self {
            invoice: decoded.bolt11,
            payment_hash: decoded.payment_hash,
            amount_sats,
        }
    }

    pub fn invoice(&self) -> &str {
        &self.invoice
    }

    pub fn payment_hash(&self) -> &str {
        &self.payment_hash
    }

    pub fn amount_sats(&self) -> u64 {
        self.amount_sats
    }

    pub fn route(&self) -> Route {
        Route::ShowQrCode {
            invoice: self.invoice.clone(),
            amount: self.amount_sats,
            hash: self.payment_hash.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyType {
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "USD")]
    Usd,
}

impl fmt::Display for CurrencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyType::Btc => write!(f, "BTC"),
            CurrencyType::Usd => write!(f, "USD"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Bitcoin,
    Bank,
    All,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Bitcoin => write!(f, "Bitcoin"),
            AccountType::Bank => write!(f, "Bank"),
            AccountType::All => write!(f, "All"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub currency: CurrencyType,
    pub account: AccountType,
    pub amount: u64,
}

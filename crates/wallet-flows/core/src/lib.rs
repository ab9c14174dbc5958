mod captcha;
mod error;
mod events;
mod flows;
mod flows_builder;
mod logger;
mod models;
mod onboarding;
mod persist;
mod platform;
mod receive;
mod services;
#[cfg(test)]
mod test_utils;
mod utils;

pub use captcha::{
    CaptchaController, CaptchaState, GEETEST_DIALOG_RESULT_EVENT, GEETEST_FAILED_EVENT,
    GENERIC_ERROR_MESSAGE,
};
pub use error::{FlowError, PlatformError};
pub use events::{EventEmitter, EventListener, FlowEvent};
pub use flows::{WalletFlows, default_storage};
pub use flows_builder::WalletFlowsBuilder;
pub use logger::init_logging;
pub use models::*;
pub use onboarding::*;
pub use persist::{MemoryStorage, SqliteStorage, Storage, StorageError};
pub use platform::*;
pub use receive::*;
pub use services::{BalanceService, CaptchaService, InvoiceService, RemoteWalletService};
pub use wallet_flows_common::{
    error::{ServiceConnectivityError, ServiceError},
    invoice::{DecodedInvoice, InvoiceError, decode_invoice},
    rest::{ReqwestRestClient, RestClient},
};

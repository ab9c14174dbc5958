use std::{path::Path, sync::Arc};

use crate::{
    captcha::CaptchaController,
    error::FlowError,
    events::{EventEmitter, EventListener},
    models::{Config, InvoiceRecord, Route},
    onboarding::{
        AllDoneScreen, FirstRewardScreen, OnboardingProgress, OnboardingStep, StaticStepScreen,
        WelcomeBackCompletedScreen,
    },
    persist::{SqliteStorage, Storage},
    platform::{CaptchaWidget, Platform},
    receive::{ReceiveBitcoinScreen, ShowQrCodeScreen},
    services::{BalanceService, CaptchaService, InvoiceService},
};

/// Opens the `SQLite` storage kept in `data_dir`
pub fn default_storage(data_dir: &str) -> Result<Arc<dyn Storage>, FlowError> {
    Ok(Arc::new(SqliteStorage::new(Path::new(data_dir))?))
}

/// Entry point wiring the backend services, storage and device capabilities
/// into the individual screens. Every screen it hands out publishes its
/// [`crate::FlowEvent`]s to the listeners registered here.
pub struct WalletFlows {
    config: Config,
    storage: Arc<dyn Storage>,
    platform: Platform,
    captcha_service: Arc<dyn CaptchaService>,
    invoice_service: Arc<dyn InvoiceService>,
    balance_service: Arc<dyn BalanceService>,
    event_emitter: Arc<EventEmitter>,
}

impl WalletFlows {
    pub(crate) fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        platform: Platform,
        captcha_service: Arc<dyn CaptchaService>,
        invoice_service: Arc<dyn InvoiceService>,
        balance_service: Arc<dyn BalanceService>,
    ) -> Self {
        Self {
            config,
            storage,
            platform,
            captcha_service,
            invoice_service,
            balance_service,
            event_emitter: Arc::new(EventEmitter::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn add_event_listener(&self, listener: Box<dyn EventListener>) -> String {
        self.event_emitter.add_listener(listener).await
    }

    pub async fn remove_event_listener(&self, id: &str) -> bool {
        self.event_emitter.remove_listener(id).await
    }

    pub async fn onboarding_progress(&self) -> Result<OnboardingProgress, FlowError> {
        OnboardingProgress::load(self.storage.clone()).await
    }

    pub async fn initial_route(&self) -> Result<Route, FlowError> {
        Ok(self.onboarding_progress().await?.initial_route())
    }

    pub fn captcha_controller(&self, widget: Arc<dyn CaptchaWidget>) -> CaptchaController {
        CaptchaController::mount_with_event_emitter(
            self.captcha_service.clone(),
            widget,
            Some(self.event_emitter.clone()),
        )
    }

    pub fn receive_bitcoin_screen(&self) -> ReceiveBitcoinScreen {
        ReceiveBitcoinScreen::new(self.invoice_service.clone(), self.platform.clone())
            .with_event_emitter(self.event_emitter.clone())
    }

    pub fn show_qr_code_screen(&self, record: InvoiceRecord) -> ShowQrCodeScreen {
        ShowQrCodeScreen::mount_with_event_emitter(
            record,
            self.invoice_service.clone(),
            self.platform.clone(),
            &self.config,
            Some(self.event_emitter.clone()),
        )
    }

    pub fn static_step_screen(&self, step: OnboardingStep) -> Result<StaticStepScreen, FlowError> {
        StaticStepScreen::new(step, self.platform.navigator.clone())
    }

    pub fn welcome_back_completed_screen(&self) -> WelcomeBackCompletedScreen {
        WelcomeBackCompletedScreen::new(
            self.invoice_service.clone(),
            self.platform.clone(),
            &self.config,
        )
        .with_event_emitter(self.event_emitter.clone())
    }

    pub fn first_reward_screen(&self) -> FirstRewardScreen {
        FirstRewardScreen::mount_with_event_emitter(
            self.balance_service.clone(),
            self.platform.navigator.clone(),
            &self.config,
            Some(self.event_emitter.clone()),
        )
    }

    pub fn all_done_screen(&self) -> AllDoneScreen {
        AllDoneScreen::new(self.storage.clone(), self.platform.navigator.clone())
            .with_event_emitter(self.event_emitter.clone())
    }
}

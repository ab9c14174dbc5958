use std::{ops::ControlFlow, sync::Arc};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{OnboardingStep, StepContent};
use crate::{
    error::FlowError,
    events::{EventEmitter, FlowEvent},
    models::{AccountType, AddInvoiceRequest, BalanceSnapshot, Config, CurrencyType, Route},
    persist::{ObjectCacheRepository, Storage},
    platform::{Alert, Navigator, Platform},
    services::{BalanceService, InvoiceService},
    utils::{BackgroundTask, StateGuard},
};

pub const CLAIM_ERROR_TITLE: &str = "error";

/// A welcome step whose only action is moving on
pub struct StaticStepScreen {
    step: OnboardingStep,
    navigator: Arc<dyn Navigator>,
}

impl StaticStepScreen {
    pub fn new(step: OnboardingStep, navigator: Arc<dyn Navigator>) -> Result<Self, FlowError> {
        if !step.is_static() {
            return Err(FlowError::InvalidInput(format!(
                "{} is not a static step",
                step.route_name()
            )));
        }
        Ok(Self { step, navigator })
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn content(&self) -> Option<StepContent> {
        self.step.content()
    }

    pub fn next(&self) -> Route {
        // Static steps always have a successor
        let route = self.step.next().unwrap_or(Route::PrimaryStack);
        debug!("Onboarding {} -> {route}", self.step.route_name());
        self.navigator.navigate(route.clone());
        route
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimRewardState {
    pub loading: bool,
}

/// Shown after phone verification. Its action claims the welcome reward.
pub struct WelcomeBackCompletedScreen {
    invoice_service: Arc<dyn InvoiceService>,
    platform: Platform,
    reward_amount_sats: u64,
    reward_memo: String,
    event_emitter: Option<Arc<EventEmitter>>,
    state: watch::Sender<ClaimRewardState>,
}

impl WelcomeBackCompletedScreen {
    pub fn new(invoice_service: Arc<dyn InvoiceService>, platform: Platform, config: &Config) -> Self {
        let (state, _) = watch::channel(ClaimRewardState::default());
        Self {
            invoice_service,
            platform,
            reward_amount_sats: config.reward_amount_sats,
            reward_memo: config.reward_memo.clone(),
            event_emitter: None,
            state,
        }
    }

    #[must_use]
    pub fn with_event_emitter(mut self, event_emitter: Arc<EventEmitter>) -> Self {
        self.event_emitter = Some(event_emitter);
        self
    }

    pub fn content(&self) -> Option<StepContent> {
        OnboardingStep::WelcomeBackCompleted.content()
    }

    pub fn state(&self) -> ClaimRewardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClaimRewardState> {
        self.state.subscribe()
    }

    /// Creates the reward invoice, has the backend pay it, then moves on to
    /// the reward screen. A failure is shown to the user and returned once
    /// the alert is dismissed.
    pub async fn claim_reward(&self) -> Result<(), FlowError> {
        self.state.send_modify(|s| s.loading = true);
        let _loading = StateGuard::new(&self.state, |s| s.loading = false);

        match self.request_reward().await {
            Ok(()) => {
                info!("Reward of {} sats claimed", self.reward_amount_sats);
                self.state.send_modify(|s| s.loading = false);
                if let Some(emitter) = &self.event_emitter {
                    emitter.emit(&FlowEvent::RewardClaimed).await;
                }
                self.platform
                    .navigator
                    .navigate(Route::Onboarding(OnboardingStep::FirstReward));
                Ok(())
            }
            Err(e) => {
                error!("Failed to claim reward: {e}");
                self.platform
                    .dialogs
                    .alert(Alert::titled(CLAIM_ERROR_TITLE, e.to_string()))
                    .await;
                Err(e)
            }
        }
    }

    async fn request_reward(&self) -> Result<(), FlowError> {
        let invoice = self
            .invoice_service
            .add_invoice(AddInvoiceRequest {
                amount_sats: self.reward_amount_sats,
                memo: self.reward_memo.clone(),
            })
            .await?;
        let result = self.invoice_service.pay_invoice(invoice.clone()).await?;
        debug!("Paid reward invoice {invoice}: {result}");
        Ok(())
    }
}

/// Shows the balance while the reward lands, refreshed on a fixed cadence
/// until the screen is dropped
pub struct FirstRewardScreen {
    navigator: Arc<dyn Navigator>,
    balance: watch::Receiver<BalanceSnapshot>,
    _balance_poll: BackgroundTask,
}

impl FirstRewardScreen {
    pub fn mount(
        balance_service: Arc<dyn BalanceService>,
        navigator: Arc<dyn Navigator>,
        config: &Config,
    ) -> Self {
        Self::mount_with_event_emitter(balance_service, navigator, config, None)
    }

    pub fn mount_with_event_emitter(
        balance_service: Arc<dyn BalanceService>,
        navigator: Arc<dyn Navigator>,
        config: &Config,
        event_emitter: Option<Arc<EventEmitter>>,
    ) -> Self {
        let (balance_sender, balance) = watch::channel(BalanceSnapshot {
            currency: CurrencyType::Btc,
            account: AccountType::Bitcoin,
            amount: 0,
        });
        let balance_sender = Arc::new(balance_sender);
        let period = config.balance_poll_interval();

        let balance_poll = BackgroundTask::spawn_periodic("Balance poll", period, true, move || {
            let balance_service = balance_service.clone();
            let balance_sender = balance_sender.clone();
            let event_emitter = event_emitter.clone();
            async move {
                match balance_service
                    .fetch_balance(CurrencyType::Btc, AccountType::Bitcoin)
                    .await
                {
                    Ok(snapshot) => {
                        let changed = balance_sender.send_if_modified(|current| {
                            let changed = *current != snapshot;
                            *current = snapshot;
                            changed
                        });
                        if changed
                            && let Some(emitter) = event_emitter
                        {
                            emitter
                                .emit(&FlowEvent::BalanceUpdated {
                                    balance: snapshot.amount,
                                })
                                .await;
                        }
                    }
                    Err(e) => warn!("Failed to fetch balance: {e}"),
                }
                ControlFlow::Continue(())
            }
        });

        Self {
            navigator,
            balance,
            _balance_poll: balance_poll,
        }
    }

    pub fn content(&self) -> Option<StepContent> {
        OnboardingStep::FirstReward.content()
    }

    /// Latest on-chain wallet balance in sats
    pub fn balance(&self) -> u64 {
        self.balance.borrow().amount
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        *self.balance.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<BalanceSnapshot> {
        self.balance.clone()
    }

    pub fn header(&self) -> String {
        format!("+ {} sats", self.balance())
    }

    pub fn next(&self) {
        self.navigator
            .navigate(Route::Onboarding(OnboardingStep::AllDone));
    }

    pub fn unmount(self) {
        drop(self);
    }
}

/// Last welcome step. Finishing marks the user as onboarded.
pub struct AllDoneScreen {
    storage: Arc<dyn Storage>,
    navigator: Arc<dyn Navigator>,
    event_emitter: Option<Arc<EventEmitter>>,
}

impl AllDoneScreen {
    pub fn new(storage: Arc<dyn Storage>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            storage,
            navigator,
            event_emitter: None,
        }
    }

    #[must_use]
    pub fn with_event_emitter(mut self, event_emitter: Arc<EventEmitter>) -> Self {
        self.event_emitter = Some(event_emitter);
        self
    }

    pub fn content(&self) -> Option<StepContent> {
        OnboardingStep::AllDone.content()
    }

    pub async fn finish(&self) -> Result<(), FlowError> {
        ObjectCacheRepository::new(self.storage.clone())
            .mark_onboarded()
            .await?;
        info!("Onboarding completed");
        if let Some(emitter) = &self.event_emitter {
            emitter.emit(&FlowEvent::Onboarded).await;
        }
        self.navigator.navigate(Route::PrimaryStack);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::Duration,
    };

    use mockall::predicate::eq;
    use wallet_flows_common::error::ServiceError;

    use super::{
        AllDoneScreen, CLAIM_ERROR_TITLE, FirstRewardScreen, StaticStepScreen,
        WelcomeBackCompletedScreen,
    };
    use crate::{
        error::FlowError,
        models::{
            AccountType, AddInvoiceRequest, BalanceSnapshot, CurrencyType, Route, default_config,
        },
        onboarding::{OnboardingProgress, OnboardingStep},
        persist::{MemoryStorage, MockStorage, StorageError},
        services::{MockBalanceService, MockInvoiceService},
        test_utils::{RecordingDialogs, RecordingNavigator, TestPlatform},
    };

    fn config() -> crate::Config {
        default_config(String::new(), String::new())
    }

    #[test]
    fn test_static_steps_navigate_to_successor() {
        let navigator = Arc::new(RecordingNavigator::default());
        for (step, expected) in [
            (OnboardingStep::Galoy, OnboardingStep::Bank),
            (OnboardingStep::Bank, OnboardingStep::Bitcoin),
            (OnboardingStep::Bitcoin, OnboardingStep::Earn),
            (OnboardingStep::Earn, OnboardingStep::FirstSats),
            (OnboardingStep::FirstSats, OnboardingStep::PhoneInput),
        ] {
            let screen = StaticStepScreen::new(step, navigator.clone()).unwrap();
            assert_eq!(screen.next(), Route::Onboarding(expected));
        }
        assert_eq!(navigator.routes().len(), 5);
        assert_eq!(
            navigator.routes().last(),
            Some(&Route::Onboarding(OnboardingStep::PhoneInput))
        );
    }

    #[test]
    fn test_action_steps_are_not_static() {
        let navigator = Arc::new(RecordingNavigator::default());
        assert!(matches!(
            StaticStepScreen::new(OnboardingStep::AllDone, navigator),
            Err(FlowError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_claim_reward_pays_and_navigates() {
        let mut service = MockInvoiceService::new();
        service
            .expect_add_invoice()
            .with(eq(AddInvoiceRequest {
                amount_sats: 6000,
                memo: "Claimed Rewards".to_string(),
            }))
            .times(1)
            .returning(|_| Ok("lnbc6000".to_string()));
        service
            .expect_pay_invoice()
            .with(eq("lnbc6000".to_string()))
            .times(1)
            .returning(|_| Ok(serde_json::json!({"status": "ok"})));
        let platform = TestPlatform::new();
        let screen = WelcomeBackCompletedScreen::new(Arc::new(service), platform.platform(), &config());

        screen.claim_reward().await.unwrap();

        assert_eq!(
            platform.navigator.routes(),
            vec![Route::Onboarding(OnboardingStep::FirstReward)]
        );
        assert!(platform.dialogs.alerts().is_empty());
        assert!(!screen.state().loading);
    }

    #[tokio::test]
    async fn test_claim_reward_failure_alerts_and_resets_after_dismissal() {
        let mut service = MockInvoiceService::new();
        service
            .expect_add_invoice()
            .times(1)
            .returning(|_| Ok("lnbc6000".to_string()));
        service
            .expect_pay_invoice()
            .times(1)
            .returning(|_| Err(ServiceError::GraphQL("insufficient funds".to_string())));
        let platform = TestPlatform::with_dialogs(RecordingDialogs::with_manual_dismiss());
        let screen = Arc::new(WelcomeBackCompletedScreen::new(
            Arc::new(service),
            platform.platform(),
            &config(),
        ));

        let claim = tokio::spawn({
            let screen = screen.clone();
            async move { screen.claim_reward().await }
        });
        while platform.dialogs.alerts().is_empty() {
            tokio::task::yield_now().await;
        }

        // Still loading while the alert is up
        assert!(screen.state().loading);
        let alert = &platform.dialogs.alerts()[0];
        assert_eq!(alert.title.as_deref(), Some(CLAIM_ERROR_TITLE));
        assert!(alert.message.contains("insufficient funds"));

        platform.dialogs.dismiss();
        let res = claim.await.unwrap();

        assert!(matches!(res, Err(FlowError::ServiceError(_))));
        assert!(!screen.state().loading);
        assert!(platform.navigator.routes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_reward_polls_every_second_until_unmount() {
        let calls = Arc::new(AtomicU64::new(0));
        let c = calls.clone();
        let mut service = MockBalanceService::new();
        service
            .expect_fetch_balance()
            .with(eq(CurrencyType::Btc), eq(AccountType::Bitcoin))
            .returning(move |currency, account| {
                Ok(BalanceSnapshot {
                    currency,
                    account,
                    amount: c.fetch_add(1, Ordering::SeqCst) * 1000,
                })
            });
        let navigator = Arc::new(RecordingNavigator::default());
        let screen = FirstRewardScreen::mount(Arc::new(service), navigator.clone(), &config());

        // Immediate fetch
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(screen.header(), "+ 0 sats");

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(screen.balance(), 3000);
        assert_eq!(
            screen.snapshot(),
            BalanceSnapshot {
                currency: CurrencyType::Btc,
                account: AccountType::Bitcoin,
                amount: 3000,
            }
        );
        assert_eq!(screen.header(), "+ 3000 sats");

        screen.next();
        assert_eq!(
            navigator.routes(),
            vec![Route::Onboarding(OnboardingStep::AllDone)]
        );

        screen.unmount();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_reward_zero_interval_still_polls() {
        let calls = Arc::new(AtomicU64::new(0));
        let c = calls.clone();
        let mut service = MockBalanceService::new();
        service.expect_fetch_balance().returning(move |currency, account| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(BalanceSnapshot {
                currency,
                account,
                amount: 6000,
            })
        });
        let mut config = config();
        config.balance_poll_interval_secs = 0;
        let navigator = Arc::new(RecordingNavigator::default());
        let screen = FirstRewardScreen::mount(Arc::new(service), navigator, &config);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(screen.balance(), 6000);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_reward_keeps_last_balance_on_failure() {
        let calls = Arc::new(AtomicU64::new(0));
        let c = calls.clone();
        let mut service = MockBalanceService::new();
        service.expect_fetch_balance().returning(move |currency, account| {
            if c.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(BalanceSnapshot {
                    currency,
                    account,
                    amount: 6000,
                })
            } else {
                Err(ServiceError::GraphQL("unavailable".to_string()))
            }
        });
        let navigator = Arc::new(RecordingNavigator::default());
        let screen = FirstRewardScreen::mount(Arc::new(service), navigator, &config());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(screen.balance(), 6000);
    }

    #[tokio::test]
    async fn test_all_done_persists_marker_once_per_call() {
        let mut storage = MockStorage::new();
        storage
            .expect_set_cached_item()
            .with(eq("onboarding".to_string()), eq("onboarded".to_string()))
            .times(2)
            .returning(|_, _| Ok(()));
        let navigator = Arc::new(RecordingNavigator::default());
        let screen = AllDoneScreen::new(Arc::new(storage), navigator.clone());

        screen.finish().await.unwrap();
        screen.finish().await.unwrap();

        assert_eq!(
            navigator.routes(),
            vec![Route::PrimaryStack, Route::PrimaryStack]
        );
    }

    #[tokio::test]
    async fn test_all_done_never_clears_marker() {
        let mut storage = MockStorage::new();
        storage.expect_delete_cached_item().never();
        storage
            .expect_set_cached_item()
            .times(1)
            .returning(|_, _| Ok(()));
        storage
            .expect_get_cached_item()
            .returning(|_| Ok(Some("onboarded".to_string())));
        let storage = Arc::new(storage);
        let navigator = Arc::new(RecordingNavigator::default());

        AllDoneScreen::new(storage.clone(), navigator)
            .finish()
            .await
            .unwrap();
        assert_eq!(
            OnboardingProgress::load(storage).await.unwrap(),
            OnboardingProgress::Onboarded
        );
    }

    #[tokio::test]
    async fn test_all_done_marks_onboarded() {
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(RecordingNavigator::default());
        AllDoneScreen::new(storage.clone(), navigator)
            .finish()
            .await
            .unwrap();

        assert_eq!(
            OnboardingProgress::load(storage).await.unwrap(),
            OnboardingProgress::Onboarded
        );
    }

    #[tokio::test]
    async fn test_all_done_storage_failure_does_not_navigate() {
        let mut storage = MockStorage::new();
        storage
            .expect_set_cached_item()
            .returning(|_, _| Err(StorageError::Implementation("disk full".to_string())));
        let navigator = Arc::new(RecordingNavigator::default());
        let screen = AllDoneScreen::new(Arc::new(storage), navigator.clone());

        assert!(matches!(
            screen.finish().await,
            Err(FlowError::StorageError(_))
        ));
        assert!(navigator.routes().is_empty());
    }
}

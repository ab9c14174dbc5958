use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::{
    error::PlatformError,
    models::Route,
    platform::{
        Alert, CaptchaWidget, Clipboard, Dialogs, HapticFeedback, HapticOptions, Haptics,
        NativeEventEmitter, Navigator, Platform, ShareOutcome, ShareSheet,
    },
};

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    pub(crate) routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub(crate) fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

/// Records alerts. Alerts are dismissed right away unless a dismiss gate is
/// set, in which case each alert waits for [`RecordingDialogs::dismiss`].
#[derive(Default)]
pub(crate) struct RecordingDialogs {
    alerts: Mutex<Vec<Alert>>,
    dismiss_gate: Option<Notify>,
}

impl RecordingDialogs {
    pub(crate) fn with_manual_dismiss() -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            dismiss_gate: Some(Notify::new()),
        }
    }

    pub(crate) fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }

    pub(crate) fn dismiss(&self) {
        if let Some(gate) = &self.dismiss_gate {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl Dialogs for RecordingDialogs {
    async fn alert(&self, alert: Alert) {
        self.alerts.lock().unwrap().push(alert);
        if let Some(gate) = &self.dismiss_gate {
            gate.notified().await;
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingHaptics {
    pub(crate) triggers: Mutex<Vec<(HapticFeedback, HapticOptions)>>,
}

impl RecordingHaptics {
    pub(crate) fn triggers(&self) -> Vec<(HapticFeedback, HapticOptions)> {
        self.triggers.lock().unwrap().clone()
    }
}

impl Haptics for RecordingHaptics {
    fn trigger(&self, feedback: HapticFeedback, options: HapticOptions) {
        self.triggers.lock().unwrap().push((feedback, options));
    }
}

#[derive(Default)]
pub(crate) struct RecordingClipboard {
    pub(crate) contents: Mutex<Vec<String>>,
}

impl Clipboard for RecordingClipboard {
    fn set_string(&self, text: String) -> Result<(), PlatformError> {
        self.contents.lock().unwrap().push(text);
        Ok(())
    }
}

pub(crate) struct FakeShareSheet {
    pub(crate) shared: Mutex<Vec<String>>,
    pub(crate) outcome: Result<ShareOutcome, PlatformError>,
}

impl Default for FakeShareSheet {
    fn default() -> Self {
        Self {
            shared: Mutex::new(Vec::new()),
            outcome: Ok(ShareOutcome::Shared {
                activity_type: None,
            }),
        }
    }
}

#[async_trait]
impl ShareSheet for FakeShareSheet {
    async fn share(&self, message: String) -> Result<ShareOutcome, PlatformError> {
        self.shared.lock().unwrap().push(message);
        self.outcome.clone()
    }
}

/// Recording implementations of every device capability
pub(crate) struct TestPlatform {
    pub(crate) navigator: Arc<RecordingNavigator>,
    pub(crate) dialogs: Arc<RecordingDialogs>,
    pub(crate) haptics: Arc<RecordingHaptics>,
    pub(crate) clipboard: Arc<RecordingClipboard>,
    pub(crate) share_sheet: Arc<FakeShareSheet>,
}

impl TestPlatform {
    pub(crate) fn new() -> Self {
        Self::with_dialogs(RecordingDialogs::default())
    }

    pub(crate) fn with_dialogs(dialogs: RecordingDialogs) -> Self {
        Self::build(dialogs, FakeShareSheet::default())
    }

    pub(crate) fn with_share_sheet(share_sheet: FakeShareSheet) -> Self {
        Self::build(RecordingDialogs::default(), share_sheet)
    }

    fn build(dialogs: RecordingDialogs, share_sheet: FakeShareSheet) -> Self {
        Self {
            navigator: Arc::new(RecordingNavigator::default()),
            dialogs: Arc::new(dialogs),
            haptics: Arc::new(RecordingHaptics::default()),
            clipboard: Arc::new(RecordingClipboard::default()),
            share_sheet: Arc::new(share_sheet),
        }
    }

    pub(crate) fn platform(&self) -> Platform {
        Platform {
            navigator: self.navigator.clone(),
            dialogs: self.dialogs.clone(),
            haptics: self.haptics.clone(),
            clipboard: self.clipboard.clone(),
            share_sheet: self.share_sheet.clone(),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeCaptchaWidget {
    pub(crate) events: Arc<NativeEventEmitter>,
    pub(crate) set_up_calls: Mutex<u32>,
    pub(crate) tear_down_calls: Mutex<u32>,
    pub(crate) registrations: Mutex<Vec<String>>,
}

impl FakeCaptchaWidget {
    pub(crate) fn set_up_calls(&self) -> u32 {
        *self.set_up_calls.lock().unwrap()
    }

    pub(crate) fn tear_down_calls(&self) -> u32 {
        *self.tear_down_calls.lock().unwrap()
    }

    pub(crate) fn registrations(&self) -> Vec<String> {
        self.registrations.lock().unwrap().clone()
    }
}

impl CaptchaWidget for FakeCaptchaWidget {
    fn set_up(&self) {
        *self.set_up_calls.lock().unwrap() += 1;
    }

    fn tear_down(&self) {
        *self.tear_down_calls.lock().unwrap() += 1;
    }

    fn handle_registered_captcha(&self, params: String) {
        self.registrations.lock().unwrap().push(params);
    }

    fn events(&self) -> Arc<NativeEventEmitter> {
        self.events.clone()
    }
}

//! Registration controller for the native verification widget.
//!
//! Mounting sets the widget up and listens for its dialog result and failure
//! events. `register_captcha` fetches a challenge and hands it to the widget;
//! the outcome arrives later as one of those events.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    error::FlowError,
    events::{EventEmitter, FlowEvent},
    models::{CaptchaRegistrationParams, CaptchaValidationData},
    platform::{CaptchaWidget, EventSubscription},
    services::CaptchaService,
    utils::StateGuard,
};

pub const GEETEST_DIALOG_RESULT_EVENT: &str = "GT3-->onDialogResult-->";
pub const GEETEST_FAILED_EVENT: &str = "GT3-->onFailed-->";
pub const GENERIC_ERROR_MESSAGE: &str = "There was an error.\nPlease try again later.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptchaState {
    pub geetest_error: Option<String>,
    pub geetest_validation_data: Option<CaptchaValidationData>,
    pub loading_register_captcha: bool,
}

/// Inner JSON of the dialog result event
#[derive(Deserialize)]
struct DialogResult {
    geetest_challenge: String,
    geetest_seccode: String,
    geetest_validate: String,
}

impl From<DialogResult> for CaptchaValidationData {
    fn from(result: DialogResult) -> Self {
        Self {
            geetest_challenge: result.geetest_challenge,
            geetest_sec_code: result.geetest_seccode,
            geetest_validate: result.geetest_validate,
        }
    }
}

fn parse_dialog_result(payload: &serde_json::Value) -> Result<CaptchaValidationData, FlowError> {
    let result = payload
        .get("result")
        .ok_or_else(|| FlowError::InvalidInput("Dialog result is missing".to_string()))?;
    let parsed: DialogResult = match result {
        serde_json::Value::String(raw) => serde_json::from_str(raw)?,
        other => serde_json::from_value(other.clone())?,
    };
    Ok(parsed.into())
}

fn failure_message(payload: &serde_json::Value) -> String {
    match payload.get("error") {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(serde_json::Value::Null) | None => GENERIC_ERROR_MESSAGE.to_string(),
        Some(other) => other.to_string(),
    }
}

pub struct CaptchaController {
    service: Arc<dyn CaptchaService>,
    widget: Arc<dyn CaptchaWidget>,
    state: Arc<watch::Sender<CaptchaState>>,
    subscriptions: Vec<EventSubscription>,
}

impl CaptchaController {
    pub fn mount(service: Arc<dyn CaptchaService>, widget: Arc<dyn CaptchaWidget>) -> Self {
        Self::mount_with_event_emitter(service, widget, None)
    }

    /// Mounts the controller, additionally publishing
    /// [`FlowEvent::CaptchaValidated`] on `event_emitter`
    pub fn mount_with_event_emitter(
        service: Arc<dyn CaptchaService>,
        widget: Arc<dyn CaptchaWidget>,
        event_emitter: Option<Arc<EventEmitter>>,
    ) -> Self {
        let (state, _) = watch::channel(CaptchaState::default());
        let state = Arc::new(state);

        widget.set_up();
        let events = widget.events();

        let result_state = state.clone();
        let on_result = events.add_listener(GEETEST_DIALOG_RESULT_EVENT, move |payload| {
            match parse_dialog_result(payload) {
                Ok(data) => {
                    info!("Captcha dialog completed");
                    result_state.send_modify(|s| s.geetest_validation_data = Some(data));
                    emit_validated(event_emitter.as_ref());
                }
                Err(e) => {
                    warn!("Could not parse captcha dialog result: {e}");
                    result_state.send_modify(|s| s.geetest_error = Some(e.to_string()));
                }
            }
        });

        let failed_state = state.clone();
        let on_failed = events.add_listener(GEETEST_FAILED_EVENT, move |payload| {
            let message = failure_message(payload);
            warn!("Captcha dialog failed: {message}");
            failed_state.send_modify(|s| s.geetest_error = Some(message));
        });

        Self {
            service,
            widget,
            state,
            subscriptions: vec![on_result, on_failed],
        }
    }

    /// Requests a new challenge and forwards it to the widget
    pub async fn register_captcha(&self) -> Result<(), FlowError> {
        self.state
            .send_modify(|s| s.loading_register_captcha = true);
        let _loading = StateGuard::new(&self.state, |s| s.loading_register_captcha = false);

        let payload = match self.service.create_challenge().await {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to create captcha challenge: {e}");
                let message = e.to_string();
                self.state.send_modify(|s| s.geetest_error = Some(message));
                return Err(e.into());
            }
        };

        if let Some(first) = payload.errors.first() {
            debug!("Captcha challenge rejected: {}", first.message);
            let message = first.message.clone();
            self.state.send_modify(|s| s.geetest_error = Some(message));
        } else if let Some(result) = payload.result {
            let params = serde_json::to_string(&CaptchaRegistrationParams::from(&result))?;
            debug!("Forwarding captcha challenge to widget");
            self.widget.handle_registered_captcha(params);
        } else {
            self.state
                .send_modify(|s| s.geetest_error = Some(GENERIC_ERROR_MESSAGE.to_string()));
        }
        Ok(())
    }

    pub fn reset_error(&self) {
        self.state.send_modify(|s| s.geetest_error = None);
    }

    pub fn reset_validation_data(&self) {
        self.state.send_modify(|s| s.geetest_validation_data = None);
    }

    pub fn state(&self) -> CaptchaState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CaptchaState> {
        self.state.subscribe()
    }

    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for CaptchaController {
    fn drop(&mut self) {
        self.widget.tear_down();
        self.subscriptions.clear();
    }
}

fn emit_validated(event_emitter: Option<&Arc<EventEmitter>>) {
    let Some(emitter) = event_emitter else {
        return;
    };
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            let emitter = emitter.clone();
            handle.spawn(async move { emitter.emit(&FlowEvent::CaptchaValidated).await });
        }
        Err(_) => debug!("No runtime available, skipping CaptchaValidated event"),
    }
}

//! Device capabilities the flows drive. The host application supplies the
//! implementations; the flows only depend on these traits.

use std::{
    collections::BTreeMap,
    sync::{
        Arc, PoisonError, RwLock, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use tracing::trace;
use uuid::Uuid;

use crate::{error::PlatformError, models::Route};

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Modal alert shown to the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub title: Option<String>,
    pub message: String,
}

impl Alert {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: None,
            message: message.into(),
        }
    }

    pub fn titled(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait Dialogs: Send + Sync {
    /// Shows `alert` and resolves once the user dismissed it
    async fn alert(&self, alert: Alert);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HapticFeedback {
    NotificationSuccess,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HapticOptions {
    pub enable_vibrate_fallback: bool,
    pub ignore_android_system_settings: bool,
}

pub trait Haptics: Send + Sync {
    fn trigger(&self, feedback: HapticFeedback, options: HapticOptions);
}

pub trait Clipboard: Send + Sync {
    fn set_string(&self, text: String) -> Result<(), PlatformError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared { activity_type: Option<String> },
    Dismissed,
}

#[async_trait]
pub trait ShareSheet: Send + Sync {
    async fn share(&self, message: String) -> Result<ShareOutcome, PlatformError>;
}

/// The capabilities a screen may use
#[derive(Clone)]
pub struct Platform {
    pub navigator: Arc<dyn Navigator>,
    pub dialogs: Arc<dyn Dialogs>,
    pub haptics: Arc<dyn Haptics>,
    pub clipboard: Arc<dyn Clipboard>,
    pub share_sheet: Arc<dyn ShareSheet>,
}

/// The native verification widget
pub trait CaptchaWidget: Send + Sync {
    fn set_up(&self);
    fn tear_down(&self);
    /// Hands the serialized registration parameters to the widget, which
    /// then presents its challenge dialog
    fn handle_registered_captcha(&self, params: String);
    /// Emitter the widget publishes its named events on
    fn events(&self) -> Arc<NativeEventEmitter>;
}

type NativeListener = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

struct RegisteredListener {
    event_name: String,
    callback: NativeListener,
}

type ListenerRegistry = RwLock<BTreeMap<String, RegisteredListener>>;

/// Named event channel from a native module to its subscribers
pub struct NativeEventEmitter {
    listener_index: AtomicU64,
    listeners: Arc<ListenerRegistry>,
}

impl NativeEventEmitter {
    pub fn new() -> Self {
        Self {
            listener_index: AtomicU64::new(0),
            listeners: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Subscribes `callback` to `event_name`. The listener stays registered
    /// until the returned subscription is removed or dropped.
    pub fn add_listener<F>(&self, event_name: &str, callback: F) -> EventSubscription
    where
        F: Fn(&serde_json::Value) + Send + Sync + 'static,
    {
        let index = self.listener_index.fetch_add(1, Ordering::Relaxed);
        let id = format!("listener_{}-{}", index, Uuid::new_v4());
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id.clone(),
                RegisteredListener {
                    event_name: event_name.to_string(),
                    callback: Arc::new(callback),
                },
            );
        EventSubscription {
            id,
            registry: Arc::downgrade(&self.listeners),
        }
    }

    /// Delivers `payload` to every listener of `event_name`
    pub fn emit(&self, event_name: &str, payload: &serde_json::Value) {
        // Listeners run outside the lock so they may remove subscriptions
        let callbacks: Vec<NativeListener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|l| l.event_name == event_name)
            .map(|l| l.callback.clone())
            .collect();
        trace!("Emitting {event_name} to {} listeners", callbacks.len());
        for callback in callbacks {
            callback(payload);
        }
    }

    pub fn listener_count(&self, event_name: &str) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|l| l.event_name == event_name)
            .count()
    }
}

impl Default for NativeEventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered native listener, removed on drop
pub struct EventSubscription {
    id: String,
    registry: Weak<ListenerRegistry>,
}

impl EventSubscription {
    pub fn remove(self) {
        drop(self);
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
        }
    }
}

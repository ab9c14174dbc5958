use core::fmt;
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Events emitted by the flows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FlowEvent {
    /// A receive invoice was created and decoded
    InvoiceCreated { invoice: String },
    /// The backend reported the displayed invoice as settled
    InvoicePaid { payment_hash: String },
    RewardClaimed,
    BalanceUpdated { balance: u64 },
    /// The onboarding marker was persisted
    Onboarded,
    CaptchaValidated,
}

impl fmt::Display for FlowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowEvent::InvoiceCreated { invoice } => write!(f, "InvoiceCreated: {invoice}"),
            FlowEvent::InvoicePaid { payment_hash } => write!(f, "InvoicePaid: {payment_hash}"),
            FlowEvent::RewardClaimed => write!(f, "RewardClaimed"),
            FlowEvent::BalanceUpdated { balance } => write!(f, "BalanceUpdated: {balance}"),
            FlowEvent::Onboarded => write!(f, "Onboarded"),
            FlowEvent::CaptchaValidated => write!(f, "CaptchaValidated"),
        }
    }
}

/// Trait for event listeners
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Called when an event occurs
    async fn on_event(&self, event: FlowEvent);
}

/// Event publisher that manages event listeners
pub struct EventEmitter {
    listener_index: AtomicU64,
    listeners: RwLock<BTreeMap<String, Box<dyn EventListener>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self {
            listener_index: AtomicU64::new(0),
            listeners: RwLock::new(BTreeMap::new()),
        }
    }

    /// Add a listener to receive events
    ///
    /// # Returns
    ///
    /// A unique identifier for the listener, which can be used to remove it later
    pub async fn add_listener(&self, listener: Box<dyn EventListener>) -> String {
        let index = self.listener_index.fetch_add(1, Ordering::Relaxed);
        let id = format!("listener_{}-{}", index, Uuid::new_v4());
        let mut listeners = self.listeners.write().await;
        listeners.insert(id.clone(), listener);
        id
    }

    /// Remove a listener by its ID. Returns `true` if the listener was found and removed.
    pub async fn remove_listener(&self, id: &str) -> bool {
        let mut listeners = self.listeners.write().await;
        listeners.remove(id).is_some()
    }

    /// Emit an event to all registered listeners
    pub async fn emit(&self, event: &FlowEvent) {
        let listeners = self.listeners.read().await;
        for listener in listeners.values() {
            listener.on_event(event.clone()).await;
        }
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

use std::{ops::ControlFlow, sync::Arc};

use qrcode_rs::{EcLevel, QrCode, render::unicode};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::FlowError,
    events::{EventEmitter, FlowEvent},
    models::{Config, InvoiceRecord, Route},
    platform::{Alert, HapticFeedback, HapticOptions, Platform, ShareOutcome},
    services::InvoiceService,
    utils::BackgroundTask,
};

pub const INVOICE_COPIED_MESSAGE: &str = "Invoice has been copied in the clipboard";
pub const INVOICE_PAID_TITLE: &str = "success";
pub const INVOICE_PAID_MESSAGE: &str = "This invoice has been paid";

const PAID_HAPTIC_OPTIONS: HapticOptions = HapticOptions {
    enable_vibrate_fallback: true,
    ignore_android_system_settings: false,
};

/// Displays an invoice and polls the backend until it is paid. Dropping the
/// screen stops the poll.
pub struct ShowQrCodeScreen {
    record: InvoiceRecord,
    platform: Platform,
    paid: watch::Receiver<bool>,
    _payment_poll: BackgroundTask,
}

impl ShowQrCodeScreen {
    pub fn mount(
        record: InvoiceRecord,
        invoice_service: Arc<dyn InvoiceService>,
        platform: Platform,
        config: &Config,
    ) -> Self {
        Self::mount_with_event_emitter(record, invoice_service, platform, config, None)
    }

    pub fn mount_with_event_emitter(
        record: InvoiceRecord,
        invoice_service: Arc<dyn InvoiceService>,
        platform: Platform,
        config: &Config,
        event_emitter: Option<Arc<EventEmitter>>,
    ) -> Self {
        let (paid_sender, paid) = watch::channel(false);
        let paid_sender = Arc::new(paid_sender);
        let period = config.payment_poll_interval();

        let poll_platform = platform.clone();
        let payment_hash = record.payment_hash().to_string();
        let payment_poll =
            BackgroundTask::spawn_periodic("Payment poll", period, false, move || {
                let invoice_service = invoice_service.clone();
                let platform = poll_platform.clone();
                let payment_hash = payment_hash.clone();
                let event_emitter = event_emitter.clone();
                let paid_sender = paid_sender.clone();
                async move {
                    match invoice_service
                        .update_pending_invoice(payment_hash.clone())
                        .await
                    {
                        Ok(true) => {
                            info!("Invoice {payment_hash} has been paid");
                            paid_sender.send_replace(true);
                            on_paid(&platform, event_emitter.as_deref(), payment_hash).await;
                            ControlFlow::Break(())
                        }
                        Ok(false) => {
                            debug!("Invoice {payment_hash} still pending");
                            ControlFlow::Continue(())
                        }
                        Err(e) => {
                            warn!("Can't fetch invoice {payment_hash}: {e}");
                            ControlFlow::Continue(())
                        }
                    }
                }
            });

        Self {
            record,
            platform,
            paid,
            _payment_poll: payment_poll,
        }
    }

    pub fn record(&self) -> &InvoiceRecord {
        &self.record
    }

    pub fn caption(&self) -> String {
        format!("Receive {} sats", self.record.amount_sats())
    }

    pub fn qr_code(&self) -> Result<QrCode, FlowError> {
        QrCode::with_error_correction_level(self.record.invoice(), EcLevel::L)
            .map_err(|e| FlowError::Generic(e.to_string()))
    }

    /// QR code rendered with unicode half blocks, for terminals
    pub fn render_qr_code(&self) -> Result<String, FlowError> {
        Ok(self
            .qr_code()?
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .max_dimensions(50, 50)
            .build())
    }

    pub fn is_paid(&self) -> bool {
        *self.paid.borrow()
    }

    pub fn subscribe_paid(&self) -> watch::Receiver<bool> {
        self.paid.clone()
    }

    /// Opens the share sheet with the raw invoice. A failure is shown to the
    /// user and yields `None`.
    pub async fn share_invoice(&self) -> Option<ShareOutcome> {
        match self
            .platform
            .share_sheet
            .share(self.record.invoice().to_string())
            .await
        {
            Ok(outcome) => {
                debug!("Share sheet closed: {outcome:?}");
                Some(outcome)
            }
            Err(e) => {
                warn!("Failed to share invoice: {e}");
                self.platform.dialogs.alert(Alert::new(e.to_string())).await;
                None
            }
        }
    }

    pub async fn copy_invoice(&self) -> Result<(), FlowError> {
        if let Err(e) = self
            .platform
            .clipboard
            .set_string(self.record.invoice().to_string())
        {
            self.platform.dialogs.alert(Alert::new(e.to_string())).await;
            return Err(e.into());
        }
        self.platform
            .dialogs
            .alert(Alert::new(INVOICE_COPIED_MESSAGE))
            .await;
        Ok(())
    }

    pub fn unmount(self) {
        drop(self);
    }
}

async fn on_paid(platform: &Platform, event_emitter: Option<&EventEmitter>, payment_hash: String) {
    platform
        .haptics
        .trigger(HapticFeedback::NotificationSuccess, PAID_HAPTIC_OPTIONS);
    if let Some(emitter) = event_emitter {
        emitter.emit(&FlowEvent::InvoicePaid { payment_hash }).await;
    }
    platform
        .dialogs
        .alert(Alert::titled(INVOICE_PAID_TITLE, INVOICE_PAID_MESSAGE))
        .await;
    platform.navigator.navigate(Route::Back);
}

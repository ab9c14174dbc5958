use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};
use wallet_flows_common::invoice::decode_invoice;

use crate::{
    error::FlowError,
    events::{EventEmitter, FlowEvent},
    models::{AddInvoiceRequest, InvoiceRecord},
    platform::{Alert, Platform},
    services::InvoiceService,
    utils::StateGuard,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ReceivePhase {
    #[default]
    CollectingInput,
    Submitting,
    Displaying(InvoiceRecord),
    Failed(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReceiveBitcoinState {
    pub memo: String,
    pub amount: u64,
    pub loading: bool,
    pub phase: ReceivePhase,
}

/// Coerces free-form amount input to whole satoshis. Anything that is not a
/// finite, non-negative number counts as zero; fractions are truncated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_amount_input(input: &str) -> u64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.trunc() as u64,
        _ => 0,
    }
}

pub struct ReceiveBitcoinScreen {
    invoice_service: Arc<dyn InvoiceService>,
    platform: Platform,
    event_emitter: Option<Arc<EventEmitter>>,
    state: watch::Sender<ReceiveBitcoinState>,
}

impl ReceiveBitcoinScreen {
    pub fn new(invoice_service: Arc<dyn InvoiceService>, platform: Platform) -> Self {
        let (state, _) = watch::channel(ReceiveBitcoinState::default());
        Self {
            invoice_service,
            platform,
            event_emitter: None,
            state,
        }
    }

    #[must_use]
    pub fn with_event_emitter(mut self, event_emitter: Arc<EventEmitter>) -> Self {
        self.event_emitter = Some(event_emitter);
        self
    }

    pub fn set_memo(&self, text: &str) {
        let memo = text.to_string();
        self.state.send_modify(|s| s.memo = memo);
    }

    /// Stores the coerced amount and returns it
    pub fn set_amount_input(&self, input: &str) -> u64 {
        let amount = parse_amount_input(input);
        self.state.send_modify(|s| s.amount = amount);
        amount
    }

    pub fn state(&self) -> ReceiveBitcoinState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReceiveBitcoinState> {
        self.state.subscribe()
    }

    /// Requests an invoice for the current amount and memo, then navigates to
    /// its display screen.
    ///
    /// Returns `Ok(None)` when the returned invoice could not be decoded; the
    /// user was alerted and stays on this screen.
    pub async fn create_invoice(&self) -> Result<Option<InvoiceRecord>, FlowError> {
        let mut request = AddInvoiceRequest::default();
        let mut already_submitting = false;
        self.state.send_modify(|s| {
            already_submitting = s.loading;
            if !s.loading {
                s.loading = true;
                s.phase = ReceivePhase::Submitting;
                request = AddInvoiceRequest {
                    amount_sats: s.amount,
                    memo: s.memo.clone(),
                };
            }
        });
        if already_submitting {
            return Err(FlowError::InvalidInput(
                "An invoice is already being created".to_string(),
            ));
        }
        let _loading = StateGuard::new(&self.state, |s| s.loading = false);

        let amount = request.amount_sats;
        let invoice = match self.invoice_service.add_invoice(request).await {
            Ok(invoice) => invoice,
            Err(e) => {
                error!("Failed to add invoice: {e}");
                let err = FlowError::from(e);
                self.set_phase(ReceivePhase::Failed(err.to_string()));
                return Err(err);
            }
        };

        let decoded = match decode_invoice(&invoice) {
            Ok(decoded) => decoded,
            Err(e) => {
                error!("Failed to decode invoice {invoice}: {e}");
                let message = FlowError::from(e).to_string();
                self.set_phase(ReceivePhase::Failed(message.clone()));
                self.platform.dialogs.alert(Alert::new(message)).await;
                return Ok(None);
            }
        };

        let record = InvoiceRecord::new(decoded, amount);
        info!(
            "Created invoice for {amount} sats with payment hash {}",
            record.payment_hash()
        );
        self.set_phase(ReceivePhase::Displaying(record.clone()));
        if let Some(emitter) = &self.event_emitter {
            emitter
                .emit(&FlowEvent::InvoiceCreated {
                    invoice: record.invoice().to_string(),
                })
                .await;
        }
        self.platform.navigator.navigate(record.route());
        Ok(Some(record))
    }

    fn set_phase(&self, phase: ReceivePhase) {
        self.state.send_modify(|s| s.phase = phase);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;
    use wallet_flows_common::error::{ServiceConnectivityError, ServiceError};

    use super::{ReceiveBitcoinScreen, ReceivePhase, parse_amount_input};
    use crate::{
        error::FlowError,
        models::{AddInvoiceRequest, Route},
        services::MockInvoiceService,
        test_utils::TestPlatform,
    };

    const INVOICE: &str = "lnbc110n1p38q3gtpp5ypz09jrd8p993snjwnm68cph4ftwp22le34xd4r8ftspwshxhmnsdqqxqyjw5qcqpxsp5htlg8ydpywvsa7h3u4hdn77ehs4z4e844em0apjyvmqfkzqhhd2q9qgsqqqyssqszpxzxt9uuqzymr7zxcdccj5g69s8q7zzjs7sgxn9ejhnvdh6gqjcy22mss2yexunagm5r2gqczh8k24cwrqml3njskm548aruhpwssq9nvrvz";
    const PAYMENT_HASH: &str = "2044f2c86d384a58c27274f7a3e037aa56e0a95fcc6a66d4674ae01742e6bee7";

    #[rstest]
    #[case("1500", 1500)]
    #[case(" 42 ", 42)]
    #[case("", 0)]
    #[case("abc", 0)]
    #[case("12abc", 0)]
    #[case("-5", 0)]
    #[case("12.9", 12)]
    #[case("1e3", 1000)]
    #[case("NaN", 0)]
    #[case("inf", 0)]
    fn test_parse_amount_input(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(parse_amount_input(input), expected);
    }

    #[tokio::test]
    async fn test_create_invoice_navigates_to_qr_code() {
        let mut service = MockInvoiceService::new();
        service
            .expect_add_invoice()
            .withf(|req: &AddInvoiceRequest| req.amount_sats == 11 && req.memo == "coffee")
            .times(1)
            .returning(|_| Ok(INVOICE.to_string()));
        let platform = TestPlatform::new();
        let screen = ReceiveBitcoinScreen::new(Arc::new(service), platform.platform());

        screen.set_memo("coffee");
        assert_eq!(screen.set_amount_input("11"), 11);
        let record = screen.create_invoice().await.unwrap().unwrap();

        assert_eq!(record.payment_hash(), PAYMENT_HASH);
        assert_eq!(
            platform.navigator.routes(),
            vec![Route::ShowQrCode {
                invoice: INVOICE.to_string(),
                amount: 11,
                hash: PAYMENT_HASH.to_string(),
            }]
        );
        let state = screen.state();
        assert!(!state.loading);
        assert_eq!(state.phase, ReceivePhase::Displaying(record));
    }

    #[tokio::test]
    async fn test_non_numeric_amount_requests_zero() {
        let mut service = MockInvoiceService::new();
        service
            .expect_add_invoice()
            .withf(|req: &AddInvoiceRequest| req.amount_sats == 0)
            .times(1)
            .returning(|_| Ok(INVOICE.to_string()));
        let platform = TestPlatform::new();
        let screen = ReceiveBitcoinScreen::new(Arc::new(service), platform.platform());

        assert_eq!(screen.set_amount_input("lots"), 0);
        screen.create_invoice().await.unwrap();
    }

    #[tokio::test]
    async fn test_undecodable_invoice_alerts_without_navigation() {
        let mut service = MockInvoiceService::new();
        service
            .expect_add_invoice()
            .times(1)
            .returning(|_| Ok("garbage".to_string()));
        let platform = TestPlatform::new();
        let screen = ReceiveBitcoinScreen::new(Arc::new(service), platform.platform());

        let res = screen.create_invoice().await.unwrap();

        assert!(res.is_none());
        assert!(platform.navigator.routes().is_empty());
        assert_eq!(platform.dialogs.alerts().len(), 1);
        let state = screen.state();
        assert!(!state.loading);
        assert!(matches!(state.phase, ReceivePhase::Failed(_)));
    }

    #[tokio::test]
    async fn test_request_failure_propagates() {
        let mut service = MockInvoiceService::new();
        service.expect_add_invoice().times(1).returning(|_| {
            Err(ServiceError::Network(ServiceConnectivityError::Connect(
                "refused".to_string(),
            )))
        });
        let platform = TestPlatform::new();
        let screen = ReceiveBitcoinScreen::new(Arc::new(service), platform.platform());

        let res = screen.create_invoice().await;

        assert!(matches!(res, Err(FlowError::NetworkError(_))));
        assert!(platform.navigator.routes().is_empty());
        assert!(platform.dialogs.alerts().is_empty());
        assert!(!screen.state().loading);
    }
}

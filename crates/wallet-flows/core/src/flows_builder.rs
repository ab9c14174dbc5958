use std::sync::Arc;

use wallet_flows_common::rest::{ReqwestRestClient, RestClient};

use crate::{
    error::FlowError,
    flows::WalletFlows,
    models::Config,
    persist::Storage,
    platform::Platform,
    services::{BalanceService, CaptchaService, InvoiceService, RemoteWalletService},
};

/// Builder for creating `WalletFlows` instances with customizable components.
#[derive(Clone)]
pub struct WalletFlowsBuilder {
    config: Config,
    storage: Arc<dyn Storage>,
    platform: Platform,
    rest_client: Option<Arc<dyn RestClient>>,
    auth_token: Option<String>,
    captcha_service: Option<Arc<dyn CaptchaService>>,
    invoice_service: Option<Arc<dyn InvoiceService>>,
    balance_service: Option<Arc<dyn BalanceService>>,
}

impl WalletFlowsBuilder {
    /// Creates a new `WalletFlowsBuilder` with the provided configuration.
    /// Arguments:
    /// - `config`: The configuration to be used.
    /// - `storage`: Where the onboarding marker is kept.
    /// - `platform`: The device capabilities the screens drive.
    pub fn new(config: Config, storage: Arc<dyn Storage>, platform: Platform) -> Self {
        WalletFlowsBuilder {
            config,
            storage,
            platform,
            rest_client: None,
            auth_token: None,
            captcha_service: None,
            invoice_service: None,
            balance_service: None,
        }
    }

    /// Sets the HTTP client used to reach the backend.
    #[must_use]
    pub fn with_rest_client(mut self, rest_client: Arc<dyn RestClient>) -> Self {
        self.rest_client = Some(rest_client);
        self
    }

    /// Sets the bearer token sent with every backend request.
    #[must_use]
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    #[must_use]
    pub fn with_captcha_service(mut self, service: Arc<dyn CaptchaService>) -> Self {
        self.captcha_service = Some(service);
        self
    }

    #[must_use]
    pub fn with_invoice_service(mut self, service: Arc<dyn InvoiceService>) -> Self {
        self.invoice_service = Some(service);
        self
    }

    #[must_use]
    pub fn with_balance_service(mut self, service: Arc<dyn BalanceService>) -> Self {
        self.balance_service = Some(service);
        self
    }

    /// Builds the `WalletFlows` instance. Services not set explicitly are
    /// served by the remote backend.
    pub fn build(self) -> Result<WalletFlows, FlowError> {
        self.config.validate()?;
        let rest_client: Arc<dyn RestClient> = match self.rest_client {
            Some(client) => client,
            None => Arc::new(ReqwestRestClient::new(None)?),
        };
        let remote = Arc::new(
            RemoteWalletService::new(
                rest_client,
                self.config.graphql_url.clone(),
                self.config.functions_url.clone(),
                self.config.uid.clone(),
            )
            .with_auth_token(self.auth_token),
        );

        let captcha_service: Arc<dyn CaptchaService> = match self.captcha_service {
            Some(service) => service,
            None => remote.clone(),
        };
        let invoice_service: Arc<dyn InvoiceService> = match self.invoice_service {
            Some(service) => service,
            None => remote.clone(),
        };
        let balance_service: Arc<dyn BalanceService> = match self.balance_service {
            Some(service) => service,
            None => remote,
        };

        Ok(WalletFlows::new(
            self.config,
            self.storage,
            self.platform,
            captcha_service,
            invoice_service,
            balance_service,
        ))
    }
}

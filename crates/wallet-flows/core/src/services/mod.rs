mod queries;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use wallet_flows_common::{
    error::ServiceError, functions::FunctionsClient, graphql::GraphQLClient, rest::RestClient,
};

use crate::models::{
    AccountType, AddInvoiceRequest, BalanceSnapshot, CaptchaCreateChallengePayload, CurrencyType,
};
use queries::{
    AddInvoice, CaptchaCreateChallenge, WalletBalance, add_invoice, captcha_create_challenge,
    wallet_balance,
};

const UPDATE_PENDING_INVOICE_FUNCTION: &str = "updatePendingInvoice";
const PAY_INVOICE_FUNCTION: &str = "payInvoice";

/// Issues challenges for the verification widget
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptchaService: Send + Sync {
    async fn create_challenge(&self) -> Result<CaptchaCreateChallengePayload, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceService: Send + Sync {
    /// Creates a receive invoice and returns its bolt11 string
    async fn add_invoice(&self, request: AddInvoiceRequest) -> Result<String, ServiceError>;

    /// Asks the backend to refresh the invoice state. Returns `true` once settled.
    async fn update_pending_invoice(&self, payment_hash: String) -> Result<bool, ServiceError>;

    /// Has the backend pay `invoice`. The response is not interpreted.
    async fn pay_invoice(&self, invoice: String) -> Result<serde_json::Value, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceService: Send + Sync {
    async fn fetch_balance(
        &self,
        currency: CurrencyType,
        account: AccountType,
    ) -> Result<BalanceSnapshot, ServiceError>;
}

/// Backend reached through the GraphQL endpoint and the callable functions
pub struct RemoteWalletService {
    graphql: GraphQLClient,
    functions: FunctionsClient,
    uid: String,
}

impl RemoteWalletService {
    pub fn new(
        rest_client: Arc<dyn RestClient>,
        graphql_url: String,
        functions_url: String,
        uid: String,
    ) -> Self {
        Self {
            graphql: GraphQLClient::new(rest_client.clone(), graphql_url),
            functions: FunctionsClient::new(rest_client, functions_url),
            uid,
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.graphql = self.graphql.with_auth_token(token.clone());
        self.functions = self.functions.with_id_token(token);
        self
    }
}

#[async_trait]
impl CaptchaService for RemoteWalletService {
    async fn create_challenge(&self) -> Result<CaptchaCreateChallengePayload, ServiceError> {
        let data = self
            .graphql
            .post_query::<CaptchaCreateChallenge>(captcha_create_challenge::Variables)
            .await?;
        Ok(data.captcha_create_challenge.unwrap_or_default())
    }
}

#[async_trait]
impl InvoiceService for RemoteWalletService {
    async fn add_invoice(&self, request: AddInvoiceRequest) -> Result<String, ServiceError> {
        debug!(
            "Adding invoice for {} sats, memo {:?}",
            request.amount_sats, request.memo
        );
        let data = self
            .graphql
            .post_query::<AddInvoice>(add_invoice::Variables {
                uid: self.uid.clone(),
                amount: request.amount_sats,
                memo: request.memo,
            })
            .await?;
        Ok(data.invoice.add_invoice)
    }

    async fn update_pending_invoice(&self, payment_hash: String) -> Result<bool, ServiceError> {
        let settled: serde_json::Value = self
            .functions
            .call(UPDATE_PENDING_INVOICE_FUNCTION, payment_hash)
            .await?;
        // Only a literal `true` counts as settled
        Ok(settled == serde_json::Value::Bool(true))
    }

    async fn pay_invoice(&self, invoice: String) -> Result<serde_json::Value, ServiceError> {
        self.functions
            .call(PAY_INVOICE_FUNCTION, json!({ "invoice": invoice }))
            .await
    }
}

#[async_trait]
impl BalanceService for RemoteWalletService {
    async fn fetch_balance(
        &self,
        currency: CurrencyType,
        account: AccountType,
    ) -> Result<BalanceSnapshot, ServiceError> {
        let data = self
            .graphql
            .post_query::<WalletBalance>(wallet_balance::Variables {
                uid: self.uid.clone(),
                currency: currency.to_string(),
                account: account.to_string(),
            })
            .await?;
        let amount = u64::try_from(data.wallet.balance).map_err(|_| {
            ServiceError::serialization(format!("Negative balance: {}", data.wallet.balance))
        })?;
        Ok(BalanceSnapshot {
            currency,
            account,
            amount,
        })
    }
}

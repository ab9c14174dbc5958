//! GraphQL operations of the wallet backend

use graphql_client::{GraphQLQuery, QueryBody};

pub(crate) struct CaptchaCreateChallenge;

pub(crate) mod captcha_create_challenge {
    use serde::{Deserialize, Serialize};

    use crate::models::CaptchaCreateChallengePayload;

    pub const OPERATION_NAME: &str = "captchaCreateChallenge";
    pub const QUERY: &str = "mutation captchaCreateChallenge {
  captchaCreateChallenge {
    errors {
      message
    }
    result {
      id
      challengeCode
      newCaptcha
      failbackMode
    }
  }
}";

    #[derive(Serialize)]
    pub struct Variables;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub captcha_create_challenge: Option<CaptchaCreateChallengePayload>,
    }
}

impl GraphQLQuery for CaptchaCreateChallenge {
    type Variables = captcha_create_challenge::Variables;
    type ResponseData = captcha_create_challenge::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: captcha_create_challenge::QUERY,
            operation_name: captcha_create_challenge::OPERATION_NAME,
        }
    }
}

pub(crate) struct AddInvoice;

pub(crate) mod add_invoice {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "addInvoice";
    pub const QUERY: &str = "mutation addInvoice($uid: String, $amount: Int, $memo: String) {
  invoice(uid: $uid) {
    addInvoice(value: $amount, memo: $memo)
  }
}";

    #[derive(Serialize)]
    pub struct Variables {
        pub uid: String,
        pub amount: u64,
        pub memo: String,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AddInvoiceInvoice {
        pub add_invoice: String,
    }

    #[derive(Deserialize)]
    pub struct ResponseData {
        pub invoice: AddInvoiceInvoice,
    }
}

impl GraphQLQuery for AddInvoice {
    type Variables = add_invoice::Variables;
    type ResponseData = add_invoice::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: add_invoice::QUERY,
            operation_name: add_invoice::OPERATION_NAME,
        }
    }
}

pub(crate) struct WalletBalance;

pub(crate) mod wallet_balance {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "walletBalance";
    pub const QUERY: &str = "query walletBalance($uid: String, $currency: String, $account: String) {
  wallet(uid: $uid) {
    balance(currency: $currency, account: $account)
  }
}";

    #[derive(Serialize)]
    pub struct Variables {
        pub uid: String,
        pub currency: String,
        pub account: String,
    }

    #[derive(Deserialize)]
    pub struct WalletBalanceWallet {
        pub balance: i64,
    }

    #[derive(Deserialize)]
    pub struct ResponseData {
        pub wallet: WalletBalanceWallet,
    }
}

impl GraphQLQuery for WalletBalance {
    type Variables = wallet_balance::Variables;
    type ResponseData = wallet_balance::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: wallet_balance::QUERY,
            operation_name: wallet_balance::OPERATION_NAME,
        }
    }
}

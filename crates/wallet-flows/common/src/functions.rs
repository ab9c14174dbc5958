//! Client for HTTPS callable cloud functions.
//!
//! A call posts `{"data": <args>}` to `<base_url>/<name>` and receives either
//! `{"result": <value>}` or `{"error": {"message": .., "status": ..}}`.

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::{ServiceConnectivityError, ServiceError},
    rest::RestClient,
};

#[derive(Serialize)]
struct CallableRequest<T: Serialize> {
    data: T,
}

#[derive(Deserialize)]
struct CallableResponse<T> {
    result: Option<T>,
    error: Option<CallableError>,
}

#[derive(Deserialize)]
struct CallableError {
    message: String,
    #[serde(default)]
    status: String,
}

pub struct FunctionsClient {
    rest_client: Arc<dyn RestClient>,
    base_url: String,
    id_token: Option<String>,
}

impl FunctionsClient {
    pub fn new(rest_client: Arc<dyn RestClient>, base_url: String) -> Self {
        Self {
            rest_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            id_token: None,
        }
    }

    #[must_use]
    pub fn with_id_token(mut self, token: Option<String>) -> Self {
        self.id_token = token;
        self
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/{name}", self.base_url)
    }

    /// Invokes the callable function `name` with `data` as its argument.
    pub async fn call<D, T>(&self, name: &str, data: D) -> Result<T, ServiceError>
    where
        D: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(&CallableRequest { data })?;
        let headers = self.id_token.as_ref().map(|token| {
            HashMap::from([("Authorization".to_string(), format!("Bearer {token}"))])
        });

        debug!("Calling function {name}");
        let response = self
            .rest_client
            .post_json(self.function_url(name), headers, body)
            .await?;

        // Error responses still carry a JSON error object, prefer it over the bare status
        let parsed: Result<CallableResponse<T>, _> = serde_json::from_str(&response.body);
        match parsed {
            Ok(CallableResponse {
                error: Some(error), ..
            }) => Err(ServiceError::Function {
                status: error.status,
                message: error.message,
            }),
            Ok(CallableResponse {
                result: Some(result),
                ..
            }) if response.is_success() => Ok(result),
            _ if !response.is_success() => Err(ServiceConnectivityError::Status {
                status: response.status,
                body: response.body,
            }
            .into()),
            Ok(_) => Err(ServiceError::serialization(format!(
                "Missing result in response of {name}"
            ))),
            Err(e) => Err(e.into()),
        }
    }
}

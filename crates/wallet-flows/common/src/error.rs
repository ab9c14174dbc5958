use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum ServiceConnectivityError {
    #[error("Builder error: {0}")]
    Builder(String),
    #[error("Redirect error: {0}")]
    Redirect(String),
    #[error("Status error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("Timeout error: {0}")]
    Timeout(String),
    #[error("Request error: {0}")]
    Request(String),
    #[error("Connect error: {0}")]
    Connect(String),
    #[error("Body error: {0}")]
    Body(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Json error: {0}")]
    Json(String),
    #[error("Other error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for ServiceConnectivityError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest hides the interesting part of the failure in the source chain
        let mut err_str = err.to_string();
        let mut walk: &dyn std::error::Error = &err;
        while let Some(src) = walk.source() {
            err_str.push_str(format!(" : {src}").as_str());
            walk = src;
        }
        if err.is_connect() {
            return Self::Connect(err_str);
        }
        if err.is_builder() {
            Self::Builder(err_str)
        } else if err.is_redirect() {
            Self::Redirect(err_str)
        } else if err.is_status() {
            Self::Status {
                status: err.status().unwrap_or_default().into(),
                body: err_str,
            }
        } else if err.is_timeout() {
            Self::Timeout(err_str)
        } else if err.is_request() {
            Self::Request(err_str)
        } else if err.is_body() {
            Self::Body(err_str)
        } else if err.is_decode() {
            Self::Decode(err_str)
        } else {
            Self::Other(err_str)
        }
    }
}

/// Errors returned by the wallet backend, either at the transport level or
/// as an application error carried inside an otherwise successful response.
#[derive(Clone, Debug, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(#[from] ServiceConnectivityError),

    /// Top-level `errors` of a GraphQL response, joined with `, `
    #[error("graphql error: {0}")]
    GraphQL(String),

    /// Error object returned by a callable function
    #[error("function error ({status}): {message}")]
    Function { status: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ServiceError {
    pub fn serialization<S: Into<String>>(reason: S) -> Self {
        Self::Serialization(reason.into())
    }

    pub fn from_graphql_errors(errors: &[graphql_client::Error]) -> Self {
        let error_messages: Vec<String> = errors.iter().map(|e| e.message.clone()).collect();
        Self::GraphQL(error_messages.join(", "))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

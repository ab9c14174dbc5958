use std::num::TryFromIntError;

use thiserror::Error;
use wallet_flows_common::{
    error::{ServiceConnectivityError, ServiceError},
    invoice::InvoiceError,
};

use crate::persist::StorageError;

/// Error type shared by every flow controller
#[derive(Debug, Error, Clone)]
pub enum FlowError {
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Error returned by the wallet backend
    #[error("Service error: {0}")]
    ServiceError(String),

    /// Storage error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Error reported by a device collaborator (share sheet, dialogs, ...)
    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Error: {0}")]
    Generic(String),
}

impl From<ServiceError> for FlowError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Network(e) => FlowError::NetworkError(e.to_string()),
            other => FlowError::ServiceError(other.to_string()),
        }
    }
}

impl From<ServiceConnectivityError> for FlowError {
    fn from(value: ServiceConnectivityError) -> Self {
        FlowError::NetworkError(value.to_string())
    }
}

impl From<InvoiceError> for FlowError {
    fn from(e: InvoiceError) -> Self {
        FlowError::InvalidInput(e.to_string())
    }
}

impl From<StorageError> for FlowError {
    fn from(e: StorageError) -> Self {
        FlowError::StorageError(e.to_string())
    }
}

impl From<PlatformError> for FlowError {
    fn from(e: PlatformError) -> Self {
        FlowError::Platform(e.to_string())
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(e: serde_json::Error) -> Self {
        FlowError::Generic(e.to_string())
    }
}

impl From<TryFromIntError> for FlowError {
    fn from(e: TryFromIntError) -> Self {
        FlowError::Generic(e.to_string())
    }
}

impl From<String> for FlowError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

impl From<&str> for FlowError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}

/// Failure reported by a device capability implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Generic(String),
}

use serde::Serialize;
use thiserror::Error;

use crate::services::error_classifier::BossFault;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No wallet transport available, configure a wallet first")]
    WalletUnavailable,

    #[error("Transaction rejected by signer: {0}")]
    TransactionRejected(String),

    #[error("Contract reverted: {reason}")]
    ContractReverted { fault: BossFault, reason: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Contract configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<BossFault>,
}

impl AppError {
    /// Build a revert error, classifying the raw reason.
    pub fn reverted(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        AppError::ContractReverted {
            fault: crate::services::error_classifier::classify(&reason),
            reason,
        }
    }

    /// Wrap any failure of a read-only call.
    pub fn query_failed(err: AppError) -> Self {
        match err {
            AppError::QueryFailed(_) => err,
            AppError::ContractReverted { reason, .. } => AppError::QueryFailed(reason),
            other => AppError::QueryFailed(other.to_string()),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::WalletUnavailable => "WALLET_UNAVAILABLE",
            AppError::TransactionRejected(_) => "TRANSACTION_REJECTED",
            AppError::ContractReverted { .. } => "CONTRACT_REVERTED",
            AppError::NetworkError(_) => "NETWORK_ERROR",
            AppError::QueryFailed(_) => "QUERY_FAILED",
            AppError::ConfigurationMissing(_) => "CONFIGURATION_MISSING",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Transport failures and declined signatures can be retried by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::TransactionRejected(_) | AppError::NetworkError(_) | AppError::QueryFailed(_)
        )
    }

    pub fn detail(&self) -> ErrorDetail {
        let fault = match self {
            AppError::ContractReverted { fault, .. } => Some(*fault),
            _ => None,
        };
        ErrorDetail {
            code: self.code().to_string(),
            message: self.to_string(),
            fault,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

use serde::Serialize;

use crate::error::AppError;

/// Boss-state faults the world boss contracts report through revert reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BossFault {
    BossNotActive,
    BossAlreadyDefeated,
    BossTemporarilyUnavailable,
    Unclassified,
}

// Phrase fragments emitted by the contracts, checked in order.
const KNOWN_FAULTS: [(&str, BossFault); 3] = [
    ("Boss not active", BossFault::BossNotActive),
    ("Boss already defeated", BossFault::BossAlreadyDefeated),
    ("Boss cannot be attacked now", BossFault::BossTemporarilyUnavailable),
];

impl BossFault {
    pub fn user_message(self) -> &'static str {
        match self {
            BossFault::BossNotActive => "The boss is not active",
            BossFault::BossAlreadyDefeated => "The boss has already been defeated",
            BossFault::BossTemporarilyUnavailable => "The boss cannot be attacked right now",
            BossFault::Unclassified => "Transaction failed",
        }
    }
}

pub fn classify(message: &str) -> BossFault {
    KNOWN_FAULTS
        .iter()
        .find(|(fragment, _)| message.contains(fragment))
        .map(|(_, fault)| *fault)
        .unwrap_or(BossFault::Unclassified)
}

/// Classify and log a gateway failure. The error itself is left to the caller.
pub fn report(operation: &str, err: &AppError) -> BossFault {
    let fault = match err {
        AppError::ContractReverted { fault, .. } => *fault,
        other => classify(&other.to_string()),
    };

    match fault {
        BossFault::Unclassified => {
            tracing::error!(operation, code = err.code(), "Transaction failed: {}", err)
        }
        known => tracing::error!(operation, ?known, "{}", known.user_message()),
    }

    fault
}

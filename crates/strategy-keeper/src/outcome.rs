use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

pub const REASON_PAUSED: &str = "strategy_paused";
pub const REASON_SCHEDULED: &str = "strategy will be rebalanced and reported";
pub const REASON_ERROR: &str = "strategy_error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeeperStatus {
    Skipped,
    Success,
    Error,
}

/// Result of one keeper attempt, as reported to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeeperOutcome {
    pub status: KeeperStatus,
    pub reason: String,
}

impl KeeperOutcome {
    pub fn skipped() -> Self {
        Self {
            status: KeeperStatus::Skipped,
            reason: REASON_PAUSED.to_string(),
        }
    }

    pub fn success() -> Self {
        Self {
            status: KeeperStatus::Success,
            reason: REASON_SCHEDULED.to_string(),
        }
    }

    pub fn error() -> Self {
        Self {
            status: KeeperStatus::Error,
            reason: REASON_ERROR.to_string(),
        }
    }
}

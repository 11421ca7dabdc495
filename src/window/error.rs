//! Ingestion errors. Each one rejects a single submission; none is fatal.

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionError {
    /// Timestamp is older than the window
    Stale {
        timestamp: i64,
        now: i64,
        window_ms: i64,
    },
    /// Timestamp is further ahead of now than the configured skew allows
    Future {
        timestamp: i64,
        now: i64,
        max_skew_ms: i64,
    },
    /// Amount could not be parsed or is not a finite number
    InvalidAmount(String),
    /// Timestamp could not be parsed
    InvalidTimestamp(String),
}

impl TransactionError {
    /// Short machine-readable tag for the transport layer
    pub fn kind(&self) -> &'static str {
        match self {
            TransactionError::Stale { .. } => "stale",
            TransactionError::Future { .. } => "future",
            TransactionError::InvalidAmount(_) => "invalid_amount",
            TransactionError::InvalidTimestamp(_) => "invalid_timestamp",
        }
    }
}

impl std::fmt::Display for TransactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionError::Stale {
                timestamp,
                now,
                window_ms,
            } => write!(
                f,
                "transaction at {} is {}ms old, older than the {}ms window",
                timestamp,
                now.saturating_sub(*timestamp),
                window_ms
            ),
            TransactionError::Future {
                timestamp,
                now,
                max_skew_ms,
            } => write!(
                f,
                "transaction at {} is {}ms in the future, more than the allowed {}ms",
                timestamp,
                timestamp.saturating_sub(*now),
                max_skew_ms
            ),
            TransactionError::InvalidAmount(raw) => write!(f, "incorrect amount: {:?}", raw),
            TransactionError::InvalidTimestamp(raw) => {
                write!(f, "incorrect timestamp: {:?}", raw)
            }
        }
    }
}

impl std::error::Error for TransactionError {}

//! JSON-lines wire protocol.
//!
//! One JSON object per line in each direction:
//!
//! ```text
//! -> {"op":"add","amount":12.5,"timestamp":1700000000000}
//! <- {"status":"created"}
//! -> {"op":"add_form","amount":"12.5"}
//! <- {"status":"created"}
//! -> {"op":"stats"}
//! <- {"status":"stats","sum":25.0,"avg":12.5,"max":12.5,"min":12.5,"count":2}
//! ```

use crate::window::{Clock, Stat, StatsEngine, TransactionError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Typed submission
    Add { amount: f64, timestamp: i64 },
    /// Untyped submission as it arrives from a form; no timestamp means now
    AddForm {
        amount: String,
        #[serde(default)]
        timestamp: Option<String>,
    },
    Stats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Created,
    Rejected { kind: String, reason: String },
    Stats(Stat),
    Error { reason: String },
}

impl From<TransactionError> for Response {
    fn from(err: TransactionError) -> Self {
        Response::Rejected {
            kind: err.kind().to_string(),
            reason: err.to_string(),
        }
    }
}

impl Request {
    pub fn parse(line: &str) -> Result<Request, Response> {
        serde_json::from_str(line).map_err(|e| Response::Error {
            reason: format!("malformed request: {}", e),
        })
    }

    pub fn execute<C: Clock>(self, engine: &StatsEngine<C>) -> Response {
        let outcome = match self {
            Request::Add { amount, timestamp } => engine.add_transaction(amount, timestamp),
            Request::AddForm { amount, timestamp } => {
                engine.add_raw(&amount, timestamp.as_deref())
            }
            Request::Stats => return Response::Stats(engine.get_stats()),
        };
        match outcome {
            Ok(()) => Response::Created,
            Err(e) => e.into(),
        }
    }
}

impl Response {
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"status":"error","reason":"encode failed: {}"}}"#, e)
        })
    }
}

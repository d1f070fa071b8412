//! Fatal replay errors
//!
//! Only legality violations abort a replay run. Everything else (driver
//! errors, result mismatches, unmatched unmaps) is logged and replay
//! continues, so a single environment-sensitive call does not prevent
//! observing the rest of the trace.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    /// The trace predates inline client arrays: replaying this call
    /// without a bound array buffer would read memory the engine does
    /// not own.
    #[error("call {call_no} ({name}): no array buffer bound")]
    UnboundArrayBuffer { call_no: u64, name: String },

    /// Same condition for indexed draws and the element-array binding.
    #[error("call {call_no} ({name}): no element array buffer bound")]
    UnboundElementArrayBuffer { call_no: u64, name: String },
}

impl ReplayError {
    /// Trace position the error was raised at
    pub fn call_no(&self) -> u64 {
        match self {
            ReplayError::UnboundArrayBuffer { call_no, .. }
            | ReplayError::UnboundElementArrayBuffer { call_no, .. } => *call_no,
        }
    }
}

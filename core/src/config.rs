//! Replay configuration
//!
//! Options are resolved by the caller (CLI, test harness) and handed to the
//! engine at construction.

use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Require buffer objects for array pointers and draws.
    ///
    /// Traces recorded before format version 1 did not capture client-side
    /// vertex arrays, so replaying such a call without a bound buffer
    /// object would read memory the engine does not own.
    pub strict_client_arrays: bool,
    /// Run post-call error checks and result diagnostics
    pub debug: bool,
    /// Emit profiling spans around calls
    pub profiling: bool,
    /// Present double-buffered; frame boundaries come from buffer swaps
    /// instead of flush/finish
    pub double_buffer: bool,
    /// Decompose shader-program creation so intermediate source stays
    /// inspectable for state dumps
    pub dump_state: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            strict_client_arrays: false,
            debug: true,
            profiling: false,
            double_buffer: true,
            dump_state: false,
        }
    }
}

impl ReplayConfig {
    /// Derive the compatibility setting from the trace format version
    pub fn for_trace_version(version: u32) -> Self {
        Self {
            strict_client_arrays: version < 1,
            ..Default::default()
        }
    }
}

//! Profiling spans
//!
//! Every call the engine executes outside a display list or begin/end
//! bracket is wrapped in a span. Spans are paired like the underlying
//! timer queries: `end_call` closes the most recently opened span that is
//! still running, which is what makes a glBegin..glEnd bracket time out as
//! a single draw span (glBegin opens it, the bracket suppresses everything
//! in between, glEnd closes it).

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::types::Call;

/// Profiling collaborator
pub trait Profiler {
    /// Open a span before dispatch. `program` is the context's active
    /// program at the time of the call.
    fn begin_call(&mut self, call: &Call, program: u32, is_draw: bool);

    /// Close the most recently opened running span
    fn end_call(&mut self, call: &Call, is_draw: bool);
}

/// Profiler that discards all spans
#[derive(Debug, Default)]
pub struct NullProfiler;

impl Profiler for NullProfiler {
    fn begin_call(&mut self, _call: &Call, _program: u32, _is_draw: bool) {}
    fn end_call(&mut self, _call: &Call, _is_draw: bool) {}
}

/// One completed (or still open) call span
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSpan {
    pub call_no: u64,
    pub name: String,
    pub program: u32,
    pub is_draw: bool,
    /// None while the span is still open
    pub duration_ns: Option<u64>,
}

/// CPU-side span collector
#[derive(Debug, Default)]
pub struct CpuProfiler {
    spans: Vec<CallSpan>,
    starts: Vec<Option<Instant>>,
}

impl CpuProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All spans recorded so far, in open order
    pub fn spans(&self) -> &[CallSpan] {
        &self.spans
    }

    /// Number of spans still running
    pub fn open_spans(&self) -> usize {
        self.starts.iter().filter(|s| s.is_some()).count()
    }

    /// Serialize the collected spans as a JSON report
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.spans)
    }
}

impl Profiler for CpuProfiler {
    fn begin_call(&mut self, call: &Call, program: u32, is_draw: bool) {
        self.spans.push(CallSpan {
            call_no: call.no,
            name: call.name.clone(),
            program,
            is_draw,
            duration_ns: None,
        });
        self.starts.push(Some(Instant::now()));
    }

    fn end_call(&mut self, _call: &Call, _is_draw: bool) {
        // Close the latest running span
        if let Some(idx) = self.starts.iter().rposition(|s| s.is_some()) {
            let start = self.starts[idx].take().unwrap();
            self.spans[idx].duration_ns = Some(start.elapsed().as_nanos() as u64);
        } else {
            log::warn!("profiling span end with no open span");
        }
    }
}

//! traceplay core - replay state machine for recorded GL call streams
//!
//! Replays a decoded trace against a live driver while reconstructing the
//! cross-call state the stream never repeats: which buffers are bound,
//! whether a display list is being recorded, which program a pipeline made
//! active. That derived state gates legality checks, profiling spans and
//! diagnostics around every call.
//!
//! # Architecture
//!
//! - [`classify`] - static partition of entry points into categories
//! - [`ContextState`] / [`ContextStore`] - per-context derived state
//! - [`ReplayEngine`] - the per-call pipeline: classify, legality,
//!   dispatch, state transition, diagnostics
//! - [`RegionTracker`] - active buffer mappings from map to unmap
//! - [`Driver`], [`Profiler`], [`FrameSink`] - collaborator seams for the
//!   live GL implementation, span collection and presentation
//!
//! Trace decoding and windowing live outside this crate; the engine
//! consumes ready-made [`Call`] records and reports frame boundaries and
//! drawable sizes outward through [`FrameSink`].

pub mod classify;
pub mod config;
pub mod context;
mod dispatch;
pub mod driver;
pub mod engine;
pub mod error;
pub mod profile;
pub mod regions;
#[cfg(test)]
pub mod test_utils;
pub mod types;

// Re-export the public surface
pub use classify::{CallCategories, classify};
pub use config::ReplayConfig;
pub use context::{ContextId, ContextState, ContextStore};
pub use driver::{BufferRef, Driver, FrameSink, NullSink, gl_error_name};
pub use engine::{CallOutcome, ReplayEngine, ReplaySummary, SkipReason};
pub use error::ReplayError;
pub use profile::{CallSpan, CpuProfiler, NullProfiler, Profiler};
pub use regions::{Region, RegionTracker};
pub use types::{BufferTarget, Call, CallFlags, Value};

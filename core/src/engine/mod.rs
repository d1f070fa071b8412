//! Replay state machine
//!
//! Processes a decoded call stream strictly in order: classify →
//! legality/pre-action → dispatch → post-action/state transition →
//! region tracking → diagnostics, with a profiling span wrapped around
//! the dispatch. One call is fully processed before the next is looked
//! at; the only blocking point is the synchronous driver invocation.

mod diagnostics;


use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::classify::{CallCategories, classify};
use crate::config::ReplayConfig;
use crate::context::{ContextId, ContextState, ContextStore};
use crate::dispatch::{self, DispatchStrategy};
use crate::driver::{BufferRef, Driver, FrameSink, NullSink};
use crate::error::ReplayError;
use crate::profile::{NullProfiler, Profiler};
use crate::regions::{Region, RegionTracker};
use crate::types::{BufferTarget, Call, CallFlags, GL_DEBUG_OUTPUT_SYNCHRONOUS_ARB, Value};

/// What happened to one processed call
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The driver executed the call
    Executed(Option<Value>),
    /// The generic pipeline was bypassed
    Skipped(SkipReason),
}

/// Why a call bypassed the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No context is current
    NoContext,
    /// Pack reads are defined as no-ops without a bound pack buffer
    NoPackBuffer,
    /// Debug annotation marker
    StringMarker,
    /// Explicit frame terminator marker
    FrameTerminator,
    /// memcpy record with a null pointer or zero length
    NullMemcpy,
    /// Synchronous debug output toggle; replay does not run with a
    /// debug context
    DebugSyncToggle,
}

/// Totals for one replay run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub calls_executed: u64,
    pub calls_skipped: u64,
    pub frames: u64,
}

/// The replay engine.
///
/// Owns all derived state: per-context bindings and mode flags, active
/// buffer mappings, and the pipeline→active-program association shared by
/// every context the engine drives. All of it is initialized at
/// construction; there is no global mutable state.
pub struct ReplayEngine<D, P = NullProfiler, F = NullSink> {
    driver: D,
    config: ReplayConfig,
    profiler: P,
    sink: F,
    contexts: ContextStore,
    regions: RegionTracker,
    // Shared across contexts, owned by the engine
    pipeline_to_active_program: HashMap<u32, u32>,
    pipeline_has_been_bound: bool,
    frame_no: u64,
}

impl<D: Driver> ReplayEngine<D> {
    pub fn new(driver: D, config: ReplayConfig) -> Self {
        Self {
            driver,
            config,
            profiler: NullProfiler,
            sink: NullSink,
            contexts: ContextStore::new(),
            regions: RegionTracker::new(),
            pipeline_to_active_program: HashMap::new(),
            pipeline_has_been_bound: false,
            frame_no: 0,
        }
    }
}

impl<D: Driver, P: Profiler, F: FrameSink> ReplayEngine<D, P, F> {
    /// Replace the profiling collaborator
    pub fn with_profiler<P2: Profiler>(self, profiler: P2) -> ReplayEngine<D, P2, F> {
        ReplayEngine {
            driver: self.driver,
            config: self.config,
            profiler,
            sink: self.sink,
            contexts: self.contexts,
            regions: self.regions,
            pipeline_to_active_program: self.pipeline_to_active_program,
            pipeline_has_been_bound: self.pipeline_has_been_bound,
            frame_no: self.frame_no,
        }
    }

    /// Replace the presentation/snapshot collaborator
    pub fn with_sink<F2: FrameSink>(self, sink: F2) -> ReplayEngine<D, P, F2> {
        ReplayEngine {
            driver: self.driver,
            config: self.config,
            profiler: self.profiler,
            sink,
            contexts: self.contexts,
            regions: self.regions,
            pipeline_to_active_program: self.pipeline_to_active_program,
            pipeline_has_been_bound: self.pipeline_has_been_bound,
            frame_no: self.frame_no,
        }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn profiler(&self) -> &P {
        &self.profiler
    }

    pub fn sink(&self) -> &F {
        &self.sink
    }

    pub fn regions(&self) -> &RegionTracker {
        &self.regions
    }

    pub fn current_context(&self) -> Option<&ContextState> {
        self.contexts.current()
    }

    pub fn frame_no(&self) -> u64 {
        self.frame_no
    }

    /// True once any non-zero pipeline was bound on any context
    pub fn pipeline_has_been_bound(&self) -> bool {
        self.pipeline_has_been_bound
    }

    /// The program last made active on a pipeline, if recorded
    pub fn active_program_for_pipeline(&self, pipeline: u32) -> Option<u32> {
        self.pipeline_to_active_program.get(&pipeline).copied()
    }

    /// Make a context current (creating its state on first use), or leave
    /// no context current. Called by the windowing collaborator.
    pub fn make_current(&mut self, id: Option<ContextId>) {
        self.contexts.make_current(id);
    }

    /// Destroy a context and its derived state
    pub fn destroy_context(&mut self, id: ContextId) {
        self.contexts.destroy(id);
    }

    /// Mark a frame boundary detected outside the call stream (the buffer
    /// swap, in double-buffered mode)
    pub fn complete_frame(&mut self, call_no: u64) {
        self.frame_no += 1;
        self.sink.frame_complete(call_no, self.frame_no);
    }

    /// Process an entire call stream, stopping at the first fatal
    /// legality violation
    pub fn replay(
        &mut self,
        calls: impl IntoIterator<Item = Call>,
    ) -> Result<ReplaySummary, ReplayError> {
        let mut summary = ReplaySummary::default();
        for call in calls {
            match self.process_call(&call)? {
                CallOutcome::Executed(_) => summary.calls_executed += 1,
                CallOutcome::Skipped(_) => summary.calls_skipped += 1,
            }
        }
        summary.frames = self.frame_no;
        Ok(summary)
    }

    /// Process one call record
    pub fn process_call(&mut self, call: &Call) -> Result<CallOutcome, ReplayError> {
        let Some(ctx) = self.contexts.current() else {
            log::debug!("call {} ({}): no current context", call.no, call.name);
            return Ok(CallOutcome::Skipped(SkipReason::NoContext));
        };
        let cats = classify(&call.name);

        // Strict compatibility mode: the trace did not capture client-side
        // arrays, so pointer setup and draws must source a buffer object.
        if self.config.strict_client_arrays {
            if cats.intersects(CallCategories::ARRAY_POINTER | CallCategories::DRAW_ARRAYS)
                && ctx.array_buffer == 0
            {
                return Err(ReplayError::UnboundArrayBuffer {
                    call_no: call.no,
                    name: call.name.clone(),
                });
            }
            if cats.contains(CallCategories::DRAW_ELEMENTS) && ctx.element_array_buffer == 0 {
                return Err(ReplayError::UnboundElementArrayBuffer {
                    call_no: call.no,
                    name: call.name.clone(),
                });
            }
        }

        // Pack reads are no-ops without a bound pack buffer
        if cats.contains(CallCategories::PIXEL_PACK) && ctx.pixel_pack_buffer == 0 {
            return Ok(CallOutcome::Skipped(SkipReason::NoPackBuffer));
        }

        // The decoder flags every framebuffer bind as a render target
        // switch; disagreement means decoder and engine classify calls
        // differently
        if cats.contains(CallCategories::BIND_FRAMEBUFFER)
            && !call.flags.contains(CallFlags::SWAP_RENDERTARGET)
        {
            log::error!(
                "call {} ({}): framebuffer bind not flagged as a render target switch",
                call.no,
                call.name
            );
        }

        match call.name.as_str() {
            "glStringMarkerGREMEDY" => {
                return Ok(CallOutcome::Skipped(SkipReason::StringMarker));
            }
            "glFrameTerminatorGREMEDY" => {
                self.complete_frame(call.no);
                return Ok(CallOutcome::Skipped(SkipReason::FrameTerminator));
            }
            "memcpy" => {
                let dest_null = call.arg(0).map(Value::is_null).unwrap_or(true);
                let src_null = call.arg(1).map(Value::is_null).unwrap_or(true);
                if dest_null || src_null || call.arg_uint(2).unwrap_or(0) == 0 {
                    return Ok(CallOutcome::Skipped(SkipReason::NullMemcpy));
                }
            }
            "glEnable" | "glDisable" => {
                if call.arg_uint(0) == Some(GL_DEBUG_OUTPUT_SYNCHRONOUS_ARB as u64) {
                    return Ok(CallOutcome::Skipped(SkipReason::DebugSyncToggle));
                }
            }
            _ => {}
        }

        if let Some((width, height)) = inferred_drawable_size(call) {
            self.sink.update_drawable(width, height);
        }

        // glEnd leaves the bracket before the generic pipeline runs, so
        // its own span accounting counts as outside. Display list toggles
        // flip before the span decision for the same reason: queries
        // issued while recording would land inside the list.
        match call.name.as_str() {
            "glEnd" => {
                if let Some(ctx) = self.contexts.current_mut() {
                    ctx.inside_begin_end = false;
                }
            }
            "glNewList" => {
                if let Some(ctx) = self.contexts.current_mut() {
                    ctx.inside_list = true;
                }
            }
            "glEndList" => {
                if let Some(ctx) = self.contexts.current_mut() {
                    ctx.inside_list = false;
                }
            }
            _ => {}
        }

        // Resolve the mapping before the unmap executes, while the driver
        // still reports it
        if cats.contains(CallCategories::BUFFER_UNMAP) {
            self.release_mapping(call);
        }

        let profile_draw = cats.is_draw() || call.name == "glBegin";
        let suppressed = self
            .contexts
            .current()
            .map(|c| c.suppresses_profiling())
            .unwrap_or(true);
        if self.config.profiling && call.name != "glEnd" && !suppressed {
            let program = self
                .contexts
                .current()
                .map(|c| c.active_program)
                .unwrap_or(0);
            self.profiler.begin_call(call, program, profile_draw);
        }

        let strategy = DispatchStrategy::select(call, &self.config);
        let result = dispatch::dispatch(&mut self.driver, call, strategy);

        if call.name == "glBegin" {
            if let Some(ctx) = self.contexts.current_mut() {
                ctx.inside_begin_end = true;
            }
        }

        // glBegin's span stays open here (the flag was just set) and is
        // closed by the matching glEnd, timing the bracket as one span
        let suppressed = self
            .contexts
            .current()
            .map(|c| c.suppresses_profiling())
            .unwrap_or(true);
        if self.config.profiling && !suppressed {
            self.profiler.end_call(call, profile_draw);
        }

        self.apply_state_transitions(call);

        if cats.contains(CallCategories::BUFFER_MAP) {
            self.register_mapping(call, result.as_ref());
        }

        let inside_bracket = self
            .contexts
            .current()
            .map(|c| c.inside_begin_end)
            .unwrap_or(true);
        if self.config.debug && !inside_bracket {
            self.run_diagnostics(call, cats, result.as_ref());
        }

        // Without double buffering an explicit flush/finish ends the
        // frame; with it, the buffer swap does (reported through
        // complete_frame by the windowing collaborator)
        if matches!(call.name.as_str(), "glFlush" | "glFinish") && !self.config.double_buffer {
            self.complete_frame(call.no);
        }

        if cats.intersects(
            CallCategories::DRAW_ARRAYS | CallCategories::DRAW_ELEMENTS | CallCategories::MISC_DRAW,
        ) && !call.flags.contains(CallFlags::RENDER)
        {
            log::error!(
                "call {} ({}): draw not flagged as a render operation",
                call.no,
                call.name
            );
        }

        Ok(CallOutcome::Executed(result))
    }

    fn apply_state_transitions(&mut self, call: &Call) {
        match call.name.as_str() {
            "glBindBuffer" => {
                let target = BufferTarget::from_gl(call.arg_uint(0).unwrap_or(0) as u32);
                let buffer = call.arg_uint(1).unwrap_or(0) as u32;
                if let Some(ctx) = self.contexts.current_mut() {
                    ctx.bind_buffer(target, buffer);
                }
            }
            "glUseProgram" | "glUseProgramObjectARB" => {
                let program = call.arg_uint(0).unwrap_or(0) as u32;
                if let Some(ctx) = self.contexts.current_mut() {
                    ctx.program = program;
                }
            }
            "glBindProgramPipeline" | "glBindProgramPipelineEXT" => {
                let pipeline = call.arg_uint(0).unwrap_or(0) as u32;
                if pipeline != 0 {
                    self.pipeline_has_been_bound = true;
                }
                let restored = if pipeline != 0 {
                    self.pipeline_to_active_program.get(&pipeline).copied()
                } else {
                    None
                };
                if let Some(ctx) = self.contexts.current_mut() {
                    ctx.program_pipeline = pipeline;
                    if let Some(program) = restored {
                        ctx.active_program = program;
                    }
                }
            }
            "glActiveShaderProgram" => {
                let pipeline = call.arg_uint(0).unwrap_or(0) as u32;
                let program = call.arg_uint(1).unwrap_or(0) as u32;
                if pipeline != 0 {
                    self.pipeline_to_active_program.insert(pipeline, program);
                }
            }
            _ => {}
        }
    }

    fn release_mapping(&mut self, call: &Call) {
        let Some(buffer) = unmap_buffer_ref(call) else {
            log::warn!(
                "call {} ({}): driver offers no mapping query for this unmap variant",
                call.no,
                call.name
            );
            return;
        };
        match self.driver.mapped_pointer(buffer) {
            Some(pointer) => {
                if self.regions.release(pointer).is_none() {
                    log::warn!(
                        "call {} ({}): unmap of unregistered mapping at {pointer:#x}",
                        call.no,
                        call.name
                    );
                }
            }
            None => {
                log::warn!(
                    "call {} ({}): no active mapping to release",
                    call.no,
                    call.name
                );
            }
        }
    }

    fn register_mapping(&mut self, call: &Call, result: Option<&Value>) {
        let Some(pointer) = result.and_then(Value::as_pointer).filter(|p| *p != 0) else {
            // Map failure; debug diagnostics report it separately
            return;
        };
        let Some((buffer_ref, offset, explicit_length)) = map_region_source(call) else {
            return;
        };
        // Whole-buffer maps take their size from the data store
        let length = match explicit_length {
            Some(length) => length,
            None => self.driver.buffer_size(buffer_ref),
        };
        let buffer = match buffer_ref {
            BufferRef::Target(target) => self
                .contexts
                .current()
                .map(|c| c.bound_buffer(target))
                .unwrap_or(0),
            BufferRef::Name(name) => name,
        };
        self.regions.register(
            pointer,
            Region {
                buffer,
                offset,
                length,
            },
        );
    }
}

fn map_region_source(call: &Call) -> Option<(BufferRef, i64, Option<i64>)> {
    match call.name.as_str() {
        "glMapBuffer" | "glMapBufferARB" | "glMapBufferOES" => {
            let target = BufferTarget::from_gl(call.arg_uint(0)? as u32);
            Some((BufferRef::Target(target), 0, None))
        }
        "glMapBufferRange" => {
            let target = BufferTarget::from_gl(call.arg_uint(0)? as u32);
            Some((
                BufferRef::Target(target),
                call.arg_sint(1).unwrap_or(0),
                Some(call.arg_sint(2).unwrap_or(0)),
            ))
        }
        "glMapNamedBufferEXT" | "glMapObjectBufferATI" => {
            Some((BufferRef::Name(call.arg_uint(0)? as u32), 0, None))
        }
        "glMapNamedBufferRangeEXT" => Some((
            BufferRef::Name(call.arg_uint(0)? as u32),
            call.arg_sint(1).unwrap_or(0),
            Some(call.arg_sint(2).unwrap_or(0)),
        )),
        _ => None,
    }
}

fn unmap_buffer_ref(call: &Call) -> Option<BufferRef> {
    match call.name.as_str() {
        "glUnmapBuffer" | "glUnmapBufferARB" | "glUnmapBufferOES" => {
            let target = BufferTarget::from_gl(call.arg_uint(0)? as u32);
            Some(BufferRef::Target(target))
        }
        "glUnmapNamedBufferEXT" => Some(BufferRef::Name(call.arg_uint(0)? as u32)),
        // The ATI object buffer variant has no mapping query
        _ => None,
    }
}

// Some applications never call glViewport and only blit to the drawable,
// so blit destinations participate in size inference too.
fn inferred_drawable_size(call: &Call) -> Option<(i32, i32)> {
    match call.name.as_str() {
        "glViewport" => {
            let x = call.arg_sint(0)?;
            let y = call.arg_sint(1)?;
            let width = call.arg_sint(2)?;
            let height = call.arg_sint(3)?;
            Some(((x + width) as i32, (y + height) as i32))
        }
        "glViewportArray" => {
            // Only the first viewport describes the drawable
            if call.arg_uint(0)? != 0 || call.arg_sint(1)? <= 0 {
                return None;
            }
            viewport_rect(call.arg(2)?)
        }
        "glViewportIndexedf" => {
            if call.arg_uint(0)? != 0 {
                return None;
            }
            let x = call.arg(1)?.as_f64()?;
            let y = call.arg(2)?.as_f64()?;
            let width = call.arg(3)?.as_f64()?;
            let height = call.arg(4)?.as_f64()?;
            Some(((x + width) as i32, (y + height) as i32))
        }
        "glViewportIndexedfv" => {
            if call.arg_uint(0)? != 0 {
                return None;
            }
            viewport_rect(call.arg(1)?)
        }
        "glBlitFramebuffer" | "glBlitFramebufferEXT" => {
            let dst_x0 = call.arg_sint(4)?;
            let dst_y0 = call.arg_sint(5)?;
            let dst_x1 = call.arg_sint(6)?;
            let dst_y1 = call.arg_sint(7)?;
            Some((dst_x0.max(dst_x1) as i32, dst_y0.max(dst_y1) as i32))
        }
        _ => None,
    }
}

fn viewport_rect(value: &Value) -> Option<(i32, i32)> {
    let Value::Array(v) = value else {
        return None;
    };
    let x = v.first()?.as_f64()?;
    let y = v.get(1)?.as_f64()?;
    let width = v.get(2)?.as_f64()?;
    let height = v.get(3)?.as_f64()?;
    Some(((x + width) as i32, (y + height) as i32))
}

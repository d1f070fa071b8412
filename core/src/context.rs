//! Per-context derived state
//!
//! The trace stream does not repeat bindings per call, so the engine
//! reconstructs them here incrementally. One [`ContextState`] is live per
//! rendering context; it is created lazily the first time the context
//! becomes current and discarded when the context is destroyed.

use hashbrown::HashMap;

use crate::types::BufferTarget;

/// Opaque context identifier assigned by the windowing collaborator
pub type ContextId = u64;

/// Derived state for one rendering context
#[derive(Debug, Clone, Default)]
pub struct ContextState {
    /// Buffer bound to the array target
    pub array_buffer: u32,
    /// Buffer bound to the element-array target
    pub element_array_buffer: u32,
    /// Buffer bound to the pixel-pack target
    pub pixel_pack_buffer: u32,
    /// Program made current with glUseProgram
    pub program: u32,
    /// Pipeline made current with glBindProgramPipeline
    pub program_pipeline: u32,
    /// Active program for the current pipeline
    pub active_program: u32,
    /// Recording a display list; timing queries would land in the list
    pub inside_list: bool,
    /// Between glBegin and glEnd; most queries are invalid here
    pub inside_begin_end: bool,
}

impl ContextState {
    /// Read the binding field for a tracked buffer target
    pub fn bound_buffer(&self, target: BufferTarget) -> u32 {
        match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self.element_array_buffer,
            BufferTarget::PixelPack => self.pixel_pack_buffer,
            BufferTarget::Other(_) => 0,
        }
    }

    /// Update the binding field for a buffer target; untracked targets
    /// leave state unchanged
    pub fn bind_buffer(&mut self, target: BufferTarget, buffer: u32) {
        match target {
            BufferTarget::Array => self.array_buffer = buffer,
            BufferTarget::ElementArray => self.element_array_buffer = buffer,
            BufferTarget::PixelPack => self.pixel_pack_buffer = buffer,
            BufferTarget::Other(_) => {}
        }
    }

    /// True while profiling spans must be suppressed
    pub fn suppresses_profiling(&self) -> bool {
        self.inside_list || self.inside_begin_end
    }
}

/// Store of all live contexts plus the current one.
///
/// Switching the current context is the serialization point for state
/// access; contexts themselves are independent.
#[derive(Debug, Default)]
pub struct ContextStore {
    contexts: HashMap<ContextId, ContextState>,
    current: Option<ContextId>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a context current, creating its state on first use.
    /// `None` leaves no context current.
    pub fn make_current(&mut self, id: Option<ContextId>) {
        if let Some(id) = id {
            self.contexts.entry(id).or_default();
        }
        self.current = id;
    }

    /// Destroy a context and its state. Destroying the current context
    /// leaves no context current.
    pub fn destroy(&mut self, id: ContextId) {
        self.contexts.remove(&id);
        if self.current == Some(id) {
            self.current = None;
        }
    }

    pub fn current_id(&self) -> Option<ContextId> {
        self.current
    }

    pub fn current(&self) -> Option<&ContextState> {
        self.current.and_then(|id| self.contexts.get(&id))
    }

    pub fn current_mut(&mut self) -> Option<&mut ContextState> {
        self.current.and_then(|id| self.contexts.get_mut(&id))
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

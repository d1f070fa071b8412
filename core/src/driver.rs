//! Collaborator traits
//!
//! The engine never talks to a real GL implementation directly. The
//! [`Driver`] trait is the black box that executes calls and answers the
//! narrow set of queries the engine needs for diagnostics and region
//! tracking; [`FrameSink`] receives frame boundaries and drawable size
//! updates for presentation or snapshotting.

use crate::types::{
    BufferTarget, Call, GL_INVALID_ENUM, GL_INVALID_FRAMEBUFFER_OPERATION, GL_INVALID_OPERATION,
    GL_INVALID_VALUE, GL_OUT_OF_MEMORY, GL_STACK_OVERFLOW, GL_STACK_UNDERFLOW, GL_TABLE_TOO_LARGE,
    Value,
};

/// How to address a buffer object in a driver query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferRef {
    /// Through its bind target on the current context
    Target(BufferTarget),
    /// Directly by object name (named-buffer entry points)
    Name(u32),
}

/// The live GL implementation behind the replay.
///
/// `invoke` is synchronous and blocking; a hung driver is outside the
/// engine's recovery scope. The query methods are only called in debug
/// mode or for map/unmap bookkeeping, never on the hot path.
pub trait Driver {
    /// Execute one call and return its result, if any
    fn invoke(&mut self, call: &Call) -> Option<Value>;

    /// Drain one pending error code; 0 means none
    fn get_error(&mut self) -> u32;

    /// Size in bytes of a buffer object's data store
    fn buffer_size(&mut self, buffer: BufferRef) -> i64;

    /// Pointer of the buffer's active mapping, if any
    fn mapped_pointer(&mut self, buffer: BufferRef) -> Option<u64>;

    fn shader_compile_status(&mut self, shader: u32) -> bool;
    fn shader_info_log(&mut self, shader: u32) -> String;
    fn program_link_status(&mut self, program: u32) -> bool;
    fn program_info_log(&mut self, program: u32) -> String;
}

/// Presentation/snapshot collaborator
pub trait FrameSink {
    /// A frame boundary was reached at the given call
    fn frame_complete(&mut self, call_no: u64, frame_no: u64);

    /// The drawable size was inferred from viewport or blit arguments
    fn update_drawable(&mut self, width: i32, height: i32);
}

/// Sink that discards all notifications
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn frame_complete(&mut self, _call_no: u64, _frame_no: u64) {}
    fn update_drawable(&mut self, _width: i32, _height: i32) {}
}

/// Symbolic name for a glGetError code, for warnings
pub fn gl_error_name(error: u32) -> &'static str {
    match error {
        GL_INVALID_ENUM => "GL_INVALID_ENUM",
        GL_INVALID_VALUE => "GL_INVALID_VALUE",
        GL_INVALID_OPERATION => "GL_INVALID_OPERATION",
        GL_STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        GL_STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        GL_OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        GL_INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        GL_TABLE_TOO_LARGE => "GL_TABLE_TOO_LARGE",
        _ => "unknown error",
    }
}

//! Core types for the replay engine
//!
//! This module defines the decoded call record handed to the engine by the
//! trace decoder, plus the handful of GL enum values the engine itself
//! interprets.

use serde::{Deserialize, Serialize};

// Buffer bind targets the engine tracks.
pub const GL_ARRAY_BUFFER: u32 = 0x8892;
pub const GL_ELEMENT_ARRAY_BUFFER: u32 = 0x8893;
pub const GL_PIXEL_PACK_BUFFER: u32 = 0x88EB;

// Framebuffer completeness.
pub const GL_FRAMEBUFFER_COMPLETE: u32 = 0x8CD5;

// Shader program decomposition.
pub const GL_PROGRAM_SEPARABLE: u32 = 0x8258;
pub const GL_TRUE: u32 = 1;

// Capability toggled by traces captured with a debug context. Replay does
// not request one, so the toggle is dropped.
pub const GL_DEBUG_OUTPUT_SYNCHRONOUS_ARB: u32 = 0x8242;

// Error codes surfaced by `glGetError`.
pub const GL_NO_ERROR: u32 = 0;
pub const GL_INVALID_ENUM: u32 = 0x0500;
pub const GL_INVALID_VALUE: u32 = 0x0501;
pub const GL_INVALID_OPERATION: u32 = 0x0502;
pub const GL_STACK_OVERFLOW: u32 = 0x0503;
pub const GL_STACK_UNDERFLOW: u32 = 0x0504;
pub const GL_OUT_OF_MEMORY: u32 = 0x0505;
pub const GL_INVALID_FRAMEBUFFER_OPERATION: u32 = 0x0506;
pub const GL_TABLE_TOO_LARGE: u32 = 0x8031;

/// A decoded argument or return value.
///
/// Pointers are kept as the raw address recorded in the trace; the decoder
/// has already swizzled them where needed, so the engine only compares and
/// forwards them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    SInt(i64),
    UInt(u64),
    Double(f64),
    String(String),
    Blob(Vec<u8>),
    Pointer(u64),
    Array(Vec<Value>),
}

impl Value {
    /// Interpret as an unsigned integer (object handles, enums)
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::SInt(v) if *v >= 0 => Some(*v as u64),
            Value::Bool(v) => Some(*v as u64),
            Value::Pointer(v) => Some(*v),
            _ => None,
        }
    }

    /// Interpret as a signed integer (locations, sizes)
    pub fn as_sint(&self) -> Option<i64> {
        match self {
            Value::SInt(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            Value::Bool(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Interpret as a floating point number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::SInt(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Interpret as a pointer-like address
    pub fn as_pointer(&self) -> Option<u64> {
        match self {
            Value::Pointer(v) => Some(*v),
            Value::UInt(v) => Some(*v),
            Value::Null => Some(0),
            _ => None,
        }
    }

    /// True for null and null-pointer values
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Pointer(0))
    }
}

bitflags::bitflags! {
    /// Metadata flags attached to a call by the trace decoder
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CallFlags: u8 {
        /// Call renders into the current render target
        const RENDER = 0b0000_0001;
        /// Call switches the current render target
        const SWAP_RENDERTARGET = 0b0000_0010;
        /// Call ends the current frame (buffer swap)
        const END_FRAME = 0b0000_0100;
        /// Call is an annotation marker, not a real API call
        const MARKER = 0b0000_1000;
    }
}

// Manual serde implementation for CallFlags
impl Serialize for CallFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CallFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(CallFlags::from_bits_truncate(bits))
    }
}

/// One decoded call record from the trace.
///
/// The recorded return value, when present, is only ever compared against
/// the replayed result for diagnostics. It never drives replay decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    /// Position in the trace stream
    pub no: u64,
    /// API entry point name
    pub name: String,
    /// Ordered argument list
    pub args: Vec<Value>,
    /// Return value captured at record time
    pub ret: Option<Value>,
    /// Decoder-supplied metadata
    pub flags: CallFlags,
}

impl Call {
    /// Create a call record with no recorded return value and no flags
    pub fn new(no: u64, name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            no,
            name: name.into(),
            args,
            ret: None,
            flags: CallFlags::empty(),
        }
    }

    /// Attach decoder metadata flags
    pub fn with_flags(mut self, flags: CallFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Attach the recorded return value
    pub fn with_ret(mut self, ret: Value) -> Self {
        self.ret = Some(ret);
        self
    }

    /// Get an argument by position
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Get an argument as an unsigned integer
    pub fn arg_uint(&self, index: usize) -> Option<u64> {
        self.args.get(index).and_then(Value::as_uint)
    }

    /// Get an argument as a signed integer
    pub fn arg_sint(&self, index: usize) -> Option<i64> {
        self.args.get(index).and_then(Value::as_sint)
    }
}

/// Buffer bind target, decoded from the raw GL enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferTarget {
    Array,
    ElementArray,
    PixelPack,
    /// Any target the engine does not track
    Other(u32),
}

impl BufferTarget {
    pub fn from_gl(raw: u32) -> Self {
        match raw {
            GL_ARRAY_BUFFER => BufferTarget::Array,
            GL_ELEMENT_ARRAY_BUFFER => BufferTarget::ElementArray,
            GL_PIXEL_PACK_BUFFER => BufferTarget::PixelPack,
            other => BufferTarget::Other(other),
        }
    }

    pub fn to_gl(self) -> u32 {
        match self {
            BufferTarget::Array => GL_ARRAY_BUFFER,
            BufferTarget::ElementArray => GL_ELEMENT_ARRAY_BUFFER,
            BufferTarget::PixelPack => GL_PIXEL_PACK_BUFFER,
            BufferTarget::Other(raw) => raw,
        }
    }
}

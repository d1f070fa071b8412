//! Call classifier
//!
//! Partitions API entry points into the overlapping categories the engine
//! acts on. Membership is pure data: adding an entry point to a category
//! means adding its name to the matching table below. Unknown names match
//! no category.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Categories a call can belong to (not mutually exclusive)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CallCategories: u16 {
        /// Sets up a client-side array pointer
        const ARRAY_POINTER = 0b0_0000_0001;
        /// Non-indexed draw
        const DRAW_ARRAYS = 0b0_0000_0010;
        /// Indexed draw
        const DRAW_ELEMENTS = 0b0_0000_0100;
        /// Draw with parameters sourced from a buffer object
        const DRAW_INDIRECT = 0b0_0000_1000;
        /// Other rendering calls (clears, blits, display list replay)
        const MISC_DRAW = 0b0_0001_0000;
        /// Binds a framebuffer object
        const BIND_FRAMEBUFFER = 0b0_0010_0000;
        /// Packs pixel data into the bound pack buffer
        const PIXEL_PACK = 0b0_0100_0000;
        /// Maps a buffer object into client memory
        const BUFFER_MAP = 0b0_1000_0000;
        /// Unmaps a buffer object
        const BUFFER_UNMAP = 0b1_0000_0000;
    }
}

impl CallCategories {
    /// Any category that counts as a draw for profiling purposes
    pub fn is_draw(self) -> bool {
        self.intersects(
            CallCategories::DRAW_ARRAYS
                | CallCategories::DRAW_ELEMENTS
                | CallCategories::DRAW_INDIRECT
                | CallCategories::MISC_DRAW,
        )
    }
}

// Manual serde implementation for CallCategories
impl Serialize for CallCategories {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CallCategories {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u16::deserialize(deserializer)?;
        Ok(CallCategories::from_bits_truncate(bits))
    }
}

const ARRAY_POINTER_CALLS: &[&str] = &[
    "glVertexPointer",
    "glNormalPointer",
    "glColorPointer",
    "glIndexPointer",
    "glTexCoordPointer",
    "glEdgeFlagPointer",
    "glFogCoordPointer",
    "glSecondaryColorPointer",
    "glInterleavedArrays",
    "glVertexPointerEXT",
    "glNormalPointerEXT",
    "glColorPointerEXT",
    "glIndexPointerEXT",
    "glTexCoordPointerEXT",
    "glEdgeFlagPointerEXT",
    "glFogCoordPointerEXT",
    "glSecondaryColorPointerEXT",
    "glVertexAttribPointer",
    "glVertexAttribPointerARB",
    "glVertexAttribPointerNV",
    "glVertexAttribIPointer",
    "glVertexAttribIPointerEXT",
    "glVertexAttribLPointer",
    "glVertexAttribLPointerEXT",
];

const DRAW_ARRAYS_CALLS: &[&str] = &[
    "glDrawArrays",
    "glDrawArraysEXT",
    "glDrawArraysIndirect",
    "glDrawArraysInstanced",
    "glDrawArraysInstancedARB",
    "glDrawArraysInstancedEXT",
    "glDrawArraysInstancedBaseInstance",
    "glDrawMeshArraysSUN",
    "glMultiDrawArrays",
    "glMultiDrawArraysEXT",
    "glMultiModeDrawArraysIBM",
    "glMultiDrawArraysIndirect",
    "glMultiDrawArraysIndirectAMD",
];

const DRAW_ELEMENTS_CALLS: &[&str] = &[
    "glDrawElements",
    "glDrawElementsBaseVertex",
    "glDrawElementsIndirect",
    "glDrawElementsInstanced",
    "glDrawElementsInstancedARB",
    "glDrawElementsInstancedEXT",
    "glDrawElementsInstancedBaseVertex",
    "glDrawElementsInstancedBaseInstance",
    "glDrawElementsInstancedBaseVertexBaseInstance",
    "glDrawRangeElements",
    "glDrawRangeElementsEXT",
    "glDrawRangeElementsBaseVertex",
    "glMultiDrawElements",
    "glMultiDrawElementsBaseVertex",
    "glMultiDrawElementsEXT",
    "glMultiModeDrawElementsIBM",
    "glMultiDrawElementsIndirect",
    "glMultiDrawElementsIndirectAMD",
];

const DRAW_INDIRECT_CALLS: &[&str] = &[
    "glDrawArraysIndirect",
    "glDrawElementsIndirect",
    "glMultiDrawArraysIndirect",
    "glMultiDrawArraysIndirectAMD",
    "glMultiDrawElementsIndirect",
    "glMultiDrawElementsIndirectAMD",
];

const MISC_DRAW_CALLS: &[&str] = &[
    "glCallList",
    "glCallLists",
    "glClear",
    "glEnd",
    "glDrawPixels",
    "glBlitFramebuffer",
    "glBlitFramebufferEXT",
];

const BIND_FRAMEBUFFER_CALLS: &[&str] = &[
    "glBindFramebuffer",
    "glBindFramebufferEXT",
    "glBindFramebufferOES",
];

// Calls that pack into the current pixel buffer object. See the
// ARB_pixel_buffer_object specification.
const PIXEL_PACK_CALLS: &[&str] = &[
    "glGetCompressedTexImage",
    "glGetCompressedTexImageARB",
    "glGetCompressedTextureImageEXT",
    "glGetCompressedMultiTexImageEXT",
    "glGetConvolutionFilter",
    "glGetHistogram",
    "glGetMinmax",
    "glGetPixelMapfv",
    "glGetPixelMapuiv",
    "glGetPixelMapusv",
    "glGetPolygonStipple",
    "glGetSeparableFilter",
    "glGetTexImage",
    "glGetTextureImageEXT",
    "glGetMultiTexImageEXT",
    "glReadPixels",
    "glGetnCompressedTexImageARB",
    "glGetnConvolutionFilterARB",
    "glGetnHistogramARB",
    "glGetnMinmaxARB",
    "glGetnPixelMapfvARB",
    "glGetnPixelMapuivARB",
    "glGetnPixelMapusvARB",
    "glGetnPolygonStippleARB",
    "glGetnSeparableFilterARB",
    "glGetnTexImageARB",
    "glReadnPixelsARB",
];

const BUFFER_MAP_CALLS: &[&str] = &[
    "glMapBuffer",
    "glMapBufferARB",
    "glMapBufferOES",
    "glMapBufferRange",
    "glMapNamedBufferEXT",
    "glMapNamedBufferRangeEXT",
    "glMapObjectBufferATI",
];

const BUFFER_UNMAP_CALLS: &[&str] = &[
    "glUnmapBuffer",
    "glUnmapBufferARB",
    "glUnmapBufferOES",
    "glUnmapNamedBufferEXT",
    "glUnmapObjectBufferATI",
];

const CATEGORY_TABLES: &[(&[&str], CallCategories)] = &[
    (ARRAY_POINTER_CALLS, CallCategories::ARRAY_POINTER),
    (DRAW_ARRAYS_CALLS, CallCategories::DRAW_ARRAYS),
    (DRAW_ELEMENTS_CALLS, CallCategories::DRAW_ELEMENTS),
    (DRAW_INDIRECT_CALLS, CallCategories::DRAW_INDIRECT),
    (MISC_DRAW_CALLS, CallCategories::MISC_DRAW),
    (BIND_FRAMEBUFFER_CALLS, CallCategories::BIND_FRAMEBUFFER),
    (PIXEL_PACK_CALLS, CallCategories::PIXEL_PACK),
    (BUFFER_MAP_CALLS, CallCategories::BUFFER_MAP),
    (BUFFER_UNMAP_CALLS, CallCategories::BUFFER_UNMAP),
];

/// Classify a call name into its categories
pub fn classify(name: &str) -> CallCategories {
    let mut categories = CallCategories::empty();
    for (table, category) in CATEGORY_TABLES {
        if table.contains(&name) {
            categories |= *category;
        }
    }
    categories
}

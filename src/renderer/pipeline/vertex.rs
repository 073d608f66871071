//! Vertex Layout
//!
//! GPU layout of [`Vertex`](crate::resources::Vertex): one interleaved
//! buffer, five attributes.
//!
//! | Location | Attribute | Format    | Offset |
//! |----------|-----------|-----------|--------|
//! | 0        | position  | Float32x3 | 0      |
//! | 1        | normal    | Float32x3 | 12     |
//! | 2        | uv        | Float32x2 | 24     |
//! | 3        | tangent   | Float32x3 | 32     |
//! | 4        | bitangent | Float32x3 | 44     |

use crate::resources::Vertex;

pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x2,
    3 => Float32x3,
    4 => Float32x3,
];

/// Only the position attribute; used by depth-only and gizmo programs.
pub const POSITION_ONLY_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![0 => Float32x3];

pub const VERTEX_STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

#[must_use]
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

#[must_use]
pub fn position_only_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ONLY_ATTRIBUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_matches_vertex_struct() {
        assert_eq!(VERTEX_STRIDE, 56);
        let last = VERTEX_ATTRIBUTES[4];
        assert_eq!(last.offset + last.format.size(), VERTEX_STRIDE);
        assert_eq!(VERTEX_ATTRIBUTES[2].offset, 24);
        assert_eq!(VERTEX_ATTRIBUTES[3].offset, 32);
    }
}

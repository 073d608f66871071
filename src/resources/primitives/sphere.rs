use glam::{Vec2, Vec3};
use std::f32::consts::PI;

use crate::resources::mesh::{Vertex, compute_tangents};

/// Sector/stack counts of a UV sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SphereTessellation {
    /// Longitude subdivisions (around the pole axis).
    pub sectors: u32,
    /// Latitude subdivisions (pole to pole).
    pub stacks: u32,
}

impl Default for SphereTessellation {
    fn default() -> Self {
        Self {
            sectors: 32,
            stacks: 32,
        }
    }
}

impl SphereTessellation {
    /// Lowest tessellation that still produces a closed solid.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            sectors: self.sectors.max(3),
            stacks: self.stacks.max(2),
        }
    }
}

/// Unit-radius UV sphere with its poles on the Z axis.
///
/// Vertices are laid out stack by stack from +Z to -Z, each stack holding
/// `sectors + 1` vertices so the uv seam gets duplicated positions.
/// The pole rows emit a single triangle per sector.
#[must_use]
pub fn create_sphere(tessellation: SphereTessellation) -> (Vec<Vertex>, Vec<u32>) {
    let SphereTessellation { sectors, stacks } = tessellation.clamped();

    let sector_step = 2.0 * PI / sectors as f32;
    let stack_step = PI / stacks as f32;

    let mut vertices = Vec::with_capacity(((sectors + 1) * (stacks + 1)) as usize);
    for i in 0..=stacks {
        let stack_angle = PI / 2.0 - i as f32 * stack_step;
        let xy = stack_angle.cos();
        let z = stack_angle.sin();

        for j in 0..=sectors {
            let sector_angle = j as f32 * sector_step;
            let position = Vec3::new(xy * sector_angle.cos(), xy * sector_angle.sin(), z);
            let uv = Vec2::new(j as f32 / sectors as f32, i as f32 / stacks as f32);
            vertices.push(Vertex::new(position, position, uv));
        }
    }

    let mut indices = Vec::with_capacity((sectors * stacks * 6) as usize);
    for i in 0..stacks {
        let mut k1 = i * (sectors + 1);
        let mut k2 = k1 + sectors + 1;
        for _ in 0..sectors {
            if i != 0 {
                indices.extend_from_slice(&[k1, k2, k1 + 1]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
            }
            k1 += 1;
            k2 += 1;
        }
    }

    compute_tangents(&mut vertices, &indices);
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sphere_vertex_and_index_counts() {
        let (vertices, indices) = create_sphere(SphereTessellation::default());
        assert_eq!(vertices.len(), 33 * 33);
        // Two triangles per cell, minus one per sector on each pole row.
        assert_eq!(indices.len(), (32 * 32 * 2 - 2 * 32) * 3);
    }

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let (vertices, _) = create_sphere(SphereTessellation { sectors: 12, stacks: 6 });
        for v in &vertices {
            assert!((v.position.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn degenerate_tessellation_is_clamped() {
        let t = SphereTessellation { sectors: 1, stacks: 0 }.clamped();
        assert_eq!(t, SphereTessellation { sectors: 3, stacks: 2 });
    }
}

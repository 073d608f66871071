//! Mesh resource.
//!
//! A [`Mesh`] is CPU-side geometry plus a type tag. The renderer keeps the
//! matching GPU buffers in its mesh cache and re-uploads them whenever the
//! mesh revision changes.

use glam::{Vec2, Vec3};

use crate::resources::primitives::{self, SphereTessellation};

/// Interleaved vertex as uploaded to the GPU.
///
/// Layout: position, normal, uv, tangent, bitangent (14 floats, 56 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub tangent: Vec3,
    pub bitangent: Vec3,
}

impl Vertex {
    #[must_use]
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
            tangent: Vec3::ZERO,
            bitangent: Vec3::ZERO,
        }
    }
}

/// Type tag of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshType {
    /// Procedural unit cube (24 vertices, ±0.5).
    Cube,
    /// Procedural UV sphere with editable tessellation.
    Sphere,
    /// Externally supplied geometry (imported models).
    Other,
}

/// Geometry resource owned by the registry.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    mesh_type: MeshType,
    tessellation: Option<SphereTessellation>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    revision: u64,
}

impl Mesh {
    /// Generates a procedural mesh for `mesh_type`.
    ///
    /// `MeshType::Other` has no procedural form and yields an empty mesh.
    #[must_use]
    pub fn procedural(mesh_type: MeshType) -> Self {
        match mesh_type {
            MeshType::Cube => {
                let (vertices, indices) = primitives::create_cube();
                Self::from_parts(MeshType::Cube, None, vertices, indices)
            }
            MeshType::Sphere => {
                let tessellation = SphereTessellation::default();
                let (vertices, indices) = primitives::create_sphere(tessellation);
                Self::from_parts(MeshType::Sphere, Some(tessellation), vertices, indices)
            }
            MeshType::Other => Self::from_parts(MeshType::Other, None, Vec::new(), Vec::new()),
        }
    }

    /// Wraps externally supplied geometry.
    ///
    /// Tangents are generated when the supplied vertices carry none.
    #[must_use]
    pub fn from_geometry(mut vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        if vertices.iter().all(|v| v.tangent == Vec3::ZERO) {
            compute_tangents(&mut vertices, &indices);
        }
        Self::from_parts(MeshType::Other, None, vertices, indices)
    }

    fn from_parts(
        mesh_type: MeshType,
        tessellation: Option<SphereTessellation>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    ) -> Self {
        Self {
            name: String::new(),
            mesh_type,
            tessellation,
            vertices,
            indices,
            revision: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn mesh_type(&self) -> MeshType {
        self.mesh_type
    }

    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Current sphere tessellation, `None` for non-sphere meshes.
    #[inline]
    #[must_use]
    pub fn tessellation(&self) -> Option<SphereTessellation> {
        self.tessellation
    }

    /// Monotonic stamp of the current geometry; changes on every regeneration.
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    /// Regenerates sphere geometry. Returns `false` for non-sphere meshes.
    pub(crate) fn retessellate(&mut self, tessellation: SphereTessellation) -> bool {
        if self.mesh_type != MeshType::Sphere {
            return false;
        }
        let tessellation = tessellation.clamped();
        let (vertices, indices) = primitives::create_sphere(tessellation);
        self.vertices = vertices;
        self.indices = indices;
        self.tessellation = Some(tessellation);
        true
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Fills per-vertex tangents and bitangents from uv derivatives.
///
/// Triangle contributions are accumulated, then each tangent is
/// Gram-Schmidt orthogonalised against its normal. Vertices touched only by
/// degenerate uv triangles receive an arbitrary frame perpendicular to the
/// normal.
pub fn compute_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    let mut tangents = vec![Vec3::ZERO; vertices.len()];
    let mut bitangents = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }
        let (v0, v1, v2) = (vertices[i0], vertices[i1], vertices[i2]);

        let edge1 = v1.position - v0.position;
        let edge2 = v2.position - v0.position;
        let duv1 = v1.uv - v0.uv;
        let duv2 = v2.uv - v0.uv;

        let det = duv1.x * duv2.y - duv2.x * duv1.y;
        if det.abs() < 1e-8 {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (edge1 * duv2.y - edge2 * duv1.y) * r;
        let bitangent = (edge2 * duv1.x - edge1 * duv2.x) * r;

        for i in [i0, i1, i2] {
            tangents[i] += tangent;
            bitangents[i] += bitangent;
        }
    }

    for (i, vertex) in vertices.iter_mut().enumerate() {
        let n = vertex.normal.normalize_or(Vec3::Y);
        let t = tangents[i] - n * n.dot(tangents[i]);
        let t = if t.length_squared() > 1e-12 {
            t.normalize()
        } else {
            n.any_orthonormal_vector()
        };
        let mut b = n.cross(t);
        if bitangents[i].dot(b) < 0.0 {
            b = -b;
        }
        vertex.tangent = t;
        vertex.bitangent = b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_tangents_are_unit_and_orthogonal() {
        let mesh = Mesh::procedural(MeshType::Cube);
        for v in mesh.vertices() {
            assert!((v.tangent.length() - 1.0).abs() < 1e-4);
            assert!(v.tangent.dot(v.normal).abs() < 1e-4);
            assert!(v.bitangent.dot(v.normal).abs() < 1e-4);
        }
    }

    #[test]
    fn retessellate_only_applies_to_spheres() {
        let mut cube = Mesh::procedural(MeshType::Cube);
        assert!(!cube.retessellate(SphereTessellation { sectors: 8, stacks: 8 }));

        let mut sphere = Mesh::procedural(MeshType::Sphere);
        assert!(sphere.retessellate(SphereTessellation { sectors: 8, stacks: 4 }));
        assert_eq!(sphere.vertices().len(), (8 + 1) * (4 + 1));
    }
}

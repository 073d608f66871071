use glam::{Vec2, Vec3};

use crate::resources::mesh::{Vertex, compute_tangents};

/// Unit cube centred on the origin, edges spanning ±0.5.
///
/// 24 vertices (4 per face, so every face gets its own normal and uvs) and
/// 36 counter-clockwise indices.
#[must_use]
pub fn create_cube() -> (Vec<Vertex>, Vec<u32>) {
    // (normal, four corners in face order, uvs for those corners)
    let faces: [(Vec3, [[f32; 3]; 4], [[f32; 2]; 4]); 6] = [
        // Back (-Z)
        (
            Vec3::NEG_Z,
            [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]],
            [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        ),
        // Front (+Z)
        (
            Vec3::Z,
            [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]],
            [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        ),
        // Left (-X)
        (
            Vec3::NEG_X,
            [[-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5]],
            [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
        ),
        // Right (+X)
        (
            Vec3::X,
            [[0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5]],
            [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
        ),
        // Bottom (-Y)
        (
            Vec3::NEG_Y,
            [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]],
            [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
        ),
        // Top (+Y)
        (
            Vec3::Y,
            [[-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]],
            [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
        ),
    ];

    // Per-face triangle order; the winding differs per face because the
    // corner lists above walk the faces in different directions.
    let face_indices: [[u32; 6]; 6] = [
        [0, 2, 1, 2, 0, 3],
        [0, 1, 2, 2, 3, 0],
        [0, 1, 2, 2, 3, 0],
        [0, 2, 1, 2, 0, 3],
        [0, 1, 2, 2, 3, 0],
        [0, 2, 1, 2, 0, 3],
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (face, (normal, corners, uvs)) in faces.iter().enumerate() {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(uvs) {
            vertices.push(Vertex::new(Vec3::from_array(*corner), *normal, Vec2::from_array(*uv)));
        }
        indices.extend(face_indices[face].iter().map(|i| base + i));
    }

    compute_tangents(&mut vertices, &indices);
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_24_vertices_and_12_triangles() {
        let (vertices, indices) = create_cube();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(vertices.iter().all(|v| v.position.abs().max_element() <= 0.5 + 1e-6));
    }

    #[test]
    fn cube_triangles_wind_counter_clockwise_outward() {
        let (vertices, indices) = create_cube();
        for tri in indices.chunks_exact(3) {
            let a = vertices[tri[0] as usize];
            let b = vertices[tri[1] as usize];
            let c = vertices[tri[2] as usize];
            let face_normal = (b.position - a.position).cross(c.position - a.position);
            assert!(
                face_normal.dot(a.normal) > 0.0,
                "triangle {tri:?} winds against its normal {:?}",
                a.normal
            );
        }
    }
}

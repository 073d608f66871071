//! Model import.
//!
//! A [`ModelImporter`] turns a file into plain sub-mesh data; the registry
//! then creates one mesh and one material per sub-mesh. Importers never touch
//! the registry, so a failed import leaves it unchanged.

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};

use crate::errors::{Result, UmbraError};
use crate::resources::material::{MaterialTexture, TextureKind};
use crate::resources::mesh::{Vertex, compute_tangents};

/// Geometry and texture references of one imported sub-mesh.
#[derive(Debug, Clone, Default)]
pub struct ImportedSubmesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub textures: Vec<MaterialTexture>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportedModel {
    pub submeshes: Vec<ImportedSubmesh>,
}

/// Source of model geometry.
pub trait ModelImporter {
    fn import(&self, path: &Path) -> Result<ImportedModel>;
}

/// Wavefront OBJ/MTL importer backed by `tobj`.
///
/// Faces are triangulated, missing normals are generated by smoothing face
/// normals, V is flipped to top-left uv origin and tangents are computed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjImporter;

impl ModelImporter for ObjImporter {
    fn import(&self, path: &Path) -> Result<ImportedModel> {
        let import_err = |reason: String| UmbraError::ModelImport {
            path: path.display().to_string(),
            reason,
        };

        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|e| import_err(e.to_string()))?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("No usable MTL for {}: {e}", path.display());
            Vec::new()
        });

        if models.is_empty() {
            return Err(import_err("file contains no meshes".to_string()));
        }

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let submeshes = models
            .into_iter()
            .map(|model| {
                let textures = model
                    .mesh
                    .material_id
                    .and_then(|id| materials.get(id))
                    .map(|m| material_textures(m, base_dir))
                    .unwrap_or_default();
                let (vertices, indices) = build_geometry(&model.mesh);
                ImportedSubmesh {
                    name: model.name,
                    vertices,
                    indices,
                    textures,
                }
            })
            .collect();

        let model = ImportedModel { submeshes };
        log::info!(
            "Imported {} ({} sub-meshes)",
            path.display(),
            model.submeshes.len()
        );
        Ok(model)
    }
}

fn build_geometry(mesh: &tobj::Mesh) -> (Vec<Vertex>, Vec<u32>) {
    let vertex_count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() == mesh.positions.len();
    let has_uvs = mesh.texcoords.len() / 2 == vertex_count;

    let mut vertices: Vec<Vertex> = (0..vertex_count)
        .map(|i| {
            let position = Vec3::from_slice(&mesh.positions[i * 3..i * 3 + 3]);
            let normal = if has_normals {
                Vec3::from_slice(&mesh.normals[i * 3..i * 3 + 3])
            } else {
                Vec3::ZERO
            };
            let uv = if has_uvs {
                Vec2::new(mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1])
            } else {
                Vec2::ZERO
            };
            Vertex::new(position, normal, uv)
        })
        .collect();

    let indices = mesh.indices.clone();
    if !has_normals {
        smooth_normals(&mut vertices, &indices);
    }
    compute_tangents(&mut vertices, &indices);
    (vertices, indices)
}

/// Area-weighted average of adjacent face normals.
fn smooth_normals(vertices: &mut [Vertex], indices: &[u32]) {
    for v in vertices.iter_mut() {
        v.normal = Vec3::ZERO;
    }
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
            continue;
        }
        let face = (vertices[b].position - vertices[a].position)
            .cross(vertices[c].position - vertices[a].position);
        for i in [a, b, c] {
            vertices[i].normal += face;
        }
    }
    for v in vertices.iter_mut() {
        v.normal = v.normal.normalize_or(Vec3::Y);
    }
}

/// Collects a material's texture paths, resolved against the model
/// directory. `map_Bump` feeds the normal slot and `map_Ka` the height slot.
fn material_textures(material: &tobj::Material, base_dir: &Path) -> Vec<MaterialTexture> {
    let slots = [
        (TextureKind::Diffuse, &material.diffuse_texture),
        (TextureKind::Specular, &material.specular_texture),
        (TextureKind::Normal, &material.normal_texture),
        (TextureKind::Height, &material.ambient_texture),
    ];

    let mut textures: Vec<MaterialTexture> = Vec::new();
    for (kind, name) in slots {
        let Some(name) = name else { continue };
        let path: PathBuf = base_dir.join(name.replace('\\', "/"));
        if textures.iter().any(|t| t.kind == kind && t.path == path) {
            continue;
        }
        textures.push(MaterialTexture { kind, path });
    }
    textures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_normals_of_flat_quad_point_up() {
        let mut vertices = vec![
            Vertex::new(Vec3::new(0.0, 0.0, 0.0), Vec3::ZERO, Vec2::ZERO),
            Vertex::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, Vec2::ZERO),
            Vertex::new(Vec3::new(1.0, 0.0, -1.0), Vec3::ZERO, Vec2::ZERO),
            Vertex::new(Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO, Vec2::ZERO),
        ];
        smooth_normals(&mut vertices, &[0, 1, 2, 2, 3, 0]);
        for v in &vertices {
            assert!((v.normal - Vec3::Y).length() < 1e-5);
        }
    }

    #[test]
    fn missing_file_is_an_import_error() {
        let err = ObjImporter.import(Path::new("missing/model.obj")).unwrap_err();
        assert!(matches!(err, UmbraError::ModelImport { .. }));
    }
}

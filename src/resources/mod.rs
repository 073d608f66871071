//! Core resource definitions.
//!
//! Plain data owned by the [`ResourceRegistry`](crate::registry::ResourceRegistry),
//! independent of any GPU implementation:
//! - Mesh: vertex/index data plus procedural primitives
//! - Material: Blinn-Phong colours or a texture set
//! - Shader: named WGSL source
//! - Texture: decoded texel data and placeholders
//! - Post-processing settings: SSAO, bloom, tone mapping

pub mod bloom;
pub mod material;
pub mod mesh;
pub mod primitives;
pub mod shader;
pub mod ssao;
pub mod texture;
pub mod tone_mapping;

pub use bloom::{BloomSettings, bloom_output_index};
pub use material::{MAX_TEXTURES_PER_KIND, Material, MaterialTexture, TextureKind};
pub use mesh::{Mesh, MeshType, Vertex};
pub use primitives::SphereTessellation;
pub use shader::{Shader, ShaderSource};
pub use ssao::{SsaoSettings, generate_ssao_kernel, generate_ssao_noise};
pub use texture::{ColorSpace, TextureData};
pub use tone_mapping::{ToneMappingMode, ToneMappingSettings};

//! Asset loading: images via `image`, models via `tobj`.

pub mod image_loader;
pub mod model_loader;

pub use image_loader::{
    load_cube_map, load_cube_map_or_placeholder, load_texture, load_texture_or_placeholder,
};
pub use model_loader::{ImportedModel, ImportedSubmesh, ModelImporter, ObjImporter};

//! Image decoding into [`TextureData`].

use std::path::Path;

use image::GenericImageView;

use crate::errors::{Result, UmbraError};
use crate::resources::material::TextureKind;
use crate::resources::texture::{ColorSpace, TextureData};

/// Decodes an image file into an RGBA8 texture.
pub fn load_texture(path: impl AsRef<Path>, color_space: ColorSpace) -> Result<TextureData> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(UmbraError::AssetNotFound(path.display().to_string()));
    }
    let img = image::open(path)?;
    let (width, height) = img.dimensions();

    Ok(TextureData {
        label: path.display().to_string(),
        width,
        height,
        layers: 1,
        format: color_space.rgba8_format(),
        data: img.into_rgba8().into_raw(),
    })
}

/// Loads a material texture, substituting the neutral placeholder for
/// `kind` when the file is missing or undecodable.
#[must_use]
pub fn load_texture_or_placeholder(path: &Path, kind: TextureKind) -> TextureData {
    match load_texture(path, ColorSpace::for_kind(kind)) {
        Ok(texture) => texture,
        Err(e) => {
            log::warn!(
                "Failed to load {} texture {}: {e}. Using placeholder.",
                kind.name(),
                path.display()
            );
            TextureData::placeholder(kind)
        }
    }
}

/// Loads six same-sized faces into a cube map.
///
/// Face order: right, left, top, bottom, front, back.
pub fn load_cube_map<P: AsRef<Path>>(faces: &[P]) -> Result<TextureData> {
    if faces.len() != 6 {
        return Err(UmbraError::CubeMapError(format!(
            "expected 6 face images, got {}",
            faces.len()
        )));
    }

    let mut data = Vec::new();
    let mut size = None;
    for face in faces {
        let texture = load_texture(face, ColorSpace::Srgb)?;
        match size {
            None => size = Some((texture.width, texture.height)),
            Some(s) if s != (texture.width, texture.height) => {
                return Err(UmbraError::CubeMapError(format!(
                    "face {} is {}x{}, expected {}x{}",
                    face.as_ref().display(),
                    texture.width,
                    texture.height,
                    s.0,
                    s.1
                )));
            }
            Some(_) => {}
        }
        data.extend_from_slice(&texture.data);
    }

    let (width, height) = size.unwrap_or((1, 1));
    if width != height {
        return Err(UmbraError::CubeMapError(format!(
            "faces must be square, got {width}x{height}"
        )));
    }

    Ok(TextureData {
        label: "Skybox".to_string(),
        width,
        height,
        layers: 6,
        format: ColorSpace::Srgb.rgba8_format(),
        data,
    })
}

/// [`load_cube_map`] with a 1×1 placeholder cube on failure.
#[must_use]
pub fn load_cube_map_or_placeholder<P: AsRef<Path>>(faces: &[P]) -> TextureData {
    match load_cube_map(faces) {
        Ok(cube) => cube,
        Err(e) => {
            log::warn!("Failed to load skybox: {e}. Using placeholder.");
            TextureData::placeholder_cube([40, 44, 52, 255])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_asset_not_found() {
        let err = load_texture("does/not/exist.png", ColorSpace::Srgb).unwrap_err();
        assert!(matches!(err, UmbraError::AssetNotFound(_)));
    }

    #[test]
    fn missing_texture_falls_back_to_placeholder() {
        let t = load_texture_or_placeholder(Path::new("nope.png"), TextureKind::Normal);
        assert_eq!(t, TextureData::placeholder(TextureKind::Normal));
    }

    #[test]
    fn cube_map_needs_six_faces() {
        let err = load_cube_map(&["a.png", "b.png"]).unwrap_err();
        assert!(matches!(err, UmbraError::CubeMapError(_)));
        assert!(load_cube_map_or_placeholder(&["a.png"]).is_cube());
    }
}

//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which wraps decode and upload
//! of an image file into a GPU texture.

use std::path::Path;
use std::sync::Arc;

use glow::HasContext;
use image::{DynamicImage, GenericImageView};

use crate::error::Error;

/// Represents a texture stored on the GPU side.
pub struct Texture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
    width: u32,
    height: u32,
}

impl Texture {
    /// Creates a new texture from the given [`image::DynamicImage`].
    ///
    /// The upload format follows the image's channel count (1 = RED,
    /// 3 = RGB, otherwise RGBA). Textures repeat on both axes and are
    /// mipmapped with trilinear filtering.
    pub fn new(gl: &Arc<glow::Context>, image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        let (format, data) = match image {
            DynamicImage::ImageLuma8(_) => (glow::RED, image.to_luma8().into_raw()),
            DynamicImage::ImageRgb8(_) => (glow::RGB, image.to_rgb8().into_raw()),
            _ => (glow::RGBA, image.to_rgba8().into_raw()),
        };
        unsafe {
            let texture = gl.create_texture().unwrap();
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            // Rows are tightly packed for RED/RGB data.
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                format as i32,
                width as i32,
                height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(data.as_slice())),
            );
            gl.generate_mipmap(glow::TEXTURE_2D);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            Self {
                gl: Arc::clone(gl),
                id: texture,
                width,
                height,
            }
        }
    }

    /// Decodes the image at `path` and uploads it.
    ///
    /// `flip_vertical` flips the image at decode time; model textures pass
    /// `false` because their UVs are already flipped at import.
    pub fn from_file(
        gl: &Arc<glow::Context>,
        path: &Path,
        flip_vertical: bool,
    ) -> Result<Self, Error> {
        let image = image::open(path).map_err(|e| Error::TextureLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let image = if flip_vertical { image.flipv() } else { image };
        Ok(Self::new(gl, &image))
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

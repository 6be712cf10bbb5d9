use std::io::Cursor;
use std::path::PathBuf;

use ::image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use log::debug;
use tokio::fs;

use crate::error::{AssistantError, Result};

/// Formats the inline-data endpoint accepts as-is. Anything else is re-encoded to PNG.
const PASSTHROUGH_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// An image supplied by the host, either on disk or already decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageHandle {
    Path(PathBuf),
    /// Raw RGB8 or RGBA8 pixels, row-major. The layout is inferred from the buffer length.
    Decoded {
        pixels: Vec<u8>,
        width: u32,
        height: u32,
    },
}

/// Encoded image bytes ready to be attached to a generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageHandle {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImageHandle::Path(path.into())
    }

    pub fn decoded(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        ImageHandle::Decoded {
            pixels,
            width,
            height,
        }
    }

    pub async fn resolve(&self) -> Result<InlineImage> {
        match self {
            ImageHandle::Path(path) => {
                let data = fs::read(path).await?;
                let format = ::image::guess_format(&data).map_err(|e| {
                    AssistantError::Image(format!(
                        "Invalid image format ({}): {}",
                        path.display(),
                        e
                    ))
                })?;
                debug!(
                    "Resolved image {} as {:?} ({} bytes)",
                    path.display(),
                    format,
                    data.len()
                );

                if PASSTHROUGH_FORMATS.contains(&format) {
                    return Ok(InlineImage {
                        mime_type: format.to_mime_type().to_string(),
                        data,
                    });
                }

                let image = ::image::load_from_memory_with_format(&data, format)?;
                Ok(InlineImage {
                    mime_type: "image/png".to_string(),
                    data: write_png(&image)?,
                })
            }
            ImageHandle::Decoded {
                pixels,
                width,
                height,
            } => {
                let data = encode_png(pixels, *width, *height)?;
                Ok(InlineImage {
                    mime_type: "image/png".to_string(),
                    data,
                })
            }
        }
    }
}

fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(AssistantError::Image(format!(
            "Image dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }

    let area = width as u64 * height as u64;
    let len = pixels.len() as u64;

    let image = if len == area * 4 {
        RgbaImage::from_raw(width, height, pixels.to_vec()).map(DynamicImage::ImageRgba8)
    } else if len == area * 3 {
        RgbImage::from_raw(width, height, pixels.to_vec()).map(DynamicImage::ImageRgb8)
    } else {
        None
    }
    .ok_or_else(|| {
        AssistantError::Image(format!(
            "Pixel buffer of {} bytes does not match a {}x{} RGB or RGBA image",
            pixels.len(),
            width,
            height
        ))
    })?;

    write_png(&image)
}

fn write_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    image.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

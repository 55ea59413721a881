use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::{EngineError, Result};

/// Quality used for JPEG output unless a caller asks otherwise.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Encoded image bytes and the MIME type actually produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// Decodes `bytes`, sniffing the format from its signature. Returns the RGBA
/// pixels and the detected MIME type.
pub fn decode(bytes: &[u8]) -> Result<(RgbaImage, &'static str)> {
    let format = image::guess_format(bytes).map_err(|e| EngineError::Decode(e.to_string()))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| EngineError::Decode(e.to_string()))?;
    Ok((decoded.to_rgba8(), format.to_mime_type()))
}

/// Supported output format for `mime`, PNG when unknown.
fn output_format(mime: &str) -> ImageFormat {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => ImageFormat::Jpeg,
        "image/webp" => ImageFormat::WebP,
        "image/gif" => ImageFormat::Gif,
        "image/bmp" => ImageFormat::Bmp,
        _ => ImageFormat::Png,
    }
}

/// Encodes `image` as `mime`, falling back to PNG for unknown types.
pub fn encode(image: &RgbaImage, mime: &str, jpeg_quality: u8) -> Result<Encoded> {
    let format = output_format(mime);
    let mut bytes = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)
                .map_err(|e| EngineError::Encode(e.to_string()))?;
        }
        other => {
            image
                .write_to(&mut Cursor::new(&mut bytes), other)
                .map_err(|e| EngineError::Encode(e.to_string()))?;
        }
    }
    Ok(Encoded {
        bytes,
        mime: format.to_mime_type(),
    })
}

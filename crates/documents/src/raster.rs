use core_types::RasterFormat;
use engine::codec::encode;
use image::RgbaImage;
use pdfium_render::prelude::*;

use crate::archive::NamedBuffer;
use crate::{DocumentError, Result};

/// Renders PDF pages to RGBA rasters.
pub trait PageRasterizer {
    /// Renders every page of `pdf` at `scale` pixels per point and hands each
    /// result to `visit` in page order. Returns the page count.
    fn for_each_page(
        &self,
        pdf: &[u8],
        scale: f32,
        visit: &mut dyn FnMut(usize, Result<RgbaImage>) -> Result<()>,
    ) -> Result<usize>;
}

/// PDFium-backed rasteriser. The library is bound at runtime.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Binds libpdfium from the working directory, `./lib/`, or the system
    /// library path.
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./lib/"))
            })
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| {
                DocumentError::MissingDependency(format!(
                    "The PDFium library could not be loaded. Install libpdfium or place it next to the executable ({e})"
                ))
            })?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn for_each_page(
        &self,
        pdf: &[u8],
        scale: f32,
        visit: &mut dyn FnMut(usize, Result<RgbaImage>) -> Result<()>,
    ) -> Result<usize> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| DocumentError::Corrupt {
                index: 0,
                reason: e.to_string(),
            })?;
        let pages = document.pages();
        let count = pages.len() as usize;
        for (index, page) in pages.iter().enumerate() {
            let width = (page.width().value * scale).round().max(1.0) as i32;
            let height = (page.height().value * scale).round().max(1.0) as i32;
            let config = PdfRenderConfig::new()
                .set_target_width(width)
                .set_target_height(height);
            let rendered = page
                .render_with_config(&config)
                .map(|bitmap| bitmap.as_image().to_rgba8())
                .map_err(|e| DocumentError::Render(format!("page {}: {e}", index + 1)));
            visit(index, rendered)?;
        }
        Ok(count)
    }
}

/// Encoding options for PDF→image conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Resolution multiplier, 1.0 renders one pixel per point.
    pub scale: f32,
    pub format: RasterFormat,
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            format: RasterFormat::Jpeg,
            quality: 0.92,
        }
    }
}

/// Renders each page and encodes it as `<stem>-page-<n>.<ext>`. Pages that
/// fail are skipped; fails only when no page converts.
pub fn pdf_to_images(
    rasterizer: &dyn PageRasterizer,
    pdf: &[u8],
    stem: &str,
    options: &RasterOptions,
) -> Result<Vec<NamedBuffer>> {
    if !(options.scale.is_finite() && options.scale > 0.0 && options.scale <= 8.0) {
        return Err(DocumentError::InvalidInput(format!(
            "resolution multiplier {} is outside 0-8",
            options.scale
        )));
    }
    let quality = (options.quality.clamp(0.0, 1.0) * 100.0).round() as u8;
    let mut outputs = Vec::new();

    let count = rasterizer.for_each_page(pdf, options.scale, &mut |index, rendered| {
        let page = index + 1;
        let encoded = rendered.and_then(|raster| {
            encode(&raster, options.format.mime(), quality).map_err(DocumentError::from)
        });
        match encoded {
            Ok(encoded) => outputs.push(NamedBuffer::new(
                format!("{stem}-page-{page}.{}", options.format.extension()),
                encoded.bytes,
            )),
            Err(e) => tracing::warn!(page, error = %e, "skipping page"),
        }
        Ok(())
    })?;

    if outputs.is_empty() {
        return Err(DocumentError::NoPagesConverted);
    }
    tracing::info!(converted = outputs.len(), pages = count, "rasterised PDF");
    Ok(outputs)
}

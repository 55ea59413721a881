use core_types::{FilterSettings, OverlaySettings, SourceRect};
use image::{imageops, Rgba, RgbaImage};

use crate::filters::apply_filters;
use crate::overlay::plan_overlay;
use crate::{surface, EngineError, Result};

/// Extracts `rect` from `source` into a new surface and bakes `filters` in.
pub fn crop_and_filter(
    source: &RgbaImage,
    rect: SourceRect,
    filters: &FilterSettings,
) -> Result<RgbaImage> {
    let (src_w, src_h) = source.dimensions();
    let fits = u64::from(rect.x) + u64::from(rect.width) <= u64::from(src_w)
        && u64::from(rect.y) + u64::from(rect.height) <= u64::from(src_h);
    if !fits {
        return Err(EngineError::InvalidDimensions(format!(
            "crop {}x{}+{}+{} outside {src_w}x{src_h}",
            rect.width, rect.height, rect.x, rect.y
        )));
    }
    surface::ensure_available(rect.width, rect.height)?;

    let mut out = imageops::crop_imm(source, rect.x, rect.y, rect.width, rect.height).to_image();
    apply_filters(&mut out, filters);
    tracing::debug!(
        x = rect.x,
        y = rect.y,
        width = rect.width,
        height = rect.height,
        "cropped working image"
    );
    Ok(out)
}

/// Draws `source` inset on a border-coloured canvas and stamps the optional
/// logo on top.
pub fn render_overlay(
    source: &RgbaImage,
    logo: Option<&RgbaImage>,
    settings: &OverlaySettings,
) -> Result<RgbaImage> {
    let layout = plan_overlay(
        source.width(),
        source.height(),
        logo.map(|l| l.dimensions()),
        settings,
    );
    let mut canvas = surface::allocate(
        layout.canvas_width,
        layout.canvas_height,
        Rgba(settings.border_color.to_rgba()),
    )?;
    let inset = i64::from(layout.inset);
    imageops::overlay(&mut canvas, source, inset, inset);

    if let (Some(logo), Some(placement)) = (logo, layout.logo) {
        surface::ensure_available(placement.width, placement.height)?;
        let mut scaled = if logo.dimensions() == (placement.width, placement.height) {
            logo.clone()
        } else {
            imageops::resize(
                logo,
                placement.width,
                placement.height,
                imageops::FilterType::Lanczos3,
            )
        };
        if placement.alpha < 1.0 {
            for pixel in scaled.pixels_mut() {
                pixel.0[3] = (f32::from(pixel.0[3]) * placement.alpha).round() as u8;
            }
        }
        imageops::overlay(&mut canvas, &scaled, placement.x, placement.y);
    }
    Ok(canvas)
}

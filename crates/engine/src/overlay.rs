use core_types::{LogoPosition, OverlaySettings};

/// Extra gap between the border and an anchored logo.
pub const LOGO_MARGIN: u32 = 10;

/// Where and how the logo is drawn on the bordered canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoPlacement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    /// Global alpha in `0.0..=1.0`.
    pub alpha: f32,
}

/// Geometry of a bordered, logo-stamped output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Offset of the source image inside the canvas.
    pub inset: u32,
    pub logo: Option<LogoPlacement>,
}

/// Computes the canvas and logo placement for a `source_width` x
/// `source_height` image and an optional `logo_size`.
pub fn plan_overlay(
    source_width: u32,
    source_height: u32,
    logo_size: Option<(u32, u32)>,
    settings: &OverlaySettings,
) -> OverlayLayout {
    let border = settings.border_width;
    let canvas_width = source_width.saturating_add(border.saturating_mul(2));
    let canvas_height = source_height.saturating_add(border.saturating_mul(2));

    let logo = logo_size.and_then(|(logo_w, logo_h)| {
        if logo_w == 0 || logo_h == 0 {
            return None;
        }
        let scale = finite_or(settings.scale_percent, 0.0).max(0.0) / 100.0;
        let width = (f64::from(source_width) * scale).round();
        if width < 1.0 {
            return None;
        }
        let height = (width * f64::from(logo_h) / f64::from(logo_w)).round().max(1.0);
        let (width, height) = (width as u32, height as u32);

        let margin = i64::from(border) + i64::from(LOGO_MARGIN);
        let far_x = i64::from(canvas_width) - i64::from(width) - margin;
        let far_y = i64::from(canvas_height) - i64::from(height) - margin;
        let (x, y) = match settings.position {
            LogoPosition::TopLeft => (margin, margin),
            LogoPosition::TopRight => (far_x, margin),
            LogoPosition::BottomLeft => (margin, far_y),
            LogoPosition::BottomRight => (far_x, far_y),
            LogoPosition::Center => (
                (i64::from(canvas_width) - i64::from(width)) / 2,
                (i64::from(canvas_height) - i64::from(height)) / 2,
            ),
        };
        let alpha = (finite_or(settings.opacity_percent, 100.0) / 100.0).clamp(0.0, 1.0) as f32;
        Some(LogoPlacement {
            x,
            y,
            width,
            height,
            alpha,
        })
    });

    OverlayLayout {
        canvas_width,
        canvas_height,
        inset: border,
        logo,
    }
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

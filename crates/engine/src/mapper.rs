use std::fmt;
use std::str::FromStr;

use core_types::{CropRegion, DisplaySize, SourceRect};

use crate::{EngineError, Result};

/// How display pixels scale to native pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Separate horizontal and vertical factors.
    #[default]
    Independent,
    /// The horizontal factor is reused for the vertical axis. Distorts the
    /// vertical axis whenever the display aspect ratio differs from the
    /// native one; kept for reproducing older exports.
    Horizontal,
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScaleMode::Independent => "independent",
            ScaleMode::Horizontal => "horizontal",
        })
    }
}

impl FromStr for ScaleMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(Self::Independent),
            "horizontal" => Ok(Self::Horizontal),
            other => Err(EngineError::InvalidDimensions(format!(
                "unknown scale mode '{other}'"
            ))),
        }
    }
}

/// Converts a display-space crop into a native-pixel rectangle.
///
/// The result is rounded to whole pixels, at least 1x1, and lies within the
/// `natural_width` x `natural_height` image.
pub fn map_to_source(
    crop: CropRegion,
    display: DisplaySize,
    natural_width: u32,
    natural_height: u32,
    mode: ScaleMode,
) -> Result<SourceRect> {
    if !display.is_positive() {
        return Err(EngineError::InvalidDimensions(format!(
            "display size {}x{}",
            display.width, display.height
        )));
    }
    if natural_width == 0 || natural_height == 0 {
        return Err(EngineError::InvalidDimensions(format!(
            "image size {natural_width}x{natural_height}"
        )));
    }

    let crop = crop.clamped_to(display);
    let scale_x = f64::from(natural_width) / display.width;
    let scale_y = match mode {
        ScaleMode::Independent => f64::from(natural_height) / display.height,
        ScaleMode::Horizontal => scale_x,
    };

    let (x, width) = map_span(crop.x, crop.right(), scale_x, natural_width);
    let (y, height) = map_span(crop.y, crop.bottom(), scale_y, natural_height);
    Ok(SourceRect {
        x,
        y,
        width,
        height,
    })
}

fn map_span(start: f64, end: f64, scale: f64, native: u32) -> (u32, u32) {
    let native_f = f64::from(native);
    let start = (start * scale).round().clamp(0.0, native_f - 1.0);
    let end = (end * scale).round().clamp(start + 1.0, native_f);
    (start as u32, (end - start) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_bounds_maps_to_full_image() {
        for (nw, nh, dw, dh) in [(1920, 1080, 640.0, 360.0), (333, 777, 111.3, 259.7), (8, 8, 8.0, 8.0)] {
            let display = DisplaySize::new(dw, dh);
            let rect = map_to_source(CropRegion::full(display), display, nw, nh, ScaleMode::Independent)
                .unwrap();
            assert_eq!(
                rect,
                SourceRect {
                    x: 0,
                    y: 0,
                    width: nw,
                    height: nh
                }
            );
        }
    }

    #[test]
    fn independent_scale_maps_each_axis() {
        let display = DisplaySize::new(400.0, 300.0);
        let crop = CropRegion::new(100.0, 30.0, 200.0, 150.0);
        let rect = map_to_source(crop, display, 800, 600, ScaleMode::Independent).unwrap();
        assert_eq!(
            rect,
            SourceRect {
                x: 200,
                y: 60,
                width: 400,
                height: 300
            }
        );
    }

    #[test]
    fn horizontal_mode_distorts_vertical_axis() {
        // Display stretched relative to the native aspect ratio.
        let display = DisplaySize::new(400.0, 400.0);
        let crop = CropRegion::new(0.0, 0.0, 400.0, 200.0);

        let fair = map_to_source(crop, display, 800, 600, ScaleMode::Independent).unwrap();
        assert_eq!((fair.width, fair.height), (800, 300));

        let legacy = map_to_source(crop, display, 800, 600, ScaleMode::Horizontal).unwrap();
        assert_eq!((legacy.width, legacy.height), (800, 400));

        // Past the bottom the legacy factor still stays inside the image.
        let full = map_to_source(CropRegion::full(display), display, 800, 600, ScaleMode::Horizontal)
            .unwrap();
        assert_eq!(full.height, 600);
    }

    #[test]
    fn tiny_crops_keep_one_pixel() {
        let display = DisplaySize::new(1000.0, 1000.0);
        let crop = CropRegion::new(999.0, 999.0, 1.0, 1.0);
        let rect = map_to_source(crop, display, 10, 10, ScaleMode::Independent).unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (9, 9, 1, 1));
    }

    #[test]
    fn rejects_degenerate_sizes() {
        let crop = CropRegion::new(0.0, 0.0, 10.0, 10.0);
        assert!(map_to_source(crop, DisplaySize::new(0.0, 10.0), 10, 10, ScaleMode::Independent).is_err());
        assert!(map_to_source(crop, DisplaySize::new(10.0, 10.0), 0, 10, ScaleMode::Independent).is_err());
    }

    #[test]
    fn parses_scale_modes() {
        assert_eq!("Horizontal".parse::<ScaleMode>().unwrap(), ScaleMode::Horizontal);
        assert!("diagonal".parse::<ScaleMode>().is_err());
    }
}

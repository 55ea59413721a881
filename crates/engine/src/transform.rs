use std::fmt;
use std::str::FromStr;

use image::{imageops, Rgba, RgbaImage};

use crate::{surface, EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    RotateClockwise,
    RotateCounterClockwise,
    FlipHorizontal,
    FlipVertical,
}

impl Transform {
    /// Output size for a `width` x `height` source.
    pub fn output_size(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Transform::RotateClockwise | Transform::RotateCounterClockwise => (height, width),
            Transform::FlipHorizontal | Transform::FlipVertical => (width, height),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transform::RotateClockwise => "rotate-cw",
            Transform::RotateCounterClockwise => "rotate-ccw",
            Transform::FlipHorizontal => "flip-h",
            Transform::FlipVertical => "flip-v",
        })
    }
}

impl FromStr for Transform {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rotate-cw" | "cw" => Ok(Self::RotateClockwise),
            "rotate-ccw" | "ccw" => Ok(Self::RotateCounterClockwise),
            "flip-h" | "flip-horizontal" => Ok(Self::FlipHorizontal),
            "flip-v" | "flip-vertical" => Ok(Self::FlipVertical),
            other => Err(EngineError::InvalidDimensions(format!(
                "unknown transform '{other}'"
            ))),
        }
    }
}

/// Draws `source` through `transform` into a freshly allocated surface.
pub fn apply_transform(source: &RgbaImage, transform: Transform) -> Result<RgbaImage> {
    let (w, h) = transform.output_size(source.width(), source.height());
    let mut out = surface::allocate(w, h, Rgba([0, 0, 0, 0]))?;
    let drawn = match transform {
        Transform::RotateClockwise => imageops::rotate90_in(source, &mut out),
        Transform::RotateCounterClockwise => imageops::rotate270_in(source, &mut out),
        Transform::FlipHorizontal => imageops::flip_horizontal_in(source, &mut out),
        Transform::FlipVertical => imageops::flip_vertical_in(source, &mut out),
    };
    drawn.map_err(|e| EngineError::InvalidDimensions(e.to_string()))?;
    tracing::debug!(%transform, width = w, height = h, "applied transform");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, (x * y) as u8, 255]))
    }

    #[test]
    fn rotations_swap_dimensions_and_cancel() {
        let src = gradient(7, 3);
        let cw = apply_transform(&src, Transform::RotateClockwise).unwrap();
        assert_eq!(cw.dimensions(), (3, 7));
        // Top-left of the source ends up top-right.
        assert_eq!(cw.get_pixel(2, 0), src.get_pixel(0, 0));

        let back = apply_transform(&cw, Transform::RotateCounterClockwise).unwrap();
        assert_eq!(back, src);

        let ccw_first = apply_transform(&src, Transform::RotateCounterClockwise).unwrap();
        let back = apply_transform(&ccw_first, Transform::RotateClockwise).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn double_flip_restores_pixels() {
        let src = gradient(5, 4);
        let once = apply_transform(&src, Transform::FlipHorizontal).unwrap();
        assert_eq!(once.dimensions(), (5, 4));
        assert_eq!(once.get_pixel(0, 0), src.get_pixel(4, 0));
        assert_eq!(apply_transform(&once, Transform::FlipHorizontal).unwrap(), src);

        let v = apply_transform(&src, Transform::FlipVertical).unwrap();
        assert_eq!(v.get_pixel(0, 0), src.get_pixel(0, 3));
        assert_eq!(apply_transform(&v, Transform::FlipVertical).unwrap(), src);
    }

    #[test]
    fn parses_transform_names() {
        assert_eq!("CW".parse::<Transform>().unwrap(), Transform::RotateClockwise);
        assert_eq!("flip-vertical".parse::<Transform>().unwrap(), Transform::FlipVertical);
        assert!("spin".parse::<Transform>().is_err());
    }
}

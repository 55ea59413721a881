use std::str::FromStr;

use image::{imageops, RgbaImage};

use crate::{surface, EngineError, Result};

/// Parses a user-entered pixel dimension. Non-digit characters are ignored,
/// so `"1 024 px"` reads as 1024.
pub fn parse_dimension(input: &str) -> Result<u32> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    match digits.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(EngineError::InvalidDimensions(format!(
            "'{input}' is not a positive pixel size"
        ))),
    }
}

/// Height that keeps `original`'s aspect ratio at `width`.
pub fn height_for_width(original: (u32, u32), width: u32) -> u32 {
    let (ow, oh) = original;
    if ow == 0 {
        return oh;
    }
    ((f64::from(width) * f64::from(oh) / f64::from(ow)).round() as u32).max(1)
}

/// Width that keeps `original`'s aspect ratio at `height`.
pub fn width_for_height(original: (u32, u32), height: u32) -> u32 {
    let (ow, oh) = original;
    if oh == 0 {
        return ow;
    }
    ((f64::from(height) * f64::from(ow) / f64::from(oh)).round() as u32).max(1)
}

/// Requested resize target. With the aspect lock on, the missing edge is
/// derived from the other one.
pub fn target_size(
    original: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
    keep_aspect: bool,
) -> Result<(u32, u32)> {
    let size = match (width, height, keep_aspect) {
        (Some(w), _, true) => (w, height_for_width(original, w)),
        (None, Some(h), true) => (width_for_height(original, h), h),
        (Some(w), Some(h), false) => (w, h),
        _ => {
            return Err(EngineError::InvalidDimensions(
                "both width and height are required without the aspect lock".into(),
            ))
        }
    };
    surface::ensure_available(size.0, size.1)?;
    Ok(size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpscaleFactor {
    X2,
    X4,
    X8,
}

impl UpscaleFactor {
    pub fn multiplier(self) -> u32 {
        match self {
            UpscaleFactor::X2 => 2,
            UpscaleFactor::X4 => 4,
            UpscaleFactor::X8 => 8,
        }
    }

    pub fn target(self, original: (u32, u32)) -> Result<(u32, u32)> {
        let m = self.multiplier();
        let size = (original.0.saturating_mul(m), original.1.saturating_mul(m));
        surface::ensure_available(size.0, size.1)?;
        Ok(size)
    }
}

impl FromStr for UpscaleFactor {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches(['x', 'X']).trim_end_matches(['x', 'X']) {
            "2" => Ok(Self::X2),
            "4" => Ok(Self::X4),
            "8" => Ok(Self::X8),
            _ => Err(EngineError::InvalidDimensions(format!(
                "upscale factor must be 2, 4 or 8, got '{s}'"
            ))),
        }
    }
}

/// Returns `image` at exactly `width` x `height`, resampling only when needed.
pub fn conform(image: RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
    if image.dimensions() == (width, height) {
        return Ok(image);
    }
    surface::ensure_available(width, height)?;
    tracing::info!(
        from_width = image.width(),
        from_height = image.height(),
        width,
        height,
        "resampling result to requested size"
    );
    Ok(imageops::resize(&image, width, height, imageops::FilterType::Lanczos3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn dimension_input_strips_non_digits() {
        assert_eq!(parse_dimension("1 024 px").unwrap(), 1024);
        assert_eq!(parse_dimension("800").unwrap(), 800);
        assert!(parse_dimension("").is_err());
        assert!(parse_dimension("0").is_err());
        assert!(parse_dimension("wide").is_err());
    }

    #[test]
    fn aspect_lock_derives_other_edge() {
        assert_eq!(target_size((800, 600), Some(400), None, true).unwrap(), (400, 300));
        assert_eq!(target_size((800, 600), None, Some(150), true).unwrap(), (200, 150));
        assert_eq!(target_size((800, 600), Some(10), Some(999), false).unwrap(), (10, 999));
        assert!(target_size((800, 600), Some(10), None, false).is_err());
    }

    #[test]
    fn upscale_multiplies_dimensions() {
        assert_eq!(UpscaleFactor::X4.target((300, 200)).unwrap(), (1200, 800));
        assert_eq!("x8".parse::<UpscaleFactor>().unwrap(), UpscaleFactor::X8);
        assert_eq!("2x".parse::<UpscaleFactor>().unwrap(), UpscaleFactor::X2);
        assert!("3".parse::<UpscaleFactor>().is_err());
        assert!(UpscaleFactor::X8.target((10_000, 10)).is_err());
    }

    #[test]
    fn conform_resamples_only_mismatched_sizes() {
        let exact = RgbaImage::from_pixel(4, 4, Rgba([1, 1, 1, 255]));
        assert_eq!(conform(exact.clone(), 4, 4).unwrap(), exact);
        let scaled = conform(exact, 9, 3).unwrap();
        assert_eq!(scaled.dimensions(), (9, 3));
    }
}

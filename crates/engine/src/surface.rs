use image::{Rgba, RgbaImage};

use crate::{EngineError, Result};

/// Largest edge of a drawing surface, in pixels.
pub const MAX_SURFACE_SIDE: u32 = 32_767;
/// Largest drawing surface area, in pixels.
pub const MAX_SURFACE_AREA: u64 = 268_435_456;

/// Fails with [`EngineError::SurfaceUnavailable`] when a `width` x `height`
/// surface cannot be provided.
pub fn ensure_available(width: u32, height: u32) -> Result<()> {
    let area = u64::from(width) * u64::from(height);
    if width == 0
        || height == 0
        || width > MAX_SURFACE_SIDE
        || height > MAX_SURFACE_SIDE
        || area > MAX_SURFACE_AREA
    {
        tracing::warn!(width, height, "drawing surface unavailable");
        return Err(EngineError::SurfaceUnavailable { width, height });
    }
    Ok(())
}

/// Allocates a surface filled with `fill`.
pub fn allocate(width: u32, height: u32, fill: Rgba<u8>) -> Result<RgbaImage> {
    ensure_available(width, height)?;
    Ok(RgbaImage::from_pixel(width, height, fill))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_oversized_surfaces() {
        assert!(matches!(
            allocate(0, 10, Rgba([0, 0, 0, 0])),
            Err(EngineError::SurfaceUnavailable { width: 0, height: 10 })
        ));
        assert!(ensure_available(MAX_SURFACE_SIDE + 1, 1).is_err());
        assert!(ensure_available(20_000, 20_000).is_err());
        assert!(ensure_available(16_384, 16_384).is_ok());
    }

    #[test]
    fn fills_allocated_surface() {
        let surface = allocate(3, 2, Rgba([1, 2, 3, 255])).unwrap();
        assert_eq!(surface.dimensions(), (3, 2));
        assert!(surface.pixels().all(|p| p.0 == [1, 2, 3, 255]));
    }
}

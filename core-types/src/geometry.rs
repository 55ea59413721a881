use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Smallest crop edge, in display pixels.
pub const MIN_CROP_SIZE: f64 = 20.0;

/// Size of the image as laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Display size of a `natural_width` x `natural_height` image laid out with
    /// object-contain inside `viewport`. Images are never scaled up.
    pub fn fit(natural_width: u32, natural_height: u32, viewport: Option<DisplaySize>) -> Self {
        let w = f64::from(natural_width);
        let h = f64::from(natural_height);
        let Some(viewport) = viewport else {
            return Self::new(w, h);
        };
        if w <= 0.0 || h <= 0.0 || !viewport.is_positive() {
            return Self::new(w, h);
        }
        let scale = (viewport.width / w).min(viewport.height / h).min(1.0);
        Self::new(w * scale, h * scale)
    }

    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Minimum crop edge per axis; a display axis shorter than
    /// [`MIN_CROP_SIZE`] uses its own length.
    pub fn min_crop(&self) -> (f64, f64) {
        (MIN_CROP_SIZE.min(self.width), MIN_CROP_SIZE.min(self.height))
    }
}

impl FromStr for DisplaySize {
    type Err = GeometryParseError;

    /// Parses `WIDTHxHEIGHT`, e.g. `800x600`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| GeometryParseError(s.to_string()))?;
        let width: f64 = w.trim().parse().map_err(|_| GeometryParseError(s.to_string()))?;
        let height: f64 = h.trim().parse().map_err(|_| GeometryParseError(s.to_string()))?;
        let size = Self::new(width, height);
        if !size.is_positive() {
            return Err(GeometryParseError(s.to_string()));
        }
        Ok(size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid size: {0}")]
pub struct GeometryParseError(pub String);

/// Rectangular crop selection in display pixels, relative to the displayed
/// image's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region covering the whole displayed image.
    pub fn full(display: DisplaySize) -> Self {
        Self::new(0.0, 0.0, display.width, display.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when every crop invariant holds against `display`.
    pub fn is_valid_within(&self, display: DisplaySize) -> bool {
        const EPS: f64 = 1e-9;
        let (min_w, min_h) = display.min_crop();
        self.x >= -EPS
            && self.y >= -EPS
            && self.width + EPS >= min_w
            && self.height + EPS >= min_h
            && self.right() <= display.width + EPS
            && self.bottom() <= display.height + EPS
    }

    /// Nearest region satisfying the crop invariants for `display`.
    pub fn clamped_to(&self, display: DisplaySize) -> Self {
        let (min_w, min_h) = display.min_crop();
        let (x, width) = clamp_span(self.x, self.width, min_w, display.width);
        let (y, height) = clamp_span(self.y, self.height, min_h, display.height);
        Self::new(x, y, width, height)
    }
}

fn clamp_span(start: f64, len: f64, min_len: f64, bound: f64) -> (f64, f64) {
    let start = if start.is_finite() { start } else { 0.0 };
    let len = if len.is_finite() { len } else { bound };
    let len = len.clamp(min_len, bound.max(min_len));
    let start = start.clamp(0.0, (bound - len).max(0.0));
    (start, len)
}

/// Rectangle in native image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

bitflags::bitflags! {
    /// Edges a resize handle moves.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct HandleEdges: u8 {
        const LEFT   = 0b0001;
        const RIGHT  = 0b0010;
        const TOP    = 0b0100;
        const BOTTOM = 0b1000;
    }
}

/// Pointer target on the crop overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CropHandle {
    TopLeft,
    TopMiddle,
    TopRight,
    RightMiddle,
    BottomRight,
    BottomMiddle,
    BottomLeft,
    LeftMiddle,
    Move,
}

impl CropHandle {
    /// The eight resize handles, clockwise from the top-left corner.
    pub const RESIZE: [CropHandle; 8] = [
        CropHandle::TopLeft,
        CropHandle::TopMiddle,
        CropHandle::TopRight,
        CropHandle::RightMiddle,
        CropHandle::BottomRight,
        CropHandle::BottomMiddle,
        CropHandle::BottomLeft,
        CropHandle::LeftMiddle,
    ];

    /// Edges moved by this handle. Empty for [`CropHandle::Move`].
    pub fn edges(self) -> HandleEdges {
        match self {
            CropHandle::TopLeft => HandleEdges::TOP | HandleEdges::LEFT,
            CropHandle::TopMiddle => HandleEdges::TOP,
            CropHandle::TopRight => HandleEdges::TOP | HandleEdges::RIGHT,
            CropHandle::RightMiddle => HandleEdges::RIGHT,
            CropHandle::BottomRight => HandleEdges::BOTTOM | HandleEdges::RIGHT,
            CropHandle::BottomMiddle => HandleEdges::BOTTOM,
            CropHandle::BottomLeft => HandleEdges::BOTTOM | HandleEdges::LEFT,
            CropHandle::LeftMiddle => HandleEdges::LEFT,
            CropHandle::Move => HandleEdges::empty(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CropHandle::TopLeft => "top-left",
            CropHandle::TopMiddle => "top-middle",
            CropHandle::TopRight => "top-right",
            CropHandle::RightMiddle => "right-middle",
            CropHandle::BottomRight => "bottom-right",
            CropHandle::BottomMiddle => "bottom-middle",
            CropHandle::BottomLeft => "bottom-left",
            CropHandle::LeftMiddle => "left-middle",
            CropHandle::Move => "move",
        }
    }
}

impl fmt::Display for CropHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropHandle {
    type Err = GeometryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        CropHandle::RESIZE
            .iter()
            .copied()
            .chain(std::iter::once(CropHandle::Move))
            .find(|handle| handle.as_str() == needle)
            .ok_or_else(|| GeometryParseError(s.to_string()))
    }
}

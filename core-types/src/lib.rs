use serde::{Deserialize, Serialize};

pub mod ai;
pub mod geometry;
pub mod media;
pub mod overlay;
pub mod page;
pub mod wav;

pub use geometry::{CropHandle, CropRegion, DisplaySize, HandleEdges, SourceRect, MIN_CROP_SIZE};
pub use media::MediaKind;
pub use overlay::{Color, LogoPosition, OverlaySettings};
pub use page::{Orientation, PageFormat, PageParseError, RasterFormat};
pub use wav::{frame_pcm_as_wav, PcmFormat};

/// Filter percentages applied to the working image.
///
/// Values follow CSS filter function semantics: `brightness`, `contrast` and
/// `saturate` are multipliers where 100 is neutral, `grayscale` and `sepia`
/// are blend amounts where 0 is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub brightness: f32,
    pub contrast: f32,
    pub saturate: f32,
    pub grayscale: f32,
    pub sepia: f32,
}

impl FilterSettings {
    pub const NEUTRAL: FilterSettings = FilterSettings {
        brightness: 100.0,
        contrast: 100.0,
        saturate: 100.0,
        grayscale: 0.0,
        sepia: 0.0,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_are_neutral() {
        assert!(FilterSettings::default().is_neutral());
        let warm = FilterSettings {
            sepia: 30.0,
            ..FilterSettings::default()
        };
        assert!(!warm.is_neutral());
    }

    #[test]
    fn partial_filter_json_fills_neutral_values() {
        let parsed: FilterSettings = serde_json::from_str(r#"{"contrast": 120}"#).unwrap();
        assert_eq!(parsed.contrast, 120.0);
        assert_eq!(parsed.brightness, 100.0);
        assert_eq!(parsed.grayscale, 0.0);
    }
}

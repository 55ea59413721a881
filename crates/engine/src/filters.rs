//! Pixel filter chain with CSS filter-function semantics.
//!
//! Stages run in a fixed order: brightness, contrast, saturate, grayscale,
//! sepia. Each stage clamps to the channel range and leaves alpha untouched.
//! Neutral stages are skipped so neutral settings leave pixels bit-identical.

use core_types::FilterSettings;
use image::RgbaImage;

type Matrix = [[f32; 3]; 3];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    /// `v * slope + intercept` on every colour channel.
    Linear { slope: f32, intercept: f32 },
    Matrix(Matrix),
}

impl Stage {
    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        match *self {
            Stage::Linear { slope, intercept } => rgb.map(|v| (v * slope + intercept).clamp(0.0, 1.0)),
            Stage::Matrix(m) => {
                let mut out = [0.0; 3];
                for (row, value) in m.iter().zip(out.iter_mut()) {
                    *value = (row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]).clamp(0.0, 1.0);
                }
                out
            }
        }
    }
}

/// Compiled filter chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    stages: Vec<Stage>,
}

impl FilterChain {
    pub fn new(settings: &FilterSettings) -> Self {
        let mut stages = Vec::new();

        let brightness = amount(settings.brightness, f32::MAX);
        if brightness != 1.0 {
            stages.push(Stage::Linear {
                slope: brightness,
                intercept: 0.0,
            });
        }
        let contrast = amount(settings.contrast, f32::MAX);
        if contrast != 1.0 {
            stages.push(Stage::Linear {
                slope: contrast,
                intercept: 0.5 - 0.5 * contrast,
            });
        }
        let saturate = amount(settings.saturate, f32::MAX);
        if saturate != 1.0 {
            stages.push(Stage::Matrix(saturate_matrix(saturate)));
        }
        let grayscale = amount(settings.grayscale, 1.0);
        if grayscale != 0.0 {
            stages.push(Stage::Matrix(grayscale_matrix(grayscale)));
        }
        let sepia = amount(settings.sepia, 1.0);
        if sepia != 0.0 {
            stages.push(Stage::Matrix(sepia_matrix(sepia)));
        }

        Self { stages }
    }

    pub fn is_identity(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn apply_to(&self, image: &mut RgbaImage) {
        if self.is_identity() {
            return;
        }
        for pixel in image.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            let mut rgb = [r, g, b].map(|c| f32::from(c) / 255.0);
            for stage in &self.stages {
                rgb = stage.apply(rgb);
            }
            let [r, g, b] = rgb.map(|v| (v * 255.0).round() as u8);
            pixel.0 = [r, g, b, a];
        }
    }
}

/// Bakes `settings` into `image`.
pub fn apply_filters(image: &mut RgbaImage, settings: &FilterSettings) {
    FilterChain::new(settings).apply_to(image);
}

/// Percentage to factor, clamped to `0..=max`.
fn amount(percent: f32, max: f32) -> f32 {
    if !percent.is_finite() {
        return if max == 1.0 { 0.0 } else { 1.0 };
    }
    (percent / 100.0).clamp(0.0, max)
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn grayscale_matrix(amount: f32) -> Matrix {
    let g = 1.0 - amount;
    [
        [0.2126 + 0.7874 * g, 0.7152 - 0.7152 * g, 0.0722 - 0.0722 * g],
        [0.2126 - 0.2126 * g, 0.7152 + 0.2848 * g, 0.0722 - 0.0722 * g],
        [0.2126 - 0.2126 * g, 0.7152 - 0.7152 * g, 0.0722 + 0.9278 * g],
    ]
}

fn sepia_matrix(amount: f32) -> Matrix {
    let s = 1.0 - amount;
    [
        [0.393 + 0.607 * s, 0.769 - 0.769 * s, 0.189 - 0.189 * s],
        [0.349 - 0.349 * s, 0.686 + 0.314 * s, 0.168 - 0.168 * s],
        [0.272 - 0.272 * s, 0.534 - 0.534 * s, 0.131 + 0.869 * s],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| Rgba([(x * 60) as u8, (y * 70) as u8, 200, 128]))
    }

    #[test]
    fn neutral_settings_are_identity() {
        let mut image = sample();
        apply_filters(&mut image, &FilterSettings::NEUTRAL);
        assert_eq!(image, sample());
        assert!(FilterChain::new(&FilterSettings::default()).is_identity());
    }

    #[test]
    fn full_grayscale_equalises_channels() {
        let mut image = sample();
        let settings = FilterSettings {
            grayscale: 100.0,
            ..FilterSettings::NEUTRAL
        };
        apply_filters(&mut image, &settings);
        for p in image.pixels() {
            let [r, g, b, a] = p.0;
            assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1, "{:?}", p.0);
            assert_eq!(a, 128);
        }
    }

    #[test]
    fn zero_brightness_is_black() {
        let mut image = sample();
        let settings = FilterSettings {
            brightness: 0.0,
            ..FilterSettings::NEUTRAL
        };
        apply_filters(&mut image, &settings);
        assert!(image.pixels().all(|p| p.0 == [0, 0, 0, 128]));
    }

    #[test]
    fn zero_contrast_is_mid_grey() {
        let mut image = sample();
        let settings = FilterSettings {
            contrast: 0.0,
            ..FilterSettings::NEUTRAL
        };
        apply_filters(&mut image, &settings);
        assert!(image.pixels().all(|p| p.0 == [128, 128, 128, 128]));
    }

    #[test]
    fn brightness_runs_before_contrast() {
        // brightness 50% then contrast 200%: 1.0 -> 0.5 -> 0.5, white stays mid.
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let settings = FilterSettings {
            brightness: 50.0,
            contrast: 200.0,
            ..FilterSettings::NEUTRAL
        };
        apply_filters(&mut image, &settings);
        assert_eq!(image.get_pixel(0, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn full_sepia_on_white_is_warm() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let settings = FilterSettings {
            sepia: 100.0,
            ..FilterSettings::NEUTRAL
        };
        apply_filters(&mut image, &settings);
        let [r, g, b, _] = image.get_pixel(0, 0).0;
        assert_eq!(r, 255);
        assert_eq!(g, 255);
        assert_eq!(b, 239);
    }
}

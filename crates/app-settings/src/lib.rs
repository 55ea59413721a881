use core_types::ai::{
    DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_SPEECH_MODEL,
    DEFAULT_TEXT_MODEL, DEFAULT_TIMEOUT_SECS, DEFAULT_VOICE,
};
use core_types::{Orientation, OverlaySettings, PageFormat, RasterFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppSettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings path unavailable")]
    MissingSettingsPath,
}

pub type Result<T> = std::result::Result<T, AppSettingsError>;

/// Generative-AI endpoint selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub base_url: String,
    /// Name of the environment variable holding the API key. The key itself
    /// is never persisted.
    pub api_key_env: String,
    pub image_model: String,
    pub text_model: String,
    pub speech_model: String,
    pub timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSettings {
    pub page_format: PageFormat,
    pub orientation: Orientation,
    /// Pixels per PDF point when rasterising.
    pub raster_scale: f32,
    pub raster_format: RasterFormat,
    pub jpeg_quality: f32,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            page_format: PageFormat::A4,
            orientation: Orientation::Portrait,
            raster_scale: 2.0,
            raster_format: RasterFormat::Jpeg,
            jpeg_quality: 0.92,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub ai: AiSettings,
    pub overlay: OverlaySettings,
    pub speech_voice: String,
    pub pdf: PdfSettings,
    pub last_output_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            ai: AiSettings::default(),
            overlay: OverlaySettings::default(),
            speech_voice: DEFAULT_VOICE.to_string(),
            pdf: PdfSettings::default(),
            last_output_dir: None,
        }
    }
}

impl AppSettings {
    pub fn load() -> Result<Self> {
        load_impl()
    }

    pub fn save(&self) -> Result<()> {
        save_impl(self)
    }

    /// Reads settings from a JSON file; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings: AppSettings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        std::fs::write(path, payload)?;
        tracing::debug!(path = %path.display(), "saved settings");
        Ok(())
    }

    pub fn get_last_output_dir(&self) -> Option<PathBuf> {
        self.last_output_dir.clone()
    }

    pub fn set_last_output_dir(&mut self, path: PathBuf) {
        self.last_output_dir = Some(path);
    }
}

#[cfg(target_os = "windows")]
const REGISTRY_KEY: &str = "Software\\UltimateConverter";

#[cfg(target_os = "windows")]
fn load_impl() -> Result<AppSettings> {
    use winreg::enums::{HKEY_CURRENT_USER, KEY_READ};
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = hkcu.open_subkey_with_flags(REGISTRY_KEY, KEY_READ).ok();

    if let Some(key) = key {
        if let Ok(payload) = key.get_value::<String, _>("Settings") {
            return Ok(serde_json::from_str(&payload)?);
        }
    }

    Ok(AppSettings::default())
}

#[cfg(target_os = "windows")]
fn save_impl(settings: &AppSettings) -> Result<()> {
    use winreg::enums::{HKEY_CURRENT_USER, KEY_WRITE};
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (key, _) = hkcu.create_subkey_with_flags(REGISTRY_KEY, KEY_WRITE)?;
    let payload = serde_json::to_string(settings)?;
    key.set_value("Settings", &payload)?;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn load_impl() -> Result<AppSettings> {
    AppSettings::load_from(&settings_file_path()?)
}

#[cfg(not(target_os = "windows"))]
fn save_impl(settings: &AppSettings) -> Result<()> {
    settings.save_to(&settings_file_path()?)
}

#[cfg(target_os = "macos")]
fn settings_file_path() -> Result<PathBuf> {
    let base = directories::BaseDirs::new().ok_or(AppSettingsError::MissingSettingsPath)?;
    let mut path = base.home_dir().to_path_buf();
    path.push("Library");
    path.push("Preferences");
    path.push("com.ultimateconverter");
    path.push("settings.json");
    Ok(path)
}

#[cfg(all(not(target_os = "macos"), not(target_os = "windows")))]
fn settings_file_path() -> Result<PathBuf> {
    let base = directories::BaseDirs::new().ok_or(AppSettingsError::MissingSettingsPath)?;
    let mut path = base.config_dir().to_path_buf();
    path.push("ultimate-converter");
    path.push("settings.json");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Color, LogoPosition};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.ai.api_key_env, "API_KEY");
        assert_eq!(settings.ai.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(settings.speech_voice, DEFAULT_VOICE);
        assert_eq!(settings.pdf.page_format, PageFormat::A4);
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = AppSettings::default();
        settings.overlay.position = LogoPosition::TopLeft;
        settings.overlay.border_color = Color::BLACK;
        settings.pdf.orientation = Orientation::Landscape;
        settings.set_last_output_dir(dir.path().to_path_buf());
        settings.save_to(&path).unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.get_last_output_dir().as_deref(), Some(dir.path()));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "ai": { "text_model": "custom-model" }, "speech_voice": "Kore" }"#)
            .unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.ai.text_model, "custom-model");
        assert_eq!(loaded.ai.image_model, AiSettings::default().image_model);
        assert_eq!(loaded.speech_voice, "Kore");
        assert_eq!(loaded.overlay, OverlaySettings::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppSettings::load_from(&path),
            Err(AppSettingsError::Json(_))
        ));
    }
}

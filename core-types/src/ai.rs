//! Defaults for the hosted generative-AI endpoint, shared by the client and
//! the persisted settings.

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// API name of the prebuilt voice used when none is chosen.
pub const DEFAULT_VOICE: &str = "Puck";

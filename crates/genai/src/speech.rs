use std::fmt;
use std::str::FromStr;

use core_types::{frame_pcm_as_wav, PcmFormat};

use crate::types::{GenerationConfig, Modality, PrebuiltVoiceConfig, SpeechConfig, VoiceConfig};
use crate::{ChoiceParseError, GenAiError, Result};

/// Prebuilt voices of the speech model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Voice {
    #[default]
    Puck,
    Kore,
    Fenrir,
    Zephyr,
    Charon,
}

impl Voice {
    pub const ALL: [Voice; 5] = [Voice::Puck, Voice::Kore, Voice::Fenrir, Voice::Zephyr, Voice::Charon];

    /// Name the API expects.
    pub fn api_name(self) -> &'static str {
        match self {
            Voice::Puck => core_types::ai::DEFAULT_VOICE,
            Voice::Kore => "Kore",
            Voice::Fenrir => "Fenrir",
            Voice::Zephyr => "Zephyr",
            Voice::Charon => "Charon",
        }
    }

    /// Friendly name shown to users.
    pub fn display_name(self) -> &'static str {
        match self {
            Voice::Puck => "Antoine",
            Voice::Kore => "Chloé",
            Voice::Fenrir => "Julien",
            Voice::Zephyr => "Léa",
            Voice::Charon => "Marc",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

impl FromStr for Voice {
    type Err = ChoiceParseError;

    /// Accepts either the API name or the friendly name, case-insensitively.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Voice::ALL
            .into_iter()
            .find(|v| {
                v.api_name().eq_ignore_ascii_case(wanted)
                    || v.display_name().to_lowercase() == wanted.to_lowercase()
            })
            .ok_or_else(|| ChoiceParseError {
                kind: "voice",
                value: s.to_string(),
                expected: Voice::ALL.map(Voice::api_name).join(", "),
            })
    }
}

pub const DEFAULT_STYLE: &str = "Naturel / Conversation";
pub const DEFAULT_TONE: &str = "Neutre";
pub const DEFAULT_AGE: &str = "Adulte";

/// Text plus the delivery the voice should adopt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: Voice,
    pub style: String,
    pub tone: String,
    pub age: String,
    pub accent: Option<String>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: Voice::default(),
            style: DEFAULT_STYLE.to_string(),
            tone: DEFAULT_TONE.to_string(),
            age: DEFAULT_AGE.to_string(),
            accent: None,
        }
    }

    pub fn prompt(&self) -> Result<String> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(GenAiError::InvalidInput("enter some text to read".to_string()));
        }
        let accent = match self.accent.as_deref().map(str::trim) {
            Some(accent) if !accent.is_empty() => format!(" avec un accent {accent}"),
            _ => String::new(),
        };
        Ok(format!(
            "Lis le texte suivant dans un style \"{}\", sur un ton \"{}\", avec une voix d'un(e) \"{}\"{accent} : {text}",
            self.style, self.tone, self.age
        ))
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            response_modalities: vec![Modality::Audio],
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: self.voice.api_name().to_string(),
                    },
                },
            }),
        }
    }
}

/// Frames the model's raw PCM as a playable WAV file.
pub fn pcm_to_wav(pcm: &[u8]) -> Vec<u8> {
    frame_pcm_as_wav(pcm, PcmFormat::SPEECH)
}

//! Client for the hosted generative-AI endpoint used by the image, text and
//! speech tools.

pub mod classify;
pub mod client;
pub mod prompts;
pub mod speech;
pub mod types;

pub use classify::{classify_audio, classify_image, classify_text, GeneratedImage};
pub use client::{ClientConfig, GenAiClient};
pub use prompts::{Attire, Backdrop, PortraitOptions, PortraitStyle};
pub use speech::{pcm_to_wav, SpeechRequest, Voice};

/// Language of user-facing error messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    English,
    French,
}

/// A voice or portrait option that is not in the offered list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}', expected one of {expected}")]
pub struct ChoiceParseError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    #[error("The {var} environment variable is not set; export your API key there")]
    MissingApiKey { var: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("The request was blocked upstream: {reason}{}", categories_suffix(.categories))]
    PromptBlocked {
        reason: String,
        categories: Vec<String>,
    },

    #[error("The API returned no candidates; the content may have been blocked entirely")]
    NoCandidates,

    #[error("The response was blocked for safety reasons{}", categories_suffix(.categories))]
    SafetyBlocked { categories: Vec<String> },

    #[error("The model declined to generate an image{}", quoted_suffix(.text))]
    NoImage { text: Option<String> },

    #[error("Generation was interrupted: {reason}")]
    Interrupted { reason: String },

    #[error("The model returned no image{}", quoted_suffix(.text))]
    MissingImage { text: Option<String> },

    #[error("The model returned no text")]
    MissingText,

    #[error("The model returned no audio; the content may have been blocked")]
    MissingAudio,

    #[error("API error (status {status}): {message}")]
    Http { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl GenAiError {
    /// Message for display in `locale`. English matches `Display`.
    pub fn localized(&self, locale: Locale) -> String {
        match locale {
            Locale::English => self.to_string(),
            Locale::French => self.french(),
        }
    }

    fn french(&self) -> String {
        match self {
            Self::MissingApiKey { var } => {
                format!("La variable d'environnement {var} n'est pas définie. Renseignez-y votre clé d'API.")
            }
            Self::InvalidInput(detail) => format!("Entrée invalide : {detail}"),
            Self::PromptBlocked { reason, categories } => {
                let mut msg = format!("La requête a été bloquée en amont. Raison : {reason}.");
                if !categories.is_empty() {
                    msg.push_str(&format!(" Catégories de sécurité : {}.", categories.join(", ")));
                }
                msg
            }
            Self::NoCandidates => {
                "L'API n'a retourné aucune réponse. Le contenu a peut-être été entièrement bloqué."
                    .to_string()
            }
            Self::SafetyBlocked { categories } if categories.is_empty() => {
                "La réponse a été bloquée pour des raisons de sécurité. Veuillez essayer une autre image."
                    .to_string()
            }
            Self::SafetyBlocked { categories } => format!(
                "La réponse a été bloquée pour des raisons de sécurité. Catégories : {}.",
                categories.join(", ")
            ),
            Self::NoImage { text: Some(text) } => {
                format!("L'IA a refusé de générer une image et a répondu : \"{text}\"")
            }
            Self::NoImage { text: None } => "L'IA n'a pas pu générer d'image pour cette requête, possiblement car la tâche était jugée irréalisable."
                .to_string(),
            Self::Interrupted { reason } => {
                format!("La génération a été interrompue. Raison : {reason}.")
            }
            Self::MissingImage { text: Some(text) } => {
                format!("L'IA n'a pas retourné d'image mais un message : \"{text}\"")
            }
            Self::MissingImage { text: None } => "L'API n'a pas retourné d'image et n'a fourni aucune explication. Le contenu a peut-être été bloqué, ou la tâche jugée irréalisable."
                .to_string(),
            Self::MissingText => "L'API n'a retourné aucun texte.".to_string(),
            Self::MissingAudio => {
                "L'API n'a pas retourné de données audio. Le contenu a peut-être été bloqué."
                    .to_string()
            }
            Self::Http { status, message } => {
                format!("Le service a répondu avec le statut {status} : {message}")
            }
            Self::Request(e) => format!("La requête réseau a échoué : {e}"),
            Self::Decode(detail) => format!("Réponse illisible : {detail}"),
        }
    }
}

fn categories_suffix(categories: &[String]) -> String {
    if categories.is_empty() {
        String::new()
    } else {
        format!(" (categories: {})", categories.join(", "))
    }
}

fn quoted_suffix(text: &Option<String>) -> String {
    match text {
        Some(text) => format!(": \"{text}\""),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, GenAiError>;

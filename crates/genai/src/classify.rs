//! Turns a `generateContent` response into media or a typed failure.
//!
//! Checks run in a fixed order: prompt-level block, empty candidate list,
//! the first candidate's finish reason, then the payload itself.

use base64::Engine as _;

use crate::types::{Candidate, GenerateContentResponse, SafetyRating};
use crate::{GenAiError, Result};

/// Image bytes returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Payload {
    Image,
    Text,
    Audio,
}

pub fn classify_image(response: &GenerateContentResponse) -> Result<GeneratedImage> {
    let candidate = accepted_candidate(response, Payload::Image)?;
    let Some(inline) = candidate.inline_data() else {
        return Err(GenAiError::MissingImage {
            text: response.text(),
        });
    };
    let bytes = decode_base64(&inline.data)?;
    let mime = if inline.mime_type.is_empty() {
        "image/png".to_string()
    } else {
        inline.mime_type.clone()
    };
    tracing::debug!(%mime, len = bytes.len(), "model returned image");
    Ok(GeneratedImage { bytes, mime })
}

pub fn classify_text(response: &GenerateContentResponse) -> Result<String> {
    accepted_candidate(response, Payload::Text)?;
    response.text().ok_or(GenAiError::MissingText)
}

/// Raw PCM carried by the first inline part.
pub fn classify_audio(response: &GenerateContentResponse) -> Result<Vec<u8>> {
    let candidate = accepted_candidate(response, Payload::Audio)?;
    let inline = candidate.inline_data().ok_or(GenAiError::MissingAudio)?;
    let pcm = decode_base64(&inline.data)?;
    if pcm.is_empty() {
        return Err(GenAiError::MissingAudio);
    }
    Ok(pcm)
}

fn accepted_candidate(response: &GenerateContentResponse, payload: Payload) -> Result<&Candidate> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(GenAiError::PromptBlocked {
                reason: reason.clone(),
                categories: blocked_categories(&feedback.safety_ratings),
            });
        }
    }

    let candidate = response.candidates.first().ok_or(GenAiError::NoCandidates)?;

    match candidate.finish_reason.as_deref() {
        None | Some("STOP") | Some("FINISH_REASON_UNSPECIFIED") => Ok(candidate),
        Some("SAFETY") => Err(GenAiError::SafetyBlocked {
            categories: blocked_categories(&candidate.safety_ratings),
        }),
        Some("NO_IMAGE") if payload == Payload::Image => Err(GenAiError::NoImage {
            text: response.text(),
        }),
        Some(other) => Err(GenAiError::Interrupted {
            reason: other.to_string(),
        }),
    }
}

/// Ratings flagged `blocked`, or failing that the HIGH/MEDIUM ones.
fn blocked_categories(ratings: &[SafetyRating]) -> Vec<String> {
    let flagged: Vec<String> = ratings
        .iter()
        .filter(|r| r.blocked)
        .map(|r| r.category.clone())
        .collect();
    if !flagged.is_empty() {
        return flagged;
    }
    ratings
        .iter()
        .filter(|r| matches!(r.probability.as_deref(), Some("HIGH") | Some("MEDIUM")))
        .map(|r| r.category.clone())
        .collect()
}

fn decode_base64(data: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| GenAiError::Decode(format!("inline data is not base64: {e}")))
}

use std::time::Duration;

use base64::Engine as _;
use futures::future::try_join_all;
use reqwest::Client;

use crate::classify::{classify_audio, classify_image, classify_text, GeneratedImage};
use crate::prompts;
use crate::speech::{pcm_to_wav, SpeechRequest};
use crate::types::{GenerateContentRequest, GenerateContentResponse, GenerationConfig, Modality, Part};
use crate::{GenAiError, Result};

use core_types::ai::{
    DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_SPEECH_MODEL,
    DEFAULT_TEXT_MODEL, DEFAULT_TIMEOUT_SECS,
};

/// Endpoint and model selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub image_model: String,
    pub text_model: String,
    pub speech_model: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
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

#[derive(Clone)]
pub struct GenAiClient {
    http: Client,
    config: ClientConfig,
    api_key: String,
}

impl GenAiClient {
    /// Reads the API key from `config.api_key_env`.
    pub fn from_env(config: ClientConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenAiError::MissingApiKey {
                var: config.api_key_env.clone(),
            })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: ClientConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("ultconv/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            config,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Sends one `generateContent` call and returns the raw response.
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model);
        tracing::debug!(%model, "calling generateContent");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status, %model, "generateContent failed");
            return Err(GenAiError::Http { status, message });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GenAiError::Decode(e.to_string()))
    }

    /// Applies `instruction` to the image and returns the generated image.
    pub async fn edit_image(&self, image: &[u8], mime: &str, instruction: &str) -> Result<GeneratedImage> {
        let request = image_request(image, mime, instruction).with_config(GenerationConfig {
            response_modalities: vec![Modality::Image],
            speech_config: None,
        });
        let response = self.generate(&self.config.image_model, &request).await?;
        classify_image(&response)
    }

    pub async fn extract_text(&self, image: &[u8], mime: &str) -> Result<String> {
        let request = image_request(image, mime, prompts::OCR);
        let response = self.generate(&self.config.text_model, &request).await?;
        classify_text(&response)
    }

    pub async fn summarize(&self, url: &str) -> Result<String> {
        let request = GenerateContentRequest::new(vec![Part::text(prompts::summarize_url(url))]);
        let response = self.generate(&self.config.text_model, &request).await?;
        classify_text(&response)
    }

    /// Summarises every URL concurrently; fails if any request fails.
    pub async fn summarize_all(&self, urls: &[String]) -> Result<Vec<String>> {
        try_join_all(urls.iter().map(|url| self.summarize(url))).await
    }

    /// Synthesises speech and returns it as a WAV file.
    pub async fn speak(&self, speech: &SpeechRequest) -> Result<Vec<u8>> {
        let request = GenerateContentRequest::new(vec![Part::text(speech.prompt()?)])
            .with_config(speech.generation_config());
        let response = self.generate(&self.config.speech_model, &request).await?;
        let pcm = classify_audio(&response)?;
        tracing::debug!(bytes = pcm.len(), voice = %speech.voice, "received speech");
        Ok(pcm_to_wav(&pcm))
    }
}

fn image_request(image: &[u8], mime: &str, instruction: &str) -> GenerateContentRequest {
    let data = base64::engine::general_purpose::STANDARD.encode(image);
    GenerateContentRequest::new(vec![Part::inline(mime, data), Part::text(instruction)])
}

use std::path::{Path, PathBuf};

use anyhow::Result;
use app_settings::AppSettings;
use genai::{ClientConfig, GenAiClient, Locale};

use crate::cli::{Command, OutputArgs};
use crate::output::{resolve_output, write_output};

mod ai;
mod edit;
mod pdf;

/// State shared by every command: persisted settings and the message locale.
pub struct App {
    pub settings: AppSettings,
    settings_path: Option<PathBuf>,
    pub locale: Locale,
}

impl App {
    /// Loads settings, falling back to defaults when they cannot be read.
    pub fn new(settings_path: Option<PathBuf>, locale: Locale) -> Self {
        let loaded = match &settings_path {
            Some(path) => AppSettings::load_from(path),
            None => AppSettings::load(),
        };
        let settings = loaded.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "settings unreadable, using defaults");
            AppSettings::default()
        });
        Self {
            settings,
            settings_path,
            locale,
        }
    }

    pub fn output_path(&self, args: &OutputArgs, default_name: &str) -> PathBuf {
        resolve_output(
            args.output.as_deref(),
            self.settings.last_output_dir.as_deref(),
            default_name,
        )
    }

    /// Writes an output file and remembers its directory for next time.
    pub fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        write_output(path, bytes)?;
        println!("{}", path.display());
        self.remember_dir(path);
        Ok(())
    }

    fn remember_dir(&mut self, path: &Path) {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let dir = dir.canonicalize().unwrap_or(dir);
        if self.settings.last_output_dir.as_deref() == Some(dir.as_path()) {
            return;
        }
        self.settings.set_last_output_dir(dir);
        let saved = match &self.settings_path {
            Some(path) => self.settings.save_to(path),
            None => self.settings.save(),
        };
        if let Err(e) = saved {
            tracing::warn!(error = %e, "could not save settings");
        }
    }

    pub fn ai_client(&self) -> Result<GenAiClient> {
        let ai = &self.settings.ai;
        let config = ClientConfig {
            base_url: ai.base_url.clone(),
            api_key_env: ai.api_key_env.clone(),
            image_model: ai.image_model.clone(),
            text_model: ai.text_model.clone(),
            speech_model: ai.speech_model.clone(),
            timeout_secs: ai.timeout_secs,
        };
        Ok(GenAiClient::from_env(config)?)
    }
}

pub async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::ImageToPdf(args) => pdf::image_to_pdf(app, args),
        Command::PdfToImages(args) => pdf::pdf_to_images(app, args),
        Command::Merge(args) => pdf::merge(app, args),
        Command::Sign(args) => pdf::sign(app, args),
        Command::Edit(args) => edit::edit(app, args),
        Command::BulkEdit(args) => edit::bulk_edit(app, args),
        Command::Ai(args) => ai::edit_with_ai(app, args.tool).await,
        Command::Ocr(args) => ai::ocr(app, args).await,
        Command::Summarize(args) => ai::summarize(app, args).await,
        Command::Speak(args) => ai::speak(app, args).await,
    }
}

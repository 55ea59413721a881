//! Editor session: the working image plus the edit-mode state machine.
//!
//! ```text
//! Empty -> Loaded -> {Cropping | Filtering | TransformPending | AwaitingAiResult}
//!        -> Loaded (commit or cancel) -> ... -> Empty (reset)
//! ```
//!
//! At most one AI request is in flight. Every request gets a ticket carrying
//! the session generation; `load`, `cancel` and `reset` bump the generation so
//! late results are recognised as stale and dropped.

use std::fmt;
use std::path::Path;

use core_types::media::extension_for_mime;
use core_types::{CropHandle, CropRegion, DisplaySize, FilterSettings, MediaKind};
use image::RgbaImage;

use crate::codec::{self, DEFAULT_JPEG_QUALITY};
use crate::compositor::crop_and_filter;
use crate::crop::DragSession;
use crate::mapper::{map_to_source, ScaleMode};
use crate::transform::{apply_transform, Transform};
use crate::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Empty,
    Loaded,
    Cropping,
    Filtering,
    TransformPending,
    AwaitingAiResult,
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditorState::Empty => "empty",
            EditorState::Loaded => "loaded",
            EditorState::Cropping => "cropping",
            EditorState::Filtering => "filtering",
            EditorState::TransformPending => "choosing a transform",
            EditorState::AwaitingAiResult => "waiting for an AI result",
        })
    }
}

/// Proof that an AI request was admitted; hand it back to
/// [`EditorSession::complete_ai`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiTicket {
    generation: u64,
}

/// Everything needed to send the working image to the model.
#[derive(Debug, Clone)]
pub struct AiRequest {
    pub ticket: AiTicket,
    pub image: Vec<u8>,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiCompletion {
    /// Result stored, waiting for accept or cancel.
    Ready,
    /// Request failed; the message is kept in [`EditorSession::last_error`].
    Failed,
    /// The ticket was superseded; the result was dropped.
    Stale,
}

/// Encoded output with a suggested file name.
#[derive(Debug, Clone)]
pub struct Export {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
struct WorkingImage {
    pixels: RgbaImage,
    mime: String,
    name: String,
    /// Bytes the image was decoded from, kept until the first commit.
    source: Option<(Vec<u8>, &'static str)>,
}

#[derive(Debug)]
pub struct EditorSession {
    state: EditorState,
    image: Option<WorkingImage>,
    viewport: Option<DisplaySize>,
    crop: Option<CropRegion>,
    drag: Option<DragSession>,
    filters: FilterSettings,
    scale_mode: ScaleMode,
    generation: u64,
    in_flight: Option<u64>,
    ai_result: Option<RgbaImage>,
    last_error: Option<String>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(ScaleMode::default())
    }
}

impl EditorSession {
    pub fn new(scale_mode: ScaleMode) -> Self {
        Self {
            state: EditorState::Empty,
            image: None,
            viewport: None,
            crop: None,
            drag: None,
            filters: FilterSettings::NEUTRAL,
            scale_mode,
            generation: 0,
            in_flight: None,
            ai_result: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn crop(&self) -> Option<CropRegion> {
        self.crop
    }

    pub fn filters(&self) -> FilterSettings {
        self.filters
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref().map(|w| &w.pixels)
    }

    pub fn ai_result(&self) -> Option<&RgbaImage> {
        self.ai_result.as_ref()
    }

    pub fn mime(&self) -> Option<&str> {
        self.image.as_ref().map(|w| w.mime.as_str())
    }

    /// Display size of the working image inside the current viewport.
    pub fn display_size(&self) -> Option<DisplaySize> {
        self.image
            .as_ref()
            .map(|w| DisplaySize::fit(w.pixels.width(), w.pixels.height(), self.viewport))
    }

    /// Decodes `bytes` and makes it the working image, discarding all edits.
    pub fn load(&mut self, bytes: &[u8], name: &str) -> Result<()> {
        let (pixels, mime) = codec::decode(bytes)?;
        self.load_pixels(pixels, mime, name);
        if let Some(working) = self.image.as_mut() {
            working.source = Some((bytes.to_vec(), mime));
        }
        Ok(())
    }

    pub fn load_pixels(&mut self, pixels: RgbaImage, mime: &str, name: &str) {
        self.clear();
        tracing::info!(name, mime, width = pixels.width(), height = pixels.height(), "loaded image");
        self.image = Some(WorkingImage {
            pixels,
            mime: mime.to_string(),
            name: name.to_string(),
            source: None,
        });
        self.crop = self.display_size().map(CropRegion::full);
        self.state = EditorState::Loaded;
    }

    /// Changes the layout box. The crop selection restarts at full bounds.
    pub fn set_viewport(&mut self, viewport: Option<DisplaySize>) -> Result<()> {
        self.require_image("set_viewport")?;
        if let Some(v) = viewport {
            if !v.is_positive() {
                return Err(EngineError::InvalidDimensions(format!(
                    "viewport {}x{}",
                    v.width, v.height
                )));
            }
        }
        self.viewport = viewport;
        self.drag = None;
        self.crop = self.display_size().map(CropRegion::full);
        Ok(())
    }

    pub fn begin_crop(&mut self) -> Result<()> {
        self.require_state("begin_crop", &[EditorState::Loaded, EditorState::Filtering])?;
        self.state = EditorState::Cropping;
        Ok(())
    }

    pub fn pointer_down(&mut self, handle: CropHandle, x: f64, y: f64) -> Result<()> {
        self.require_state("pointer_down", &[EditorState::Cropping])?;
        let (display, crop) = self.crop_context()?;
        self.drag = Some(DragSession::begin(handle, x, y, crop, display));
        Ok(())
    }

    /// Updates the crop from the active drag. Without a drag the crop is
    /// returned unchanged.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<CropRegion> {
        self.require_state("pointer_move", &[EditorState::Cropping])?;
        let (display, crop) = self.crop_context()?;
        let Some(drag) = self.drag else {
            return Ok(crop);
        };
        let updated = drag.update(x, y, display);
        self.crop = Some(updated);
        Ok(updated)
    }

    pub fn pointer_up(&mut self) -> Result<()> {
        self.require_state("pointer_up", &[EditorState::Cropping])?;
        self.drag = None;
        Ok(())
    }

    pub fn begin_filters(&mut self) -> Result<()> {
        self.require_state("begin_filters", &[EditorState::Loaded, EditorState::Cropping])?;
        self.drag = None;
        self.state = EditorState::Filtering;
        Ok(())
    }

    pub fn set_filters(&mut self, filters: FilterSettings) -> Result<()> {
        self.require_state("set_filters", &[EditorState::Cropping, EditorState::Filtering])?;
        self.filters = filters;
        Ok(())
    }

    /// Commits the crop selection and filters into the working image.
    pub fn apply_crop_and_filters(&mut self) -> Result<()> {
        self.require_state(
            "apply_crop_and_filters",
            &[EditorState::Loaded, EditorState::Cropping, EditorState::Filtering],
        )?;
        let (display, crop) = self.crop_context()?;
        let working = self.require_image("apply_crop_and_filters")?;
        let (w, h) = working.pixels.dimensions();
        let rect = map_to_source(crop, display, w, h, self.scale_mode)?;
        let pixels = crop_and_filter(&working.pixels, rect, &self.filters)?;
        self.commit(pixels);
        Ok(())
    }

    pub fn begin_transform(&mut self) -> Result<()> {
        self.require_state("begin_transform", &[EditorState::Loaded])?;
        self.state = EditorState::TransformPending;
        Ok(())
    }

    pub fn transform(&mut self, transform: Transform) -> Result<()> {
        self.require_state(
            "transform",
            &[EditorState::Loaded, EditorState::TransformPending],
        )?;
        let working = self.require_image("transform")?;
        let pixels = apply_transform(&working.pixels, transform)?;
        self.commit(pixels);
        Ok(())
    }

    /// Admits an AI request for the working image. An unedited image is sent
    /// as its original bytes; edited pixels are encoded in the original format.
    pub fn begin_ai(&mut self) -> Result<AiRequest> {
        if self.in_flight.is_some() {
            return Err(EngineError::Busy);
        }
        self.require_state("begin_ai", &[EditorState::Loaded])?;
        let working = self.require_image("begin_ai")?;
        let (width, height) = working.pixels.dimensions();
        let (image, mime) = match &working.source {
            Some((bytes, mime)) => (bytes.clone(), *mime),
            None => {
                let encoded = codec::encode(&working.pixels, &working.mime, DEFAULT_JPEG_QUALITY)?;
                (encoded.bytes, encoded.mime)
            }
        };

        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.ai_result = None;
        self.last_error = None;
        self.state = EditorState::AwaitingAiResult;
        tracing::debug!(generation = self.generation, "AI request admitted");
        Ok(AiRequest {
            ticket: AiTicket {
                generation: self.generation,
            },
            image,
            mime,
            width,
            height,
        })
    }

    /// Delivers the outcome of the request identified by `ticket`.
    pub fn complete_ai(
        &mut self,
        ticket: AiTicket,
        outcome: std::result::Result<RgbaImage, String>,
    ) -> AiCompletion {
        if self.in_flight != Some(ticket.generation) {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping stale AI result"
            );
            return AiCompletion::Stale;
        }
        self.in_flight = None;
        match outcome {
            Ok(pixels) => {
                self.ai_result = Some(pixels);
                AiCompletion::Ready
            }
            Err(message) => {
                tracing::warn!(%message, "AI request failed");
                self.last_error = Some(message);
                self.state = EditorState::Loaded;
                AiCompletion::Failed
            }
        }
    }

    /// Replaces the working image with the received AI result.
    pub fn accept_ai_result(&mut self) -> Result<()> {
        self.require_state("accept_ai_result", &[EditorState::AwaitingAiResult])?;
        let Some(pixels) = self.ai_result.take() else {
            return Err(EngineError::InvalidState {
                operation: "accept_ai_result",
                state: self.state,
            });
        };
        self.commit(pixels);
        Ok(())
    }

    /// Leaves the current edit mode without committing it.
    pub fn cancel(&mut self) -> Result<()> {
        self.require_state(
            "cancel",
            &[
                EditorState::Cropping,
                EditorState::Filtering,
                EditorState::TransformPending,
                EditorState::AwaitingAiResult,
            ],
        )?;
        if self.in_flight.take().is_some() {
            self.generation += 1;
        }
        self.ai_result = None;
        self.reset_edits();
        self.state = EditorState::Loaded;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.clear();
        tracing::debug!("editor reset");
    }

    /// Encodes the working image, or the pending AI result when there is one,
    /// in the original format.
    pub fn export(&self) -> Result<Export> {
        let working = self.require_image("export")?;
        let pixels = self.ai_result.as_ref().unwrap_or(&working.pixels);
        let encoded = codec::encode(pixels, &working.mime, DEFAULT_JPEG_QUALITY)?;
        Ok(Export {
            file_name: export_name(&working.name, encoded.mime),
            mime: encoded.mime,
            bytes: encoded.bytes,
        })
    }

    fn commit(&mut self, pixels: RgbaImage) {
        if let Some(working) = self.image.as_mut() {
            working.pixels = pixels;
            working.source = None;
        }
        self.reset_edits();
        self.state = EditorState::Loaded;
    }

    fn reset_edits(&mut self) {
        self.drag = None;
        self.filters = FilterSettings::NEUTRAL;
        self.crop = self.display_size().map(CropRegion::full);
    }

    fn clear(&mut self) {
        if self.in_flight.take().is_some() || self.image.is_some() {
            self.generation += 1;
        }
        self.state = EditorState::Empty;
        self.image = None;
        self.viewport = None;
        self.crop = None;
        self.drag = None;
        self.filters = FilterSettings::NEUTRAL;
        self.ai_result = None;
        self.last_error = None;
    }

    fn require_state(&self, operation: &'static str, allowed: &[EditorState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn require_image(&self, operation: &'static str) -> Result<&WorkingImage> {
        self.image.as_ref().ok_or(EngineError::InvalidState {
            operation,
            state: self.state,
        })
    }

    fn crop_context(&self) -> Result<(DisplaySize, CropRegion)> {
        let display = self
            .display_size()
            .filter(DisplaySize::is_positive)
            .ok_or_else(|| EngineError::InvalidDimensions("image has no display size".into()))?;
        let crop = self.crop.unwrap_or_else(|| CropRegion::full(display));
        Ok((display, crop))
    }
}

/// `edited-<name>`, keeping the original extension when it still matches the
/// encoded format.
fn export_name(original: &str, mime: &str) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .filter(|e| MediaKind::Image.mime_for_extension(e) == Some(mime))
        .unwrap_or_else(|| extension_for_mime(mime).to_string());
    format!("edited-{stem}.{ext}")
}

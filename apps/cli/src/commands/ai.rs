use std::path::Path;

use anyhow::{bail, Context, Result};
use core_types::MediaKind;
use engine::resize::{conform, parse_dimension, target_size};
use engine::{AiCompletion, EditorSession, ScaleMode};
use genai::{prompts, PortraitOptions, SpeechRequest, Voice};

use super::App;
use crate::cli::{AiImageArgs, AiTool, OcrArgs, SpeakArgs, SummarizeArgs};
use crate::inputs::single_input;

/// What to send for one tool, and the exact size the result must come back at.
struct AiJob {
    instruction: String,
    target: Option<(u32, u32)>,
}

enum Size {
    Keep,
    Upscale(engine::resize::UpscaleFactor),
    Resize {
        width: Option<u32>,
        height: Option<u32>,
        keep_aspect: bool,
    },
}

pub async fn edit_with_ai(app: &mut App, tool: AiTool) -> Result<()> {
    let transparent = matches!(tool, AiTool::RemoveBg(_));
    // Validate the cheap arguments before any file or network work.
    let (image, size, fixed_instruction) = match tool {
        AiTool::Enhance(image) => (image, Size::Keep, Some(prompts::ENHANCE.to_string())),
        AiTool::RemoveBg(image) => (image, Size::Keep, Some(prompts::REMOVE_BACKGROUND.to_string())),
        AiTool::RemoveLogo(image) => (image, Size::Keep, Some(prompts::REMOVE_LOGO.to_string())),
        AiTool::RemoveObject { image, object } => {
            (image, Size::Keep, Some(prompts::remove_object(&object)?))
        }
        AiTool::Portrait {
            image,
            attire,
            backdrop,
            style,
        } => {
            let options = PortraitOptions {
                attire,
                backdrop,
                style,
            };
            (image, Size::Keep, Some(prompts::portrait(&options)))
        }
        AiTool::Upscale { image, factor } => (image, Size::Upscale(factor), None),
        AiTool::Resize {
            image,
            width,
            height,
            keep_aspect,
        } => {
            let width = width.as_deref().map(parse_dimension).transpose()?;
            let height = height.as_deref().map(parse_dimension).transpose()?;
            let size = Size::Resize {
                width,
                height,
                keep_aspect,
            };
            (image, size, None)
        }
    };
    let AiImageArgs { input, output } = image;

    let file = single_input(&input, MediaKind::Image)?;
    let bytes = file.read()?;
    let mut session = EditorSession::new(ScaleMode::default());
    if transparent {
        // Keep the alpha channel through export regardless of the source format.
        let (pixels, _) = engine::decode(&bytes)?;
        session.load_pixels(pixels, "image/png", &file.name());
    } else {
        session.load(&bytes, &file.name())?;
    }

    let original = session
        .image()
        .map(|img| img.dimensions())
        .context("no image loaded")?;
    let job = plan(original, size, fixed_instruction)?;
    let client = app.ai_client()?;

    let request = session.begin_ai()?;
    tracing::info!(
        file = %file.path.display(),
        width = request.width,
        height = request.height,
        "sending image to the model"
    );
    let outcome = match client.edit_image(&request.image, request.mime, &job.instruction).await {
        Ok(generated) => decode_result(&generated.bytes, job.target),
        Err(e) => Err(e.localized(app.locale)),
    };

    match session.complete_ai(request.ticket, outcome) {
        AiCompletion::Ready => session.accept_ai_result()?,
        AiCompletion::Failed => {
            let message = session.last_error().unwrap_or("the AI request failed");
            bail!("{message}");
        }
        AiCompletion::Stale => bail!("the AI result arrived after the request was superseded"),
    }

    let export = session.export()?;
    let path = app.output_path(&output, &export.file_name);
    app.write(&path, &export.bytes)
}

fn plan(original: (u32, u32), size: Size, instruction: Option<String>) -> Result<AiJob> {
    let (width, height) = original;
    let job = match size {
        Size::Keep => AiJob {
            instruction: instruction.unwrap_or_default(),
            target: None,
        },
        Size::Upscale(factor) => {
            let (tw, th) = factor.target(original)?;
            AiJob {
                instruction: prompts::upscale(width, height, tw, th),
                target: Some((tw, th)),
            }
        }
        Size::Resize {
            width: w,
            height: h,
            keep_aspect,
        } => {
            let (tw, th) = target_size(original, w, h, keep_aspect)?;
            AiJob {
                instruction: prompts::resize(width, height, tw, th),
                target: Some((tw, th)),
            }
        }
    };
    Ok(job)
}

fn decode_result(bytes: &[u8], target: Option<(u32, u32)>) -> std::result::Result<image::RgbaImage, String> {
    let (pixels, _) = engine::decode(bytes).map_err(|e| e.to_string())?;
    match target {
        Some((w, h)) => conform(pixels, w, h).map_err(|e| e.to_string()),
        None => Ok(pixels),
    }
}

pub async fn ocr(app: &mut App, args: OcrArgs) -> Result<()> {
    let file = single_input(&args.input, MediaKind::Image)?;
    let bytes = file.read()?;
    let client = app.ai_client()?;
    let text = client.extract_text(&bytes, file.mime).await?;

    match &args.output.output {
        Some(_) => {
            let default_name = format!("{}.txt", file.stem());
            let path = app.output_path(&args.output, &default_name);
            app.write(&path, text.as_bytes())
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

pub async fn summarize(app: &mut App, args: SummarizeArgs) -> Result<()> {
    let client = app.ai_client()?;
    let summaries = client.summarize_all(&args.urls).await?;
    for (url, summary) in args.urls.iter().zip(&summaries) {
        println!("{url}\n{summary}\n");
    }
    Ok(())
}

pub async fn speak(app: &mut App, args: SpeakArgs) -> Result<()> {
    let text = match (args.text, &args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => read_text(path)?,
        (None, None) => bail!("pass the text to read or --file"),
    };

    let mut request = SpeechRequest::new(text);
    request.voice = match args.voice {
        Some(voice) => voice,
        None => app.settings.speech_voice.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "saved voice not recognised, using the default");
            Voice::default()
        }),
    };
    if let Some(style) = args.style {
        request.style = style;
    }
    if let Some(tone) = args.tone {
        request.tone = tone;
    }
    if let Some(age) = args.age {
        request.age = age;
    }
    request.accent = args.accent;
    request.prompt()?;

    let client = app.ai_client()?;
    let wav = client.speak(&request).await?;
    let path = app.output_path(&args.output, "speech.wav");
    app.write(&path, &wav)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

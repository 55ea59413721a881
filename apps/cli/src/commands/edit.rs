use anyhow::{bail, Result};
use core_types::{FilterSettings, MediaKind, OverlaySettings};
use documents::{zip_buffers, NamedBuffer};
use engine::codec::DEFAULT_JPEG_QUALITY;
use engine::{render_overlay, EditorSession};
use image::RgbaImage;

use super::App;
use crate::cli::{BulkEditArgs, EditArgs};
use crate::inputs::{collect_inputs, single_input, InputFile};

pub fn edit(app: &mut App, args: EditArgs) -> Result<()> {
    let input = single_input(&args.input, MediaKind::Image)?;
    let mut session = EditorSession::new(args.scale_mode);
    session.load(&input.read()?, &input.name())?;
    session.set_viewport(args.viewport)?;

    let filters = FilterSettings {
        brightness: args.brightness,
        contrast: args.contrast,
        saturate: args.saturate,
        grayscale: args.grayscale,
        sepia: args.sepia,
    };
    let cropping = !args.drags.is_empty();

    if cropping {
        session.begin_crop()?;
        for step in &args.drags {
            session.pointer_down(step.handle, 0.0, 0.0)?;
            let crop = session.pointer_move(step.dx, step.dy)?;
            session.pointer_up()?;
            tracing::debug!(
                handle = %step.handle,
                x = crop.x,
                y = crop.y,
                width = crop.width,
                height = crop.height,
                "crop updated"
            );
        }
    }
    if !filters.is_neutral() {
        session.begin_filters()?;
        session.set_filters(filters)?;
    }
    if cropping || !filters.is_neutral() {
        session.apply_crop_and_filters()?;
    }
    if !args.transforms.is_empty() {
        session.begin_transform()?;
        for transform in &args.transforms {
            session.transform(*transform)?;
        }
    }

    let export = session.export()?;
    let path = app.output_path(&args.output, &export.file_name);
    app.write(&path, &export.bytes)
}

pub fn bulk_edit(app: &mut App, args: BulkEditArgs) -> Result<()> {
    let inputs = collect_inputs(&args.inputs, MediaKind::Image)?;
    let overlay = overlay_settings(app.settings.overlay, &args);
    let logo = match &args.logo {
        Some(path) => {
            let file = single_input(path, MediaKind::Image)?;
            Some(engine::decode(&file.read()?)?.0)
        }
        None => None,
    };

    let mut outputs = Vec::with_capacity(inputs.len());
    for input in &inputs {
        match overlay_one(input, logo.as_ref(), &overlay) {
            Ok(buffer) => outputs.push(buffer),
            Err(e) => {
                tracing::warn!(file = %input.path.display(), error = %format!("{e:#}"), "skipping image");
                eprintln!("skipped {}: {e:#}", input.path.display());
            }
        }
    }
    if outputs.is_empty() {
        bail!("none of the {} images could be processed", inputs.len());
    }
    tracing::info!(edited = outputs.len(), total = inputs.len(), "bulk edit finished");

    let archive = zip_buffers(&outputs)?;
    let path = app.output_path(&args.output, "edited-images.zip");
    app.write(&path, &archive)
}

fn overlay_settings(defaults: OverlaySettings, args: &BulkEditArgs) -> OverlaySettings {
    OverlaySettings {
        position: args.position.unwrap_or(defaults.position),
        scale_percent: args.scale.unwrap_or(defaults.scale_percent),
        opacity_percent: args.opacity.unwrap_or(defaults.opacity_percent),
        border_width: args.border.unwrap_or(defaults.border_width),
        border_color: args.border_color.unwrap_or(defaults.border_color),
    }
}

fn overlay_one(
    input: &InputFile,
    logo: Option<&RgbaImage>,
    overlay: &OverlaySettings,
) -> Result<NamedBuffer> {
    let (source, _) = engine::decode(&input.read()?)?;
    let composed = render_overlay(&source, logo, overlay)?;
    let encoded = engine::encode(&composed, "image/png", DEFAULT_JPEG_QUALITY)?;
    Ok(NamedBuffer::new(format!("edited-{}.png", input.stem()), encoded.bytes))
}

use anyhow::{Context, Result};
use core_types::MediaKind;
use documents::{
    images_to_pdf, merge_pdfs, sign_pdf, zip_buffers, DocumentError, PdfiumRasterizer,
    RasterOptions, SignaturePlacement,
};

use super::App;
use crate::cli::{ImageToPdfArgs, MergeArgs, PdfToImagesArgs, SignArgs};
use crate::inputs::{collect_inputs, single_input, InputFile};

pub fn image_to_pdf(app: &mut App, args: ImageToPdfArgs) -> Result<()> {
    let inputs = collect_inputs(&args.inputs, MediaKind::Image)?;
    let images = read_all(&inputs)?;
    let format = args.page.unwrap_or(app.settings.pdf.page_format);
    let orientation = args.orientation.unwrap_or(app.settings.pdf.orientation);

    let pdf = images_to_pdf(&images, format, orientation)
        .map_err(|e| name_offender(e, &inputs))
        .context("composing PDF")?;
    let path = app.output_path(&args.output, "converted-images.pdf");
    app.write(&path, &pdf)
}

pub fn pdf_to_images(app: &mut App, args: PdfToImagesArgs) -> Result<()> {
    let input = single_input(&args.input, MediaKind::Pdf)?;
    let pdf = input.read()?;
    let defaults = app.settings.pdf;
    let options = RasterOptions {
        scale: args.scale.unwrap_or(defaults.raster_scale),
        format: args.format.unwrap_or(defaults.raster_format),
        quality: args.quality.unwrap_or(defaults.jpeg_quality),
    };

    let rasterizer = PdfiumRasterizer::new()?;
    let stem = input.stem();
    let pages = documents::pdf_to_images(&rasterizer, &pdf, &stem, &options)
        .with_context(|| format!("rasterising {}", input.path.display()))?;

    if args.no_zip {
        let dir = app.output_path(&args.output, "");
        for page in &pages {
            app.write(&dir.join(&page.name), &page.bytes)?;
        }
        return Ok(());
    }
    let archive = zip_buffers(&pages)?;
    let path = app.output_path(&args.output, &format!("{stem}-images.zip"));
    app.write(&path, &archive)
}

pub fn merge(app: &mut App, args: MergeArgs) -> Result<()> {
    let inputs = collect_inputs(&args.inputs, MediaKind::Pdf)?;
    let documents = read_all(&inputs)?;
    let merged = merge_pdfs(&documents).map_err(|e| name_offender(e, &inputs))?;
    let path = app.output_path(&args.output, "merged.pdf");
    app.write(&path, &merged)
}

pub fn sign(app: &mut App, args: SignArgs) -> Result<()> {
    let input = single_input(&args.input, MediaKind::Pdf)?;
    let signature = single_input(&args.signature, MediaKind::Image)?;
    let placement = SignaturePlacement {
        page_index: args.page.saturating_sub(1),
        x: args.x,
        y: args.y,
        preview_width: args.preview_width.unwrap_or(0.0),
    };
    let signed = sign_pdf(&input.read()?, &signature.read()?, &placement)
        .with_context(|| format!("signing {}", input.path.display()))?;
    let path = app.output_path(&args.output, &format!("{}-signed.pdf", input.stem()));
    app.write(&path, &signed)
}

fn read_all(inputs: &[InputFile]) -> Result<Vec<Vec<u8>>> {
    inputs.iter().map(InputFile::read).collect()
}

/// Attaches the file name to errors that point at one of `inputs`.
fn name_offender(err: DocumentError, inputs: &[InputFile]) -> anyhow::Error {
    let index = match &err {
        DocumentError::Encrypted { index }
        | DocumentError::Corrupt { index, .. }
        | DocumentError::InvalidImage { index, .. } => Some(*index),
        _ => None,
    };
    match index.and_then(|i| inputs.get(i)) {
        Some(input) => anyhow::Error::new(err).context(input.path.display().to_string()),
        None => anyhow::Error::new(err),
    }
}

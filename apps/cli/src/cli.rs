use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use core_types::{Color, CropHandle, DisplaySize, LogoPosition, Orientation, PageFormat, RasterFormat};
use engine::resize::UpscaleFactor;
use engine::{ScaleMode, Transform};
use genai::{Attire, Backdrop, PortraitStyle};

/// File conversion and AI-assisted image and document tools.
#[derive(Parser, Debug)]
#[command(name = "ultconv", version, about)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Language of AI error messages.
    #[arg(long, global = true, value_enum, default_value_t = Lang::En)]
    pub lang: Lang,

    /// Settings file to use instead of the per-user one.
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Lang {
    En,
    Fr,
}

impl From<Lang> for genai::Locale {
    fn from(lang: Lang) -> Self {
        match lang {
            Lang::En => genai::Locale::English,
            Lang::Fr => genai::Locale::French,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Combine images into a PDF, one image per page.
    ImageToPdf(ImageToPdfArgs),
    /// Render every page of a PDF to PNG or JPEG.
    PdfToImages(PdfToImagesArgs),
    /// Concatenate two or more PDFs.
    Merge(MergeArgs),
    /// Stamp a signature image onto a PDF page.
    Sign(SignArgs),
    /// Crop, filter and transform an image.
    Edit(EditArgs),
    /// Add a border and logo to many images and package them as a ZIP.
    BulkEdit(BulkEditArgs),
    /// Edit an image with the generative model.
    Ai(AiArgs),
    /// Extract the text of an image.
    Ocr(OcrArgs),
    /// Summarise one or two web articles.
    Summarize(SummarizeArgs),
    /// Read text aloud into a WAV file.
    Speak(SpeakArgs),
}

/// Destination shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output file, or an existing directory to write the default name into.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImageToPdfArgs {
    /// Image files or directories, in page order.
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    #[arg(long, value_name = "a3|a4|a5|letter|legal")]
    pub page: Option<PageFormat>,
    #[arg(long, value_name = "portrait|landscape")]
    pub orientation: Option<Orientation>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct PdfToImagesArgs {
    pub input: PathBuf,
    /// Pixels per PDF point.
    #[arg(long)]
    pub scale: Option<f32>,
    #[arg(long, value_name = "jpeg|png")]
    pub format: Option<RasterFormat>,
    /// JPEG quality between 0 and 1.
    #[arg(long)]
    pub quality: Option<f32>,
    /// Write one file per page into the output directory instead of a ZIP.
    #[arg(long)]
    pub no_zip: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// PDF files or directories, in merge order.
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    pub input: PathBuf,
    /// PNG or JPEG signature.
    #[arg(long)]
    pub signature: PathBuf,
    /// One-based page number.
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Signature centre, measured from the top-left corner.
    #[arg(long)]
    pub x: f64,
    #[arg(long)]
    pub y: f64,
    /// Width of the preview `x` and `y` were measured on; omit for PDF points.
    #[arg(long)]
    pub preview_width: Option<f64>,
    #[command(flatten)]
    pub output: OutputArgs,
}

/// A crop-handle drag, `HANDLE:DX,DY` in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStep {
    pub handle: CropHandle,
    pub dx: f64,
    pub dy: f64,
}

impl FromStr for DragStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (handle, delta) = s
            .split_once(':')
            .ok_or_else(|| format!("expected HANDLE:DX,DY, got '{s}'"))?;
        let handle: CropHandle = handle.parse().map_err(|e| format!("{e}"))?;
        let (dx, dy) = delta
            .split_once(',')
            .ok_or_else(|| format!("expected DX,DY, got '{delta}'"))?;
        let dx: f64 = dx.trim().parse().map_err(|_| format!("bad x offset '{dx}'"))?;
        let dy: f64 = dy.trim().parse().map_err(|_| format!("bad y offset '{dy}'"))?;
        Ok(Self { handle, dx, dy })
    }
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub input: PathBuf,
    /// Size of the preview the drags are expressed in, e.g. 800x600.
    #[arg(long)]
    pub viewport: Option<DisplaySize>,
    /// Crop gesture, repeatable: `bottom-right:-120,-80`, `move:10,0`.
    #[arg(long = "drag", value_name = "HANDLE:DX,DY")]
    pub drags: Vec<DragStep>,
    /// independent, or horizontal to reuse the horizontal factor on both axes.
    #[arg(long, default_value = "independent")]
    pub scale_mode: ScaleMode,
    #[arg(long, default_value_t = 100.0)]
    pub brightness: f32,
    #[arg(long, default_value_t = 100.0)]
    pub contrast: f32,
    #[arg(long, default_value_t = 100.0)]
    pub saturate: f32,
    #[arg(long, default_value_t = 0.0)]
    pub grayscale: f32,
    #[arg(long, default_value_t = 0.0)]
    pub sepia: f32,
    /// Rotation or flip applied after cropping, repeatable: cw, ccw, flip-h, flip-v.
    #[arg(long = "transform", value_name = "KIND")]
    pub transforms: Vec<Transform>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct BulkEditArgs {
    /// Image files or directories.
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    /// Logo stamped on every image.
    #[arg(long)]
    pub logo: Option<PathBuf>,
    #[arg(long, value_name = "top-left|top-right|bottom-left|bottom-right|center")]
    pub position: Option<LogoPosition>,
    /// Logo width as a percentage of the image width.
    #[arg(long)]
    pub scale: Option<f64>,
    #[arg(long)]
    pub opacity: Option<f64>,
    /// Border width in pixels.
    #[arg(long)]
    pub border: Option<u32>,
    #[arg(long, value_name = "#RRGGBB")]
    pub border_color: Option<Color>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct AiArgs {
    #[command(subcommand)]
    pub tool: AiTool,
}

#[derive(Subcommand, Debug)]
pub enum AiTool {
    /// Improve clarity, noise, colour and lighting.
    Enhance(AiImageArgs),
    /// Enlarge by 2, 4 or 8.
    Upscale {
        #[command(flatten)]
        image: AiImageArgs,
        #[arg(long, default_value = "2")]
        factor: UpscaleFactor,
    },
    /// Make the background transparent.
    RemoveBg(AiImageArgs),
    /// Erase an object described in words.
    RemoveObject {
        #[command(flatten)]
        image: AiImageArgs,
        #[arg(long)]
        object: String,
    },
    /// Erase logos and watermarks.
    RemoveLogo(AiImageArgs),
    /// Turn a selfie into a professional portrait.
    Portrait {
        #[command(flatten)]
        image: AiImageArgs,
        #[arg(long, default_value = "suit", value_name = "suit|blouse|casual|turtleneck")]
        attire: Attire,
        #[arg(long, default_value = "office", value_name = "office|outdoors|studio|brick")]
        backdrop: Backdrop,
        #[arg(long, default_value = "corporate", value_name = "corporate|creative|tech")]
        style: PortraitStyle,
    },
    /// Resize to exact dimensions.
    Resize {
        #[command(flatten)]
        image: AiImageArgs,
        /// Target width; digits only are read, so "1 024px" works.
        #[arg(long)]
        width: Option<String>,
        #[arg(long)]
        height: Option<String>,
        /// Let the other edge follow the original aspect ratio.
        #[arg(long)]
        keep_aspect: bool,
    },
}

#[derive(Args, Debug)]
pub struct AiImageArgs {
    pub input: PathBuf,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct OcrArgs {
    pub input: PathBuf,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    #[arg(required = true, num_args = 1..=2, value_name = "URL")]
    pub urls: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SpeakArgs {
    /// Text to read; use --file to read it from disk.
    #[arg(required_unless_present = "file")]
    pub text: Option<String>,
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
    /// Puck, Kore, Fenrir, Zephyr, Charon or their friendly names.
    #[arg(long)]
    pub voice: Option<genai::Voice>,
    #[arg(long)]
    pub style: Option<String>,
    #[arg(long)]
    pub tone: Option<String>,
    #[arg(long)]
    pub age: Option<String>,
    #[arg(long)]
    pub accent: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

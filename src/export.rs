//! Export pipeline
//!
//! Captures mounted cards as PNG or SVG and hands the bytes to a
//! [`FileSink`]. Embedded images are decoded first, each bounded by a
//! timeout; an image that fails or times out is dropped and the avatar falls
//! back to its initials. Any other failure aborts the export and nothing is
//! written.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::ExportPreferences;
use crate::error::ExportError;
use crate::platform::{CanvasProvider, FileSink, ImageDecoder, SourceDecoder, TextStyle};
use crate::preview::MountedCards;
use crate::render::fonts::Fonts;
use crate::render::raster::{encode_png, rasterize, ImageCanvasProvider, RasterOptions};
use crate::render::svg::render_svg;
use crate::render::{palette_colors, RenderedCard, ResolvedImages};

/// The alert shown for any failed export.
pub const EXPORT_FAILED_MESSAGE: &str = "Failed to export. Please try again.";

const FILE_STEM: &str = "facecard";
const CAPTION_BASELINE: f32 = 35.0;
const CAPTION_SIZE: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
        }
    }
}

/// Which card(s) an export captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportMode {
    Single,
    Before,
    After,
    Comparison,
}

impl ExportMode {
    fn suffix(&self) -> Option<&'static str> {
        match self {
            ExportMode::Single => None,
            ExportMode::Before => Some("before"),
            ExportMode::After => Some("after"),
            ExportMode::Comparison => Some("comparison"),
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix().unwrap_or("single"))
    }
}

/// `facecard.png`, `facecard-before.png`, `facecard-comparison.png`, ...
pub fn export_filename(mode: ExportMode, format: ExportFormat) -> String {
    match mode.suffix() {
        Some(suffix) => format!("{FILE_STEM}-{suffix}.{}", format.extension()),
        None => format!("{FILE_STEM}.{}", format.extension()),
    }
}

/// Transparent margin around a single-card PNG, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub padding_x: f32,
    pub padding_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub pixel_ratio: f32,
    pub comparison_pixel_ratio: f32,
    pub gutter: u32,
    pub caption_height: u32,
    pub image_timeout: Duration,
    pub frame: Frame,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from_preferences(&ExportPreferences::default())
    }
}

impl ExportSettings {
    pub fn from_preferences(prefs: &ExportPreferences) -> Self {
        Self {
            pixel_ratio: prefs.pixel_ratio,
            comparison_pixel_ratio: prefs.comparison_pixel_ratio,
            gutter: prefs.gutter,
            caption_height: prefs.caption_height,
            image_timeout: Duration::from_millis(prefs.image_timeout_ms),
            frame: Frame {
                padding_x: prefs.frame_padding_x,
                padding_y: prefs.frame_padding_y,
            },
        }
    }
}

/// Turns a laid-out card into file contents.
pub trait CardCapture: Send + Sync {
    fn capture_png(
        &self,
        card: &RenderedCard,
        options: &RasterOptions,
        images: &ResolvedImages,
    ) -> Result<Vec<u8>, ExportError>;

    fn capture_svg(&self, card: &RenderedCard) -> Result<String, ExportError>;
}

/// Captures with the built-in raster and SVG backends.
#[derive(Debug, Clone, Default)]
pub struct SceneCapture {
    fonts: Option<Fonts>,
}

impl SceneCapture {
    pub fn new(fonts: Option<Fonts>) -> Self {
        Self { fonts }
    }
}

impl CardCapture for SceneCapture {
    fn capture_png(
        &self,
        card: &RenderedCard,
        options: &RasterOptions,
        images: &ResolvedImages,
    ) -> Result<Vec<u8>, ExportError> {
        let bitmap = rasterize(card, options, images, self.fonts.as_ref())?;
        encode_png(&bitmap)
    }

    fn capture_svg(&self, card: &RenderedCard) -> Result<String, ExportError> {
        Ok(render_svg(card))
    }
}

/// What to export, captured from the mounted nodes at request time.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportJob {
    Single {
        node: Option<RenderedCard>,
        mode: ExportMode,
        format: ExportFormat,
    },
    TwoUp {
        before: Option<RenderedCard>,
        after: Option<RenderedCard>,
    },
}

impl ExportJob {
    /// Snapshot the nodes `mode` needs. Comparison exports are always PNG.
    pub fn from_mounted(mounted: &MountedCards, mode: ExportMode, format: ExportFormat) -> Self {
        match mode {
            ExportMode::Comparison => ExportJob::TwoUp {
                before: mounted.before.clone(),
                after: mounted.after.clone(),
            },
            _ => ExportJob::Single {
                node: mounted.node_for(mode).cloned(),
                mode,
                format,
            },
        }
    }

    pub fn filename(&self) -> String {
        match self {
            ExportJob::Single { mode, format, .. } => export_filename(*mode, *format),
            ExportJob::TwoUp { .. } => export_filename(ExportMode::Comparison, ExportFormat::Png),
        }
    }
}

/// A delivered export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub filename: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Runs exports against a set of platform collaborators. Cheap to clone;
/// every export is independent of any other in flight.
#[derive(Clone)]
pub struct ExportPipeline {
    settings: ExportSettings,
    capture: Arc<dyn CardCapture>,
    decoder: Arc<dyn ImageDecoder>,
    canvas: Arc<dyn CanvasProvider>,
    sink: Arc<dyn FileSink>,
}

impl ExportPipeline {
    pub fn new(
        settings: ExportSettings,
        capture: Arc<dyn CardCapture>,
        decoder: Arc<dyn ImageDecoder>,
        canvas: Arc<dyn CanvasProvider>,
        sink: Arc<dyn FileSink>,
    ) -> Self {
        Self {
            settings,
            capture,
            decoder,
            canvas,
            sink,
        }
    }

    /// Pipeline over the built-in backends and the `image` crate decoder.
    pub fn with_backends(settings: ExportSettings, fonts: Option<Fonts>, sink: Arc<dyn FileSink>) -> Self {
        Self::new(
            settings,
            Arc::new(SceneCapture::new(fonts.clone())),
            Arc::new(SourceDecoder),
            Arc::new(ImageCanvasProvider::new(fonts)),
            sink,
        )
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Run `job`, logging any failure.
    pub async fn run(&self, job: ExportJob) -> Result<ExportOutcome, ExportError> {
        let filename = job.filename();
        let result = match job {
            ExportJob::Single { node, mode, format } => self.export_single(node, mode, format).await,
            ExportJob::TwoUp { before, after } => self.export_two_up(before, after).await,
        };
        match &result {
            Ok(outcome) => info!(file = %outcome.path.display(), bytes = outcome.bytes, "export written"),
            Err(e) => error!(%filename, "export failed: {e}"),
        }
        result
    }

    /// Capture one card and deliver exactly one file.
    pub async fn export_single(
        &self,
        node: Option<RenderedCard>,
        mode: ExportMode,
        format: ExportFormat,
    ) -> Result<ExportOutcome, ExportError> {
        let card = node.ok_or(ExportError::MissingNode(mode))?;
        let filename = export_filename(mode, format);
        let images = self.resolve_images(&card).await;

        let bytes = match format {
            ExportFormat::Png => {
                let options = RasterOptions::new(self.settings.pixel_ratio)
                    .with_padding(self.settings.frame.padding_x, self.settings.frame.padding_y);
                self.capture_png(card, options, images).await?
            }
            ExportFormat::Svg => {
                let card = card.retaining_images(|source| images.contains_key(source));
                let capture = Arc::clone(&self.capture);
                tokio::task::spawn_blocking(move || capture.capture_svg(&card))
                    .await??
                    .into_bytes()
            }
        };

        self.deliver(&filename, format.mime(), &bytes)
    }

    /// Capture both cards side by side with captions underneath.
    pub async fn export_two_up(
        &self,
        before: Option<RenderedCard>,
        after: Option<RenderedCard>,
    ) -> Result<ExportOutcome, ExportError> {
        let before = before.ok_or(ExportError::MissingNode(ExportMode::Comparison))?;
        let after = after.ok_or(ExportError::MissingNode(ExportMode::Comparison))?;
        let options = RasterOptions::new(self.settings.comparison_pixel_ratio);

        let (before_png, after_png) = tokio::try_join!(
            async {
                let images = self.resolve_images(&before).await;
                self.capture_png(before, options, images).await
            },
            async {
                let images = self.resolve_images(&after).await;
                self.capture_png(after, options, images).await
            },
        )?;

        let (before_img, after_img) = tokio::try_join!(decode_png(before_png), decode_png(after_png))?;

        let (width, height) = before_img.dimensions();
        let gutter = self.settings.gutter;
        let canvas_width = width * 2 + gutter;
        let canvas_height = height + self.settings.caption_height;
        debug!(canvas_width, canvas_height, "composing comparison");

        let mut canvas = self.canvas.create_canvas(canvas_width, canvas_height)?;
        canvas.draw_image(&before_img, 0, 0);
        canvas.draw_image(&after_img, i64::from(width + gutter), 0);

        let style = TextStyle {
            size: CAPTION_SIZE,
            color: palette_colors::MUTED,
            bold: true,
        };
        let baseline = height as f32 + CAPTION_BASELINE;
        canvas.fill_text_centered("Before", width as f32 / 2.0, baseline, &style)?;
        canvas.fill_text_centered(
            "After",
            (width + gutter) as f32 + width as f32 / 2.0,
            baseline,
            &style,
        )?;
        let png = canvas.encode_png()?;

        self.deliver(
            &export_filename(ExportMode::Comparison, ExportFormat::Png),
            ExportFormat::Png.mime(),
            &png,
        )
    }

    /// Decode every image the card embeds. Failures and timeouts are logged
    /// and left out of the result.
    async fn resolve_images(&self, card: &RenderedCard) -> ResolvedImages {
        let mut resolved = ResolvedImages::new();
        for source in card.image_sources() {
            let decoder = Arc::clone(&self.decoder);
            let owned = source.to_string();
            let task = tokio::task::spawn_blocking(move || decoder.decode(&owned));

            match tokio::time::timeout(self.settings.image_timeout, task).await {
                Ok(Ok(Ok(image))) => {
                    resolved.insert(source.to_string(), image.to_rgba8());
                }
                Ok(Ok(Err(e))) => warn!("embedded image failed to decode, using initials: {e}"),
                Ok(Err(e)) => warn!("image decode task failed, using initials: {e}"),
                Err(_) => warn!(
                    timeout_ms = self.settings.image_timeout.as_millis() as u64,
                    "embedded image timed out, using initials"
                ),
            }
        }
        resolved
    }

    async fn capture_png(
        &self,
        card: RenderedCard,
        options: RasterOptions,
        images: ResolvedImages,
    ) -> Result<Vec<u8>, ExportError> {
        let capture = Arc::clone(&self.capture);
        tokio::task::spawn_blocking(move || capture.capture_png(&card, &options, &images)).await?
    }

    fn deliver(&self, filename: &str, mime: &str, bytes: &[u8]) -> Result<ExportOutcome, ExportError> {
        let path = self
            .sink
            .deliver(filename, mime, bytes)
            .map_err(|source| ExportError::Sink {
                filename: filename.to_string(),
                source,
            })?;
        Ok(ExportOutcome {
            filename: filename.to_string(),
            path,
            bytes: bytes.len(),
        })
    }
}

async fn decode_png(bytes: Vec<u8>) -> Result<image::RgbaImage, ExportError> {
    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;
    Ok(image.to_rgba8())
}

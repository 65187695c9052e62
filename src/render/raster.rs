//! Raster backend
//!
//! Paints a [`RenderedCard`] into an RGBA bitmap at a pixel-density
//! multiplier. Elements become `tiny-skia` paths in logical pixels and a
//! single scale transform takes them to device pixels, so shapes, gradients
//! and glyph outlines stay sharp at every ratio.

use ab_glyph::{Font, FontArc, GlyphId, OutlineCurve, PxScale, ScaleFont};
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, GradientStop, LinearGradient, Paint, Path, PathBuilder,
    Pattern, Pixmap, PixmapPaint, Point, Rect, Shader, SpreadMode, Stroke, Transform,
};

use super::fonts::Fonts;
use super::{palette_colors, Anchor, Color, Element, Fill, RenderedCard, ResolvedImages};
use crate::error::ExportError;
use crate::platform::{CanvasProvider, RasterCanvas, TextStyle};

/// Largest canvas edge we agree to allocate.
const MAX_CANVAS_EDGE: u32 = 16_384;

/// Stops sampled from [`Fill::color_at`] so gradients blend in linear light.
const GRADIENT_STOPS: usize = 8;

/// Bezier handle length for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Output density and transparent frame around the card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub pixel_ratio: f32,
    pub padding_x: f32,
    pub padding_y: f32,
}

impl RasterOptions {
    pub fn new(pixel_ratio: f32) -> Self {
        Self {
            pixel_ratio,
            padding_x: 0.0,
            padding_y: 0.0,
        }
    }

    pub fn with_padding(mut self, padding_x: f32, padding_y: f32) -> Self {
        self.padding_x = padding_x;
        self.padding_y = padding_y;
        self
    }

    /// Bitmap size for `card`, in device pixels.
    pub fn output_size(&self, card: &RenderedCard) -> (u32, u32) {
        let ratio = self.ratio();
        (
            ((card.width + 2.0 * self.padding_x) * ratio).ceil().max(1.0) as u32,
            ((card.height + 2.0 * self.padding_y) * ratio).ceil().max(1.0) as u32,
        )
    }

    fn ratio(&self) -> f32 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        }
    }

    /// Logical card coordinates to device pixels.
    fn transform(&self) -> Transform {
        let ratio = self.ratio();
        Transform::from_scale(ratio, ratio).pre_translate(self.padding_x, self.padding_y)
    }
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl From<Color> for tiny_skia::Color {
    fn from(color: Color) -> Self {
        tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Rasterize `card`. Images missing from `images` fall back to initials.
/// Text needs `fonts`; without them any text element fails the render.
pub fn rasterize(
    card: &RenderedCard,
    options: &RasterOptions,
    images: &ResolvedImages,
    fonts: Option<&Fonts>,
) -> Result<RgbaImage, ExportError> {
    let (width, height) = options.output_size(card);
    if width > MAX_CANVAS_EDGE || height > MAX_CANVAS_EDGE {
        return Err(ExportError::CanvasUnavailable(format!(
            "{width}x{height} exceeds the {MAX_CANVAS_EDGE}px limit"
        )));
    }
    let pixmap = Pixmap::new(width, height).ok_or_else(|| {
        ExportError::CanvasUnavailable(format!("cannot allocate a {width}x{height} bitmap"))
    })?;

    let mut painter = Painter {
        pixmap,
        transform: options.transform(),
        ratio: options.ratio(),
        fonts,
    };

    for element in &card.elements {
        painter.draw(element, images)?;
    }

    Ok(image_from_pixmap(&painter.pixmap))
}

/// PNG-encode a bitmap.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

struct Painter<'a> {
    pixmap: Pixmap,
    transform: Transform,
    ratio: f32,
    fonts: Option<&'a Fonts>,
}

impl Painter<'_> {
    fn draw(&mut self, element: &Element, images: &ResolvedImages) -> Result<(), ExportError> {
        match element {
            Element::RoundedRect {
                x,
                y,
                width,
                height,
                radius,
                fill,
                stroke,
            } => {
                if let Some(path) = rounded_rect(*x, *y, *width, *height, *radius) {
                    let shader = fill_shader(fill, *x, *y, *width, *height);
                    self.pixmap.fill_path(
                        &path,
                        &paint(shader),
                        FillRule::Winding,
                        self.transform,
                        None,
                    );
                }
                if let Some(color) = stroke {
                    // One logical pixel, kept inside the edge.
                    let inset = rounded_rect(
                        x + 0.5,
                        y + 0.5,
                        width - 1.0,
                        height - 1.0,
                        radius - 0.5,
                    );
                    if let Some(path) = inset {
                        self.stroke(&path, *color, 1.0);
                    }
                }
            }
            Element::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => {
                let mut pb = PathBuilder::new();
                pb.move_to(*x1, *y1);
                pb.line_to(*x2, *y2);
                if let Some(path) = pb.finish() {
                    self.stroke(&path, *color, width.max(1.0 / self.ratio));
                }
            }
            Element::Text {
                x,
                y,
                text,
                size,
                weight,
                color,
                anchor,
            } => {
                let fonts = self.fonts.ok_or(ExportError::FontUnavailable)?;
                fill_text(
                    &mut self.pixmap,
                    fonts.face(weight.is_bold()),
                    text,
                    (*x, *y),
                    *size,
                    *color,
                    *anchor,
                    self.transform,
                );
            }
            Element::Avatar {
                cx,
                cy,
                radius,
                image,
                initials,
                ring,
            } => {
                let (cx, cy, r) = (*cx, *cy, *radius);
                let bitmap = image.as_ref().and_then(|source| images.get(source));
                match bitmap {
                    Some(bitmap) => self.draw_circular_image(bitmap, cx, cy, r),
                    None => {
                        if let Some(disc) = PathBuilder::from_circle(cx, cy, r) {
                            let gradient = Fill::Gradient {
                                from: palette_colors::AVATAR_FROM,
                                to: palette_colors::AVATAR_TO,
                            };
                            let shader = fill_shader(&gradient, cx - r, cy - r, r * 2.0, r * 2.0);
                            self.pixmap.fill_path(
                                &disc,
                                &paint(shader),
                                FillRule::Winding,
                                self.transform,
                                None,
                            );
                        }
                        let fonts = self.fonts.ok_or(ExportError::FontUnavailable)?;
                        let size = r * 0.5625;
                        fill_text(
                            &mut self.pixmap,
                            fonts.bold(),
                            initials,
                            (cx, cy + size * 0.35),
                            size,
                            Color::WHITE,
                            Anchor::Middle,
                            self.transform,
                        );
                    }
                }
                // Ring sits just outside the avatar edge.
                if let Some(path) = PathBuilder::from_circle(cx, cy, r + 1.0) {
                    self.stroke(&path, *ring, 2.0);
                }
            }
        }
        Ok(())
    }

    fn stroke(&mut self, path: &Path, color: Color, width: f32) {
        if color.a == 0 {
            return;
        }
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            path,
            &paint(Shader::SolidColor(color.into())),
            &stroke,
            self.transform,
            None,
        );
    }

    /// Center-crop `source` to a square and fill the avatar circle with it.
    fn draw_circular_image(&mut self, source: &RgbaImage, cx: f32, cy: f32, r: f32) {
        let side = source.width().min(source.height());
        if side == 0 {
            return;
        }
        let square = imageops::crop_imm(
            source,
            (source.width() - side) / 2,
            (source.height() - side) / 2,
            side,
            side,
        )
        .to_image();
        let (Some(texture), Some(disc)) =
            (pixmap_from_image(&square), PathBuilder::from_circle(cx, cy, r))
        else {
            return;
        };
        let scale = r * 2.0 / side as f32;
        let shader = Pattern::new(
            texture.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bicubic,
            1.0,
            Transform::from_translate(cx - r, cy - r).pre_scale(scale, scale),
        );
        self.pixmap
            .fill_path(&disc, &paint(shader), FillRule::Winding, self.transform, None);
    }
}

fn paint(shader: Shader<'_>) -> Paint<'_> {
    Paint {
        shader,
        anti_alias: true,
        ..Paint::default()
    }
}

/// Gradients run from the top-left to the bottom-right of the given box.
fn fill_shader(fill: &Fill, x: f32, y: f32, width: f32, height: f32) -> Shader<'static> {
    match fill {
        Fill::Solid(color) => Shader::SolidColor((*color).into()),
        Fill::Gradient { .. } => {
            let stops = (0..=GRADIENT_STOPS)
                .map(|i| {
                    let t = i as f32 / GRADIENT_STOPS as f32;
                    GradientStop::new(t, fill.color_at(t).into())
                })
                .collect();
            // The unit square maps onto the box, so `t` is the mean of the
            // normalized x and y offsets.
            LinearGradient::new(
                Point::from_xy(0.0, 0.0),
                Point::from_xy(1.0, 1.0),
                stops,
                SpreadMode::Pad,
                Transform::from_row(width, 0.0, 0.0, height, x, y),
            )
            .unwrap_or_else(|| Shader::SolidColor(fill.color_at(0.5).into()))
        }
    }
}

fn rounded_rect(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Option<Path> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let r = radius.min(width / 2.0).min(height / 2.0);
    if r <= 0.0 {
        return Rect::from_xywh(x, y, width, height).map(PathBuilder::from_rect);
    }
    let (right, bottom) = (x + width, y + height);
    let k = r * (1.0 - KAPPA);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - k, y, right, y + k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - k, right - k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + k, bottom, x, bottom - k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + k, x + k, y, x + r, y);
    pb.close();
    pb.finish()
}

/// Characters the font has no glyph for are dropped.
fn drawable_text(font: &FontArc, text: &str) -> String {
    text.chars()
        .filter(|c| c.is_whitespace() || font.glyph_id(*c).0 != 0)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Glyph outlines of `text` laid out on `baseline`, in the caller's units.
fn text_path(
    font: &FontArc,
    text: &str,
    x: f32,
    baseline: f32,
    size: f32,
    anchor: Anchor,
) -> Option<Path> {
    let scaled = font.as_scaled(PxScale::from(size));
    let glyphs: Vec<GlyphId> = text.chars().map(|c| font.glyph_id(c)).collect();

    let mut advance = 0.0;
    let mut prev: Option<GlyphId> = None;
    let mut pens = Vec::with_capacity(glyphs.len());
    for id in &glyphs {
        if let Some(prev) = prev {
            advance += scaled.kern(prev, *id);
        }
        pens.push(advance);
        advance += scaled.h_advance(*id);
        prev = Some(*id);
    }

    let left = match anchor {
        Anchor::Start => x,
        Anchor::Middle => x - advance / 2.0,
        Anchor::End => x - advance,
    };
    let (h, v) = (scaled.h_scale_factor(), scaled.v_scale_factor());

    let mut pb = PathBuilder::new();
    for (id, pen) in glyphs.iter().zip(pens) {
        let Some(outline) = font.outline(*id) else {
            continue;
        };
        let origin = left + pen;
        let at = |p: ab_glyph::Point| (origin + p.x * h, baseline - p.y * v);
        let mut cursor: Option<ab_glyph::Point> = None;
        for curve in &outline.curves {
            let (start, end) = match curve {
                OutlineCurve::Line(p0, p1) => (*p0, *p1),
                OutlineCurve::Quad(p0, _, p2) => (*p0, *p2),
                OutlineCurve::Cubic(p0, _, _, p3) => (*p0, *p3),
            };
            if cursor != Some(start) {
                if cursor.is_some() {
                    pb.close();
                }
                let (sx, sy) = at(start);
                pb.move_to(sx, sy);
            }
            match curve {
                OutlineCurve::Line(_, p1) => {
                    let (x1, y1) = at(*p1);
                    pb.line_to(x1, y1);
                }
                OutlineCurve::Quad(_, p1, p2) => {
                    let ((x1, y1), (x2, y2)) = (at(*p1), at(*p2));
                    pb.quad_to(x1, y1, x2, y2);
                }
                OutlineCurve::Cubic(_, p1, p2, p3) => {
                    let ((x1, y1), (x2, y2), (x3, y3)) = (at(*p1), at(*p2), at(*p3));
                    pb.cubic_to(x1, y1, x2, y2, x3, y3);
                }
            }
            cursor = Some(end);
        }
        if cursor.is_some() {
            pb.close();
        }
    }
    pb.finish()
}

#[allow(clippy::too_many_arguments)]
fn fill_text(
    pixmap: &mut Pixmap,
    font: &FontArc,
    text: &str,
    (x, baseline): (f32, f32),
    size: f32,
    color: Color,
    anchor: Anchor,
    transform: Transform,
) {
    let text = drawable_text(font, text);
    if text.is_empty() || size <= 0.0 || color.a == 0 {
        return;
    }
    if let Some(path) = text_path(font, &text, x, baseline, size, anchor) {
        pixmap.fill_path(
            &path,
            &paint(Shader::SolidColor(color.into())),
            FillRule::Winding,
            transform,
            None,
        );
    }
}

fn pixmap_from_image(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

fn image_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

/// A [`RasterCanvas`] over an in-memory bitmap, in device pixels.
pub struct ImageCanvas {
    pixmap: Pixmap,
    fonts: Option<Fonts>,
}

impl ImageCanvas {
    pub fn new(width: u32, height: u32, fonts: Option<Fonts>) -> Result<Self, ExportError> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ExportError::CanvasUnavailable(format!("cannot allocate a {width}x{height} canvas"))
        })?;
        Ok(Self { pixmap, fonts })
    }
}

impl RasterCanvas for ImageCanvas {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        let (Some(source), Ok(x), Ok(y)) =
            (pixmap_from_image(image), i32::try_from(x), i32::try_from(y))
        else {
            return;
        };
        self.pixmap.draw_pixmap(
            x,
            y,
            source.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn fill_text_centered(
        &mut self,
        text: &str,
        center_x: f32,
        baseline: f32,
        style: &TextStyle,
    ) -> Result<(), ExportError> {
        let fonts = self.fonts.as_ref().ok_or(ExportError::FontUnavailable)?;
        fill_text(
            &mut self.pixmap,
            fonts.face(style.bold),
            text,
            (center_x, baseline),
            style.size,
            style.color,
            Anchor::Middle,
            Transform::identity(),
        );
        Ok(())
    }

    fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        encode_png(&image_from_pixmap(&self.pixmap))
    }
}

/// Allocates [`ImageCanvas`]es sharing one set of fonts.
#[derive(Debug, Clone, Default)]
pub struct ImageCanvasProvider {
    fonts: Option<Fonts>,
}

impl ImageCanvasProvider {
    pub fn new(fonts: Option<Fonts>) -> Self {
        Self { fonts }
    }
}

impl CanvasProvider for ImageCanvasProvider {
    fn create_canvas(&self, width: u32, height: u32) -> Result<Box<dyn RasterCanvas>, ExportError> {
        if width > MAX_CANVAS_EDGE || height > MAX_CANVAS_EDGE {
            return Err(ExportError::CanvasUnavailable(format!(
                "cannot allocate a {width}x{height} canvas"
            )));
        }
        Ok(Box::new(ImageCanvas::new(width, height, self.fonts.clone())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::FontWeight;

    fn square(fill: Fill) -> RenderedCard {
        RenderedCard {
            width: 20.0,
            height: 10.0,
            elements: vec![Element::RoundedRect {
                x: 0.0,
                y: 0.0,
                width: 20.0,
                height: 10.0,
                radius: 0.0,
                fill,
                stroke: None,
            }],
        }
    }

    fn close_to(actual: [u8; 4], expected: [u8; 4]) -> bool {
        actual
            .iter()
            .zip(expected.iter())
            .all(|(a, e)| a.abs_diff(*e) <= 2)
    }

    #[test]
    fn test_output_size_includes_padding() {
        let options = RasterOptions::new(3.0).with_padding(100.0, 120.0);
        assert_eq!(options.output_size(&square(Fill::Solid(Color::WHITE))), (660, 750));
    }

    #[test]
    fn test_rect_fills_and_frame_stays_transparent() {
        let card = square(Fill::Solid(palette_colors::CARD_BACKGROUND));
        let options = RasterOptions::new(2.0).with_padding(5.0, 5.0);
        let img = rasterize(&card, &options, &ResolvedImages::new(), None).unwrap();
        assert_eq!(img.dimensions(), (60, 40));
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(img.get_pixel(30, 20).0, [0x1B, 0x1C, 0x1F, 255]);
    }

    #[test]
    fn test_rounded_corner_is_cut() {
        let card = RenderedCard {
            width: 40.0,
            height: 40.0,
            elements: vec![Element::RoundedRect {
                x: 0.0,
                y: 0.0,
                width: 40.0,
                height: 40.0,
                radius: 12.0,
                fill: Fill::Solid(Color::WHITE),
                stroke: None,
            }],
        };
        let img = rasterize(&card, &RasterOptions::default(), &ResolvedImages::new(), None).unwrap();
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(img.get_pixel(39, 39).0[3], 0);
        assert_eq!(img.get_pixel(20, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_gradient_runs_corner_to_corner() {
        let from = Color::rgb(255, 0, 0);
        let to = Color::rgb(0, 0, 255);
        let img = rasterize(
            &square(Fill::Gradient { from, to }),
            &RasterOptions::new(4.0),
            &ResolvedImages::new(),
            None,
        )
        .unwrap();
        let (w, h) = img.dimensions();
        let top_left = img.get_pixel(0, 0).0;
        let bottom_right = img.get_pixel(w - 1, h - 1).0;
        assert!(top_left[0] > 240 && top_left[2] < 15, "{top_left:?}");
        assert!(bottom_right[2] > 240 && bottom_right[0] < 15, "{bottom_right:?}");
        let middle = img.get_pixel(w / 2, h / 2).0;
        assert!(middle[0] > 100 && middle[2] > 100, "{middle:?}");
    }

    #[test]
    fn test_text_needs_fonts() {
        let card = RenderedCard {
            width: 10.0,
            height: 10.0,
            elements: vec![Element::Text {
                x: 0.0,
                y: 8.0,
                text: "Hi".into(),
                size: 8.0,
                weight: FontWeight::Regular,
                color: Color::WHITE,
                anchor: Anchor::Start,
            }],
        };
        let result = rasterize(&card, &RasterOptions::default(), &ResolvedImages::new(), None);
        assert!(matches!(result, Err(ExportError::FontUnavailable)));
    }

    #[test]
    fn test_text_is_drawn_from_outlines() {
        let fonts = Fonts::embedded().unwrap();
        let card = RenderedCard {
            width: 60.0,
            height: 30.0,
            elements: vec![Element::Text {
                x: 30.0,
                y: 22.0,
                text: "HH".into(),
                size: 20.0,
                weight: FontWeight::Bold,
                color: Color::WHITE,
                anchor: Anchor::Middle,
            }],
        };
        let img = rasterize(&card, &RasterOptions::new(2.0), &ResolvedImages::new(), Some(&fonts))
            .unwrap();
        let inked: Vec<u32> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[3] > 128)
            .map(|(x, _, _)| x)
            .collect();
        assert!(!inked.is_empty());
        // Middle anchor centers the ink on x = 30 logical.
        let (min, max) = (inked.iter().min().unwrap(), inked.iter().max().unwrap());
        assert!((*min as i32 + *max as i32 - 120).abs() <= 6, "{min}..{max}");
        // Nothing above the cap height or below the baseline.
        assert!(img.enumerate_pixels().all(|(_, y, p)| p.0[3] == 0 || (y > 10 && y <= 46)));
    }

    #[test]
    fn test_resolved_avatar_is_painted() {
        let source = "data:image/png;base64,test".to_string();
        let card = RenderedCard {
            width: 40.0,
            height: 40.0,
            elements: vec![Element::Avatar {
                cx: 20.0,
                cy: 20.0,
                radius: 16.0,
                image: Some(source.clone()),
                initials: "T".into(),
                ring: Color::TRANSPARENT,
            }],
        };
        let mut images = ResolvedImages::new();
        images.insert(source, RgbaImage::from_pixel(8, 4, image::Rgba([0, 200, 0, 255])));

        let img = rasterize(&card, &RasterOptions::default(), &images, None).unwrap();
        assert!(close_to(img.get_pixel(20, 20).0, [0, 200, 0, 255]));
        assert_eq!(img.get_pixel(1, 1).0[3], 0);
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let card = square(Fill::Solid(Color::WHITE));
        let options = RasterOptions::new(10_000.0);
        assert!(matches!(
            rasterize(&card, &options, &ResolvedImages::new(), None),
            Err(ExportError::CanvasUnavailable(_))
        ));
    }

    #[test]
    fn test_image_canvas_composes_and_encodes() {
        let provider = ImageCanvasProvider::new(None);
        let mut canvas = provider.create_canvas(10, 5).unwrap();
        canvas.draw_image(&RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255])), 6, 1);
        let png = canvas.encode_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (10, 5));
        assert_eq!(decoded.get_pixel(7, 2).0, [9, 9, 9, 255]);
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_caption_without_font_fails() {
        let mut canvas = ImageCanvas::new(10, 10, None).unwrap();
        let style = TextStyle {
            size: 16.0,
            color: palette_colors::MUTED,
            bold: false,
        };
        assert!(matches!(
            canvas.fill_text_centered("Before", 5.0, 8.0, &style),
            Err(ExportError::FontUnavailable)
        ));
    }

    #[test]
    fn test_zero_canvas_rejected() {
        assert!(ImageCanvasProvider::default().create_canvas(0, 10).is_err());
    }
}

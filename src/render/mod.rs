//! Card scene
//!
//! The preview lays a card out as a flat list of drawing primitives in
//! logical pixels. The backends turn that list into SVG markup or an RGBA
//! bitmap; neither knows anything about cards.

pub mod fonts;
pub mod raster;
pub mod svg;

use std::collections::HashMap;
use std::str::FromStr;

use image::RgbaImage;
use palette::{LinSrgb, Mix, Srgb};

/// Decoded bitmaps keyed by the image reference they were loaded from.
pub type ResolvedImages = HashMap<String, RgbaImage>;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let rgb = Srgb::<u8>::from_str(hex.trim()).ok()?;
        Some(Self::rgb(rgb.red, rgb.green, rgb.blue))
    }

    /// Same color at `opacity` (0.0 to 1.0).
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    pub fn opacity(&self) -> f32 {
        self.a as f32 / 255.0
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Interpolate towards `other` in linear light.
    pub fn mix(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let from: LinSrgb<f32> = Srgb::new(self.r, self.g, self.b).into_format::<f32>().into_linear();
        let to: LinSrgb<f32> = Srgb::new(other.r, other.g, other.b).into_format::<f32>().into_linear();
        let mixed: Srgb<u8> = Srgb::<f32>::from_linear(from.mix(to, t)).into_format();
        let alpha = self.a as f32 + (other.a as f32 - self.a as f32) * t;
        Color::rgba(mixed.red, mixed.green, mixed.blue, alpha.round() as u8)
    }
}

/// Card palette.
pub mod palette_colors {
    use super::Color;

    pub const CARD_BACKGROUND: Color = Color::rgb(0x1B, 0x1C, 0x1F);
    pub const CARD_BORDER: Color = Color::rgb(0x2A, 0x2B, 0x31);
    pub const MUTED: Color = Color::rgb(0xA8, 0xAB, 0xB3);
    pub const SECTION_TITLE: Color = Color::rgb(0xE7, 0xE9, 0xEE);
    pub const LABEL: Color = Color::rgb(0xF3, 0xF4, 0xF6);
    pub const SUBLABEL: Color = Color::rgb(0x9D, 0xA3, 0xAE);
    pub const BRAND: Color = Color::rgb(0x8A, 0x8F, 0x99);
    pub const AVATAR_FROM: Color = Color::rgb(0x93, 0x33, 0xEA);
    pub const AVATAR_TO: Color = Color::rgb(0x25, 0x63, 0xEB);
    pub const CTA_FROM: Color = Color::rgb(0x7C, 0x3A, 0xED);
    pub const CTA_TO: Color = Color::rgb(0x8B, 0x5C, 0xF6);
    pub const BAR_TRACK: Color = Color::rgb(0x2A, 0x2B, 0x31);
}

/// How a shape is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Color),
    /// Linear gradient from the top-left corner to the bottom-right corner.
    Gradient { from: Color, to: Color },
}

impl Fill {
    /// Color at normalized position `t` along the gradient axis.
    pub fn color_at(&self, t: f32) -> Color {
        match self {
            Fill::Solid(color) => *color,
            Fill::Gradient { from, to } => from.mix(*to, t),
        }
    }
}

/// Horizontal text alignment relative to the text's `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Start,
    Middle,
    End,
}

impl Anchor {
    pub fn svg_name(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Medium,
    Semibold,
    Bold,
    ExtraBold,
}

impl FontWeight {
    pub fn css_weight(&self) -> u16 {
        match self {
            FontWeight::Regular => 400,
            FontWeight::Medium => 500,
            FontWeight::Semibold => 600,
            FontWeight::Bold => 700,
            FontWeight::ExtraBold => 800,
        }
    }

    /// Rasterized text only has a regular and a bold face.
    pub fn is_bold(&self) -> bool {
        *self >= FontWeight::Semibold
    }
}

/// One drawing primitive, in logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    RoundedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        fill: Fill,
        stroke: Option<Color>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Color,
        width: f32,
    },
    /// `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        weight: FontWeight,
        color: Color,
        anchor: Anchor,
    },
    /// A circular avatar. Without an image the initials are drawn on a
    /// gradient instead.
    Avatar {
        cx: f32,
        cy: f32,
        radius: f32,
        image: Option<String>,
        initials: String,
        ring: Color,
    },
}

/// A laid-out card ready for a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCard {
    pub width: f32,
    pub height: f32,
    pub elements: Vec<Element>,
}

impl RenderedCard {
    /// Every image reference the card embeds, in drawing order.
    pub fn image_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for element in &self.elements {
            if let Element::Avatar {
                image: Some(source),
                ..
            } = element
            {
                if !sources.contains(&source.as_str()) {
                    sources.push(source);
                }
            }
        }
        sources
    }

    /// Copy where avatars whose image fails `keep` fall back to initials.
    pub fn retaining_images(&self, keep: impl Fn(&str) -> bool) -> RenderedCard {
        let elements = self
            .elements
            .iter()
            .map(|element| match element {
                Element::Avatar {
                    cx,
                    cy,
                    radius,
                    image: Some(source),
                    initials,
                    ring,
                } if !keep(source) => Element::Avatar {
                    cx: *cx,
                    cy: *cy,
                    radius: *radius,
                    image: None,
                    initials: initials.clone(),
                    ring: *ring,
                },
                other => other.clone(),
            })
            .collect();
        RenderedCard {
            width: self.width,
            height: self.height,
            elements,
        }
    }
}

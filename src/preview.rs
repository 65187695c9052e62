//! Card preview
//!
//! Lays a [`CardState`] out as a [`RenderedCard`]. The layout is a pure
//! function of the card and the preview size; the same scene feeds the
//! terminal preview, the SVG backend and the rasterizer.

use crate::export::ExportMode;
use crate::format::{format_score, initials};
use crate::model::{Attributes, CardSlot, CardState, Layout, Stat, Trait, ViewMode};
use crate::render::{palette_colors as pal, Anchor, Color, Element, Fill, FontWeight, RenderedCard};
use crate::store::StoreState;

/// Logical width of a phone-sized card.
pub const CARD_WIDTH: f32 = 400.0;

const PADDING: f32 = 24.0;
const AVATAR_SIZE: f32 = 64.0;
const CARD_RADIUS: f32 = 28.0;
const CTA_HEIGHT: f32 = 48.0;
const STAT_ROW_HEIGHT: f32 = 60.0;
const STAT_COLUMN_GAP: f32 = 16.0;

/// How large the card is drawn. Presentation only; the content is the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewSize {
    #[default]
    Phone,
    Thumbnail,
}

impl PreviewSize {
    pub fn scale(&self) -> f32 {
        match self {
            PreviewSize::Phone => 1.0,
            PreviewSize::Thumbnail => 0.6,
        }
    }
}

/// Lay out `card` at `size`.
pub fn render(card: &CardState, size: PreviewSize) -> RenderedCard {
    let mut elements = Vec::new();
    let inner_right = CARD_WIDTH - PADDING;

    // Header: title block on the left, avatar on the right.
    let top = PADDING;
    elements.push(text(
        PADDING,
        top + 28.0,
        card.headline(),
        28.0,
        FontWeight::Bold,
        Color::WHITE,
        Anchor::Start,
    ));
    elements.push(text(
        PADDING,
        top + 52.0,
        card.percentile_text.clone(),
        14.0,
        FontWeight::Medium,
        pal::MUTED,
        Anchor::Start,
    ));
    elements.push(Element::Avatar {
        cx: inner_right - AVATAR_SIZE / 2.0,
        cy: top + AVATAR_SIZE / 2.0,
        radius: AVATAR_SIZE / 2.0,
        image: card.avatar_url.clone(),
        initials: initials(&card.percentile_text),
        ring: Color::WHITE.with_opacity(0.2),
    });
    let mut y = top + AVATAR_SIZE + 16.0;

    // Divider
    y += 16.0;
    elements.push(Element::Line {
        x1: PADDING,
        y1: y + 0.5,
        x2: inner_right,
        y2: y + 0.5,
        color: pal::CARD_BORDER,
        width: 1.0,
    });
    y += 1.0 + 16.0;

    // Section title
    y += 4.0;
    elements.push(text(
        PADDING,
        y + 20.0,
        card.attributes.kind().section_title().to_string(),
        18.0,
        FontWeight::Bold,
        pal::SECTION_TITLE,
        Anchor::Start,
    ));
    y += 27.0 + 8.0;

    y = match &card.attributes {
        Attributes::Traits(traits) => layout_traits(traits, y, &mut elements),
        Attributes::Stats(stats) => layout_stats(stats, y, &mut elements),
    };

    // Footer
    y += 24.0;
    elements.push(text(
        CARD_WIDTH / 2.0,
        y + 14.0,
        card.hint_text.clone(),
        13.0,
        FontWeight::Regular,
        pal::SUBLABEL,
        Anchor::Middle,
    ));
    y += 20.0 + 12.0;
    elements.push(text(
        CARD_WIDTH / 2.0,
        y + 15.0,
        card.brand_text.clone(),
        14.0,
        FontWeight::Regular,
        pal::BRAND,
        Anchor::Middle,
    ));
    y += 20.0 + 18.0;
    let card_height = y;

    // The card body goes underneath everything laid out so far.
    elements.insert(
        0,
        Element::RoundedRect {
            x: 0.0,
            y: 0.0,
            width: CARD_WIDTH,
            height: card_height,
            radius: CARD_RADIUS,
            fill: Fill::Solid(pal::CARD_BACKGROUND),
            stroke: Some(pal::CARD_BORDER),
        },
    );

    // CTA pill below the card.
    let cta_y = card_height + 24.0;
    elements.push(Element::RoundedRect {
        x: 16.0,
        y: cta_y,
        width: CARD_WIDTH - 32.0,
        height: CTA_HEIGHT,
        radius: CTA_HEIGHT / 2.0,
        fill: Fill::Gradient {
            from: pal::CTA_FROM,
            to: pal::CTA_TO,
        },
        stroke: None,
    });
    elements.push(text(
        CARD_WIDTH / 2.0,
        cta_y + CTA_HEIGHT / 2.0 + 5.0,
        card.cta_label.clone(),
        15.0,
        FontWeight::Semibold,
        Color::WHITE,
        Anchor::Middle,
    ));

    let scene = RenderedCard {
        width: CARD_WIDTH,
        height: cta_y + CTA_HEIGHT,
        elements,
    };
    scale_card(scene, size.scale())
}

fn layout_traits(traits: &[Trait], mut y: f32, elements: &mut Vec<Element>) -> f32 {
    let inner_right = CARD_WIDTH - PADDING;
    for (index, t) in traits.iter().enumerate() {
        let content = if t.sublabel.is_some() { 38.0 } else { 28.0 };
        let row_top = y + 10.0;
        let middle = row_top + content / 2.0;

        elements.push(text(
            PADDING,
            middle + 8.0,
            t.icon.clone(),
            22.0,
            FontWeight::Regular,
            Color::WHITE,
            Anchor::Start,
        ));
        let label_x = PADDING + 28.0 + 12.0;
        match &t.sublabel {
            Some(sublabel) => {
                elements.push(text(
                    label_x,
                    row_top + 16.0,
                    t.label.clone(),
                    16.0,
                    FontWeight::Semibold,
                    pal::LABEL,
                    Anchor::Start,
                ));
                elements.push(text(
                    label_x,
                    row_top + 34.0,
                    sublabel.clone(),
                    13.0,
                    FontWeight::Medium,
                    pal::SUBLABEL,
                    Anchor::Start,
                ));
            }
            None => elements.push(text(
                label_x,
                middle + 6.0,
                t.label.clone(),
                16.0,
                FontWeight::Semibold,
                pal::LABEL,
                Anchor::Start,
            )),
        }
        elements.push(text(
            inner_right,
            middle + 8.0,
            format_score(t.rating),
            22.0,
            FontWeight::ExtraBold,
            Color::WHITE,
            Anchor::End,
        ));

        y = row_top + content + 10.0;
        if index + 1 < traits.len() {
            elements.push(Element::Line {
                x1: PADDING,
                y1: y - 0.5,
                x2: inner_right,
                y2: y - 0.5,
                color: pal::CARD_BORDER,
                width: 1.0,
            });
        }
    }
    y
}

/// Two columns, filled top to bottom.
fn layout_stats(stats: &[Stat], y: f32, elements: &mut Vec<Element>) -> f32 {
    let rows = stats.len().div_ceil(2).max(1);
    let column_width = (CARD_WIDTH - 2.0 * PADDING - STAT_COLUMN_GAP) / 2.0;

    for (index, stat) in stats.iter().enumerate() {
        let column = (index / rows) as f32;
        let row = (index % rows) as f32;
        let x = PADDING + column * (column_width + STAT_COLUMN_GAP);
        let top = y + row * STAT_ROW_HEIGHT;

        elements.push(text(
            x,
            top + 14.0,
            stat.label.clone(),
            13.0,
            FontWeight::Medium,
            pal::SUBLABEL,
            Anchor::Start,
        ));
        elements.push(text(
            x,
            top + 38.0,
            format!("{}", stat.value.round() as i64),
            22.0,
            FontWeight::ExtraBold,
            Color::WHITE,
            Anchor::Start,
        ));
        elements.push(Element::RoundedRect {
            x,
            y: top + 46.0,
            width: column_width,
            height: 6.0,
            radius: 3.0,
            fill: Fill::Solid(pal::BAR_TRACK),
            stroke: None,
        });
        let filled = column_width * (stat.value / 100.0).clamp(0.0, 1.0);
        if filled > 0.0 {
            elements.push(Element::RoundedRect {
                x,
                y: top + 46.0,
                width: filled,
                height: 6.0,
                radius: 3.0,
                fill: Fill::Gradient {
                    from: pal::CTA_FROM,
                    to: pal::CTA_TO,
                },
                stroke: None,
            });
        }
    }
    y + rows as f32 * STAT_ROW_HEIGHT
}

fn text(
    x: f32,
    y: f32,
    text: String,
    size: f32,
    weight: FontWeight,
    color: Color,
    anchor: Anchor,
) -> Element {
    Element::Text {
        x,
        y,
        text,
        size,
        weight,
        color,
        anchor,
    }
}

fn scale_card(card: RenderedCard, s: f32) -> RenderedCard {
    if s == 1.0 {
        return card;
    }
    let elements = card
        .elements
        .into_iter()
        .map(|element| match element {
            Element::RoundedRect {
                x,
                y,
                width,
                height,
                radius,
                fill,
                stroke,
            } => Element::RoundedRect {
                x: x * s,
                y: y * s,
                width: width * s,
                height: height * s,
                radius: radius * s,
                fill,
                stroke,
            },
            Element::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => Element::Line {
                x1: x1 * s,
                y1: y1 * s,
                x2: x2 * s,
                y2: y2 * s,
                color,
                width: width * s,
            },
            Element::Text {
                x,
                y,
                text,
                size,
                weight,
                color,
                anchor,
            } => Element::Text {
                x: x * s,
                y: y * s,
                text,
                size: size * s,
                weight,
                color,
                anchor,
            },
            Element::Avatar {
                cx,
                cy,
                radius,
                image,
                initials,
                ring,
            } => Element::Avatar {
                cx: cx * s,
                cy: cy * s,
                radius: radius * s,
                image,
                initials,
                ring,
            },
        })
        .collect();
    RenderedCard {
        width: card.width * s,
        height: card.height * s,
        elements,
    }
}

/// The card nodes that exist for the current view mode. Exports can only
/// capture what is mounted here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountedCards {
    pub before: Option<RenderedCard>,
    pub after: Option<RenderedCard>,
    pub card: Option<RenderedCard>,
}

impl MountedCards {
    pub fn node_for(&self, mode: ExportMode) -> Option<&RenderedCard> {
        match mode {
            ExportMode::Single => self.card.as_ref(),
            ExportMode::Before => self.before.as_ref(),
            ExportMode::After => self.after.as_ref(),
            ExportMode::Comparison => None,
        }
    }
}

/// Render the nodes the view mode shows.
pub fn mount(state: &StoreState) -> MountedCards {
    if state.layout() == Layout::Single {
        return MountedCards {
            card: state
                .card(CardSlot::Card)
                .map(|card| render(card, PreviewSize::Phone)),
            ..MountedCards::default()
        };
    }

    let size = match state.mode {
        ViewMode::CompareSide => PreviewSize::Thumbnail,
        _ => PreviewSize::Phone,
    };
    let show_before = matches!(state.mode, ViewMode::Before) || state.mode.is_comparison();
    let show_after = matches!(state.mode, ViewMode::After) || state.mode.is_comparison();

    MountedCards {
        before: state
            .card(CardSlot::Before)
            .filter(|_| show_before)
            .map(|card| render(card, size)),
        after: state
            .card(CardSlot::After)
            .filter(|_| show_after)
            .map(|card| render(card, size)),
        card: None,
    }
}

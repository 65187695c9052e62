//! SVG backend
//!
//! Serializes a [`RenderedCard`] as standalone SVG markup. Image references
//! are embedded as-is; `data:` URLs keep the file self-contained.

use super::{Color, Element, Fill, RenderedCard};

const FONT_FAMILY: &str = "Inter, -apple-system, system-ui, sans-serif";

/// Render the card as an SVG document.
pub fn render_svg(card: &RenderedCard) -> String {
    let mut defs = String::new();
    let mut body = String::new();
    let mut next_id = 0usize;

    for element in &card.elements {
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
                let paint = paint(fill, &mut defs, &mut next_id);
                let stroke_attrs = stroke
                    .map(|c| format!(" stroke=\"{}\"{} stroke-width=\"1\"", c.to_hex(), stroke_opacity(&c)))
                    .unwrap_or_default();
                body.push_str(&format!(
                    "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" {}{}/>\n",
                    num(*x),
                    num(*y),
                    num(*width),
                    num(*height),
                    num(*radius),
                    paint,
                    stroke_attrs
                ));
            }
            Element::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => {
                body.push_str(&format!(
                    "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\"{} stroke-width=\"{}\"/>\n",
                    num(*x1),
                    num(*y1),
                    num(*x2),
                    num(*y2),
                    color.to_hex(),
                    stroke_opacity(color),
                    num(*width)
                ));
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
                body.push_str(&format!(
                    "  <text x=\"{}\" y=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\"{} text-anchor=\"{}\">{}</text>\n",
                    num(*x),
                    num(*y),
                    num(*size),
                    weight.css_weight(),
                    color.to_hex(),
                    fill_opacity(color),
                    anchor.svg_name(),
                    escape(text)
                ));
            }
            Element::Avatar {
                cx,
                cy,
                radius,
                image,
                initials,
                ring,
            } => match image {
                Some(href) => {
                    let clip = format!("clip{next_id}");
                    next_id += 1;
                    defs.push_str(&format!(
                        "    <clipPath id=\"{clip}\"><circle cx=\"{}\" cy=\"{}\" r=\"{}\"/></clipPath>\n",
                        num(*cx),
                        num(*cy),
                        num(*radius)
                    ));
                    body.push_str(&format!(
                        "  <image href=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid slice\" clip-path=\"url(#{clip})\"/>\n",
                        escape(href),
                        num(cx - radius),
                        num(cy - radius),
                        num(radius * 2.0),
                        num(radius * 2.0)
                    ));
                    body.push_str(&ring_circle(*cx, *cy, *radius, ring));
                }
                None => {
                    let paint = paint(
                        &Fill::Gradient {
                            from: super::palette_colors::AVATAR_FROM,
                            to: super::palette_colors::AVATAR_TO,
                        },
                        &mut defs,
                        &mut next_id,
                    );
                    body.push_str(&format!(
                        "  <circle cx=\"{}\" cy=\"{}\" r=\"{}\" {}/>\n",
                        num(*cx),
                        num(*cy),
                        num(*radius),
                        paint
                    ));
                    body.push_str(&ring_circle(*cx, *cy, *radius, ring));
                    body.push_str(&format!(
                        "  <text x=\"{}\" y=\"{}\" font-size=\"{}\" font-weight=\"700\" fill=\"#FFFFFF\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>\n",
                        num(*cx),
                        num(*cy),
                        num(radius * 0.5625),
                        escape(initials)
                    ));
                }
            },
        }
    }

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"{FONT_FAMILY}\">\n",
        w = num(card.width),
        h = num(card.height)
    );
    if !defs.is_empty() {
        svg.push_str("  <defs>\n");
        svg.push_str(&defs);
        svg.push_str("  </defs>\n");
    }
    svg.push_str(&body);
    svg.push_str("</svg>\n");
    svg
}

/// `fill` attribute for a shape, registering a gradient definition if needed.
fn paint(fill: &Fill, defs: &mut String, next_id: &mut usize) -> String {
    match fill {
        Fill::Solid(color) => format!("fill=\"{}\"{}", color.to_hex(), fill_opacity(color)),
        Fill::Gradient { from, to } => {
            let id = format!("grad{}", *next_id);
            *next_id += 1;
            defs.push_str(&format!(
                "    <linearGradient id=\"{id}\" x1=\"0\" y1=\"0\" x2=\"1\" y2=\"1\"><stop offset=\"0\" stop-color=\"{}\"/><stop offset=\"1\" stop-color=\"{}\"/></linearGradient>\n",
                from.to_hex(),
                to.to_hex()
            ));
            format!("fill=\"url(#{id})\"")
        }
    }
}

fn ring_circle(cx: f32, cy: f32, radius: f32, ring: &Color) -> String {
    format!(
        "  <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"none\" stroke=\"{}\"{} stroke-width=\"2\"/>\n",
        num(cx),
        num(cy),
        num(radius),
        ring.to_hex(),
        stroke_opacity(ring)
    )
}

fn fill_opacity(color: &Color) -> String {
    if color.a == 255 {
        String::new()
    } else {
        format!(" fill-opacity=\"{}\"", num(color.opacity()))
    }
}

fn stroke_opacity(color: &Color) -> String {
    if color.a == 255 {
        String::new()
    } else {
        format!(" stroke-opacity=\"{}\"", num(color.opacity()))
    }
}

/// Numbers with at most two decimals and no trailing zeros.
fn num(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{:.2}", rounded);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Escape text for XML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

//! Preview area rendering
//!
//! Paints a [`RenderedCard`] into terminal cells: text lands on the row of its
//! baseline, bars and pills become background color, dividers become rules.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::model::ViewMode;
use crate::render::{self, palette_colors, Anchor, Element, RenderedCard};
use crate::state::{AppState, FocusedWidget};

/// One terminal cell of a painted card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<render::Color>,
    pub bg: Option<render::Color>,
    pub bold: bool,
    /// Right half of a double-width glyph
    pub continuation: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
            continuation: false,
        }
    }
}

/// A card painted at a fixed number of columns and rows
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl CellGrid {
    pub fn paint(card: &RenderedCard, cols: usize, rows: usize) -> Self {
        let mut grid = Self {
            cols,
            rows,
            cells: vec![Cell::default(); cols * rows],
        };
        if cols == 0 || rows == 0 || card.width <= 0.0 || card.height <= 0.0 {
            return grid;
        }
        let sx = cols as f32 / card.width;
        let sy = rows as f32 / card.height;

        for element in &card.elements {
            match element {
                Element::RoundedRect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                    ..
                } => {
                    // The card body is the terminal background
                    if *width >= card.width * 0.9 && *height >= card.height * 0.5 {
                        continue;
                    }
                    let c0 = (x * sx).round() as isize;
                    let c1 = ((x + width) * sx).round().max((x * sx).round() + 1.0) as isize;
                    let r0 = (y * sy).floor() as isize;
                    let r1 = ((y + height) * sy).ceil().max(r0 as f32 + 1.0) as isize;
                    for row in r0..r1 {
                        for col in c0..c1 {
                            let t = if c1 - c0 > 1 {
                                (col - c0) as f32 / (c1 - c0 - 1) as f32
                            } else {
                                0.0
                            };
                            let color = fill.color_at(t);
                            if let Some(cell) = grid.cell_mut(row, col) {
                                cell.bg = Some(color);
                            }
                        }
                    }
                }
                Element::Line { x1, y1, x2, .. } => {
                    let row = (y1 * sy).floor() as isize;
                    let (from, to) = (x1.min(*x2), x1.max(*x2));
                    for col in (from * sx).round() as isize..(to * sx).round() as isize {
                        if let Some(cell) = grid.cell_mut(row, col) {
                            cell.ch = '─';
                            cell.fg = Some(palette_colors::CARD_BORDER);
                        }
                    }
                }
                Element::Text {
                    x,
                    y,
                    text,
                    weight,
                    color,
                    anchor,
                    ..
                } => {
                    let row = ((y * sy).ceil() as isize - 1).max(0);
                    let width = text_width(text) as f32;
                    let col = match anchor {
                        Anchor::Start => x * sx,
                        Anchor::Middle => x * sx - width / 2.0,
                        Anchor::End => x * sx - width,
                    };
                    grid.put_text(row, col.round() as isize, text, *color, weight.is_bold());
                }
                Element::Avatar {
                    cx,
                    cy,
                    radius,
                    image,
                    initials,
                    ..
                } => {
                    let label = match image {
                        Some(_) => "[img]".to_string(),
                        None => format!("({initials})"),
                    };
                    let row = (cy * sy).floor() as isize;
                    let col = (cx * sx - text_width(&label) as f32 / 2.0).round() as isize;
                    let r0 = ((cy - radius) * sy).floor() as isize;
                    let r1 = ((cy + radius) * sy).ceil() as isize;
                    let c0 = ((cx - radius) * sx).round() as isize;
                    let c1 = ((cx + radius) * sx).round() as isize;
                    for r in r0..r1 {
                        for c in c0..c1 {
                            if let Some(cell) = grid.cell_mut(r, c) {
                                cell.bg = Some(palette_colors::AVATAR_FROM.mix(palette_colors::AVATAR_TO, 0.5));
                            }
                        }
                    }
                    grid.put_text(row, col, &label, render::Color::WHITE, true);
                }
            }
        }
        grid
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        (row < self.rows && col < self.cols).then(|| &self.cells[row * self.cols + col])
    }

    fn cell_mut(&mut self, row: isize, col: isize) -> Option<&mut Cell> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return None;
        }
        Some(&mut self.cells[row as usize * self.cols + col as usize])
    }

    fn put_text(&mut self, row: isize, col: isize, text: &str, color: render::Color, bold: bool) {
        let mut col = col.max(0);
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0);
            if width == 0 {
                continue;
            }
            if col as usize + width > self.cols {
                break;
            }
            if let Some(cell) = self.cell_mut(row, col) {
                cell.ch = ch;
                cell.fg = Some(color);
                cell.bold = bold;
                cell.continuation = false;
            }
            if width == 2 {
                if let Some(cell) = self.cell_mut(row, col + 1) {
                    cell.continuation = true;
                }
            }
            col += width as isize;
        }
    }

    /// Plain text of one row, for tests and logging
    pub fn row_text(&self, row: usize) -> String {
        (0..self.cols)
            .filter_map(|col| self.cell(row, col))
            .filter(|cell| !cell.continuation)
            .map(|cell| cell.ch)
            .collect()
    }

    /// Styled lines, optionally taking columns from `left` up to `split`.
    pub fn to_lines(&self, left: Option<(&CellGrid, usize)>) -> Vec<Line<'static>> {
        (0..self.rows)
            .map(|row| {
                let spans: Vec<Span<'static>> = (0..self.cols)
                    .filter_map(|col| match left {
                        Some((other, split)) if col < split => other.cell(row, col),
                        _ => self.cell(row, col),
                    })
                    .filter(|cell| !cell.continuation)
                    .map(|cell| Span::styled(cell.ch.to_string(), cell_style(cell)))
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

fn text_width(text: &str) -> usize {
    text.chars().filter_map(|c| c.width()).sum()
}

fn to_tui(color: render::Color) -> Color {
    let color = if color.a < 255 {
        palette_colors::CARD_BACKGROUND.mix(render::Color { a: 255, ..color }, color.opacity())
    } else {
        color
    };
    Color::Rgb(color.r, color.g, color.b)
}

fn cell_style(cell: &Cell) -> Style {
    let mut style = Style::default().bg(to_tui(cell.bg.unwrap_or(palette_colors::CARD_BACKGROUND)));
    if let Some(fg) = cell.fg {
        style = style.fg(to_tui(fg));
    }
    if cell.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

/// Rows needed to show `card` at `cols` columns, keeping terminal cells
/// roughly twice as tall as they are wide.
fn rows_for(card: &RenderedCard, cols: usize) -> usize {
    if card.width <= 0.0 {
        return 0;
    }
    ((card.height / card.width) * cols as f32 / 2.0).ceil() as usize
}

fn fit(card: &RenderedCard, area: Rect) -> (usize, usize) {
    let cols = area.width as usize;
    let rows = rows_for(card, cols).min(area.height as usize);
    (cols, rows)
}

/// Render the preview area
pub fn render_preview(frame: &mut Frame, area: Rect, state: &AppState) {
    let is_focused = state.focus == FocusedWidget::Preview;

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = match state.mode() {
        ViewMode::CompareSlider => format!(" Preview │ Slider {}% ", state.slider_position),
        mode => format!(" Preview │ {} ", mode.name()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mounted = state.mounted();
    if let Some(card) = &mounted.card {
        render_single(frame, inner, card);
        return;
    }
    match (state.mode(), &mounted.before, &mounted.after) {
        (ViewMode::CompareSide, Some(before), Some(after)) => {
            render_side_by_side(frame, inner, before, after)
        }
        (ViewMode::CompareSlider, Some(before), Some(after)) => {
            render_slider(frame, inner, before, after, state.slider_position)
        }
        (_, Some(card), _) | (_, None, Some(card)) => render_single(frame, inner, card),
        _ => render_placeholder(frame, inner),
    }
}

fn centered_column(area: Rect, max_width: u16) -> Rect {
    let width = area.width.min(max_width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn render_single(frame: &mut Frame, area: Rect, card: &RenderedCard) {
    let area = centered_column(area, 48);
    let (cols, rows) = fit(card, area);
    let grid = CellGrid::paint(card, cols, rows);
    frame.render_widget(Paragraph::new(grid.to_lines(None)), area);
}

fn render_side_by_side(frame: &mut Frame, area: Rect, before: &RenderedCard, after: &RenderedCard) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (half, card, caption) in [(halves[0], before, "Before"), (halves[1], after, "After")] {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(half);
        let column = centered_column(rows[0], half.width.saturating_sub(2));
        let (cols, height) = fit(card, column);
        let grid = CellGrid::paint(card, cols, height);
        frame.render_widget(Paragraph::new(grid.to_lines(None)), column);
        frame.render_widget(
            Paragraph::new(caption)
                .alignment(Alignment::Center)
                .style(Style::default().fg(to_tui(palette_colors::MUTED)).add_modifier(Modifier::BOLD)),
            rows[1],
        );
    }
}

fn render_slider(
    frame: &mut Frame,
    area: Rect,
    before: &RenderedCard,
    after: &RenderedCard,
    position: u16,
) {
    let area = centered_column(area, 48);
    let (cols, rows) = fit(after, area);
    let before_grid = CellGrid::paint(before, cols, rows);
    let after_grid = CellGrid::paint(after, cols, rows);
    let split = cols * position.min(100) as usize / 100;
    frame.render_widget(
        Paragraph::new(after_grid.to_lines(Some((&before_grid, split)))),
        area,
    );
}

/// Render placeholder when nothing is mounted
fn render_placeholder(frame: &mut Frame, area: Rect) {
    let message = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Nothing to preview",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press [1]-[4] to pick a view",
            Style::default().fg(Color::Green),
        )),
    ];

    let widget = Paragraph::new(message)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    frame.render_widget(widget, area);
}

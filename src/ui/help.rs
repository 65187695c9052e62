//! Help overlay rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the help overlay
pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let overlay_width = (area.width as f32 * 0.7).min(70.0) as u16;
    let overlay_height = (area.height as f32 * 0.8).min(34.0) as u16;

    let overlay_area = centered_rect(overlay_width, overlay_height, area);

    // Clear background
    frame.render_widget(Clear, overlay_area);

    // Render help content
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let help_text = create_help_text();
    let widget = Paragraph::new(help_text).style(Style::default().fg(Color::White));

    frame.render_widget(widget, inner);
}

/// Create help text content
fn create_help_text() -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let key_style = Style::default().fg(Color::Green);
    let desc_style = Style::default().fg(Color::White);

    let row = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<12}"), key_style),
            Span::styled(desc, desc_style),
        ])
    };

    vec![
        Line::from(Span::styled("Global", section_style)),
        row("Q", "Quit application"),
        row("?", "Toggle help overlay"),
        row("Tab", "Next widget"),
        row("Shift+Tab", "Previous widget"),
        row("1 2 3 4", "Before / After / Side-by-Side / Slider"),
        row("E", "Export the previewed card as PNG"),
        row("V", "Export the previewed card as SVG"),
        row("C", "Export the before/after comparison"),
        Line::from(""),
        Line::from(Span::styled("Editor", section_style)),
        row("↑ ↓", "Select field"),
        row("Enter", "Edit field"),
        row("← → + -", "Step score or rating"),
        row("A / D", "Add / remove stat or trait"),
        row("U / X", "Upload / remove avatar"),
        row("S", "Switch between before and after"),
        row("D (shift)", "Copy this card onto the other"),
        row("r / R", "Reset this card / all cards"),
        Line::from(""),
        Line::from(Span::styled("Preview", section_style)),
        row("← →", "Move the comparison slider"),
        row("Home End", "Slider fully before / after"),
        Line::from(""),
        Line::from(Span::styled("Crop dialog", section_style)),
        row("+ -", "Zoom"),
        row("Arrows", "Pan"),
        row("Enter / Esc", "Apply / cancel"),
        Line::from(""),
        Line::from(Span::styled(
            "       [Press ? or Esc to close]",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

/// Create a centered rectangle
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal_padding = area.width.saturating_sub(width) / 2;
    let vertical_padding = area.height.saturating_sub(height) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(vertical_padding),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(horizontal_padding),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let rect = centered_rect(20, 10, Rect::new(0, 0, 100, 40));
        assert_eq!(rect, Rect::new(40, 15, 20, 10));
    }

    #[test]
    fn test_help_lists_export_keys() {
        let text: String = create_help_text()
            .iter()
            .flat_map(|line| line.spans.iter().map(|span| span.content.to_string()))
            .collect();
        assert!(text.contains("Export"));
    }
}

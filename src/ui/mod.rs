//! UI module
//!
//! Contains all UI rendering components using Ratatui.

mod help;
pub mod preview;
mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::model::{Layout as CardLayout, ViewMode};
use crate::state::{AppState, FocusedWidget};

/// Main render function - draws the entire UI
pub fn render(frame: &mut Frame, state: &AppState) {
    let size = frame.area();

    // Check minimum size
    if size.width < 40 || size.height < 15 {
        render_size_warning(frame, size);
        return;
    }

    // Main layout: title bar, content, status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_title_bar(frame, main_chunks[0], state);
    render_main_content(frame, main_chunks[1], state);
    render_status_bar(frame, main_chunks[2], state);

    // Modals, topmost last
    if let Some(prompt) = &state.prompt {
        widgets::render_prompt(frame, size, state, prompt);
    }
    if let Some(crop) = &state.crop {
        widgets::render_crop(frame, size, crop);
    }
    if let Some(message) = &state.warning {
        widgets::render_warning(frame, size, message);
    }
    if state.show_help {
        help::render_help_overlay(frame, size);
    }
}

/// Render warning when terminal is too small
fn render_size_warning(frame: &mut Frame, area: Rect) {
    let warning = Paragraph::new("Terminal too small!\nMinimum: 40x15")
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(warning, area);
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = match state.store().layout() {
        CardLayout::Single => "Stat card".to_string(),
        CardLayout::Dual => format!("{} │ editing {}", state.mode().name(), state.slot),
    };
    let title = Line::from(vec![
        Span::styled(
            " Facecard ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            concat!("v", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" │ "),
        Span::styled(view.clone(), Style::default().fg(Color::Yellow)),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(38)
                .saturating_sub(view.chars().count()),
        )),
        Span::styled("[?]", Style::default().fg(Color::Green)),
        Span::raw(" Help  "),
        Span::styled("[Q]", Style::default().fg(Color::Red)),
        Span::raw(" Quit "),
    ]);

    let title_widget = Paragraph::new(title)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(title_widget, area);
}

/// Render the main content area
fn render_main_content(frame: &mut Frame, area: Rect, state: &AppState) {
    // Responsive layout: side-by-side if wide enough, stacked if narrow
    if area.width >= 80 {
        render_wide_layout(frame, area, state);
    } else {
        render_narrow_layout(frame, area, state);
    }
}

/// Render side-by-side layout for wide terminals
fn render_wide_layout(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(42), // Left panel
            Constraint::Min(40),    // Preview area
        ])
        .split(area);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // View selector
            Constraint::Min(5),    // Editor panel
        ])
        .split(chunks[0]);

    render_mode_selector(frame, left_chunks[0], state);
    render_editor_panel(frame, left_chunks[1], state);
    preview::render_preview(frame, chunks[1], state);
}

/// Render stacked layout for narrow terminals
fn render_narrow_layout(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),  // View selector
            Constraint::Length(10), // Editor panel
            Constraint::Min(5),     // Preview area
        ])
        .split(area);

    render_mode_selector(frame, chunks[0], state);
    render_editor_panel(frame, chunks[1], state);
    preview::render_preview(frame, chunks[2], state);
}

fn panel_block(title: &'static str, is_focused: bool) -> Block<'static> {
    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ))
}

/// Render the view mode selector
fn render_mode_selector(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" View ", state.focus == FocusedWidget::ModeSelector);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.store().layout() == CardLayout::Single {
        let line = Line::from(Span::styled(
            " Single card layout",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(line), inner);
        return;
    }

    let lines: Vec<Line> = ViewMode::all()
        .iter()
        .enumerate()
        .map(|(idx, mode)| {
            let is_selected = *mode == state.mode();
            let bullet = if is_selected { "●" } else { "○" };
            let style = if is_selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(
                    format!(" {} ", bullet),
                    if is_selected {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    },
                ),
                Span::styled(mode.name(), style),
                Span::styled(format!(" [{}]", idx + 1), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the editor panel
fn render_editor_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let is_focused = state.focus == FocusedWidget::EditorPanel;
    let block = panel_block(" Editor ", is_focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    widgets::render_editor_fields(frame, inner, state, is_focused);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let status_color = if state.status_is_error {
        Color::Red
    } else {
        Color::White
    };

    let export_info = match (state.pending_exports.len(), state.last_export_ms) {
        (0, Some(ms)) => format!("Last export: {ms}ms"),
        (0, None) => String::new(),
        (n, _) => format!("Exporting: {n}"),
    };
    let output_info = format!(" │ {}", state.config.output_dir().display());

    // Calculate spacing
    let status_len = state.status_message.chars().count();
    let info_len = export_info.chars().count() + output_info.chars().count();
    let spacing = (area.width as usize)
        .saturating_sub(status_len)
        .saturating_sub(info_len)
        .saturating_sub(2);

    let status = Line::from(vec![
        Span::raw(" "),
        Span::styled(&state.status_message, Style::default().fg(status_color)),
        Span::raw(" ".repeat(spacing)),
        Span::styled(&export_info, Style::default().fg(Color::DarkGray)),
        Span::styled(&output_info, Style::default().fg(Color::Blue)),
        Span::raw(" "),
    ]);

    let widget = Paragraph::new(status)
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(widget, area);
}

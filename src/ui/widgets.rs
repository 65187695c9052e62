//! Editor panel and modal widgets

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::avatar::CropSession;
use crate::editor::{EditorField, EntryPart};
use crate::format::fit_width;
use crate::model::{AttributeKind, CardState};
use crate::state::{AppState, Prompt};

use super::help::centered_rect;

/// Render the editor panel rows for the edited card
pub fn render_editor_fields(frame: &mut Frame, area: Rect, state: &AppState, is_focused: bool) {
    let Some(card) = state.card() else {
        frame.render_widget(Paragraph::new("No card in this slot"), area);
        return;
    };

    let fields = EditorField::fields(card);
    let value_width = (area.width as usize).saturating_sub(18).max(4);
    let mut lines = Vec::with_capacity(fields.len() + 8);

    for (idx, field) in fields.iter().enumerate() {
        // Blank line before each entry so the collection reads as groups
        if matches!(field, EditorField::Entry { part, .. } if *part == first_part(card)) {
            lines.push(Line::from(""));
        }
        let hint = if field.is_numeric() {
            Some("[←/→]")
        } else if matches!(field, EditorField::Avatar) {
            Some("[U]")
        } else {
            None
        };
        lines.push(create_setting_line(
            &field.label(card),
            &fit_width(&field.value(card), value_width),
            idx == state.selected_field && is_focused,
            hint,
        ));
    }

    lines.push(Line::from(""));
    lines.push(create_action_line("[Enter]", "Edit field"));
    lines.push(create_action_line("[A]/[D]", "Add / remove entry"));
    lines.push(create_action_line("[E]/[V]", "Export PNG / SVG"));

    if is_focused && state.config.ui.show_hints {
        lines.push(Line::from(Span::styled(
            "Tip: Press Tab to switch focus between View, Editor and Preview",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Keep the selected row on screen
    let selected_line = fields
        .iter()
        .take(state.selected_field + 1)
        .filter(|field| matches!(field, EditorField::Entry { part, .. } if *part == first_part(card)))
        .count()
        + state.selected_field;
    let scroll = selected_line.saturating_sub(area.height.saturating_sub(1) as usize);

    let widget = Paragraph::new(lines).scroll((scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn first_part(card: &CardState) -> EntryPart {
    match card.attributes.kind() {
        AttributeKind::Stats => EntryPart::Label,
        AttributeKind::Traits => EntryPart::Icon,
    }
}

/// Render the text prompt modal
pub fn render_prompt(frame: &mut Frame, area: Rect, state: &AppState, prompt: &Prompt) {
    let title = match prompt {
        Prompt::Field { field, .. } => state
            .card()
            .map(|card| format!(" Edit {} ", field.label(card)))
            .unwrap_or_else(|| " Edit ".to_string()),
        Prompt::AvatarPath { .. } => " Avatar image path ".to_string(),
    };
    let width = (area.width.saturating_sub(4)).min(60);
    let rect = centered_rect(width, 5, area);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)));
    let lines = vec![
        Line::from(Span::styled(
            format!("{}▌", prompt.input()),
            Style::default().fg(Color::Green),
        )),
        Line::from(Span::styled(
            "[Enter] Apply  [Esc] Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

/// Render the warning alert
pub fn render_warning(frame: &mut Frame, area: Rect, message: &str) {
    let width = (message.chars().count() as u16 + 6).clamp(24, area.width.saturating_sub(2).max(24));
    let rect = centered_rect(width, 6, area);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(Span::styled(
            " Warning ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        rect,
    );
}

/// Render the avatar crop dialog
pub fn render_crop(frame: &mut Frame, area: Rect, crop: &CropSession) {
    let rect = centered_rect(area.width.saturating_sub(4).min(50), 9, area);
    frame.render_widget(Clear, rect);

    let (width, height) = crop.dimensions();
    let crop_area = crop.area();
    let (dx, dy) = crop.offset();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(" Crop avatar ", Style::default().add_modifier(Modifier::BOLD)));
    let lines = vec![
        create_setting_line("Image", &format!("{width}x{height}"), false, None),
        create_setting_line("Zoom", &format!("{:.1}x", crop.zoom()), true, Some("[+/-]")),
        create_setting_line("Offset", &format!("{dx:+.1}, {dy:+.1}"), true, Some("[arrows]")),
        create_setting_line(
            "Area",
            &format!("{}px at {},{}", crop_area.size, crop_area.x, crop_area.y),
            false,
            None,
        ),
        Line::from(""),
        create_action_line("[Enter]", "Apply   [Esc] Cancel"),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

/// Create a setting line with label, value, and optional hint
fn create_setting_line(
    label: &str,
    value: &str,
    is_selected: bool,
    hint: Option<&str>,
) -> Line<'static> {
    let indicator = if is_selected { "▸" } else { " " };
    let indicator_style = Style::default().fg(Color::Cyan);

    let label_style = if is_selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let value_style = if is_selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
        Span::styled(format!("{} ", indicator), indicator_style),
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(value.to_string(), value_style),
    ];

    if let Some(hint_text) = hint {
        if is_selected {
            spans.push(Span::styled(
                format!(" {}", hint_text),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    Line::from(spans)
}

/// Create an action line (button-like)
fn create_action_line(key: &str, label: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(key.to_string(), Style::default().fg(Color::Green)),
        Span::styled(format!(" {}", label), Style::default().fg(Color::White)),
    ])
}

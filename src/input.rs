//! Input handling
//!
//! Maps keyboard events to state transitions with context-sensitive bindings.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::avatar::PAN_STEP;
use crate::export::{ExportFormat, ExportMode};
use crate::model::{Layout, ViewMode};
use crate::state::{AppState, FocusedWidget};

/// Handle an input event
pub fn handle_event(event: Event, state: &mut AppState) -> Result<()> {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key_event(key_event, state)
        }
        Event::Resize(width, height) => {
            state.set_terminal_size(width, height);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Handle a key event
pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Result<()> {
    if state.show_help {
        return handle_help_input(key, state);
    }

    // Modals swallow everything until closed
    if state.warning.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            state.dismiss_warning();
        }
        return Ok(());
    }
    if state.crop.is_some() {
        return handle_crop_input(key, state);
    }
    if state.prompt.is_some() {
        return handle_prompt_input(key, state);
    }

    // Global shortcuts
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.should_quit = true;
            return Ok(());
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.should_quit = true;
            return Ok(());
        }
        KeyCode::Char('?') => {
            state.show_help = true;
            return Ok(());
        }
        KeyCode::Tab => {
            state.focus = state.focus.next();
            return Ok(());
        }
        KeyCode::BackTab => {
            state.focus = state.focus.prev();
            return Ok(());
        }
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            if let Some(mode) = ViewMode::all().get(index) {
                set_mode(state, *mode);
            }
            return Ok(());
        }
        KeyCode::Char('e') | KeyCode::Char('E') => {
            state.export_current(ExportFormat::Png);
            return Ok(());
        }
        KeyCode::Char('v') | KeyCode::Char('V') => {
            state.export_current(ExportFormat::Svg);
            return Ok(());
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            if state.store().layout() == Layout::Dual {
                state.request_export(ExportMode::Comparison, ExportFormat::Png);
            } else {
                state.set_status("Comparison export needs a before/after pair", false);
            }
            return Ok(());
        }
        _ => {}
    }

    // Context-sensitive handling
    match state.focus {
        FocusedWidget::ModeSelector => handle_mode_selector_input(key, state),
        FocusedWidget::EditorPanel => handle_editor_input(key, state),
        FocusedWidget::Preview => handle_preview_input(key, state),
    }
}

fn set_mode(state: &mut AppState, mode: ViewMode) {
    if state.store().layout() == Layout::Single {
        state.set_status("View modes need a before/after pair", false);
        return;
    }
    state.set_mode(mode);
}

/// Handle input when help overlay is shown
fn handle_help_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter => {
            state.show_help = false;
        }
        _ => {}
    }
    Ok(())
}

/// Handle input for an open text prompt
fn handle_prompt_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    let Some(prompt) = state.prompt.as_mut() else {
        return Ok(());
    };
    match key.code {
        KeyCode::Esc => state.cancel_prompt(),
        KeyCode::Enter => state.submit_prompt(),
        KeyCode::Backspace => {
            prompt.input_mut().pop();
        }
        KeyCode::Char(c) => prompt.input_mut().push(c),
        _ => {}
    }
    Ok(())
}

/// Handle input for the avatar crop dialog
fn handle_crop_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    let Some(crop) = state.crop.as_mut() else {
        return Ok(());
    };
    match key.code {
        KeyCode::Char('+') | KeyCode::Char('=') => crop.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => crop.zoom_out(),
        KeyCode::Left | KeyCode::Char('h') => crop.pan(-PAN_STEP, 0.0),
        KeyCode::Right | KeyCode::Char('l') => crop.pan(PAN_STEP, 0.0),
        KeyCode::Up | KeyCode::Char('k') => crop.pan(0.0, -PAN_STEP),
        KeyCode::Down | KeyCode::Char('j') => crop.pan(0.0, PAN_STEP),
        KeyCode::Enter => state.apply_crop(),
        KeyCode::Esc => state.cancel_crop(),
        _ => {}
    }
    Ok(())
}

/// Handle input for mode selector widget
fn handle_mode_selector_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Left | KeyCode::Char('h') => {
            let mode = state.mode().prev();
            set_mode(state, mode);
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Right | KeyCode::Char('l') => {
            let mode = state.mode().next();
            set_mode(state, mode);
        }
        KeyCode::Enter => state.focus = FocusedWidget::EditorPanel,
        _ => {}
    }
    Ok(())
}

/// Handle input for the editor panel
fn handle_editor_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        // Navigation
        KeyCode::Up | KeyCode::Char('k') => state.prev_field(),
        KeyCode::Down | KeyCode::Char('j') => state.next_field(),
        KeyCode::Home => state.selected_field = 0,
        KeyCode::End => state.selected_field = state.fields().len().saturating_sub(1),

        // Numeric steppers
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') | KeyCode::Char('_') => {
            state.adjust_selected(-1)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') | KeyCode::Char('=') => {
            state.adjust_selected(1)
        }
        KeyCode::PageDown => state.adjust_selected(-10),
        KeyCode::PageUp => state.adjust_selected(10),

        // Edits
        KeyCode::Enter => state.begin_edit(),
        KeyCode::Char('a') => state.add_entry(),
        KeyCode::Char('d') | KeyCode::Delete => state.remove_selected_entry(),
        KeyCode::Char('u') => state.start_avatar_prompt(),
        KeyCode::Char('x') => state.remove_avatar(),

        // Whole cards
        KeyCode::Char('r') => state.reset_card(),
        KeyCode::Char('R') => state.reset_all(),
        KeyCode::Char('D') => state.duplicate_to_counterpart(),
        KeyCode::Char('s') | KeyCode::Char('[') | KeyCode::Char(']') => state.toggle_slot(),

        _ => {}
    }
    Ok(())
}

/// Handle input for preview widget
fn handle_preview_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    let step = state.config.ui.slider_step as i32;
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => state.move_slider(-step),
        KeyCode::Right | KeyCode::Char('l') => state.move_slider(step),
        KeyCode::Home => state.slider_position = 0,
        KeyCode::End => state.slider_position = 100,
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::platform::MemoryStorage;
    use crate::seed;
    use crate::store::EditorStore;
    use crate::worker::WorkerMessage;
    use crossbeam_channel::{unbounded, Receiver};

    fn app(layout: Layout) -> (AppState, Receiver<WorkerMessage>) {
        let (tx, rx) = unbounded();
        let store = EditorStore::new(seed::initial_state(layout));
        (
            AppState::new(Config::default(), store, Box::new(MemoryStorage::default()), tx),
            rx,
        )
    }

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), state).unwrap();
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_quit() {
        let (mut state, _rx) = app(Layout::Dual);
        press(&mut state, KeyCode::Char('q'));
        assert!(state.should_quit);
    }

    #[test]
    fn test_number_keys_switch_mode() {
        let (mut state, _rx) = app(Layout::Dual);
        press(&mut state, KeyCode::Char('3'));
        assert_eq!(state.mode(), ViewMode::CompareSide);
        press(&mut state, KeyCode::Char('1'));
        assert_eq!(state.mode(), ViewMode::Before);
    }

    #[test]
    fn test_prompt_captures_typing() {
        let (mut state, _rx) = app(Layout::Dual);
        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Enter);
        for _ in 0..3 {
            press(&mut state, KeyCode::Backspace);
        }
        // 'q' goes into the prompt instead of quitting
        type_text(&mut state, "9q");
        press(&mut state, KeyCode::Enter);
        assert!(!state.should_quit);
        // "9q" fails to parse and becomes 0
        assert_eq!(state.card().unwrap().score, 0.0);

        press(&mut state, KeyCode::Enter);
        state.prompt.as_mut().unwrap().input_mut().clear();
        type_text(&mut state, "7.5");
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.card().unwrap().score, 7.5);
    }

    #[test]
    fn test_warning_modal_blocks_until_dismissed() {
        let (mut state, _rx) = app(Layout::Single);
        press(&mut state, KeyCode::Char('a'));
        assert!(state.warning.is_some());
        press(&mut state, KeyCode::Char('q'));
        assert!(!state.should_quit);
        press(&mut state, KeyCode::Esc);
        assert!(state.warning.is_none());
    }

    #[test]
    fn test_export_keys() {
        let (mut state, rx) = app(Layout::Dual);
        press(&mut state, KeyCode::Char('v'));
        press(&mut state, KeyCode::Char('c'));
        let names: Vec<String> = rx
            .try_iter()
            .map(|msg| match msg {
                WorkerMessage::Export { job, .. } => job.filename(),
                WorkerMessage::Shutdown => String::new(),
            })
            .collect();
        assert_eq!(names, ["facecard-after.svg", "facecard-comparison.png"]);
    }

    #[test]
    fn test_export_keys_ignore_case() {
        let (mut state, rx) = app(Layout::Dual);
        press(&mut state, KeyCode::Char('E'));
        press(&mut state, KeyCode::Char('V'));
        press(&mut state, KeyCode::Char('C'));
        let names: Vec<String> = rx
            .try_iter()
            .map(|msg| match msg {
                WorkerMessage::Export { job, .. } => job.filename(),
                WorkerMessage::Shutdown => String::new(),
            })
            .collect();
        assert_eq!(
            names,
            ["facecard-after.png", "facecard-after.svg", "facecard-comparison.png"]
        );
    }

    #[test]
    fn test_preview_slider() {
        let (mut state, _rx) = app(Layout::Dual);
        state.focus = FocusedWidget::Preview;
        press(&mut state, KeyCode::Right);
        assert_eq!(state.slider_position, 55);
        press(&mut state, KeyCode::Home);
        assert_eq!(state.slider_position, 0);
    }
}

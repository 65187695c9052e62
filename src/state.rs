//! Application state management
//!
//! The controller between key input and the editor store. It is the only
//! place that mutates the store, and it persists after every mutation it
//! performs. Exports are handed to the worker as snapshots of the mounted
//! preview nodes.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use crossbeam_channel::Sender;
use tracing::{debug, info, warn};

use crate::avatar::{load_avatar_file, CropSession};
use crate::config::Config;
use crate::editor::{self, EditorField};
use crate::export::{ExportFormat, ExportJob, ExportMode, EXPORT_FAILED_MESSAGE};
use crate::model::{CardPatch, CardSlot, CardState, Layout, ViewMode};
use crate::platform::StateStorage;
use crate::preview::{self, MountedCards};
use crate::store::{EditorStore, SubscriptionId};
use crate::worker::{WorkerMessage, WorkerResponse};

/// Which widget is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedWidget {
    ModeSelector,
    #[default]
    EditorPanel,
    Preview,
}

impl FocusedWidget {
    pub fn next(&self) -> Self {
        match self {
            FocusedWidget::ModeSelector => FocusedWidget::EditorPanel,
            FocusedWidget::EditorPanel => FocusedWidget::Preview,
            FocusedWidget::Preview => FocusedWidget::ModeSelector,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FocusedWidget::ModeSelector => FocusedWidget::Preview,
            FocusedWidget::EditorPanel => FocusedWidget::ModeSelector,
            FocusedWidget::Preview => FocusedWidget::EditorPanel,
        }
    }
}

/// A modal text prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    /// Editing the text of one field
    Field { field: EditorField, input: String },
    /// Path of an image to use as the avatar
    AvatarPath { input: String },
}

impl Prompt {
    pub fn input(&self) -> &str {
        match self {
            Prompt::Field { input, .. } | Prompt::AvatarPath { input } => input,
        }
    }

    pub fn input_mut(&mut self) -> &mut String {
        match self {
            Prompt::Field { input, .. } | Prompt::AvatarPath { input } => input,
        }
    }
}

/// An export handed to the worker and not yet answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExport {
    pub id: u64,
    pub filename: String,
}

/// Main application state
pub struct AppState {
    // Navigation
    pub focus: FocusedWidget,
    pub show_help: bool,
    pub should_quit: bool,

    // Editor
    store: EditorStore,
    storage: Box<dyn StateStorage>,
    subscription: SubscriptionId,
    pub slot: CardSlot,
    pub selected_field: usize,
    pub prompt: Option<Prompt>,
    pub crop: Option<CropSession>,
    /// Alert shown as a modal until dismissed
    pub warning: Option<String>,

    // Preview
    mounted: MountedCards,
    preview_dirty: Rc<Cell<bool>>,
    /// Percentage of the before card revealed in slider mode
    pub slider_position: u16,

    // Status
    pub status_message: String,
    pub status_is_error: bool,
    pub terminal_size: (u16, u16),

    // Configuration
    pub config: Config,

    // Worker communication
    worker_tx: Sender<WorkerMessage>,
    next_export_id: u64,
    pub pending_exports: Vec<PendingExport>,
    pub last_export_ms: Option<u64>,
}

impl AppState {
    pub fn new(
        config: Config,
        mut store: EditorStore,
        storage: Box<dyn StateStorage>,
        worker_tx: Sender<WorkerMessage>,
    ) -> Self {
        let preview_dirty = Rc::new(Cell::new(false));
        let dirty = Rc::clone(&preview_dirty);
        let subscription = store.subscribe(move |_| dirty.set(true));

        let mounted = preview::mount(&store.state());
        let slot = default_slot(&store);

        Self {
            focus: FocusedWidget::default(),
            show_help: false,
            should_quit: false,

            store,
            storage,
            subscription,
            slot,
            selected_field: 0,
            prompt: None,
            crop: None,
            warning: None,

            mounted,
            preview_dirty,
            slider_position: 50,

            status_message: "Ready - Press [?] for help".to_string(),
            status_is_error: false,
            terminal_size: (80, 24),

            config,

            worker_tx,
            next_export_id: 0,
            pending_exports: Vec::new(),
            last_export_ms: None,
        }
    }

    pub fn store(&self) -> &EditorStore {
        &self.store
    }

    pub fn storage(&self) -> &dyn StateStorage {
        self.storage.as_ref()
    }

    /// The card being edited
    pub fn card(&self) -> Option<&CardState> {
        self.store.card(self.slot)
    }

    pub fn mode(&self) -> ViewMode {
        self.store.mode()
    }

    /// Re-render the mounted nodes if the store changed since the last call.
    pub fn refresh_preview(&mut self) -> bool {
        let dirty = self.preview_dirty.replace(false);
        if dirty {
            self.mounted = preview::mount(&self.store.state());
        }
        dirty
    }

    /// Nodes mounted for the current view mode as of the last refresh
    pub fn mounted(&self) -> &MountedCards {
        &self.mounted
    }

    /// Set status message
    pub fn set_status(&mut self, message: &str, is_error: bool) {
        self.status_message = message.to_string();
        self.status_is_error = is_error;
    }

    /// Update terminal size on resize
    pub fn set_terminal_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
    }

    /// False when the save failed; the error status is then already set.
    fn persist(&mut self) -> bool {
        match self.store.persist(self.storage.as_ref()) {
            Ok(()) => true,
            Err(e) => {
                warn!("failed to persist editor state: {e:#}");
                self.set_status("Could not save editor state", true);
                false
            }
        }
    }

    /// Apply `patch` to the edited card and persist. True when both worked.
    pub fn apply(&mut self, patch: CardPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        let saved = match self.store.update(self.slot, patch) {
            Ok(()) => self.persist(),
            Err(e) => {
                self.set_status(&e.to_string(), true);
                false
            }
        };
        self.clamp_selection();
        saved
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.store.mode() == mode {
            return;
        }
        self.store.set_mode(mode);
        if self.store.layout() == Layout::Dual {
            match mode {
                ViewMode::Before => self.select_slot(CardSlot::Before),
                ViewMode::After => self.select_slot(CardSlot::After),
                _ => {}
            }
        }
        if self.persist() {
            self.set_status(&format!("Switched to {} view", mode.name()), false);
        }
    }

    pub fn select_slot(&mut self, slot: CardSlot) {
        if self.store.card(slot).is_some() && self.slot != slot {
            self.slot = slot;
            self.prompt = None;
            self.clamp_selection();
        }
    }

    /// Toggle between the before and after card
    pub fn toggle_slot(&mut self) {
        match self.slot.counterpart() {
            Some(other) => {
                self.select_slot(other);
                self.set_status(&format!("Editing the {} card", self.slot), false);
            }
            None => self.set_status("Only one card in this layout", false),
        }
    }

    pub fn fields(&self) -> Vec<EditorField> {
        self.card().map(EditorField::fields).unwrap_or_default()
    }

    pub fn current_field(&self) -> Option<EditorField> {
        self.fields().get(self.selected_field).copied()
    }

    pub fn next_field(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.selected_field = (self.selected_field + 1) % count;
        }
    }

    pub fn prev_field(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.selected_field = (self.selected_field + count - 1) % count;
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.fields().len();
        self.selected_field = self.selected_field.min(count.saturating_sub(1));
    }

    /// Open the prompt for the selected field
    pub fn begin_edit(&mut self) {
        let Some(field) = self.current_field() else {
            return;
        };
        if !field.is_text() {
            self.start_avatar_prompt();
            return;
        }
        let input = self.card().map(|card| field.value(card)).unwrap_or_default();
        self.prompt = Some(Prompt::Field { field, input });
        self.set_status("Editing: type and press Enter (Esc to cancel)", false);
    }

    pub fn cancel_prompt(&mut self) {
        if self.prompt.take().is_some() {
            self.set_status("Edit cancelled", false);
        }
    }

    pub fn submit_prompt(&mut self) {
        match self.prompt.take() {
            Some(Prompt::Field { field, input }) => {
                let patch = self
                    .card()
                    .and_then(|card| editor::set_text(card, field, &input));
                if let Some(patch) = patch {
                    if self.apply(patch) {
                        self.set_status("Updated", false);
                    }
                }
            }
            Some(Prompt::AvatarPath { input }) => self.open_avatar(PathBuf::from(input.trim())),
            None => {}
        }
    }

    /// Step the selected numeric field
    pub fn adjust_selected(&mut self, steps: i32) {
        let Some(field) = self.current_field() else {
            return;
        };
        if let Some(patch) = self.card().and_then(|card| editor::adjust(card, field, steps)) {
            self.apply(patch);
        }
    }

    pub fn add_entry(&mut self) {
        let Some(result) = self.card().map(editor::add_entry) else {
            return;
        };
        match result {
            Ok(patch) => {
                let saved = self.apply(patch);
                if let Some(last) = self.fields().len().checked_sub(1) {
                    self.selected_field = last;
                }
                if saved {
                    self.set_status("Entry added", false);
                }
            }
            Err(warning) => self.warn(warning.to_string()),
        }
    }

    /// Remove the entry the selection is on
    pub fn remove_selected_entry(&mut self) {
        let Some(EditorField::Entry { index, .. }) = self.current_field() else {
            self.set_status("Select a stat or trait to remove", false);
            return;
        };
        let Some(card) = self.card() else {
            return;
        };
        let Some(id) = card.attributes.entry(index).map(|e| e.id.to_string()) else {
            return;
        };
        match editor::remove_entry(card, &id) {
            Ok(patch) => {
                if self.apply(patch) {
                    self.set_status("Entry removed", false);
                }
            }
            Err(warning) => self.warn(warning.to_string()),
        }
    }

    fn warn(&mut self, message: String) {
        debug!(%message, "edit refused");
        self.warning = Some(message);
    }

    pub fn dismiss_warning(&mut self) {
        self.warning = None;
    }

    pub fn reset_card(&mut self) {
        match self.store.reset(self.slot) {
            Ok(()) => {
                self.clamp_selection();
                if self.persist() {
                    self.set_status(&format!("{} card reset", self.slot), false);
                }
            }
            Err(e) => self.set_status(&e.to_string(), true),
        }
    }

    pub fn reset_all(&mut self) {
        self.store.reset_all();
        self.clamp_selection();
        if self.persist() {
            self.set_status("All cards reset", false);
        }
    }

    /// Copy the edited card onto the other side of the pair
    pub fn duplicate_to_counterpart(&mut self) {
        let Some(target) = self.slot.counterpart() else {
            self.set_status("Nothing to copy onto in this layout", false);
            return;
        };
        match self.store.duplicate(self.slot, target) {
            Ok(()) => {
                if self.persist() {
                    self.set_status(&format!("Copied {} onto {}", self.slot, target), false);
                }
            }
            Err(e) => self.set_status(&e.to_string(), true),
        }
    }

    pub fn start_avatar_prompt(&mut self) {
        self.prompt = Some(Prompt::AvatarPath {
            input: String::new(),
        });
        self.set_status("Enter image path and press Enter", false);
    }

    /// Load `path` and open the crop dialog on it
    pub fn open_avatar(&mut self, path: PathBuf) {
        if path.as_os_str().is_empty() {
            self.set_status("Path is empty", true);
            return;
        }
        let session = load_avatar_file(&path).and_then(|url| CropSession::open(&url));
        match session {
            Ok(session) => {
                self.crop = Some(session);
                self.set_status("Crop: +/- zoom, arrows pan, Enter apply, Esc cancel", false);
            }
            Err(e) => {
                warn!(path = %path.display(), "avatar load failed: {e}");
                self.set_status(&format!("Failed to load: {e}"), true);
            }
        }
    }

    pub fn apply_crop(&mut self) {
        let Some(session) = self.crop.take() else {
            return;
        };
        match session.finish() {
            Ok(url) => {
                if self.apply(CardPatch::avatar_url(Some(url))) {
                    self.set_status("Avatar updated", false);
                }
            }
            Err(e) => self.set_status(&format!("Crop failed: {e}"), true),
        }
    }

    pub fn cancel_crop(&mut self) {
        if self.crop.take().is_some() {
            self.set_status("Crop cancelled", false);
        }
    }

    pub fn remove_avatar(&mut self) {
        if self.card().is_some_and(|card| card.avatar_url.is_some())
            && self.apply(CardPatch::avatar_url(None))
        {
            self.set_status("Avatar removed", false);
        }
    }

    pub fn move_slider(&mut self, delta: i32) {
        let next = (self.slider_position as i32 + delta).clamp(0, 100);
        self.slider_position = next as u16;
    }

    /// The export the current view mode implies
    pub fn export_mode(&self) -> ExportMode {
        if self.store.layout() == Layout::Single {
            return ExportMode::Single;
        }
        match self.store.mode() {
            ViewMode::Before => ExportMode::Before,
            ViewMode::After => ExportMode::After,
            ViewMode::CompareSide | ViewMode::CompareSlider => ExportMode::Comparison,
        }
    }

    /// Export what the preview currently shows
    pub fn export_current(&mut self, format: ExportFormat) {
        let mode = self.export_mode();
        self.request_export(mode, format);
    }

    /// Snapshot the mounted nodes and hand the export to the worker
    pub fn request_export(&mut self, mode: ExportMode, format: ExportFormat) {
        self.refresh_preview();
        let job = ExportJob::from_mounted(&self.mounted, mode, format);
        let filename = job.filename();
        let id = self.next_export_id;
        self.next_export_id += 1;

        if self.worker_tx.send(WorkerMessage::Export { id, job }).is_err() {
            warn!("export worker is gone");
            self.warning = Some(EXPORT_FAILED_MESSAGE.to_string());
            return;
        }
        debug!(id, %filename, "export requested");
        self.pending_exports.push(PendingExport { id, filename: filename.clone() });
        if mode == ExportMode::Comparison && format == ExportFormat::Svg {
            self.set_status(
                &format!("Comparisons export as PNG only; exporting {filename}..."),
                false,
            );
        } else {
            self.set_status(&format!("Exporting {filename}..."), false);
        }
    }

    pub fn is_exporting(&self) -> bool {
        !self.pending_exports.is_empty()
    }

    /// Handle response from worker thread
    pub fn handle_worker_response(&mut self, response: WorkerResponse) {
        let id = response.id();
        self.pending_exports.retain(|pending| pending.id != id);

        match response {
            WorkerResponse::ExportComplete {
                outcome, elapsed_ms, ..
            } => {
                info!(file = %outcome.filename, elapsed_ms, "export delivered");
                self.last_export_ms = Some(elapsed_ms);
                self.set_status(
                    &format!("Saved {} in {}ms", outcome.path.display(), elapsed_ms),
                    false,
                );
            }
            WorkerResponse::ExportFailed { error, .. } => {
                debug!(id, %error, "export failed");
                self.warning = Some(EXPORT_FAILED_MESSAGE.to_string());
                self.set_status(EXPORT_FAILED_MESSAGE, true);
            }
        }
    }

    /// Drop the store subscription; used when the app shuts down.
    pub fn detach(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}

fn default_slot(store: &EditorStore) -> CardSlot {
    match (store.layout(), store.mode()) {
        (Layout::Single, _) => CardSlot::Card,
        (Layout::Dual, ViewMode::Before) => CardSlot::Before,
        (Layout::Dual, _) => CardSlot::After,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EntryPart;
    use crate::export::ExportOutcome;
    use crate::platform::MemoryStorage;
    use crate::seed;
    use crate::store::STORAGE_KEY;
    use crossbeam_channel::{unbounded, Receiver};

    fn app(layout: Layout) -> (AppState, Receiver<WorkerMessage>) {
        let (tx, rx) = unbounded();
        let store = EditorStore::new(seed::initial_state(layout));
        let state = AppState::new(Config::default(), store, Box::new(MemoryStorage::default()), tx);
        (state, rx)
    }

    fn select(state: &mut AppState, field: EditorField) {
        state.selected_field = state.fields().iter().position(|f| *f == field).unwrap();
    }

    #[test]
    fn test_edit_persists() {
        let (mut state, _rx) = app(Layout::Dual);
        select(&mut state, EditorField::Headline);
        state.begin_edit();
        assert_eq!(state.prompt.as_ref().unwrap().input(), "You're a");

        *state.prompt.as_mut().unwrap().input_mut() = "You are".to_string();
        state.submit_prompt();

        assert_eq!(state.card().unwrap().headline_prefix, "You are");
        let stored = state.storage().read(STORAGE_KEY).unwrap().unwrap();
        assert!(stored.contains("You are"));
        assert!(stored.contains("\"version\":0"));
    }

    #[test]
    fn test_adjust_rating_is_clamped() {
        let (mut state, _rx) = app(Layout::Dual);
        select(
            &mut state,
            EditorField::Entry {
                index: 2,
                part: EntryPart::Value,
            },
        );
        state.adjust_selected(100);
        assert_eq!(state.card().unwrap().attributes.entry(2).unwrap().value, 10.0);
    }

    #[test]
    fn test_remove_at_minimum_warns() {
        let (mut state, _rx) = app(Layout::Single);
        select(
            &mut state,
            EditorField::Entry {
                index: 0,
                part: EntryPart::Label,
            },
        );
        state.remove_selected_entry();
        assert_eq!(state.warning.as_deref(), Some("You must have exactly 6 stats"));
        assert_eq!(state.card().unwrap().attributes.len(), 6);

        state.dismiss_warning();
        state.add_entry();
        assert_eq!(state.warning.as_deref(), Some("Maximum 6 stats allowed"));
    }

    #[test]
    fn test_set_mode_follows_slot() {
        let (mut state, _rx) = app(Layout::Dual);
        assert_eq!(state.slot, CardSlot::After);
        state.set_mode(ViewMode::Before);
        assert_eq!(state.slot, CardSlot::Before);
        assert_eq!(state.export_mode(), ExportMode::Before);
        state.set_mode(ViewMode::CompareSlider);
        assert_eq!(state.export_mode(), ExportMode::Comparison);
    }

    #[test]
    fn test_preview_remounts_after_mutation() {
        let (mut state, _rx) = app(Layout::Dual);
        assert!(!state.refresh_preview());
        assert!(state.mounted().before.is_none());
        state.set_mode(ViewMode::CompareSide);
        assert!(state.refresh_preview());
        let mounted = state.mounted();
        assert!(mounted.before.is_some() && mounted.after.is_some());
    }

    #[test]
    fn test_export_request_snapshots_mounted_node() {
        let (mut state, rx) = app(Layout::Dual);
        state.set_mode(ViewMode::Before);
        state.export_current(ExportFormat::Png);

        match rx.try_recv().unwrap() {
            WorkerMessage::Export { id, job } => {
                assert_eq!(id, 0);
                assert_eq!(job.filename(), "facecard-before.png");
                assert!(matches!(job, ExportJob::Single { node: Some(_), .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(state.is_exporting());
    }

    #[test]
    fn test_failed_export_alerts() {
        let (mut state, _rx) = app(Layout::Dual);
        state.export_current(ExportFormat::Svg);
        state.handle_worker_response(WorkerResponse::ExportFailed {
            id: 0,
            error: "boom".into(),
        });
        assert!(!state.is_exporting());
        assert_eq!(state.warning.as_deref(), Some(EXPORT_FAILED_MESSAGE));
    }

    #[test]
    fn test_completed_export_reports_path() {
        let (mut state, _rx) = app(Layout::Single);
        state.export_current(ExportFormat::Png);
        state.handle_worker_response(WorkerResponse::ExportComplete {
            id: 0,
            outcome: ExportOutcome {
                filename: "facecard.png".into(),
                path: PathBuf::from("out/facecard.png"),
                bytes: 10,
            },
            elapsed_ms: 12,
        });
        assert!(state.status_message.contains("out/facecard.png"));
        assert_eq!(state.last_export_ms, Some(12));
    }

    /// Storage whose writes always fail.
    struct ReadOnlyStorage;

    impl StateStorage for ReadOnlyStorage {
        fn read(&self, _: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        fn write(&self, _: &str, _: &str) -> anyhow::Result<()> {
            anyhow::bail!("read-only file system")
        }
    }

    #[test]
    fn test_save_failure_stays_visible() {
        let (tx, _rx) = unbounded();
        let store = EditorStore::new(seed::initial_state(Layout::Dual));
        let mut state = AppState::new(Config::default(), store, Box::new(ReadOnlyStorage), tx);

        select(&mut state, EditorField::Headline);
        state.begin_edit();
        *state.prompt.as_mut().unwrap().input_mut() = "You are".to_string();
        state.submit_prompt();
        assert_eq!(state.card().unwrap().headline_prefix, "You are");
        assert_eq!(state.status_message, "Could not save editor state");
        assert!(state.status_is_error);

        state.set_status("", false);
        state.reset_all();
        assert_eq!(state.status_message, "Could not save editor state");

        state.set_status("", false);
        state.set_mode(ViewMode::CompareSide);
        assert_eq!(state.status_message, "Could not save editor state");
    }

    #[test]
    fn test_svg_comparison_request_says_png() {
        let (mut state, rx) = app(Layout::Dual);
        state.set_mode(ViewMode::CompareSlider);
        state.export_current(ExportFormat::Svg);
        assert!(matches!(
            rx.try_recv().unwrap(),
            WorkerMessage::Export {
                job: ExportJob::TwoUp { .. },
                ..
            }
        ));
        assert!(state.status_message.starts_with("Comparisons export as PNG only"));
        assert!(state.status_message.contains("facecard-comparison.png"));
    }

    #[test]
    fn test_duplicate_is_a_deep_copy() {
        let (mut state, _rx) = app(Layout::Dual);
        state.duplicate_to_counterpart();
        state.apply(CardPatch::score(3.3));
        select(
            &mut state,
            EditorField::Entry {
                index: 0,
                part: EntryPart::Value,
            },
        );
        state.adjust_selected(-10);

        let before = state.store().card(CardSlot::Before).unwrap().clone();
        let after = state.store().card(CardSlot::After).unwrap().clone();
        assert_eq!(after.score, 3.3);
        assert_eq!(before.score, seed::facecard_after().score);
        assert_eq!(before.attributes, seed::facecard_after().attributes);
        assert_ne!(before.attributes, after.attributes);

        state.toggle_slot();
        state.apply(CardPatch::brand_text("other"));
        assert_eq!(state.store().card(CardSlot::After).unwrap().brand_text, after.brand_text);
    }

    #[test]
    fn test_duplicate_and_reset() {
        let (mut state, _rx) = app(Layout::Dual);
        state.duplicate_to_counterpart();
        assert_eq!(
            state.store().card(CardSlot::Before),
            state.store().card(CardSlot::After)
        );
        state.toggle_slot();
        assert_eq!(state.slot, CardSlot::Before);
        state.reset_card();
        assert_eq!(state.card(), Some(&seed::facecard_before()));
    }

    #[test]
    fn test_slider_is_bounded() {
        let (mut state, _rx) = app(Layout::Dual);
        state.move_slider(80);
        assert_eq!(state.slider_position, 100);
        state.move_slider(-500);
        assert_eq!(state.slider_position, 0);
    }
}

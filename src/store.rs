//! Editor store
//!
//! Single source of truth for the card(s) and the active view mode. Every
//! mutation builds a fresh [`StoreState`] behind a new `Arc`, so observers can
//! detect change with `Arc::ptr_eq`. Persistence is an explicit call made by
//! the owner of the store, not a side effect of mutating it.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::{CardPatch, CardSlot, CardState, Layout, ViewMode};
use crate::platform::StateStorage;

/// Key of the persisted snapshot. Changing the shape of [`StoreState`] means
/// changing this key.
pub const STORAGE_KEY: &str = "facecard-editor-storage";

const SNAPSHOT_VERSION: u32 = 0;

/// The card(s) held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cards {
    Dual { before: CardState, after: CardState },
    Single { card: CardState },
}

impl Cards {
    pub fn layout(&self) -> Layout {
        match self {
            Cards::Dual { .. } => Layout::Dual,
            Cards::Single { .. } => Layout::Single,
        }
    }

    /// Slots that exist in this layout, in editor tab order.
    pub fn slots(&self) -> &'static [CardSlot] {
        match self {
            Cards::Dual { .. } => &[CardSlot::Before, CardSlot::After],
            Cards::Single { .. } => &[CardSlot::Card],
        }
    }

    pub fn get(&self, slot: CardSlot) -> Option<&CardState> {
        match (self, slot) {
            (Cards::Dual { before, .. }, CardSlot::Before) => Some(before),
            (Cards::Dual { after, .. }, CardSlot::After) => Some(after),
            (Cards::Single { card }, CardSlot::Card) => Some(card),
            _ => None,
        }
    }

    fn get_mut(&mut self, slot: CardSlot) -> Option<&mut CardState> {
        match (self, slot) {
            (Cards::Dual { before, .. }, CardSlot::Before) => Some(before),
            (Cards::Dual { after, .. }, CardSlot::After) => Some(after),
            (Cards::Single { card }, CardSlot::Card) => Some(card),
            _ => None,
        }
    }

    fn is_well_formed(&self) -> bool {
        self.slots()
            .iter()
            .filter_map(|slot| self.get(*slot))
            .all(|card| card.attributes.is_well_formed())
    }

    fn clamp_values(&mut self) {
        match self {
            Cards::Dual { before, after } => {
                before.clamp_values();
                after.clamp_values();
            }
            Cards::Single { card } => card.clamp_values(),
        }
    }
}

/// Everything the store owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub mode: ViewMode,
    pub cards: Cards,
}

impl StoreState {
    pub fn card(&self, slot: CardSlot) -> Option<&CardState> {
        self.cards.get(slot)
    }

    pub fn layout(&self) -> Layout {
        self.cards.layout()
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    state: &'a StoreState,
    version: u32,
}

#[derive(Deserialize)]
struct Snapshot {
    state: StoreState,
    version: u32,
}

/// Handle returned by [`EditorStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Arc<StoreState>)>;

/// Owner of the editor state.
pub struct EditorStore {
    state: Arc<StoreState>,
    seed: Arc<StoreState>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl EditorStore {
    /// Fresh store holding a copy of `seed`.
    pub fn new(seed: StoreState) -> Self {
        let seed = Arc::new(seed);
        Self {
            state: Arc::clone(&seed),
            seed,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Restore the persisted snapshot, falling back to `seed` when nothing
    /// usable is stored.
    pub fn rehydrate(storage: &dyn StateStorage, seed: StoreState) -> Self {
        let mut store = Self::new(seed);

        let raw = match storage.read(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no persisted editor state, starting from seed");
                return store;
            }
            Err(e) => {
                warn!("failed to read persisted editor state: {e:#}");
                return store;
            }
        };

        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) if snapshot.version != SNAPSHOT_VERSION => {
                warn!(
                    version = snapshot.version,
                    "persisted editor state has an unknown version, using seed"
                );
            }
            Ok(snapshot) if snapshot.state.layout() != store.seed.layout() => {
                warn!(
                    stored = %snapshot.state.layout(),
                    expected = %store.seed.layout(),
                    "persisted editor state has a different layout, using seed"
                );
            }
            Ok(snapshot) if !snapshot.state.cards.is_well_formed() => {
                warn!("persisted editor state has malformed attributes, using seed");
            }
            Ok(mut snapshot) => {
                snapshot.state.cards.clamp_values();
                store.state = Arc::new(snapshot.state);
                debug!("rehydrated editor state");
            }
            Err(e) => {
                warn!("persisted editor state failed to parse, using seed: {e}");
            }
        }

        store
    }

    /// Current state. Cheap to clone; compare with `Arc::ptr_eq`.
    pub fn state(&self) -> Arc<StoreState> {
        Arc::clone(&self.state)
    }

    pub fn mode(&self) -> ViewMode {
        self.state.mode
    }

    pub fn layout(&self) -> Layout {
        self.state.layout()
    }

    pub fn card(&self, slot: CardSlot) -> Option<&CardState> {
        self.state.card(slot)
    }

    /// Shallow-merge `patch` into the card at `slot`.
    pub fn update(&mut self, slot: CardSlot, patch: CardPatch) -> Result<(), StoreError> {
        let mut next = (*self.state).clone();
        let card = next
            .cards
            .get_mut(slot)
            .ok_or_else(|| self.unavailable(slot))?;
        *card = card.merged(patch);

        debug!(%slot, "card updated");
        self.commit(next);
        Ok(())
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.state.mode == mode {
            return;
        }
        let mut next = (*self.state).clone();
        next.mode = mode;

        debug!(mode = mode.name(), "view mode changed");
        self.commit(next);
    }

    /// Restore the seed value of one slot, leaving any other slot alone.
    pub fn reset(&mut self, slot: CardSlot) -> Result<(), StoreError> {
        let seed_card = self
            .seed
            .card(slot)
            .cloned()
            .ok_or_else(|| self.unavailable(slot))?;

        let mut next = (*self.state).clone();
        let card = next
            .cards
            .get_mut(slot)
            .ok_or_else(|| self.unavailable(slot))?;
        *card = seed_card;

        debug!(%slot, "card reset to seed");
        self.commit(next);
        Ok(())
    }

    /// Restore every slot to its seed value. The view mode is kept.
    pub fn reset_all(&mut self) {
        let next = StoreState {
            mode: self.state.mode,
            cards: self.seed.cards.clone(),
        };

        debug!("all cards reset to seed");
        self.commit(next);
    }

    /// Copy the full card at `from` onto `to`.
    pub fn duplicate(&mut self, from: CardSlot, to: CardSlot) -> Result<(), StoreError> {
        if from == to {
            return Err(StoreError::SameSlot(from));
        }
        let source = self
            .state
            .card(from)
            .cloned()
            .ok_or_else(|| self.unavailable(from))?;

        let mut next = (*self.state).clone();
        let target = next
            .cards
            .get_mut(to)
            .ok_or_else(|| self.unavailable(to))?;
        *target = source;

        debug!(%from, %to, "card duplicated");
        self.commit(next);
        Ok(())
    }

    /// Register a callback invoked after every mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(&Arc<StoreState>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Write the current state to `storage` under [`STORAGE_KEY`].
    pub fn persist(&self, storage: &dyn StateStorage) -> Result<()> {
        let snapshot = SnapshotRef {
            state: &self.state,
            version: SNAPSHOT_VERSION,
        };
        let json = serde_json::to_string(&snapshot).context("Failed to serialize editor state")?;
        storage
            .write(STORAGE_KEY, &json)
            .context("Failed to persist editor state")?;
        Ok(())
    }

    fn commit(&mut self, next: StoreState) {
        self.state = Arc::new(next);
        let state = Arc::clone(&self.state);
        for (_, observer) in self.observers.iter_mut() {
            observer(&state);
        }
    }

    fn unavailable(&self, slot: CardSlot) -> StoreError {
        StoreError::SlotUnavailable {
            slot,
            layout: self.layout(),
        }
    }
}

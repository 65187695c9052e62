//! Card data model
//!
//! A card is a handful of display strings, an optional avatar and an ordered
//! collection of rated attributes. The collection is either six stats or a
//! list of traits, never both.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::clamp;

/// Upper bound of a stat value.
pub const STAT_MAX: f32 = 100.0;
/// Upper bound of a trait rating.
pub const TRAIT_MAX: f32 = 10.0;
/// Upper bound of the headline score.
pub const SCORE_MAX: f32 = 10.0;

/// Number of stats a stat card always carries (3 per column).
pub const STAT_COUNT: usize = 6;
/// Largest trait list the card layout accepts.
pub const MAX_TRAITS: usize = 8;

/// A 0-100 stat shown in the two-column grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub id: String,
    pub label: String,
    pub value: f32,
}

/// A 0-10 trait row with an emoji icon and an optional secondary label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    pub id: String,
    pub icon: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sublabel: Option<String>,
    pub rating: f32,
}

/// Which kind of rated collection a card carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Stats,
    Traits,
}

impl AttributeKind {
    pub fn max_rating(self) -> f32 {
        match self {
            AttributeKind::Stats => STAT_MAX,
            AttributeKind::Traits => TRAIT_MAX,
        }
    }

    pub fn min_len(self) -> usize {
        match self {
            AttributeKind::Stats => STAT_COUNT,
            AttributeKind::Traits => 1,
        }
    }

    pub fn max_len(self) -> usize {
        match self {
            AttributeKind::Stats => STAT_COUNT,
            AttributeKind::Traits => MAX_TRAITS,
        }
    }

    /// Step used by the +/- keys.
    pub fn step(self) -> f32 {
        match self {
            AttributeKind::Stats => 1.0,
            AttributeKind::Traits => 0.1,
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            AttributeKind::Stats => "stats",
            AttributeKind::Traits => "traits",
        }
    }

    pub fn section_title(self) -> &'static str {
        match self {
            AttributeKind::Stats => "Your Stats",
            AttributeKind::Traits => "Your Traits",
        }
    }

    /// Stat values are whole numbers, trait ratings keep one decimal.
    pub fn normalize(self, value: f32) -> f32 {
        let value = clamp(value, 0.0, self.max_rating());
        match self {
            AttributeKind::Stats => value.round(),
            AttributeKind::Traits => (value * 10.0).round() / 10.0,
        }
    }
}

/// Uniform read-only view over a stat or a trait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryView<'a> {
    pub id: &'a str,
    pub icon: Option<&'a str>,
    pub label: &'a str,
    pub sublabel: Option<&'a str>,
    pub value: f32,
    pub max: f32,
}

/// The rated collection of a card, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attributes {
    Stats(Vec<Stat>),
    Traits(Vec<Trait>),
}

impl Attributes {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attributes::Stats(_) => AttributeKind::Stats,
            Attributes::Traits(_) => AttributeKind::Traits,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Attributes::Stats(stats) => stats.len(),
            Attributes::Traits(traits) => traits.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry count within the bounds of the kind and no repeated id.
    pub fn is_well_formed(&self) -> bool {
        let kind = self.kind();
        let entries = self.entries();
        if !(kind.min_len()..=kind.max_len()).contains(&entries.len()) {
            return false;
        }
        let mut seen = HashSet::new();
        entries.iter().all(|entry| seen.insert(entry.id))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries().iter().any(|entry| entry.id == id)
    }

    pub fn entry(&self, index: usize) -> Option<EntryView<'_>> {
        self.entries().into_iter().nth(index)
    }

    pub fn entries(&self) -> Vec<EntryView<'_>> {
        match self {
            Attributes::Stats(stats) => stats
                .iter()
                .map(|stat| EntryView {
                    id: &stat.id,
                    icon: None,
                    label: &stat.label,
                    sublabel: None,
                    value: stat.value,
                    max: STAT_MAX,
                })
                .collect(),
            Attributes::Traits(traits) => traits
                .iter()
                .map(|t| EntryView {
                    id: &t.id,
                    icon: Some(t.icon.as_str()),
                    label: &t.label,
                    sublabel: t.sublabel.as_deref(),
                    value: t.rating,
                    max: TRAIT_MAX,
                })
                .collect(),
        }
    }

    /// Clamp every rating into its declared range.
    pub fn clamp_ratings(&mut self) {
        match self {
            Attributes::Stats(stats) => {
                for stat in stats {
                    stat.value = clamp(stat.value, 0.0, STAT_MAX);
                }
            }
            Attributes::Traits(traits) => {
                for t in traits {
                    t.rating = clamp(t.rating, 0.0, TRAIT_MAX);
                }
            }
        }
    }
}

/// Everything a single card displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    pub headline_prefix: String,
    pub score: f32,
    pub percentile_text: String,
    /// Embedded `data:` URL or a local path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub brand_text: String,
    pub hint_text: String,
    pub cta_label: String,
    pub attributes: Attributes,
}

impl CardState {
    /// Shallow merge: fields set in `patch` replace ours, the rest stay.
    pub fn merged(&self, patch: CardPatch) -> CardState {
        let mut next = self.clone();
        if let Some(v) = patch.headline_prefix {
            next.headline_prefix = v;
        }
        if let Some(v) = patch.score {
            next.score = v;
        }
        if let Some(v) = patch.percentile_text {
            next.percentile_text = v;
        }
        if let Some(v) = patch.avatar_url {
            next.avatar_url = v;
        }
        if let Some(v) = patch.brand_text {
            next.brand_text = v;
        }
        if let Some(v) = patch.hint_text {
            next.hint_text = v;
        }
        if let Some(v) = patch.cta_label {
            next.cta_label = v;
        }
        if let Some(v) = patch.attributes {
            next.attributes = v;
        }
        next.clamp_values();
        next
    }

    pub fn clamp_values(&mut self) {
        self.score = clamp(self.score, 0.0, SCORE_MAX);
        self.attributes.clamp_ratings();
    }

    /// The headline as shown on the card: prefix followed by the score.
    pub fn headline(&self) -> String {
        format!(
            "{} {}",
            self.headline_prefix,
            crate::format::format_score(self.score)
        )
    }
}

/// A partial update of a [`CardState`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPatch {
    pub headline_prefix: Option<String>,
    pub score: Option<f32>,
    pub percentile_text: Option<String>,
    /// `Some(None)` clears the avatar.
    pub avatar_url: Option<Option<String>>,
    pub brand_text: Option<String>,
    pub hint_text: Option<String>,
    pub cta_label: Option<String>,
    pub attributes: Option<Attributes>,
}

impl CardPatch {
    pub fn headline_prefix(text: impl Into<String>) -> Self {
        Self {
            headline_prefix: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn score(score: f32) -> Self {
        Self {
            score: Some(score),
            ..Self::default()
        }
    }

    pub fn percentile_text(text: impl Into<String>) -> Self {
        Self {
            percentile_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn avatar_url(url: Option<String>) -> Self {
        Self {
            avatar_url: Some(url),
            ..Self::default()
        }
    }

    pub fn brand_text(text: impl Into<String>) -> Self {
        Self {
            brand_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn hint_text(text: impl Into<String>) -> Self {
        Self {
            hint_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn cta_label(text: impl Into<String>) -> Self {
        Self {
            cta_label: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn attributes(attributes: Attributes) -> Self {
        Self {
            attributes: Some(attributes),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Which card(s) the preview shows and how they are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    Before,
    #[default]
    After,
    CompareSide,
    CompareSlider,
}

impl ViewMode {
    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::Before => "Before",
            ViewMode::After => "After",
            ViewMode::CompareSide => "Side-by-Side",
            ViewMode::CompareSlider => "Slider",
        }
    }

    pub fn all() -> &'static [ViewMode] {
        &ALL_VIEW_MODES[..]
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, ViewMode::CompareSide | ViewMode::CompareSlider)
    }

    pub fn next(&self) -> Self {
        let modes = Self::all();
        let idx = modes.iter().position(|m| m == self).unwrap_or(0);
        modes[(idx + 1) % modes.len()]
    }

    pub fn prev(&self) -> Self {
        let modes = Self::all();
        let idx = modes.iter().position(|m| m == self).unwrap_or(0);
        modes[(idx + modes.len() - 1) % modes.len()]
    }
}

static ALL_VIEW_MODES: [ViewMode; 4] = [
    ViewMode::Before,
    ViewMode::After,
    ViewMode::CompareSide,
    ViewMode::CompareSlider,
];

/// One card, or a before/after pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Single,
    #[default]
    Dual,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Single => f.write_str("single"),
            Layout::Dual => f.write_str("dual"),
        }
    }
}

/// Addresses one card inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSlot {
    Card,
    Before,
    After,
}

impl CardSlot {
    pub fn name(&self) -> &'static str {
        match self {
            CardSlot::Card => "Card",
            CardSlot::Before => "Before",
            CardSlot::After => "After",
        }
    }

    /// The opposite side of a before/after pair.
    pub fn counterpart(&self) -> Option<CardSlot> {
        match self {
            CardSlot::Before => Some(CardSlot::After),
            CardSlot::After => Some(CardSlot::Before),
            CardSlot::Card => None,
        }
    }
}

impl fmt::Display for CardSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn test_merge_leaves_other_fields() {
        let card = seed::facecard_after();
        let merged = card.merged(CardPatch::brand_text("umax"));
        assert_eq!(merged.brand_text, "umax");
        assert_eq!(merged.attributes, card.attributes);
        assert_eq!(merged.headline_prefix, card.headline_prefix);
    }

    #[test]
    fn test_merge_clamps_score() {
        let card = seed::facecard_after();
        assert_eq!(card.merged(CardPatch::score(42.0)).score, SCORE_MAX);
    }

    #[test]
    fn test_attribute_shape() {
        assert!(seed::stat_card().attributes.is_well_formed());
        assert!(seed::facecard_after().attributes.is_well_formed());

        let Attributes::Stats(mut stats) = seed::stat_card().attributes else {
            panic!("stat card without stats");
        };
        stats.pop();
        assert!(!Attributes::Stats(stats.clone()).is_well_formed());
        stats.push(stats[0].clone());
        assert!(!Attributes::Stats(stats).is_well_formed());

        assert!(!Attributes::Traits(Vec::new()).is_well_formed());
    }

    #[test]
    fn test_avatar_can_be_cleared() {
        let mut card = seed::facecard_after();
        card.avatar_url = Some("data:image/png;base64,AAAA".into());
        let cleared = card.merged(CardPatch::avatar_url(None));
        assert!(cleared.avatar_url.is_none());
    }

    #[test]
    fn test_view_mode_cycle() {
        assert_eq!(ViewMode::After.next(), ViewMode::CompareSide);
        assert_eq!(ViewMode::Before.prev(), ViewMode::CompareSlider);
    }

    #[test]
    fn test_view_mode_serialization() {
        let json = serde_json::to_string(&ViewMode::CompareSlider).unwrap();
        assert_eq!(json, "\"compare-slider\"");
    }

    #[test]
    fn test_kind_normalize() {
        assert_eq!(AttributeKind::Stats.normalize(150.0), 100.0);
        assert_eq!(AttributeKind::Stats.normalize(-5.0), 0.0);
        assert_eq!(AttributeKind::Traits.normalize(9.14), 9.1);
    }
}

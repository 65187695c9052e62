//! Editor panel bindings
//!
//! Turns edits of a single field or collection entry into a [`CardPatch`]
//! for the store. Nothing here mutates state; the controller applies the
//! returned patch.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::format::{clamp, format_score};
use crate::model::{AttributeKind, Attributes, CardPatch, CardState, Stat, Trait, SCORE_MAX, STAT_COUNT};

/// A collection edit that was refused. The text is shown to the user as-is.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorWarning {
    #[error("{}", below_minimum_message(.0))]
    BelowMinimum(AttributeKind),

    #[error("{}", above_maximum_message(.0))]
    AboveMaximum(AttributeKind),
}

fn below_minimum_message(kind: &AttributeKind) -> String {
    match kind {
        AttributeKind::Stats => format!("You must have exactly {STAT_COUNT} stats"),
        AttributeKind::Traits => format!("You must have at least {} trait", kind.min_len()),
    }
}

fn above_maximum_message(kind: &AttributeKind) -> String {
    format!("Maximum {} {} allowed", kind.max_len(), kind.plural())
}

/// Partial update of one stat or trait. Fields a stat lacks are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub label: Option<String>,
    /// `Some(None)` clears the sublabel.
    pub sublabel: Option<Option<String>>,
    pub icon: Option<String>,
    pub value: Option<f32>,
}

impl EntryPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn sublabel(sublabel: Option<String>) -> Self {
        Self {
            sublabel: Some(sublabel),
            ..Self::default()
        }
    }

    pub fn icon(icon: impl Into<String>) -> Self {
        Self {
            icon: Some(icon.into()),
            ..Self::default()
        }
    }

    pub fn value(value: f32) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }
}

/// Patch the entry with `id`, leaving every other entry untouched.
pub fn update_entry(card: &CardState, id: &str, patch: EntryPatch) -> CardPatch {
    let kind = card.attributes.kind();
    let attributes = match &card.attributes {
        Attributes::Stats(stats) => Attributes::Stats(
            stats
                .iter()
                .map(|stat| {
                    if stat.id != id {
                        return stat.clone();
                    }
                    let mut stat = stat.clone();
                    if let Some(label) = &patch.label {
                        stat.label = label.clone();
                    }
                    if let Some(value) = patch.value {
                        stat.value = kind.normalize(value);
                    }
                    stat
                })
                .collect(),
        ),
        Attributes::Traits(traits) => Attributes::Traits(
            traits
                .iter()
                .map(|t| {
                    if t.id != id {
                        return t.clone();
                    }
                    let mut t = t.clone();
                    if let Some(label) = &patch.label {
                        t.label = label.clone();
                    }
                    if let Some(sublabel) = &patch.sublabel {
                        t.sublabel = sublabel.clone();
                    }
                    if let Some(icon) = &patch.icon {
                        t.icon = icon.clone();
                    }
                    if let Some(value) = patch.value {
                        t.rating = kind.normalize(value);
                    }
                    t
                })
                .collect(),
        ),
    };
    CardPatch::attributes(attributes)
}

/// Move the entry's value by `delta`, clamped to its range.
pub fn adjust_value(card: &CardState, id: &str, delta: f32) -> CardPatch {
    let current = card
        .attributes
        .entries()
        .into_iter()
        .find(|entry| entry.id == id)
        .map(|entry| entry.value);
    match current {
        Some(value) => update_entry(card, id, EntryPatch::value(value + delta)),
        None => CardPatch::attributes(card.attributes.clone()),
    }
}

/// Drop the entry with `id`. Refused when the collection is at its minimum.
pub fn remove_entry(card: &CardState, id: &str) -> Result<CardPatch, EditorWarning> {
    let kind = card.attributes.kind();
    if card.attributes.len() <= kind.min_len() {
        return Err(EditorWarning::BelowMinimum(kind));
    }
    let attributes = match &card.attributes {
        Attributes::Stats(stats) => {
            Attributes::Stats(stats.iter().filter(|s| s.id != id).cloned().collect())
        }
        Attributes::Traits(traits) => {
            Attributes::Traits(traits.iter().filter(|t| t.id != id).cloned().collect())
        }
    };
    Ok(CardPatch::attributes(attributes))
}

/// Append a default entry. Refused when the collection is full.
pub fn add_entry(card: &CardState) -> Result<CardPatch, EditorWarning> {
    let kind = card.attributes.kind();
    if card.attributes.len() >= kind.max_len() {
        return Err(EditorWarning::AboveMaximum(kind));
    }
    let id = next_entry_id(&card.attributes, now_millis());
    let mut attributes = card.attributes.clone();
    match &mut attributes {
        Attributes::Stats(stats) => stats.push(Stat {
            id,
            label: "New Stat".to_string(),
            value: 50.0,
        }),
        Attributes::Traits(traits) => traits.push(Trait {
            id,
            icon: "✨".to_string(),
            label: "New Trait".to_string(),
            sublabel: None,
            rating: 5.0,
        }),
    }
    Ok(CardPatch::attributes(attributes))
}

/// Millisecond timestamp id, bumped until it is unused within the card.
pub fn next_entry_id(attributes: &Attributes, now_ms: u128) -> String {
    let mut candidate = now_ms;
    while attributes.contains_id(&candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Part of a collection entry bound to an editor row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPart {
    Icon,
    Label,
    Sublabel,
    Value,
}

/// One editable row of the editor panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Headline,
    Score,
    Percentile,
    Avatar,
    Brand,
    Hint,
    Cta,
    Entry { index: usize, part: EntryPart },
}

impl EditorField {
    /// Rows shown for `card`, top to bottom.
    pub fn fields(card: &CardState) -> Vec<EditorField> {
        let mut fields = vec![
            EditorField::Headline,
            EditorField::Score,
            EditorField::Percentile,
            EditorField::Avatar,
            EditorField::Brand,
            EditorField::Hint,
            EditorField::Cta,
        ];
        let parts: &[EntryPart] = match card.attributes.kind() {
            AttributeKind::Stats => &[EntryPart::Label, EntryPart::Value],
            AttributeKind::Traits => &[
                EntryPart::Icon,
                EntryPart::Label,
                EntryPart::Sublabel,
                EntryPart::Value,
            ],
        };
        for index in 0..card.attributes.len() {
            fields.extend(parts.iter().map(|&part| EditorField::Entry { index, part }));
        }
        fields
    }

    pub fn label(&self, card: &CardState) -> String {
        match self {
            EditorField::Headline => "Headline".to_string(),
            EditorField::Score => "Score".to_string(),
            EditorField::Percentile => "Percentile".to_string(),
            EditorField::Avatar => "Avatar".to_string(),
            EditorField::Brand => "Brand".to_string(),
            EditorField::Hint => "Hint".to_string(),
            EditorField::Cta => "Button".to_string(),
            EditorField::Entry { index, part } => {
                let noun = match card.attributes.kind() {
                    AttributeKind::Stats => "Stat",
                    AttributeKind::Traits => "Trait",
                };
                let part = match part {
                    EntryPart::Icon => "icon",
                    EntryPart::Label => "label",
                    EntryPart::Sublabel => "sublabel",
                    EntryPart::Value => match card.attributes.kind() {
                        AttributeKind::Stats => "value",
                        AttributeKind::Traits => "rating",
                    },
                };
                format!("{noun} {} {part}", index + 1)
            }
        }
    }

    /// Current value of the bound attribute, as shown in the panel.
    pub fn value(&self, card: &CardState) -> String {
        match self {
            EditorField::Headline => card.headline_prefix.clone(),
            EditorField::Score => format_score(card.score),
            EditorField::Percentile => card.percentile_text.clone(),
            EditorField::Avatar => match &card.avatar_url {
                None => "(none)".to_string(),
                Some(url) if url.starts_with("data:") => {
                    format!("embedded image ({} KB)", url.len().div_ceil(1024))
                }
                Some(path) => path.clone(),
            },
            EditorField::Brand => card.brand_text.clone(),
            EditorField::Hint => card.hint_text.clone(),
            EditorField::Cta => card.cta_label.clone(),
            EditorField::Entry { index, part } => {
                let Some(entry) = card.attributes.entry(*index) else {
                    return String::new();
                };
                match part {
                    EntryPart::Icon => entry.icon.unwrap_or_default().to_string(),
                    EntryPart::Label => entry.label.to_string(),
                    EntryPart::Sublabel => entry.sublabel.unwrap_or_default().to_string(),
                    EntryPart::Value => match card.attributes.kind() {
                        AttributeKind::Stats => format!("{}", entry.value.round() as i64),
                        AttributeKind::Traits => format_score(entry.value),
                    },
                }
            }
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            EditorField::Score
                | EditorField::Entry {
                    part: EntryPart::Value,
                    ..
                }
        )
    }

    /// Free-text rows; the avatar row opens the file prompt instead.
    pub fn is_text(&self) -> bool {
        !matches!(self, EditorField::Avatar)
    }
}

/// Patch that sets `field` to `text`. Numbers that fail to parse become 0
/// and every number is clamped. `None` when the field takes no text.
pub fn set_text(card: &CardState, field: EditorField, text: &str) -> Option<CardPatch> {
    let patch = match field {
        EditorField::Headline => CardPatch::headline_prefix(text),
        EditorField::Score => {
            let score = text.trim().parse::<f32>().unwrap_or(0.0);
            CardPatch::score(clamp((score * 10.0).round() / 10.0, 0.0, SCORE_MAX))
        }
        EditorField::Percentile => CardPatch::percentile_text(text),
        EditorField::Avatar => return None,
        EditorField::Brand => CardPatch::brand_text(text),
        EditorField::Hint => CardPatch::hint_text(text),
        EditorField::Cta => CardPatch::cta_label(text),
        EditorField::Entry { index, part } => {
            let id = card.attributes.entry(index)?.id.to_string();
            let entry_patch = match part {
                EntryPart::Icon => EntryPatch::icon(text),
                EntryPart::Label => EntryPatch::label(text),
                EntryPart::Sublabel => {
                    let trimmed = text.trim();
                    EntryPatch::sublabel((!trimmed.is_empty()).then(|| trimmed.to_string()))
                }
                EntryPart::Value => EntryPatch::value(text.trim().parse::<f32>().unwrap_or(0.0)),
            };
            update_entry(card, &id, entry_patch)
        }
    };
    Some(patch)
}

/// Step a numeric field by `steps` increments. `None` for text fields.
pub fn adjust(card: &CardState, field: EditorField, steps: i32) -> Option<CardPatch> {
    match field {
        EditorField::Score => {
            let score = card.score + steps as f32 * 0.1;
            Some(CardPatch::score(clamp(
                (score * 10.0).round() / 10.0,
                0.0,
                SCORE_MAX,
            )))
        }
        EditorField::Entry {
            index,
            part: EntryPart::Value,
        } => {
            let id = card.attributes.entry(index)?.id.to_string();
            let step = card.attributes.kind().step();
            Some(adjust_value(card, &id, steps as f32 * step))
        }
        _ => None,
    }
}

//! Seed cards the editor starts from and resets to.

use crate::model::{Attributes, CardState, Layout, Stat, Trait, ViewMode};
use crate::store::{Cards, StoreState};

fn traits(rows: &[(&str, &str, &str, &str, f32)]) -> Attributes {
    Attributes::Traits(
        rows.iter()
            .map(|(id, icon, label, sublabel, rating)| Trait {
                id: id.to_string(),
                icon: icon.to_string(),
                label: label.to_string(),
                sublabel: Some(sublabel.to_string()),
                rating: *rating,
            })
            .collect(),
    )
}

/// "Before" card: lower ratings, room for improvement.
pub fn facecard_before() -> CardState {
    CardState {
        headline_prefix: "You're a".to_string(),
        score: 7.2,
        percentile_text: "Top 68% of men".to_string(),
        avatar_url: None,
        brand_text: "The Facecard App".to_string(),
        hint_text: "Swipe for detailed analysis →".to_string(),
        cta_label: "Share your results".to_string(),
        attributes: traits(&[
            ("1", "✨", "Skin", "Needs Improvement", 7.0),
            ("2", "🔥", "Masculinity", "Average Dimorphism", 7.5),
            ("3", "😐", "Jawline", "Moderately Defined", 7.8),
            ("4", "💇", "Hairline", "Receding Slightly", 6.8),
            ("5", "👁️", "Eyes", "Standard Shape", 7.1),
        ]),
    }
}

/// "After" card: improved ratings.
pub fn facecard_after() -> CardState {
    CardState {
        headline_prefix: "You're a".to_string(),
        score: 8.9,
        percentile_text: "Top 92% of men".to_string(),
        avatar_url: None,
        brand_text: "The Facecard App".to_string(),
        hint_text: "Swipe for detailed analysis →".to_string(),
        cta_label: "Share your results".to_string(),
        attributes: traits(&[
            ("1", "✨", "Skin", "Excellent Texture", 9.1),
            ("2", "🔥", "Masculinity", "Moderate Dimorphism", 9.0),
            ("3", "😊", "Jawline", "Well Defined", 9.4),
            ("4", "💇‍♂️", "Hairline", "Lush Thick Hair", 9.1),
            ("5", "👁️", "Eyes", "Almond Shape", 8.4),
        ]),
    }
}

/// Single stat card: six 0-100 stats, three per column.
pub fn stat_card() -> CardState {
    let stats = [
        ("1", "Overall", 78.0),
        ("2", "Potential", 86.0),
        ("3", "Jawline", 80.0),
        ("4", "Cheekbones", 74.0),
        ("5", "Masculinity", 77.0),
        ("6", "Skin Quality", 72.0),
    ];

    CardState {
        headline_prefix: "You're a".to_string(),
        score: 7.8,
        percentile_text: "Top 25% of men".to_string(),
        avatar_url: None,
        brand_text: "umax".to_string(),
        hint_text: "Tap for your full report →".to_string(),
        cta_label: "Share your stats".to_string(),
        attributes: Attributes::Stats(
            stats
                .iter()
                .map(|(id, label, value)| Stat {
                    id: id.to_string(),
                    label: label.to_string(),
                    value: *value,
                })
                .collect(),
        ),
    }
}

/// The state a fresh store starts with for the given layout.
pub fn initial_state(layout: Layout) -> StoreState {
    let cards = match layout {
        Layout::Single => Cards::Single { card: stat_card() },
        Layout::Dual => Cards::Dual {
            before: facecard_before(),
            after: facecard_after(),
        },
    };
    StoreState {
        mode: ViewMode::After,
        cards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeKind, STAT_COUNT};

    #[test]
    fn test_stat_card_has_six_stats() {
        let card = stat_card();
        assert_eq!(card.attributes.kind(), AttributeKind::Stats);
        assert_eq!(card.attributes.len(), STAT_COUNT);
    }

    #[test]
    fn test_seed_ids_unique() {
        for card in [facecard_before(), facecard_after(), stat_card()] {
            let entries = card.attributes.entries();
            let mut ids: Vec<&str> = entries.iter().map(|e| e.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), card.attributes.len());
        }
    }

    #[test]
    fn test_initial_state_layout() {
        assert_eq!(initial_state(Layout::Dual).cards.layout(), Layout::Dual);
        assert_eq!(initial_state(Layout::Single).cards.layout(), Layout::Single);
    }
}

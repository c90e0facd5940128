// Card formatter: reduces raw AnkiConnect card records to the front/back
// pairs that end up in the published vocabulary.

use crate::api::RawCard;
use crate::report;
use serde::{Deserialize, Serialize};

/// A card reduced to the two sides the published vocabulary needs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FormattedCard {
    pub front: String,
    pub back: String,
}

impl FormattedCard {
    /// `None` when either the `Front` or `Back` field is missing.
    pub fn from_raw(card: &RawCard) -> Option<Self> {
        Some(FormattedCard {
            front: card.field("Front")?.to_string(),
            back: card.field("Back")?.to_string(),
        })
    }
}

/// Keep the input order, dropping (with a warning) every card that lacks
/// a front or back value.
pub fn format_cards(cards: &[RawCard]) -> Vec<FormattedCard> {
    cards
        .iter()
        .filter_map(|card| {
            let formatted = FormattedCard::from_raw(card);
            if formatted.is_none() {
                report::warn(&format!(
                    "Card {} has unexpected format. Skipping.",
                    card.id()
                ));
            }
            formatted
        })
        .collect()
}

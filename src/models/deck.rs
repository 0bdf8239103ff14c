use super::slide::SlideView;
use super::unvalidated::{parse_json_leniently, type_name, Unvalidated};
use crate::errors::{Result, SlidesError};
use serde_json::{Map, Value};

/// A validated deck: the slides that could be read as mappings, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideDeck {
    pub slides: Vec<SlideView>,
}

impl SlideDeck {
    /// Validates a `slide_deck` value.
    ///
    /// The deck may itself arrive as an encoded string. Fails with
    /// [`SlidesError::InvalidDeck`] when no mapping can be recovered and with
    /// [`SlidesError::EmptyDeck`] when no slide survives.
    pub fn from_value(deck: &Value) -> Result<Self> {
        let deck = match Unvalidated::<Map<String, Value>>::classify(Some(deck)) {
            Unvalidated::Valid(map) => map,
            Unvalidated::Encoded(text) => match parse_json_leniently(&text) {
                Some(Value::Object(map)) => map,
                _ => {
                    return Err(SlidesError::InvalidDeck(
                        "string could not be parsed into a mapping".to_string(),
                    ))
                }
            },
            Unvalidated::Invalid(other) => {
                return Err(SlidesError::InvalidDeck(format!(
                    "expected a mapping, got {}",
                    type_name(&other)
                )))
            }
            Unvalidated::Missing => {
                return Err(SlidesError::InvalidDeck("deck is null".to_string()))
            }
        };

        let raw_slides = match deck.get("slides") {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::String(text)) => match parse_json_leniently(text) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        let mut slides = Vec::with_capacity(raw_slides.len());
        for (position, raw) in raw_slides.iter().enumerate() {
            match SlideView::from_value(raw, slides.len()) {
                Some(view) => slides.push(view),
                None => log::warn!(
                    "Skipping slide entry {}: expected a mapping, got {}",
                    position,
                    type_name(raw)
                ),
            }
        }

        if slides.is_empty() {
            return Err(SlidesError::EmptyDeck);
        }
        Ok(SlideDeck { slides })
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

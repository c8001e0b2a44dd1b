// src/ner/tagger.rs
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ner::labels::EntityLabel;
use crate::ner::model::{EntityRecognizer, EntitySpan};

pub const INCOMPLETE_ADDRESS_MESSAGE: &str = "Incorrect address format. Please provide a full address.";

/// All five address fields, each taken from a recognized span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAddress {
    pub gov: String,
    pub area: String,
    pub block: String,
    pub street: String,
    pub building: String,
}

impl fmt::Display for StructuredAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Correct Address: {}, {}, {}, {}, {}",
            self.gov, self.area, self.block, self.street, self.building
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagOutcome {
    Complete(StructuredAddress),
    Incomplete { missing: Vec<EntityLabel> },
}

impl TagOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, TagOutcome::Complete(_))
    }

    /// The user-facing line: the formatted address or the fixed rejection.
    pub fn message(&self) -> String {
        match self {
            TagOutcome::Complete(address) => address.to_string(),
            TagOutcome::Incomplete { .. } => INCOMPLETE_ADDRESS_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for TagOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Picks, per label, the earliest non-empty span in the text. Any label without one
/// makes the result `Incomplete`.
pub fn format_address(spans: &[EntitySpan]) -> TagOutcome {
    let pick = |label: EntityLabel| -> Option<String> {
        spans
            .iter()
            .filter(|s| s.label == label)
            .map(|s| (s.start, s.text.trim()))
            .filter(|(_, text)| !text.is_empty())
            .min_by_key(|(start, _)| *start)
            .map(|(_, text)| text.to_string())
    };

    let fields: Vec<(EntityLabel, Option<String>)> =
        EntityLabel::ALL.iter().map(|l| (*l, pick(*l))).collect();
    let missing: Vec<EntityLabel> = fields
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(l, _)| *l)
        .collect();
    if !missing.is_empty() {
        debug!("Address is missing {:?}", missing);
        return TagOutcome::Incomplete { missing };
    }

    let mut values = fields.into_iter().filter_map(|(_, v)| v);
    let mut next = || values.next().unwrap_or_default();
    TagOutcome::Complete(StructuredAddress {
        gov: next(),
        area: next(),
        block: next(),
        street: next(),
        building: next(),
    })
}

/// Runs `recognizer` over `text` and formats the result.
pub fn tag_address<R: EntityRecognizer + ?Sized>(recognizer: &R, text: &str) -> TagOutcome {
    format_address(&recognizer.recognize(text))
}

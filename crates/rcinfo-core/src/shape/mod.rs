//! Vehicle record shaper.
//!
//! Turns the loosely structured upstream record into an ordered list of
//! labeled sections. Both front-ends go through [`shape_record`]; they differ
//! only in the [`Layout`] (which field table) and the [`MaskMode`] (what to do
//! with a redacted engine number).

mod fields;
mod format;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::vehicle::VehicleRecord;

pub use fields::{FieldSpec, SectionSpec, CARD_SECTIONS, CHAT_SECTIONS};
pub use format::{format_date, FieldFormat, MASK_CHAR, NOT_AVAILABLE};

use format::{first_value, is_masked, is_string_true, is_truthy, yes_no};

/// Which field table to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Full table, grouped into cards (web form).
    Card,
    /// Compact table, one block per section (chat bot).
    Chat,
}

impl Layout {
    pub fn sections(self) -> &'static [SectionSpec] {
        match self {
            Layout::Card => CARD_SECTIONS,
            Layout::Chat => CHAT_SECTIONS,
        }
    }

    /// Mask handling each front-end has always used.
    pub fn default_mask_mode(self) -> MaskMode {
        match self {
            Layout::Card => MaskMode::Suppress,
            Layout::Chat => MaskMode::Substitute,
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "card" => Ok(Layout::Card),
            "chat" => Ok(Layout::Chat),
            other => Err(format!("unknown layout {other:?} (expected card or chat)")),
        }
    }
}

/// What to do with an engine number that contains [`MASK_CHAR`].
///
/// Deserializes through [`FromStr`], so any letter case is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    /// Drop the field from its section.
    Suppress,
    /// Show the unmasked alternative if the record has one, else the masked value.
    Substitute,
}

impl FromStr for MaskMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "suppress" => Ok(MaskMode::Suppress),
            "substitute" => Ok(MaskMode::Substitute),
            other => Err(format!(
                "unknown mask mode {other:?} (expected suppress or substitute)"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for MaskMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for MaskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MaskMode::Suppress => "suppress",
            MaskMode::Substitute => "substitute",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplaySection {
    pub group: String,
    pub title: String,
    pub items: Vec<DisplayItem>,
}

impl DisplaySection {
    /// Value for `label`, if the section shows it.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|i| i.label == label)
            .map(|i| i.value.as_str())
    }
}

/// Shape `record` with the given layout and mask handling.
pub fn shape_record(record: &VehicleRecord, layout: Layout, mode: MaskMode) -> Vec<DisplaySection> {
    shape_with(record, layout.sections(), mode)
}

/// Shape against an arbitrary field table.
pub fn shape_with(
    record: &VehicleRecord,
    sections: &[SectionSpec],
    mode: MaskMode,
) -> Vec<DisplaySection> {
    sections
        .iter()
        .map(|section| DisplaySection {
            group: section.group.to_string(),
            title: section.title.to_string(),
            items: section
                .fields
                .iter()
                .filter_map(|f| {
                    resolve_field(record, f, mode).map(|value| DisplayItem {
                        label: f.label.to_string(),
                        value,
                    })
                })
                .collect(),
        })
        .collect()
}

/// Display value of one field, or `None` when the field is suppressed.
pub fn resolve_field(record: &VehicleRecord, field: &FieldSpec, mode: MaskMode) -> Option<String> {
    let first_text = || record.first_text(field.sources);
    let value = match field.format {
        FieldFormat::Text => first_text().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        FieldFormat::TextOr(fallback) => first_text().unwrap_or_else(|| fallback.to_string()),
        FieldFormat::Date => format_date(first_text().as_deref()),
        FieldFormat::Suffixed(suffix) => {
            let v = first_text().unwrap_or_else(|| NOT_AVAILABLE.to_string());
            format!("{v}{suffix}")
        }
        FieldFormat::Truthy => yes_no(is_truthy(first_value(record, field.sources))),
        FieldFormat::StringTrue => yes_no(is_string_true(first_value(record, field.sources))),
        FieldFormat::MakeModel => {
            let make = field.sources.first().and_then(|p| record.text(p));
            let model = field.sources.get(1).and_then(|p| record.text(p));
            format!(
                "{} {}",
                make.as_deref().unwrap_or(NOT_AVAILABLE),
                model.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_string()
        }
        FieldFormat::MaskedEngine { unmasked } => match first_text() {
            Some(v) if is_masked(&v) => match mode {
                MaskMode::Suppress => return None,
                MaskMode::Substitute => record.first_text(unmasked).unwrap_or(v),
            },
            Some(v) => v,
            None => NOT_AVAILABLE.to_string(),
        },
    };
    Some(value)
}

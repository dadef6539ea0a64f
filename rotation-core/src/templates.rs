//! Static scenario configuration: mandatory race templates per BC final, the
//! secondary scenario's mandatory races, and the exclusive race names.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::calendar::{Half, LifeStage, Slot};

const DEFAULT_TEMPLATE_DATA: &str = include_str!("../data/templates.json");

/// One mandatory race at its fixed slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub stage: LifeStage,
    pub race: String,
    pub month: u8,
    pub half: Half,
}

impl TemplateEntry {
    #[must_use]
    pub const fn slot(&self) -> Slot {
        Slot::new(self.stage, self.month, self.half)
    }
}

/// Mandatory intermediate races a BC final requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalTemplate {
    #[serde(rename = "final")]
    pub final_name: String,
    #[serde(default)]
    pub mandatory: Vec<TemplateEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TemplateBook {
    #[serde(default)]
    pub finals: Vec<FinalTemplate>,
    #[serde(default)]
    pub secondary: Vec<TemplateEntry>,
    #[serde(default)]
    pub exclusive: BTreeSet<String>,
}

impl TemplateBook {
    /// Load a template book from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a template book.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_TEMPLATE_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn for_final(&self, final_name: &str) -> Option<&FinalTemplate> {
        self.finals.iter().find(|t| t.final_name == final_name)
    }

    /// Mandatory entries for `final_name`; empty when the final has no template.
    #[must_use]
    pub fn mandatory_for(&self, final_name: &str) -> &[TemplateEntry] {
        self.for_final(final_name)
            .map(|t| t.mandatory.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn is_exclusive(&self, race_name: &str) -> bool {
        self.exclusive.contains(race_name)
    }
}

/// Shared default template book embedded in the crate.
#[must_use]
pub fn default_book() -> &'static TemplateBook {
    static BOOK: OnceLock<TemplateBook> = OnceLock::new();
    BOOK.get_or_init(TemplateBook::load_from_static)
}

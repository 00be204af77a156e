//! Query context tabs.

use serde::{Deserialize, Serialize};

/// The context a query was asked from; selects the system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Alternative medications.
    Alternatives,

    /// Generic versions of branded medicines.
    GenericMedicines,

    /// Finding a specific medication.
    #[default]
    MedicineFinder,
}

impl Tab {
    /// Every tab, in display order.
    pub const ALL: [Tab; 3] = [
        Self::MedicineFinder,
        Self::GenericMedicines,
        Self::Alternatives,
    ];

    /// Resolve a tag or display title, case-insensitively.
    ///
    /// Unknown tags fall back to [`Tab::MedicineFinder`].
    pub fn from_tag(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_else(|| {
            tracing::debug!(tag, "unknown tab tag, using medicine_finder");
            Self::MedicineFinder
        })
    }

    /// Strict variant of [`Tab::from_tag`].
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL.into_iter().find(|tab| {
            tab.tag().eq_ignore_ascii_case(tag) || tab.title().eq_ignore_ascii_case(tag)
        })
    }

    /// Machine tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Alternatives => "alternatives",
            Self::GenericMedicines => "generic_medicines",
            Self::MedicineFinder => "medicine_finder",
        }
    }

    /// Display title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Alternatives => "Alternatives",
            Self::GenericMedicines => "Generic Medicines",
            Self::MedicineFinder => "Find Your Medicines",
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

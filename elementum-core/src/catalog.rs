//! Selectable simulation elements and their categories.
//!
//! Shipped as JSON next to the host module. When no file is found the small
//! built-in table is used so the palette is never empty.

use serde::{Deserialize, Serialize};

/// Element selected at startup.
pub const DEFAULT_ELEMENT: &str = "SAND";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub symbol: String,
    /// Pseudo categories hold engine-internal elements and get no palette entry.
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u32,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub elements: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn builtin() -> Self {
        let cat = |name: &str, symbol: &str| Category {
            name: name.to_string(),
            symbol: symbol.to_string(),
            hidden: false,
        };
        let el = |id, name: &str, category: &str, description: &str| CatalogEntry {
            id,
            name: name.to_string(),
            category: category.to_string(),
            description: description.to_string(),
        };
        Self {
            categories: vec![
                cat("powder", "\u{2237}"),
                cat("liquid", "\u{2248}"),
                cat("solid", "\u{25a0}"),
                cat("energy", "\u{2739}"),
                Category {
                    name: "hidden".to_string(),
                    symbol: "?".to_string(),
                    hidden: true,
                },
            ],
            elements: vec![
                el(0, "VOID", "hidden", "Empty space"),
                el(1, "SAND", "powder", "Falls and piles up"),
                el(2, "SALT", "powder", "Dissolves in water"),
                el(3, "WATER", "liquid", "Flows and evaporates when heated"),
                el(4, "OIL", "liquid", "Floats on water, burns"),
                el(5, "STONE", "solid", "Does not move"),
                el(6, "WOOD", "solid", "Burns slowly"),
                el(7, "FIRE", "energy", "Heats and ignites its neighbours"),
            ],
        }
    }

    pub fn visible_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| !c.hidden)
    }

    pub fn entries_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a CatalogEntry> {
        self.elements.iter().filter(move |e| e.category == category)
    }

    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Entry the brush starts with: `SAND` when present, else the first
    /// element in a visible category.
    pub fn default_entry(&self) -> Option<&CatalogEntry> {
        self.find(DEFAULT_ELEMENT).or_else(|| {
            self.elements
                .iter()
                .find(|e| self.category(&e.category).is_some_and(|c| !c.hidden))
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

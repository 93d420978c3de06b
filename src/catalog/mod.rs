use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

// one entry of the list endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub id: u32,
    pub name: String,
    pub detail_url: String,
}

// the per-entity record fetched from the detail endpoint
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EntityDetail {
    pub id: u32,
    pub categories: Vec<String>,
    pub weight: Option<u32>,
    pub height: Option<u32>,
    pub abilities: Vec<String>,
    pub sprite_url: Option<String>,
}

impl EntityDetail {
    pub fn has_category(&self, category: &str) -> bool {
        let wanted = category.trim();
        self.categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(wanted))
    }
}

/// Detail lookups keyed by entity id.
///
/// `Some(None)` records a fetch that already failed; such entities render
/// without badges and never match a category filter.
pub type DetailCache = HashMap<u32, Option<EntityDetail>>;

/// Orderings for the canonical collection. All of them are applied with a
/// stable sort.
///
/// Name keys compare case-folded text by code point, then the raw text. There
/// is no locale collation, so accented initials sort after `z`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    IdAsc,
    IdDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "id" | "id-asc" | "id_asc" => Some(Self::IdAsc),
            "id-desc" | "id_desc" => Some(Self::IdDesc),
            "name" | "name-asc" | "name_asc" => Some(Self::NameAsc),
            "name-desc" | "name_desc" => Some(Self::NameDesc),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::IdAsc => "id-asc",
            Self::IdDesc => "id-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    pub fn compare(self, a: &EntitySummary, b: &EntitySummary) -> Ordering {
        match self {
            Self::IdAsc => a.id.cmp(&b.id),
            Self::IdDesc => b.id.cmp(&a.id),
            Self::NameAsc => compare_names(&a.name, &b.name),
            Self::NameDesc => compare_names(&b.name, &a.name),
        }
    }
}

// case-folded order; the raw string only settles names that fold to the same text
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Which selection produces the active view.
///
/// Search and category filtering are exclusive: entering one mode leaves the other.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    All,
    Search(String),
    Category(String),
}

impl ViewMode {
    pub fn describe(&self) -> String {
        match self {
            Self::All => "all".to_string(),
            Self::Search(term) => format!("search \"{term}\""),
            Self::Category(name) => format!("type {name}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no entities match the current search or filter")]
    NoResults,

    #[error("no entity found for '{query}'")]
    NotFound { query: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid {field}: {message}")]
    InvalidOptions {
        field: &'static str,
        message: String,
    },
}

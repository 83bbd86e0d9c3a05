//! Input records handed over by the data layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LayoutError;

/// Kind of lineage event a link represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkKind {
    #[default]
    #[serde(alias = "TRANSFER")]
    Continuation,
    Merge,
    Split,
    LegalTransfer,
    SpiritualSuccession,
}

impl LinkKind {
    /// Merges and splits always get a full connector, even within one lane.
    pub fn is_branching(self) -> bool {
        matches!(self, LinkKind::Merge | LinkKind::Split)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Era {
    pub year: i32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub founding_year: i32,
    #[serde(default)]
    pub dissolution_year: Option<i32>,
    #[serde(default)]
    pub eras: Vec<Era>,
    /// Caller fields we don't interpret, echoed back on output.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity {
    pub fn new(id: &str, founding_year: i32, dissolution_year: Option<i32>) -> Self {
        Self {
            id: id.to_string(),
            founding_year,
            dissolution_year,
            eras: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_eras(mut self, years: &[i32]) -> Self {
        self.eras = years
            .iter()
            .map(|&year| Era {
                year,
                extra: Map::new(),
            })
            .collect();
        self
    }

    pub fn latest_era_year(&self) -> Option<i32> {
        self.eras.iter().map(|e| e.year).max()
    }

    /// Latest year we have any evidence of the entity existing.
    pub fn last_known_year(&self) -> i32 {
        self.latest_era_year()
            .map_or(self.founding_year, |y| y.max(self.founding_year))
    }

    /// End used for chain breaking: explicit dissolution, else the latest era.
    pub fn inferred_end(&self) -> i32 {
        self.dissolution_year
            .or_else(|| self.latest_era_year())
            .unwrap_or(self.founding_year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub year: i32,
    #[serde(rename = "type", default)]
    pub kind: Option<LinkKind>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    pub fn new(source: &str, target: &str, year: i32, kind: LinkKind) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            year,
            kind: Some(kind),
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> LinkKind {
        self.kind.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineInput {
    #[serde(default)]
    pub nodes: Vec<Entity>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl TimelineInput {
    pub fn from_json(source: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(source)?)
    }
}

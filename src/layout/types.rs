//! Data structures for layout computation.

use serde::Serialize;

use crate::model::{Entity, Link};
use crate::scale::{TimeScale, YearRange};

/// How a chain was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOrigin {
    /// Reached from a chain start during the main traversal.
    Traversal,
    /// Left over after traversal (cycles or irregular data); always a singleton.
    Leftover,
}

/// A maximal linear run of entities sharing one lane.
#[derive(Debug, Clone)]
pub struct Chain {
    pub id: usize,
    /// Entity indices in temporal order
    pub nodes: Vec<usize>,
    pub start: i32,
    pub end: i32,
    pub origin: ChainOrigin,
}

impl Chain {
    /// Half-open activity test, so touching chains never count as overlapping.
    #[inline]
    pub fn active_at(&self, year: i32) -> bool {
        self.start <= year && year < self.end
    }

    /// Years between this chain and another, zero when they overlap.
    pub fn gap_to(&self, other: &Chain) -> i32 {
        other.start.saturating_sub(self.end).max(self.start.saturating_sub(other.end)).max(0)
    }
}

/// A connected component of chains, laid out independently.
#[derive(Debug, Clone)]
pub struct Family {
    pub id: usize,
    /// Chain ids, ascending
    pub chains: Vec<usize>,
    pub start: i32,
}

/// Lifecycle classification used for node widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "year", rename_all = "camelCase")]
pub enum Lifecycle {
    Dissolved(i32),
    Active,
    /// Not dissolved, but no sign of life recently.
    Zombie(i32),
}

/// Key geometry of a connector, for debugging overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorAnchors {
    pub spine_x: f64,
    pub source_top: (f64, f64),
    pub source_bottom: (f64, f64),
    pub target_top: (f64, f64),
    pub target_bottom: (f64, f64),
    pub waist_top: (f64, f64),
    pub waist_bottom: (f64, f64),
}

/// A positioned entity.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutNode {
    #[serde(flatten)]
    pub entity: Entity,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub lane: usize,
    pub family: usize,
    pub lifecycle: Lifecycle,
}

/// A link with its connector geometry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutLink {
    #[serde(flatten)]
    pub link: Link,
    pub source_x: f64,
    pub source_y: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub same_swimlane: bool,
    /// Closed outline; `None` means the renderer draws a marker instead.
    pub path: Option<String>,
    #[serde(rename = "topPathD")]
    pub top_path: Option<String>,
    #[serde(rename = "bottomPathD")]
    pub bottom_path: Option<String>,
    pub debug_points: Option<ConnectorAnchors>,
}

/// The complete layout result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineLayout {
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<LayoutLink>,
    pub year_range: YearRange,
    pub scale: TimeScale,
    pub row_height: f64,
    pub node_height: f64,
    pub pixels_per_year: f64,
    pub width: f64,
    pub height: f64,
}

impl TimelineLayout {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.entity.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(start: i32, end: i32) -> Chain {
        Chain {
            id: 0,
            nodes: vec![0],
            start,
            end,
            origin: ChainOrigin::Traversal,
        }
    }

    #[test]
    fn test_active_at_is_half_open() {
        let c = chain(1990, 2001);
        assert!(c.active_at(1990));
        assert!(c.active_at(2000));
        assert!(!c.active_at(2001));
    }

    #[test]
    fn test_gap_to() {
        assert_eq!(chain(1990, 2000).gap_to(&chain(2005, 2010)), 5);
        assert_eq!(chain(2005, 2010).gap_to(&chain(1990, 2000)), 5);
        assert_eq!(chain(1990, 2000).gap_to(&chain(1995, 2010)), 0);
        assert_eq!(chain(1990, 2000).gap_to(&chain(2000, 2010)), 0);
    }
}

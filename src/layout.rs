//! Timeline layout: chains, families, swimlanes and connectors.

pub mod chains;
pub mod connector;
pub mod cost;
pub mod engine;
pub mod families;
pub mod lanes;
pub mod optimizer;
pub mod sizing;
pub mod types;

pub use connector::{Band, ConnectorBuilder, ConnectorPath};
pub use engine::LayoutEngine;
pub use types::{
    Chain, ChainOrigin, ConnectorAnchors, Family, LayoutLink, LayoutNode, Lifecycle,
    TimelineLayout,
};

//! Layout engine core implementation.

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::graph::TimelineGraph;
use crate::model::TimelineInput;
use crate::scale::TimeScale;

use super::chains::{build_chains, chain_of_node};
use super::connector::{Band, ConnectorBuilder};
use super::cost::{FamilyGraph, FamilyLink};
use super::families::{chain_adjacency, group_families};
use super::lanes::LaneArena;
use super::optimizer::SwimlaneOptimizer;
use super::sizing::{classify, derive_year_range, node_extent, occupancy_end};
use super::types::{Chain, Family, LayoutLink, LayoutNode, Lifecycle, TimelineLayout};

/// Layout engine configuration and computation.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    pub(crate) config: LayoutConfig,
}

/// Lane placement of every chain after compaction.
struct LanePlacement {
    /// Chain id -> lane within its family
    chain_lane: Vec<usize>,
    /// Chain id -> position of its family in stacking order
    chain_family: Vec<usize>,
    /// Stacking position -> top Y of the family
    family_top: Vec<f64>,
    total_height: f64,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute layout for the given timeline.
    pub fn layout(&self, input: &TimelineInput) -> Result<TimelineLayout, LayoutError> {
        if let Some(filter) = self.config.year_filter {
            tracing::debug!(?filter, "year filter is view-only, range comes from the full dataset");
        }

        let graph = TimelineGraph::build(input)?;
        let current_year = self.config.current_year();

        // Phase 1: Time axis
        let year_range = derive_year_range(&input.nodes, current_year);
        let scale = TimeScale::new(
            year_range,
            self.config.canvas_width,
            self.config.padding,
            self.config.stretch,
        );
        let node_height = scale.pixels_per_year * self.config.height_factor;
        let row_height = node_height * self.config.row_factor;

        let lifecycles: Vec<Lifecycle> = input
            .nodes
            .iter()
            .map(|e| classify(e, current_year))
            .collect();
        let ends: Vec<i32> = input
            .nodes
            .iter()
            .zip(&lifecycles)
            .map(|(e, &life)| occupancy_end(e, life, year_range))
            .collect();

        // Phase 2: Chains and families
        let chains = build_chains(&graph, &ends);
        let chain_of = chain_of_node(&chains, graph.len());
        let adjacency = chain_adjacency(&graph, &chains, &chain_of);
        let families = group_families(&chains, &adjacency);

        tracing::debug!(
            entities = graph.len(),
            links = graph.links.len(),
            chains = chains.len(),
            families = families.len(),
            "decomposed timeline"
        );

        // Phase 3: Lanes
        let placement = self.place_families(&graph, &chains, &chain_of, &families, row_height)?;

        // Phase 4: Node geometry
        let mut bands: Vec<Band> = Vec::with_capacity(graph.len());
        let mut nodes: Vec<LayoutNode> = Vec::with_capacity(graph.len());
        for (i, entity) in input.nodes.iter().enumerate() {
            let chain = chain_of[i];
            let lane = placement.chain_lane[chain];
            let family = placement.chain_family[chain];
            let (x, width) =
                node_extent(entity, lifecycles[i], &scale, self.config.min_active_width);
            let y = placement.family_top[family]
                + lane as f64 * row_height
                + (row_height - node_height) / 2.0;

            bands.push(Band {
                x,
                y,
                width,
                height: node_height,
            });
            nodes.push(LayoutNode {
                entity: entity.clone(),
                x,
                y,
                width,
                height: node_height,
                lane,
                family,
                lifecycle: lifecycles[i],
            });
        }

        // Phase 5: Connectors
        let builder = ConnectorBuilder::new(self.config.waist_pinch, self.config.lens_bulge);
        let links = graph
            .links
            .iter()
            .map(|link| {
                let source = bands[link.source];
                let target = bands[link.target];
                let same_swimlane = placement.chain_family[chain_of[link.source]]
                    == placement.chain_family[chain_of[link.target]]
                    && placement.chain_lane[chain_of[link.source]]
                        == placement.chain_lane[chain_of[link.target]];
                let input_link = input.links[link.input_index].clone();

                match builder.build(source, target, same_swimlane, link.year, link.kind, &scale) {
                    Some(path) => {
                        let a = path.anchors;
                        let ((source_x, source_y), (target_x, target_y)) = if source.y <= target.y {
                            (a.source_bottom, a.target_top)
                        } else {
                            (a.source_top, a.target_bottom)
                        };
                        LayoutLink {
                            link: input_link,
                            source_x,
                            source_y,
                            target_x,
                            target_y,
                            same_swimlane,
                            path: Some(path.to_svg()),
                            top_path: Some(path.top.to_svg()),
                            bottom_path: Some(path.bottom.to_svg()),
                            debug_points: Some(a),
                        }
                    }
                    None => LayoutLink {
                        link: input_link,
                        source_x: source.right(),
                        source_y: source.y + source.height / 2.0,
                        target_x: target.x,
                        target_y: target.y + target.height / 2.0,
                        same_swimlane,
                        path: None,
                        top_path: None,
                        bottom_path: None,
                        debug_points: None,
                    },
                }
            })
            .collect();

        Ok(TimelineLayout {
            nodes,
            links,
            year_range,
            scale,
            row_height,
            node_height,
            pixels_per_year: scale.pixels_per_year,
            width: scale.right_edge() + self.config.padding,
            height: placement.total_height,
        })
    }

    /// Optimize and compact each family, stacking them top to bottom.
    fn place_families(
        &self,
        graph: &TimelineGraph,
        chains: &[Chain],
        chain_of: &[usize],
        families: &[Family],
        row_height: f64,
    ) -> Result<LanePlacement, LayoutError> {
        let mut chain_family = vec![0; chains.len()];
        let mut local_index = vec![0; chains.len()];
        for (stack, family) in families.iter().enumerate() {
            for (local, &chain) in family.chains.iter().enumerate() {
                chain_family[chain] = stack;
                local_index[chain] = local;
            }
        }

        let mut family_links: Vec<Vec<FamilyLink>> = vec![Vec::new(); families.len()];
        for link in &graph.links {
            let (parent, child) = (chain_of[link.source], chain_of[link.target]);
            if parent == child {
                continue;
            }
            family_links[chain_family[parent]].push(FamilyLink {
                parent: local_index[parent],
                child: local_index[child],
                year: link.year,
            });
        }

        let mut chain_lane = vec![0; chains.len()];
        let mut family_top = Vec::with_capacity(families.len());
        let mut y = 0.0;

        for (stack, (family, links)) in families.iter().zip(family_links).enumerate() {
            let spans = family
                .chains
                .iter()
                .map(|&c| (chains[c].start, chains[c].end))
                .collect();
            let mut arena = LaneArena::new(spans);
            let family_graph = FamilyGraph::new(family.chains.len(), links);

            let report = SwimlaneOptimizer::new(&family_graph, &self.config.weights).run(&mut arena)?;
            let lane_count = arena.compact();
            debug_assert!(arena.validate(), "family {stack} has overlapping lanes");

            tracing::debug!(
                family = stack,
                chains = family.chains.len(),
                lanes = lane_count,
                passes = report.passes,
                moves = report.moves,
                converged = report.converged,
                "placed family"
            );

            for (local, &chain) in family.chains.iter().enumerate() {
                chain_lane[chain] = arena.lane_of(local).map_or(0, |l| l as usize);
            }
            family_top.push(y);
            y += lane_count as f64 * row_height;
        }

        Ok(LanePlacement {
            chain_lane,
            chain_family,
            family_top,
            total_height: y,
        })
    }
}

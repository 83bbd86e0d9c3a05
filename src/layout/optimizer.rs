//! Swimlane assignment: hierarchical initial placement followed by local search.

use std::collections::VecDeque;

use crate::config::CostWeights;
use crate::error::LaneCollision;

use super::cost::{mean_lane, ChainCost, FamilyGraph};
use super::lanes::LaneArena;

/// Spiral offsets tried before giving up and opening a new lane.
const MAX_SPIRAL_OFFSET: i32 = 100;
/// Candidate offsets around the current lane.
const NEIGHBOURHOOD: i32 = 50;
/// Candidate offsets around the mean parent and mean child lanes.
const MEAN_RADIUS: i32 = 10;

const PASSES_PER_CHAIN: usize = 10;
const MIN_PASSES: usize = 50;
const MAX_PASSES: usize = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchReport {
    pub passes: usize,
    pub moves: usize,
    pub converged: bool,
}

pub struct SwimlaneOptimizer<'a> {
    graph: &'a FamilyGraph,
    weights: &'a CostWeights,
}

impl<'a> SwimlaneOptimizer<'a> {
    pub fn new(graph: &'a FamilyGraph, weights: &'a CostWeights) -> Self {
        Self { graph, weights }
    }

    /// Place every chain, then improve the placement until a pass makes no move.
    pub fn run(&self, arena: &mut LaneArena) -> Result<SearchReport, LaneCollision> {
        self.place_initial(arena)?;
        self.local_search(arena)
    }

    /// Breadth-first placement from the roots, each chain near its parents.
    pub fn place_initial(&self, arena: &mut LaneArena) -> Result<(), LaneCollision> {
        let n = arena.len();
        let starts: Vec<i32> = (0..n).map(|c| arena.span(c).0).collect();
        let by_start = |c: &usize| (starts[*c], *c);

        let mut roots: Vec<usize> = (0..n).filter(|&c| self.graph.parents[c].is_empty()).collect();
        roots.sort_by_key(by_start);

        let mut queued = vec![false; n];
        for &r in &roots {
            queued[r] = true;
        }
        let mut queue: VecDeque<usize> = roots.into();
        let mut placed = 0;

        while placed < n {
            let chain = match queue.pop_front() {
                Some(c) => c,
                None => {
                    // Only parent cycles are left; restart from the earliest of them.
                    let Some(c) = (0..n).filter(|&c| arena.lane_of(c).is_none()).min_by_key(by_start)
                    else {
                        break;
                    };
                    c
                }
            };
            if arena.lane_of(chain).is_some() {
                continue;
            }

            let target = mean_lane(arena, &self.graph.parents[chain]).map_or(0, nearest_lane);
            let lane = spiral_lane(arena, chain, target);
            arena.place(chain, lane)?;
            placed += 1;

            let mut children: Vec<usize> = self.graph.children[chain]
                .iter()
                .copied()
                .filter(|&c| !queued[c])
                .collect();
            children.sort_by_key(by_start);
            for c in children {
                queued[c] = true;
                queue.push_back(c);
            }
        }

        Ok(())
    }

    /// First-improvement local search over rotating visit orders.
    pub fn local_search(&self, arena: &mut LaneArena) -> Result<SearchReport, LaneCollision> {
        let n = arena.len();
        let mut report = SearchReport::default();
        if n == 0 {
            report.converged = true;
            return Ok(report);
        }

        let mut ascending: Vec<usize> = (0..n).collect();
        ascending.sort_by_key(|&c| (arena.span(c).0, c));
        let mut descending: Vec<usize> = (0..n).collect();
        descending.sort_by(|&a, &b| {
            arena.span(b).0.cmp(&arena.span(a).0).then_with(|| a.cmp(&b))
        });
        let mut hubs: Vec<usize> = (0..n).collect();
        hubs.sort_by(|&a, &b| {
            self.graph
                .degree(b)
                .cmp(&self.graph.degree(a))
                .then_with(|| arena.span(a).0.cmp(&arena.span(b).0))
                .then_with(|| a.cmp(&b))
        });

        let max_passes = (n * PASSES_PER_CHAIN).clamp(MIN_PASSES, MAX_PASSES);

        for pass in 0..max_passes {
            let order = match pass % 3 {
                0 => &ascending,
                1 => &descending,
                _ => &hubs,
            };

            let mut moves = 0;
            for &chain in order {
                if let Some(lane) = self.better_lane(arena, chain) {
                    arena.move_chain(chain, lane)?;
                    tracing::trace!(pass, chain, lane, "moved chain");
                    moves += 1;
                }
            }

            report.passes = pass + 1;
            report.moves += moves;
            if moves == 0 {
                report.converged = true;
                break;
            }
        }

        Ok(report)
    }

    /// First collision-free candidate strictly cheaper than the current lane.
    fn better_lane(&self, arena: &LaneArena, chain: usize) -> Option<i32> {
        let current = arena.lane_of(chain)?;
        let cost = ChainCost::new(arena, self.graph, self.weights, chain);
        let current_cost = cost.at(current);

        candidate_lanes(current, cost.mean_parent(), cost.mean_child())
            .into_iter()
            .filter(|&lane| lane != current)
            .find(|&lane| arena.is_free(lane, chain) && cost.at(lane) < current_cost)
    }
}

/// Nearest free lane to `target`, alternating above and below; a fresh lane if none.
fn spiral_lane(arena: &LaneArena, chain: usize, target: i32) -> i32 {
    for offset in 0..=MAX_SPIRAL_OFFSET {
        if arena.is_free(target + offset, chain) {
            return target + offset;
        }
        if offset > 0 && arena.is_free(target - offset, chain) {
            return target - offset;
        }
    }
    arena.max_lane().map_or(target, |max| max.max(target) + 1)
}

/// Round to the nearest lane, halves upwards.
fn nearest_lane(mean: f64) -> i32 {
    (mean + 0.5).floor() as i32
}

/// Candidate lanes in evaluation order.
fn candidate_lanes(current: i32, mean_parent: Option<f64>, mean_child: Option<f64>) -> Vec<i32> {
    let mut lanes = Vec::with_capacity((NEIGHBOURHOOD * 2 + MEAN_RADIUS * 4 + 2) as usize);
    for d in 1..=NEIGHBOURHOOD {
        lanes.push(current + d);
        lanes.push(current - d);
    }
    for mean in [mean_parent, mean_child].into_iter().flatten() {
        let center = nearest_lane(mean);
        lanes.push(center);
        for d in 1..=MEAN_RADIUS {
            lanes.push(center + d);
            lanes.push(center - d);
        }
    }
    lanes
}

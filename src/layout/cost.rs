//! Lane cost function.
//!
//! Costs are evaluated against an immutable [`LaneArena`] snapshot. The
//! optimizer folds an accepted move into the arena before the next chain is
//! priced, so later chains observe earlier moves.

use crate::config::CostWeights;

use super::lanes::LaneArena;

/// A parent -> child connection between two chains of one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyLink {
    pub parent: usize,
    pub child: usize,
    pub year: i32,
}

/// Chain relations within one family, by family-local chain index.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    pub parents: Vec<Vec<usize>>,
    pub children: Vec<Vec<usize>>,
    /// Parents and children together
    pub related: Vec<Vec<usize>>,
    /// Siblings (shared parent) and spouses (shared child)
    pub kin: Vec<Vec<usize>>,
    /// Chain -> (other chain, event year), one entry per link
    pub connections: Vec<Vec<(usize, i32)>>,
    pub links: Vec<FamilyLink>,
}

impl FamilyGraph {
    pub fn new(chain_count: usize, links: Vec<FamilyLink>) -> Self {
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); chain_count];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); chain_count];
        let mut connections: Vec<Vec<(usize, i32)>> = vec![Vec::new(); chain_count];

        for link in &links {
            parents[link.child].push(link.parent);
            children[link.parent].push(link.child);
            connections[link.parent].push((link.child, link.year));
            connections[link.child].push((link.parent, link.year));
        }
        for list in parents.iter_mut().chain(children.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        let related = (0..chain_count)
            .map(|c| merged(&[parents[c].as_slice(), children[c].as_slice()], c))
            .collect();

        let kin = (0..chain_count)
            .map(|c| {
                let siblings: Vec<usize> = parents[c]
                    .iter()
                    .flat_map(|&p| children[p].iter().copied())
                    .collect();
                let spouses: Vec<usize> = children[c]
                    .iter()
                    .flat_map(|&k| parents[k].iter().copied())
                    .collect();
                merged(&[siblings.as_slice(), spouses.as_slice()], c)
            })
            .collect();

        Self {
            parents,
            children,
            related,
            kin,
            connections,
            links,
        }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Number of distinct chains linked to `chain`.
    pub fn degree(&self, chain: usize) -> usize {
        self.related[chain].len()
    }
}

fn merged(lists: &[&[usize]], exclude: usize) -> Vec<usize> {
    let mut out: Vec<usize> = lists
        .iter()
        .flat_map(|l| l.iter().copied())
        .filter(|&c| c != exclude)
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Mean lane of the placed chains in `chains`.
pub fn mean_lane(arena: &LaneArena, chains: &[usize]) -> Option<f64> {
    let lanes: Vec<i32> = chains.iter().filter_map(|&c| arena.lane_of(c)).collect();
    if lanes.is_empty() {
        None
    } else {
        Some(lanes.iter().map(|&l| l as f64).sum::<f64>() / lanes.len() as f64)
    }
}

/// Everything needed to price one chain on any candidate lane.
///
/// Built once per chain visit from the current snapshot; the parts that do not
/// depend on the candidate lane are precomputed here.
pub struct ChainCost<'a> {
    arena: &'a LaneArena,
    graph: &'a FamilyGraph,
    weights: &'a CostWeights,
    chain: usize,
    mean_parent: Option<f64>,
    mean_child: Option<f64>,
    /// (other chain, its lane, event year)
    connections: Vec<(usize, i32, i32)>,
    /// Foreign connector lane spans (low, high) crossing while this chain is active
    blocking: Vec<(i32, i32)>,
    kin_lanes: Vec<i32>,
}

impl<'a> ChainCost<'a> {
    pub fn new(
        arena: &'a LaneArena,
        graph: &'a FamilyGraph,
        weights: &'a CostWeights,
        chain: usize,
    ) -> Self {
        let (start, end) = arena.span(chain);

        let connections = graph.connections[chain]
            .iter()
            .filter_map(|&(other, year)| Some((other, arena.lane_of(other)?, year)))
            .collect();

        let blocking = graph
            .links
            .iter()
            .filter(|l| l.parent != chain && l.child != chain)
            .filter(|l| start <= l.year && l.year < end)
            .filter_map(|l| {
                let a = arena.lane_of(l.parent)?;
                let b = arena.lane_of(l.child)?;
                Some((a.min(b), a.max(b)))
            })
            .filter(|(lo, hi)| hi - lo > 1)
            .collect();

        let kin_lanes = graph.kin[chain]
            .iter()
            .filter_map(|&k| arena.lane_of(k))
            .collect();

        Self {
            arena,
            graph,
            weights,
            chain,
            mean_parent: mean_lane(arena, &graph.parents[chain]),
            mean_child: mean_lane(arena, &graph.children[chain]),
            connections,
            blocking,
            kin_lanes,
        }
    }

    pub fn mean_parent(&self) -> Option<f64> {
        self.mean_parent
    }

    pub fn mean_child(&self) -> Option<f64> {
        self.mean_child
    }

    /// Total cost of putting the chain on `lane`.
    pub fn at(&self, lane: i32) -> f64 {
        self.attraction(lane)
            + self.cut_through(lane)
            + self.blocker(lane)
            + self.lane_sharing(lane)
            + self.y_shape(lane)
    }

    fn attraction(&self, lane: i32) -> f64 {
        let l = lane as f64;
        let pull = |mean: Option<f64>| mean.map_or(0.0, |m| (l - m) * (l - m));
        self.weights.attraction * (pull(self.mean_parent) + pull(self.mean_child))
    }

    fn cut_through(&self, lane: i32) -> f64 {
        let mut crossed = 0usize;
        for &(other, other_lane, year) in &self.connections {
            let (lo, hi) = (lane.min(other_lane), lane.max(other_lane));
            for between in lo + 1..hi {
                let occupied = self.arena.occupants(between).iter().any(|iv| {
                    iv.chain != self.chain && iv.chain != other && iv.active_at(year)
                });
                if occupied {
                    crossed += 1;
                }
            }
        }
        self.weights.cut_through * crossed as f64
    }

    fn blocker(&self, lane: i32) -> f64 {
        let blocked = self
            .blocking
            .iter()
            .filter(|&&(lo, hi)| lo < lane && lane < hi)
            .count();
        self.weights.blocker * blocked as f64
    }

    fn lane_sharing(&self, lane: i32) -> f64 {
        let (start, end) = self.arena.span(self.chain);
        let related = &self.graph.related[self.chain];

        let nearest = self
            .arena
            .occupants(lane)
            .iter()
            .filter(|iv| iv.chain != self.chain && related.binary_search(&iv.chain).is_err())
            .map(|iv| iv.start.saturating_sub(end).max(start.saturating_sub(iv.end)).max(0))
            .min();

        match nearest {
            Some(gap) => self.weights.lane_sharing / (gap as f64).max(self.weights.sharing_min_gap),
            None => 0.0,
        }
    }

    fn y_shape(&self, lane: i32) -> f64 {
        let close = self
            .kin_lanes
            .iter()
            .filter(|&&k| (k - lane).abs() < self.weights.y_shape_distance)
            .count();
        self.weights.y_shape * close as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights_only(f: impl FnOnce(&mut CostWeights)) -> CostWeights {
        let mut w = CostWeights {
            attraction: 0.0,
            cut_through: 0.0,
            blocker: 0.0,
            lane_sharing: 0.0,
            y_shape: 0.0,
            ..CostWeights::default()
        };
        f(&mut w);
        w
    }

    #[test]
    fn test_family_graph_relations() {
        // 0 and 1 merge into 2; 2 splits into 3 and 4
        let links = vec![
            FamilyLink { parent: 0, child: 2, year: 2000 },
            FamilyLink { parent: 1, child: 2, year: 2000 },
            FamilyLink { parent: 2, child: 3, year: 2010 },
            FamilyLink { parent: 2, child: 4, year: 2010 },
        ];
        let graph = FamilyGraph::new(5, links);

        assert_eq!(graph.parents[2], vec![0, 1]);
        assert_eq!(graph.children[2], vec![3, 4]);
        assert_eq!(graph.kin[0], vec![1]);
        assert_eq!(graph.kin[3], vec![4]);
        assert_eq!(graph.degree(2), 4);
    }

    #[test]
    fn test_attraction_is_quadratic() {
        let graph = FamilyGraph::new(2, vec![FamilyLink { parent: 0, child: 1, year: 2000 }]);
        let mut arena = LaneArena::new(vec![(1990, 2000), (2000, 2010)]);
        arena.place(0, 0).unwrap();
        arena.place(1, 0).unwrap();
        let weights = weights_only(|w| w.attraction = 1.0);
        let cost = ChainCost::new(&arena, &graph, &weights, 1);

        assert_eq!(cost.at(0), 0.0);
        assert_eq!(cost.at(2), 4.0);
        assert_eq!(cost.at(-3), 9.0);
    }

    #[test]
    fn test_cut_through_counts_active_occupants() {
        // 0 -> 1 at 2000; chain 2 sits on lane 1 and is active in 2000
        let graph = FamilyGraph::new(3, vec![FamilyLink { parent: 0, child: 1, year: 2000 }]);
        let mut arena = LaneArena::new(vec![(1990, 2000), (2000, 2010), (1995, 2005)]);
        arena.place(0, 0).unwrap();
        arena.place(1, 3).unwrap();
        arena.place(2, 1).unwrap();
        let weights = weights_only(|w| w.cut_through = 1.0);
        let cost = ChainCost::new(&arena, &graph, &weights, 1);

        assert_eq!(cost.at(3), 1.0);
        assert_eq!(cost.at(1), 0.0);
    }

    #[test]
    fn test_blocker_excludes_own_edges() {
        let graph = FamilyGraph::new(3, vec![FamilyLink { parent: 0, child: 1, year: 2000 }]);
        let mut arena = LaneArena::new(vec![(1990, 2000), (2000, 2010), (1995, 2005)]);
        arena.place(0, 0).unwrap();
        arena.place(1, 4).unwrap();
        arena.place(2, 6).unwrap();
        let weights = weights_only(|w| w.blocker = 1.0);

        let bystander = ChainCost::new(&arena, &graph, &weights, 2);
        assert_eq!(bystander.at(2), 1.0);
        assert_eq!(bystander.at(4), 0.0);
        assert_eq!(bystander.at(6), 0.0);

        let endpoint = ChainCost::new(&arena, &graph, &weights, 1);
        assert_eq!(endpoint.at(2), 0.0);
    }

    #[test]
    fn test_lane_sharing_decays_with_gap() {
        let graph = FamilyGraph::new(3, vec![]);
        let mut arena = LaneArena::new(vec![(1990, 2000), (2000, 2010), (2004, 2010)]);
        arena.place(0, 0).unwrap();
        arena.place(1, 1).unwrap();
        arena.place(2, 2).unwrap();
        let weights = weights_only(|w| w.lane_sharing = 1.0);
        let cost = ChainCost::new(&arena, &graph, &weights, 0);

        // touching stranger: gap 0 floored at 0.5
        assert_eq!(cost.at(1), 2.0);
        // four year gap
        assert_eq!(cost.at(2), 0.25);
        assert_eq!(cost.at(3), 0.0);
    }

    #[test]
    fn test_lane_sharing_ignores_relatives() {
        let graph = FamilyGraph::new(2, vec![FamilyLink { parent: 0, child: 1, year: 2000 }]);
        let mut arena = LaneArena::new(vec![(1990, 2000), (2000, 2010)]);
        arena.place(0, 0).unwrap();
        arena.place(1, 0).unwrap();
        let weights = weights_only(|w| w.lane_sharing = 1.0);

        assert_eq!(ChainCost::new(&arena, &graph, &weights, 1).at(0), 0.0);
    }

    #[test]
    fn test_y_shape_penalizes_bunched_siblings() {
        let links = vec![
            FamilyLink { parent: 0, child: 1, year: 2000 },
            FamilyLink { parent: 0, child: 2, year: 2000 },
        ];
        let graph = FamilyGraph::new(3, links);
        let mut arena = LaneArena::new(vec![(1990, 2000), (2000, 2010), (2000, 2010)]);
        arena.place(0, 0).unwrap();
        arena.place(1, -1).unwrap();
        arena.place(2, 1).unwrap();
        let weights = weights_only(|w| w.y_shape = 1.0);
        let cost = ChainCost::new(&arena, &graph, &weights, 2);

        assert_eq!(cost.at(1), 0.0);
        assert_eq!(cost.at(0), 1.0);
        assert_eq!(cost.at(-2), 1.0);
    }
}

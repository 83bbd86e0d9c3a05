//! Grouping of chains into independently laid out families.

use std::collections::VecDeque;

use crate::graph::TimelineGraph;

use super::types::{Chain, Family};

/// Chain id -> linked chain ids (either direction), ascending, no duplicates.
pub fn chain_adjacency(
    graph: &TimelineGraph,
    chains: &[Chain],
    chain_of: &[usize],
) -> Vec<Vec<usize>> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); chains.len()];

    for link in &graph.links {
        let a = chain_of[link.source];
        let b = chain_of[link.target];
        if a == b {
            continue;
        }
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    for neighbours in &mut adjacency {
        neighbours.sort_unstable();
        neighbours.dedup();
    }

    adjacency
}

/// Connected components of the chain graph in stacking order:
/// earliest start first, then larger families, then lowest chain id.
pub fn group_families(chains: &[Chain], adjacency: &[Vec<usize>]) -> Vec<Family> {
    let mut seen = vec![false; chains.len()];
    let mut families: Vec<Family> = Vec::new();

    for root in 0..chains.len() {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        let mut members = Vec::new();
        let mut queue = VecDeque::from([root]);

        while let Some(chain) = queue.pop_front() {
            members.push(chain);
            for &next in &adjacency[chain] {
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }

        members.sort_unstable();
        let start = members
            .iter()
            .map(|&c| chains[c].start)
            .min()
            .unwrap_or_default();
        families.push(Family {
            id: root,
            chains: members,
            start,
        });
    }

    families.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.chains.len().cmp(&a.chains.len()))
            .then_with(|| a.id.cmp(&b.id))
    });

    families
}

//! Decomposition of the entity graph into chains.

use crate::graph::TimelineGraph;

use super::types::{Chain, ChainOrigin};

/// True when `node` cannot continue its predecessor's chain.
fn starts_chain(graph: &TimelineGraph, node: usize) -> bool {
    let preds = &graph.preds[node];
    match preds.as_slice() {
        [pred] => {
            graph.succs[*pred].len() > 1
                || graph.entities[*pred].inferred_end() > graph.entities[node].founding_year
        }
        _ => true,
    }
}

/// Split the graph into maximal linear, non-overlapping runs.
///
/// `occupancy_end` gives, per entity, the year it stops occupying its lane;
/// a chain spans from its first node's founding to the latest of those.
pub fn build_chains(graph: &TimelineGraph, occupancy_end: &[i32]) -> Vec<Chain> {
    let mut order: Vec<usize> = (0..graph.len()).collect();
    order.sort_by(|&a, &b| {
        let ea = &graph.entities[a];
        let eb = &graph.entities[b];
        ea.founding_year
            .cmp(&eb.founding_year)
            .then_with(|| ea.id.cmp(&eb.id))
    });

    let mut visited = vec![false; graph.len()];
    let mut chains: Vec<Chain> = Vec::new();

    for &head in &order {
        if visited[head] || !starts_chain(graph, head) {
            continue;
        }
        visited[head] = true;
        let mut nodes = vec![head];
        let mut current = head;

        while let [next] = graph.succs[current].as_slice() {
            let next = *next;
            if visited[next] || starts_chain(graph, next) {
                break;
            }
            visited[next] = true;
            nodes.push(next);
            current = next;
        }

        chains.push(make_chain(graph, chains.len(), nodes, occupancy_end, ChainOrigin::Traversal));
    }

    // Nodes only reachable through cycles never satisfy `starts_chain`.
    for &node in &order {
        if visited[node] {
            continue;
        }
        visited[node] = true;
        chains.push(make_chain(graph, chains.len(), vec![node], occupancy_end, ChainOrigin::Leftover));
    }

    chains
}

fn make_chain(
    graph: &TimelineGraph,
    id: usize,
    nodes: Vec<usize>,
    occupancy_end: &[i32],
    origin: ChainOrigin,
) -> Chain {
    let start = nodes
        .iter()
        .map(|&n| graph.entities[n].founding_year)
        .min()
        .unwrap_or_default();
    let end = nodes
        .iter()
        .map(|&n| occupancy_end[n])
        .max()
        .unwrap_or(start)
        .max(start);

    Chain {
        id,
        nodes,
        start,
        end,
        origin,
    }
}

/// Entity index -> chain id.
pub fn chain_of_node(chains: &[Chain], node_count: usize) -> Vec<usize> {
    let mut lookup = vec![0; node_count];
    for chain in chains {
        for &node in &chain.nodes {
            lookup[node] = chain.id;
        }
    }
    lookup
}

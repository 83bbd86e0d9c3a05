use std::collections::HashMap;

use lineage_layout::layout::{Band, ConnectorBuilder, LayoutEngine, TimelineLayout};
use lineage_layout::{Entity, LayoutConfig, Link, LinkKind, TimeScale, TimelineInput, YearRange};
use proptest::prelude::*;

const NOW: i32 = 2026;

fn engine() -> LayoutEngine {
    LayoutEngine::new(LayoutConfig {
        current_year: Some(NOW),
        ..LayoutConfig::default()
    })
    .unwrap()
}

fn kind_strategy() -> impl Strategy<Value = LinkKind> {
    prop_oneof![
        Just(LinkKind::Continuation),
        Just(LinkKind::Merge),
        Just(LinkKind::Split),
        Just(LinkKind::LegalTransfer),
        Just(LinkKind::SpiritualSuccession),
    ]
}

/// Random entities with random links, including dirty data (overlaps, cycles).
fn timeline_strategy() -> impl Strategy<Value = TimelineInput> {
    let entity = (1900i32..2020, prop::option::of(0i32..40), 0i32..30);
    (
        prop::collection::vec(entity, 1..14),
        prop::collection::vec((0usize..14, 0usize..14, kind_strategy()), 0..20),
    )
        .prop_map(|(raw_nodes, raw_links)| {
            let nodes: Vec<Entity> = raw_nodes
                .iter()
                .enumerate()
                .map(|(i, &(founded, lifetime, era_offset))| {
                    Entity::new(&format!("e{i}"), founded, lifetime.map(|l| founded + l))
                        .with_eras(&[founded, founded + era_offset])
                })
                .collect();
            let links = raw_links
                .iter()
                .filter(|(s, t, _)| *s < nodes.len() && *t < nodes.len())
                .map(|&(s, t, kind)| {
                    let year = nodes[t].founding_year;
                    Link::new(&nodes[s].id, &nodes[t].id, year, kind)
                })
                .collect();
            TimelineInput { nodes, links }
        })
}

/// Occupied [start, end) in pixels, grouped by (family, lane).
fn lanes_of(layout: &TimelineLayout) -> HashMap<(usize, usize), Vec<(f64, f64)>> {
    let mut lanes: HashMap<(usize, usize), Vec<(f64, f64)>> = HashMap::new();
    for node in &layout.nodes {
        lanes
            .entry((node.family, node.lane))
            .or_default()
            .push((node.x, node.x + node.width));
    }
    lanes
}

proptest! {
    #[test]
    fn lanes_within_family_are_contiguous(input in timeline_strategy()) {
        let layout = engine().layout(&input).unwrap();

        let mut by_family: HashMap<usize, Vec<usize>> = HashMap::new();
        for node in &layout.nodes {
            by_family.entry(node.family).or_default().push(node.lane);
        }
        for lanes in by_family.values_mut() {
            lanes.sort_unstable();
            lanes.dedup();
            let expected: Vec<usize> = (0..lanes.len()).collect();
            prop_assert_eq!(lanes.clone(), expected);
        }
    }

    #[test]
    fn layout_is_deterministic(input in timeline_strategy()) {
        let a = serde_json::to_string(&engine().layout(&input).unwrap()).unwrap();
        let b = serde_json::to_string(&engine().layout(&input.clone()).unwrap()).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn geometry_is_finite(input in timeline_strategy()) {
        let layout = engine().layout(&input).unwrap();
        for node in &layout.nodes {
            prop_assert!(node.x.is_finite() && node.y.is_finite());
            prop_assert!(node.width >= 0.0 && node.width.is_finite());
        }
        for link in &layout.links {
            if let Some(path) = &link.path {
                prop_assert!(!path.contains("NaN") && !path.contains("inf"));
            }
        }
    }

    #[test]
    fn connector_outline_is_closed(
        sy in 0.0f64..500.0,
        ty in 0.0f64..500.0,
        sx in 40.0f64..600.0,
        tx in 40.0f64..600.0,
        year in 1900i32..2000,
    ) {
        let scale = TimeScale::new(YearRange { min: 1900, max: 2000 }, 1080.0, 40.0, 1.0);
        let source = Band { x: sx, y: sy, width: 300.0, height: 18.0 };
        let target = Band { x: tx, y: ty, width: 300.0, height: 18.0 };
        let path = ConnectorBuilder::new(2.0, 0.2)
            .build(source, target, false, year, LinkKind::Merge, &scale)
            .unwrap();

        let outline = path.closed_outline();
        prop_assert_eq!(outline.start, outline.end());
        prop_assert!(path.anchors.waist_bottom.1 > path.anchors.waist_top.1);
    }
}

#[test]
fn dissolved_chains_never_overlap_on_a_lane() {
    // Dissolved singleton chains, so node extents equal lane occupancy exactly.
    let nodes: Vec<Entity> = (0..12)
        .map(|i| {
            let founded = 1950 + (i * 7) % 30;
            Entity::new(&format!("n{i}"), founded, Some(founded + 5 + (i * 11) % 30))
        })
        .collect();
    let links = vec![
        Link::new("n0", "n3", 1971, LinkKind::Merge),
        Link::new("n1", "n3", 1971, LinkKind::Merge),
        Link::new("n3", "n5", 1985, LinkKind::Split),
        Link::new("n3", "n6", 1992, LinkKind::Split),
        Link::new("n2", "n7", 1999, LinkKind::LegalTransfer),
    ];
    let layout = engine().layout(&TimelineInput { nodes, links }).unwrap();

    for spans in lanes_of(&layout).values_mut() {
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in spans.windows(2) {
            assert!(pair[0].1 <= pair[1].0 + 1e-9, "overlap {:?}", pair);
        }
    }
}

#[test]
fn merge_target_sits_near_its_parents() {
    let input = TimelineInput {
        nodes: vec![
            Entity::new("a", 1950, Some(1999)),
            Entity::new("b", 1955, Some(1999)),
            Entity::new("c", 1960, Some(1999)),
            Entity::new("d", 2000, None).with_eras(&[2026]),
        ],
        links: vec![
            Link::new("a", "d", 2000, LinkKind::Merge),
            Link::new("b", "d", 2000, LinkKind::Merge),
            Link::new("c", "d", 2000, LinkKind::Merge),
        ],
    };
    let layout = engine().layout(&input).unwrap();

    let lane = |id: &str| layout.node(id).unwrap().lane as f64;
    let mean = (lane("a") + lane("b") + lane("c")) / 3.0;
    assert!((lane("d") - mean).abs() <= 1.0);
    assert_eq!(layout.nodes.iter().map(|n| n.family).max(), Some(0));
}

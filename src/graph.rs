//! Index-based view of the input: entities by position, links resolved to indices.

use std::collections::HashMap;

use crate::error::LayoutError;
use crate::model::{Entity, Link, LinkKind, TimelineInput};

/// A link whose endpoints both resolved.
#[derive(Debug, Clone)]
pub struct GraphLink {
    pub source: usize,
    pub target: usize,
    pub year: i32,
    pub kind: LinkKind,
    /// Index into TimelineInput.links
    pub input_index: usize,
}

#[derive(Debug, Clone)]
pub struct TimelineGraph<'a> {
    pub entities: &'a [Entity],
    pub links: Vec<GraphLink>,
    /// Entity index -> distinct predecessor indices, first-seen order
    pub preds: Vec<Vec<usize>>,
    /// Entity index -> distinct successor indices, first-seen order
    pub succs: Vec<Vec<usize>>,
}

impl<'a> TimelineGraph<'a> {
    pub fn build(input: &'a TimelineInput) -> Result<Self, LayoutError> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        for (i, entity) in input.nodes.iter().enumerate() {
            if index.insert(entity.id.as_str(), i).is_some() {
                return Err(LayoutError::DuplicateEntity(entity.id.clone()));
            }
        }

        let n = input.nodes.len();
        let mut links = Vec::with_capacity(input.links.len());
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut succs: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (input_index, link) in input.links.iter().enumerate() {
            let Some((source, target)) = resolve(&index, link) else {
                continue;
            };

            if !succs[source].contains(&target) {
                succs[source].push(target);
            }
            if !preds[target].contains(&source) {
                preds[target].push(source);
            }

            links.push(GraphLink {
                source,
                target,
                year: link.year,
                kind: link.kind(),
                input_index,
            });
        }

        Ok(Self {
            entities: &input.nodes,
            links,
            preds,
            succs,
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn resolve(index: &HashMap<&str, usize>, link: &Link) -> Option<(usize, usize)> {
    let source = index.get(link.source.as_str()).copied();
    let target = index.get(link.target.as_str()).copied();

    match (source, target) {
        (Some(s), Some(t)) if s == t => {
            tracing::warn!(entity = %link.source, "dropping self-link");
            None
        }
        (Some(s), Some(t)) => Some((s, t)),
        _ => {
            tracing::warn!(
                source = %link.source,
                target = %link.target,
                year = link.year,
                "dropping link to unknown entity"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(nodes: Vec<Entity>, links: Vec<Link>) -> TimelineInput {
        TimelineInput { nodes, links }
    }

    #[test]
    fn test_dangling_links_dropped() {
        let data = input(
            vec![Entity::new("a", 1990, Some(2000)), Entity::new("b", 2001, None)],
            vec![
                Link::new("a", "b", 2001, LinkKind::Continuation),
                Link::new("a", "ghost", 2001, LinkKind::Split),
                Link::new("a", "a", 1995, LinkKind::Continuation),
            ],
        );
        let graph = TimelineGraph::build(&data).unwrap();

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].input_index, 0);
        assert_eq!(graph.succs[0], vec![1]);
        assert_eq!(graph.preds[1], vec![0]);
    }

    #[test]
    fn test_parallel_links_deduplicated_in_adjacency() {
        let data = input(
            vec![Entity::new("a", 1990, Some(2000)), Entity::new("b", 2001, None)],
            vec![
                Link::new("a", "b", 2001, LinkKind::Continuation),
                Link::new("a", "b", 2001, LinkKind::LegalTransfer),
            ],
        );
        let graph = TimelineGraph::build(&data).unwrap();

        assert_eq!(graph.links.len(), 2);
        assert_eq!(graph.succs[0].len(), 1);
        assert_eq!(graph.preds[1].len(), 1);
    }

    #[test]
    fn test_duplicate_id_is_error() {
        let data = input(
            vec![Entity::new("a", 1990, None), Entity::new("a", 1995, None)],
            vec![],
        );
        assert!(matches!(
            TimelineGraph::build(&data),
            Err(LayoutError::DuplicateEntity(id)) if id == "a"
        ));
    }
}

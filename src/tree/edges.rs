//! Adjacency lookups derived from a tree's edge list.

use std::collections::{HashMap, HashSet};

use super::TalentEdge;

/// Parents, children, undirected neighbors and edge ids, built once per tree.
#[derive(Debug, Clone, Default)]
pub struct EdgeIndex {
    parents: HashMap<u32, Vec<u32>>,
    children: HashMap<u32, Vec<u32>>,
    neighbors: HashMap<u32, HashSet<u32>>,
    edge_ids: HashMap<(u32, u32), u32>,
}

impl EdgeIndex {
    pub fn build<'a>(edges: impl IntoIterator<Item = &'a TalentEdge>) -> Self {
        let mut index = Self::default();
        for edge in edges {
            let (from, to) = (edge.from_node_id, edge.to_node_id);
            index.parents.entry(to).or_default().push(from);
            index.children.entry(from).or_default().push(to);
            index.neighbors.entry(from).or_default().insert(to);
            index.neighbors.entry(to).or_default().insert(from);
            index.edge_ids.insert((from, to), edge.id);
        }
        index
    }

    pub fn parents(&self, node_id: u32) -> &[u32] {
        self.parents.get(&node_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn children(&self, node_id: u32) -> &[u32] {
        self.children.get(&node_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn are_neighbors(&self, a: u32, b: u32) -> bool {
        self.neighbors.get(&a).is_some_and(|n| n.contains(&b))
    }

    pub fn neighbors(&self, node_id: u32) -> impl Iterator<Item = u32> + '_ {
        self.neighbors.get(&node_id).into_iter().flatten().copied()
    }

    /// Id of the edge `from -> to`, if there is one.
    pub fn edge_id(&self, from: u32, to: u32) -> Option<u32> {
        self.edge_ids.get(&(from, to)).copied()
    }
}

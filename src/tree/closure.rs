//! Transitive prerequisite and dependent sets.
//!
//! Both walks include the starting node and visit each node once, so they
//! terminate even on malformed data that contains a cycle.

use std::collections::{BTreeSet, VecDeque};

use super::EdgeIndex;

/// `node_id` plus every transitive ancestor.
pub fn prerequisite_closure(node_id: u32, index: &EdgeIndex) -> BTreeSet<u32> {
    walk(node_id, |id| index.parents(id))
}

/// `node_id` plus every transitive descendant.
pub fn dependent_closure(node_id: u32, index: &EdgeIndex) -> BTreeSet<u32> {
    walk(node_id, |id| index.children(id))
}

fn walk<'a>(start: u32, next: impl Fn(u32) -> &'a [u32]) -> BTreeSet<u32> {
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(id) = queue.pop_front() {
        for &other in next(id) {
            if seen.insert(other) {
                queue.push_back(other);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TalentEdge;

    fn index(pairs: &[(u32, u32)]) -> EdgeIndex {
        let edges: Vec<TalentEdge> = pairs
            .iter()
            .enumerate()
            .map(|(i, &(from, to))| TalentEdge {
                id: i as u32,
                from_node_id: from,
                to_node_id: to,
                visual_style: 0,
            })
            .collect();
        EdgeIndex::build(&edges)
    }

    #[test]
    fn test_prerequisites_follow_every_parent() {
        //   1   2
        //    \ /
        //     3
        //     |
        //     4
        let idx = index(&[(1, 3), (2, 3), (3, 4)]);
        assert_eq!(prerequisite_closure(4, &idx), BTreeSet::from([1, 2, 3, 4]));
        assert_eq!(prerequisite_closure(1, &idx), BTreeSet::from([1]));
    }

    #[test]
    fn test_dependents_fan_out() {
        let idx = index(&[(1, 2), (1, 3), (3, 4), (5, 4)]);
        assert_eq!(dependent_closure(1, &idx), BTreeSet::from([1, 2, 3, 4]));
        assert_eq!(dependent_closure(5, &idx), BTreeSet::from([4, 5]));
    }

    #[test]
    fn test_cycle_terminates() {
        let idx = index(&[(1, 2), (2, 1)]);
        assert_eq!(dependent_closure(1, &idx), BTreeSet::from([1, 2]));
    }
}

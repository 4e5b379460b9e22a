//! Loadout strings: a compact, URL-safe encoding of a selection.
//!
//! Layout (LSB-first bit stream, see [`stream`]):
//!
//! | field        | bits | notes                                   |
//! |--------------|------|-----------------------------------------|
//! | version      | 8    | [`LOADOUT_VERSION`]                      |
//! | tree id      | 32   |                                         |
//! | node count   | 16   |                                         |
//! | per node:    |      | ascending node id                       |
//! | id delta     | var  | 7-bit groups + continuation bit         |
//! | ranks        | 6    |                                         |
//! | has choice   | 1    |                                         |
//! | choice index | 2    | only when has choice is set             |
//!
//! Decoding is all-or-nothing: the payload is parsed and checked against the
//! loaded tree before any [`SelectionState`] is produced.

mod stream;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::selection::{PointsSpent, Selection, SelectionState};
use crate::tree::{TalentTree, TreeKind};
use stream::{ExportStream, ImportStream};

pub const LOADOUT_VERSION: u8 = 1;

const BIT_WIDTH_VERSION: u32 = 8;
const BIT_WIDTH_TREE_ID: u32 = 32;
const BIT_WIDTH_NODE_COUNT: u32 = 16;
const BIT_WIDTH_RANKS: u32 = 6;
const BIT_WIDTH_CHOICE_INDEX: u32 = 2;

/// Why a loadout string could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("loadout string is empty")]
    Empty,

    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { position: usize, character: char },

    #[error("loadout string ends early")]
    Truncated,

    #[error("malformed loadout: {0}")]
    Malformed(&'static str),

    #[error("unsupported loadout version {0}")]
    UnsupportedVersion(u8),

    #[error("loadout is for tree {found}, but tree {expected} is loaded")]
    TreeMismatch { expected: u32, found: u32 },

    #[error("node {0} is not part of this tree")]
    UnknownNode(u32),

    #[error("node {0} appears twice")]
    DuplicateNode(u32),

    #[error("node {node} has {ranks} ranks (max {max})")]
    InvalidRanks { node: u32, ranks: u8, max: u8 },

    #[error("node {node} has invalid choice {choice:?}")]
    InvalidChoice { node: u32, choice: Option<u8> },

    #[error("node {node} is selected without prerequisite {prerequisite}")]
    MissingPrerequisite { node: u32, prerequisite: u32 },

    #[error("loadout mixes hero sub-trees {first} and {second}")]
    MixedSubTrees { first: u32, second: u32 },

    #[error("{0} points exceed the limit")]
    PointLimitExceeded(TreeKind),

    #[error("unexpected data after the last node")]
    TrailingData,
}

/// Serialize the selected nodes of `state` for tree `tree_id`.
pub fn encode(state: &SelectionState, tree_id: u32) -> String {
    let mut out = ExportStream::new();
    out.add_value(BIT_WIDTH_VERSION, u64::from(LOADOUT_VERSION));
    out.add_value(BIT_WIDTH_TREE_ID, u64::from(tree_id));
    // Selections only hold visible nodes and trees are capped at MAX_TREE_NODES.
    out.add_value(BIT_WIDTH_NODE_COUNT, state.len() as u64);

    let mut prev = 0;
    for (id, selection) in state.iter() {
        out.add_varint(id - prev);
        prev = id;
        out.add_value(BIT_WIDTH_RANKS, u64::from(selection.ranks_purchased));
        match selection.choice_index {
            Some(choice) => {
                out.add_value(1, 1);
                out.add_value(BIT_WIDTH_CHOICE_INDEX, u64::from(choice));
            }
            None => out.add_value(1, 0),
        }
    }
    out.finish()
}

/// Parse `input` and validate it against `tree`.
pub fn decode(input: &str, tree: &TalentTree) -> Result<SelectionState, DecodeError> {
    let nodes = parse(input.trim(), tree.tree_id)?;
    validate(tree, &nodes)?;
    Ok(SelectionState::from_selections(tree, nodes))
}

fn parse(input: &str, expected_tree: u32) -> Result<BTreeMap<u32, Selection>, DecodeError> {
    let mut stream = ImportStream::new(input)?;

    let version = stream.extract_value(BIT_WIDTH_VERSION)? as u8;
    if version != LOADOUT_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let tree_id = stream.extract_value(BIT_WIDTH_TREE_ID)? as u32;
    if tree_id != expected_tree {
        return Err(DecodeError::TreeMismatch {
            expected: expected_tree,
            found: tree_id,
        });
    }
    let count = stream.extract_value(BIT_WIDTH_NODE_COUNT)?;

    let mut nodes = BTreeMap::new();
    let mut prev: Option<u32> = None;
    for _ in 0..count {
        let delta = stream.extract_varint()?;
        let id = match prev {
            None => delta,
            Some(p) if delta == 0 => return Err(DecodeError::DuplicateNode(p)),
            Some(p) => p
                .checked_add(delta)
                .ok_or(DecodeError::Malformed("node id out of range"))?,
        };
        prev = Some(id);

        let ranks_purchased = stream.extract_value(BIT_WIDTH_RANKS)? as u8;
        let choice_index = if stream.extract_value(1)? == 1 {
            Some(stream.extract_value(BIT_WIDTH_CHOICE_INDEX)? as u8)
        } else {
            None
        };
        nodes.insert(
            id,
            Selection {
                ranks_purchased,
                choice_index,
            },
        );
    }

    stream.finish()?;
    Ok(nodes)
}

fn validate(tree: &TalentTree, nodes: &BTreeMap<u32, Selection>) -> Result<(), DecodeError> {
    let mut hero_sub_tree: Option<u32> = None;
    for (&id, selection) in nodes {
        let node = tree.node(id).ok_or(DecodeError::UnknownNode(id))?;

        if node.is_hero() {
            match hero_sub_tree {
                Some(first) if first != node.sub_tree_id => {
                    return Err(DecodeError::MixedSubTrees {
                        first,
                        second: node.sub_tree_id,
                    });
                }
                _ => hero_sub_tree = Some(node.sub_tree_id),
            }
        }

        if selection.ranks_purchased == 0 || selection.ranks_purchased > node.max_ranks {
            return Err(DecodeError::InvalidRanks {
                node: id,
                ranks: selection.ranks_purchased,
                max: node.max_ranks,
            });
        }

        let choice_ok = match selection.choice_index {
            Some(choice) => node.is_choice() && usize::from(choice) < node.entries.len(),
            None => !node.is_choice(),
        };
        if !choice_ok {
            return Err(DecodeError::InvalidChoice {
                node: id,
                choice: selection.choice_index,
            });
        }

        for &parent in tree.edge_index().parents(id) {
            if !nodes.contains_key(&parent) {
                return Err(DecodeError::MissingPrerequisite {
                    node: id,
                    prerequisite: parent,
                });
            }
        }
    }

    let spent = PointsSpent::compute(tree, nodes);
    let limits = tree.point_limits();
    if let Some(kind) = TreeKind::ALL
        .into_iter()
        .find(|&kind| spent.get(kind) > limits.get(kind))
    {
        return Err(DecodeError::PointLimitExceeded(kind));
    }
    Ok(())
}

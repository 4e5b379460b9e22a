//! Talent Calculator
//!
//! Allocates limited talent points across a directed graph of unlockable nodes,
//! enforcing prerequisites and per-category point limits, with bounded
//! undo/redo and a compact, URL-safe loadout string for sharing selections.

pub mod budget;
pub mod calculator;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod library;
pub mod loadout;
pub mod selection;
pub mod tree;

pub use calculator::Calculator;
pub use engine::{MutationOutcome, RejectReason, TalentEngine};
pub use error::{Error, Result};
pub use loadout::DecodeError;
pub use selection::{PointsSpent, Selection, SelectionState};
pub use tree::{PointLimits, TalentTree, TreeError, TreeKind};

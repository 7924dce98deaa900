#![deny(missing_docs)]

//! # Manifest Patching
//!
//! Utilities for registering a file in a manifest string.
//!
//! - **anchor**: Resolving where in a section a new line goes.
//! - **insert**: Splicing a line into a text snapshot.
//! - **stage**: The state machine one registration walks through.
//! - **workflows**: The four-section registration recipe.

/// Anchor policies and their resolution.
pub mod anchor;

/// Pure line insertion.
pub mod insert;

/// Registration state machine.
pub mod stage;

/// High-level patching workflows.
pub mod workflows;

pub use anchor::{Anchor, AnchorPolicy, InsertPoint};
pub use insert::insert_line_after;
pub use stage::PatchStage;
pub use workflows::{register, EntryIds, InsertedEntry, PatchOutcome, PatchedManifest};

#![deny(missing_docs)]

//! # Object Identifiers
//!
//! Every object in a project manifest is keyed by a 24 digit uppercase hex
//! token. New tokens are drawn from a random source and checked against the
//! tokens already present in the manifest, so an accidental collision is
//! retried instead of silently aliasing an existing object.

use crate::error::{AppError, AppResult};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

/// Width of a manifest object identifier.
pub const ID_WIDTH: usize = 24;

/// Draws attempted before the allocator gives up.
const MAX_ATTEMPTS: usize = 16;

/// An opaque manifest object identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Validates and wraps a raw identifier.
    pub fn parse(raw: &str) -> AppResult<Self> {
        if raw.len() == ID_WIDTH
            && raw
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        {
            Ok(ObjectId(raw.to_string()))
        } else {
            Err(AppError::General(format!(
                "'{}' is not a {}-digit uppercase hex identifier",
                raw, ID_WIDTH
            )))
        }
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A source of candidate identifiers.
///
/// Abstracted so tests can feed deterministic (or deliberately colliding)
/// sequences to the allocator.
pub trait IdSource {
    /// Returns the next candidate identifier.
    fn next_id(&mut self) -> ObjectId;
}

/// Random identifiers derived from UUID v4, truncated to [`ID_WIDTH`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> ObjectId {
        let hex = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
        ObjectId(hex[..ID_WIDTH].to_string())
    }
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[0-9A-F]{24}\b").expect("Invalid regex"))
}

/// Collects every identifier-shaped token present in the manifest.
pub fn existing_ids(manifest: &str) -> HashSet<ObjectId> {
    id_pattern()
        .find_iter(manifest)
        .map(|m| ObjectId(m.as_str().to_string()))
        .collect()
}

/// Hands out identifiers that are unique within one manifest.
pub struct IdAllocator<'a, S: IdSource> {
    source: &'a mut S,
    taken: HashSet<ObjectId>,
}

impl<'a, S: IdSource> IdAllocator<'a, S> {
    /// Creates an allocator that avoids every identifier already in `manifest`.
    pub fn new(manifest: &str, source: &'a mut S) -> Self {
        Self {
            source,
            taken: existing_ids(manifest),
        }
    }

    /// Draws a fresh identifier, retrying on collision.
    pub fn allocate(&mut self) -> AppResult<ObjectId> {
        for _ in 0..MAX_ATTEMPTS {
            let candidate = self.source.next_id();
            if self.taken.insert(candidate.clone()) {
                return Ok(candidate);
            }
            tracing::debug!(id = %candidate, "identifier collision, drawing again");
        }
        Err(AppError::General(format!(
            "Could not allocate a unique identifier after {} attempts",
            MAX_ATTEMPTS
        )))
    }
}

//! §3 `ImportRecord`: an append-only collection whose growth is
//! authoritative. Indices into it, once issued, are stable for the
//! lifetime of the AST — tokens and rules store the `u32` handle, never
//! a reference, mirroring the teacher's preference for indices over
//! pointers when bridging the AST to an external bundler view
//! (`bundler.rs`'s dependency-index bookkeeping).
//!
//! Backed by a plain `Vec`: records are never looked up by value here
//! (that belongs to a downstream bundler), only by the stable index
//! handed out at insertion time, so no hashing/set structure earns its
//! keep in this crate. `indexmap` is still part of the dependency
//! stack — it backs the hash buckets in [`crate::minify`]'s duplicate-
//! rule elimination, where insertion order does matter.

use crate::error::SourcePos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `@import "x.css";` with no trailing media/supports conditions.
    ImportAt,
    /// `@import url(...) screen;` — conditions were present.
    ImportAtConditional,
    /// A `url(...)` token encountered outside `@import` (e.g. inside a
    /// declaration value).
    ImportUrl,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    pub kind: ImportKind,
    pub path: String,
    pub range: (usize, usize),
    pub is_unused: bool,
}

/// Append-only collection of [`ImportRecord`]s for a single parse.
#[derive(Debug, Default)]
pub struct ImportRecords {
    records: Vec<ImportRecord>,
}

impl ImportRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ImportKind, path: String, range: (usize, usize), is_unused: bool) -> u32 {
        let index = self.records.len() as u32;
        self.records.push(ImportRecord { kind, path, range, is_unused });
        index
    }

    pub fn get(&self, index: u32) -> &ImportRecord {
        &self.records[index as usize]
    }

    pub fn into_vec(self) -> Vec<ImportRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn range_start(range: (usize, usize)) -> SourcePos {
    SourcePos(range.0)
}

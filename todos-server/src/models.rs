//! Todo documents and write results
//!
//! A todo is an arbitrary JSON object. The only key this crate owns is `id`,
//! which lives in the collection's primary key and is merged back in on read.

use serde::Serialize;
use serde_json::{Map, Value};

/// Key holding the generated document identifier
pub const ID_KEY: &str = "id";

/// A todo document: string keys to dynamically typed JSON values
pub type Document = Map<String, Value>;

/// Remove any caller-supplied `id` so the stored body never carries one.
///
/// The identifier is generated on insert and immutable afterwards; it is only
/// ever addressed through the path.
pub fn strip_id(mut doc: Document) -> Document {
    doc.remove(ID_KEY);
    doc
}

/// Counters reported by every write against the collection.
///
/// A write addressed to a missing id reports `skipped: 1` rather than an
/// error, so callers cannot tell "absent" from "nothing to do" apart other
/// than by reading the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteResult {
    pub deleted: u64,
    pub errors: u64,
    pub inserted: u64,
    pub replaced: u64,
    pub skipped: u64,
    pub unchanged: u64,
}

impl WriteResult {
    pub fn deleted() -> Self {
        Self {
            deleted: 1,
            ..Self::default()
        }
    }

    pub fn replaced() -> Self {
        Self {
            replaced: 1,
            ..Self::default()
        }
    }

    pub fn unchanged() -> Self {
        Self {
            unchanged: 1,
            ..Self::default()
        }
    }

    pub fn skipped() -> Self {
        Self {
            skipped: 1,
            ..Self::default()
        }
    }

    /// Result of a replace or merge given how many rows matched and changed
    pub fn from_modify(matched: i64, changed: i64) -> Self {
        match (matched, changed) {
            (0, _) => Self::skipped(),
            (_, 0) => Self::unchanged(),
            _ => Self::replaced(),
        }
    }
}

/// Response body for POST /todos
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: String,
}

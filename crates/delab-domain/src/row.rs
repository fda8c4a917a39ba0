//! Tabular representation of posts inside a tree
//!
//! Persistence stores trees as flat rows (`tree_id, post_id, parent_id, text,
//! created_at, author_id, lang, url, author_display_name`). Rows coming back
//! from tabular sources may carry ids as integers, floats or strings; the
//! [`RawId`] type keeps that distinction visible until the ids are normalized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An id exactly as it appeared in tabular input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// Integer id
    Int(i64),

    /// Float-coerced id (e.g. `123.0` after a round trip through a numeric column)
    Float(f64),

    /// String id
    Text(String),
}

/// Representation kind of a [`RawId`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawIdKind {
    /// Integer representation
    Int,
    /// Float representation
    Float,
    /// String representation
    Text,
}

impl fmt::Display for RawIdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RawIdKind::Int => "int",
            RawIdKind::Float => "float",
            RawIdKind::Text => "string",
        };
        f.write_str(name)
    }
}

impl RawId {
    /// Representation kind
    pub fn kind(&self) -> RawIdKind {
        match self {
            RawId::Int(_) => RawIdKind::Int,
            RawId::Float(_) => RawIdKind::Float,
            RawId::Text(_) => RawIdKind::Text,
        }
    }

    /// Whether this value stands for a missing parent
    ///
    /// Stringified nulls (`""`, `"None"`, `"nan"`) and NaN floats are produced
    /// when a root's empty `in_reply_to` field is written through a text column.
    pub fn is_null_marker(&self) -> bool {
        match self {
            RawId::Int(_) => false,
            RawId::Float(f) => f.is_nan(),
            RawId::Text(s) => {
                let s = s.trim();
                s.is_empty() || s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("nan")
            }
        }
    }

    /// Canonical string form
    ///
    /// Integral floats drop their fractional part so `123.0` and `123` map to
    /// the same key. Returns `None` for non-integral or non-finite floats.
    pub fn canonical(&self) -> Option<String> {
        match self {
            RawId::Int(n) => Some(n.to_string()),
            RawId::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(format!("{:.0}", f)),
            RawId::Float(_) => None,
            RawId::Text(s) => Some(s.trim().to_string()),
        }
    }
}

impl From<&str> for RawId {
    fn from(s: &str) -> Self {
        RawId::Text(s.to_string())
    }
}

/// One post of one tree in storage-facing form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRow {
    /// Conversation (tree) identifier
    pub tree_id: String,

    /// Post identifier
    pub post_id: RawId,

    /// Parent identifier, `None` for the root
    #[serde(default)]
    pub parent_id: Option<RawId>,

    /// Plain text content
    pub text: String,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Author identifier
    pub author_id: String,

    /// Language code
    #[serde(default)]
    pub lang: Option<String>,

    /// Permalink
    #[serde(default)]
    pub url: Option<String>,

    /// Display name of the author
    #[serde(default)]
    pub author_display_name: Option<String>,
}

impl PostRow {
    /// Parent id unless it is absent or a stringified null
    pub fn effective_parent(&self) -> Option<&RawId> {
        self.parent_id.as_ref().filter(|p| !p.is_null_marker())
    }
}

//! Conversion between trees and their tabular rows

use crate::{BuildOutcome, ConversationTree, Result, TreeBuilder, TreeError};
use delab_domain::{ParentRef, Platform, PostId, PostRecord, PostRow, RawId, RawIdKind};

fn canonical(id: &RawId) -> Result<PostId> {
    id.canonical()
        .map(PostId::from)
        .ok_or_else(|| TreeError::InvalidId(format!("{:?}", id)))
}

/// Turn the rows of one tree into post records with canonical string ids
///
/// All `post_id` and (non-null) `parent_id` values must share one
/// representation; a tree mixing e.g. float-coerced and string ids fails with
/// [`TreeError::IdTypeInconsistency`] instead of silently comparing `"123"`
/// against `"123.0"`.
pub fn normalize_rows(rows: Vec<PostRow>, platform: Platform) -> Result<Vec<PostRecord>> {
    let mut expected: Option<RawIdKind> = None;
    for row in &rows {
        let ids = std::iter::once(&row.post_id).chain(row.effective_parent());
        for id in ids {
            match expected {
                None => expected = Some(id.kind()),
                Some(kind) if kind != id.kind() => {
                    return Err(TreeError::IdTypeInconsistency {
                        tree_id: row.tree_id.clone(),
                        first: kind,
                        second: id.kind(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    rows.into_iter()
        .map(|row| -> Result<PostRecord> {
            let parent = match row.effective_parent() {
                Some(parent) => ParentRef::Direct(canonical(parent)?),
                None => ParentRef::None,
            };
            Ok(PostRecord {
                id: canonical(&row.post_id)?,
                parent,
                author_id: row.author_id,
                text: row.text,
                created_at: row.created_at,
                platform,
                lang: row.lang,
                url: row.url,
                author_display_name: row.author_display_name,
            })
        })
        .collect()
}

impl ConversationTree {
    /// Rebuild a tree from its rows
    ///
    /// The single row without a parent is the root; the remaining rows go
    /// through the regular builder, so rows may come in any order.
    pub fn from_rows(rows: Vec<PostRow>, platform: Platform) -> Result<BuildOutcome> {
        let tree_id = match rows.first() {
            Some(row) => row.tree_id.clone(),
            None => return Err(TreeError::RootNotFound("<empty>".to_string())),
        };

        let records = normalize_rows(rows, platform)?;
        let (roots, candidates): (Vec<PostRecord>, Vec<PostRecord>) = records
            .into_iter()
            .partition(|record| matches!(record.parent, ParentRef::None));

        let mut roots = roots.into_iter();
        let root = match (roots.next(), roots.len()) {
            (Some(root), 0) => root,
            (None, _) => return Err(TreeError::RootNotFound(tree_id)),
            (Some(_), extra) => {
                return Err(TreeError::MultipleRoots {
                    tree_id,
                    count: extra + 1,
                })
            }
        };

        let mut outcome = TreeBuilder::new().build(root, candidates)?;
        outcome.tree = outcome.tree.with_tree_id(tree_id);
        Ok(outcome)
    }

    /// Flatten the tree into rows in pre-order, ids as strings
    pub fn to_rows(&self) -> Vec<PostRow> {
        self.preorder()
            .into_iter()
            .map(|node| {
                let record = node.record();
                PostRow {
                    tree_id: self.tree_id().to_string(),
                    post_id: RawId::Text(record.id.to_string()),
                    parent_id: node.parent().map(|p| RawId::Text(p.to_string())),
                    text: record.text.clone(),
                    created_at: record.created_at,
                    author_id: record.author_id.clone(),
                    lang: record.lang.clone(),
                    url: record.url.clone(),
                    author_display_name: record.author_display_name.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(tree: &str, id: RawId, parent: Option<RawId>, t: i64) -> PostRow {
        PostRow {
            tree_id: tree.to_string(),
            post_id: id,
            parent_id: parent,
            text: "text".to_string(),
            created_at: Utc.timestamp_opt(t, 0).unwrap(),
            author_id: "a".to_string(),
            lang: Some("en".to_string()),
            url: None,
            author_display_name: None,
        }
    }

    #[test]
    fn test_float_ids_normalize_to_integers() {
        let rows = vec![
            row("t", RawId::Float(1.0), None, 0),
            row("t", RawId::Float(2.0), Some(RawId::Float(1.0)), 1),
        ];
        let records = normalize_rows(rows, Platform::Reddit).unwrap();
        assert_eq!(records[1].id.as_str(), "2");
        assert_eq!(records[1].parent_id().unwrap().as_str(), "1");
    }

    #[test]
    fn test_mixed_id_types_rejected() {
        let rows = vec![
            row("t", RawId::Text("1".into()), None, 0),
            row("t", RawId::Float(2.0), Some(RawId::Text("1".into())), 1),
        ];
        let err = normalize_rows(rows, Platform::Reddit).unwrap_err();
        assert_eq!(
            err,
            TreeError::IdTypeInconsistency {
                tree_id: "t".to_string(),
                first: RawIdKind::Text,
                second: RawIdKind::Float,
            }
        );
    }

    #[test]
    fn test_stringified_null_parent_marks_root() {
        let rows = vec![
            row("t", RawId::Int(2), Some(RawId::Int(1)), 1),
            row("t", RawId::Int(1), Some(RawId::Text("None".into())), 0),
        ];
        let outcome = ConversationTree::from_rows(rows, Platform::Mastodon).unwrap();
        assert_eq!(outcome.tree.root_id().as_str(), "1");
        assert_eq!(outcome.tree.total_number_of_posts(), 2);
    }

    #[test]
    fn test_from_rows_requires_single_root() {
        let rows = vec![row("t", RawId::Int(1), None, 0), row("t", RawId::Int(2), None, 1)];
        let err = ConversationTree::from_rows(rows, Platform::Reddit).unwrap_err();
        assert_eq!(
            err,
            TreeError::MultipleRoots {
                tree_id: "t".to_string(),
                count: 2
            }
        );

        let rows = vec![row("t", RawId::Int(2), Some(RawId::Int(1)), 1)];
        let err = ConversationTree::from_rows(rows, Platform::Reddit).unwrap_err();
        assert_eq!(err, TreeError::RootNotFound("t".to_string()));
    }

    #[test]
    fn test_rows_round_trip_keeps_structure() {
        let rows = vec![
            row("conv", RawId::Int(1), None, 0),
            row("conv", RawId::Int(3), Some(RawId::Int(2)), 2),
            row("conv", RawId::Int(2), Some(RawId::Int(1)), 1),
        ];
        let tree = ConversationTree::from_rows(rows, Platform::Reddit).unwrap().tree;
        let out = tree.to_rows();

        assert_eq!(tree.tree_id(), "conv");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].post_id, RawId::Text("1".into()));
        assert!(out[0].parent_id.is_none());
        assert_eq!(out[2].parent_id, Some(RawId::Text("2".into())));
        assert_eq!(out[2].lang.as_deref(), Some("en"));
    }
}

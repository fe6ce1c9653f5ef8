//! Torrent file-tree model and flattening.
//!
//! The daemon reports a torrent's contents as a loosely structured nested
//! JSON object. It is validated into a tagged tree at the boundary and
//! never walked as raw JSON inside core logic.

use serde_json::Value;

use crate::rpc::RpcError;

/// One node of a torrent's content tree.
///
/// Directory children keep the daemon's key order; flattening traverses
/// them in that order, not sorted.
#[derive(Debug, Clone, PartialEq)]
pub enum FileTreeNode {
    File {
        index: i64,
        size: u64,
        /// Completion fraction, 0-1
        progress: f64,
        priority: i64,
    },
    Directory {
        contents: Vec<(String, FileTreeNode)>,
    },
}

/// Flat per-file record produced by tree flattening.
///
/// `path` is the `/`-joined walk from the tree root.
#[derive(Debug, Clone, PartialEq)]
pub struct TorrentFileEntry {
    pub index: i64,
    pub path: String,
    pub size: u64,
    pub progress: f64,
    pub priority: i64,
}

impl FileTreeNode {
    /// Validates a `web.get_torrent_files` result into a tree.
    ///
    /// A node is a file leaf when its `type` field says so; anything else
    /// with a `contents` object is a directory.
    ///
    /// # Errors
    /// - `RpcError::MalformedResponse` - Node is neither a file nor a directory
    pub fn from_value(value: &Value) -> Result<Self, RpcError> {
        let object = value
            .as_object()
            .ok_or_else(|| RpcError::malformed("file tree node is not an object"))?;

        if object.get("type").and_then(Value::as_str) == Some("file") {
            return Ok(FileTreeNode::File {
                index: object.get("index").and_then(Value::as_i64).unwrap_or(-1),
                size: object.get("size").and_then(Value::as_u64).unwrap_or(0),
                progress: object.get("progress").and_then(Value::as_f64).unwrap_or(0.0),
                priority: object.get("priority").and_then(Value::as_i64).unwrap_or(0),
            });
        }

        let contents = object
            .get("contents")
            .and_then(Value::as_object)
            .ok_or_else(|| RpcError::malformed("file tree node has neither type nor contents"))?;

        let mut children = Vec::with_capacity(contents.len());
        for (name, child) in contents {
            children.push((name.clone(), FileTreeNode::from_value(child)?));
        }
        Ok(FileTreeNode::Directory { contents: children })
    }

    /// Flattens the tree into an ordered list of per-file records.
    ///
    /// Traversal follows each level's key order. A bare file at the root
    /// yields a single entry with an empty path.
    pub fn flatten(&self) -> Vec<TorrentFileEntry> {
        let mut entries = Vec::new();
        self.walk("", &mut entries);
        entries
    }

    fn walk(&self, path: &str, entries: &mut Vec<TorrentFileEntry>) {
        match self {
            FileTreeNode::File {
                index,
                size,
                progress,
                priority,
            } => {
                entries.push(TorrentFileEntry {
                    index: *index,
                    path: path.to_string(),
                    size: *size,
                    progress: *progress,
                    priority: *priority,
                });
            }
            FileTreeNode::Directory { contents } => {
                for (name, child) in contents {
                    let child_path = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{path}/{name}")
                    };
                    child.walk(&child_path, entries);
                }
            }
        }
    }
}

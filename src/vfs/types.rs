//! Index types: nodes, directory entries, etc.

use crate::storage::BlockId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a node.
pub type NodeId = u64;

/// Root node ID (always 0).
pub const ROOT_NODE_ID: NodeId = 0;

/// A file or directory in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier. Also binds content blocks to their file.
    pub id: NodeId,
    /// Containing directory; `None` only for the root.
    pub parent: Option<NodeId>,
    /// File or directory payload.
    pub kind: NodeKind,
    /// Creation timestamp (Unix epoch seconds).
    pub created: u64,
    /// Last modification timestamp (Unix epoch seconds).
    pub modified: u64,
    /// Free-form key/value metadata.
    pub metadata: BTreeMap<String, String>,
    /// Tags attached to this node.
    pub tags: BTreeSet<String>,
}

/// Type-specific node data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A regular file: sealed content blocks in order, and the byte length.
    File { blocks: Vec<BlockId>, size: u64 },
    /// A directory with uniquely named children.
    Directory { children: BTreeMap<String, NodeId> },
}

impl Node {
    /// Create a new, empty file node.
    pub fn new_file(id: NodeId, parent: NodeId) -> Self {
        Self::new(
            id,
            Some(parent),
            NodeKind::File {
                blocks: Vec::new(),
                size: 0,
            },
        )
    }

    /// Create a new directory node.
    pub fn new_directory(id: NodeId, parent: NodeId) -> Self {
        Self::new(
            id,
            Some(parent),
            NodeKind::Directory {
                children: BTreeMap::new(),
            },
        )
    }

    /// Create the root directory node.
    pub fn root() -> Self {
        Self::new(
            ROOT_NODE_ID,
            None,
            NodeKind::Directory {
                children: BTreeMap::new(),
            },
        )
    }

    fn new(id: NodeId, parent: Option<NodeId>, kind: NodeKind) -> Self {
        let now = current_timestamp();
        Self {
            id,
            parent,
            kind,
            created: now,
            modified: now,
            metadata: BTreeMap::new(),
            tags: BTreeSet::new(),
        }
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    /// Check if this is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    pub fn entry_kind(&self) -> EntryKind {
        match self.kind {
            NodeKind::File { .. } => EntryKind::File,
            NodeKind::Directory { .. } => EntryKind::Directory,
        }
    }

    /// File length in bytes (0 for directories).
    pub fn size(&self) -> u64 {
        match &self.kind {
            NodeKind::File { size, .. } => *size,
            NodeKind::Directory { .. } => 0,
        }
    }

    /// Content blocks (empty for directories).
    pub fn blocks(&self) -> &[BlockId] {
        match &self.kind {
            NodeKind::File { blocks, .. } => blocks,
            NodeKind::Directory { .. } => &[],
        }
    }

    /// Get children if this is a directory.
    pub fn children(&self) -> Option<&BTreeMap<String, NodeId>> {
        match &self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    /// Get mutable children if this is a directory.
    pub fn children_mut(&mut self) -> Option<&mut BTreeMap<String, NodeId>> {
        match &mut self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    /// Add a named child to this directory. Fails on a duplicate name.
    pub fn add_child(&mut self, name: &str, child_id: NodeId) -> bool {
        if let Some(children) = self.children_mut() {
            if !children.contains_key(name) {
                children.insert(name.to_string(), child_id);
                self.touch();
                return true;
            }
        }
        false
    }

    /// Remove a named child from this directory.
    pub fn remove_child(&mut self, name: &str) -> Option<NodeId> {
        let removed = self.children_mut()?.remove(name);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Update modification time.
    pub fn touch(&mut self) {
        self.modified = current_timestamp();
    }
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn is_file(self) -> bool {
        self == EntryKind::File
    }

    pub fn is_dir(self) -> bool {
        self == EntryKind::Directory
    }
}

/// A directory entry for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Name of the entry.
    pub name: String,
    /// File or directory.
    pub kind: EntryKind,
    /// Size in bytes (for files).
    pub size: u64,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Result of `stat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    pub created: u64,
    pub modified: u64,
    pub block_count: usize,
}

/// Get current Unix timestamp.
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

//! The index: the virtual directory tree of the store.
//!
//! Held entirely in memory while a store is open and persisted as sealed
//! chunks on commit. Every mutation marks the index dirty; nothing here
//! touches the medium.

use crate::error::{Error, Result};
use crate::storage::BlockId;
use crate::vfs::path::VfsPath;
use crate::vfs::types::{DirEntry, Node, NodeId, NodeInfo, NodeKind, ROOT_NODE_ID};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The node tree, keyed by node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// All nodes indexed by ID.
    nodes: BTreeMap<NodeId, Node>,
    /// Next available node ID.
    next_node_id: NodeId,
    #[serde(skip)]
    dirty: bool,
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

impl Index {
    /// An index holding only an empty root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT_NODE_ID, Node::root());
        Self {
            nodes,
            next_node_id: ROOT_NODE_ID + 1,
            dirty: true,
        }
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize and check tree invariants.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let index: Index = bincode::deserialize(data)
            .map_err(|e| Error::CorruptStore(format!("index: {}", e)))?;
        index.validate()?;
        Ok(index)
    }

    /// Check that the tree is rooted, acyclic and consistently linked.
    fn validate(&self) -> Result<()> {
        let corrupt = |msg: &str| -> Result<()> {
            Err(Error::CorruptStore(format!("index: {}", msg)))
        };

        match self.nodes.get(&ROOT_NODE_ID) {
            Some(root) if root.is_directory() && root.parent.is_none() => {}
            _ => return corrupt("missing or malformed root"),
        }

        let mut seen = BTreeSet::new();
        let mut stack = vec![ROOT_NODE_ID];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return corrupt("node reachable twice");
            }
            let Some(node) = self.nodes.get(&id) else {
                return corrupt("dangling child reference");
            };
            if node.id != id || id >= self.next_node_id {
                return corrupt("node id mismatch");
            }
            if let Some(children) = node.children() {
                for &child in children.values() {
                    if self.nodes.get(&child).and_then(|c| c.parent) != Some(id) {
                        return corrupt("child parent link mismatch");
                    }
                    stack.push(child);
                }
            }
        }
        if seen.len() != self.nodes.len() {
            return corrupt("unreachable nodes");
        }
        Ok(())
    }

    /// Whether there are uncommitted mutations.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the current state as committed.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Force the next commit to rewrite the index.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn alloc_node_id(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| Error::CorruptStore(format!("index: missing node {}", id)))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| Error::CorruptStore(format!("index: missing node {}", id)))
    }

    /// Resolve a path to a node ID.
    pub fn resolve(&self, path: &VfsPath) -> Result<NodeId> {
        let mut current_id = ROOT_NODE_ID;

        for component in path.components() {
            let current = self.node(current_id)?;
            let children = current
                .children()
                .ok_or_else(|| Error::NotADirectory(path.to_string()))?;
            current_id = *children
                .get(component)
                .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
        }

        Ok(current_id)
    }

    /// Look up the node at `path`.
    pub fn lookup(&self, path: &VfsPath) -> Result<&Node> {
        let id = self.resolve(path)?;
        self.node(id)
    }

    /// Resolve the directory that would contain `path`.
    fn resolve_parent(&self, path: &VfsPath) -> Result<(NodeId, String)> {
        let (Some(parent_path), Some(name)) = (path.parent(), path.name()) else {
            return Err(Error::PathExists("/".to_string()));
        };

        let parent_id = match self.resolve(&parent_path) {
            Ok(id) => id,
            Err(Error::PathNotFound(_)) => {
                return Err(Error::ParentNotFound(parent_path.to_string()))
            }
            Err(e) => return Err(e),
        };
        if !self.node(parent_id)?.is_directory() {
            return Err(Error::NotADirectory(parent_path.to_string()));
        }

        Ok((parent_id, name.to_string()))
    }

    fn insert_child(&mut self, path: &VfsPath, directory: bool) -> Result<NodeId> {
        let (parent_id, name) = self.resolve_parent(path)?;
        if self
            .node(parent_id)?
            .children()
            .is_some_and(|c| c.contains_key(&name))
        {
            return Err(Error::PathExists(path.to_string()));
        }

        let id = self.alloc_node_id();
        let node = if directory {
            Node::new_directory(id, parent_id)
        } else {
            Node::new_file(id, parent_id)
        };
        self.node_mut(parent_id)?.add_child(&name, id);
        self.nodes.insert(id, node);
        self.dirty = true;
        Ok(id)
    }

    /// Create an empty file.
    pub fn create_file(&mut self, path: &VfsPath) -> Result<NodeId> {
        self.insert_child(path, false)
    }

    /// Create a directory. The parent must exist.
    pub fn create_dir(&mut self, path: &VfsPath) -> Result<NodeId> {
        self.insert_child(path, true)
    }

    /// Create a directory and any missing ancestors.
    pub fn create_dir_all(&mut self, path: &VfsPath) -> Result<NodeId> {
        let mut current = VfsPath::root();
        let mut id = ROOT_NODE_ID;
        for component in path.components() {
            current = current.join(component)?;
            id = match self.resolve(&current) {
                Ok(existing) if self.node(existing)?.is_directory() => existing,
                Ok(_) => return Err(Error::NotADirectory(current.to_string())),
                Err(Error::PathNotFound(_)) => self.create_dir(&current)?,
                Err(e) => return Err(e),
            };
        }
        Ok(id)
    }

    /// List a directory, ordered by name.
    pub fn list(&self, path: &VfsPath) -> Result<Vec<DirEntry>> {
        let node = self.lookup(path)?;
        let children = node
            .children()
            .ok_or_else(|| Error::NotADirectory(path.to_string()))?;

        children
            .iter()
            .map(|(name, &id)| {
                let child = self.node(id)?;
                Ok(DirEntry {
                    name: name.clone(),
                    kind: child.entry_kind(),
                    size: child.size(),
                })
            })
            .collect()
    }

    /// File node ID and its content, failing on directories.
    pub fn file(&self, path: &VfsPath) -> Result<(NodeId, &[BlockId], u64)> {
        let id = self.resolve(path)?;
        match &self.node(id)?.kind {
            NodeKind::File { blocks, size } => Ok((id, blocks, *size)),
            NodeKind::Directory { .. } => Err(Error::NotAFile(path.to_string())),
        }
    }

    /// Replace a file's block list and length.
    ///
    /// Returns the block ids that are no longer referenced.
    pub fn set_file_content(
        &mut self,
        id: NodeId,
        new_blocks: Vec<BlockId>,
        new_size: u64,
    ) -> Result<Vec<BlockId>> {
        let node = self.node_mut(id)?;
        let NodeKind::File { blocks, size } = &mut node.kind else {
            return Err(Error::NotAFile(format!("node {}", id)));
        };

        let kept: BTreeSet<BlockId> = new_blocks.iter().copied().collect();
        let released = blocks
            .iter()
            .copied()
            .filter(|b| !kept.contains(b))
            .collect();

        *blocks = new_blocks;
        *size = new_size;
        node.touch();
        self.dirty = true;
        Ok(released)
    }

    /// Point a file at re-sealed copies of its blocks, keeping its length
    /// and timestamps.
    pub fn relocate_blocks(&mut self, id: NodeId, new_blocks: Vec<BlockId>) -> Result<()> {
        let node = self.node_mut(id)?;
        let NodeKind::File { blocks, .. } = &mut node.kind else {
            return Err(Error::NotAFile(format!("node {}", id)));
        };
        if blocks.len() != new_blocks.len() {
            return Err(Error::CorruptStore(format!(
                "node {}: relocated block count mismatch",
                id
            )));
        }
        *blocks = new_blocks;
        self.dirty = true;
        Ok(())
    }

    /// Remove a file or an empty directory.
    ///
    /// Returns the content blocks the removal released.
    pub fn remove(&mut self, path: &VfsPath) -> Result<Vec<BlockId>> {
        if path.is_root() {
            return Err(Error::InvalidPath("Cannot remove root".to_string()));
        }

        let id = self.resolve(path)?;
        let node = self.node(id)?;
        if node.children().is_some_and(|c| !c.is_empty()) {
            return Err(Error::DirectoryNotEmpty(path.to_string()));
        }

        let (parent_id, name) = self.resolve_parent(path)?;
        self.node_mut(parent_id)?.remove_child(&name);
        let removed = self.nodes.remove(&id);
        self.dirty = true;

        Ok(removed.map(|n| n.blocks().to_vec()).unwrap_or_default())
    }

    /// Move a node to a new path.
    pub fn rename(&mut self, from: &VfsPath, to: &VfsPath) -> Result<()> {
        if from.is_root() || to.is_root() {
            return Err(Error::InvalidPath("Cannot move root".to_string()));
        }

        let id = self.resolve(from)?;
        if from == to {
            return Ok(());
        }
        if to.starts_with(from) {
            if !self.node(id)?.is_directory() {
                return Err(Error::NotADirectory(from.to_string()));
            }
            return Err(Error::WouldCreateCycle {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let (new_parent, new_name) = self.resolve_parent(to)?;
        if self
            .node(new_parent)?
            .children()
            .is_some_and(|c| c.contains_key(&new_name))
        {
            return Err(Error::PathExists(to.to_string()));
        }
        if self.ancestors(new_parent)?.contains(&id) {
            return Err(Error::WouldCreateCycle {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let (old_parent, old_name) = self.resolve_parent(from)?;
        self.node_mut(old_parent)?.remove_child(&old_name);
        self.node_mut(new_parent)?.add_child(&new_name, id);
        let node = self.node_mut(id)?;
        node.parent = Some(new_parent);
        node.touch();
        self.dirty = true;
        Ok(())
    }

    /// `id` and every directory above it, up to the root.
    fn ancestors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut chain = vec![id];
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            if chain.len() > self.nodes.len() {
                return Err(Error::CorruptStore("index: parent cycle".to_string()));
            }
            chain.push(parent);
            current = self.node(parent)?;
        }
        Ok(chain)
    }

    /// Full path of a node.
    pub fn path_of(&self, id: NodeId) -> Result<VfsPath> {
        let chain = self.ancestors(id)?;
        let mut path = VfsPath::root();
        for pair in chain.windows(2).rev() {
            let (child, parent) = (pair[0], pair[1]);
            let name = self
                .node(parent)?
                .children()
                .and_then(|c| c.iter().find(|(_, v)| **v == child).map(|(k, _)| k.clone()))
                .ok_or_else(|| Error::CorruptStore("index: orphaned node".to_string()))?;
            path = path.join(&name)?;
        }
        Ok(path)
    }

    /// Describe the node at `path`.
    pub fn stat(&self, path: &VfsPath) -> Result<NodeInfo> {
        let node = self.lookup(path)?;
        Ok(NodeInfo {
            path: path.to_string(),
            kind: node.entry_kind(),
            size: node.size(),
            created: node.created,
            modified: node.modified,
            block_count: node.blocks().len(),
        })
    }

    fn node_at_mut(&mut self, path: &VfsPath) -> Result<&mut Node> {
        let id = self.resolve(path)?;
        self.dirty = true;
        self.node_mut(id)
    }

    /// Set a metadata key on a node.
    pub fn metadata_set(&mut self, path: &VfsPath, key: &str, value: &str) -> Result<()> {
        let node = self.node_at_mut(path)?;
        node.metadata.insert(key.to_string(), value.to_string());
        node.touch();
        Ok(())
    }

    /// Get a metadata value.
    pub fn metadata_get(&self, path: &VfsPath, key: &str) -> Result<String> {
        self.lookup(path)?
            .metadata
            .get(key)
            .cloned()
            .ok_or_else(|| Error::MetadataKeyNotFound(key.to_string()))
    }

    /// All metadata of a node.
    pub fn metadata_list(&self, path: &VfsPath) -> Result<BTreeMap<String, String>> {
        Ok(self.lookup(path)?.metadata.clone())
    }

    /// Remove a metadata key.
    pub fn metadata_remove(&mut self, path: &VfsPath, key: &str) -> Result<()> {
        let node = self.node_at_mut(path)?;
        if node.metadata.remove(key).is_none() {
            return Err(Error::MetadataKeyNotFound(key.to_string()));
        }
        node.touch();
        Ok(())
    }

    /// Attach a tag to a node.
    pub fn tag_add(&mut self, path: &VfsPath, tag: &str) -> Result<()> {
        if tag.is_empty() || tag.starts_with('!') {
            return Err(Error::InvalidTag(tag.to_string()));
        }
        self.node_at_mut(path)?.tags.insert(tag.to_string());
        Ok(())
    }

    /// Detach a tag. Absent tags are ignored.
    pub fn tag_remove(&mut self, path: &VfsPath, tag: &str) -> Result<()> {
        self.node_at_mut(path)?.tags.remove(tag);
        Ok(())
    }

    /// Tags of a node, sorted.
    pub fn tag_get(&self, path: &VfsPath) -> Result<Vec<String>> {
        Ok(self.lookup(path)?.tags.iter().cloned().collect())
    }

    /// Remove every tag from a node.
    pub fn tag_clear(&mut self, path: &VfsPath) -> Result<()> {
        self.node_at_mut(path)?.tags.clear();
        Ok(())
    }

    /// Every tag used anywhere in the store, sorted and unique.
    pub fn tag_list(&self) -> Vec<String> {
        let all: BTreeSet<&String> = self.nodes.values().flat_map(|n| n.tags.iter()).collect();
        all.into_iter().cloned().collect()
    }

    /// Paths of nodes matching every term. A term `!tag` excludes nodes
    /// carrying `tag`; a plain term requires it.
    pub fn tag_search(&self, terms: &[String]) -> Result<Vec<String>> {
        let (excluded, required): (Vec<&str>, Vec<&str>) = terms
            .iter()
            .map(String::as_str)
            .partition(|t| t.starts_with('!'));
        let excluded: Vec<&str> = excluded.iter().map(|t| &t[1..]).collect();

        let mut paths = Vec::new();
        for node in self.nodes.values() {
            if node.id == ROOT_NODE_ID {
                continue;
            }
            let matches = required.iter().all(|t| node.tags.contains(*t))
                && !excluded.iter().any(|t| node.tags.contains(*t));
            if matches {
                paths.push(self.path_of(node.id)?.to_string());
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// All file node ids.
    pub fn file_ids(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.is_file())
            .map(|n| n.id)
            .collect()
    }

    /// Every content block referenced by some file.
    pub fn live_blocks(&self) -> BTreeSet<BlockId> {
        self.nodes
            .values()
            .flat_map(|n| n.blocks().iter().copied())
            .collect()
    }

    /// Get total number of files.
    pub fn file_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_file()).count()
    }

    /// Get total number of directories, root included.
    pub fn dir_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_directory()).count()
    }

    /// Get total size of all files.
    pub fn total_size(&self) -> u64 {
        self.nodes.values().map(|n| n.size()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::types::EntryKind;

    fn p(s: &str) -> VfsPath {
        VfsPath::parse(s).unwrap()
    }

    #[test]
    fn test_new_index_has_root() {
        let index = Index::new();
        assert!(index.lookup(&VfsPath::root()).unwrap().is_directory());
        assert!(index.list(&VfsPath::root()).unwrap().is_empty());
        assert!(index.is_dirty());
    }

    #[test]
    fn test_create_and_list() {
        let mut index = Index::new();
        index.create_dir(&p("/docs")).unwrap();
        index.create_file(&p("/docs/b.txt")).unwrap();
        index.create_file(&p("/docs/a.txt")).unwrap();
        index.create_dir(&p("/docs/sub")).unwrap();

        let entries = index.list(&p("/docs")).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert_eq!(entries[2].kind, EntryKind::Directory);
    }

    #[test]
    fn test_create_requires_parent() {
        let mut index = Index::new();
        assert!(matches!(
            index.create_file(&p("/a/b")),
            Err(Error::ParentNotFound(_))
        ));
        assert!(matches!(
            index.create_dir(&p("/a/b")),
            Err(Error::ParentNotFound(_))
        ));
    }

    #[test]
    fn test_create_under_file_fails() {
        let mut index = Index::new();
        index.create_file(&p("/f")).unwrap();
        assert!(index.create_file(&p("/f/x")).is_err());
    }

    #[test]
    fn test_create_existing_fails() {
        let mut index = Index::new();
        index.create_dir(&p("/a")).unwrap();
        assert!(matches!(
            index.create_file(&p("/a")),
            Err(Error::PathExists(_))
        ));
        assert!(matches!(
            index.create_dir(&VfsPath::root()),
            Err(Error::PathExists(_))
        ));
    }

    #[test]
    fn test_create_dir_all() {
        let mut index = Index::new();
        index.create_dir(&p("/a")).unwrap();
        let id = index.create_dir_all(&p("/a/b/c")).unwrap();
        assert_eq!(index.resolve(&p("/a/b/c")).unwrap(), id);
        assert_eq!(index.create_dir_all(&p("/a/b/c")).unwrap(), id);

        index.create_file(&p("/a/f")).unwrap();
        assert!(matches!(
            index.create_dir_all(&p("/a/f/g")),
            Err(Error::NotADirectory(_))
        ));
    }

    #[test]
    fn test_list_file_is_not_a_directory() {
        let mut index = Index::new();
        index.create_file(&p("/f")).unwrap();
        assert!(matches!(
            index.list(&p("/f")),
            Err(Error::NotADirectory(_))
        ));
        assert!(matches!(
            index.list(&p("/missing")),
            Err(Error::PathNotFound(_))
        ));
    }

    #[test]
    fn test_remove() {
        let mut index = Index::new();
        index.create_dir(&p("/a")).unwrap();
        let f = index.create_file(&p("/a/f")).unwrap();
        index.set_file_content(f, vec![4, 5], 10).unwrap();

        assert!(matches!(
            index.remove(&p("/a")),
            Err(Error::DirectoryNotEmpty(_))
        ));
        assert_eq!(index.remove(&p("/a/f")).unwrap(), vec![4, 5]);
        assert!(index.remove(&p("/a")).unwrap().is_empty());
        assert!(matches!(
            index.remove(&p("/a")),
            Err(Error::PathNotFound(_))
        ));
        assert!(index.remove(&VfsPath::root()).is_err());
    }

    #[test]
    fn test_rename() {
        let mut index = Index::new();
        index.create_dir(&p("/a")).unwrap();
        index.create_dir(&p("/b")).unwrap();
        let f = index.create_file(&p("/a/f")).unwrap();

        index.rename(&p("/a/f"), &p("/b/g")).unwrap();
        assert_eq!(index.resolve(&p("/b/g")).unwrap(), f);
        assert!(index.resolve(&p("/a/f")).is_err());
        assert_eq!(index.path_of(f).unwrap().to_string(), "/b/g");
    }

    #[test]
    fn test_rename_errors() {
        let mut index = Index::new();
        index.create_dir(&p("/a")).unwrap();
        index.create_dir(&p("/a/sub")).unwrap();
        index.create_file(&p("/x")).unwrap();

        assert!(matches!(
            index.rename(&p("/a"), &p("/a/b")),
            Err(Error::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            index.rename(&p("/a"), &p("/a/sub/deeper")),
            Err(Error::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            index.rename(&p("/x"), &p("/a/sub")),
            Err(Error::PathExists(_))
        ));
        assert!(matches!(
            index.rename(&p("/missing"), &p("/y")),
            Err(Error::PathNotFound(_))
        ));
        assert!(matches!(
            index.rename(&p("/x"), &p("/nope/y")),
            Err(Error::ParentNotFound(_))
        ));
        assert!(matches!(
            index.rename(&p("/x"), &p("/x/inner")),
            Err(Error::NotADirectory(_))
        ));
        index.rename(&p("/x"), &p("/x")).unwrap();
    }

    #[test]
    fn test_set_file_content_releases_replaced_blocks() {
        let mut index = Index::new();
        let f = index.create_file(&p("/f")).unwrap();
        index.set_file_content(f, vec![1, 2, 3], 30).unwrap();

        let released = index.set_file_content(f, vec![1, 7, 3], 30).unwrap();
        assert_eq!(released, vec![2]);
        assert_eq!(index.live_blocks().into_iter().collect::<Vec<_>>(), vec![1, 3, 7]);
    }

    #[test]
    fn test_serialize_roundtrip_and_validate() {
        let mut index = Index::new();
        index.create_dir(&p("/a")).unwrap();
        let f = index.create_file(&p("/a/f")).unwrap();
        index.set_file_content(f, vec![9], 3).unwrap();
        index.tag_add(&p("/a/f"), "red").unwrap();

        let bytes = index.to_bytes().unwrap();
        let restored = Index::from_bytes(&bytes).unwrap();
        assert_eq!(restored.nodes, index.nodes);
        assert!(!restored.is_dirty());
    }

    #[test]
    fn test_from_bytes_rejects_broken_tree() {
        let mut index = Index::new();
        let f = index.create_file(&p("/f")).unwrap();
        index.nodes.get_mut(&f).unwrap().parent = Some(42);

        let bytes = index.to_bytes().unwrap();
        assert!(matches!(
            Index::from_bytes(&bytes),
            Err(Error::CorruptStore(_))
        ));
        assert!(Index::from_bytes(b"garbage").is_err());
    }

    #[test]
    fn test_metadata() {
        let mut index = Index::new();
        index.create_file(&p("/f")).unwrap();

        index.metadata_set(&p("/f"), "author", "me").unwrap();
        assert_eq!(index.metadata_get(&p("/f"), "author").unwrap(), "me");
        assert_eq!(index.metadata_list(&p("/f")).unwrap().len(), 1);

        index.metadata_remove(&p("/f"), "author").unwrap();
        assert!(matches!(
            index.metadata_get(&p("/f"), "author"),
            Err(Error::MetadataKeyNotFound(_))
        ));
        assert!(index.metadata_remove(&p("/f"), "author").is_err());
    }

    #[test]
    fn test_tags_and_search() {
        let mut index = Index::new();
        index.create_dir(&p("/d")).unwrap();
        index.create_file(&p("/d/one")).unwrap();
        index.create_file(&p("/two")).unwrap();

        index.tag_add(&p("/d/one"), "work").unwrap();
        index.tag_add(&p("/d/one"), "urgent").unwrap();
        index.tag_add(&p("/two"), "work").unwrap();

        assert_eq!(index.tag_list(), vec!["urgent", "work"]);
        assert_eq!(index.tag_get(&p("/d/one")).unwrap(), vec!["urgent", "work"]);

        let work = index.tag_search(&["work".to_string()]).unwrap();
        assert_eq!(work, vec!["/d/one", "/two"]);

        let not_urgent = index
            .tag_search(&["work".to_string(), "!urgent".to_string()])
            .unwrap();
        assert_eq!(not_urgent, vec!["/two"]);

        index.tag_remove(&p("/d/one"), "urgent").unwrap();
        index.tag_clear(&p("/two")).unwrap();
        assert_eq!(index.tag_list(), vec!["work"]);

        assert!(matches!(
            index.tag_add(&p("/two"), "!bad"),
            Err(Error::InvalidTag(_))
        ));
        assert!(matches!(
            index.tag_add(&p("/two"), ""),
            Err(Error::InvalidTag(_))
        ));
    }
}

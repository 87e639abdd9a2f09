//! Tree construction from flat `(path, bytes)` entries
//!
//! Directories are materialized from path prefixes and memoized by full path,
//! so two files sharing a parent never produce duplicate directory nodes.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::types::{FileNode, NodeKind};

/// One raw upload entry
#[derive(Debug, Clone)]
pub struct RawFile {
    pub path: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }
}

/// Normalize an entry path to the tree's `/`-separated relative form.
///
/// Returns `None` for empty paths and paths that escape the root.
pub fn normalize_path(raw: &str) -> Option<String> {
    let unified = raw.replace('\\', "/");
    let mut parts = Vec::new();
    for component in unified.split('/') {
        match component {
            "" | "." => continue,
            ".." => return None,
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Decode bytes as UTF-8; undecodable content becomes empty.
pub fn decode_content(path: &str, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => {
            debug!("Non-UTF-8 content in {}, keeping entry with empty content", path);
            String::new()
        }
    }
}

struct ArenaNode {
    node: FileNode,
    children: Vec<usize>,
}

/// Arena-backed builder; call `finish` to obtain the owned tree.
pub struct TreeBuilder {
    arena: Vec<ArenaNode>,
    index: HashMap<String, usize>,
}

impl TreeBuilder {
    pub fn new(project_name: &str) -> Self {
        let root = ArenaNode {
            node: FileNode::directory(project_name, ""),
            children: Vec::new(),
        };
        let mut index = HashMap::new();
        index.insert(String::new(), 0);
        Self {
            arena: vec![root],
            index,
        }
    }

    /// Insert a file; returns false when the entry was skipped.
    pub fn insert(&mut self, raw_path: &str, content: String) -> bool {
        let Some(path) = normalize_path(raw_path) else {
            warn!("Skipping entry with unusable path: {:?}", raw_path);
            return false;
        };

        let (parent_path, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (parent.to_string(), name.to_string()),
            None => (String::new(), path.clone()),
        };

        let Some(parent) = self.ensure_dir(&parent_path) else {
            warn!("Skipping {}: a parent path is already a file", path);
            return false;
        };

        if let Some(&existing) = self.index.get(&path) {
            let slot = &mut self.arena[existing];
            if slot.node.kind == NodeKind::Directory {
                warn!("Skipping {}: path is already a directory", path);
                return false;
            }
            debug!("Duplicate entry {}, replacing earlier content", path);
            slot.node = FileNode::file(name, path, content);
            return true;
        }

        let idx = self.arena.len();
        self.arena.push(ArenaNode {
            node: FileNode::file(name, path.clone(), content),
            children: Vec::new(),
        });
        self.arena[parent].children.push(idx);
        self.index.insert(path, idx);
        true
    }

    /// Memoized directory creation for every prefix of `path`
    fn ensure_dir(&mut self, path: &str) -> Option<usize> {
        if let Some(&idx) = self.index.get(path) {
            return (self.arena[idx].node.kind == NodeKind::Directory).then_some(idx);
        }

        let (parent_path, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", path),
        };
        let parent = self.ensure_dir(parent_path)?;

        let idx = self.arena.len();
        self.arena.push(ArenaNode {
            node: FileNode::directory(name, path),
            children: Vec::new(),
        });
        self.arena[parent].children.push(idx);
        self.index.insert(path.to_string(), idx);
        Some(idx)
    }

    pub fn file_count(&self) -> usize {
        self.arena
            .iter()
            .filter(|n| n.node.kind == NodeKind::File)
            .count()
    }

    /// Assemble the owned tree. Children are ordered directories first, then by name.
    pub fn finish(self) -> FileNode {
        let mut slots: Vec<Option<ArenaNode>> = self.arena.into_iter().map(Some).collect();
        assemble(&mut slots, 0)
    }
}

fn assemble(slots: &mut [Option<ArenaNode>], idx: usize) -> FileNode {
    let Some(ArenaNode { mut node, children }) = slots[idx].take() else {
        // Each index is referenced by exactly one parent
        return FileNode::directory("", "");
    };
    node.children = children
        .into_iter()
        .map(|child| assemble(slots, child))
        .collect();
    node.children.sort_by(|a, b| {
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| a.name.cmp(&b.name))
    });
    node
}

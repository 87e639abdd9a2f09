//! File tree types
//!
//! `FileNode` is the uniform tree produced by ingestion. Directories own their
//! children. Only `ignored` and `category` change after ingestion, and only
//! the filter stage touches them.

use serde::{Deserialize, Serialize};

/// Kind of tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// Coarse category assigned to surviving files by the filter stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Source,
    Style,
    Config,
    Documentation,
}

impl NodeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Source => "source",
            NodeCategory::Style => "style",
            NodeCategory::Config => "config",
            NodeCategory::Documentation => "documentation",
        }
    }
}

impl std::fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry (file or directory) of an ingested project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    /// Relative `/`-separated path; the synthetic root uses ""
    pub path: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileNode>,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<NodeCategory>,
}

impl FileNode {
    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Directory,
            content: String::new(),
            size: None,
            children: Vec::new(),
            ignored: false,
            category: None,
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>, content: String) -> Self {
        let size = content.len() as u64;
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::File,
            content,
            size: Some(size),
            children: Vec::new(),
            ignored: false,
            category: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Lowercased extension without the dot
    pub fn extension(&self) -> Option<String> {
        file_extension(&self.name)
    }

    /// Depth-first visit of every node, including ignored ones
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a FileNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Depth-first visit that skips ignored nodes and their subtrees
    pub fn walk_kept<'a>(&'a self, visit: &mut dyn FnMut(&'a FileNode)) {
        if self.ignored {
            return;
        }
        visit(self);
        for child in &self.children {
            child.walk_kept(visit);
        }
    }

    /// Non-ignored file nodes in depth-first order
    pub fn kept_files(&self) -> Vec<&FileNode> {
        let mut files = Vec::new();
        self.walk_kept(&mut |node| {
            if node.is_file() {
                files.push(node);
            }
        });
        files
    }

    /// Find a node by exact path
    pub fn find(&self, path: &str) -> Option<&FileNode> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    /// Count of (files, directories) below and including this node
    pub fn count(&self) -> (usize, usize) {
        let mut files = 0;
        let mut dirs = 0;
        self.walk(&mut |node| match node.kind {
            NodeKind::File => files += 1,
            NodeKind::Directory => dirs += 1,
        });
        (files, dirs)
    }
}

/// Lowercased extension of a file name, `None` for dotfiles without one
pub fn file_extension(name: &str) -> Option<String> {
    let trimmed = name.trim_start_matches('.');
    let (_, ext) = trimmed.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileNode {
        let mut root = FileNode::directory("demo", "");
        let mut src = FileNode::directory("src", "src");
        src.children
            .push(FileNode::file("main.ts", "src/main.ts", "let x = 1;".into()));
        let mut dist = FileNode::directory("dist", "dist");
        dist.ignored = true;
        dist.children
            .push(FileNode::file("out.js", "dist/out.js", String::new()));
        root.children.push(src);
        root.children.push(dist);
        root
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("App.TSX"), Some("tsx".to_string()));
        assert_eq!(file_extension("jquery.min.js"), Some("js".to_string()));
        assert_eq!(file_extension(".gitignore"), None);
        assert_eq!(file_extension(".eslintrc.json"), Some("json".to_string()));
        assert_eq!(file_extension("Makefile"), None);
    }

    #[test]
    fn test_kept_files_skip_ignored_subtrees() {
        let root = sample();
        let kept: Vec<_> = root.kept_files().iter().map(|n| n.path.clone()).collect();
        assert_eq!(kept, vec!["src/main.ts".to_string()]);
        assert_eq!(root.count(), (2, 3));
    }

    #[test]
    fn test_find_by_path() {
        let root = sample();
        assert_eq!(root.find("dist/out.js").map(|n| n.name.as_str()), Some("out.js"));
        assert!(root.find("missing.ts").is_none());
    }
}

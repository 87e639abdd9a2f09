//! Tree Ingestor
//!
//! Builds one uniform `FileNode` tree from loose uploads, a zip archive,
//! or a directory on disk. The root is a synthetic directory named after
//! the project with path `""`.

mod archive;
mod disk;
mod tree;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::types::{FileNode, Result};

pub use archive::read_archive;
pub use disk::read_directory;
pub use tree::{RawFile, TreeBuilder, normalize_path};

/// Raw project input accepted by the pipeline
#[derive(Debug, Clone)]
pub enum IngestInput {
    Files(Vec<RawFile>),
    Archive { name: String, bytes: Vec<u8> },
    Directory(PathBuf),
}

impl IngestInput {
    /// Pick archive or directory ingestion from a filesystem path
    pub async fn from_path(path: &Path) -> Result<Self> {
        if path.is_file() && is_archive_name(&path.to_string_lossy()) {
            let bytes = tokio::fs::read(path).await?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "archive.zip".to_string());
            Ok(IngestInput::Archive { name, bytes })
        } else {
            Ok(IngestInput::Directory(path.to_path_buf()))
        }
    }

    /// Project name implied by the input
    pub fn default_project_name(&self) -> String {
        match self {
            IngestInput::Files(_) => "project".to_string(),
            IngestInput::Archive { name, .. } => strip_archive_suffix(name).to_string(),
            IngestInput::Directory(path) => path
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
                .unwrap_or_else(|| "project".to_string()),
        }
    }
}

pub fn is_archive_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".zip")
}

fn strip_archive_suffix(name: &str) -> &str {
    let len = name.len();
    if is_archive_name(name) {
        &name[..len - 4]
    } else {
        name
    }
}

/// Build a tree from loose uploads
pub fn ingest_files(project_name: &str, files: Vec<RawFile>) -> FileNode {
    let mut builder = TreeBuilder::new(project_name);
    for RawFile { path, bytes } in files {
        let content = tree::decode_content(&path, bytes);
        builder.insert(&path, content);
    }
    builder.finish()
}

/// Ingest any supported input
pub async fn ingest(input: IngestInput, project_name: &str, max_file_size: u64) -> Result<FileNode> {
    let tree = match input {
        IngestInput::Files(files) => ingest_files(project_name, files),
        IngestInput::Archive { bytes, .. } => read_archive(project_name, &bytes)?,
        IngestInput::Directory(path) => read_directory(&path, project_name, max_file_size).await?,
    };
    let (files, dirs) = tree.count();
    info!("Ingested {} files in {} directories", files, dirs.saturating_sub(1));
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_files_builds_tree() {
        let tree = ingest_files(
            "demo",
            vec![
                RawFile::new("package.json", b"{}".to_vec()),
                RawFile::new("src/App.tsx", b"export {}".to_vec()),
                RawFile::new("assets/logo.png", vec![0xff, 0xd8, 0xff]),
            ],
        );
        assert_eq!(tree.name, "demo");
        assert_eq!(tree.count(), (3, 3));
        assert!(tree.find("assets/logo.png").unwrap().content.is_empty());
    }

    #[test]
    fn test_archive_name_helpers() {
        assert!(is_archive_name("Project.ZIP"));
        assert!(!is_archive_name("project.tar"));
        assert_eq!(strip_archive_suffix("shop.zip"), "shop");
        assert_eq!(strip_archive_suffix("shop"), "shop");
    }

    #[tokio::test]
    async fn test_ingest_dispatches_on_input() {
        let tree = ingest(
            IngestInput::Files(vec![RawFile::new("a.ts", b"let a = 1;".to_vec())]),
            "demo",
            1024,
        )
        .await
        .unwrap();
        assert_eq!(tree.count().0, 1);
    }
}

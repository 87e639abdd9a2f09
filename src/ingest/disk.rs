//! Directory ingestion with gitignore support

use std::path::Path;

use ignore::WalkBuilder;
use tracing::{debug, warn};

use super::tree::{TreeBuilder, decode_content};
use crate::types::{FileNode, Result, ScribeError};

/// Walk `root` (honoring `.gitignore`) and build a tree; files are read
/// sequentially and those above `max_file_size` are skipped.
pub async fn read_directory(root: &Path, project_name: &str, max_file_size: u64) -> Result<FileNode> {
    if !root.is_dir() {
        return Err(ScribeError::ingest(
            root.display().to_string(),
            "not a directory",
        ));
    }

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .follow_links(false)
        .build();

    let mut builder = TreeBuilder::new(project_name);
    let mut skipped = 0usize;

    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let relative = relative.to_string_lossy().to_string();
        // VCS metadata never reaches the tree
        if relative.starts_with(".git/") {
            continue;
        }

        match entry.metadata() {
            Ok(meta) if meta.len() > max_file_size => {
                debug!("Skipping {} ({} bytes > limit)", relative, meta.len());
                skipped += 1;
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Cannot stat {}: {}", relative, e);
                skipped += 1;
                continue;
            }
        }

        let content = match tokio::fs::read(path).await {
            Ok(bytes) => decode_content(&relative, bytes),
            Err(e) => {
                warn!("Failed to read {}: {}", relative, e);
                String::new()
            }
        };
        builder.insert(&relative, content);
    }

    debug!(
        "Directory ingested: {} files, {} skipped",
        builder.file_count(),
        skipped
    );
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_nested_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/components")).unwrap();
        fs::write(temp.path().join("package.json"), "{}").unwrap();
        fs::write(temp.path().join("src/components/App.tsx"), "export const A = 1;").unwrap();

        let root = read_directory(temp.path(), "demo", 1024).await.unwrap();
        assert_eq!(root.name, "demo");
        assert_eq!(
            root.find("src/components/App.tsx").map(|n| n.content.as_str()),
            Some("export const A = 1;")
        );
        assert!(root.find("package.json").is_some());
    }

    #[tokio::test]
    async fn test_honors_gitignore_and_size_limit() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".gitignore"), "secret.txt\n").unwrap();
        fs::write(temp.path().join("secret.txt"), "hidden").unwrap();
        fs::write(temp.path().join("big.js"), "x".repeat(4096)).unwrap();
        fs::write(temp.path().join("small.js"), "ok").unwrap();

        let root = read_directory(temp.path(), "demo", 1024).await.unwrap();
        assert!(root.find("secret.txt").is_none());
        assert!(root.find("big.js").is_none());
        assert!(root.find("small.js").is_some());
    }

    #[tokio::test]
    async fn test_missing_directory_is_ingest_error() {
        let temp = TempDir::new().unwrap();
        let err = read_directory(&temp.path().join("nope"), "demo", 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, ScribeError::Ingest { .. }));
    }
}

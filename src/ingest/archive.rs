//! Zip archive expansion
//!
//! Directory entries are ignored; directories come from path prefixes.
//! An entry that cannot be read or decoded is kept with empty content.

use std::io::{Cursor, Read};

use tracing::{debug, warn};
use zip::ZipArchive;

use super::tree::{TreeBuilder, decode_content};
use crate::types::{FileNode, Result, ScribeError};

/// Expand a zip container into a tree rooted at `project_name`.
///
/// Only a container that cannot be opened at all is an error.
pub fn read_archive(project_name: &str, bytes: &[u8]) -> Result<FileNode> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ScribeError::ingest(project_name, format!("unreadable archive: {}", e)))?;

    let mut builder = TreeBuilder::new(project_name);
    let mut damaged = 0usize;

    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                // Name unknown without the header; nothing to keep
                warn!("Skipping unreadable archive entry #{}: {}", i, e);
                damaged += 1;
                continue;
            }
        };

        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let mut buf = Vec::with_capacity(entry.size() as usize);
        let content = match entry.read_to_end(&mut buf) {
            Ok(_) => decode_content(&name, buf),
            Err(e) => {
                warn!("Failed to read archive entry {}: {}", name, e);
                damaged += 1;
                String::new()
            }
        };

        builder.insert(&name, content);
    }

    debug!(
        "Archive expanded: {} files ({} damaged entries)",
        builder.file_count(),
        damaged
    );
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn build_zip(entries: &[(&str, &[u8])], dirs: &[&str]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for dir in dirs {
            writer.add_directory(*dir, options).unwrap();
        }
        for (name, bytes) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_directories_derived_from_prefixes() {
        let bytes = build_zip(
            &[
                ("app/src/App.tsx", b"export default function App() {}"),
                ("app/src/util.ts", b"export const x = 1;"),
                ("app/package.json", b"{}"),
            ],
            &[],
        );
        let root = read_archive("demo", &bytes).unwrap();
        assert_eq!(root.name, "demo");
        let app = root.find("app").unwrap();
        assert!(app.is_dir());
        assert_eq!(root.find("app/src").unwrap().children.len(), 2);
        assert_eq!(root.count().0, 3);
    }

    #[test]
    fn test_explicit_directory_entries_are_ignored() {
        let bytes = build_zip(&[("lib/a.js", b"a")], &["lib/", "empty/"]);
        let root = read_archive("demo", &bytes).unwrap();
        assert!(root.find("lib/a.js").is_some());
        // no file lives under empty/, so it never materializes
        assert!(root.find("empty").is_none());
    }

    #[test]
    fn test_binary_entry_kept_with_empty_content() {
        let bytes = build_zip(
            &[("logo.png", &[0x89, 0x50, 0x4e, 0x47, 0xff, 0xfe]), ("a.ts", b"ok")],
            &[],
        );
        let root = read_archive("demo", &bytes).unwrap();
        let logo = root.find("logo.png").unwrap();
        assert!(logo.content.is_empty());
        assert_eq!(root.find("a.ts").unwrap().content, "ok");
    }

    #[test]
    fn test_garbage_container_is_ingest_error() {
        let err = read_archive("demo", b"definitely not a zip").unwrap_err();
        assert!(matches!(err, ScribeError::Ingest { .. }));
    }
}

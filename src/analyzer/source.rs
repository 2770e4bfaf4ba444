//! Manifest discovery and multi-document splitting.

use super::config::DiscoveryConfig;
use super::types::{ManifestDocument, SourceId};
use crate::error::{RequestsError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files found under a root path.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Manifest files, sorted by path within each directory.
    pub files: Vec<PathBuf>,
    /// Entries that could not be visited.
    pub errors: Vec<RequestsError>,
}

/// Find the manifest files under `root`.
///
/// A file root is returned as-is whatever its extension; a directory is
/// walked recursively. Unreadable entries are collected in
/// [`Discovery::errors`] so the remaining files can still be processed.
pub fn discover_files(root: &Path, config: &DiscoveryConfig) -> Result<Discovery> {
    let metadata = std::fs::metadata(root).map_err(|source| RequestsError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    if metadata.is_file() {
        return Ok(Discovery {
            files: vec![root.to_path_buf()],
            errors: Vec::new(),
        });
    }

    let mut discovery = Discovery::default();
    for entry in WalkDir::new(root)
        .follow_links(config.follow_links)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                discovery.errors.push(RequestsError::Walk(e));
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file()
            || !config.matches_extension(path)
            || config.should_ignore_path(path)
        {
            continue;
        }
        discovery.files.push(path.to_path_buf());
    }

    log::info!(
        "Found {} manifest file(s) under {}",
        discovery.files.len(),
        root.display()
    );
    Ok(discovery)
}

/// Read a file and split it into its YAML documents.
pub fn read_documents(path: &Path) -> Result<Vec<ManifestDocument>> {
    let content = std::fs::read_to_string(path).map_err(|source| RequestsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(documents_from_str(path, &content))
}

/// Split already loaded content into documents attributed to `path`.
pub fn documents_from_str(path: &Path, content: &str) -> Vec<ManifestDocument> {
    let documents = split_documents(content);
    let count = documents.len();
    documents
        .into_iter()
        .enumerate()
        .map(|(index, doc)| ManifestDocument::new(SourceId::new(path, index, count), doc))
        .collect()
}

/// Split multi-document YAML on `---` lines.
///
/// Documents that are empty or only hold comments are dropped. Text after a
/// `---` marker on the same line starts the next document.
pub fn split_documents(content: &str) -> Vec<String> {
    let mut documents = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        if let Some(rest) = separator_remainder(line) {
            push_document(&mut documents, std::mem::take(&mut current));
            if !rest.is_empty() && !rest.starts_with('#') {
                current.push_str(rest);
                current.push('\n');
            }
            continue;
        }
        if line.trim_end() == "..." {
            push_document(&mut documents, std::mem::take(&mut current));
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    push_document(&mut documents, current);

    documents
}

/// For a `---` separator line, the trimmed text that follows the marker.
fn separator_remainder(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("---")?;
    if rest.is_empty() || rest.starts_with([' ', '\t']) {
        Some(rest.trim())
    } else {
        None
    }
}

fn push_document(documents: &mut Vec<String>, document: String) {
    let has_content = document.lines().any(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    });
    if has_content {
        documents.push(document);
    }
}

use crate::chunking::classify;
use crate::models::{LawCategory, SourceType};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ScannedDocument {
    pub path: PathBuf,
    pub source_type: SourceType,
    pub category: LawCategory,
}

/// Walks the source-document tree and assigns each file a format (from its
/// extension) and a category (from its top-level directory). Files with
/// unrecognized extensions are ignored.
pub fn scan_docs(root: &Path) -> Vec<ScannedDocument> {
    let mut docs = Vec::new();
    let walker = WalkBuilder::new(root).build();

    for result in walker {
        match result {
            Ok(entry) => {
                if !entry.file_type().map_or(false, |ft| ft.is_file()) {
                    continue;
                }
                let path = entry.path();
                let source_type = match path
                    .extension()
                    .and_then(|s| s.to_str())
                    .and_then(SourceType::from_extension)
                {
                    Some(st) => st,
                    None => continue,
                };
                docs.push(ScannedDocument {
                    path: path.to_path_buf(),
                    source_type,
                    category: category_for_path(root, path),
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "error scanning docs tree");
            }
        }
    }

    docs
}

fn category_for_path(root: &Path, path: &Path) -> LawCategory {
    path.strip_prefix(root)
        .ok()
        .and_then(|rel| rel.components().next())
        .and_then(|c| c.as_os_str().to_str().map(classify::category_for_dir))
        .unwrap_or(LawCategory::Unknown)
}

//! Upload of a generated pyramid to object storage.
//!
//! Every regular file under the output directory becomes one object whose
//! key is the file's path relative to that directory, joined with `/` on
//! every platform. Descriptors are uploaded after all tiles so a viewer never
//! finds a `.dzi` pointing at tiles that are not there yet.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::dzi::DZI_EXTENSION;
use crate::error::UploadError;

use super::object_store::ObjectStore;

/// A local file and the object key it is uploaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEntry {
    pub path: PathBuf,
    pub key: String,
}

impl UploadEntry {
    fn is_descriptor(&self) -> bool {
        self.path
            .extension()
            .map(|ext| ext == DZI_EXTENSION)
            .unwrap_or(false)
    }
}

/// Totals of an [`upload_directory`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub objects: usize,
    pub bytes: u64,
}

/// Object key for `path` relative to `root`, with `/` separators.
///
/// Returns `None` if `path` is not under `root`.
pub fn object_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// MIME type from a file's extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("dzi") | Some("xml") => "application/xml",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// Enumerate every regular file under `root`.
///
/// Tiles come first in key order, descriptors last.
pub fn collect_upload_entries(root: &Path) -> Result<Vec<UploadEntry>, UploadError> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| UploadError::Local {
            path: root.display().to_string(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if let Some(key) = object_key(root, &path) {
            entries.push(UploadEntry { path, key });
        }
    }

    entries.sort_by(|a, b| {
        a.is_descriptor()
            .cmp(&b.is_descriptor())
            .then_with(|| a.key.cmp(&b.key))
    });

    Ok(entries)
}

/// Upload every file under `root` to `store`, keys prefixed with `prefix`.
///
/// Uploads are sequential and not retried; the first failure aborts.
pub async fn upload_directory<S>(
    store: &S,
    root: &Path,
    prefix: &str,
) -> Result<UploadSummary, UploadError>
where
    S: ObjectStore + ?Sized,
{
    let entries = collect_upload_entries(root)?;
    info!(
        "Uploading {} files to {}...",
        entries.len(),
        store.identifier()
    );

    let mut summary = UploadSummary::default();
    for entry in &entries {
        let data = tokio::fs::read(&entry.path)
            .await
            .map_err(|e| UploadError::Local {
                path: entry.path.display().to_string(),
                message: e.to_string(),
            })?;
        let key = format!("{}{}", prefix, entry.key);

        debug!("Uploading {}...", key);
        summary.bytes += data.len() as u64;
        store
            .put_object(&key, Bytes::from(data), content_type_for(&entry.path))
            .await?;
        summary.objects += 1;
    }

    info!(
        "Uploaded {} objects ({} bytes) to {}",
        summary.objects,
        summary.bytes,
        store.identifier()
    );

    Ok(summary)
}

//! Test utilities for integration tests.
//!
//! This module provides a mock object store and helpers for creating test
//! source images.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, Rgb, RgbImage};
use tokio::sync::RwLock;

use dzi_tiler::error::UploadError;
use dzi_tiler::io::ObjectStore;

// =============================================================================
// Mock Object Store
// =============================================================================

/// An in-memory object store that records every upload in order.
///
/// Can be configured to fail after a number of successful uploads.
#[derive(Clone)]
pub struct MockObjectStore {
    objects: Arc<RwLock<BTreeMap<String, (Bytes, String)>>>,
    order: Arc<RwLock<Vec<String>>>,
    put_count: Arc<AtomicUsize>,
    fail_after: Option<usize>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            order: Arc::new(RwLock::new(Vec::new())),
            put_count: Arc::new(AtomicUsize::new(0)),
            fail_after: None,
        }
    }

    /// Reject every upload after the first `n`.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::new()
        }
    }

    pub fn put_count(&self) -> usize {
        self.put_count.load(Ordering::SeqCst)
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    pub async fn upload_order(&self) -> Vec<String> {
        self.order.read().await.clone()
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).map(|(data, _)| data.clone())
    }

    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|(_, content_type)| content_type.clone())
    }
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), UploadError> {
        let attempt = self.put_count.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.fail_after {
            if attempt >= limit {
                return Err(UploadError::Connection(format!("mock failure on {}", key)));
            }
        }

        self.order.write().await.push(key.to_string());
        self.objects
            .write()
            .await
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    fn identifier(&self) -> &str {
        "mock://bucket"
    }
}

// =============================================================================
// Test Images
// =============================================================================

/// A deterministic RGB test pattern.
pub fn test_pattern(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            if (x / 16 + y / 16) % 2 == 0 { 220 } else { 30 },
        ])
    }))
}

/// Save the test pattern to `dir/name` (format from the extension).
pub fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    test_pattern(width, height).save(&path).unwrap();
    path
}

/// All files under `root` as sorted relative forward-slash paths.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| dzi_tiler::object_key(root, e.path()))
        .collect();
    files.sort();
    files
}

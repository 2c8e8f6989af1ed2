//! Upload integration tests.
//!
//! Tests verify:
//! - Every generated file is uploaded under its relative forward-slash key
//! - The descriptor is uploaded after all tiles
//! - Key prefixes and content types
//! - The first failing upload aborts the run

use dzi_tiler::{
    upload_directory, DeepZoomBuilder, PyramidConfig, TileFormat, UploadError,
};

use super::test_utils::{list_files, test_pattern, MockObjectStore};

fn generate(root: &std::path::Path, name: &str) -> u64 {
    let config = PyramidConfig {
        tile_size: 64,
        overlap: 1,
        format: TileFormat::jpeg(85),
    };
    DeepZoomBuilder::new(config)
        .create_dzi_from_image(&test_pattern(200, 90), &root.join(format!("{}.dzi", name)))
        .unwrap()
        .tiles_written
}

#[tokio::test]
async fn test_upload_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let tiles = generate(dir.path(), "sample1");
    let store = MockObjectStore::new();

    let summary = upload_directory(&store, dir.path(), "").await.unwrap();

    assert_eq!(summary.objects as u64, tiles + 1);
    assert_eq!(store.keys().await, {
        let mut files = list_files(dir.path());
        files.sort();
        files
    });

    let descriptor = store.get("sample1.dzi").await.unwrap();
    assert_eq!(
        descriptor,
        std::fs::read(dir.path().join("sample1.dzi")).unwrap()
    );
    assert!(store.get("sample1_files/8/3_1.jpg").await.is_some());
}

#[tokio::test]
async fn test_descriptor_uploaded_last() {
    let dir = tempfile::tempdir().unwrap();
    generate(dir.path(), "sample1");
    let store = MockObjectStore::new();

    upload_directory(&store, dir.path(), "").await.unwrap();

    let order = store.upload_order().await;
    assert_eq!(order.last().map(String::as_str), Some("sample1.dzi"));
    assert!(order[..order.len() - 1]
        .iter()
        .all(|key| key.starts_with("sample1_files/")));
}

#[tokio::test]
async fn test_upload_with_prefix_and_content_types() {
    let dir = tempfile::tempdir().unwrap();
    generate(dir.path(), "scan");
    let store = MockObjectStore::new();

    upload_directory(&store, dir.path(), "pyramids/").await.unwrap();

    for key in store.keys().await {
        assert!(key.starts_with("pyramids/"), "{}", key);
        assert!(!key.contains('\\'));
    }
    assert_eq!(
        store.content_type("pyramids/scan.dzi").await.as_deref(),
        Some("application/xml")
    );
    assert_eq!(
        store.content_type("pyramids/scan_files/0/0_0.jpg").await.as_deref(),
        Some("image/jpeg")
    );
}

#[tokio::test]
async fn test_upload_failure_aborts() {
    let dir = tempfile::tempdir().unwrap();
    generate(dir.path(), "sample1");
    let store = MockObjectStore::failing_after(3);

    let result = upload_directory(&store, dir.path(), "").await;

    assert!(matches!(result, Err(UploadError::Connection(_))));
    // No retries and no further attempts after the failure
    assert_eq!(store.put_count(), 4);
    assert_eq!(store.keys().await.len(), 3);
    assert!(store.get("sample1.dzi").await.is_none());
}

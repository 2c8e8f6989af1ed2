//! End-to-end pyramid generation tests.
//!
//! Tests verify:
//! - The output layout matches the Deep Zoom convention
//! - Every level has the planned dimensions and tile grid
//! - The descriptor round-trips and is written last
//! - Regeneration is idempotent

use std::fs;

use image::GenericImageView;

use dzi_tiler::{
    verify_pyramid, DeepZoomBuilder, DziDescriptor, PyramidConfig, PyramidError, PyramidPlan,
    TileFormat,
};

use super::test_utils::{list_files, write_test_image};

fn config(format: TileFormat) -> PyramidConfig {
    PyramidConfig {
        tile_size: 254,
        overlap: 1,
        format,
    }
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_generate_from_jpeg_file() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let source = write_test_image(input_dir.path(), "sample1.jpg", 512, 300);
    let dzi_path = output_dir.path().join("sample1.dzi");

    let summary = DeepZoomBuilder::new(PyramidConfig::default())
        .create_dzi(&source, &dzi_path)
        .unwrap();

    assert_eq!((summary.width, summary.height), (512, 300));
    assert_eq!(summary.max_level, 9);
    assert_eq!(summary.tiles_written, 16);

    let files = list_files(output_dir.path());
    assert_eq!(files.len(), 17);
    assert!(files.contains(&"sample1.dzi".to_string()));
    for name in ["0_0", "1_0", "2_0", "0_1", "1_1", "2_1"] {
        assert!(files.contains(&format!("sample1_files/9/{}.jpg", name)));
    }
    assert!(files.contains(&"sample1_files/8/1_0.jpg".to_string()));
    assert!(files.contains(&"sample1_files/0/0_0.jpg".to_string()));
}

#[test]
fn test_tile_dimensions_follow_plan() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let source = write_test_image(input_dir.path(), "scan.png", 700, 333);
    let dzi_path = output_dir.path().join("scan.dzi");

    let config = PyramidConfig {
        tile_size: 128,
        overlap: 2,
        format: TileFormat::Png,
    };
    DeepZoomBuilder::new(config)
        .create_dzi(&source, &dzi_path)
        .unwrap();

    let plan = PyramidPlan::new(700, 333, 128, 2).unwrap();
    let tiles_dir = output_dir.path().join("scan_files");
    for level in &plan.levels {
        for tile in plan.tiles_for(level) {
            let path = tiles_dir
                .join(level.index.to_string())
                .join(tile.file_name("png"));
            let decoded = image::open(&path).unwrap();
            assert_eq!(
                decoded.dimensions(),
                (tile.region.width(), tile.region.height()),
                "tile {}",
                path.display()
            );
        }
    }
}

#[test]
fn test_single_pixel_source() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let source = write_test_image(input_dir.path(), "dot.png", 1, 1);
    let dzi_path = output_dir.path().join("dot.dzi");

    let summary = DeepZoomBuilder::new(config(TileFormat::jpeg(85)))
        .create_dzi(&source, &dzi_path)
        .unwrap();

    assert_eq!(summary.max_level, 0);
    assert_eq!(summary.levels, 1);
    assert_eq!(summary.tiles_written, 1);
    assert_eq!(
        list_files(output_dir.path()),
        vec!["dot.dzi".to_string(), "dot_files/0/0_0.jpg".to_string()]
    );

    let tile = image::open(output_dir.path().join("dot_files/0/0_0.jpg")).unwrap();
    assert_eq!(tile.dimensions(), (1, 1));
}

// =============================================================================
// Descriptor
// =============================================================================

#[test]
fn test_descriptor_matches_configuration() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let source = write_test_image(input_dir.path(), "wide.png", 1000, 10);
    let dzi_path = output_dir.path().join("wide.dzi");

    let config = PyramidConfig {
        tile_size: 510,
        overlap: 3,
        format: TileFormat::Png,
    };
    DeepZoomBuilder::new(config)
        .create_dzi(&source, &dzi_path)
        .unwrap();

    let xml = fs::read_to_string(&dzi_path).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("http://schemas.microsoft.com/deepzoom/2008"));

    let descriptor = DziDescriptor::parse(&xml).unwrap();
    assert_eq!(descriptor.format, "png");
    assert_eq!(descriptor.overlap, 3);
    assert_eq!(descriptor.tile_size, 510);
    assert_eq!((descriptor.width, descriptor.height), (1000, 10));
}

#[test]
fn test_generated_pyramid_verifies() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let source = write_test_image(input_dir.path(), "check.png", 300, 520);
    let dzi_path = output_dir.path().join("check.dzi");

    let summary = DeepZoomBuilder::new(config(TileFormat::jpeg(60)))
        .create_dzi(&source, &dzi_path)
        .unwrap();

    let report = verify_pyramid(&dzi_path).unwrap();
    assert!(report.is_complete(), "{:?}", report);
    assert_eq!(report.expected, summary.tiles_written);
}

// =============================================================================
// Idempotence and failures
// =============================================================================

#[test]
fn test_regeneration_is_idempotent() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let source = write_test_image(input_dir.path(), "again.png", 400, 260);
    let dzi_path = output_dir.path().join("again.dzi");
    let builder = DeepZoomBuilder::new(config(TileFormat::Png));

    let first = builder.create_dzi(&source, &dzi_path).unwrap();
    let first_descriptor = fs::read(&dzi_path).unwrap();
    let first_files = list_files(output_dir.path());

    let second = builder.create_dzi(&source, &dzi_path).unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&dzi_path).unwrap(), first_descriptor);
    assert_eq!(list_files(output_dir.path()), first_files);
}

#[test]
fn test_undecodable_source_writes_nothing() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let source = input_dir.path().join("broken.png");
    fs::write(&source, b"definitely not an image").unwrap();
    let dzi_path = output_dir.path().join("broken.dzi");

    let err = DeepZoomBuilder::new(PyramidConfig::default())
        .create_dzi(&source, &dzi_path)
        .unwrap_err();

    assert!(matches!(err, PyramidError::Decode { .. }));
    assert!(list_files(output_dir.path()).is_empty());
}

#[test]
fn test_invalid_tile_size_fails_before_decode() {
    let output_dir = tempfile::tempdir().unwrap();
    let config = PyramidConfig {
        tile_size: 0,
        ..PyramidConfig::default()
    };

    // The source does not exist; the configuration error must win
    let err = DeepZoomBuilder::new(config)
        .create_dzi(
            &output_dir.path().join("missing.jpg"),
            &output_dir.path().join("x.dzi"),
        )
        .unwrap_err();

    assert!(matches!(err, PyramidError::InvalidTileSize(0)));
}

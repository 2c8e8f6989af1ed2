//! DZI Tiler - Deep Zoom pyramid generator.
//!
//! This binary parses the command line and runs one of the subcommands.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dzi_tiler::{
    config::{Cli, Command, GenerateConfig, PublishConfig, PyramidConfig, VerifyConfig},
    create_s3_client, upload_directory, verify_pyramid, DeepZoomBuilder, PyramidError,
    PyramidSummary, S3ObjectStore,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Generate(config) => run_generate(config).await,
        Command::Publish(config) => run_publish(config).await,
        Command::Verify(config) => run_verify(config),
    }
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr; stdout carries only `--json` documents.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "dzi_tiler=debug"
    } else {
        "dzi_tiler=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the synchronous build off the async runtime.
async fn build_pyramid(
    config: PyramidConfig,
    input: PathBuf,
    dzi_path: PathBuf,
) -> Result<PyramidSummary, PyramidError> {
    let task = tokio::task::spawn_blocking(move || {
        DeepZoomBuilder::new(config).create_dzi(&input, &dzi_path)
    });

    match task.await {
        Ok(result) => result,
        Err(e) => Err(PyramidError::Io {
            path: String::new(),
            message: format!("pyramid build task failed: {}", e),
        }),
    }
}

// =============================================================================
// Generate Command
// =============================================================================

async fn run_generate(config: GenerateConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let dzi_path = match config.dzi_path() {
        Ok(path) => path,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pyramid_config = config.tiling.pyramid_config();
    info!("Configuration:");
    info!("  Input: {}", config.input.display());
    info!("  Output: {}", dzi_path.display());
    info!(
        "  Tiles: {}px, overlap {}px, {}",
        pyramid_config.tile_size, pyramid_config.overlap, pyramid_config.format
    );

    let summary = match build_pyramid(pyramid_config, config.input.clone(), dzi_path).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Pyramid generation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize summary: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Publish Command
// =============================================================================

async fn run_publish(config: PublishConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let name = match config.pyramid_name() {
        Ok(name) => name,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Configuration:");
    info!("  Input: {}", config.input.display());
    info!("  S3 bucket: {}", config.s3_bucket);
    if let Some(ref endpoint) = config.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", config.s3_region);

    if !config.input.exists() {
        error!("Input file {} not found!", config.input.display());
        return ExitCode::FAILURE;
    }

    let client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;
    let store = S3ObjectStore::new(client, config.s3_bucket.clone());

    if let Err(e) = store.ensure_bucket(config.create_bucket).await {
        error!("Failed to access bucket '{}': {}", config.s3_bucket, e);
        error!("");
        error!("  Please check:");
        error!("    - Your AWS credentials are configured correctly");
        error!("    - The bucket exists (or pass --create-bucket)");
        error!("    - The S3 endpoint is correct (if using MinIO/custom S3)");
        return ExitCode::FAILURE;
    }

    // Removed when dropped, on success and on failure alike
    let work_dir = match tempfile::Builder::new().prefix("dzi-tiler-").tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            error!("Failed to create temporary directory: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Processing in temporary directory: {}", work_dir.path().display());

    let dzi_path = work_dir.path().join(format!("{}.dzi", name));
    let pyramid_config = config.tiling.pyramid_config();
    let summary = match build_pyramid(pyramid_config, config.input.clone(), dzi_path).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Pyramid generation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let prefix = config.key_prefix();
    match upload_directory(&store, work_dir.path(), &prefix).await {
        Ok(upload) => {
            info!(
                "Published {} ({} tiles, {} objects) to s3://{}/{}{}.dzi",
                name, summary.tiles_written, upload.objects, config.s3_bucket, prefix, name
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Upload failed: {}", e);
            warn!("The bucket may contain a partial pyramid without its descriptor");
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Verify Command
// =============================================================================

fn run_verify(config: VerifyConfig) -> ExitCode {
    init_logging(config.verbose);

    let report = match verify_pyramid(&config.dzi) {
        Ok(report) => report,
        Err(e) => {
            error!("Verification failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        info!("{}/{} tiles present", report.found, report.expected);
        for tile in &report.missing {
            warn!("  missing: {}", tile);
        }
        for tile in &report.unexpected {
            warn!("  unexpected: {}", tile);
        }
    }

    if report.is_complete() {
        info!("Pyramid {} is complete", config.dzi.display());
        ExitCode::SUCCESS
    } else {
        error!("Pyramid {} is incomplete", config.dzi.display());
        ExitCode::FAILURE
    }
}

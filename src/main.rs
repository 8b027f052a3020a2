use anyhow::{Context, Result};
use std::{path::Path, sync::Arc};
use tracing_subscriber::EnvFilter;

use photo_gallery::{
    capture::{FileCamera, LocalMediaSource},
    config::{AppConfig, Command},
    models::{capture::CaptureRequest, photo::PhotoRecord},
    services::{encoder::Host, gallery::GalleryController},
    stores::{FsBlobStore, SqliteKeyValueStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("photo_gallery=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // --- Parse config + command ---
    let (cfg, command) = AppConfig::from_env_and_args()?;
    tracing::debug!("Starting photo-gallery with config: {:?}", cfg);

    // --- Open stores ---
    let blobs = FsBlobStore::open(&cfg.data_dir)
        .await
        .with_context(|| format!("opening blob store at {}", cfg.data_dir))?;

    // SQLite will not create missing parent directories itself.
    let db_path = cfg
        .database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }
    let kv = SqliteKeyValueStore::connect(&cfg.database_url)
        .await
        .with_context(|| format!("opening metadata store {}", cfg.database_url))?;

    // --- Build controller ---
    let (image, request) = match &command {
        Command::Take { image, source } => (Some(image.clone()), CaptureRequest::new(*source)),
        _ => (None, CaptureRequest::default()),
    };
    let host = Host::select(cfg.is_native(), &cfg.display_origin);
    let gallery = GalleryController::new(
        host,
        Arc::new(FileCamera::new(image, cfg.is_native())),
        Arc::new(LocalMediaSource::new()),
        Arc::new(blobs),
        Arc::new(kv),
    )
    .with_capture_request(request);

    // The one-time startup point.
    gallery.initialize().await.context("rehydrating gallery")?;

    match command {
        Command::Take { .. } => {
            let record = gallery.take_photo().await?;
            println!("{}", record.locator);
        }
        Command::List { json } => {
            let photos = gallery.photos();
            if json {
                println!("{}", serde_json::to_string_pretty(&photos)?);
            } else {
                for photo in &photos {
                    println!(
                        "{}\t{}\t{}",
                        photo.locator,
                        photo.display_reference.as_deref().unwrap_or("-"),
                        photo
                            .inline_content
                            .as_ref()
                            .map(|c| format!("inline:{}", c.len()))
                            .unwrap_or_else(|| "-".into())
                    );
                }
            }
        }
        Command::Delete { locator } => {
            gallery.delete_photo(&PhotoRecord::new(locator, None)).await?;
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use image_uploadr::config::UploaderConfig;
use image_uploadr::{Callbacks, ImagePayload, PhotoUploadResponse};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "image-uploadr")]
#[command(about = "Upload an image to the configured endpoint")]
struct CliArgs {
    /// Image file to upload, in any format the encoder can read.
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Endpoint to use instead of UPLOADR_ENDPOINT.
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_uploadr=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = match UploaderConfig::from_env_with_endpoint(args.endpoint.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Unable to read {}", args.image.display()))?;

    let client = config.client()?;
    let failed = Arc::new(AtomicBool::new(false));

    let callbacks = Callbacks::<PhotoUploadResponse>::new()
        .pre_upload(|| info!("Starting upload"))
        .progress(|progress| info!("Upload progress: {:.0}%", progress * 100.0))
        .success({
            let endpoint = config.endpoint.clone();
            move |response| match (response.resolved_image_url(&endpoint), response.image_url) {
                (Some(url), _) => println!("{}", url),
                (None, Some(reference)) => println!("{}", reference),
                (None, None) => info!("Upload succeeded but the server returned no image URL"),
            }
        })
        .failure({
            let failed = failed.clone();
            move |message| {
                error!("Upload failed: {}", message);
                failed.store(true, Ordering::SeqCst);
            }
        });

    client.upload(ImagePayload::Encoded(bytes), &callbacks).await;

    if failed.load(Ordering::SeqCst) {
        std::process::exit(1);
    }
    Ok(())
}

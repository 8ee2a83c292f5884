use std::sync::Arc;

use anyhow::{Context, Result};
use client_core::{load_config, GallerySession, HttpInfographicApi, ResourceState};
use shared::protocol::InfographicRecord;
use tokio_stream::StreamExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config().context("failed to load client configuration")?;
    info!(api_base_url = %config.api_base_url, "gallery starting");

    let gallery = GallerySession::mount(Arc::new(HttpInfographicApi::new(config)));
    let mut changes = gallery.listing().changes();
    while let Some(state) = changes.next().await {
        match state {
            ResourceState::Pending => info!("loading infographics"),
            ResourceState::Ready(records) => {
                print_gallery(&records);
                return Ok(());
            }
            ResourceState::Errored(err) => {
                error!(error = %err, "failed to load infographics");
                return Err(err.into());
            }
        }
    }

    Ok(())
}

fn print_gallery(records: &[InfographicRecord]) {
    if records.is_empty() {
        println!("No infographics yet.");
        return;
    }

    for record in records {
        match record.category_badge() {
            Some((category, style)) => println!("{} [{category} | {style}]", record.title),
            None => println!("{}", record.title),
        }
        println!("    page:      {}", record.page_url);
        println!("    thumbnail: {}", record.thumbnail_url);
        println!("    added:     {}", record.created_at);
    }
}

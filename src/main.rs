use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use reel_tv::backends::jellyfin::{JellyfinApi, StreamUrlBuilder};
use reel_tv::config::Config;
use reel_tv::models::{ItemId, ticks_to_seconds};
use reel_tv::session::ResumePositionResolver;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reel_tv=debug")),
        )
        .init();

    let item_id = std::env::args()
        .nth(1)
        .context("usage: reel-tv <item-id>")?;

    let config = Config::load()?;
    let credentials = config.credentials()?;
    let prefs = config.streaming_preferences();
    info!("Using device id {}", prefs.device_id);

    let api = JellyfinApi::new(&credentials, prefs.device_id.clone())?;
    let item = api
        .get_item(&ItemId::new(item_id))
        .await
        .context("Failed to fetch item")?;

    println!("{} ({:?}, {:.0}s)", item.name, item.media_type, item.duration_seconds());
    match ResumePositionResolver::resolve(&item) {
        Some(position) => println!("Resume at {:.1}s", position),
        None => match item.playback_position_ticks() {
            Some(ticks) if ticks > 0 => println!(
                "Saved position {:.1}s is outside the resume window, starting from 0",
                ticks_to_seconds(ticks)
            ),
            _ => println!("Starting from 0"),
        },
    }

    let transcode = StreamUrlBuilder::build(&item, &prefs, &credentials)?;
    println!("Transcode: {}", transcode);
    let direct = StreamUrlBuilder::direct(&item, &prefs, &credentials)?;
    println!("Direct:    {}", direct);

    Ok(())
}

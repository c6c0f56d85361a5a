use std::time::Duration;
use chrono::{DateTime, Utc};
use colored::Colorize;
use log::info;
use crate::config::{Command, Config};
use crate::coordinator::{LibraryCoordinator, LibraryState, LoadStatus};
use crate::entities::{Album, MediaItem};
use crate::index::MediaIndex;
use crate::utils::format_utils::{format_duration, format_file_size};

pub async fn run<I: MediaIndex + 'static>(index: I, config: Config) -> anyhow::Result<()> {
    let coordinator = LibraryCoordinator::new(index, config.coordinator);
    let result = match config.command {
        Command::Media { limit } => print_media(&coordinator, limit).await,
        Command::Albums => print_albums(&coordinator).await,
        Command::Watch { interval } => watch(&coordinator, interval).await,
    };
    coordinator.shutdown();
    result
}

pub async fn print_media<I: MediaIndex + 'static>(coordinator: &LibraryCoordinator<I>, limit: Option<usize>) -> anyhow::Result<()> {
    let state = loaded_state(coordinator).await?;
    for item in state.items.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{}", describe_item(item));
    }
    println!("{}", summary(&state));
    Ok(())
}

pub async fn print_albums<I: MediaIndex + 'static>(coordinator: &LibraryCoordinator<I>) -> anyhow::Result<()> {
    let state = loaded_state(coordinator).await?;
    for album in state.albums.iter() {
        println!("{}", describe_album(album));
    }
    println!("{}", summary(&state));
    Ok(())
}

pub async fn watch<I: MediaIndex + 'static>(coordinator: &LibraryCoordinator<I>, interval: Duration) -> anyhow::Result<()> {
    let mut state_rx = coordinator.subscribe();
    println!("{}", describe_state(&state_rx.borrow_and_update()));

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal?;
                info!("interrupted, stopping watch");
                break;
            }
            _ = ticker.tick() => {
                coordinator.reload_if_idle();
            }
            changed = state_rx.changed() => {
                changed?;
                let state = state_rx.borrow_and_update().clone();
                println!("{}", describe_state(&state));
            }
        }
    }
    Ok(())
}

async fn loaded_state<I: MediaIndex + 'static>(coordinator: &LibraryCoordinator<I>) -> anyhow::Result<std::sync::Arc<LibraryState>> {
    let state = coordinator.wait_until_loaded().await;
    if let Some(e) = &state.last_error {
        anyhow::bail!("failed to load media: {}", e);
    }
    Ok(state)
}

pub fn describe_item(item: &MediaItem) -> String {
    let date = DateTime::<Utc>::from_timestamp(item.date_added, 0)
        .map(|x| x.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| item.date_added.to_string());
    let duration = if item.is_video() { format_duration(item.duration_ms) } else { String::new() };
    format!("{}  {:5}  {:>9}  {:>7}  {}", date, item.kind, format_file_size(item.size_bytes), duration, item.path)
}

pub fn describe_album(album: &Album) -> String {
    let cover = album.cover_item().map(|x| x.display_name.as_str()).unwrap_or_default();
    let name = if album.name().is_empty() { "(root)" } else { album.name() };
    format!("{}  {} items  cover: {}", name.bold(), album.len(), cover)
}

pub fn describe_state(state: &LibraryState) -> String {
    match state.status {
        LoadStatus::Idle => "idle".to_string(),
        LoadStatus::Loading => format!("load #{} running...", state.generation),
        LoadStatus::Ready => format!("load #{} ready: {}", state.generation, summary(state)),
        LoadStatus::Failed => {
            let reason = state.last_error.as_ref().map(|e| e.to_string()).unwrap_or_default();
            format!("load #{} failed: {} (keeping {})", state.generation, reason.red(), summary(state))
        }
    }
}

fn summary(state: &LibraryState) -> String {
    let mut summary = format!("{} items in {} albums", state.items.len(), state.albums.len());
    if state.skipped_rows > 0 {
        summary.push_str(&format!(", {} rows skipped", state.skipped_rows));
    }
    summary
}

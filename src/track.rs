use std::sync::Arc;

use anyhow::Result;
use bundl_application::prelude::{track_location_samples, SubscriptionManager};
use bundl_core::{
    entities::{GeoCoordinate, LocationSample, SubscriptionStatus},
    gateways::{clock::Clock, topic::TopicGateway},
};
use futures::{stream, Stream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

const FALLBACK_MARKER: &str = "fallback";

/// Feed the locations read from stdin into the manager
/// until the input ends.
pub async fn run<G, C>(manager: Arc<SubscriptionManager<G, C>>, cleanup_on_exit: bool) -> Result<()>
where
    G: TopicGateway + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut status_rx = manager.watch_status();
    let reporter = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move {
            while status_rx.changed().await.is_ok() {
                let status = *status_rx.borrow_and_update();
                if status == SubscriptionStatus::Updating {
                    continue;
                }
                println!("{status}: {}", manager.info().summary());
            }
        }
    });

    let samples = location_samples(BufReader::new(tokio::io::stdin()));
    track_location_samples(&manager, samples).await;
    reporter.abort();

    let info = manager.info();
    if let Some(pos) = info.last_location {
        println!("Last location: {pos}");
    }
    for cell in sorted_cells(&manager) {
        println!("{cell}");
    }
    println!("{}", info.summary());

    if cleanup_on_exit {
        manager.cleanup().await;
    }
    Ok(())
}

fn sorted_cells<G, C>(manager: &SubscriptionManager<G, C>) -> Vec<String>
where
    G: TopicGateway + Send + Sync,
    C: Clock + Send + Sync,
{
    let mut cells: Vec<_> = manager
        .current_cells()
        .into_iter()
        .map(|cell| cell.into_string())
        .collect();
    cells.sort();
    cells
}

/// One location per line as `lat,lon`, optionally followed
/// by `fallback` for positions that were not provided by the user.
pub fn location_samples<R>(reader: R) -> impl Stream<Item = LocationSample>
where
    R: AsyncBufRead + Unpin,
{
    stream::unfold(reader.lines(), |mut lines| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((line, lines)),
            Ok(None) => None,
            Err(err) => {
                log::error!("Failed to read location: {err}");
                None
            }
        }
    })
    .filter_map(|line| async move { parse_sample(&line) })
}

fn parse_sample(line: &str) -> Option<LocationSample> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (pos, is_user_provided) = match line.strip_suffix(FALLBACK_MARKER) {
        Some(pos) if pos.ends_with(char::is_whitespace) => (pos.trim_end(), false),
        _ => (line, true),
    };
    match pos.parse::<GeoCoordinate>() {
        Ok(pos) if is_user_provided => Some(LocationSample::user_provided(pos)),
        Ok(pos) => Some(LocationSample::fallback(pos)),
        Err(err) => {
            log::warn!("Ignoring invalid location '{line}': {err}");
            None
        }
    }
}

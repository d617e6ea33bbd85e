//! Transcript replay.
//!
//! Reads raw IRC lines, decodes the presence events among them and feeds them
//! to a presence session in order.

use crate::config::Config;
use crate::metrics;
use anyhow::{Context, Result};
use bytes::BytesMut;
use roster_core::{PresenceSnapshot, PresenceStore, Session, SessionHandle};
use roster_protocol::LineCodec;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

/// Replay counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Events handed to the session.
    pub events: u64,
    /// Lines that failed to decode.
    pub errors: u64,
}

/// Replay a transcript file, or stdin when no path is given.
///
/// # Errors
///
/// Returns an error if the input cannot be read or the session stops early.
pub async fn run_replay(config: Config, input: Option<&Path>) -> Result<PresenceSnapshot> {
    if config.metrics.enabled {
        metrics::init_metrics();
        if let Err(e) = metrics::start_metrics_server(config.metrics.port) {
            warn!("Failed to start metrics server: {}", e);
        }
    }

    let mut store = PresenceStore::with_config(config.store_config());
    store.set_own_nick(config.nick.clone());
    let (handle, task) = Session::spawn(store);

    let stats = match input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open transcript: {}", path.display()))?;
            info!("Replaying {}", path.display());
            replay(file, &handle, config.read_buffer).await?
        }
        None => {
            info!("Replaying stdin");
            replay(tokio::io::stdin(), &handle, config.read_buffer).await?
        }
    };

    let snapshot = handle.snapshot().await?;
    let store_stats = handle.stats().await?;
    metrics::set_store_stats(&store_stats);
    handle.shutdown()?;
    task.await.context("Presence session panicked")?;

    info!(
        events = stats.events,
        errors = stats.errors,
        channels = store_stats.channels,
        nicks = store_stats.nicks,
        desyncs = store_stats.desyncs,
        "Replay finished"
    );

    Ok(snapshot)
}

/// Feed every presence event read from `reader` to the session.
///
/// Undecodable lines are logged and skipped. A final line without a
/// terminator is still decoded.
///
/// # Errors
///
/// Returns an error if reading fails or the session has stopped.
pub async fn replay<R>(mut reader: R, handle: &SessionHandle, buffer: usize) -> Result<ReplayStats>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = LineCodec::new();
    let mut read_buffer = BytesMut::with_capacity(buffer.max(512));
    let mut stats = ReplayStats::default();

    loop {
        let read = reader
            .read_buf(&mut read_buffer)
            .await
            .context("Failed to read transcript")?;

        if read == 0 && !read_buffer.is_empty() && !read_buffer.ends_with(b"\n") {
            read_buffer.extend_from_slice(b"\r\n");
        }

        loop {
            match decoder.decode_from(&mut read_buffer) {
                Ok(Some(event)) => {
                    metrics::record_event(event.kind());
                    handle.apply(event)?;
                    stats.events += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable line");
                    metrics::record_decode_error();
                    stats.errors += 1;
                }
            }
        }

        if read == 0 {
            debug!("Transcript ended");
            break;
        }
    }

    Ok(stats)
}

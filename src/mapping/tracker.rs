use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{debug, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{CoordinateMapper, MappedPosition, Pose};

/// Follows the live pose stream and republishes it in map-pixel space for the
/// marker overlay.
pub struct MarkerTracker {
    mapper: CoordinateMapper,
    marker_tx: Arc<watch::Sender<MappedPosition>>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl MarkerTracker {
    pub fn new(mapper: CoordinateMapper) -> Self {
        let (marker_tx, _) = watch::channel(MappedPosition::default());
        Self {
            mapper,
            marker_tx: Arc::new(marker_tx),
            handle: None,
            cancel_token: None,
        }
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn subscribe(&self) -> watch::Receiver<MappedPosition> {
        self.marker_tx.subscribe()
    }

    pub fn current(&self) -> MappedPosition {
        *self.marker_tx.borrow()
    }

    pub fn start(&mut self, poses: watch::Receiver<Pose>) -> Result<()> {
        if self.handle.is_some() {
            bail!("marker tracking already active");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(track_loop(
            self.mapper,
            poses,
            self.marker_tx.clone(),
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("marker tracking task failed to join")
        } else {
            Ok(())
        }
    }
}

async fn track_loop(
    mapper: CoordinateMapper,
    mut poses: watch::Receiver<Pose>,
    marker_tx: Arc<watch::Sender<MappedPosition>>,
    cancel_token: CancellationToken,
) {
    let initial = *poses.borrow_and_update();
    marker_tx.send_replace(mapper.map(initial));

    loop {
        tokio::select! {
            changed = poses.changed() => {
                if changed.is_err() {
                    info!("pose stream closed; marker tracking stopped");
                    break;
                }
                let pose = *poses.borrow_and_update();
                let mapped = mapper.map(pose);
                debug!("pose ({}, {}) -> marker ({}, {})", pose.x, pose.y, mapped.x, mapped.y);
                marker_tx.send_replace(mapped);
            }
            _ = cancel_token.cancelled() => {
                info!("marker tracking shutting down");
                break;
            }
        }
    }
}

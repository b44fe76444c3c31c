// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Windows media session listener.
//!
//! Subscribes to the global system media transport controls and maps
//! every session model update to a `PlaybackSample`. The provider anchors
//! positions at `last_updated_at_ms` wall-clock time, so a reported
//! position may already be stale at receipt; the listener rolls it
//! forward to "now" before handing it to the tracker.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use gsmtc::{ManagerEvent, PlaybackStatus, SessionUpdateEvent};
use tracing::{debug, info};

use super::SampleSender;
use crate::transport::PlaybackSample;

pub async fn run(samples: SampleSender) -> Result<()> {
    let mut manager_rx = gsmtc::SessionManager::create().await?;

    while let Some(event) = manager_rx.recv().await {
        match event {
            ManagerEvent::SessionCreated {
                session_id,
                mut rx,
                source,
            } => {
                info!("Media session created: {} ({})", session_id, source);
                let samples = samples.clone();
                tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        if let SessionUpdateEvent::Model(model) = event {
                            let (artist, title) = match &model.media {
                                Some(media) => (media.artist.clone(), media.title.clone()),
                                None => continue,
                            };
                            let timeline = match &model.timeline {
                                Some(timeline) => timeline,
                                None => continue,
                            };
                            let playing = model
                                .playback
                                .as_ref()
                                .map(|p| p.status == PlaybackStatus::Playing)
                                .unwrap_or(false);

                            // position is in 100ns ticks, anchored at
                            // last_updated_at_ms wall-clock time
                            let mut position_ms = timeline.position / 10_000;
                            if playing {
                                position_ms += stale_ms(timeline.last_updated_at_ms as i64);
                            }

                            let sample = PlaybackSample {
                                artist,
                                title,
                                position_ms,
                                playing,
                                sampled_at: Instant::now(),
                            };
                            if samples.send(sample).await.is_err() {
                                break;
                            }
                        }
                    }
                    debug!("Media session {} update loop ended", session_id);
                });
            }
            ManagerEvent::SessionRemoved { session_id } => {
                info!("Media session removed: {}", session_id);
            }
            ManagerEvent::CurrentSessionChanged { session_id } => {
                debug!("Current media session: {:?}", session_id);
            }
        }
    }

    Ok(())
}

/// Milliseconds elapsed since the provider's wall-clock anchor.
fn stale_ms(last_updated_at_ms: i64) -> i64 {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    (now_ms - last_updated_at_ms).max(0)
}

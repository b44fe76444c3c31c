// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sample classification.
//!
//! Each incoming `PlaybackSample` is classified against the timeline as
//! continuous playback, a seek, a track change, or a pause/resume, and
//! folded in atomically. Discontinuities bump the generation counter so
//! the generator restarts its quarter-frame cycle with a full-frame
//! resync instead of interpolating across the jump.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::{PlaybackSample, SampleError, SharedTimeline};
use crate::offsets::{OffsetDecision, OffsetTable};

/// Position error, in ms, beyond which a same-track sample is treated as
/// a seek rather than polling jitter.
pub const SEEK_TOLERANCE_MS: i64 = 250;

/// Folds playback samples into the shared timeline.
pub struct TransportTracker {
    timeline: SharedTimeline,
    offsets: Arc<OffsetTable>,
}

impl TransportTracker {
    pub fn new(timeline: SharedTimeline, offsets: Arc<OffsetTable>) -> Self {
        Self { timeline, offsets }
    }

    /// Validate and apply one sample. Malformed samples are rejected and
    /// the timeline is left exactly as it was.
    pub fn apply(&self, sample: PlaybackSample) -> Result<(), SampleError> {
        if sample.artist.is_empty() && sample.title.is_empty() {
            return Err(SampleError::MissingIdentity);
        }
        if sample.position_ms < 0 {
            return Err(SampleError::NegativePosition(sample.position_ms));
        }
        let position = sample.position_ms as u64;
        let identity = sample.identity();

        self.timeline.update(|tl| {
            let same_track = tl.track.as_ref() == Some(&identity);
            if !same_track {
                let decision = self.offsets.resolve(&identity);
                match decision {
                    OffsetDecision::Offset(offset) => {
                        info!("Now tracking: {} (offset {}ms)", identity, offset);
                        tl.base_offset_ms = offset;
                        tl.suppressed = false;
                    }
                    OffsetDecision::NoOffset => {
                        info!("Now tracking: {} (no configured offset)", identity);
                        tl.base_offset_ms = 0;
                        tl.suppressed = false;
                    }
                    OffsetDecision::Suppressed => {
                        info!("Suppressing output for: {}", identity);
                        tl.base_offset_ms = 0;
                        tl.suppressed = true;
                    }
                }
                tl.track = Some(identity);
                tl.position_ms = position;
                tl.sampled_at = sample.sampled_at;
                tl.playing = sample.playing;
                tl.generation += 1;
                return;
            }

            if sample.playing {
                // Expected position: frozen while paused, advancing in
                // real time while playing.
                let expected = if tl.playing {
                    let elapsed = sample
                        .sampled_at
                        .saturating_duration_since(tl.sampled_at)
                        .as_millis() as u64;
                    tl.position_ms.saturating_add(elapsed)
                } else {
                    tl.position_ms
                };
                let drift = position as i64 - expected as i64;
                if drift.abs() > SEEK_TOLERANCE_MS {
                    debug!(
                        "Seek detected: {}ms -> {}ms (drift {}ms)",
                        expected, position, drift
                    );
                    tl.generation += 1;
                }
                tl.position_ms = position;
                tl.sampled_at = sample.sampled_at;
                tl.playing = true;
            } else {
                if tl.playing {
                    debug!("Playback paused at {}ms", position);
                }
                tl.position_ms = position;
                tl.sampled_at = sample.sampled_at;
                tl.playing = false;
            }
        });
        Ok(())
    }

    /// Consume samples from the media source until shutdown. Malformed
    /// samples are logged and dropped.
    pub async fn run(
        self,
        mut samples: mpsc::Receiver<PlaybackSample>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                sample = samples.recv() => {
                    match sample {
                        Some(sample) => {
                            if let Err(err) = self.apply(sample) {
                                warn!("Dropping malformed sample: {}", err);
                            }
                        }
                        None => {
                            debug!("Media source channel closed");
                            break;
                        }
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
    }
}

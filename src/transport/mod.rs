// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport state shared between the media poller and the generator.
//!
//! The `VirtualTimeline` is the single piece of mutable state in the
//! engine. The tracker (one writer) folds playback samples into it; the
//! quarter-frame generator (one reader, on a much faster cadence) copies
//! a consistent snapshot out of it on every tick. The mutex is held only
//! for the update or the copy, never across I/O or a cadence interval.

pub mod tracker;

pub use tracker::{TransportTracker, SEEK_TOLERANCE_MS};

use std::sync::{Arc, Mutex};
use std::time::Instant;

use thiserror::Error;

use crate::offsets::TrackIdentity;
use crate::timecode::apply_offset;

/// A raw observation of the media session, as delivered by the source.
/// Position is signed because providers report signed values; validation
/// happens when the sample is folded into the timeline.
#[derive(Debug, Clone)]
pub struct PlaybackSample {
    pub artist: String,
    pub title: String,
    pub position_ms: i64,
    pub playing: bool,
    pub sampled_at: Instant,
}

impl PlaybackSample {
    pub fn identity(&self) -> TrackIdentity {
        TrackIdentity::new(self.artist.clone(), self.title.clone())
    }
}

/// Rejection reasons for a sample. Dropped samples leave the timeline
/// untouched; these are logged, never fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("sample carries no track identity")]
    MissingIdentity,
    #[error("negative playback position: {0}ms")]
    NegativePosition(i64),
}

/// The engine's notion of "where the current song is right now".
#[derive(Debug)]
pub struct VirtualTimeline {
    /// Identity of the tracked song, None until the first sample.
    pub track: Option<TrackIdentity>,
    /// Configured offset of the song into the MTC timeline.
    pub base_offset_ms: i64,
    /// Whether output is suppressed for this song.
    pub suppressed: bool,
    /// Last reported playback position.
    pub position_ms: u64,
    /// When that position was observed.
    pub sampled_at: Instant,
    pub playing: bool,
    /// Bumped on every discontinuity (track change, seek). The generator
    /// resynchronizes whenever it observes a new value.
    pub generation: u64,
}

impl VirtualTimeline {
    pub fn new() -> Self {
        Self {
            track: None,
            base_offset_ms: 0,
            suppressed: false,
            position_ms: 0,
            sampled_at: Instant::now(),
            playing: false,
            generation: 0,
        }
    }

    fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            active: self.track.is_some(),
            suppressed: self.suppressed,
            playing: self.playing,
            position_ms: self.position_ms,
            base_offset_ms: self.base_offset_ms,
            sampled_at: self.sampled_at,
            generation: self.generation,
        }
    }
}

impl Default for VirtualTimeline {
    fn default() -> Self {
        Self::new()
    }
}

/// A consistent copy of the timeline, cheap enough to take every tick.
#[derive(Debug, Clone, Copy)]
pub struct TimelineSnapshot {
    pub active: bool,
    pub suppressed: bool,
    pub playing: bool,
    pub position_ms: u64,
    pub base_offset_ms: i64,
    pub sampled_at: Instant,
    pub generation: u64,
}

impl TimelineSnapshot {
    /// Offset-adjusted position at `now`, extrapolated forward by real
    /// elapsed time while playing so the stream advances between polls.
    pub fn effective_ms(&self, now: Instant) -> u64 {
        let position = if self.playing {
            let elapsed = now.saturating_duration_since(self.sampled_at).as_millis() as u64;
            self.position_ms.saturating_add(elapsed)
        } else {
            self.position_ms
        };
        apply_offset(position, self.base_offset_ms)
    }

    /// True when the generator should be emitting quarter frames.
    pub fn emitting(&self) -> bool {
        self.active && self.playing && !self.suppressed
    }
}

/// Shared handle to the timeline.
#[derive(Debug, Clone, Default)]
pub struct SharedTimeline {
    inner: Arc<Mutex<VirtualTimeline>>,
}

impl SharedTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current state. Lock held only for the copy.
    pub fn snapshot(&self) -> TimelineSnapshot {
        self.inner.lock().expect("timeline lock poisoned").snapshot()
    }

    /// Apply an atomic update. Lock held only for the closure.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut VirtualTimeline) -> R) -> R {
        f(&mut self.inner.lock().expect("timeline lock poisoned"))
    }
}

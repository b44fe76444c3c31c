// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-track offset resolution.
//!
//! Maps a track identity to the millisecond offset configured for it, or
//! to a decision to suppress output entirely. Matching is exact and
//! case-sensitive on (artist, title); metadata that differs in casing or
//! whitespace is a different track. Built once from the config at startup
//! and read-only afterwards.

use std::collections::HashMap;

use crate::config::Config;

/// Identity of a track as reported by the media source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackIdentity {
    pub artist: String,
    pub title: String,
}

impl TrackIdentity {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

impl std::fmt::Display for TrackIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// Outcome of looking up a track against the configured offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetDecision {
    /// Track is configured; start its timeline at this many milliseconds.
    Offset(i64),
    /// Track is unknown and unconfigured tracks are allowed; offset 0.
    NoOffset,
    /// Produce no MIDI output for this track.
    Suppressed,
}

/// Lookup table over the configured songs.
#[derive(Debug, Default)]
pub struct OffsetTable {
    entries: HashMap<TrackIdentity, Entry>,
    disable_outside_config: bool,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    offset_ms: i64,
    disabled: bool,
}

impl OffsetTable {
    /// Build the table from a loaded config. Later duplicate entries for
    /// the same (artist, title) win.
    pub fn from_config(config: &Config) -> Self {
        let entries = config
            .songs
            .iter()
            .map(|song| {
                (
                    TrackIdentity::new(song.artist.clone(), song.title.clone()),
                    Entry {
                        offset_ms: song.timecode_offset,
                        disabled: song.disabled,
                    },
                )
            })
            .collect();
        Self {
            entries,
            disable_outside_config: config.disable_songs_outside_config,
        }
    }

    pub fn resolve(&self, identity: &TrackIdentity) -> OffsetDecision {
        match self.entries.get(identity) {
            Some(entry) if entry.disabled => OffsetDecision::Suppressed,
            Some(entry) => OffsetDecision::Offset(entry.offset_ms),
            None if self.disable_outside_config => OffsetDecision::Suppressed,
            None => OffsetDecision::NoOffset,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

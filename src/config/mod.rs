// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration loading.
//!
//! The config is a single JSON file, read once at startup. It names the
//! MIDI output device, the frame rate for the generated timecode, and the
//! per-song offsets. There is no hot reload; edits require a restart.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::timecode::FrameRate;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Name (or name fragment) of the MIDI output port to use. When
    /// absent, the port is chosen interactively at startup.
    #[serde(default)]
    pub midi_device: Option<String>,
    /// When true, tracks without a config entry produce no output at all.
    #[serde(default)]
    pub disable_songs_outside_config: bool,
    /// Timecode frame rate: 24, 25, 29.97 or 30. Defaults to 25.
    #[serde(default)]
    pub frame_rate: FrameRate,
    /// Per-song timecode offsets.
    #[serde(default)]
    pub songs: Vec<SongEntry>,
}

/// One configured song.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SongEntry {
    pub artist: String,
    pub title: String,
    /// Milliseconds into the MTC timeline at which this song starts.
    #[serde(default)]
    pub timecode_offset: i64,
    /// Suppress all output while this song is playing.
    #[serde(default)]
    pub disabled: bool,
}

impl Config {
    /// Load a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_json(&contents)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse JSON configuration")
    }
}

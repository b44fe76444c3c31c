// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! mtclink - MIDI Time Code from the system media session.
//!
//! Turns the playback position of whatever is currently playing on the
//! host into a continuous MTC quarter-frame stream on a MIDI output
//! port, applying per-song offsets from a JSON config so external gear
//! (lighting desks, DAWs) locks to the song's timeline.

pub mod config;
pub mod media;
pub mod midi;
pub mod mtc;
pub mod offsets;
pub mod timecode;
pub mod transport;

// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Retrying sink adapter.
//!
//! A disconnected port must not stall or crash the emission cadence: a
//! failed send is treated as a skipped emission, logged once per outage,
//! and retried on the next tick. Timecode keeps being computed while the
//! sink is down, so output resumes at the right position.

use tracing::{info, warn};

use super::MidiSink;

/// Wraps a `MidiSink` with best-effort send semantics.
pub struct SinkAdapter<S: MidiSink> {
    sink: S,
    consecutive_failures: u64,
}

impl<S: MidiSink> SinkAdapter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            consecutive_failures: 0,
        }
    }

    /// Forward one message. Returns whether the send succeeded; failures
    /// are absorbed and surfaced as warnings.
    pub fn send(&mut self, message: &[u8]) -> bool {
        match self.sink.send(message) {
            Ok(()) => {
                if self.consecutive_failures > 0 {
                    info!(
                        "MIDI output recovered after {} failed sends",
                        self.consecutive_failures
                    );
                    self.consecutive_failures = 0;
                }
                true
            }
            Err(err) => {
                if self.consecutive_failures == 0 {
                    warn!("MIDI output unavailable, retrying each cycle: {}", err);
                }
                self.consecutive_failures += 1;
                false
            }
        }
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

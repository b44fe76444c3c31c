// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI output abstraction.
//!
//! A trait-based boundary over the physical MIDI output so the engine
//! can be driven against a mock in tests, plus the midir-backed
//! implementation and the retrying sink adapter used by the generator.

pub mod midir_backend;
pub mod sink;

use anyhow::Result;

pub use midir_backend::{list_ports, print_ports, MidirSink};
pub use sink::SinkAdapter;

/// Destination for generated MIDI bytes.
///
/// Implementations must not block for longer than a port write; the
/// quarter-frame cadence runs in single-digit milliseconds.
pub trait MidiSink: Send {
    /// Send one complete MIDI message.
    ///
    /// # Arguments
    /// * `message` - Raw MIDI bytes (e.g., `[0xF1, 0x26]` for a quarter frame)
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if the output port is closed or disconnected
    fn send(&mut self, message: &[u8]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingSink {
        messages: Vec<Vec<u8>>,
    }

    impl MidiSink for RecordingSink {
        fn send(&mut self, message: &[u8]) -> Result<()> {
            self.messages.push(message.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_sink_trait_object() {
        let mut sink: Box<dyn MidiSink> = Box::new(RecordingSink { messages: vec![] });
        sink.send(&[0xF1, 0x00]).unwrap();
    }
}

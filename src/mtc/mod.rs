// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI Time Code message encoding.
//!
//! MTC transmits one SMPTE timecode as a repeating cycle of 8 quarter
//! frame messages, each carrying a 4-bit nibble plus its piece index.
//! A full-frame SysEx carries the complete timecode at once and is used
//! to resynchronize receivers after a discontinuity.

pub mod generator;

pub use generator::{Emission, QuarterFrameGenerator};

use crate::timecode::Timecode;

/// Quarter-frame status byte.
pub const QUARTER_FRAME: u8 = 0xF1;

/// Full-frame message header: universal real-time SysEx, all devices,
/// MTC sub-id 01 01.
pub const FULL_FRAME_HEADER: [u8; 5] = [0xF0, 0x7F, 0x7F, 0x01, 0x01];

/// Encode the quarter-frame message for one piece (0-7) of a timecode.
///
/// Piece mapping per the MTC standard: frame low/high nibble, seconds
/// low/high, minutes low/high, hours low, then hours high combined with
/// the two-bit frame-rate code.
pub fn quarter_frame(tc: &Timecode, piece: u8) -> [u8; 2] {
    debug_assert!(piece < 8);
    let nibble = match piece {
        0 => tc.frames & 0x0F,
        1 => (tc.frames >> 4) & 0x01,
        2 => tc.seconds & 0x0F,
        3 => (tc.seconds >> 4) & 0x03,
        4 => tc.minutes & 0x0F,
        5 => (tc.minutes >> 4) & 0x03,
        6 => tc.hours & 0x0F,
        _ => ((tc.hours >> 4) & 0x01) | (tc.rate.mtc_code() << 1),
    };
    [QUARTER_FRAME, (piece << 4) | nibble]
}

/// Encode the full-frame SysEx for a timecode. The hours byte carries
/// the frame-rate code in bits 5-6.
pub fn full_frame(tc: &Timecode) -> [u8; 10] {
    let hours_rate = (tc.rate.mtc_code() << 5) | tc.hours;
    [
        FULL_FRAME_HEADER[0],
        FULL_FRAME_HEADER[1],
        FULL_FRAME_HEADER[2],
        FULL_FRAME_HEADER[3],
        FULL_FRAME_HEADER[4],
        hours_rate,
        tc.minutes,
        tc.seconds,
        tc.frames,
        0xF7,
    ]
}

/// Decode a sequence of 8 quarter-frame data bytes (pieces 0..7) back
/// into (hours, minutes, seconds, frames, rate code). Test helper for
/// verifying cycles, kept here next to the encoder.
#[cfg(test)]
pub(crate) fn decode_cycle(pieces: &[u8; 8]) -> (u8, u8, u8, u8, u8) {
    let frames = (pieces[0] & 0x0F) | ((pieces[1] & 0x01) << 4);
    let seconds = (pieces[2] & 0x0F) | ((pieces[3] & 0x03) << 4);
    let minutes = (pieces[4] & 0x0F) | ((pieces[5] & 0x03) << 4);
    let hours = (pieces[6] & 0x0F) | ((pieces[7] & 0x01) << 4);
    let rate = (pieces[7] >> 1) & 0x03;
    (hours, minutes, seconds, frames, rate)
}

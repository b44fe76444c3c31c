// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Quarter-frame generation.
//!
//! The generator runs on a fixed cadence of one message every 1/(4 x fps)
//! seconds, independent of the media source's polling rhythm. All 8
//! pieces of a cycle encode the timecode snapshotted at the start of that
//! cycle; the snapshot is re-derived from the shared timeline at every
//! piece-0 boundary, clamped so completed cycles never move backward
//! unless the timeline declared a discontinuity. A discontinuity (or the
//! first emission after silence) abandons the current cycle, sends a
//! full-frame resync and restarts at piece 0.

use std::time::Instant;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use super::{full_frame, quarter_frame};
use crate::midi::{MidiSink, SinkAdapter};
use crate::timecode::{FrameRate, Timecode};
use crate::transport::{SharedTimeline, TimelineSnapshot};

/// What one cadence tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Idle, paused, or suppressed: send nothing.
    Silence,
    /// Discontinuity: full-frame resync followed by piece 0 of a new cycle.
    Resync {
        full: [u8; 10],
        quarter: [u8; 2],
    },
    /// Next piece of the running cycle.
    QuarterFrame([u8; 2]),
}

/// Paces quarter-frame emission against the shared timeline.
pub struct QuarterFrameGenerator {
    rate: FrameRate,
    /// Next piece to emit, 0-7.
    piece: u8,
    /// Timecode all pieces of the current cycle encode. None whenever
    /// emission is stopped; the next emission then resynchronizes.
    cycle: Option<Timecode>,
    /// Timeline generation the current cycle was derived from.
    generation: u64,
}

impl QuarterFrameGenerator {
    pub fn new(rate: FrameRate) -> Self {
        Self {
            rate,
            piece: 0,
            cycle: None,
            generation: 0,
        }
    }

    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    /// Advance one cadence tick against the given timeline snapshot.
    pub fn tick(&mut self, snap: &TimelineSnapshot, now: Instant) -> Emission {
        if !snap.emitting() {
            // Silence closes the current cycle; the next emission will
            // start with a full-frame resync.
            self.cycle = None;
            self.piece = 0;
            return Emission::Silence;
        }

        let needs_resync = self.cycle.is_none() || snap.generation != self.generation;
        if needs_resync {
            let tc = Timecode::from_millis(snap.effective_ms(now), self.rate);
            debug!("Resync at {} (generation {})", tc, snap.generation);
            self.cycle = Some(tc);
            self.generation = snap.generation;
            self.piece = 1;
            return Emission::Resync {
                full: full_frame(&tc),
                quarter: quarter_frame(&tc, 0),
            };
        }

        if self.piece == 0 {
            // New cycle: re-derive from the timeline, but never step
            // backward past the previous cycle without a discontinuity.
            let prev = self.cycle.expect("cycle set while emitting");
            let mut tc = Timecode::from_millis(snap.effective_ms(now), self.rate);
            if tc.frame_index() <= prev.frame_index() {
                tc = prev.next_frame();
            }
            self.cycle = Some(tc);
        }

        let tc = self.cycle.expect("cycle set while emitting");
        let msg = quarter_frame(&tc, self.piece);
        self.piece = (self.piece + 1) % 8;
        Emission::QuarterFrame(msg)
    }
}

/// Emission loop: one tick per quarter-frame interval until shutdown.
/// A stalled media source never delays a tick; the loop only ever takes
/// the brief timeline snapshot lock. Nothing is sent after shutdown is
/// requested.
pub async fn run<S: MidiSink>(
    mut generator: QuarterFrameGenerator,
    timeline: SharedTimeline,
    mut sink: SinkAdapter<S>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut cadence = interval(generator.rate().quarter_frame_interval());
    cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cadence.tick() => {
                let snap = timeline.snapshot();
                match generator.tick(&snap, Instant::now()) {
                    Emission::Silence => {}
                    Emission::Resync { full, quarter } => {
                        sink.send(&full);
                        sink.send(&quarter);
                    }
                    Emission::QuarterFrame(msg) => {
                        sink.send(&msg);
                    }
                }
            }
            _ = shutdown.changed() => break,
        }
    }
    debug!("Quarter-frame emission stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mtc::decode_cycle;

    fn snapshot(position_ms: u64, at: Instant) -> TimelineSnapshot {
        TimelineSnapshot {
            active: true,
            suppressed: false,
            playing: true,
            position_ms,
            base_offset_ms: 0,
            sampled_at: at,
            generation: 1,
        }
    }

    /// Drive the generator through `n` ticks with time advancing at the
    /// real cadence, collecting emitted quarter-frame data bytes.
    fn run_ticks(
        generator: &mut QuarterFrameGenerator,
        snap: &TimelineSnapshot,
        start: Instant,
        n: usize,
    ) -> Vec<u8> {
        let step = generator.rate().quarter_frame_interval();
        let mut data = Vec::new();
        for i in 0..n {
            let now = start + step * i as u32;
            match generator.tick(snap, now) {
                Emission::Silence => {}
                Emission::Resync { quarter, .. } => data.push(quarter[1]),
                Emission::QuarterFrame(msg) => data.push(msg[1]),
            }
        }
        data
    }

    #[test]
    fn test_first_emission_is_full_frame_resync() {
        let mut generator = QuarterFrameGenerator::new(FrameRate::Fps25);
        let t0 = Instant::now();
        let snap = snapshot(0, t0);

        match generator.tick(&snap, t0) {
            Emission::Resync { full, quarter } => {
                assert_eq!(full[0], 0xF0);
                assert_eq!(quarter[1] >> 4, 0);
            }
            other => panic!("expected resync, got {:?}", other),
        }
    }

    #[test]
    fn test_pieces_ascend_without_gaps() {
        let mut generator = QuarterFrameGenerator::new(FrameRate::Fps25);
        let t0 = Instant::now();
        let snap = snapshot(0, t0);

        let data = run_ticks(&mut generator, &snap, t0, 33);
        let pieces: Vec<u8> = data.iter().map(|d| d >> 4).collect();
        for (i, piece) in pieces.iter().enumerate() {
            assert_eq!(*piece as usize, i % 8, "piece order broken at tick {}", i);
        }
    }

    #[test]
    fn test_cycle_encodes_single_instant() {
        let mut generator = QuarterFrameGenerator::new(FrameRate::Fps25);
        let t0 = Instant::now();
        let snap = snapshot(12_345, t0);

        let data = run_ticks(&mut generator, &snap, t0, 8);
        let pieces: [u8; 8] = data.try_into().unwrap();
        let (h, m, s, f, rate) = decode_cycle(&pieces);
        let expected = Timecode::from_millis(12_345, FrameRate::Fps25);
        assert_eq!(
            (h, m, s, f),
            (expected.hours, expected.minutes, expected.seconds, expected.frames)
        );
        assert_eq!(rate, 0b01);
    }

    #[test]
    fn test_completed_cycles_never_decrease() {
        let mut generator = QuarterFrameGenerator::new(FrameRate::Fps30);
        let t0 = Instant::now();
        let snap = snapshot(0, t0);

        // 25 complete cycles of forward playback
        let data = run_ticks(&mut generator, &snap, t0, 200);
        let mut last_index = None;
        for cycle in data.chunks_exact(8) {
            let pieces: [u8; 8] = cycle.try_into().unwrap();
            let (h, m, s, f, _) = decode_cycle(&pieces);
            let tc = Timecode {
                hours: h,
                minutes: m,
                seconds: s,
                frames: f,
                rate: FrameRate::Fps30,
            };
            let index = tc.frame_index();
            if let Some(last) = last_index {
                assert!(index > last, "cycle went backward: {} after {}", index, last);
            }
            last_index = Some(index);
        }
    }

    #[test]
    fn test_backward_seek_restarts_cycle_at_new_value() {
        let mut generator = QuarterFrameGenerator::new(FrameRate::Fps25);
        let t0 = Instant::now();
        let step = FrameRate::Fps25.quarter_frame_interval();

        let snap = snapshot(90_000, t0);
        // Partway into a cycle...
        for i in 0..5u32 {
            generator.tick(&snap, t0 + step * i);
        }

        // ...the track seeks back a minute: new generation, lower position
        let now = t0 + step * 5;
        let seeked = TimelineSnapshot {
            position_ms: 30_000,
            sampled_at: now,
            generation: 2,
            ..snap
        };
        match generator.tick(&seeked, now) {
            Emission::Resync { full, quarter } => {
                let expected = Timecode::from_millis(30_000, FrameRate::Fps25);
                assert_eq!(full[7], expected.seconds);
                assert_eq!(quarter[1] >> 4, 0);
            }
            other => panic!("expected resync after seek, got {:?}", other),
        }

        // The new cycle continues in order from piece 1
        match generator.tick(&seeked, now + step) {
            Emission::QuarterFrame(msg) => assert_eq!(msg[1] >> 4, 1),
            other => panic!("expected quarter frame, got {:?}", other),
        }
    }

    #[test]
    fn test_suppressed_and_idle_emit_nothing() {
        let mut generator = QuarterFrameGenerator::new(FrameRate::Fps25);
        let t0 = Instant::now();

        let idle = TimelineSnapshot {
            active: false,
            ..snapshot(0, t0)
        };
        assert_eq!(generator.tick(&idle, t0), Emission::Silence);

        let suppressed = TimelineSnapshot {
            suppressed: true,
            ..snapshot(0, t0)
        };
        assert_eq!(generator.tick(&suppressed, t0), Emission::Silence);
    }

    #[test]
    fn test_pause_then_resume_resyncs() {
        let mut generator = QuarterFrameGenerator::new(FrameRate::Fps25);
        let t0 = Instant::now();
        let step = FrameRate::Fps25.quarter_frame_interval();
        let snap = snapshot(1000, t0);

        for i in 0..3u32 {
            generator.tick(&snap, t0 + step * i);
        }

        let paused = TimelineSnapshot {
            playing: false,
            ..snap
        };
        assert_eq!(generator.tick(&paused, t0 + step * 3), Emission::Silence);

        // Resume with unchanged generation still restarts cleanly
        match generator.tick(&snap, t0 + step * 4) {
            Emission::Resync { .. } => {}
            other => panic!("expected resync after pause, got {:?}", other),
        }
    }

    #[test]
    fn test_offset_applied_to_emitted_timecode() {
        let mut generator = QuarterFrameGenerator::new(FrameRate::Fps25);
        let t0 = Instant::now();
        let snap = TimelineSnapshot {
            base_offset_ms: 1_800_000,
            ..snapshot(5000, t0)
        };

        match generator.tick(&snap, t0) {
            Emission::Resync { full, .. } => {
                // 00:30:05 at the full-frame resync
                assert_eq!(full[5] & 0x1F, 0);
                assert_eq!(full[6], 30);
                assert_eq!(full[7], 5);
            }
            other => panic!("expected resync, got {:?}", other),
        }
    }
}

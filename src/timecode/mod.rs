// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! SMPTE timecode arithmetic.
//!
//! This module converts elapsed milliseconds on the MTC timeline into
//! hours:minutes:seconds:frames at one of the four MIDI-defined frame
//! rates, including the drop-frame counting rule for 29.97 fps. All
//! functions here are pure so the generator can re-derive the same
//! timecode from the same inputs on every cycle.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Milliseconds in one day; hours wrap modulo 24.
const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// The four frame rates defined by the MTC specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRate {
    /// 24 fps (film)
    Fps24,
    /// 25 fps (PAL)
    Fps25,
    /// 29.97 fps drop-frame (NTSC color)
    Fps2997,
    /// 30 fps (NTSC non-drop)
    Fps30,
}

impl FrameRate {
    /// Nominal frame count per second, used for frame-number arithmetic.
    /// Drop-frame counts in 30s; the dropped numbers keep it honest.
    pub fn nominal(&self) -> u64 {
        match self {
            FrameRate::Fps24 => 24,
            FrameRate::Fps25 => 25,
            FrameRate::Fps2997 | FrameRate::Fps30 => 30,
        }
    }

    /// The two-bit rate code carried in the hours-high quarter frame and
    /// the full-frame message (00=24, 01=25, 10=29.97 drop, 11=30).
    pub fn mtc_code(&self) -> u8 {
        match self {
            FrameRate::Fps24 => 0b00,
            FrameRate::Fps25 => 0b01,
            FrameRate::Fps2997 => 0b10,
            FrameRate::Fps30 => 0b11,
        }
    }

    /// Exact frames per second as a float (29.97 is 30000/1001).
    pub fn as_f64(&self) -> f64 {
        match self {
            FrameRate::Fps24 => 24.0,
            FrameRate::Fps25 => 25.0,
            FrameRate::Fps2997 => 30_000.0 / 1001.0,
            FrameRate::Fps30 => 30.0,
        }
    }

    /// Interval between quarter-frame messages: 1/(4 x fps).
    pub fn quarter_frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / (4.0 * self.as_f64()))
    }

    /// Actual frames elapsed in `ms` of wall-clock time.
    fn frames_in(&self, ms: u64) -> u64 {
        match self {
            // 30000/1001 fps: frames = ms * 30 / 1001, exact in integers
            FrameRate::Fps2997 => ms * 30 / 1001,
            _ => ms * self.nominal() / 1000,
        }
    }

    /// Wall-clock milliseconds spanned by `frames` actual frames.
    fn ms_for(&self, frames: u64) -> u64 {
        match self {
            FrameRate::Fps2997 => frames * 1001 / 30,
            _ => frames * 1000 / self.nominal(),
        }
    }

    fn from_value(value: f64) -> Option<Self> {
        if (value - 24.0).abs() < 0.005 {
            Some(FrameRate::Fps24)
        } else if (value - 25.0).abs() < 0.005 {
            Some(FrameRate::Fps25)
        } else if (value - 29.97).abs() < 0.005 {
            Some(FrameRate::Fps2997)
        } else if (value - 30.0).abs() < 0.005 {
            Some(FrameRate::Fps30)
        } else {
            None
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        FrameRate::Fps25
    }
}

impl<'de> Deserialize<'de> for FrameRate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        FrameRate::from_value(value)
            .ok_or_else(|| de::Error::custom(format!("unsupported frame rate: {}", value)))
    }
}

/// One instant on the MTC timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
    pub rate: FrameRate,
}

impl Timecode {
    /// Convert elapsed milliseconds since timeline zero into a timecode.
    /// Hours wrap at 24. For 29.97 the drop-frame counting rule applies,
    /// so the label stays within one frame of real elapsed time.
    pub fn from_millis(ms: u64, rate: FrameRate) -> Self {
        let ms = ms % MS_PER_DAY;
        match rate {
            FrameRate::Fps2997 => Self::from_drop_frame_count(rate.frames_in(ms)),
            _ => {
                let hours = (ms / 3_600_000) as u8;
                let minutes = (ms % 3_600_000 / 60_000) as u8;
                let seconds = (ms % 60_000 / 1000) as u8;
                let frames = (ms % 1000 * rate.nominal() / 1000) as u8;
                Self {
                    hours,
                    minutes,
                    seconds,
                    frames,
                    rate,
                }
            }
        }
    }

    /// Inverse of `from_millis`, exact to within one frame duration.
    pub fn to_millis(&self) -> u64 {
        match self.rate {
            FrameRate::Fps2997 => self.rate.ms_for(self.drop_frame_count()),
            _ => {
                self.hours as u64 * 3_600_000
                    + self.minutes as u64 * 60_000
                    + self.seconds as u64 * 1000
                    + self.frames as u64 * 1000 / self.rate.nominal()
            }
        }
    }

    /// The timecode one frame later, respecting drop-frame label skips
    /// and wrapping at 24 hours.
    pub fn next_frame(&self) -> Self {
        match self.rate {
            FrameRate::Fps2997 => {
                let per_day = self.rate.frames_in(MS_PER_DAY);
                Self::from_drop_frame_count((self.drop_frame_count() + 1) % per_day)
            }
            _ => {
                let mut tc = *self;
                tc.frames += 1;
                if tc.frames as u64 >= tc.rate.nominal() {
                    tc.frames = 0;
                    tc.seconds += 1;
                    if tc.seconds >= 60 {
                        tc.seconds = 0;
                        tc.minutes += 1;
                        if tc.minutes >= 60 {
                            tc.minutes = 0;
                            tc.hours = (tc.hours + 1) % 24;
                        }
                    }
                }
                tc
            }
        }
    }

    /// Total actual frames since timeline zero. Used to order timecodes
    /// across cycle boundaries.
    pub fn frame_index(&self) -> u64 {
        match self.rate {
            FrameRate::Fps2997 => self.drop_frame_count(),
            _ => {
                (self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64)
                    * self.rate.nominal()
                    + self.frames as u64
            }
        }
    }

    /// Map an actual frame count to its drop-frame label. Each ten-minute
    /// block holds 17982 frames: 1800 in minute 0, then 1798 per dropped
    /// minute (labels 00 and 01 skipped).
    fn from_drop_frame_count(count: u64) -> Self {
        const FRAMES_PER_10_MIN: u64 = 17_982;
        const FRAMES_PER_DROP_MIN: u64 = 1_798;

        let blocks = count / FRAMES_PER_10_MIN;
        let mut rem = count % FRAMES_PER_10_MIN;
        let mut minute_total = blocks * 10;
        if rem >= 1800 {
            rem -= 1800;
            minute_total += 1 + rem / FRAMES_PER_DROP_MIN;
            // labels within a dropped minute start at frame 2
            rem = rem % FRAMES_PER_DROP_MIN + 2;
        }
        Self {
            hours: ((minute_total / 60) % 24) as u8,
            minutes: (minute_total % 60) as u8,
            seconds: (rem / 30) as u8,
            frames: (rem % 30) as u8,
            rate: FrameRate::Fps2997,
        }
    }

    /// Inverse of `from_drop_frame_count`: label back to actual frames.
    fn drop_frame_count(&self) -> u64 {
        let minute_total = self.hours as u64 * 60 + self.minutes as u64;
        let dropped = 2 * (minute_total - minute_total / 10);
        minute_total * 1800 + self.seconds as u64 * 30 + self.frames as u64 - dropped
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = match self.rate {
            FrameRate::Fps2997 => ';',
            _ => ':',
        };
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:02}",
            self.hours, self.minutes, self.seconds, sep, self.frames
        )
    }
}

/// Apply a configured track offset to a playback position. Clamps at
/// timeline zero instead of going negative.
pub fn apply_offset(position_ms: u64, offset_ms: i64) -> u64 {
    if offset_ms >= 0 {
        position_ms.saturating_add(offset_ms as u64)
    } else {
        position_ms.saturating_sub(offset_ms.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_RATES: [FrameRate; 4] = [
        FrameRate::Fps24,
        FrameRate::Fps25,
        FrameRate::Fps2997,
        FrameRate::Fps30,
    ];

    #[test]
    fn test_basic_conversion() {
        let tc = Timecode::from_millis(0, FrameRate::Fps25);
        assert_eq!((tc.hours, tc.minutes, tc.seconds, tc.frames), (0, 0, 0, 0));

        // 1h 30m 5s + 500ms = frame 12 at 25fps
        let tc = Timecode::from_millis(5_405_500, FrameRate::Fps25);
        assert_eq!((tc.hours, tc.minutes, tc.seconds, tc.frames), (1, 30, 5, 12));

        // 999ms at 30fps is frame 29, never frame 30
        let tc = Timecode::from_millis(999, FrameRate::Fps30);
        assert_eq!(tc.frames, 29);
    }

    #[test]
    fn test_round_trip_within_one_frame() {
        let samples = [
            0u64, 1, 999, 1000, 59_999, 60_000, 599_999, 600_000, 3_599_999, 3_600_000, 5_405_123,
            35_999_871, 86_399_000,
        ];
        for rate in ALL_RATES {
            let frame_ms = (1000.0 / rate.as_f64()).ceil() as u64 + 1;
            for &ms in &samples {
                let back = Timecode::from_millis(ms, rate).to_millis();
                let diff = ms.abs_diff(back);
                assert!(
                    diff <= frame_ms,
                    "{:?}: {} -> {} (diff {})",
                    rate,
                    ms,
                    back,
                    diff
                );
            }
        }
    }

    #[test]
    fn test_field_ranges() {
        for rate in ALL_RATES {
            for ms in (0..90_000_000u64).step_by(37_313) {
                let tc = Timecode::from_millis(ms, rate);
                assert!(tc.hours < 24);
                assert!(tc.minutes < 60);
                assert!(tc.seconds < 60);
                assert!((tc.frames as u64) < rate.nominal());
            }
        }
    }

    #[test]
    fn test_drop_frame_skips_two_frames_per_minute() {
        // Walk every frame of the first twenty-one minutes and record
        // which frame labels appear at second 0 of each minute.
        let per_minute_start: Vec<(u8, u8)> = (0..21 * 60_000u64)
            .step_by(16)
            .map(|ms| Timecode::from_millis(ms, FrameRate::Fps2997))
            .filter(|tc| tc.seconds == 0 && tc.frames < 2)
            .map(|tc| (tc.minutes, tc.frames))
            .collect();

        for (minute, frame) in per_minute_start {
            assert_eq!(
                minute % 10,
                0,
                "frame {} appeared at start of minute {}",
                frame,
                minute
            );
        }
    }

    #[test]
    fn test_drop_frame_minute_boundary_labels() {
        // The first frame of minute 1 is labeled 00:01:00;02
        let count_at_min1 = 1800u64; // actual frames in minute 0
        let ms = FrameRate::Fps2997.ms_for(count_at_min1) + 1;
        let tc = Timecode::from_millis(ms, FrameRate::Fps2997);
        assert_eq!((tc.minutes, tc.seconds, tc.frames), (1, 0, 2));

        // Minute 10 starts back at frame 0
        let count_at_min10 = 17_982u64;
        let ms = FrameRate::Fps2997.ms_for(count_at_min10) + 1;
        let tc = Timecode::from_millis(ms, FrameRate::Fps2997);
        assert_eq!((tc.minutes, tc.seconds, tc.frames), (10, 0, 0));
    }

    #[test]
    fn test_drop_frame_tracks_wall_clock() {
        // After exactly one hour the drop-frame label reads 01:00:00;00
        let tc = Timecode::from_millis(3_600_000, FrameRate::Fps2997);
        assert_eq!((tc.hours, tc.minutes, tc.seconds), (1, 0, 0));
        assert!(tc.frames <= 1);
    }

    #[test]
    fn test_next_frame_advances() {
        for rate in ALL_RATES {
            let tc = Timecode::from_millis(59_900, rate);
            let next = tc.next_frame();
            assert_eq!(next.frame_index(), tc.frame_index() + 1);
        }

        // Drop-frame label skip: 00:00:59;29 -> 00:01:00;02
        let tc = Timecode {
            hours: 0,
            minutes: 0,
            seconds: 59,
            frames: 29,
            rate: FrameRate::Fps2997,
        };
        let next = tc.next_frame();
        assert_eq!((next.minutes, next.seconds, next.frames), (1, 0, 2));
    }

    #[test]
    fn test_hours_wrap_at_24() {
        let tc = Timecode::from_millis(MS_PER_DAY + 3_600_000, FrameRate::Fps25);
        assert_eq!(tc.hours, 1);
    }

    #[test]
    fn test_apply_offset_clamps() {
        assert_eq!(apply_offset(0, -5000), 0);
        assert_eq!(apply_offset(10_000, 1_800_000), 1_810_000);
        assert_eq!(apply_offset(4999, -5000), 0);
        assert_eq!(apply_offset(5001, -5000), 1);
    }

    #[test]
    fn test_rate_codes() {
        assert_eq!(FrameRate::Fps24.mtc_code(), 0b00);
        assert_eq!(FrameRate::Fps25.mtc_code(), 0b01);
        assert_eq!(FrameRate::Fps2997.mtc_code(), 0b10);
        assert_eq!(FrameRate::Fps30.mtc_code(), 0b11);
    }

    #[test]
    fn test_quarter_frame_interval() {
        // ~10ms at 25fps, ~8.33ms at 30fps
        let at25 = FrameRate::Fps25.quarter_frame_interval();
        assert_eq!(at25.as_millis(), 10);
        let at30 = FrameRate::Fps30.quarter_frame_interval();
        assert!(at30.as_secs_f64() > 0.008 && at30.as_secs_f64() < 0.009);
    }

    #[test]
    fn test_frame_rate_from_config_value() {
        assert_eq!(FrameRate::from_value(25.0), Some(FrameRate::Fps25));
        assert_eq!(FrameRate::from_value(29.97), Some(FrameRate::Fps2997));
        assert_eq!(FrameRate::from_value(29.0), None);
        assert_eq!(FrameRate::from_value(23.976), None);
    }

    #[test]
    fn test_display() {
        let tc = Timecode::from_millis(5_405_480, FrameRate::Fps25);
        assert_eq!(tc.to_string(), "01:30:05:12");
        let tc = Timecode::from_millis(1001, FrameRate::Fps2997);
        assert_eq!(tc.to_string(), "00:00:01;00");
    }
}

//! Subtitle parsing module
//!
//! This module turns time-coded subtitle documents into timed segments:
//! - `HH:MM:SS,mmm` time-code conversion to seconds
//! - SubRip (SRT) cue block parsing
//! - Conversion of direct transcript entries into the same segment shape

pub mod srt;
pub mod timecode;

use serde::{Deserialize, Serialize};

pub use srt::{parse_srt, parse_srt_file};
pub use timecode::{parse_timecode, TimecodeError};

/// One timed piece of subtitle text, offsets in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Length of the segment in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A transcript line as returned by a direct transcript source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

impl From<TranscriptEntry> for Segment {
    fn from(entry: TranscriptEntry) -> Self {
        Segment {
            start: entry.start,
            end: entry.start + entry.duration,
            text: entry.text,
        }
    }
}

//! SubRip (SRT) document parser
//!
//! A document is a list of cue blocks separated by blank lines:
//!
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:02,500
//! Hello
//! world
//! ```
//!
//! The index line is ignored. Blocks that are too short or whose time line
//! does not match are dropped; they never fail the whole document.

use std::path::Path;

use super::timecode::parse_timecode;
use super::Segment;

/// Parse the full text of an SRT document into segments, in document order.
pub fn parse_srt(content: &str) -> Vec<Segment> {
    let content = content.replace("\r\n", "\n");
    let content = content.trim();
    if content.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    for (position, block) in content.split("\n\n").enumerate() {
        match parse_block(block) {
            Ok(segment) => segments.push(segment),
            Err(reason) => {
                tracing::debug!("Skipping subtitle block {}: {}", position, reason);
            }
        }
    }
    segments
}

/// Read an SRT file from disk and parse it.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn parse_srt_file(path: &Path) -> std::io::Result<Vec<Segment>> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    let segments = parse_srt(&content);
    tracing::debug!("Parsed {} segments from {:?}", segments.len(), path);
    Ok(segments)
}

fn parse_block(block: &str) -> Result<Segment, String> {
    let lines: Vec<&str> = block.trim().split('\n').map(str::trim).collect();
    if lines.len() < 3 {
        return Err(format!("expected at least 3 lines, found {}", lines.len()));
    }

    let caps = regex!(r"^(\d{2}:\d{2}:\d{2},\d{3}) --> (\d{2}:\d{2}:\d{2},\d{3})")
        .captures(lines[1])
        .ok_or_else(|| format!("malformed time line {:?}", lines[1]))?;

    let start = parse_timecode(&caps[1]).map_err(|e| e.to_string())?;
    let end = parse_timecode(&caps[2]).map_err(|e| e.to_string())?;
    if end < start {
        return Err(format!("end {} precedes start {}", end, start));
    }

    Ok(Segment {
        start,
        end,
        text: lines[2..].join("\n"),
    })
}

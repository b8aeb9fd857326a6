//! Test fixtures for integration tests
//!
//! Provides a scripted gateway so the pipeline can be exercised without
//! network access or the `yt-dlp` executable.

use std::path::Path;
use std::sync::Mutex;

use crate::gateway::{GatewayError, VideoGateway, VideoMetadata};
use crate::subtitle::TranscriptEntry;

pub const SAMPLE_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

pub const SAMPLE_SRT: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello\nworld\n\n\
                              2\n00:00:02,500 --> 00:00:04,000\nSecond line\n\n\
                              3\nbroken time line\nskipped\n";

pub const SAMPLE_AUDIO: &[u8] = b"\x1aE\xdf\xa3not really webm";

/// Gateway that writes canned files instead of downloading
pub struct StubGateway {
    write_audio: bool,
    subtitles: Option<String>,
    transcript: Vec<TranscriptEntry>,
    metadata_error: Mutex<Option<GatewayError>>,
    download_error: Mutex<Option<GatewayError>>,
}

impl StubGateway {
    /// Produces `audio.webm` only
    pub fn audio_only() -> Self {
        Self {
            write_audio: true,
            subtitles: None,
            transcript: Vec::new(),
            metadata_error: Mutex::new(None),
            download_error: Mutex::new(None),
        }
    }

    /// Produces `audio.webm` and `audio.en.srt` with the given content
    pub fn with_subtitles(srt: &str) -> Self {
        Self {
            subtitles: Some(srt.to_string()),
            ..Self::audio_only()
        }
    }

    /// Download succeeds but leaves no files behind
    pub fn nothing() -> Self {
        Self {
            write_audio: false,
            ..Self::audio_only()
        }
    }

    /// Answer transcript lookups with two entries
    pub fn with_transcript(mut self) -> Self {
        self.transcript = vec![
            TranscriptEntry {
                start: 1.0,
                duration: 1.5,
                text: "Hello\nworld".to_string(),
            },
            TranscriptEntry {
                start: 2.5,
                duration: 1.5,
                text: "Second line".to_string(),
            },
        ];
        self
    }

    /// Fail the next metadata lookup
    pub fn failing_metadata(self, error: GatewayError) -> Self {
        *self.metadata_error.lock().unwrap() = Some(error);
        self
    }

    /// Fail the next download
    pub fn failing_download(self, error: GatewayError) -> Self {
        *self.download_error.lock().unwrap() = Some(error);
        self
    }
}

impl VideoGateway for StubGateway {
    fn fetch_metadata(&self, _url: &str) -> Result<VideoMetadata, GatewayError> {
        if let Some(e) = self.metadata_error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(VideoMetadata {
            id: Some("dQw4w9WgXcQ".to_string()),
            title: "Sample Video".to_string(),
            duration: 212.0,
        })
    }

    fn download(&self, _url: &str, target_dir: &Path) -> Result<(), GatewayError> {
        if let Some(e) = self.download_error.lock().unwrap().take() {
            return Err(e);
        }
        if self.write_audio {
            std::fs::write(target_dir.join("audio.webm"), SAMPLE_AUDIO)?;
        }
        if let Some(srt) = &self.subtitles {
            std::fs::write(target_dir.join("audio.en.srt"), srt)?;
        }
        Ok(())
    }

    fn fetch_transcript(&self, _video_id: &str) -> Result<Vec<TranscriptEntry>, GatewayError> {
        Ok(self.transcript.clone())
    }
}

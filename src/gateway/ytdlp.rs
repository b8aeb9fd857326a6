//! Gateway backed by the `yt-dlp` executable

use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use super::{GatewayError, Operation, VideoGateway, VideoMetadata};
use crate::config::GatewayConfig;
use crate::subtitle::TranscriptEntry;

/// Drives `yt-dlp` as a child process for every gateway operation.
#[derive(Debug, Clone)]
pub struct YtDlpGateway {
    config: GatewayConfig,
}

/// Subset of `--dump-single-json` output we care about
#[derive(Debug, Deserialize)]
struct RawInfo {
    id: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
}

/// YouTube "json3" caption document
#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    t_start_ms: Option<u64>,
    d_duration_ms: Option<u64>,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

impl YtDlpGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    fn sub_langs(&self) -> String {
        self.config.subtitle_langs.join(",")
    }

    fn metadata_args(&self, url: &str) -> Vec<OsString> {
        [
            "--dump-single-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            url,
        ]
        .into_iter()
        .map(OsString::from)
        .collect()
    }

    fn download_args(&self, url: &str, target_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-f".into(),
            "bestaudio/best".into(),
            "-o".into(),
            target_dir.join("audio.%(ext)s").into_os_string(),
            "--no-playlist".into(),
            "--no-warnings".into(),
        ];
        if let Some(format) = &self.config.audio_format {
            args.push("-x".into());
            args.push("--audio-format".into());
            args.push(format.into());
        }
        args.push("--write-subs".into());
        if self.config.auto_captions {
            args.push("--write-auto-subs".into());
        }
        args.push("--sub-langs".into());
        args.push(self.sub_langs().into());
        args.push("--sub-format".into());
        args.push("srt/best".into());
        args.push("--convert-subs".into());
        args.push("srt".into());
        args.push(url.into());
        args
    }

    fn transcript_args(&self, video_id: &str, scratch_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--skip-download".into(),
            "--write-subs".into(),
        ];
        if self.config.auto_captions {
            args.push("--write-auto-subs".into());
        }
        args.push("--sub-langs".into());
        args.push(self.sub_langs().into());
        args.push("--sub-format".into());
        args.push("json3".into());
        args.push("-o".into());
        args.push(scratch_dir.join("%(id)s.%(ext)s").into_os_string());
        args.push("--no-playlist".into());
        args.push("--no-warnings".into());
        args.push(format!("https://www.youtube.com/watch?v={}", video_id).into());
        args
    }

    fn run(&self, operation: Operation, args: Vec<OsString>) -> Result<Vec<u8>, GatewayError> {
        tracing::debug!("Running {:?} for {}", self.config.program, operation);
        let output = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()?;

        if output.status.success() {
            return Ok(output.stdout);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(classify_failure(operation, output.status, &stderr))
    }

    /// Pick the caption file for the most preferred language.
    fn pick_caption_file(&self, dir: &Path) -> std::io::Result<Option<PathBuf>> {
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json3"))
            .collect();
        candidates.sort();

        for lang in &self.config.subtitle_langs {
            let suffix = format!(".{}.json3", lang);
            if let Some(found) = candidates
                .iter()
                .find(|p| p.to_string_lossy().ends_with(&suffix))
            {
                return Ok(Some(found.clone()));
            }
        }
        Ok(candidates.into_iter().next())
    }
}

impl VideoGateway for YtDlpGateway {
    fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, GatewayError> {
        let stdout = self.run(Operation::Metadata, self.metadata_args(url))?;
        let info: RawInfo = serde_json::from_slice(&stdout)?;
        Ok(VideoMetadata {
            id: info.id,
            title: info.title.unwrap_or_else(|| "Unknown".to_string()),
            duration: info.duration.unwrap_or(0.0),
        })
    }

    fn download(&self, url: &str, target_dir: &Path) -> Result<(), GatewayError> {
        self.run(Operation::Download, self.download_args(url, target_dir))?;
        Ok(())
    }

    fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptEntry>, GatewayError> {
        let scratch = tempfile::tempdir()?;
        self.run(
            Operation::Transcript,
            self.transcript_args(video_id, scratch.path()),
        )?;

        let Some(path) = self.pick_caption_file(scratch.path())? else {
            tracing::info!("No transcript available for video {}", video_id);
            return Ok(Vec::new());
        };
        let content = std::fs::read(&path)?;
        parse_json3(&content)
    }
}

/// Turn a json3 caption document into transcript entries.
fn parse_json3(content: &[u8]) -> Result<Vec<TranscriptEntry>, GatewayError> {
    let document: Json3Document = serde_json::from_slice(content)?;
    let entries = document
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptEntry {
                start: event.t_start_ms.unwrap_or(0) as f64 / 1000.0,
                duration: event.d_duration_ms.unwrap_or(0) as f64 / 1000.0,
                text: text.to_string(),
            })
        })
        .collect();
    Ok(entries)
}

/// Map a non-zero exit into the error taxonomy using yt-dlp's stderr.
fn classify_failure(operation: Operation, status: ExitStatus, stderr: &str) -> GatewayError {
    let message = stderr
        .lines()
        .rev()
        .find(|l| l.contains("ERROR"))
        .or_else(|| stderr.lines().rev().find(|l| !l.trim().is_empty()))
        .map(|l| l.trim().to_string())
        .unwrap_or_else(|| format!("exited with {}", status));

    if stderr.contains("Unsupported URL") || stderr.contains("is not a valid URL") {
        GatewayError::Unsupported(message)
    } else if stderr.contains("Video unavailable")
        || stderr.contains("Private video")
        || stderr.contains("This video is not available")
        || stderr.contains("Incomplete YouTube ID")
    {
        GatewayError::Unavailable(message)
    } else {
        GatewayError::Failed { operation, message }
    }
}

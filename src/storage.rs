//! Artifact storage
//!
//! Downloads live under a single content root. Two layouts are understood:
//! - nested: `<root>/<id>/audio.<ext>` plus an optional `<root>/<id>/<name>.srt`
//! - flat: `<root>/<video_id>.<ext>`
//!
//! New artifacts are always created with the nested layout and a fresh
//! UUID, so concurrent requests for the same video never share a directory.

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Handle to the content root
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    /// Subtitle languages, most preferred first
    subtitle_langs: Vec<String>,
}

/// One download's directory
#[derive(Debug, Clone)]
pub struct Artifact {
    pub id: String,
    pub dir: PathBuf,
}

/// Files found in an artifact directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactFiles {
    /// File name of the audio track
    pub audio: Option<String>,
    /// File name of the subtitle document
    pub subtitle: Option<String>,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            subtitle_langs: Vec::new(),
        }
    }

    /// Rank subtitle files by language when an artifact holds several.
    pub fn with_subtitle_langs(mut self, langs: Vec<String>) -> Self {
        self.subtitle_langs = langs;
        self
    }

    pub fn subtitle_langs(&self) -> &[String] {
        &self.subtitle_langs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the content root if it does not exist yet.
    pub fn ensure_root(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Create a fresh, uniquely named artifact directory.
    pub fn create_artifact(&self) -> io::Result<Artifact> {
        let id = Uuid::new_v4().to_string();
        let dir = self.root.join(&id);
        std::fs::create_dir_all(&dir)?;
        tracing::debug!("Created artifact directory {:?}", dir);
        Ok(Artifact { id, dir })
    }

    /// Remove an artifact directory and everything in it. Failures are logged.
    pub fn remove_artifact(&self, artifact: &Artifact) {
        if let Err(e) = std::fs::remove_dir_all(&artifact.dir) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove artifact {}: {}", artifact.id, e);
            }
        }
    }

    /// Resolve `<root>/<id>/<filename>` to an existing regular file.
    pub fn resolve_file(&self, id: &str, filename: &str) -> Option<PathBuf> {
        if !is_safe_component(id) || !is_safe_component(filename) {
            return None;
        }
        let path = self.root.join(id).join(filename);
        path.is_file().then_some(path)
    }

    /// Resolve the audio file for an identifier, nested layout first, then flat.
    pub fn resolve_audio(&self, id: &str) -> Option<PathBuf> {
        if !is_safe_component(id) {
            return None;
        }

        let nested = self.root.join(id);
        if nested.is_dir() {
            if let Ok(ArtifactFiles {
                audio: Some(audio), ..
            }) = locate_files(&nested, &[])
            {
                return Some(nested.join(audio));
            }
        }

        let prefix = format!("{}.", id);
        let mut flat: Vec<PathBuf> = std::fs::read_dir(&self.root)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                name.strip_prefix(&prefix).is_some_and(is_media_extension)
            })
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        flat.sort();
        flat.into_iter().next()
    }
}

impl Artifact {
    /// Find the audio and subtitle files produced by a download.
    ///
    /// When several subtitle files exist, the first language of `langs` with
    /// a matching `.<lang>.srt` file wins; otherwise the first by name.
    pub fn locate(&self, langs: &[String]) -> io::Result<ArtifactFiles> {
        locate_files(&self.dir, langs)
    }
}

fn locate_files(dir: &Path, langs: &[String]) -> io::Result<ArtifactFiles> {
    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();

    let audio = names
        .iter()
        .find(|name| name.strip_prefix("audio.").is_some_and(is_media_extension))
        .cloned();

    let subtitles: Vec<&String> = names.iter().filter(|name| name.ends_with(".srt")).collect();
    let subtitle = langs
        .iter()
        .find_map(|lang| {
            let suffix = format!(".{}.srt", lang);
            subtitles.iter().find(|name| name.ends_with(&suffix))
        })
        .or_else(|| subtitles.first())
        .map(|name| name.to_string());

    Ok(ArtifactFiles { audio, subtitle })
}

/// A single extension that is neither a sidecar nor a download leftover.
fn is_media_extension(ext: &str) -> bool {
    const NOT_MEDIA: &[&str] = &[
        "srt", "vtt", "ttml", "json", "json3", "srv1", "srv2", "srv3", "description", "part",
        "ytdl", "jpg", "webp", "png",
    ];
    !ext.is_empty() && !ext.contains('.') && !NOT_MEDIA.contains(&ext.to_ascii_lowercase().as_str())
}

/// A single, non-empty path component with no traversal.
fn is_safe_component(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
}

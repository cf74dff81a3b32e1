//! Download adapter around the yt-dlp extraction engine.
//!
//! Each fetch gets its own uniquely named temporary directory; ownership of
//! the directory transfers to the caller inside [`Download`], and dropping it
//! removes the directory recursively. Cleanup is therefore unconditional,
//! whatever the outcome of the pipeline that requested the fetch.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// What to extract from the source URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Best available audio-only stream, transcoded to mp3.
    Audio,
    /// Best available video+audio stream.
    Video,
}

/// Errors that can occur while fetching media.
///
/// Callers treat all of these uniformly: the variants exist so the message
/// shown to the user says what actually went wrong.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Failed to create the working directory or spawn yt-dlp.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// yt-dlp exited with a failure (network error, unavailable format,
    /// restricted or malformed URL). Carries the engine's own message.
    #[error("yt-dlp failed: {0}")]
    Engine(String),
    /// yt-dlp reported success but left no usable file behind.
    #[error("yt-dlp produced no output file")]
    NoOutput,
}

/// A completed download. The file lives inside `workdir`; dropping the
/// struct removes both.
#[derive(Debug)]
pub struct Download {
    /// Path to the downloaded media file.
    pub file_path: PathBuf,
    /// Owning temporary directory, removed recursively on drop.
    pub workdir: TempDir,
}

/// Wrapper around the yt-dlp binary.
#[derive(Debug, Clone)]
pub struct Downloader {
    ytdlp_bin: String,
}

impl Downloader {
    /// Create a downloader invoking the given yt-dlp binary.
    #[must_use]
    pub fn new(ytdlp_bin: String) -> Self {
        Self { ytdlp_bin }
    }

    /// Fetch the media behind `url` into a fresh temporary directory.
    ///
    /// In [`Mode::Audio`] the result is the mp3 produced by the extraction
    /// postprocessor; in [`Mode::Video`] it is the muxed video file.
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] if the engine cannot be spawned, exits
    /// with a failure, or leaves no output file behind.
    pub async fn fetch(&self, url: &str, mode: Mode) -> Result<Download, DownloadError> {
        let workdir = tempfile::Builder::new().prefix("yt_").tempdir()?;
        // Title truncated to 80 chars in the template to stay clear of
        // filesystem path-length limits.
        let outtmpl = workdir.path().join("%(title).80s.%(ext)s");

        debug!("running {} for {url} ({mode:?})", self.ytdlp_bin);
        let output = Command::new(&self.ytdlp_bin)
            .args(ytdlp_args(mode))
            .arg("-o")
            .arg(&outtmpl)
            .arg(url)
            .output()
            .await?;

        if !output.status.success() {
            return Err(DownloadError::Engine(stderr_tail(&output.stderr)));
        }

        let file_path = pick_output(workdir.path(), mode).await?;
        Ok(Download { file_path, workdir })
    }
}

/// yt-dlp argument set per mode. The format selectors and the mp3
/// extraction step are the fixed contract with the engine.
fn ytdlp_args(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Audio => &[
            "-f",
            "bestaudio/best",
            "--extract-audio",
            "--audio-format",
            "mp3",
            "--no-warnings",
            "--no-progress",
        ],
        Mode::Video => &["-f", "bv*+ba/best", "--no-warnings", "--no-progress"],
    }
}

/// Locate the file yt-dlp produced inside `workdir`.
///
/// Audio mode always resolves to the `.mp3` the postprocessor wrote, even
/// when an intermediate container is still lying around; video mode takes
/// the largest regular file (intermediates are removed by yt-dlp itself).
async fn pick_output(workdir: &Path, mode: Mode) -> Result<PathBuf, DownloadError> {
    let mut entries = tokio::fs::read_dir(workdir).await?;
    let mut best: Option<(u64, PathBuf)> = None;

    while let Some(entry) = entries.next_entry().await? {
        let meta = entry.metadata().await?;
        if !meta.is_file() {
            continue;
        }
        let path = entry.path();
        if mode == Mode::Audio && path.extension().is_some_and(|ext| ext == "mp3") {
            return Ok(path);
        }
        if best.as_ref().is_none_or(|(size, _)| meta.len() > *size) {
            best = Some((meta.len(), path));
        }
    }

    match (mode, best) {
        // Audio with no mp3 present means the postprocessor never ran.
        (Mode::Audio, _) => Err(DownloadError::NoOutput),
        (Mode::Video, Some((_, path))) => Ok(path),
        (Mode::Video, None) => Err(DownloadError::NoOutput),
    }
}

/// Last chunk of stderr, enough to show the engine's actual complaint.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    match trimmed.char_indices().nth_back(499) {
        Some((idx, _)) => trimmed[idx..].to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{pick_output, stderr_tail, ytdlp_args, Mode};

    #[test]
    fn audio_args_request_mp3_extraction() {
        let args = ytdlp_args(Mode::Audio);
        assert!(args.contains(&"bestaudio/best"));
        assert!(args.contains(&"--extract-audio"));
        assert!(args.contains(&"mp3"));
    }

    #[test]
    fn video_args_request_muxed_stream() {
        let args = ytdlp_args(Mode::Video);
        assert!(args.contains(&"bv*+ba/best"));
        assert!(!args.contains(&"--extract-audio"));
    }

    #[tokio::test]
    async fn audio_output_prefers_the_mp3() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("song.webm"), vec![0u8; 2048]).expect("write");
        std::fs::write(dir.path().join("song.mp3"), vec![0u8; 128]).expect("write");

        let picked = pick_output(dir.path(), Mode::Audio).await.expect("pick");
        assert_eq!(picked.extension().and_then(|e| e.to_str()), Some("mp3"));
    }

    #[tokio::test]
    async fn audio_without_mp3_is_no_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("song.m4a"), vec![0u8; 128]).expect("write");

        assert!(pick_output(dir.path(), Mode::Audio).await.is_err());
    }

    #[tokio::test]
    async fn video_output_takes_largest_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("clip.mp4"), vec![0u8; 4096]).expect("write");
        std::fs::write(dir.path().join("clip.info.json"), vec![0u8; 64]).expect("write");

        let picked = pick_output(dir.path(), Mode::Video).await.expect("pick");
        assert_eq!(picked.extension().and_then(|e| e.to_str()), Some("mp4"));
    }

    #[tokio::test]
    async fn empty_workdir_is_no_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(pick_output(dir.path(), Mode::Video).await.is_err());
    }

    #[test]
    fn dropping_the_workdir_removes_it() {
        let dir = tempfile::Builder::new()
            .prefix("yt_")
            .tempdir()
            .expect("tempdir");
        let path = dir.path().to_path_buf();
        std::fs::write(path.join("leftover.mp3"), b"x").expect("write");

        drop(dir);
        assert!(!path.exists());
    }

    #[test]
    fn stderr_tail_keeps_the_end() {
        let long = "a".repeat(600) + "ERROR: it broke";
        let tail = stderr_tail(long.as_bytes());
        assert!(tail.len() <= 500);
        assert!(tail.ends_with("ERROR: it broke"));
    }
}

//! Telegram bot: command routing and the download → deliver pipelines.

/// General command and message handlers
pub mod handlers;
/// Download → size gate → deliver/upload orchestration
pub mod pipeline;
/// Dispatcher wiring and bot construction
pub mod runner;

use crate::config::Settings;
use crate::download::Downloader;
use crate::upload::Uploader;
use std::sync::Arc;
use std::time::Duration;

/// Shared, explicitly constructed services handed to every handler via the
/// dispatcher's dependency injection. No ambient singletons.
pub struct BotContext {
    /// Application settings.
    pub settings: Arc<Settings>,
    /// yt-dlp adapter.
    pub downloader: Downloader,
    /// File-hosting adapter.
    pub uploader: Uploader,
}

impl BotContext {
    /// Build the service bundle from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload HTTP client cannot be built.
    pub fn new(settings: Arc<Settings>) -> anyhow::Result<Self> {
        let downloader = Downloader::new(settings.ytdlp_bin.clone());
        let uploader = Uploader::new(
            settings.upload_url.clone(),
            Duration::from_secs(settings.upload_timeout_secs),
        )?;
        Ok(Self {
            settings,
            downloader,
            uploader,
        })
    }
}

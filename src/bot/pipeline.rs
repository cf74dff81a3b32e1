//! Delivery pipelines: fetch the media, then either send the audio inline
//! or upload the video and report the link.
//!
//! Every branch ends with the temporary workdir being dropped, so no
//! invocation leaves residual files behind. User-visible status lives in a
//! single message that is edited in place; if the edit fails (the message
//! vanished), the text is sent fresh instead of being dropped.

use crate::bot::BotContext;
use crate::utils::size_in_mb;
use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};
use tracing::{error, info, warn};

/// Inline attachments above this are rejected. Just under Telegram's 50 MB
/// hard cap to leave margin; the boundary is exclusive, exactly 49.0 MB
/// still goes inline.
const INLINE_LIMIT_MB: f64 = 49.0;

/// Outcome of the size gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Small enough to send as a chat attachment.
    Inline,
    /// Over the inline limit; a normal outcome, not an error.
    TooLarge,
}

/// Decide whether a file of `bytes` can be sent inline.
#[must_use]
pub fn size_gate(bytes: u64) -> Delivery {
    if size_in_mb(bytes) > INLINE_LIMIT_MB {
        Delivery::TooLarge
    } else {
        Delivery::Inline
    }
}

/// Fetch audio from `url` and send it inline, or explain why not.
///
/// # Errors
///
/// Only the initial status send can error out; everything after it is
/// reported to the chat instead of propagated.
pub async fn deliver_audio(bot: &Bot, ctx: &BotContext, chat_id: ChatId, url: &str) -> Result<()> {
    let status = bot.send_message(chat_id, "🎧 Fetching audio...").await?;

    let download = match ctx
        .downloader
        .fetch(url, crate::download::Mode::Audio)
        .await
    {
        Ok(d) => d,
        Err(e) => {
            warn!("audio download failed for {url}: {e}");
            report(bot, chat_id, status.id, &format!("❌ Audio download failed:\n{e}")).await;
            return Ok(());
        }
    };

    let bytes = match file_size(&download.file_path).await {
        Ok(b) => b,
        Err(e) => {
            report(bot, chat_id, status.id, &format!("❌ Audio download failed:\n{e}")).await;
            return Ok(());
        }
    };
    let size_mb = size_in_mb(bytes);

    if size_gate(bytes) == Delivery::TooLarge {
        report(
            bot,
            chat_id,
            status.id,
            &format!(
                "⚠️ The audio came out at {size_mb:.1} MB — over Telegram's 50 MB limit.\nTry a shorter source."
            ),
        )
        .await;
        return Ok(());
    }

    let send = bot
        .send_audio(chat_id, InputFile::file(&download.file_path))
        .caption(format!("Audio ({size_mb:.1} MB)"))
        .await;

    match send {
        Ok(_) => {
            info!("sent {size_mb:.1} MB of audio to chat {}", chat_id.0);
            report(bot, chat_id, status.id, &format!("✅ Done ({size_mb:.1} MB)")).await;
        }
        // The download itself was fine; only the hand-off failed.
        Err(e) => {
            warn!("audio delivery to chat {} failed: {e}", chat_id.0);
            report(
                bot,
                chat_id,
                status.id,
                &format!("❌ Downloaded fine, but failed to deliver the file:\n{e}"),
            )
            .await;
        }
    }
    Ok(())
}

/// Fetch video from `url`, upload it to the file host and report the link.
///
/// # Errors
///
/// Only the initial status send can error out; everything after it is
/// reported to the chat instead of propagated.
pub async fn deliver_video(bot: &Bot, ctx: &BotContext, chat_id: ChatId, url: &str) -> Result<()> {
    let status = bot
        .send_message(chat_id, "📹 Fetching the video, hang on...")
        .await?;

    let download = match ctx
        .downloader
        .fetch(url, crate::download::Mode::Video)
        .await
    {
        Ok(d) => d,
        Err(e) => {
            warn!("video download failed for {url}: {e}");
            report(bot, chat_id, status.id, &format!("❌ Video download failed:\n{e}")).await;
            return Ok(());
        }
    };

    let size_mb = match file_size(&download.file_path).await {
        Ok(b) => size_in_mb(b),
        Err(e) => {
            report(bot, chat_id, status.id, &format!("❌ Video download failed:\n{e}")).await;
            return Ok(());
        }
    };

    report(
        bot,
        chat_id,
        status.id,
        &format!("⬆️ Video downloaded ({size_mb:.1} MB). Uploading to gofile.io..."),
    )
    .await;

    match ctx.uploader.upload(&download.file_path).await {
        Ok(link) => {
            info!("uploaded {size_mb:.1} MB of video for chat {}", chat_id.0);
            report(
                bot,
                chat_id,
                status.id,
                &format!("✅ Done!\n\nSize: {size_mb:.1} MB\nDownload link:\n{link}"),
            )
            .await;
        }
        Err(e) => {
            warn!("video upload failed for chat {}: {e}", chat_id.0);
            report(bot, chat_id, status.id, &format!("❌ Video upload failed:\n{e}")).await;
        }
    }
    Ok(())
}

async fn file_size(path: &std::path::Path) -> std::io::Result<u64> {
    Ok(tokio::fs::metadata(path).await?.len())
}

/// Edit the status message in place; if the edit fails (the message was
/// deleted), fall back to sending a fresh one. The user-visible text is
/// never silently dropped.
async fn report(bot: &Bot, chat_id: ChatId, status_id: MessageId, text: &str) {
    if bot.edit_message_text(chat_id, status_id, text).await.is_ok() {
        return;
    }
    if let Err(e) = bot.send_message(chat_id, text).await {
        error!("failed to report status to chat {}: {e}", chat_id.0);
    }
}

#[cfg(test)]
mod tests {
    use super::{size_gate, Delivery};

    const MB: u64 = 1024 * 1024;

    #[test]
    fn exactly_49_mb_goes_inline() {
        assert_eq!(size_gate(49 * MB), Delivery::Inline);
    }

    #[test]
    fn just_over_49_mb_is_too_large() {
        assert_eq!(size_gate(49 * MB + 1), Delivery::TooLarge);
    }

    #[test]
    fn sixty_mb_is_too_large() {
        assert_eq!(size_gate(60 * MB), Delivery::TooLarge);
    }

    #[test]
    fn small_files_go_inline() {
        assert_eq!(size_gate(0), Delivery::Inline);
        assert_eq!(size_gate(3 * MB), Delivery::Inline);
    }
}

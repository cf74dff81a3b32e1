//! Command and plain-text message handlers.
//!
//! No URL-shape validation happens here beyond the bare-URL default check;
//! an unfetchable URL is yt-dlp's call to make and its error comes back
//! through the pipeline's status message.

use crate::bot::{pipeline, BotContext};
use crate::utils::is_url;
use anyhow::Result;
use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the help message
    #[command(description = "Show help.")]
    Start,
    /// Extract audio from a URL and send it inline
    #[command(description = "Extract audio from a URL (sent right here, up to 50 MB).")]
    Audio(String),
    /// Download a video and reply with a gofile.io link
    #[command(description = "Download a video and upload it to gofile.io.")]
    Video(String),
}

const HELP_TEXT: &str = "Hi! I fetch media from video sites.\n\n\
🎧 /audio <url> — extract the audio (up to 50 MB, sent right into the chat)\n\
📹 /video <url> — download the video and upload it to gofile.io (you get a link)\n\n\
You can also just send a link — audio by default.";

/// Non-empty, trimmed command argument, if any.
fn command_url(arg: &str) -> Option<&str> {
    let trimmed = arg.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Handle a parsed command.
///
/// # Errors
///
/// Returns an error when replying to the chat fails.
pub async fn handle_command(
    bot: &Bot,
    ctx: &Arc<BotContext>,
    msg: &Message,
    cmd: Command,
) -> Result<()> {
    let chat_id = msg.chat.id;
    match cmd {
        Command::Start => {
            bot.send_message(chat_id, HELP_TEXT).await?;
        }
        Command::Audio(arg) => match command_url(&arg) {
            Some(url) => pipeline::deliver_audio(bot, ctx, chat_id, url).await?,
            None => {
                bot.send_message(chat_id, "Usage: /audio <link to a video>")
                    .await?;
            }
        },
        Command::Video(arg) => match command_url(&arg) {
            Some(url) => pipeline::deliver_video(bot, ctx, chat_id, url).await?,
            None => {
                bot.send_message(chat_id, "Usage: /video <link to a video>")
                    .await?;
            }
        },
    }
    Ok(())
}

/// Handle a plain text message: a bare URL runs the audio pipeline, anything
/// else gets a hint.
///
/// # Errors
///
/// Returns an error when replying to the chat fails.
pub async fn handle_text(bot: &Bot, ctx: &Arc<BotContext>, msg: &Message) -> Result<()> {
    let text = msg.text().unwrap_or_default().trim();
    if is_url(text) {
        // Default mode for a bare link is audio.
        pipeline::deliver_audio(bot, ctx, msg.chat.id, text).await
    } else {
        bot.send_message(
            msg.chat.id,
            "Send me a link to a video, or use /audio and /video.",
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{command_url, Command};
    use teloxide::utils::command::BotCommands;

    #[test]
    fn audio_command_parses_with_url() {
        let cmd = Command::parse("/audio https://youtu.be/abc", "relaybot").expect("parse");
        assert_eq!(cmd, Command::Audio("https://youtu.be/abc".to_string()));
    }

    #[test]
    fn video_command_parses_with_url() {
        let cmd = Command::parse("/video https://youtu.be/abc", "relaybot").expect("parse");
        assert_eq!(cmd, Command::Video("https://youtu.be/abc".to_string()));
    }

    #[test]
    fn start_command_parses() {
        let cmd = Command::parse("/start", "relaybot").expect("parse");
        assert_eq!(cmd, Command::Start);
    }

    #[test]
    fn empty_argument_yields_no_url() {
        assert_eq!(command_url(""), None);
        assert_eq!(command_url("   "), None);
        assert_eq!(command_url(" https://x "), Some("https://x"));
    }
}

//! Dispatcher wiring.
//!
//! A failure inside one handler is logged and swallowed so it can never
//! take down the dispatcher or bleed into other chats; the user already got
//! their error through the pipeline's status message. Polling-transport
//! failures are different: the first one stops the dispatcher and comes
//! back out of [`run_bot`] as an `Err`, so the supervisor's backoff policy
//! governs the restart instead of the listener's internal retry.

use crate::bot::handlers::{self, Command};
use crate::bot::BotContext;
use crate::config::Settings;
use anyhow::Result;
use futures_util::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use teloxide::dispatching::ShutdownToken;
use teloxide::error_handlers::ErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tracing::{error, info};

/// Telegram request timeout. Generous: sending a near-50 MB audio file over
/// the Bot API takes a while.
const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(600);

/// Long-poll window for getUpdates.
const POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the bot handle with a client tuned for large attachment sends.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_bot(settings: &Settings) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(TELEGRAM_TIMEOUT)
        .build()?;
    Ok(Bot::with_client(settings.bot_token.clone(), client))
}

/// Listener error handler that stashes the first polling error and stops
/// the dispatcher, handing control back to the supervisor.
struct PollingErrorCapture {
    slot: Arc<Mutex<Option<teloxide::RequestError>>>,
    shutdown: ShutdownToken,
}

impl ErrorHandler<teloxide::RequestError> for PollingErrorCapture {
    fn handle_error(self: Arc<Self>, error: teloxide::RequestError) -> BoxFuture<'static, ()> {
        if let Ok(mut slot) = self.slot.lock() {
            slot.get_or_insert(error);
        }
        // Errors on an idle dispatcher have nothing to stop.
        let _ = self.shutdown.shutdown();
        Box::pin(async {})
    }
}

/// Long-polling listener. The backlog accumulated while the bot was down
/// is dropped at startup, not replayed.
fn polling_listener(bot: Bot) -> Polling<Bot> {
    Polling::builder(bot)
        .timeout(POLL_TIMEOUT)
        .drop_pending_updates()
        .build()
}

/// Run the dispatcher until polling fails or is deliberately stopped.
///
/// No Ctrl-C handler is installed: external signals terminate the process
/// directly, crash-only style.
///
/// # Errors
///
/// Returns the polling-transport error that stopped the listener (including
/// the 409 conflict when another instance polls the same token).
pub async fn run_bot(bot: Bot, ctx: Arc<BotContext>) -> Result<()> {
    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(dispatch_command),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.text().is_some())
                .endpoint(dispatch_text),
        );

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![ctx])
        .build();

    let slot = Arc::new(Mutex::new(None));
    let capture = Arc::new(PollingErrorCapture {
        slot: Arc::clone(&slot),
        shutdown: dispatcher.shutdown_token(),
    });

    info!("Bot is running...");
    dispatcher
        .dispatch_with_listener(polling_listener(bot), capture)
        .await;

    match slot.lock().ok().and_then(|mut s| s.take()) {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

async fn dispatch_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_command(&bot, &ctx, &msg, cmd).await {
        error!("Command handler error: {e:#}");
    }
    respond(())
}

async fn dispatch_text(
    bot: Bot,
    msg: Message,
    ctx: Arc<BotContext>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_text(&bot, &ctx, &msg).await {
        error!("Text handler error: {e:#}");
    }
    respond(())
}

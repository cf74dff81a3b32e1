//! Entry point: configuration, logging, liveness endpoint, supervised
//! polling loop.

use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};
use yt_relay::bot::{runner, BotContext};
use yt_relay::config::Settings;
use yt_relay::health::spawn_liveness;
use yt_relay::supervisor::{supervise, RetryPolicy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    info!("Starting yt-relay...");
    let settings = init_settings();

    // Started explicitly here, never as an import side effect.
    spawn_liveness(settings.port);

    let bot = runner::build_bot(&settings)?;
    let ctx = Arc::new(BotContext::new(Arc::clone(&settings))?);

    supervise(RetryPolicy::default(), || {
        let bot = bot.clone();
        let ctx = Arc::clone(&ctx);
        async move { runner::run_bot(bot, ctx).await }
    })
    .await;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("yt_relay=info,teloxide=warn,hyper=warn,reqwest=warn")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(settings) => {
            info!("Configuration loaded successfully.");
            Arc::new(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    }
}

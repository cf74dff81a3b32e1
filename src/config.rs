//! Configuration and settings management
//!
//! Loads settings from environment variables (optionally layered over
//! `config/*` files) and defines service defaults.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token. Startup fails fast if missing.
    pub bot_token: String,

    /// Port for the keep-alive HTTP endpoint (hosting platforms set `PORT`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the yt-dlp binary.
    #[serde(default = "default_ytdlp_bin")]
    pub ytdlp_bin: String,

    /// File-hosting upload endpoint.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Upload request timeout in seconds. Minutes, not seconds of slack:
    /// large video files over slow links need it.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

const fn default_port() -> u16 {
    5000
}

fn default_ytdlp_bin() -> String {
    "yt-dlp".to_string()
}

fn default_upload_url() -> String {
    "https://upload.gofile.io/uploadfile".to_string()
}

const fn default_upload_timeout_secs() -> u64 {
    300
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails, in particular when
    /// `BOT_TOKEN` is absent.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Local overrides, not checked into git
            .add_source(File::with_name("config/local").required(false))
            // Environment::default() auto-converts UPPER_SNAKE_CASE to snake_case;
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use config::Config;

    fn settings_with_token_only() -> Settings {
        Config::builder()
            .set_override("bot_token", "123:dummy")
            .expect("override")
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize")
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let settings = settings_with_token_only();
        assert_eq!(settings.bot_token, "123:dummy");
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.ytdlp_bin, "yt-dlp");
        assert_eq!(settings.upload_url, "https://upload.gofile.io/uploadfile");
        assert_eq!(settings.upload_timeout_secs, 300);
    }

    #[test]
    fn missing_token_is_an_error() {
        let result: Result<Settings, _> = Config::builder()
            .build()
            .expect("build")
            .try_deserialize();
        assert!(result.is_err());
    }
}

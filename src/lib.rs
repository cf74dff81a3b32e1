#![deny(missing_docs)]
//! yt-relay - Telegram media relay bot
//!
//! A Telegram bot that fetches media from video sites via yt-dlp and either
//! sends the extracted audio inline or uploads the video to gofile.io and
//! replies with a download link.

/// Telegram bot implementation
pub mod bot;
/// Configuration management
pub mod config;
/// yt-dlp download adapter
pub mod download;
/// Keep-alive HTTP endpoint for hosting-platform health checks
pub mod health;
/// Retry-forever supervision of the polling loop
pub mod supervisor;
/// gofile.io upload adapter
pub mod upload;
pub mod utils;

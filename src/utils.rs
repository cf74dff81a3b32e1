//! Small helpers shared across the bot: URL detection and size formatting.

/// Returns true if the text looks like a fetchable URL: an `http://` or
/// `https://` prefix followed by at least one non-whitespace character.
///
/// # Examples
///
/// ```
/// use yt_relay::utils::is_url;
/// assert!(is_url("https://youtu.be/abc"));
/// assert!(!is_url("just some text"));
/// ```
#[must_use]
pub fn is_url(text: &str) -> bool {
    text.strip_prefix("http://")
        .or_else(|| text.strip_prefix("https://"))
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| !c.is_whitespace())
}

/// File size in binary megabytes (bytes / 1024²).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn size_in_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

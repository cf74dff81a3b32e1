//! Upload adapter for the gofile.io file-hosting API.
//!
//! Streams a local file as a multipart POST and extracts the public download
//! link from the JSON response. No retry happens at this layer; a failed
//! upload is reported as-is to the pipeline.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::debug;

/// Errors that can occur while uploading a file.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Could not open or stat the local file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with something that is not the expected JSON.
    #[error("file host returned a non-JSON response: {0}")]
    MalformedResponse(String),
    /// The endpoint answered JSON, but the status field is not a success.
    #[error("file host rejected the upload: {0}")]
    Rejected(String),
    /// Success status without any link to hand back.
    #[error("file host reported success but returned no link: {0}")]
    MissingLink(String),
}

#[derive(Deserialize)]
struct UploadResponse {
    status: Option<String>,
    data: Option<UploadData>,
}

#[derive(Deserialize)]
struct UploadData {
    #[serde(rename = "downloadPage")]
    download_page: Option<String>,
    #[serde(rename = "directLink")]
    direct_link: Option<String>,
}

/// Client for the file-hosting upload endpoint.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: reqwest::Client,
    endpoint: String,
}

impl Uploader {
    /// Create an uploader targeting `endpoint` with the given request
    /// timeout (minutes, not seconds — video files are large).
    ///
    /// # Errors
    ///
    /// Returns a `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Upload the file and return its public download link.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`] on transport failure or when the response
    /// violates the endpoint's contract.
    pub async fn upload(&self, path: &Path) -> Result<String, UploadError> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map_or_else(|| "upload.bin".to_string(), |n| n.to_string_lossy().into_owned());

        debug!("uploading {file_name} ({len} bytes) to {}", self.endpoint);
        let body = reqwest::Body::wrap_stream(FramedRead::new(file, BytesCodec::new()));
        let part = reqwest::multipart::Part::stream_with_length(body, len).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;
        let text = response.text().await?;
        parse_response(&text)
    }
}

/// Extract the download link from the endpoint's JSON response.
///
/// Success iff `status` is `ok` or `success`; the download-page link is
/// preferred over the direct link.
///
/// # Errors
///
/// Returns an [`UploadError`] describing which part of the contract the
/// response violated, with the offending payload in the message.
pub fn parse_response(body: &str) -> Result<String, UploadError> {
    let payload: UploadResponse = serde_json::from_str(body)
        .map_err(|_| UploadError::MalformedResponse(excerpt(body)))?;

    if !matches!(payload.status.as_deref(), Some("ok" | "success")) {
        return Err(UploadError::Rejected(excerpt(body)));
    }

    payload
        .data
        .and_then(|d| d.download_page.or(d.direct_link))
        .ok_or_else(|| UploadError::MissingLink(excerpt(body)))
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(500) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_response, UploadError};

    #[test]
    fn extracts_download_page_link() {
        let link = parse_response(r#"{"status": "ok", "data": {"downloadPage": "https://x/y"}}"#)
            .expect("link");
        assert_eq!(link, "https://x/y");
    }

    #[test]
    fn prefers_download_page_over_direct_link() {
        let body = r#"{"status": "success",
                       "data": {"downloadPage": "https://x/page", "directLink": "https://x/direct"}}"#;
        assert_eq!(parse_response(body).expect("link"), "https://x/page");
    }

    #[test]
    fn falls_back_to_direct_link() {
        let body = r#"{"status": "ok", "data": {"directLink": "https://x/direct"}}"#;
        assert_eq!(parse_response(body).expect("link"), "https://x/direct");
    }

    #[test]
    fn error_status_is_rejected_with_payload() {
        let err = parse_response(r#"{"status": "error"}"#).expect_err("rejected");
        assert!(matches!(err, UploadError::Rejected(_)));
        assert!(err.to_string().contains(r#""status": "error""#));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_response("<html>502 Bad Gateway</html>").expect_err("malformed");
        assert!(matches!(err, UploadError::MalformedResponse(_)));
    }

    #[test]
    fn success_without_link_is_missing_link() {
        let err = parse_response(r#"{"status": "ok", "data": {}}"#).expect_err("missing");
        assert!(matches!(err, UploadError::MissingLink(_)));
        let err = parse_response(r#"{"status": "ok"}"#).expect_err("missing");
        assert!(matches!(err, UploadError::MissingLink(_)));
    }
}

use std::{path::PathBuf, time::SystemTime};

use bytes::Bytes;

/// One cached origin response.
///
/// The raw response (headers + body, uncensored) always lives in
/// `storage_path`. Text responses additionally keep the same bytes in
/// `text_body` so they can be censored and replayed without touching disk.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    /// Request target exactly as the client sent it.
    pub url: String,
    /// HTTP-date of capture, sent back as `If-Modified-Since`.
    pub last_modified: String,
    pub storage_path: PathBuf,
    pub is_text: bool,
    pub text_body: Option<Bytes>,
}

impl CachedEntry {
    pub fn text(url: impl Into<String>, storage_path: PathBuf, body: impl Into<Bytes>) -> Self {
        Self {
            url: url.into(),
            last_modified: now_http_date(),
            storage_path,
            is_text: true,
            text_body: Some(body.into()),
        }
    }

    pub fn binary(url: impl Into<String>, storage_path: PathBuf) -> Self {
        Self {
            url: url.into(),
            last_modified: now_http_date(),
            storage_path,
            is_text: false,
            text_body: None,
        }
    }
}

fn now_http_date() -> String {
    httpdate::fmt_http_date(SystemTime::now())
}

//! Conditional GET against the origin of a cached URL.

use std::io;

use http::Uri;
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::{Duration, timeout},
};

const MAX_STATUS_BYTES: usize = 16 * 1024;

#[derive(Debug, Error)]
pub enum RevalidateError {
    #[error("'{0}' is not an absolute http URL")]
    NotAbsolute(String),
    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("timed out talking to origin")]
    Timeout,
    #[error("origin i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("origin closed before sending a status line")]
    Closed,
    #[error("malformed origin response: {0}")]
    BadResponse(#[from] httparse::Error),
}

/// Send `If-Modified-Since: last_modified` to the origin of `url` and report
/// whether it answered `304 Not Modified`.
///
/// `limit` bounds the connect, the write and every read separately.
pub async fn check_not_modified(
    url: &str,
    last_modified: &str,
    limit: Duration,
) -> Result<bool, RevalidateError> {
    let uri: Uri = url
        .parse()
        .map_err(|_| RevalidateError::NotAbsolute(url.to_string()))?;

    match uri.scheme_str() {
        Some("http") => {}
        Some(other) => return Err(RevalidateError::UnsupportedScheme(other.to_string())),
        None => return Err(RevalidateError::NotAbsolute(url.to_string())),
    }
    let authority = uri
        .authority()
        .ok_or_else(|| RevalidateError::NotAbsolute(url.to_string()))?;
    let host = authority.host().trim_start_matches('[').trim_end_matches(']');
    let port = authority.port_u16().unwrap_or(80);
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    let request = format!(
        "GET {path} HTTP/1.1\r\n\
         Host: {authority}\r\n\
         If-Modified-Since: {last_modified}\r\n\
         Connection: close\r\n\
         \r\n"
    );

    let mut stream = timeout(limit, TcpStream::connect((host, port)))
        .await
        .map_err(|_| RevalidateError::Timeout)??;
    timeout(limit, stream.write_all(request.as_bytes()))
        .await
        .map_err(|_| RevalidateError::Timeout)??;

    let mut buf = Vec::with_capacity(1024);
    let mut tmp = [0u8; 1024];
    loop {
        let n = timeout(limit, stream.read(&mut tmp))
            .await
            .map_err(|_| RevalidateError::Timeout)??;
        if n == 0 {
            return Err(RevalidateError::Closed);
        }
        buf.extend_from_slice(&tmp[..n]);

        let mut headers = [httparse::EMPTY_HEADER; 64];
        let mut response = httparse::Response::new(&mut headers);
        match response.parse(&buf) {
            Ok(_) if response.code.is_some() => return Ok(response.code == Some(304)),
            Ok(_) if buf.len() < MAX_STATUS_BYTES => continue,
            Ok(_) => return Err(RevalidateError::Closed),
            // status line already parsed; only the header block was too big for us
            Err(httparse::Error::TooManyHeaders) if response.code.is_some() => {
                return Ok(response.code == Some(304));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

//! Request/response header parsing on raw header text.

use std::num::ParseIntError;

use thiserror::Error;

/// Port used when the Host header carries none.
pub const DEFAULT_HTTP_PORT: u16 = 80;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("invalid port in host address '{address}'")]
    InvalidPort {
        address: String,
        #[source]
        source: ParseIntError,
    },
}

/// Split a header line into name and value at the first colon followed by
/// whitespace. Lines without such a separator (status lines, folded junk)
/// yield `None`.
fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let bytes = line.as_bytes();
    let idx = bytes
        .windows(2)
        .position(|w| w[0] == b':' && w[1].is_ascii_whitespace())?;
    let name = &line[..idx];
    let value = line[idx + 1..].trim();
    Some((name, value))
}

/// The request target (second field of the request line).
///
/// The request line must carry at least method, target and version;
/// anything shorter yields `None` and the request is served uncached.
pub fn parse_request_target(request: &str) -> Option<String> {
    let request_line = request.lines().next()?;
    let mut parts = request_line.split_whitespace();
    let _method = parts.next()?;
    let target = parts.next()?;
    let _version = parts.next()?;
    Some(target.to_string())
}

/// Raw value of the `Host` header (`host[:port]`), matched case-insensitively.
pub fn extract_host_header(request: &str) -> Option<String> {
    for line in request.lines() {
        let Some((name, value)) = split_header_line(line) else {
            continue;
        };
        if name.eq_ignore_ascii_case("host") && !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

/// Split `host[:port]` on its first colon; the port defaults to 80.
///
/// A bracketed IPv6 literal (`[::1]:8080`) is split after the closing bracket.
pub fn split_host_port(address: &str) -> Result<(String, u16), MessageError> {
    let address = address.trim();

    let (host, port) = match address.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
        Some((v6, rest)) => (v6, rest.strip_prefix(':')),
        None => match address.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (address, None),
        },
    };

    let port = match port {
        Some(raw) => raw.parse::<u16>().map_err(|source| MessageError::InvalidPort {
            address: address.to_string(),
            source,
        })?,
        None => DEFAULT_HTTP_PORT,
    };

    Ok((host.to_string(), port))
}

/// Decide whether a response is textual (and therefore censorable) from its
/// header block.
///
/// `Content-Type` containing `text/` marks text; any header whose name contains
/// `encoding` with a value mentioning `gzip` forces binary, whatever the
/// content type says.
pub fn classify_content_type(header: &str) -> bool {
    let mut is_text = false;
    for line in header.lines() {
        let Some((name, value)) = split_header_line(line) else {
            continue;
        };
        if name.eq_ignore_ascii_case("content-type") {
            is_text = value.to_ascii_lowercase().contains("text/");
        } else if name.to_ascii_lowercase().contains("encoding")
            && value.to_ascii_lowercase().contains("gzip")
        {
            return false;
        }
    }
    is_text
}

#[cfg(test)]
mod tests {
    use super::{
        MessageError, classify_content_type, extract_host_header, parse_request_target,
        split_host_port,
    };

    #[test]
    fn request_target_from_request_line() {
        let req = "GET http://example.com/a?b=1 HTTP/1.1\r\nHost: example.com\r\n\r\n";
        assert_eq!(
            parse_request_target(req).as_deref(),
            Some("http://example.com/a?b=1")
        );
    }

    #[test]
    fn request_target_needs_three_fields() {
        assert_eq!(parse_request_target("GET /\r\nHost: example.com\r\n\r\n"), None);
        assert_eq!(parse_request_target(""), None);
        assert_eq!(
            parse_request_target("GET / HTTP/1.1 trailing").as_deref(),
            Some("/")
        );
    }

    #[test]
    fn host_header_any_case_and_line_ending() {
        let req = "GET / HTTP/1.1\nhOsT: example.com:8080\nAccept: */*\n\n";
        assert_eq!(extract_host_header(req).as_deref(), Some("example.com:8080"));

        let req = "GET / HTTP/1.1\r\nAccept: */*\r\n\r\n";
        assert_eq!(extract_host_header(req), None);
    }

    #[test]
    fn host_port_split() {
        assert_eq!(
            split_host_port("example.com").expect("host"),
            ("example.com".to_string(), 80)
        );
        assert_eq!(
            split_host_port("example.com:8080").expect("host"),
            ("example.com".to_string(), 8080)
        );
        assert_eq!(
            split_host_port("[::1]:3000").expect("host"),
            ("::1".to_string(), 3000)
        );
    }

    #[test]
    fn host_port_rejects_bad_port() {
        let err = split_host_port("example.com:http").unwrap_err();
        assert!(matches!(err, MessageError::InvalidPort { .. }));
        assert!(split_host_port("example.com:70000").is_err());
    }

    #[test]
    fn classify_text_content_type() {
        let header = "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: 5";
        assert!(classify_content_type(header));

        let header = "HTTP/1.1 200 OK\r\ncontent-type: TEXT/PLAIN";
        assert!(classify_content_type(header));
    }

    #[test]
    fn classify_binary_content_type() {
        assert!(!classify_content_type("HTTP/1.1 200 OK\r\nContent-Type: image/png"));
        assert!(!classify_content_type("HTTP/1.1 200 OK\r\nContent-Length: 3"));
    }

    #[test]
    fn gzip_encoding_forces_binary() {
        let header = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Encoding: gzip";
        assert!(!classify_content_type(header));

        let header = "HTTP/1.1 200 OK\r\nTRANSFER-ENCODING: x-GZIP\r\nContent-Type: text/plain";
        assert!(!classify_content_type(header));

        let header = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Encoding: br";
        assert!(classify_content_type(header));
    }
}

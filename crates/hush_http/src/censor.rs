//! Censored word list and its application to buffered text responses.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::{message::classify_content_type, scanner};

/// Ordered list of literal words replaced in text bodies, matched
/// ASCII case-insensitively.
#[derive(Debug, Clone)]
pub struct CensorList {
    words: Vec<String>,
    replacement: String,
}

impl Default for CensorList {
    fn default() -> Self {
        Self::new(Vec::new(), "---")
    }
}

impl CensorList {
    pub fn new(words: Vec<String>, replacement: impl Into<String>) -> Self {
        let words = words
            .into_iter()
            .map(|w| w.trim_end_matches(['\r', '\n']).to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            words,
            replacement: replacement.into(),
        }
    }

    /// Read one word per line from `path`. A missing or unreadable file is not
    /// fatal: the proxy simply censors nothing.
    pub async fn load(path: impl AsRef<Path>, replacement: &str) -> Self {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                let list = Self::new(contents.lines().map(str::to_string).collect(), replacement);
                info!(
                    target: "hush::censor",
                    path = %path.display(),
                    words = list.words.len(),
                    "Loaded censored word list"
                );
                list
            }
            Err(e) => {
                warn!(
                    target: "hush::censor",
                    path = %path.display(),
                    error = %e,
                    "No censored word list; responses pass through uncensored"
                );
                Self::new(Vec::new(), replacement)
            }
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words that also occur inside the replacement; censoring with them is
    /// not idempotent.
    pub fn words_in_replacement(&self) -> Vec<&str> {
        let replacement = self.replacement.to_ascii_lowercase();
        self.words
            .iter()
            .filter(|w| replacement.contains(&w.to_ascii_lowercase()))
            .map(String::as_str)
            .collect()
    }

    /// Censor a complete response (headers + body). Headers are never touched,
    /// and a response whose headers do not classify as text is returned as is.
    pub fn apply(&self, response: &[u8]) -> Vec<u8> {
        let header = String::from_utf8_lossy(scanner::header_block(response));
        if !classify_content_type(&header) {
            return response.to_vec();
        }

        let start = scanner::body_offset(response);
        let censored = self.words.iter().fold(response.to_vec(), |acc, word| {
            scanner::replace_all(&acc, start, word.as_bytes(), self.replacement.as_bytes())
        });

        debug!(
            target: "hush::censor",
            before = response.len(),
            after = censored.len(),
            "Censored text response"
        );
        censored
    }
}

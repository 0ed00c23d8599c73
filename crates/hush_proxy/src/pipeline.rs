//! Origin -> client response relay.
//!
//! The first chunk read from the origin decides how the rest of the response
//! travels. Binary responses are forwarded chunk by chunk as they arrive; text
//! responses are held in memory, censored once complete and written in one go.
//! Either way the raw bytes are copied to a `<N>.cache` file and, if the whole
//! exchange succeeds, the result is stored in the cache under the request URL.

use std::path::PathBuf;

use hush_cache::{CacheStore, CachedEntry};
use hush_http::{ClientStream, CensorList, message::classify_content_type, scanner};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::{
    ProxyError, ProxySettings,
    capture::CacheCapture,
    connector::{Origin, ReadOutcome},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Text,
    Binary,
}

impl Classification {
    /// Classify from the header block at the start of the first chunk.
    pub fn of_first_chunk(chunk: &[u8]) -> Self {
        let boundary = scanner::find_header_boundary(chunk);
        let end = (boundary + 1).min(chunk.len());
        let header = String::from_utf8_lossy(&chunk[..end]);
        if classify_content_type(&header) {
            Classification::Text
        } else {
            Classification::Binary
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Delivery {
    Delivered {
        classification: Classification,
        /// Raw bytes received from the origin.
        bytes: usize,
        cached: bool,
    },
    /// The origin never produced a byte.
    Aborted,
}

pub struct ResponsePipeline<'a> {
    cache: &'a CacheStore,
    censor: &'a CensorList,
    settings: &'a ProxySettings,
    url: Option<&'a str>,
}

impl<'a> ResponsePipeline<'a> {
    pub fn new(
        cache: &'a CacheStore,
        censor: &'a CensorList,
        settings: &'a ProxySettings,
        url: Option<&'a str>,
    ) -> Self {
        Self {
            cache,
            censor,
            settings,
            url,
        }
    }

    #[instrument(skip_all, fields(origin = %origin.addr(), url = self.url.unwrap_or("-")))]
    pub async fn run<C>(self, origin: &mut Origin, client: &mut C) -> Result<Delivery, ProxyError>
    where
        C: ClientStream + ?Sized,
    {
        let mut capture = match self.url {
            Some(_) => CacheCapture::create(self.cache.next_storage_path()).await,
            None => CacheCapture::disabled(),
        };

        let mut buf = vec![0u8; self.settings.response_buffer_bytes.max(1)];
        let mut text = Vec::new();
        let mut classification = None;
        let mut total = 0usize;
        let mut idle_reads = 0u32;

        // Reading: drain until EOF. Before the first byte a timed-out read
        // costs one idle attempt; once data has arrived it ends the response.
        loop {
            let n = match origin.read_chunk(&mut buf).await {
                Ok(ReadOutcome::Read(0)) => break,
                Ok(ReadOutcome::Read(n)) => n,
                Ok(ReadOutcome::Timeout) if total > 0 => {
                    debug!(target: "hush::proxy", total, "Origin went quiet; response complete");
                    break;
                }
                Ok(ReadOutcome::Timeout) => {
                    idle_reads += 1;
                    if idle_reads >= self.settings.max_idle_reads {
                        debug!(target: "hush::proxy", idle_reads, total, "Idle budget exhausted");
                        break;
                    }
                    continue;
                }
                Err(e) => {
                    capture.discard().await;
                    return Err(e);
                }
            };

            let chunk = &buf[..n];
            total += n;
            capture.append(chunk).await;

            let class = *classification.get_or_insert_with(|| {
                let class = Classification::of_first_chunk(chunk);
                debug!(target: "hush::proxy", ?class, "Classified response");
                class
            });

            match class {
                Classification::Binary => {
                    if let Err(e) = write_and_flush(client, chunk).await {
                        capture.discard().await;
                        return Err(ProxyError::ClientWrite(e));
                    }
                }
                Classification::Text => text.extend_from_slice(chunk),
            }
        }

        let Some(classification) = classification else {
            warn!(target: "hush::proxy", origin = %origin.addr(), "Origin sent no data; dropping connection");
            capture.discard().await;
            let _ = client.shutdown().await;
            return Ok(Delivery::Aborted);
        };

        // Finalizing: binary bytes are already out, text goes out censored.
        // The entry is stored before the client sees end of stream.
        if classification == Classification::Text {
            let censored = self.censor.apply(&text);
            if let Err(e) = write_and_flush(client, &censored).await {
                capture.discard().await;
                return Err(ProxyError::ClientWrite(e));
            }
        }

        let cached = self.store(capture, classification, text).await;
        let _ = client.shutdown().await;

        info!(
            target: "hush::proxy",
            origin = %origin.addr(),
            bytes = total,
            ?classification,
            cached,
            "Response delivered"
        );

        Ok(Delivery::Delivered {
            classification,
            bytes: total,
            cached,
        })
    }

    async fn store(&self, capture: CacheCapture, classification: Classification, text: Vec<u8>) -> bool {
        let Some(url) = self.url else {
            return false;
        };
        let intended = capture.path().map(|p| p.to_path_buf());
        let persisted = capture.finish().await;

        match (classification, persisted, intended) {
            (Classification::Binary, Some(path), _) => {
                self.cache.store(CachedEntry::binary(url, path));
                true
            }
            (Classification::Binary, None, _) => {
                warn!(target: "hush::cache", %url, "Binary response not cached: disk copy incomplete");
                false
            }
            (Classification::Text, Some(path), _) => {
                self.cache.store(CachedEntry::text(url, path, text));
                true
            }
            (Classification::Text, None, intended) => {
                // replay only reads the in-memory body; the empty path marks the missing file
                warn!(
                    target: "hush::cache",
                    %url,
                    path = %intended.unwrap_or_default().display(),
                    "Text response cached in memory only: disk copy incomplete"
                );
                self.cache.store(CachedEntry::text(url, PathBuf::new(), text));
                true
            }
        }
    }
}

async fn write_and_flush<C>(client: &mut C, bytes: &[u8]) -> std::io::Result<()>
where
    C: ClientStream + ?Sized,
{
    client.write_all(bytes).await?;
    client.flush().await
}

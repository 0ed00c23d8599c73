//! Serving a cached entry back to a client.

use hush_cache::CachedEntry;
use hush_http::{ClientStream, CensorList};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use crate::ProxyError;

/// What became of a cache lookup for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// No entry for the URL.
    Miss,
    /// Entry present but the origin did not answer `304`.
    Stale,
    /// Entry is fresh but its file is gone; fetch from origin instead.
    Unavailable,
    Served { bytes: u64 },
}

/// Write `entry` to `client`. Text is censored from the in-memory copy,
/// binary is streamed from its cache file.
pub(crate) async fn replay<C>(
    entry: &CachedEntry,
    censor: &CensorList,
    buffer_bytes: usize,
    client: &mut C,
) -> Result<CacheOutcome, ProxyError>
where
    C: ClientStream + ?Sized,
{
    if let (true, Some(body)) = (entry.is_text, entry.text_body.as_ref()) {
        let censored = censor.apply(body);
        client
            .write_all(&censored)
            .await
            .map_err(ProxyError::ClientWrite)?;
        client.flush().await.map_err(ProxyError::ClientWrite)?;
        return Ok(CacheOutcome::Served {
            bytes: censored.len() as u64,
        });
    }

    let mut file = match File::open(&entry.storage_path).await {
        Ok(file) => file,
        Err(e) => {
            warn!(
                target: "hush::cache",
                url = %entry.url,
                path = %entry.storage_path.display(),
                error = %e,
                "Cached file missing; refetching from origin"
            );
            return Ok(CacheOutcome::Unavailable);
        }
    };

    let mut buf = vec![0u8; buffer_bytes.max(1)];
    let mut sent = 0u64;
    loop {
        let n = file.read(&mut buf).await.map_err(|source| ProxyError::LocalIo {
            path: entry.storage_path.clone(),
            source,
        })?;
        if n == 0 {
            break;
        }
        client
            .write_all(&buf[..n])
            .await
            .map_err(ProxyError::ClientWrite)?;
        sent += n as u64;
    }
    client.flush().await.map_err(ProxyError::ClientWrite)?;

    debug!(target: "hush::cache", url = %entry.url, bytes = sent, "Streamed cached file");
    Ok(CacheOutcome::Served { bytes: sent })
}

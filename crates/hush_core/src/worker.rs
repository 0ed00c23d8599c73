use std::{net::SocketAddr, sync::Arc};

use hush_http::{ClientStream, message::parse_request_target, responses::send_502};
use hush_proxy::{CacheOutcome, Delivery, Proxy};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

/// Serve one client connection: a single request, a single response.
///
/// Order of business: read the request, try the cache, otherwise connect to
/// the origin named by `Host`, forward the request and relay the response.
#[instrument(skip(stream, proxy), fields(client = %client_addr))]
pub async fn handle_connection(
    mut stream: Box<dyn ClientStream>,
    client_addr: SocketAddr,
    proxy: Arc<Proxy>,
) -> anyhow::Result<()> {
    debug!(target: "hush::worker", "Handling new client connection");

    // Requests larger than the buffer are truncated.
    let mut buf = vec![0u8; proxy.settings().request_buffer_bytes.max(1)];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]).into_owned();
    if request.trim().is_empty() {
        debug!(target: "hush::worker", "Empty request; closing connection");
        let _ = stream.shutdown().await;
        return Ok(());
    }

    let url = parse_request_target(&request);
    info!(target: "hush::worker", url = url.as_deref().unwrap_or("-"), bytes = n, "Request received");

    if let Some(url) = url.as_deref() {
        match proxy.serve_cached(url, &mut stream).await? {
            CacheOutcome::Served { bytes } => {
                info!(target: "hush::worker", %url, bytes, "Served from cache");
                let _ = stream.shutdown().await;
                return Ok(());
            }
            outcome => debug!(target: "hush::worker", ?outcome, "Going to origin"),
        }
    }

    let mut origin = match proxy.connect(&request).await {
        Ok(origin) => origin,
        Err(e) if e.wants_bad_gateway() => {
            warn!(target: "hush::worker", error = %e, "Replying 502 Bad Gateway");
            send_502(&mut stream).await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    origin.send(&buf[..n]).await?;

    match proxy.relay(url.as_deref(), &mut origin, &mut stream).await? {
        Delivery::Delivered { .. } => {}
        Delivery::Aborted => {
            debug!(target: "hush::worker", origin = %origin.addr(), "Origin produced no response");
        }
    }

    Ok(())
}

use std::sync::Arc;

use hush_config::HushConfig;
use hush_proxy::Proxy;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

use crate::worker::handle_connection;

pub struct Master {
    cfg: Arc<HushConfig>,
    proxy: Arc<Proxy>,
}

impl Master {
    pub fn new(cfg: HushConfig, proxy: Arc<Proxy>) -> Self {
        Self {
            cfg: Arc::new(cfg),
            proxy,
        }
    }

    /// Bind the listening socket and serve until Ctrl+C.
    #[instrument(skip(self), fields(
        listen = %self.cfg.global.listen,
        log_level = %self.cfg.global.log_level,
    ))]
    pub async fn run(self) -> anyhow::Result<()> {
        info!(target: "hush::master", "Starting HUSH proxy");

        let listen_addr = self.cfg.global.listen.as_str();
        let listener = match TcpListener::bind(listen_addr).await {
            Ok(l) => {
                info!(target: "hush::master", listen = %listen_addr, "Bind() successful");
                l
            }
            Err(e) => {
                error!(
                    target: "hush::master",
                    listen = %listen_addr,
                    error = ?e,
                    "Failed to bind listener"
                );
                return Err(e.into());
            }
        };

        info!(
            target: "hush::master",
            cache_dir = %self.proxy.cache().dir().display(),
            censored_words = self.proxy.censor().words().len(),
            "Waiting for incoming connections (Ctrl+C to stop)..."
        );

        tokio::select! {
            _ = serve(listener, self.proxy.clone()) => {
                warn!(target: "hush::master", "Accept loop exited");
            }
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    error!(target: "hush::master", error = ?e, "Failed to listen for Ctrl+C");
                }
                info!(target: "hush::master", "Shutdown requested; no longer accepting connections");
            }
        }

        Ok(())
    }
}

/// Accept connections forever, one task per client.
///
/// Accept errors are logged and the loop keeps going; a failing connection
/// never takes the listener down with it.
pub async fn serve(listener: TcpListener, proxy: Arc<Proxy>) {
    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(target: "hush::master", error = ?e, "Failed to accept connection");
                continue;
            }
        };

        let proxy = proxy.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(Box::new(stream), addr, proxy).await {
                warn!(
                    target: "hush::worker",
                    client = %addr,
                    error = ?e,
                    "Connection ended with an error"
                );
            }
        });
    }
}

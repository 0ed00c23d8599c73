//! Forwarding side of the proxy: origin connections, the response relay, and
//! cache population/replay.

use std::time::Duration;

use hush_cache::CacheStore;
use hush_config::{HushConfig, ProxyConfig};
use hush_http::{
    ClientStream, CensorList,
    message::{extract_host_header, split_host_port},
};
use tracing::{debug, instrument};

mod capture;
pub mod connector;
pub mod error;
pub mod pipeline;
mod replay;

pub use connector::{Origin, ReadOutcome};
pub use error::ProxyError;
pub use pipeline::{Classification, Delivery, ResponsePipeline};
pub use replay::CacheOutcome;

/// Runtime knobs resolved from `[proxy]`.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub max_idle_reads: u32,
    pub request_buffer_bytes: usize,
    pub response_buffer_bytes: usize,
}

impl From<&ProxyConfig> for ProxySettings {
    fn from(cfg: &ProxyConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs()),
            read_timeout: Duration::from_millis(cfg.read_timeout_millis()),
            max_idle_reads: cfg.max_idle_reads(),
            request_buffer_bytes: cfg.request_buffer_bytes(),
            response_buffer_bytes: cfg.response_buffer_bytes(),
        }
    }
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self::from(&ProxyConfig::default())
    }
}

/// State shared by every connection: the cache, the word list and settings.
#[derive(Debug)]
pub struct Proxy {
    cache: CacheStore,
    censor: CensorList,
    settings: ProxySettings,
}

impl Proxy {
    pub fn new(cache: CacheStore, censor: CensorList, settings: ProxySettings) -> Self {
        Self {
            cache,
            censor,
            settings,
        }
    }

    pub fn from_config(cfg: &HushConfig, censor: CensorList) -> Self {
        let cache = CacheStore::new(
            cfg.cache().dir(),
            Duration::from_secs(cfg.cache().revalidate_timeout_secs()),
        );
        Self::new(cache, censor, ProxySettings::from(cfg.proxy()))
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn censor(&self) -> &CensorList {
        &self.censor
    }

    pub fn settings(&self) -> &ProxySettings {
        &self.settings
    }

    /// Resolve the origin from the request's Host header and connect to it.
    pub async fn connect(&self, request: &str) -> Result<Origin, ProxyError> {
        let host = extract_host_header(request)
            .ok_or_else(|| ProxyError::MalformedRequest("missing Host header".into()))?;
        let (name, port) =
            split_host_port(&host).map_err(|e| ProxyError::MalformedRequest(e.to_string()))?;

        Origin::connect(
            &name,
            port,
            self.settings.connect_timeout,
            self.settings.read_timeout,
        )
        .await
    }

    /// Try to answer `url` from the cache. Anything but `Served` means the
    /// caller should go to the origin.
    #[instrument(skip(self, client), target = "hush::cache")]
    pub async fn serve_cached<C>(&self, url: &str, client: &mut C) -> Result<CacheOutcome, ProxyError>
    where
        C: ClientStream + ?Sized,
    {
        let Some(entry) = self.cache.lookup(url) else {
            debug!(target: "hush::cache", "Cache miss");
            return Ok(CacheOutcome::Miss);
        };
        if !self.cache.is_fresh(&entry).await {
            debug!(target: "hush::cache", "Cached entry is stale");
            return Ok(CacheOutcome::Stale);
        }

        replay::replay(&entry, &self.censor, self.settings.response_buffer_bytes, client).await
    }

    /// Relay the origin's response to the client, caching it under `url`
    /// when one was parsed from the request line.
    pub async fn relay<C>(
        &self,
        url: Option<&str>,
        origin: &mut Origin,
        client: &mut C,
    ) -> Result<Delivery, ProxyError>
    where
        C: ClientStream + ?Sized,
    {
        ResponsePipeline::new(&self.cache, &self.censor, &self.settings, url)
            .run(origin, client)
            .await
    }
}

//! Upstream connections to origin servers.

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::{Duration, timeout},
};
use tracing::{debug, instrument};

use crate::ProxyError;

pub enum ReadOutcome {
    Read(usize),
    Timeout,
}

/// A connected origin with its per-read timeout.
#[derive(Debug)]
pub struct Origin {
    stream: TcpStream,
    addr: String,
    read_timeout: Duration,
}

impl Origin {
    /// Open a TCP connection to `host:port`, giving up after `connect_timeout`.
    #[instrument(skip(connect_timeout, read_timeout))]
    pub async fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, ProxyError> {
        let addr = format!("{host}:{port}");
        let unreachable = |reason: String| ProxyError::OriginUnreachable {
            origin: addr.clone(),
            reason,
        };

        let stream = match timeout(connect_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(unreachable(e.to_string())),
            Err(_) => return Err(unreachable(format!("connect timed out after {connect_timeout:?}"))),
        };

        debug!(target: "hush::proxy", origin = %addr, "Connected to origin");
        Ok(Self {
            stream,
            addr,
            read_timeout,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Forward request bytes verbatim.
    pub async fn send(&mut self, bytes: &[u8]) -> Result<(), ProxyError> {
        self.stream
            .write_all(bytes)
            .await
            .map_err(ProxyError::OriginWriteFailure)?;
        self.stream
            .flush()
            .await
            .map_err(ProxyError::OriginWriteFailure)
    }

    /// One bounded read. `Read(0)` is end of stream.
    pub async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, ProxyError> {
        match timeout(self.read_timeout, self.stream.read(buf)).await {
            Ok(res) => {
                let n = res.map_err(ProxyError::OriginReadFailure)?;
                Ok(ReadOutcome::Read(n))
            }
            Err(_) => Ok(ReadOutcome::Timeout),
        }
    }
}

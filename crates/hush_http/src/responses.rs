use tokio::io::{AsyncWrite, AsyncWriteExt};

/// The only error the proxy ever reports to a client.
pub const BAD_GATEWAY: &[u8] =
    b"HTTP/1.0 502 Bad Gateway\r\n\r\n502 Error: Cannot reach server.\r\n\r\n";

/// Write the 502 reply and shut the write half down.
pub async fn send_502<S>(stream: &mut S) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    stream.write_all(BAD_GATEWAY).await?;
    stream.flush().await?;
    stream.shutdown().await
}

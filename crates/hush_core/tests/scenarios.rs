use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use hush_cache::CacheStore;
use hush_core::serve;
use hush_http::{CensorList, responses::BAD_GATEWAY};
use hush_proxy::{Proxy, ProxySettings};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    time::timeout,
};

const TEXT_REPLY: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello world";

/// Origin that answers each accepted connection with the next canned reply
/// and records what it was sent.
struct ScriptedOrigin {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedOrigin {
    async fn start(replies: Vec<Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind origin");
        let addr = listener.local_addr().expect("origin addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            for reply in replies {
                let (mut sock, _) = listener.accept().await.expect("accept");
                let mut buf = vec![0u8; 8192];
                let n = sock.read(&mut buf).await.expect("read request");
                seen.lock()
                    .expect("lock")
                    .push(String::from_utf8_lossy(&buf[..n]).into_owned());
                sock.write_all(&reply).await.expect("write reply");
            }
        });

        Self { addr, requests }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock").clone()
    }
}

struct Harness {
    addr: SocketAddr,
    proxy: Arc<Proxy>,
    _dir: tempfile::TempDir,
}

async fn start_proxy() -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = ProxySettings {
        connect_timeout: Duration::from_secs(2),
        read_timeout: Duration::from_millis(50),
        max_idle_reads: 4,
        ..ProxySettings::default()
    };
    let proxy = Arc::new(Proxy::new(
        CacheStore::new(dir.path(), Duration::from_secs(2)),
        CensorList::new(vec!["world".into()], "---"),
        settings,
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind proxy");
    let addr = listener.local_addr().expect("proxy addr");
    tokio::spawn(serve(listener, proxy.clone()));

    Harness {
        addr,
        proxy,
        _dir: dir,
    }
}

async fn exchange(proxy: SocketAddr, request: &[u8]) -> Vec<u8> {
    let run = async {
        let mut client = TcpStream::connect(proxy).await.expect("connect proxy");
        client.write_all(request).await.expect("send request");
        let mut out = Vec::new();
        client.read_to_end(&mut out).await.expect("read reply");
        out
    };
    timeout(Duration::from_secs(10), run).await.expect("exchange timed out")
}

#[tokio::test]
async fn text_response_is_censored_and_cached() {
    let origin = ScriptedOrigin::start(vec![TEXT_REPLY.to_vec()]).await;
    let hush = start_proxy().await;

    let request = format!("GET / HTTP/1.1\r\nHost: {}\r\n\r\n", origin.addr);
    let reply = exchange(hush.addr, request.as_bytes()).await;

    assert_eq!(
        reply,
        b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello ---"
    );
    assert_eq!(origin.requests(), vec![request]);

    let entry = hush.proxy.cache().lookup("/").expect("cached entry");
    assert!(entry.is_text);
    assert_eq!(entry.text_body.as_deref(), Some(TEXT_REPLY));
}

#[tokio::test]
async fn unreachable_origin_gets_bad_gateway() {
    let closed = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = closed.local_addr().expect("addr").port();
    drop(closed);
    let hush = start_proxy().await;

    let request = format!("GET /x HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\n\r\n");
    let reply = exchange(hush.addr, request.as_bytes()).await;

    assert_eq!(reply, BAD_GATEWAY);
    assert!(hush.proxy.cache().is_empty());
}

#[tokio::test]
async fn fresh_entry_is_replayed_from_cache() {
    let origin = ScriptedOrigin::start(vec![
        TEXT_REPLY.to_vec(),
        b"HTTP/1.1 304 Not Modified\r\n\r\n".to_vec(),
    ])
    .await;
    let hush = start_proxy().await;

    let url = format!("http://{}/page", origin.addr);
    let request = format!("GET {url} HTTP/1.1\r\nHost: {}\r\n\r\n", origin.addr);

    let first = exchange(hush.addr, request.as_bytes()).await;
    let second = exchange(hush.addr, request.as_bytes()).await;

    assert!(first.ends_with(b"hello ---"));
    assert_eq!(first, second);

    let requests = origin.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].starts_with("GET /page HTTP/1.1\r\n"));
    assert!(requests[1].contains("If-Modified-Since: "));
}

#[tokio::test]
async fn empty_request_closes_without_origin_contact() {
    let origin = ScriptedOrigin::start(vec![TEXT_REPLY.to_vec()]).await;
    let hush = start_proxy().await;

    let reply = exchange(hush.addr, b"\r\n").await;

    assert!(reply.is_empty());
    assert!(origin.requests().is_empty());
    assert!(hush.proxy.cache().is_empty());
}

#[tokio::test]
async fn binary_response_passes_through_untouched() {
    let mut png = b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\n\r\n".to_vec();
    png.extend_from_slice(b"\x89PNG\r\n\x1a\n world \x00\x01\x02 WORLD");
    let origin = ScriptedOrigin::start(vec![png.clone()]).await;
    let hush = start_proxy().await;

    let request = format!("GET /logo.png HTTP/1.1\r\nHost: {}\r\n\r\n", origin.addr);
    let reply = exchange(hush.addr, request.as_bytes()).await;

    assert_eq!(reply, png);

    let entry = hush.proxy.cache().lookup("/logo.png").expect("cached entry");
    assert!(!entry.is_text);
    assert_eq!(std::fs::read(&entry.storage_path).expect("cache file"), png);
}

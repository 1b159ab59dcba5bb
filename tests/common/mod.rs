//! Local HTTP targets for integration tests

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    Router,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Hits = Arc<Mutex<HashMap<String, usize>>>;

/// Axum server that counts hits per path
///
/// `/unavailable` answers 503, `/slow` waits 20ms, everything else answers 200.
pub struct TargetServer {
    pub base: String,
    hits: Hits,
}

impl TargetServer {
    pub async fn start() -> Self {
        let hits: Hits = Arc::default();
        let app = Router::new().fallback(handle).with_state(hits.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            hits,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }
}

async fn handle(State(hits): State<Hits>, uri: Uri) -> (StatusCode, &'static str) {
    let path = uri.path().to_string();
    {
        let mut hits = hits.lock().unwrap();
        *hits.entry(path.clone()).or_default() += 1;
    }

    match path.as_str() {
        "/unavailable" => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        "/slow" => {
            tokio::time::sleep(Duration::from_millis(20)).await;
            (StatusCode::OK, "slow")
        }
        _ => (StatusCode::OK, "ok"),
    }
}

/// Raw server that promises a 100-byte body, sends 5 bytes and hangs up
pub async fn start_truncating_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort")
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}/")
}

/// Raw server that accepts and reads the request but never answers
pub async fn start_silent_server() -> String {
    start_stalling_server(None).await
}

/// Raw server that sends headers and the first body bytes, then stalls
pub async fn start_stalled_body_server() -> String {
    start_stalling_server(Some(&b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nstart"[..])).await
}

async fn start_stalling_server(reply: Option<&'static [u8]>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                if let Some(reply) = reply {
                    let _ = socket.write_all(reply).await;
                }
                // Hold the connection open well past the client timeout
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(socket);
            });
        }
    });

    format!("http://{addr}/")
}

/// Raw keep-alive HTTP/1.1 server that counts accepted TCP connections
pub struct KeepAliveServer {
    pub url: String,
    connections: Arc<AtomicUsize>,
}

impl KeepAliveServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));

        let accepted = connections.clone();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                accepted.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve_keep_alive(socket));
            }
        });

        Self {
            url: format!("http://{addr}/"),
            connections,
        }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Answer every request on the connection until the client hangs up
async fn serve_keep_alive(mut socket: TcpStream) {
    let mut pending = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let read = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(read) => read,
        };
        pending.extend_from_slice(&buf[..read]);

        // GET requests carry no body, so each header block is one request
        while let Some(end) = pending.windows(4).position(|w| w == b"\r\n\r\n") {
            pending.drain(..end + 4);
            let reply = b"HTTP/1.1 200 OK\r\nContent-Length: 12\r\nConnection: keep-alive\r\n\r\nhello, world";
            if socket.write_all(reply).await.is_err() {
                return;
            }
        }
    }
}

/// URL on loopback that refuses connections
pub async fn unreachable_url() -> String {
    // Bind then drop so the port is known to be closed
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}

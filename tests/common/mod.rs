//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use aem_dev_proxy::config::parse_config;
use aem_dev_proxy::http::HttpServer;
use aem_dev_proxy::lifecycle::{prepare, Shutdown};

/// A canned upstream response.
#[derive(Clone)]
pub struct MockResponse {
    pub status: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
    pub content_length: Option<usize>,
}

impl MockResponse {
    pub fn new(status: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            content_length: None,
        }
    }

    /// Advertise `length` instead of the real body size.
    pub fn content_length(mut self, length: usize) -> Self {
        self.content_length = Some(length);
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {}\r\n", self.status);
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            self.content_length.unwrap_or(self.body.len())
        ));
        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Start a mock upstream that answers every request with `response`.
///
/// Each request head is sent to the returned channel.
pub async fn start_mock_upstream(
    addr: SocketAddr,
    response: MockResponse,
) -> mpsc::UnboundedReceiver<String> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let response = Arc::new(response);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let response = response.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        let _ = tx.send(head);
                        let _ = socket.write_all(&response.to_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    rx
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

/// Configuration text for a proxy on `proxy` in front of `origin` and `dev_server`.
pub fn proxy_config(proxy: SocketAddr, origin: SocketAddr, dev_server: SocketAddr) -> String {
    format!(
        r#"
        [plugin]
        content_paths = ["we-retail"]
        public_path = "/etc.clientlibs/we-retail/clientlibs/clientlib-site"

        [plugin.aem]
        host = "{origin_host}"
        port = {origin_port}

        [server]
        host = "{proxy_host}"
        port = {proxy_port}

        [build]
        input = ["src/main.ts", "src/main.css"]

        [dev_server]
        url = "http://{dev_server}"
        "#,
        origin_host = origin.ip(),
        origin_port = origin.port(),
        proxy_host = proxy.ip(),
        proxy_port = proxy.port(),
    )
}

/// Start the proxy from configuration text; returns its shutdown handle.
pub async fn start_proxy(config: &str) -> Shutdown {
    let config = parse_config(config).unwrap();
    let addr = config.server.bind_address();
    let prepared = prepare(config).unwrap();
    let server = HttpServer::new(&prepared.config, prepared.context).unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown
}

/// Client that neither pools, follows redirects nor uses system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

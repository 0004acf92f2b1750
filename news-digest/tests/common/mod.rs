#![allow(dead_code)]

use async_trait::async_trait;
use news_digest::{AggregatorError, ContentFetch, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// In-memory stand-in for the HTTP fetcher. Unknown URLs answer 404.
#[derive(Default)]
pub struct StaticFetcher {
    feeds: HashMap<String, String>,
    articles: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, url: &str, body: String) -> Self {
        self.feeds.insert(url.to_string(), body);
        self
    }

    pub fn with_article(mut self, url: &str, html: String) -> Self {
        self.articles.insert(url.to_string(), html);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    fn lookup(&self, map: &HashMap<String, String>, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        map.get(url).cloned().ok_or_else(|| AggregatorError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

#[async_trait]
impl ContentFetch for StaticFetcher {
    async fn fetch_feed(&self, url: &str) -> Result<String> {
        self.lookup(&self.feeds, url)
    }

    async fn fetch_article(&self, url: &str) -> Result<String> {
        self.lookup(&self.articles, url)
    }
}

/// RSS 2.0 document with the given `(title, link)` items.
pub fn rss_document(items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, link)| format!("<item><title>{}</title><link>{}</link></item>", title, link))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Test feed</title><link>https://feed.test</link><description>Test</description>{}</channel></rss>"#,
        items
    )
}

const SENTENCE: &str = "Officials said the measure would affect trade and energy markets across the region.";

/// Article page whose paragraphs hold exactly `words` words.
pub fn article_html(words: usize, published: Option<&str>) -> String {
    let words: Vec<&str> = SENTENCE.split_whitespace().cycle().take(words).collect();
    let paragraphs: String = words.chunks(40).map(|chunk| format!("<p>{}</p>", chunk.join(" "))).collect();
    let meta = published
        .map(|p| format!(r#"<meta property="article:published_time" content="{}">"#, p))
        .unwrap_or_default();
    format!(
        "<html><head><title>Story</title>{}</head><body><nav>Home</nav><article>{}</article></body></html>",
        meta, paragraphs
    )
}

#[derive(Clone)]
pub enum Route {
    Respond {
        status: u16,
        content_type: &'static str,
        body: String,
    },
    /// Accept the connection and never answer
    Hang,
}

impl Route {
    pub fn ok(content_type: &'static str, body: impl Into<String>) -> Self {
        Route::Respond {
            status: 200,
            content_type,
            body: body.into(),
        }
    }
}

/// Minimal HTTP/1.1 server on an ephemeral port. Returns the base URL.
pub async fn spawn_server(routes: Vec<(&str, Route)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: Arc<HashMap<String, Route>> =
        Arc::new(routes.into_iter().map(|(path, route)| (path.to_string(), route)).collect());

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let _ = handle_connection(socket, &routes).await;
            });
        }
    });

    format!("http://{}", addr)
}

/// A URL on which nothing is listening.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/rss", addr)
}

async fn handle_connection(mut socket: TcpStream, routes: &HashMap<String, Route>) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    match routes.get(&path) {
        Some(Route::Hang) => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
        Some(Route::Respond {
            status,
            content_type,
            body,
        }) => write_response(&mut socket, *status, content_type, body).await,
        None => write_response(&mut socket, 404, "text/plain", "not found").await,
    }
}

async fn write_response(socket: &mut TcpStream, status: u16, content_type: &str, body: &str) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {} Test\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

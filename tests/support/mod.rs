#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Mutex;

use anyhow::Result;
use gmail_unsubscribe::{HeaderSet, MessagePage, MessageSource};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A listing call as seen by the fake mailbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub query: String,
    pub page_size: u32,
    pub page_token: Option<String>,
}

/// In-memory mailbox serving pre-built pages.
///
/// Page `n` is reached with the token `page-n`. Every page except the last
/// hands out the next token; `always_token` makes the last one do so too.
pub struct FakeMailbox {
    pages: Vec<Vec<(String, HeaderSet)>>,
    always_token: bool,
    ignore_page_size: bool,
    fail_metadata_for: Option<String>,
    pub list_calls: Mutex<Vec<ListCall>>,
    pub metadata_calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeMailbox {
    pub fn new(pages: Vec<Vec<(String, HeaderSet)>>) -> Self {
        FakeMailbox {
            pages,
            always_token: false,
            ignore_page_size: false,
            fail_metadata_for: None,
            list_calls: Mutex::new(Vec::new()),
            metadata_calls: Mutex::new(Vec::new()),
        }
    }

    /// Keep returning a continuation token even past the last page
    pub fn always_token(mut self) -> Self {
        self.always_token = true;
        self
    }

    /// Return whole pages regardless of the requested page size
    pub fn ignore_page_size(mut self) -> Self {
        self.ignore_page_size = true;
        self
    }

    pub fn fail_metadata_for(mut self, id: &str) -> Self {
        self.fail_metadata_for = Some(id.to_string());
        self
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }

    pub fn metadata_ids(&self) -> Vec<String> {
        self.metadata_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn page_index(token: Option<&str>) -> usize {
        token
            .and_then(|t| t.strip_prefix("page-"))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }

    fn find(&self, id: &str) -> Option<HeaderSet> {
        self.pages
            .iter()
            .flatten()
            .find(|(message_id, _)| message_id == id)
            .map(|(_, headers)| headers.clone())
    }
}

impl MessageSource for FakeMailbox {
    fn list_messages<'a>(
        &'a self,
        query: &'a str,
        page_size: u32,
        page_token: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<MessagePage>> + Send + 'a>> {
        Box::pin(async move {
            self.list_calls.lock().unwrap().push(ListCall {
                query: query.to_string(),
                page_size,
                page_token: page_token.map(str::to_string),
            });

            let index = Self::page_index(page_token);
            let ids = self
                .pages
                .get(index)
                .map(|page| {
                    page.iter()
                        .take(if self.ignore_page_size { usize::MAX } else { page_size as usize })
                        .map(|(id, _)| id.clone())
                        .collect()
                })
                .unwrap_or_default();

            let next_page_token = if self.always_token || index + 1 < self.pages.len() {
                Some(format!("page-{}", index + 1))
            } else {
                None
            };

            Ok(MessagePage { ids, next_page_token })
        })
    }

    fn get_message_metadata<'a>(
        &'a self,
        message_id: &'a str,
        header_names: &'a [&'a str],
    ) -> Pin<Box<dyn Future<Output = Result<HeaderSet>> + Send + 'a>> {
        Box::pin(async move {
            self.metadata_calls.lock().unwrap().push((
                message_id.to_string(),
                header_names.iter().map(|h| h.to_string()).collect(),
            ));

            if self.fail_metadata_for.as_deref() == Some(message_id) {
                anyhow::bail!("metadata backend unavailable for {}", message_id);
            }

            self.find(message_id)
                .ok_or_else(|| anyhow::anyhow!("unknown message {}", message_id))
        })
    }
}

/// Headers for a message, with an optional `List-Unsubscribe` value
pub fn headers(from: &str, subject: &str, unsubscribe: Option<&str>) -> HeaderSet {
    let mut pairs = vec![
        ("From".to_string(), from.to_string()),
        ("Subject".to_string(), subject.to_string()),
        ("Date".to_string(), "Mon, 13 Oct 2025 10:00:00 +0000".to_string()),
    ];
    if let Some(value) = unsubscribe {
        pairs.push(("List-Unsubscribe".to_string(), value.to_string()));
    }
    pairs.into_iter().collect()
}

pub fn message(id: &str, from: &str, subject: &str, unsubscribe: Option<&str>) -> (String, HeaderSet) {
    (id.to_string(), headers(from, subject, unsubscribe))
}

/// Serve canned HTTP responses on a loopback port.
///
/// `routes` maps a request path to the full raw response written back.
/// Unknown paths get a 404 with an empty body.
pub async fn serve(routes: Vec<(&'static str, String)>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();

            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&buf);
                let path = request
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();

                let response = routes
                    .iter()
                    .find(|(route, _)| *route == path)
                    .map(|(_, response)| response.clone())
                    .unwrap_or_else(|| html_response(404, ""));

                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Accept connections but never answer them
pub async fn serve_silently() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

pub fn html_response(status: u16, body: &str) -> String {
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    )
}

pub fn redirect_response(location: &str) -> String {
    format!(
        "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        location
    )
}

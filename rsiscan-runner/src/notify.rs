//! Webhook delivery of the scan table.
//!
//! Chat webhooks cap message size, so the text is split on line boundaries
//! into chunks of at most `max_len` characters and posted in order as
//! `{"content": chunk}`.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Longest wait honoured from a `Retry-After` header.
const MAX_RETRY_AFTER_SECS: f64 = 30.0;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook rejected message (HTTP {status})")]
    Rejected { status: u16 },

    #[error("webhook still failing after {attempts} attempts (last HTTP {status})")]
    RetriesExhausted { attempts: u32, status: u16 },
}

/// Destination for report text. Implementations send one chunk per call.
pub trait Notifier: Send + Sync {
    fn send(&self, chunk: &str) -> Result<(), NotifyError>;
}

/// Split `text` into chunks of at most `max_len` characters.
///
/// Lines are kept whole where they fit; a single line longer than `max_len`
/// is cut on char boundaries. Blank lines at the start of a chunk are dropped.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.lines() {
        for piece in hard_split(line, max_len) {
            let piece_len = piece.chars().count();
            if !current.is_empty() && current_len + 1 + piece_len > max_len {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push('\n');
                current_len += 1;
            }
            current.push_str(piece);
            current_len += piece_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn hard_split(line: &str, max_len: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in line.char_indices() {
        if count == max_len {
            pieces.push(&line[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    pieces.push(&line[start..]);
    pieces
}

/// Split `text` and send every chunk in order. Returns the number sent.
pub fn deliver(
    notifier: &dyn Notifier,
    text: &str,
    max_len: usize,
) -> Result<usize, NotifyError> {
    let chunks = split_message(text, max_len);
    for (i, chunk) in chunks.iter().enumerate() {
        notifier.send(chunk)?;
        tracing::debug!(chunk = i + 1, total = chunks.len(), "webhook chunk sent");
    }
    Ok(chunks.len())
}

/// Seconds from a `Retry-After` header, capped at `MAX_RETRY_AFTER_SECS`.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let secs = headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)?;
    Some(Duration::from_secs_f64(secs.min(MAX_RETRY_AFTER_SECS)))
}

#[derive(Serialize)]
struct WebhookBody<'a> {
    content: &'a str,
}

/// Posts chunks to a chat webhook, retrying rate limits and server errors.
pub struct WebhookNotifier {
    client: reqwest::blocking::Client,
    url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }
}

impl Notifier for WebhookNotifier {
    fn send(&self, chunk: &str) -> Result<(), NotifyError> {
        let body = WebhookBody { content: chunk };
        let mut last_status = 0;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(attempt, ?delay, "retrying webhook post");
                std::thread::sleep(delay);
            }

            let resp = match self.client.post(&self.url).json(&body).send() {
                Ok(resp) => resp,
                Err(e) if e.is_builder() || attempt == self.max_retries => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "webhook post failed");
                    continue;
                }
            };

            let status = resp.status();
            if status.is_success() {
                return Ok(());
            }
            last_status = status.as_u16();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let wait = retry_after(resp.headers());
                tracing::debug!(?wait, attempt, "webhook rate limited");
                if let Some(wait) = wait.filter(|_| attempt < self.max_retries) {
                    std::thread::sleep(wait);
                }
                continue;
            }
            if status.is_server_error() {
                continue;
            }
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        Err(NotifyError::RetriesExhausted {
            attempts: self.max_retries + 1,
            status: last_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Answer every connection with `response`, counting requests served.
    fn serve(response: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                drain_request(&mut stream);
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (format!("http://{addr}/hook"), hits)
    }

    fn drain_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let head_end = loop {
            let n = stream.read(&mut chunk).unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let mut read = buf.len() - head_end;
        while read < body_len {
            let n = stream.read(&mut chunk).unwrap_or(0);
            if n == 0 {
                return;
            }
            read += n;
        }
    }

    fn notifier(url: &str, retries: u32) -> WebhookNotifier {
        WebhookNotifier::new(url)
            .unwrap()
            .with_retries(retries, Duration::from_millis(1))
    }

    fn headers(retry_after: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(RETRY_AFTER, HeaderValue::from_str(retry_after).unwrap());
        h
    }

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
    }

    impl Notifier for Recorder {
        fn send(&self, chunk: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(chunk.to_string());
            Ok(())
        }
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("a\nb", 2000), vec!["a\nb"]);
    }

    #[test]
    fn splits_on_line_boundaries() {
        let chunks = split_message("aaaa\nbbbb\ncccc", 9);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn long_line_is_cut_on_char_boundaries() {
        let chunks = split_message("ééééé", 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn empty_text_sends_nothing() {
        assert!(split_message("", 10).is_empty());
        let recorder = Recorder::default();
        assert_eq!(deliver(&recorder, "", 10).unwrap(), 0);
    }

    #[test]
    fn deliver_sends_in_order() {
        let recorder = Recorder::default();
        let sent = deliver(&recorder, "one\ntwo\nthree", 5).unwrap();
        assert_eq!(sent, 3);
        assert_eq!(*recorder.sent.lock().unwrap(), vec!["one", "two", "three"]);
    }

    #[test]
    fn malformed_url_fails_without_retrying() {
        let notifier = WebhookNotifier::new("not a url")
            .unwrap()
            .with_retries(3, Duration::from_secs(60));
        let err = notifier.send("hello").unwrap_err();
        assert!(matches!(err, NotifyError::Request(_)));
    }

    #[test]
    fn retry_after_is_capped_and_validated() {
        assert_eq!(retry_after(&headers("2.5")), Some(Duration::from_millis(2500)));
        assert_eq!(retry_after(&headers("1e30")), Some(Duration::from_secs(30)));
        assert_eq!(retry_after(&headers("-1")), None);
        assert_eq!(retry_after(&headers("inf")), None);
        assert_eq!(retry_after(&headers("soon")), None);
        assert_eq!(retry_after(&HeaderMap::new()), None);
    }

    #[test]
    fn huge_retry_after_does_not_panic() {
        let (url, hits) = serve(
            "HTTP/1.1 429 Too Many Requests\r\nRetry-After: 1e30\r\n\
             Content-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let err = notifier(&url, 0).send("hello").unwrap_err();
        assert!(matches!(
            err,
            NotifyError::RetriesExhausted {
                attempts: 1,
                status: 429
            }
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn server_errors_are_retried_until_exhausted() {
        let (url, hits) = serve(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\
             Connection: close\r\n\r\n",
        );
        let err = notifier(&url, 2).send("hello").unwrap_err();
        assert!(matches!(
            err,
            NotifyError::RetriesExhausted {
                attempts: 3,
                status: 500
            }
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn client_errors_are_rejected_without_retry() {
        let (url, hits) = serve(
            "HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let err = notifier(&url, 3).send("hello").unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { status: 400 }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn success_posts_each_chunk_once() {
        let (url, hits) =
            serve("HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let sent = deliver(&notifier(&url, 3), "one\ntwo", 3).unwrap();
        assert_eq!(sent, 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}

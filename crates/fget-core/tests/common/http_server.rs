//! Minimal HTTP/1.1 fixture server for integration tests.
//!
//! Serves one canned response per connection, with optional per-chunk delay,
//! a delayed status line, missing Content-Length, and an initial run of
//! failing responses. Records request heads and counts connections.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Clone)]
pub struct FixtureResponse {
    pub status: u16,
    pub reason: &'static str,
    pub body: Vec<u8>,
    pub content_disposition: Option<String>,
    /// Omit Content-Length to simulate servers of unknown size.
    pub send_content_length: bool,
    /// Pause before each body chunk of `chunk_size` bytes.
    pub chunk_delay: Option<Duration>,
    pub chunk_size: usize,
    /// Pause before sending the status line.
    pub response_delay: Option<Duration>,
    /// The first N connections get a bare 500 before `status` applies.
    pub fail_first: usize,
}

impl Default for FixtureResponse {
    fn default() -> Self {
        Self {
            status: 200,
            reason: "OK",
            body: Vec::new(),
            content_disposition: None,
            send_content_length: true,
            chunk_delay: None,
            chunk_size: 1024,
            response_delay: None,
            fail_first: 0,
        }
    }
}

pub struct FixtureServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FixtureServer {
    /// Number of connections accepted so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw request heads seen so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server on an ephemeral port serving `response` to every request
/// until the process exits. The returned URL points at `/file.bin`.
pub fn start(response: FixtureResponse) -> FixtureServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let counter = Arc::clone(&hits);
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let index = counter.fetch_add(1, Ordering::SeqCst);
            let response = response.clone();
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &response, index, &log));
        }
    });

    FixtureServer {
        url: format!("http://127.0.0.1:{port}/file.bin"),
        hits,
        requests,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    response: &FixtureResponse,
    index: usize,
    log: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    if let Ok(head) = std::str::from_utf8(&buf[..n]) {
        log.lock().unwrap().push(head.to_string());
    }

    if index < response.fail_first {
        let _ = stream.write_all(
            b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }

    if let Some(delay) = response.response_delay {
        thread::sleep(delay);
    }

    let mut head = format!("HTTP/1.1 {} {}\r\n", response.status, response.reason);
    if response.send_content_length {
        head.push_str(&format!("Content-Length: {}\r\n", response.body.len()));
    }
    if let Some(cd) = &response.content_disposition {
        head.push_str(&format!("Content-Disposition: {cd}\r\n"));
    }
    head.push_str("Connection: close\r\n\r\n");
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }

    for chunk in response.body.chunks(response.chunk_size.max(1)) {
        if let Some(delay) = response.chunk_delay {
            thread::sleep(delay);
        }
        if stream.write_all(chunk).is_err() {
            return;
        }
        let _ = stream.flush();
    }
    let _ = stream.shutdown(std::net::Shutdown::Write);
}

//! Minimal HTTP/1.1 server for fetch tests.
//!
//! Serves a fixed set of paths (query strings ignored, so cache-busted
//! locations hit the same page) and answers 404 for anything else. Paths
//! listed as flaky answer 503 until they have been requested `fail_first`
//! times.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Default)]
pub struct PageServerOptions {
    pub fail_first: usize,
    pub flaky: Vec<String>,
}

pub struct PageServer {
    pub base_url: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    total: Arc<AtomicUsize>,
}

impl PageServer {
    /// Requests seen for `path` so far.
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start(pages: HashMap<String, Vec<u8>>, opts: PageServerOptions) -> PageServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let pages = Arc::new(pages);
    let opts = Arc::new(opts);
    let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::default();
    let total = Arc::new(AtomicUsize::new(0));
    {
        let hits = Arc::clone(&hits);
        let total = Arc::clone(&total);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let pages = Arc::clone(&pages);
                let opts = Arc::clone(&opts);
                let hits = Arc::clone(&hits);
                let total = Arc::clone(&total);
                thread::spawn(move || handle(stream, &pages, &opts, &hits, &total));
            }
        });
    }
    PageServer {
        base_url: format!("http://127.0.0.1:{}", port),
        hits,
        total,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    pages: &HashMap<String, Vec<u8>>,
    opts: &PageServerOptions,
    hits: &Mutex<HashMap<String, usize>>,
    total: &AtomicUsize,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/");
    let path = target.split('?').next().unwrap_or(target).to_string();

    total.fetch_add(1, Ordering::SeqCst);
    let seen = {
        let mut hits = hits.lock().unwrap();
        let count = hits.entry(path.clone()).or_insert(0);
        *count += 1;
        *count
    };

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    if opts.flaky.contains(&path) && seen <= opts.fail_first {
        let _ = stream
            .write_all(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    match pages.get(&path) {
        Some(body) => {
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(body);
        }
        None => {
            let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
        }
    }
}

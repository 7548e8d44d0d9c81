//! Minimal HTTP/1.1 server that stands in for the lookup API in integration tests.
//!
//! Every GET is answered with the same status and body. The request target of
//! each call is recorded so tests can check the query string.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Default)]
pub struct Recorded {
    targets: Arc<Mutex<Vec<String>>>,
}

impl Recorded {
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread answering with `status` and `body`.
/// Returns the endpoint URL (e.g. "http://127.0.0.1:12345/api/rc.php") and the
/// request log. The server runs until the process exits.
pub fn start(status: u16, body: &str) -> (String, Recorded) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body.to_string());
    let recorded = Recorded::default();
    let log = recorded.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let log = log.clone();
            thread::spawn(move || handle(stream, status, &body, &log));
        }
    });
    (format!("http://127.0.0.1:{}/api/rc.php", port), recorded)
}

fn handle(mut stream: std::net::TcpStream, status: u16, body: &str, log: &Recorded) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    if let Some(target) = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
    {
        log.targets.lock().unwrap().push(target.to_string());
    }
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

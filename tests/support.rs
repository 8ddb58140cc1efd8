//! Capture-and-respond HTTP server for backend integration tests.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One request captured by the test server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

pub struct TestServer {
    base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl TestServer {
    /// Spawn a server answering every request with 200 and canned JSON.
    pub fn spawn() -> Self {
        Self::spawn_inner(false)
    }

    /// Spawn a server answering every request with 500.
    pub fn spawn_failing() -> Self {
        Self::spawn_inner(true)
    }

    fn spawn_inner(fail: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let addr = listener.local_addr().expect("server addr");
        listener.set_nonblocking(true).expect("set_nonblocking");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel();

        let log = Arc::clone(&requests);
        let thread = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }
                match listener.accept() {
                    Ok((stream, _)) => {
                        let log = Arc::clone(&log);
                        thread::spawn(move || handle_client(stream, &log, fail));
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            shutdown: shutdown_tx,
            thread: Some(thread),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests captured so far, in arrival order.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        drop(self.shutdown.send(()));
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

fn handle_client(mut stream: TcpStream, log: &Mutex<Vec<CapturedRequest>>, fail: bool) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    // Read up to the header terminator, then drain the advertised body
    let header_end = loop {
        match stream.read(&mut chunk) {
            Ok(0) => return,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos;
                }
            }
            Err(_) => return,
        }
    };

    let header_text = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let body_start = header_end + 4;
    let body_len = content_length(&header_text);
    while buf.len() < body_start + body_len {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => return,
        }
    }

    let request_line = header_text.lines().next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();
    let body = String::from_utf8_lossy(&buf[body_start..]).to_string();

    let (status, response_body) = if fail {
        ("500 Internal Server Error", "")
    } else if method == "GET" && path == "/playback/range" {
        (
            "200 OK",
            r#"[["1553_HS_Packet","2024-03-01T12:00:00.0Z","2024-03-01T13:00:00.0Z"],["EHS_Packet","2024-03-02T00:00:00.0Z","2024-03-02T06:00:00.0Z"]]"#,
        )
    } else {
        ("200 OK", "{}")
    };

    // Capture before responding so a completed call implies a visible capture
    log.lock().expect("capture lock").push(CapturedRequest { method, path, body });

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{response_body}",
        response_body.len(),
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    drop(stream.flush());
    drop(stream.shutdown(Shutdown::Both));
}

fn content_length(header_text: &str) -> usize {
    header_text
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}

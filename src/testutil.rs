//! In-process HTTP responder for tests: one canned reply, counted connections.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::tidb::Target;

#[derive(Clone)]
enum Reply {
    Body { status: u16, body: String },
    Stall,
}

pub struct MockServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    /// Answer every request with `status` and `body`.
    pub fn start(status: u16, body: &str) -> Self {
        Self::spawn(Reply::Body {
            status,
            body: body.to_string(),
        })
    }

    /// Accept connections but never answer.
    pub fn stalled() -> Self {
        Self::spawn(Reply::Stall)
    }

    fn spawn(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let paths = Arc::new(Mutex::new(Vec::new()));

        let (h, p) = (hits.clone(), paths.clone());
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                h.fetch_add(1, Ordering::SeqCst);
                let (reply, p) = (reply.clone(), p.clone());
                thread::spawn(move || serve(stream, reply, p));
            }
        });

        Self { addr, hits, paths }
    }

    pub fn target(&self) -> Target {
        Target::new(self.addr.ip(), self.addr.port())
    }

    /// Number of accepted connections so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Request targets seen, in order (e.g. "/regions/hot").
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

fn serve(stream: TcpStream, reply: Reply, paths: Arc<Mutex<Vec<String>>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    if let Some(path) = request_line.split_whitespace().nth(1) {
        paths.lock().unwrap().push(path.to_string());
    }
    // Drain headers.
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) if line == "\r\n" || line == "\n" => break,
            Ok(_) => {}
        }
    }

    match reply {
        Reply::Stall => thread::sleep(Duration::from_secs(30)),
        Reply::Body { status, body } => {
            let mut stream = stream;
            let resp = format!(
                "HTTP/1.1 {status} MOCK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(resp.as_bytes());
            let _ = stream.flush();
        }
    }
}

// tests/common/mod.rs
//
// A throwaway HTTP/1.1 server standing in for the Confluence content API.
#![allow(dead_code)]

use std::{
    io::{BufRead, BufReader, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use conftable::cli::AuthScheme;
use conftable::config::{Credentials, Settings};

/// What the server saw.
#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
}

pub struct Route {
    pub path: &'static str,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn new(path: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self {
            path,
            status,
            body: body.into(),
        }
    }
}

pub struct MockServer {
    addr: SocketAddr,
    log: Arc<Mutex<Vec<Request>>>,
}

impl MockServer {
    /// Serve `routes` until the test process exits. Unknown paths get 404.
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_c = Arc::clone(&log);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let _ = handle(stream, &routes, &log_c);
            }
        });
        Self { addr, log }
    }

    pub fn base(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn handle(stream: TcpStream, routes: &[Route], log: &Mutex<Vec<Request>>) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let target = line.split_whitespace().nth(1).unwrap_or("/").to_string();
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (target.clone(), String::new()),
    };

    let mut authorization = None;
    let mut accept = None;
    loop {
        let mut header = String::new();
        let n = reader.read_line(&mut header)?;
        if n == 0 || header == "\r\n" {
            break;
        }
        if let Some((k, v)) = header.split_once(':') {
            match k.trim().to_ascii_lowercase().as_str() {
                "authorization" => authorization = Some(v.trim().to_string()),
                "accept" => accept = Some(v.trim().to_string()),
                _ => {}
            }
        }
    }

    log.lock().unwrap().push(Request {
        path: path.clone(),
        query,
        authorization,
        accept,
    });

    let (status, body) = routes
        .iter()
        .find(|r| r.path == path)
        .map(|r| (r.status, r.body.clone()))
        .unwrap_or((404, r#"{"statusCode":404,"message":"No content found"}"#.to_string()));

    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        reason(status),
        body.len()
    )?;
    stream.flush()
}

/// Content API payload wrapping `storage`.
pub fn content_json(storage: &str) -> String {
    serde_json::json!({
        "id": "42",
        "type": "page",
        "title": "SCCB 반영 현황",
        "body": { "storage": { "value": storage, "representation": "storage" } }
    })
    .to_string()
}

pub const EXAMPLE_TABLE: &str = "<p>현황</p><table><tbody>\
    <tr><th>이름</th><th>반영여부</th></tr>\
    <tr><td>A</td><td>완료</td></tr>\
    <tr><td>B</td><td>진행중</td></tr>\
    </tbody></table>";

/// A base URL on which nothing listens.
pub fn closed_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

/// Accepts connections (via the backlog) but never answers.
pub fn silent_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let base = format!("http://{}", listener.local_addr().expect("addr"));
    (listener, base)
}

pub fn settings(base: &str, context: &str, page_id: &str) -> Settings {
    Settings {
        base: base.to_string(),
        context: context.to_string(),
        page_id: page_id.to_string(),
        credentials: Credentials {
            scheme: AuthScheme::Basic,
            user: Some("user".to_string()),
            token: "token".to_string(),
        },
        timeout: Duration::from_secs(5),
        column: "반영여부".to_string(),
        status_column: None,
        done_marker: "완료".to_string(),
        only_done: false,
        all_tables: false,
        with_keys: false,
    }
}

//! Minimal HTTP responder used by tests in place of the API server and
//! source-controller.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Canned response for requests whose target contains `pattern`
#[derive(Clone, Debug)]
pub struct Route {
    pub pattern: &'static str,
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    /// Accept the request but never answer it
    pub silent: bool,
}

impl Route {
    pub fn json(pattern: &'static str, status: u16, body: serde_json::Value) -> Self {
        Self {
            pattern,
            status,
            content_type: "application/json",
            body: body.to_string(),
            silent: false,
        }
    }

    pub fn yaml(pattern: &'static str, status: u16, body: &str) -> Self {
        Self {
            pattern,
            status,
            content_type: "application/x-yaml",
            body: body.to_string(),
            silent: false,
        }
    }

    pub fn silent(pattern: &'static str) -> Self {
        Self {
            pattern,
            status: 200,
            content_type: "text/plain",
            body: String::new(),
            silent: true,
        }
    }
}

pub struct TestServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl TestServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        Self { listener, addr }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Kube client pointed at this server
    pub fn kube_client(&self) -> kube::Client {
        let config = kube::Config::new(self.url().parse().unwrap());
        kube::Client::try_from(config).unwrap()
    }

    /// Answer requests with the first matching route until the test ends
    pub fn serve(self, routes: Vec<Route>) {
        let routes = Arc::new(routes);
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = self.listener.accept().await else {
                    break;
                };
                tokio::spawn(respond(socket, Arc::clone(&routes)));
            }
        });
    }
}

async fn respond(mut socket: TcpStream, routes: Arc<Vec<Route>>) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request);
    let target = request.split_whitespace().nth(1).unwrap_or("/");

    let route = routes.iter().find(|r| target.contains(r.pattern));
    if route.is_some_and(|r| r.silent) {
        // Hold the connection open until the test drops the runtime
        std::future::pending::<()>().await;
    }

    let (status, content_type, body) = route
        .map(|r| (r.status, r.content_type, r.body.as_str()))
        .unwrap_or((404, "text/plain", "not found"));

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        content_type,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Kubernetes `Status` body for a failed API call
pub fn api_status(code: u16, reason: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
}

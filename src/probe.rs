use http_body_util::Empty;
use hyper::body::Bytes;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::log_debug;
use crate::site::authority;

/// Outcome of the best-effort upstream check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    /// Answered with a 2xx or 3xx status
    Reachable(u16),
    /// Refused the connection or answered with another status
    Unreachable(String),
    /// Could not tell, e.g. the backend does not speak plain HTTP
    Indeterminate(String),
}

/// 2xx and 3xx count as up
pub fn classify_status(status: u16) -> Reachability {
    if (200..400).contains(&status) {
        Reachability::Reachable(status)
    } else {
        Reachability::Unreachable(format!("HTTP status {}", status))
    }
}

/// GET / against the upstream with `host_header` as Host
pub async fn probe(host: &str, port: u16, host_header: &str, timeout: Duration) -> Reachability {
    match tokio::time::timeout(timeout, exchange(host, port, host_header)).await {
        Ok(result) => result,
        Err(_) => Reachability::Indeterminate(format!(
            "no answer within {}s",
            timeout.as_secs_f32()
        )),
    }
}

async fn exchange(host: &str, port: u16, host_header: &str) -> Reachability {
    let addr = authority(host, port);
    let stream = match TcpStream::connect(&addr).await {
        Ok(s) => s,
        Err(e) => return Reachability::Unreachable(e.to_string()),
    };
    let io = TokioIo::new(stream);

    let (mut sender, conn) = match hyper::client::conn::http1::handshake(io).await {
        Ok(pair) => pair,
        Err(e) => return Reachability::Indeterminate(e.to_string()),
    };

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            log_debug!("Probe connection error: {}", e);
        }
    });

    let request = match Request::builder()
        .method("GET")
        .uri("/")
        .header("host", host_header)
        .header("user-agent", concat!("proxysite/", env!("CARGO_PKG_VERSION")))
        .body(Empty::<Bytes>::new())
    {
        Ok(r) => r,
        Err(e) => return Reachability::Indeterminate(e.to_string()),
    };

    match sender.send_request(request).await {
        Ok(response) => classify_status(response.status().as_u16()),
        Err(e) => Reachability::Indeterminate(e.to_string()),
    }
}

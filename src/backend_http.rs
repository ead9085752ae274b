use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use url::Url;

use crate::http_response::parse_http_status_code;

const MAX_RESPONSE_HEAD_BYTES: u64 = 8 * 1024;

fn resolve_backend_addrs(parsed: &Url) -> Result<Vec<SocketAddr>, String> {
    let host = parsed
        .host_str()
        .ok_or_else(|| format!("Backend URL has no host: {parsed}"))?;
    let port = parsed.port_or_known_default().unwrap_or(80);
    (host, port)
        .to_socket_addrs()
        .map(|addrs| addrs.collect())
        .map_err(|error| format!("Failed to resolve backend address {host}:{port}: {error}"))
}

/// Issues `GET <backend_url><http_path>` over a plain TCP connection and
/// returns the response status code.
pub fn probe_backend_http(
    backend_url: &str,
    http_path: &str,
    timeout: Duration,
) -> Result<u16, String> {
    let parsed =
        Url::parse(backend_url).map_err(|error| format!("Invalid backend URL {backend_url}: {error}"))?;
    let target = parsed
        .join(http_path.trim_start_matches('/'))
        .map_err(|error| format!("Invalid readiness path {http_path}: {error}"))?;
    let host = target
        .host_str()
        .ok_or_else(|| format!("Backend URL has no host: {backend_url}"))?;
    let port = target.port_or_known_default().unwrap_or(80);
    let mut request_path = target.path().to_string();
    if let Some(query) = target.query() {
        request_path.push('?');
        request_path.push_str(query);
    }

    let addrs = resolve_backend_addrs(&target)?;
    let timeout = timeout.max(Duration::from_millis(50));
    let mut last_error = format!("No addresses resolved for {host}:{port}");
    for address in addrs {
        let mut stream = match TcpStream::connect_timeout(&address, timeout) {
            Ok(stream) => stream,
            Err(error) => {
                last_error = format!("Failed to connect to backend {address}: {error}");
                continue;
            }
        };
        stream
            .set_read_timeout(Some(timeout))
            .and_then(|_| stream.set_write_timeout(Some(timeout)))
            .map_err(|error| format!("Failed to configure probe socket: {error}"))?;

        let request = format!(
            "GET {request_path} HTTP/1.1\r\nHost: {host}:{port}\r\nAccept: */*\r\nConnection: close\r\n\r\n"
        );
        stream
            .write_all(request.as_bytes())
            .map_err(|error| format!("Failed to send readiness probe: {error}"))?;

        let mut response = Vec::new();
        let mut limited = (&mut stream).take(MAX_RESPONSE_HEAD_BYTES);
        if let Err(error) = limited.read_to_end(&mut response) {
            if response.is_empty() {
                return Err(format!("Failed to read readiness probe response: {error}"));
            }
        }
        let text = String::from_utf8_lossy(&response);
        return parse_http_status_code(&text)
            .ok_or_else(|| "Backend returned a malformed HTTP response.".to_string());
    }
    Err(last_error)
}

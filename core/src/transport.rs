//! Executes built requests against the network.
//!
//! # Design
//! `Transport` is the only I/O seam in the crate. `UreqTransport` sends one
//! blocking POST per call with no timeout and no retries, and hands back the
//! raw body bytes whatever the HTTP status: WHM reports most failures inside
//! the body, so interpreting it is left to the decoder. The body is read in
//! full with no size cap and no charset check.
//!
//! Idle connections are never kept, so every call opens and closes its own
//! connection.

use tracing::warn;
use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, CONTENT_TYPE_FORM};

/// Something that can deliver an `HttpRequest` and return the response body.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>>;

    /// Called after the client's settings change.
    fn reconfigure(&mut self, _config: &Config) {}
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
    insecure_skip_verify: bool,
}

impl UreqTransport {
    /// Build a transport. `insecure_skip_verify` turns off certificate and
    /// hostname verification for self-signed management endpoints.
    pub fn new(insecure_skip_verify: bool) -> Self {
        if insecure_skip_verify {
            warn!("TLS certificate verification is disabled for WHM requests");
        }
        let tls = TlsConfig::builder()
            .disable_verification(insecure_skip_verify)
            .build();
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_idle_connections(0)
            .max_idle_connections_per_host(0)
            .tls_config(tls)
            .build()
            .new_agent();
        Self {
            agent,
            insecure_skip_verify,
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>> {
        let fail = |err: ureq::Error| ApiError::Transport {
            message: err.to_string(),
            url: request.url.clone(),
            body: request.body.clone(),
        };

        let mut call = self.agent.post(&request.url);
        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            call = call.header(name.as_str(), value.as_str());
        }

        let mut response = call
            .content_type(CONTENT_TYPE_FORM)
            .send(request.body.as_bytes())
            .map_err(fail)?;
        response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(fail)
    }

    fn reconfigure(&mut self, config: &Config) {
        if config.insecure_skip_verify != self.insecure_skip_verify {
            *self = UreqTransport::new(config.insecure_skip_verify);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{SocketAddr, TcpListener, TcpStream};
    use std::sync::mpsc::{self, Receiver};
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::config::ResponseFormat;
    use crate::decode::decode;

    /// Serve `body` with status 200 to every request, keeping connections
    /// open between requests. Each accepted connection is reported on the
    /// returned channel.
    fn serve(body: Vec<u8>) -> (SocketAddr, Receiver<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (accepted, connections) = mpsc::channel();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { return };
                let _ = accepted.send(());
                let body = body.clone();
                thread::spawn(move || answer(stream, &body));
            }
        });
        (addr, connections)
    }

    fn answer(mut stream: TcpStream, body: &[u8]) {
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        loop {
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) | Err(_) => return,
                    Ok(_) => {}
                }
                if line == "\r\n" {
                    break;
                }
                if let Some((key, value)) = line.split_once(':') {
                    if key.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut request_body = vec![0; content_length];
            if reader.read_exact(&mut request_body).is_err() {
                return;
            }
            let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", body.len());
            if stream.write_all(head.as_bytes()).and_then(|_| stream.write_all(body)).is_err() {
                return;
            }
        }
    }

    fn request(addr: SocketAddr, path: &str) -> HttpRequest {
        HttpRequest {
            url: format!("http://{addr}{path}"),
            headers: Vec::new(),
            body: "user=bob".to_string(),
        }
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let request = HttpRequest {
            url: "http://127.0.0.1:9/json-api/listaccts".to_string(),
            headers: Vec::new(),
            body: "search=bob".to_string(),
        };
        let err = UreqTransport::default().execute(&request).unwrap_err();
        match err {
            ApiError::Transport { url, body, .. } => {
                assert_eq!(url, "http://127.0.0.1:9/json-api/listaccts");
                assert_eq!(body, "search=bob");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_url_is_a_transport_error() {
        let request = HttpRequest {
            url: "https://exa mple:2087/json-api/listaccts".to_string(),
            headers: Vec::new(),
            body: String::new(),
        };
        let err = UreqTransport::new(true).execute(&request).unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }

    #[test]
    fn non_utf8_body_is_returned_verbatim() {
        let body = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><r><n>Sel\xe7uk</n></r>".to_vec();
        let (addr, _connections) = serve(body.clone());

        let raw = UreqTransport::default()
            .execute(&request(addr, "/xml-api/listsuspended"))
            .unwrap();
        assert_eq!(raw, body);

        let response = decode(&raw, ResponseFormat::Xml, false).unwrap();
        assert_eq!(response.as_xml().unwrap().name, "r");
    }

    #[test]
    fn large_body_is_not_truncated() {
        let filler = "a".repeat(11 * 1024 * 1024);
        let body = format!(r#"{{"status":1,"filler":"{filler}"}}"#).into_bytes();
        let (addr, _connections) = serve(body.clone());

        let raw = UreqTransport::default()
            .execute(&request(addr, "/json-api/listaccts"))
            .unwrap();
        assert_eq!(raw.len(), body.len());

        let response = decode(&raw, ResponseFormat::Json, true).unwrap();
        assert_eq!(response.as_json().unwrap()["status"], 1);
    }

    #[test]
    fn each_call_opens_its_own_connection() {
        let (addr, connections) = serve(br#"{"status":1}"#.to_vec());
        let transport = UreqTransport::default();

        for _ in 0..2 {
            transport
                .execute(&request(addr, "/json-api/listsuspended"))
                .unwrap();
        }
        for _ in 0..2 {
            connections
                .recv_timeout(Duration::from_secs(5))
                .expect("expected a new connection per request");
        }
    }

    #[test]
    fn reconfigure_tracks_tls_setting() {
        let mut transport = UreqTransport::default();
        transport.reconfigure(&Config {
            insecure_skip_verify: true,
            ..Default::default()
        });
        assert!(transport.insecure_skip_verify);
        transport.reconfigure(&Config::default());
        assert!(!transport.insecure_skip_verify);
    }
}

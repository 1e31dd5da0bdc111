// src/network/siad.rs
use crate::miner::work::{MIN_HEADER_LEN, Solution, TARGET_LEN, Template};
use crate::network::TemplateSource;
use crate::utils::error::MinerError;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tokio::runtime::Runtime;
use url::Url;

/// Length of the full target the daemon prepends to every header
const SIAD_TARGET_LEN: usize = 32;

/// Endpoint serving headers on GET and accepting solved ones on POST
const HEADER_PATH: &str = "miner/header";

/// Error body returned by the daemon on non-success statuses
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Client for a Sia daemon's miner API
///
/// The API is async (`reqwest`); callers live on plain worker threads, so the
/// client owns a small tokio runtime and blocks on it per request.
pub struct SiadClient {
    /// Base URL of the daemon (e.g. "http://localhost:9980")
    base: Url,
    /// HTTP client for making requests
    client: Client,
    /// Runtime driving the HTTP client
    runtime: Runtime,
}

impl SiadClient {
    /// Creates a client for the daemon at `url`
    ///
    /// # Arguments
    /// * `url` - Daemon base URL
    /// * `user_agent` - Sent with every request; siad rejects unknown agents
    /// * `timeout` - Per-request timeout
    pub fn new(url: &str, user_agent: &str, timeout: Duration) -> Result<Self, MinerError> {
        let mut base = Url::parse(url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .no_proxy()
            .build()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        Ok(SiadClient {
            base,
            client,
            runtime,
        })
    }

    fn header_url(&self) -> Result<Url, MinerError> {
        Ok(self.base.join(HEADER_PATH)?)
    }

    async fn get_header(&self) -> Result<Template, MinerError> {
        let response = self
            .client
            .get(self.header_url()?)
            .send()
            .await
            .map_err(|e| MinerError::ConnectionError(e.to_string()))?;
        let body = check_status(response).await?.bytes().await?;
        parse_header_response(&body)
    }

    async fn post_header(&self, header: &[u8]) -> Result<(), MinerError> {
        let response = self
            .client
            .post(self.header_url()?)
            .body(header.to_vec())
            .send()
            .await
            .map_err(|e| MinerError::ConnectionError(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }
}

impl TemplateSource for SiadClient {
    fn fetch(&self) -> Result<Template, MinerError> {
        self.runtime.block_on(self.get_header())
    }

    fn submit(&self, solution: &Solution) -> Result<(), MinerError> {
        self.runtime.block_on(self.post_header(&solution.header))
    }
}

/// Turns non-success responses into a protocol error carrying the daemon's message
async fn check_status(response: Response) -> Result<Response, MinerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&text)
        .map(|e| e.message)
        .unwrap_or(text);
    Err(MinerError::ProtocolError(format!(
        "daemon answered {}: {}",
        status, message
    )))
}

/// Splits a `/miner/header` body into the template's target and header
///
/// The body is a 32-byte target followed by the header; only the leading
/// 8 target bytes are embedded into the header.
pub fn parse_header_response(body: &[u8]) -> Result<Template, MinerError> {
    if body.len() < SIAD_TARGET_LEN + MIN_HEADER_LEN {
        return Err(MinerError::ProtocolError(format!(
            "header response too short: {} bytes",
            body.len()
        )));
    }

    let (target, header) = body.split_at(SIAD_TARGET_LEN);
    let mut natural = [0u8; TARGET_LEN];
    natural.copy_from_slice(&target[..TARGET_LEN]);

    Ok(Template {
        target: natural,
        header: header.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn sample_body() -> Vec<u8> {
        let mut body = vec![0u8; SIAD_TARGET_LEN + 80];
        body[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        body[SIAD_TARGET_LEN] = 0xaa;
        body
    }

    /// Serves exactly one HTTP response and returns the raw request it saw
    fn serve_once(status: &'static str, body: Vec<u8>) -> (String, thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = vec![0u8; 4096];
            let n = stream.read(&mut request).unwrap();
            request.truncate(n);
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            request
        });
        (url, handle)
    }

    #[test]
    fn parses_target_and_header() {
        let template = parse_header_response(&sample_body()).unwrap();
        assert_eq!(template.target, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(template.header.len(), 80);
        assert_eq!(template.header[0], 0xaa);
    }

    #[test]
    fn rejects_truncated_body() {
        let err = parse_header_response(&[0u8; 40]).unwrap_err();
        assert!(matches!(err, MinerError::ProtocolError(_)));
    }

    #[test]
    fn fetch_sends_user_agent_and_parses_body() {
        let (url, server) = serve_once("200 OK", sample_body());
        let client = SiadClient::new(&url, "Sia-Agent", Duration::from_secs(5)).unwrap();

        let template = client.fetch().unwrap();
        assert_eq!(template.target, [1, 2, 3, 4, 5, 6, 7, 8]);

        let request = String::from_utf8_lossy(&server.join().unwrap()).to_lowercase();
        assert!(request.starts_with("get /miner/header"));
        assert!(request.contains("user-agent: sia-agent"));
    }

    #[test]
    fn daemon_error_message_is_surfaced() {
        let body = br#"{"message":"not synced"}"#.to_vec();
        let (url, server) = serve_once("400 Bad Request", body);
        let client = SiadClient::new(&url, "Sia-Agent", Duration::from_secs(5)).unwrap();

        let err = client.fetch().unwrap_err();
        server.join().unwrap();
        match err {
            MinerError::ProtocolError(msg) => assert!(msg.contains("not synced")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unreachable_daemon_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = SiadClient::new(&url, "Sia-Agent", Duration::from_secs(5)).unwrap();
        assert!(matches!(
            client.fetch(),
            Err(MinerError::ConnectionError(_))
        ));
    }
}

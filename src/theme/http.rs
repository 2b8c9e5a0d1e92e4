//! Theme service client.
//!
//! POSTs `{"level": n, "previous_theme": "..."}` to the configured endpoint
//! and expects a JSON [`Theme`] back.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use std::time::Duration;

use super::{Theme, ThemeError, ThemeProvider};

#[derive(Debug, Serialize)]
struct ThemeRequest<'a> {
    level: u32,
    previous_theme: &'a str,
}

/// HTTP theme source
#[derive(Clone)]
pub struct HttpThemeProvider {
    client: Client<HttpConnector, Full<Bytes>>,
    endpoint: Uri,
    timeout: Duration,
}

impl HttpThemeProvider {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ThemeError> {
        let endpoint: Uri = endpoint
            .parse()
            .map_err(|e| ThemeError::Endpoint(format!("{endpoint}: {e}")))?;

        if endpoint.scheme_str() != Some("http") {
            return Err(ThemeError::Endpoint(format!(
                "{endpoint}: only http:// endpoints are supported"
            )));
        }

        let mut connector = HttpConnector::new();
        connector.set_nodelay(true);
        connector.set_connect_timeout(Some(timeout));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }
}

#[async_trait]
impl ThemeProvider for HttpThemeProvider {
    async fn fetch(&self, level: u32, previous_theme: &str) -> Result<Theme, ThemeError> {
        let body = serde_json::to_vec(&ThemeRequest {
            level,
            previous_theme,
        })?;

        let req = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| ThemeError::Connection(format!("invalid request: {e}")))?;

        let response = tokio::time::timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| ThemeError::Timeout)?
            .map_err(|e| ThemeError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThemeError::Status(status.as_u16()));
        }

        let bytes = tokio::time::timeout(self.timeout, response.into_body().collect())
            .await
            .map_err(|_| ThemeError::Timeout)?
            .map_err(|e| ThemeError::Connection(e.to_string()))?
            .to_bytes();

        let theme: Theme = serde_json::from_slice(&bytes)?;
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned response, returning the raw request text
    async fn serve_once(
        status_line: &'static str,
        body: String,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.ends_with(b"}") {
                    break;
                }
            }

            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}/theme"), handle)
    }

    #[tokio::test]
    async fn test_fetch_parses_theme() {
        let theme = Theme {
            name: "Molten Core".to_string(),
            food: "#ffaa00".to_string(),
            ..Theme::default()
        };
        let (url, server) = serve_once("HTTP/1.1 200 OK", serde_json::to_string(&theme).unwrap()).await;

        let provider = HttpThemeProvider::new(&url, Duration::from_secs(5)).unwrap();
        let fetched = provider.fetch(2, "Neon Classic").await.unwrap();
        assert_eq!(fetched, theme);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /theme"));
        assert!(request.contains(r#""level":2"#));
        assert!(request.contains(r#""previous_theme":"Neon Classic""#));
    }

    #[tokio::test]
    async fn test_error_status() {
        let (url, _server) = serve_once("HTTP/1.1 503 Service Unavailable", "{}".to_string()).await;

        let provider = HttpThemeProvider::new(&url, Duration::from_secs(5)).unwrap();
        let err = provider.fetch(2, "Neon Classic").await.unwrap_err();
        assert!(matches!(err, ThemeError::Status(503)));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (url, _server) = serve_once("HTTP/1.1 200 OK", r#"{"name": 5}"#.to_string()).await;

        let provider = HttpThemeProvider::new(&url, Duration::from_secs(5)).unwrap();
        let err = provider.fetch(2, "Neon Classic").await.unwrap_err();
        assert!(matches!(err, ThemeError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider =
            HttpThemeProvider::new(&format!("http://{addr}/theme"), Duration::from_secs(2)).unwrap();
        let err = provider.fetch(1, "Neon Classic").await.unwrap_err();
        assert!(matches!(err, ThemeError::Connection(_) | ThemeError::Timeout));
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        assert!(matches!(
            HttpThemeProvider::new("https://example.com/theme", Duration::from_secs(1)),
            Err(ThemeError::Endpoint(_))
        ));
        assert!(matches!(
            HttpThemeProvider::new("not a uri", Duration::from_secs(1)),
            Err(ThemeError::Endpoint(_))
        ));
    }
}

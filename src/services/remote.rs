//! Remote Config Store
//!
//! The persist call: one authenticated POST that fully replaces the
//! server-side config for the signed-in account.

use crate::constants::{REQUEST_ID_HEADER, TOKEN_HEADER, UID_HEADER};
use crate::domain::{ClientSettings, FirebaseConfig};
use crate::error::{Error, Result};
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Everything one persist call carries
#[derive(Debug, Clone, Copy)]
pub struct PersistRequest<'a> {
    /// Candidate config; includes the secret only if the prior config had one
    pub config: &'a FirebaseConfig,
    pub uid: &'a str,
    pub token: &'a str,
    /// Correlation id of the submission attempt
    pub request_id: &'a str,
}

/// Durable store for the config
pub trait ConfigRemote: Send + Sync {
    /// Store `request.config`; any failure is an [`Error::Network`]
    fn persist(&self, request: PersistRequest<'_>) -> impl Future<Output = Result<()>> + Send;
}

/// Generate a correlation id for one submission attempt
pub fn generate_request_id() -> Arc<str> {
    uuid::Uuid::new_v4().to_string().into()
}

/// HTTP implementation of [`ConfigRemote`]
#[derive(Debug, Clone)]
pub struct HttpConfigRemote {
    http_client: HttpClient,
    endpoint: String,
}

impl HttpConfigRemote {
    /// Create a client for the endpoint described by `settings`
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http_client = HttpClient::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .build()
            .map_err(|e| Error::Invalid {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            http_client,
            endpoint: settings.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ConfigRemote for HttpConfigRemote {
    async fn persist(&self, request: PersistRequest<'_>) -> Result<()> {
        debug!(endpoint = %self.endpoint, uid = request.uid, "Sending persist request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(UID_HEADER, request.uid)
            .header(TOKEN_HEADER, request.token)
            .header(REQUEST_ID_HEADER, request.request_id)
            .json(request.config)
            .send()
            .await
            .map_err(|e| Error::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::Network {
            message: failure_message(status, &body),
        })
    }
}

/// Pick the most useful message out of a failed response
///
/// Accepts `{"message": ..}`, `{"error": ..}` and `{"error": {"message": ..}}`
/// bodies; anything else falls back to the status code.
fn failure_message(status: StatusCode, body: &str) -> String {
    let from_body = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        let text = |v: &Value| v.as_str().filter(|s| !s.is_empty()).map(str::to_owned);
        text(&value["message"])
            .or_else(|| text(&value["error"]))
            .or_else(|| text(&value["error"]["message"]))
    });

    from_body.unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn config(password: Option<&str>) -> FirebaseConfig {
        FirebaseConfig {
            api_key: "k1".to_string(),
            auth_domain: "a.com".to_string(),
            project_id: "p1".to_string(),
            storage_bucket: "p1.appspot.com".to_string(),
            app_id: "1:1:web:1".to_string(),
            extra: Map::new(),
            password: password.map(str::to_owned),
        }
    }

    /// Read one HTTP request (headers plus content-length body)
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.expect("read");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + length {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve exactly one canned response; the handle yields the raw request
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.expect("write");
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{addr}"), handle)
    }

    fn remote_for(base_url: String) -> HttpConfigRemote {
        let settings = ClientSettings {
            base_url,
            timeout_secs: 5,
            ..ClientSettings::default()
        };
        HttpConfigRemote::new(&settings).expect("client")
    }

    #[tokio::test]
    async fn test_persist_sends_config_and_credentials() {
        let (base_url, server) = serve_once("200 OK", "{}").await;
        let remote = remote_for(base_url);
        let config = config(Some("secret1"));

        remote
            .persist(PersistRequest {
                config: &config,
                uid: "user-1",
                token: "tok-1",
                request_id: "req-1",
            })
            .await
            .expect("persist");

        let request = server.await.expect("server");
        assert!(request.starts_with("POST /api/config HTTP/1.1"));
        assert!(request.contains("uid: user-1"));
        assert!(request.contains("token: tok-1"));
        assert!(request.contains("x-request-id: req-1"));
        assert!(request.contains(r#""apiKey":"k1""#));
        assert!(request.contains(r#""password":"secret1""#));
    }

    #[tokio::test]
    async fn test_persist_omits_absent_secret() {
        let (base_url, server) = serve_once("201 Created", "").await;
        let remote = remote_for(base_url);
        let config = config(None);

        remote
            .persist(PersistRequest {
                config: &config,
                uid: "user-1",
                token: "tok-1",
                request_id: "req-2",
            })
            .await
            .expect("persist");

        let request = server.await.expect("server");
        assert!(!request.contains("password"));
    }

    #[tokio::test]
    async fn test_persist_surfaces_server_message() {
        let (base_url, server) =
            serve_once("403 Forbidden", r#"{"message":"Firebase: Permission denied"}"#).await;
        let remote = remote_for(base_url);
        let config = config(None);

        let err = remote
            .persist(PersistRequest {
                config: &config,
                uid: "user-1",
                token: "tok-1",
                request_id: "req-3",
            })
            .await
            .expect_err("should fail");
        server.await.expect("server");

        match err {
            Error::Network { message } => assert_eq!(message, "Firebase: Permission denied"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_persist_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let remote = remote_for(format!("http://{addr}"));
        let config = config(None);
        let err = remote
            .persist(PersistRequest {
                config: &config,
                uid: "user-1",
                token: "tok-1",
                request_id: "req-4",
            })
            .await
            .expect_err("should fail");
        assert!(matches!(err, Error::Network { .. }));
    }

    #[test]
    fn test_failure_message_shapes() {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        assert_eq!(failure_message(status, r#"{"error":"boom"}"#), "boom");
        assert_eq!(failure_message(status, r#"{"error":{"message":"deep"}}"#), "deep");
        assert_eq!(
            failure_message(status, "<html>oops</html>"),
            "Request failed with status code 500"
        );
        assert_eq!(
            failure_message(status, r#"{"message":""}"#),
            "Request failed with status code 500"
        );
    }

    #[test]
    fn test_endpoint_from_settings() {
        let remote = remote_for("https://files.example.com/".to_string());
        assert_eq!(remote.endpoint(), "https://files.example.com/api/config");
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(generate_request_id(), generate_request_id());
    }
}

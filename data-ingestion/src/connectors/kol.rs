use async_trait::async_trait;
use reqwest::Client;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use common::{FetchError, FetchResult, KolFeedSettings};

/// Upper bound on `limit` accepted by the KOL endpoint
pub const MAX_ITEM_LIMIT: u32 = 1000;

/// Parameters of one KOL feed request, already clamped
///
/// Out-of-range values are never rejected: the window is raised to at least
/// one hour and the limit is held within `1..=MAX_ITEM_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    hours: u32,
    limit: u32,
    timeout_secs: u64,
}

impl FetchRequest {
    pub fn new(time_window: i64, item_limit: i64, timeout_secs: u64) -> Self {
        Self {
            hours: time_window.clamp(1, u32::MAX as i64) as u32,
            limit: item_limit.clamp(1, MAX_ITEM_LIMIT as i64) as u32,
            timeout_secs: timeout_secs.max(1),
        }
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Query string pairs sent to the endpoint
    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("hours", self.hours.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self::from(&KolFeedSettings::default())
    }
}

impl From<&KolFeedSettings> for FetchRequest {
    fn from(settings: &KolFeedSettings) -> Self {
        Self::new(settings.hours, settings.limit, settings.timeout_secs)
    }
}

/// Anything that can produce the KOL posts payload
#[async_trait]
pub trait KolSource: Send + Sync {
    /// One fetch attempt. Every failure comes back as `Err`, never a panic.
    async fn fetch(&self, request: FetchRequest) -> FetchResult;
}

/// Twitter KOL posts connector (getKolPosts HTTP endpoint)
pub struct KolConnector {
    api_url: String,
    client: Client,
}

impl KolConnector {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(api_url, Client::new())
    }

    pub fn with_client(api_url: impl Into<String>, client: Client) -> Self {
        Self {
            api_url: api_url.into(),
            client,
        }
    }

    pub fn from_settings(settings: &KolFeedSettings) -> Self {
        Self::new(settings.base_url.clone())
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn fetch_kol_posts(&self, request: FetchRequest) -> FetchResult {
        info!(
            "Fetching KOL posts (hours={}, limit={})",
            request.hours(),
            request.limit()
        );

        let response = self
            .client
            .get(&self.api_url)
            .query(&request.query())
            .timeout(request.timeout())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, request.timeout_secs()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(e, request.timeout_secs()))?;

        let payload: serde_json::Value =
            serde_json::from_slice(&body).map_err(FetchError::Decode)?;

        debug!("KOL feed returned {} bytes", body.len());
        Ok(payload)
    }
}

#[async_trait]
impl KolSource for KolConnector {
    async fn fetch(&self, request: FetchRequest) -> FetchResult {
        self.fetch_kol_posts(request).await
    }
}

enum StaticResponse {
    Posts(serde_json::Value),
    Timeout,
}

/// In-memory KOL source (for testing and offline runs)
pub struct StaticKolSource {
    response: StaticResponse,
    delay: Option<Duration>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl StaticKolSource {
    /// Always answers with `payload`
    pub fn posts(payload: serde_json::Value) -> Self {
        Self::with_response(StaticResponse::Posts(payload))
    }

    /// Always fails as if the request timed out
    pub fn timeout() -> Self {
        Self::with_response(StaticResponse::Timeout)
    }

    fn with_response(response: StaticResponse) -> Self {
        Self {
            response,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl KolSource for StaticKolSource {
    async fn fetch(&self, request: FetchRequest) -> FetchResult {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.response {
            StaticResponse::Posts(payload) => Ok(payload.clone()),
            StaticResponse::Timeout => Err(FetchError::Timeout(request.timeout_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves a single HTTP response and hands back the request line it saw
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            request.lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{}/ai/api/twitter/getKolPosts", addr), handle)
    }

    fn connector(url: String) -> KolConnector {
        let client = Client::builder().no_proxy().build().unwrap();
        KolConnector::with_client(url, client)
    }

    #[test]
    fn test_window_is_raised_to_one_hour() {
        for window in [0, -1, -5, i64::MIN] {
            assert_eq!(FetchRequest::new(window, 100, 15).hours(), 1);
        }
        assert_eq!(FetchRequest::new(24, 100, 15).hours(), 24);
    }

    #[test]
    fn test_limit_is_capped_at_max() {
        for limit in [1001, 1500, i64::MAX] {
            assert_eq!(FetchRequest::new(4, limit, 15).limit(), MAX_ITEM_LIMIT);
        }
        for limit in [1, 100, 500, 1000] {
            assert_eq!(FetchRequest::new(4, limit, 15).limit(), limit as u32);
        }
    }

    #[test]
    fn test_defaults_from_settings() {
        let request = FetchRequest::default();
        assert_eq!(request.hours(), 4);
        assert_eq!(request.limit(), 100);
        assert_eq!(request.timeout(), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_fetch_sends_clamped_query() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"posts":[{"text":"gm"}]}"#).await;

        let payload = connector(url)
            .fetch_kol_posts(FetchRequest::new(-5, 1500, 5))
            .await
            .unwrap();

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /ai/api/twitter/getKolPosts?"));
        assert!(request_line.contains("hours=1"));
        assert!(request_line.contains("limit=1000"));
        assert_eq!(payload, json!({"posts": [{"text": "gm"}]}));
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let (url, server) = serve_once("HTTP/1.1 503 Service Unavailable", "{}").await;

        let result = connector(url).fetch_kol_posts(FetchRequest::default()).await;
        server.await.unwrap();

        match result {
            Err(FetchError::Status(status)) => assert_eq!(status.as_u16(), 503),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_fetch_error() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", "<html>oops</html>").await;

        let result = connector(url).fetch_kol_posts(FetchRequest::default()).await;
        server.await.unwrap();

        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = connector(format!("http://{}/getKolPosts", addr))
            .fetch_kol_posts(FetchRequest::new(4, 100, 2))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_static_source_records_requests() {
        let source = StaticKolSource::posts(json!({"posts": []}));
        let request = FetchRequest::new(0, 5000, 15);

        assert!(source.fetch(request).await.is_ok());
        assert_eq!(source.requests(), vec![request]);
        assert_eq!(source.requests()[0].limit(), MAX_ITEM_LIMIT);
    }

    #[tokio::test]
    async fn test_static_timeout_source() {
        let source = StaticKolSource::timeout();
        let err = source.fetch(FetchRequest::new(4, 100, 15)).await.unwrap_err();
        assert_eq!(err.to_string(), "request timed out after 15s");
    }
}

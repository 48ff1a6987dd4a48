use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;

use super::{AnalysisService, NotificationService};
use crate::config::DashboardConfig;
use crate::error::TransportError;
use crate::models::{AnalysisRow, Holding, UploadedFile};

/// Talks to the dashboard backend REST API.
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ReportRequest<'a> {
    recipient: &'a str,
    data: &'a [AnalysisRow],
}

impl HttpBackend {
    pub fn new(config: &DashboardConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("PortfolioDashboard/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn ensure_success(resp: Response) -> Result<Response, TransportError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(TransportError::Status { status, body })
    }

    async fn read_json(resp: Response) -> Result<Value, TransportError> {
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| TransportError::InvalidBody(e.to_string()))
    }

    /// A 2xx body that is not JSON is handed on as a plain string so the
    /// normalizer can degrade it to an empty result.
    fn lenient_json(text: String) -> Value {
        match serde_json::from_str(&text) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, bytes = text.len(), "analysis reply is not JSON");
                Value::String(text)
            }
        }
    }

    fn parse_holdings(json: &Value) -> Vec<Holding> {
        json["data"]["assets"]
            .as_array()
            .map(|assets| {
                assets
                    .iter()
                    .filter_map(|a| serde_json::from_value::<Holding>(a.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl AnalysisService for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit_portfolio(&self, file: &UploadedFile) -> Result<Value, TransportError> {
        let url = self.url("portfolio/analyze");
        tracing::info!(%url, file = %file.name, bytes = file.bytes.len(), "submitting portfolio");

        let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = Form::new().part("file", part);

        let resp = self.client.post(&url).multipart(form).send().await?;
        let resp = Self::ensure_success(resp).await?;
        let text = resp.text().await?;
        Ok(Self::lenient_json(text))
    }

    async fn check_status(&self) -> Result<bool, TransportError> {
        let resp = self.client.get(self.url("portfolio/analyze")).send().await?;
        Ok(resp.status().is_success())
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>, TransportError> {
        let resp = self.client.get(self.url("portfolio")).send().await?;
        let resp = Self::ensure_success(resp).await?;
        let json = Self::read_json(resp).await?;
        Ok(Self::parse_holdings(&json))
    }
}

#[async_trait]
impl NotificationService for HttpBackend {
    async fn send_report(&self, recipient: &str, rows: &[AnalysisRow]) -> Result<(), TransportError> {
        let url = self.url("email-report");
        tracing::info!(%url, rows = rows.len(), "sending report email");

        let resp = self
            .client
            .post(&url)
            .json(&ReportRequest { recipient, data: rows })
            .send()
            .await?;
        Self::ensure_success(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = DashboardConfig {
            base_url: "http://localhost:5000/api/".to_string(),
            ..DashboardConfig::default()
        };
        let backend = HttpBackend::new(&config);
        assert_eq!(backend.url("portfolio/analyze"), "http://localhost:5000/api/portfolio/analyze");
    }

    #[test]
    fn test_lenient_json() {
        assert_eq!(HttpBackend::lenient_json(r#"{"portfolio":[]}"#.to_string()), json!({ "portfolio": [] }));
        assert_eq!(
            HttpBackend::lenient_json("<html>ok</html>".to_string()),
            Value::String("<html>ok</html>".to_string())
        );
    }

    /// One-shot HTTP server: drains a multipart request, answers with `status`
    /// and `body`, then closes.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.ends_with(b"--\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    fn backend_at(base_url: String) -> HttpBackend {
        HttpBackend::new(&DashboardConfig {
            base_url,
            ..DashboardConfig::default()
        })
    }

    #[tokio::test]
    async fn test_html_success_body_degrades() {
        let backend = backend_at(serve_once("200 OK", "<html>ok</html>").await);
        let file = UploadedFile::new("portfolio.csv", "Symbol,BuyPrice\nAAPL,150\n");

        let payload = backend.submit_portfolio(&file).await.unwrap();
        assert_eq!(payload, Value::String("<html>ok</html>".to_string()));

        let result = crate::analysis::normalize_response(&payload);
        assert!(result.rows.is_empty());
        assert_eq!(result.summary.ai_summary, crate::analysis::FALLBACK_AI_SUMMARY);
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let backend = backend_at(serve_once("500 Internal Server Error", "boom").await);
        let file = UploadedFile::new("portfolio.csv", "Symbol\nAAPL\n");

        match backend.submit_portfolio(&file).await {
            Err(TransportError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_holdings() {
        let json = json!({
            "status": "success",
            "data": {
                "user_id": 1,
                "assets": [
                    { "symbol": "AAPL", "shares": 10, "value": 1920.50 },
                    { "symbol": "TSLA", "shares": 8, "value": 1985.30 },
                    { "shares": 1 }
                ]
            }
        });
        let holdings = HttpBackend::parse_holdings(&json);
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[1].value, 1985.30);
    }

    #[test]
    fn test_parse_holdings_missing() {
        assert!(HttpBackend::parse_holdings(&json!({ "error": "nope" })).is_empty());
    }

    #[test]
    fn test_report_request_shape() {
        let rows = vec![AnalysisRow(json!({ "Symbol": "AAPL", "Recommendation": "Buy" }))];
        let body = serde_json::to_value(ReportRequest { recipient: "a@b.c", data: &rows }).unwrap();
        assert_eq!(body, json!({
            "recipient": "a@b.c",
            "data": [{ "Symbol": "AAPL", "Recommendation": "Buy" }]
        }));
    }
}

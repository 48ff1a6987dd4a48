use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::models::{AnalysisRow, Holding, UploadedFile};

pub mod http;

pub use http::HttpBackend;

/// Remote portfolio analysis. The payload is returned raw; shaping it is the
/// normalizer's job.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    fn name(&self) -> &str;

    async fn submit_portfolio(&self, file: &UploadedFile) -> Result<Value, TransportError>;

    /// `Ok(true)` when the analysis endpoint answers with a 2xx.
    async fn check_status(&self) -> Result<bool, TransportError>;

    async fn fetch_holdings(&self) -> Result<Vec<Holding>, TransportError>;
}

/// Emails the analysed rows to a recipient.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_report(&self, recipient: &str, rows: &[AnalysisRow]) -> Result<(), TransportError>;
}

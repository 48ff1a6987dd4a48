pub mod models;
pub mod preview;
pub mod analysis;
pub mod service;
pub mod core;
pub mod config;
pub mod error;
pub mod telemetry;

pub use crate::analysis::{analyze_response, AnalysisOutcome};
pub use crate::config::DashboardConfig;
pub use crate::core::{Completion, DashboardView, PipelineController, PipelineState};
pub use crate::error::{PipelineError, TransportError};
pub use crate::models::{AnalysisResult, AnalysisRow, ConfidenceScore, PreviewRow, Totals, UploadedFile};
pub use crate::service::{AnalysisService, HttpBackend, NotificationService};

use std::sync::Arc;

/// Controller wired to the HTTP backend described by `config`.
pub fn http_controller(config: &DashboardConfig) -> PipelineController {
    let backend = Arc::new(HttpBackend::new(config));
    PipelineController::new(backend.clone(), backend, config.report_recipient.clone())
}

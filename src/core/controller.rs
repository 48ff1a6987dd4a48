use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::analysis::{analyze_response, AnalysisOutcome};
use crate::core::session::Redirect;
use crate::error::{PipelineError, Result};
use crate::models::{Holding, Preview, UploadedFile};
use crate::preview::build_preview;
use crate::service::{AnalysisService, NotificationService};

pub const NO_FILE_MESSAGE: &str = "Please upload a CSV or XLSX file first.";
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "❌ Portfolio analysis failed. Please verify your backend and file format.";
pub const REPORT_FAILED_MESSAGE: &str = "Failed to send report email.";
pub const HOLDINGS_FAILED_MESSAGE: &str = "Failed to fetch portfolio data.";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    PreviewReady,
    Submitting,
    Succeeded,
    Failed,
    Notifying,
    Notified,
}

impl PipelineState {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::PreviewReady => "preview ready",
            PipelineState::Submitting => "submitting",
            PipelineState::Succeeded => "succeeded",
            PipelineState::Failed => "failed",
            PipelineState::Notifying => "notifying",
            PipelineState::Notified => "notified",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, PipelineState::Submitting | PipelineState::Notifying)
    }
}

/// How a network round trip ended from the controller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The pipeline moved on (reset or new file) before the reply arrived.
    Stale,
}

/// Owned copy of everything a renderer needs, taken under one lock.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub state: PipelineState,
    pub file_name: Option<String>,
    pub preview: Preview,
    pub outcome: Option<AnalysisOutcome>,
    pub error: Option<String>,
    pub report_sent: bool,
    pub api_online: bool,
}

/// Which network call is outstanding. Outlives `reset` and `select_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Analysis,
    Notification,
}

#[derive(Debug)]
struct Inner {
    state: PipelineState,
    file: Option<UploadedFile>,
    preview: Preview,
    outcome: Option<AnalysisOutcome>,
    error: Option<String>,
    report_sent: bool,
    api_online: bool,
    // Bumped on every request and every discard; replies carrying an older
    // value are dropped.
    request_token: u64,
    in_flight: Option<InFlight>,
}

impl Inner {
    fn new() -> Self {
        Inner {
            state: PipelineState::Idle,
            file: None,
            preview: Vec::new(),
            outcome: None,
            error: None,
            report_sent: false,
            api_online: false,
            request_token: 0,
            in_flight: None,
        }
    }

    fn next_token(&mut self) -> u64 {
        self.request_token += 1;
        self.request_token
    }

    fn clear_run(&mut self) {
        self.file = None;
        self.preview.clear();
        self.outcome = None;
        self.error = None;
        self.report_sent = false;
    }

    fn busy_error(&self) -> Option<PipelineError> {
        match self.in_flight {
            Some(InFlight::Analysis) => Some(PipelineError::Busy("analysis")),
            Some(InFlight::Notification) => Some(PipelineError::Busy("notification")),
            None => None,
        }
    }
}

/// Clears the in-flight marker when the request settles or its future is
/// dropped, stale or not.
struct InFlightGuard<'a> {
    inner: &'a Mutex<Inner>,
}

impl<'a> InFlightGuard<'a> {
    fn start(inner: &'a Mutex<Inner>, guarded: &mut Inner, kind: InFlight) -> Self {
        guarded.in_flight = Some(kind);
        InFlightGuard { inner }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight = None;
    }
}

/// Drives one dashboard session: select -> preview -> submit -> analyse ->
/// notify, with reset available from anywhere.
///
/// All mutation goes through a short-lived lock that is never held across
/// an await, so `reset` and `select_file` stay responsive while a request
/// is pending.
pub struct PipelineController {
    analysis: Arc<dyn AnalysisService>,
    notifier: Arc<dyn NotificationService>,
    recipient: String,
    inner: Mutex<Inner>,
}

impl PipelineController {
    pub fn new(
        analysis: Arc<dyn AnalysisService>,
        notifier: Arc<dyn NotificationService>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            analysis,
            notifier,
            recipient: recipient.into(),
            inner: Mutex::new(Inner::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> PipelineState {
        self.lock().state
    }

    pub fn preview(&self) -> Preview {
        self.lock().preview.clone()
    }

    pub fn outcome(&self) -> Option<AnalysisOutcome> {
        self.lock().outcome.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn report_sent(&self) -> bool {
        self.lock().report_sent
    }

    pub fn api_online(&self) -> bool {
        self.lock().api_online
    }

    pub fn can_submit(&self) -> bool {
        self.lock().in_flight.is_none()
    }

    pub fn can_notify(&self) -> bool {
        let inner = self.lock();
        inner.in_flight.is_none()
            && matches!(inner.state, PipelineState::Succeeded | PipelineState::Notified)
    }

    pub fn snapshot(&self) -> DashboardView {
        let inner = self.lock();
        DashboardView {
            state: inner.state,
            file_name: inner.file.as_ref().map(|f| f.name.clone()),
            preview: inner.preview.clone(),
            outcome: inner.outcome.clone(),
            error: inner.error.clone(),
            report_sent: inner.report_sent,
            api_online: inner.api_online,
        }
    }

    /// Replace the current file, build its preview and drop any previous
    /// run's output. A request still in flight becomes stale.
    pub fn select_file(&self, file: UploadedFile) -> PipelineState {
        let preview = build_preview(&file);

        let mut inner = self.lock();
        inner.next_token();
        inner.clear_run();
        tracing::info!(file = %file.name, rows = preview.len(), "file selected");
        inner.file = Some(file);
        inner.preview = preview;
        inner.state = PipelineState::PreviewReady;
        inner.state
    }

    /// Send the selected file for analysis and, on reply, derive totals,
    /// confidence and mood in one step.
    pub async fn submit(&self) -> Result<Completion> {
        let (token, file, guard) = {
            let mut inner = self.lock();
            if let Some(err) = inner.busy_error() {
                return Err(err);
            }
            let Some(file) = inner.file.clone() else {
                tracing::warn!(state = inner.state.label(), "submit without a file");
                inner.error = Some(NO_FILE_MESSAGE.to_string());
                return Err(PipelineError::NoFileSelected);
            };

            let token = inner.next_token();
            inner.state = PipelineState::Submitting;
            inner.outcome = None;
            inner.error = None;
            inner.report_sent = false;
            let guard = InFlightGuard::start(&self.inner, &mut inner, InFlight::Analysis);
            (token, file, guard)
        };

        tracing::info!(service = self.analysis.name(), file = %file.name, token, "analysis started");
        let response = self.analysis.submit_portfolio(&file).await;
        drop(guard);

        let mut inner = self.lock();
        if inner.request_token != token {
            tracing::debug!(token, current = inner.request_token, "discarding stale analysis reply");
            return Ok(Completion::Stale);
        }

        match response {
            Ok(payload) => {
                let outcome = analyze_response(&payload);
                tracing::info!(
                    total = outcome.totals.total,
                    buy = outcome.totals.buy,
                    sell = outcome.totals.sell,
                    hold = outcome.totals.hold,
                    confidence = %outcome.confidence,
                    "analysis succeeded"
                );
                inner.outcome = Some(outcome);
                inner.state = PipelineState::Succeeded;
                Ok(Completion::Applied)
            }
            Err(e) => {
                tracing::warn!(error = %e, "analysis failed");
                inner.outcome = None;
                inner.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                inner.state = PipelineState::Failed;
                Err(e.into())
            }
        }
    }

    /// Email the current result. Failure never touches the result itself.
    pub async fn notify(&self) -> Result<Completion> {
        let (token, rows, guard) = {
            let mut inner = self.lock();
            if let Some(err) = inner.busy_error() {
                return Err(err);
            }
            let rows = match (&inner.state, &inner.outcome) {
                (PipelineState::Succeeded | PipelineState::Notified, Some(outcome)) => {
                    outcome.result.rows.clone()
                }
                (state, _) => {
                    return Err(PipelineError::InvalidTransition {
                        action: "send a report",
                        state: state.label(),
                    })
                }
            };

            let token = inner.next_token();
            inner.state = PipelineState::Notifying;
            inner.report_sent = false;
            let guard = InFlightGuard::start(&self.inner, &mut inner, InFlight::Notification);
            (token, rows, guard)
        };

        tracing::info!(recipient = %self.recipient, rows = rows.len(), token, "report dispatch started");
        let response = self.notifier.send_report(&self.recipient, &rows).await;
        drop(guard);

        let mut inner = self.lock();
        if inner.request_token != token {
            tracing::debug!(token, current = inner.request_token, "discarding stale report reply");
            return Ok(Completion::Stale);
        }

        match response {
            Ok(()) => {
                inner.report_sent = true;
                inner.error = None;
                inner.state = PipelineState::Notified;
                Ok(Completion::Applied)
            }
            Err(e) => {
                tracing::warn!(error = %e, "report dispatch failed");
                inner.report_sent = false;
                inner.error = Some(REPORT_FAILED_MESSAGE.to_string());
                inner.state = PipelineState::Succeeded;
                Err(e.into())
            }
        }
    }

    /// Back to `Idle` with file, preview, result and report flag cleared.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.next_token();
        inner.clear_run();
        inner.state = PipelineState::Idle;
        tracing::info!("pipeline reset");
    }

    /// The navigation layer is leaving the dashboard.
    pub fn handle_redirect(&self, redirect: Redirect) {
        tracing::debug!(to = redirect.path(), "redirect requested");
        self.reset();
    }

    /// Probe the analysis endpoint and remember whether it answered.
    pub async fn check_connection(&self) -> bool {
        let online = match self.analysis.check_status().await {
            Ok(online) => online,
            Err(e) => {
                tracing::warn!(error = %e, "analysis service unreachable");
                false
            }
        };
        self.lock().api_online = online;
        online
    }

    /// Existing positions from the backend. A failure is surfaced as the
    /// dashboard error but leaves the pipeline state alone.
    pub async fn load_holdings(&self) -> Result<Vec<Holding>> {
        match self.analysis.fetch_holdings().await {
            Ok(holdings) => Ok(holdings),
            Err(e) => {
                tracing::warn!(error = %e, "holdings fetch failed");
                self.lock().error = Some(HOLDINGS_FAILED_MESSAGE.to_string());
                Err(e.into())
            }
        }
    }
}

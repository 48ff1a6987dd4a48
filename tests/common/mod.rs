#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use portfolio_dashboard_lib::models::{AnalysisRow, Holding, UploadedFile};
use portfolio_dashboard_lib::{AnalysisService, NotificationService, PipelineController, TransportError};

pub const RECIPIENT: &str = "investor@financeio.com";

pub fn sample_csv() -> UploadedFile {
    UploadedFile::new(
        "portfolio.csv",
        "Symbol,BuyPrice,Quantity\nAAPL,150,10\n,,\nTSLA,240,4\n",
    )
}

pub fn buy_hold_payload() -> Value {
    json!({
        "portfolio": [
            { "Symbol": "AAPL", "Recommendation": "Buy" },
            { "Symbol": "TSLA", "Recommendation": "Hold" }
        ],
        "summary": {}
    })
}

/// Analysis double. Replies with a fixed result, optionally after a gate opens.
pub struct FakeAnalysis {
    reply: Result<Value, String>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub calls: AtomicUsize,
    pub online: bool,
}

impl FakeAnalysis {
    pub fn replying(payload: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(payload),
            gate: Mutex::new(None),
            calls: AtomicUsize::new(0),
            online: true,
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            gate: Mutex::new(None),
            calls: AtomicUsize::new(0),
            online: false,
        })
    }

    pub fn gated(payload: Value) -> (Arc<Self>, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let fake = Arc::new(Self {
            reply: Ok(payload),
            gate: Mutex::new(Some(rx)),
            calls: AtomicUsize::new(0),
            online: true,
        });
        (fake, tx)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisService for FakeAnalysis {
    fn name(&self) -> &str {
        "fake"
    }

    async fn submit_portfolio(&self, _file: &UploadedFile) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        self.reply
            .clone()
            .map_err(|body| TransportError::Status { status: 502, body })
    }

    async fn check_status(&self) -> Result<bool, TransportError> {
        if self.online {
            Ok(true)
        } else {
            Err(TransportError::Status { status: 503, body: "connection refused".to_string() })
        }
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>, TransportError> {
        if !self.online {
            return Err(TransportError::Status { status: 503, body: "down".to_string() });
        }
        Ok(vec![Holding { symbol: "AAPL".to_string(), shares: 10.0, value: 1920.5 }])
    }
}

/// Notification double recording what it was asked to send.
pub struct FakeNotifier {
    fail: bool,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub sent: Mutex<Vec<(String, usize)>>,
}

impl FakeNotifier {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self { fail: false, gate: Mutex::new(None), sent: Mutex::new(Vec::new()) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, gate: Mutex::new(None), sent: Mutex::new(Vec::new()) })
    }

    pub fn gated() -> (Arc<Self>, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let fake = Arc::new(Self { fail: false, gate: Mutex::new(Some(rx)), sent: Mutex::new(Vec::new()) });
        (fake, tx)
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationService for FakeNotifier {
    async fn send_report(&self, recipient: &str, rows: &[AnalysisRow]) -> Result<(), TransportError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        if self.fail {
            return Err(TransportError::Status { status: 500, body: "smtp down".to_string() });
        }
        self.sent.lock().unwrap().push((recipient.to_string(), rows.len()));
        Ok(())
    }
}

pub fn controller(analysis: Arc<FakeAnalysis>, notifier: Arc<FakeNotifier>) -> PipelineController {
    PipelineController::new(analysis, notifier, RECIPIENT)
}

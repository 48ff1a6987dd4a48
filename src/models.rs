use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A file picked by the user. Replaced wholesale on every new selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercased text after the last dot, if any. A bare `.csv` counts.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.name.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// One preview line: header -> trimmed cell, in header order.
/// A header with no matching cell maps to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub cells: Vec<(String, Option<String>)>,
}

impl PreviewRow {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    /// Later duplicates of a header overwrite the earlier value in place.
    pub(crate) fn insert(&mut self, header: String, value: Option<String>) {
        match self.cells.iter_mut().find(|(h, _)| *h == header) {
            Some(slot) => slot.1 = value,
            None => self.cells.push((header, value)),
        }
    }
}

pub type Preview = Vec<PreviewRow>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    /// Exact, case-sensitive match. Anything else is unclassified.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Buy" => Some(Recommendation::Buy),
            "Sell" => Some(Recommendation::Sell),
            "Hold" => Some(Recommendation::Hold),
            _ => None,
        }
    }
}

/// A row returned by the analysis service. Only `Recommendation` is
/// interpreted; every other field is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisRow(pub Value);

impl AnalysisRow {
    pub fn raw_recommendation(&self) -> Option<&str> {
        self.0.get("Recommendation").and_then(Value::as_str)
    }

    pub fn recommendation(&self) -> Option<Recommendation> {
        self.raw_recommendation().and_then(Recommendation::parse)
    }

    pub fn symbol(&self) -> Option<&str> {
        self.0.get("Symbol").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total: usize,
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

impl Totals {
    pub fn unclassified(&self) -> usize {
        self.total
            .saturating_sub(self.buy)
            .saturating_sub(self.sell)
            .saturating_sub(self.hold)
    }
}

/// Weighted share of Buy (and half of Hold) rows, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ConfidenceScore {
    Unavailable,
    Percent(f64),
}

impl ConfidenceScore {
    pub fn percent(&self) -> Option<f64> {
        match self {
            ConfidenceScore::Percent(p) => Some(*p),
            ConfidenceScore::Unavailable => None,
        }
    }

    /// `75.0%` for a score, bare `N/A` for the sentinel.
    pub fn with_unit(&self) -> String {
        match self {
            ConfidenceScore::Percent(_) => format!("{}%", self),
            ConfidenceScore::Unavailable => self.to_string(),
        }
    }
}

impl fmt::Display for ConfidenceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceScore::Unavailable => write!(f, "N/A"),
            ConfidenceScore::Percent(p) => write!(f, "{:.1}", p),
        }
    }
}

/// Narrative and headline numbers from the service's `summary` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub ai_summary: String,
    pub total_value: Option<f64>,
    pub total_symbols: Option<u64>,
}

/// Normalized service response: rows plus summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub rows: Vec<AnalysisRow>,
    pub summary: AnalysisSummary,
}

/// An existing position as listed by the backend's portfolio endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    #[serde(default)]
    pub shares: f64,
    #[serde(default)]
    pub value: f64,
}

use serde_json::Value;
use crate::models::{AnalysisResult, AnalysisRow, AnalysisSummary};

pub const FALLBACK_AI_SUMMARY: &str = "🤖 AI summary unavailable — no insights provided.";

/// Turn whatever the analysis service returned into an `AnalysisResult`.
///
/// Rows may arrive as a bare array or under `portfolio`. Anything else
/// yields no rows. A missing or empty `summary.ai_summary` falls back to
/// [`FALLBACK_AI_SUMMARY`]. This function never fails.
pub fn normalize_response(payload: &Value) -> AnalysisResult {
    let rows = match payload {
        Value::Array(items) => items.clone(),
        other => other
            .get("portfolio")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    };

    let summary = payload.get("summary");

    let ai_summary = summary
        .and_then(|s| s.get("ai_summary"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(FALLBACK_AI_SUMMARY)
        .to_string();

    let total_value = summary
        .and_then(|s| s.get("total_value"))
        .and_then(Value::as_f64);

    let total_symbols = summary
        .and_then(|s| s.get("total_symbols"))
        .and_then(Value::as_u64);

    AnalysisResult {
        rows: rows.into_iter().map(AnalysisRow).collect(),
        summary: AnalysisSummary {
            ai_summary,
            total_value,
            total_symbols,
        },
    }
}

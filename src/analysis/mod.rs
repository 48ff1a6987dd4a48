pub mod normalize;
pub mod aggregate;
pub mod mood;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{AnalysisResult, ConfidenceScore, Totals};
use mood::MarketMood;

pub use aggregate::{confidence_score, count_recommendations};
pub use mood::classify_mood;
pub use normalize::{normalize_response, FALLBACK_AI_SUMMARY};

/// Everything derived from one analysis response. Built in a single pass so
/// the totals always describe the rows shown next to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub totals: Totals,
    pub confidence: ConfidenceScore,
    pub mood: MarketMood,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisOutcome {
    pub fn mood_message(&self) -> &'static str {
        self.mood.message()
    }

    pub fn ai_summary(&self) -> &str {
        &self.result.summary.ai_summary
    }
}

/// normalize -> aggregate -> classify
pub fn analyze_response(payload: &Value) -> AnalysisOutcome {
    let result = normalize_response(payload);
    let totals = count_recommendations(&result.rows);
    let confidence = confidence_score(&totals);
    let mood = classify_mood(&totals);

    AnalysisOutcome {
        result,
        totals,
        confidence,
        mood,
        analyzed_at: Utc::now(),
    }
}

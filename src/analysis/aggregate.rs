use crate::models::{AnalysisRow, ConfidenceScore, Recommendation, Totals};

/// Count rows per recommendation. Unrecognized values count toward `total` only.
pub fn count_recommendations(rows: &[AnalysisRow]) -> Totals {
    rows.iter().fold(
        Totals {
            total: rows.len(),
            ..Totals::default()
        },
        |mut totals, row| {
            match row.recommendation() {
                Some(Recommendation::Buy) => totals.buy += 1,
                Some(Recommendation::Sell) => totals.sell += 1,
                Some(Recommendation::Hold) => totals.hold += 1,
                None => {}
            }
            totals
        },
    )
}

/// `(buy + hold/2) / total` as a percentage rounded to one decimal.
/// No rows means no score, not a zero score.
pub fn confidence_score(totals: &Totals) -> ConfidenceScore {
    if totals.total == 0 {
        return ConfidenceScore::Unavailable;
    }

    let weighted = totals.buy as f64 + totals.hold as f64 * 0.5;
    let pct = weighted / totals.total as f64 * 100.0;
    ConfidenceScore::Percent((pct * 10.0).round() / 10.0)
}

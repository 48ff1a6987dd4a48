use serde::{Deserialize, Serialize};
use crate::models::Totals;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarketMood {
    Optimistic,
    Bearish,
    Mixed,
}

impl MarketMood {
    pub fn message(&self) -> &'static str {
        match self {
            MarketMood::Optimistic => "📈 Optimistic outlook — strong upward momentum detected.",
            MarketMood::Bearish => "📉 Market looks bearish — consider reducing exposure.",
            MarketMood::Mixed => "⚖️ Mixed outlook — holding strategy may be appropriate.",
        }
    }
}

/// Buy must strictly lead both other counts to be optimistic; otherwise any
/// Sell lead over Buy is bearish. Ties and Hold-led books are mixed.
pub fn classify_mood(totals: &Totals) -> MarketMood {
    if totals.buy > totals.sell && totals.buy > totals.hold {
        MarketMood::Optimistic
    } else if totals.sell > totals.buy {
        MarketMood::Bearish
    } else {
        MarketMood::Mixed
    }
}

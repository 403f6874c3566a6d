//! Analytics over fetched trend data

pub mod keyword_trends;

pub use keyword_trends::{
    summarize, velocity, KeywordSummary, TrendDirection, TrendError, TrendResult,
    DEFAULT_RECENT_POINTS,
};

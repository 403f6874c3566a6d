//! Per-keyword summaries of an interest-over-time table
//!
//! This module provides:
//! - Mean, peak and latest interest per keyword
//! - Velocity from a linear regression over the most recent points
//! - Trend direction classification from velocity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::models::InterestOverTime;

/// Errors that can occur during keyword trend analysis
#[derive(Debug, Error)]
pub enum TrendError {
    #[error("Insufficient data points: need at least {0}, got {1}")]
    InsufficientData(usize, usize),

    #[error("Keyword not found: {0}")]
    KeywordNotFound(String),
}

/// Result type for trend analysis operations
pub type TrendResult<T> = Result<T, TrendError>;

/// Default number of trailing points the velocity is fitted on
pub const DEFAULT_RECENT_POINTS: usize = 7;

/// Trend direction indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    /// Strongly increasing
    Rising,

    /// Slightly increasing
    SlightlyRising,

    /// Stable, no significant change
    Stable,

    /// Slightly decreasing
    SlightlyFalling,

    /// Strongly decreasing
    Falling,
}

impl TrendDirection {
    /// Determine trend direction from velocity
    ///
    /// # Arguments
    /// * `velocity` - Rate of change (-1.0 to 1.0)
    ///
    /// # Classification
    /// - `velocity > 0.3`: Rising
    /// - `0.1 < velocity <= 0.3`: SlightlyRising
    /// - `-0.1 <= velocity <= 0.1`: Stable
    /// - `-0.3 <= velocity < -0.1`: SlightlyFalling
    /// - `velocity < -0.3`: Falling
    #[must_use]
    pub fn from_velocity(velocity: f64) -> Self {
        if velocity > 0.3 {
            Self::Rising
        } else if velocity > 0.1 {
            Self::SlightlyRising
        } else if velocity >= -0.1 {
            Self::Stable
        } else if velocity >= -0.3 {
            Self::SlightlyFalling
        } else {
            Self::Falling
        }
    }

    /// Arrow shown next to a keyword in the overview
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Rising => "↑↑",
            Self::SlightlyRising => "↑",
            Self::Stable => "→",
            Self::SlightlyFalling => "↓",
            Self::Falling => "↓↓",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Rising => "rising",
            Self::SlightlyRising => "slightly rising",
            Self::Stable => "stable",
            Self::SlightlyFalling => "slightly falling",
            Self::Falling => "falling",
        };
        write!(f, "{label}")
    }
}

/// Velocity of the last `recent_points` values.
///
/// The regression slope is divided by the mean of the same window and clamped
/// to `[-1.0, 1.0]`. An all-zero window has velocity 0.
pub fn velocity(values: &[u8], recent_points: usize) -> TrendResult<f64> {
    let start = values.len().saturating_sub(recent_points.max(2));
    let window = &values[start..];

    if window.len() < 2 {
        return Err(TrendError::InsufficientData(2, window.len()));
    }

    let n = window.len() as f64;
    let sum_x: f64 = (0..window.len()).map(|i| i as f64).sum();
    let sum_y: f64 = window.iter().map(|&v| f64::from(v)).sum();
    let sum_xy: f64 = window
        .iter()
        .enumerate()
        .map(|(i, &v)| i as f64 * f64::from(v))
        .sum();
    let sum_x2: f64 = (0..window.len()).map(|i| (i * i) as f64).sum();

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);

    let mean = sum_y / n;
    Ok(if mean > 0.0 {
        (slope / mean).clamp(-1.0, 1.0)
    } else {
        0.0
    })
}

/// Overview of one keyword's interest column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSummary {
    pub keyword: String,

    /// Number of data points
    pub points: usize,

    pub mean: f64,

    pub peak: u8,

    /// First time the peak was reached
    pub peak_at: DateTime<Utc>,

    pub latest: u8,

    /// Normalized rate of change over the recent window
    pub velocity: f64,

    pub direction: TrendDirection,
}

impl KeywordSummary {
    /// Summarize `keyword` from `interest`
    ///
    /// # Errors
    ///
    /// `KeywordNotFound` when the table has no such column and
    /// `InsufficientData` when it holds fewer than two points
    pub fn from_interest(
        interest: &InterestOverTime,
        keyword: &str,
        recent_points: usize,
    ) -> TrendResult<Self> {
        let values = interest
            .column(keyword)
            .ok_or_else(|| TrendError::KeywordNotFound(keyword.to_string()))?;

        let velocity = velocity(values, recent_points)?;

        // first occurrence of the maximum
        let (peak_index, peak) = values
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0u8), |best, (i, v)| if v > best.1 { (i, v) } else { best });
        let peak_at = interest
            .timestamps
            .get(peak_index)
            .copied()
            .ok_or(TrendError::InsufficientData(peak_index + 1, interest.len()))?;

        let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64;

        Ok(Self {
            keyword: keyword.to_string(),
            points: values.len(),
            mean,
            peak,
            peak_at,
            latest: values.last().copied().unwrap_or(0),
            velocity,
            direction: TrendDirection::from_velocity(velocity),
        })
    }

    /// Percent change between the first and last point, if the first is non-zero
    pub fn percent_change(interest: &InterestOverTime, keyword: &str) -> Option<f64> {
        let values = interest.column(keyword)?;
        let first = f64::from(*values.first()?);
        let last = f64::from(*values.last()?);
        (first > 0.0).then(|| (last - first) / first * 100.0)
    }
}

/// Summaries for every keyword that has enough data, fastest rising first
pub fn summarize(interest: &InterestOverTime, recent_points: usize) -> Vec<KeywordSummary> {
    let mut summaries: Vec<KeywordSummary> = interest
        .keywords()
        .into_iter()
        .filter_map(|keyword| match KeywordSummary::from_interest(interest, keyword, recent_points) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::debug!(keyword = %keyword, error = %e, "Skipping keyword summary");
                None
            }
        })
        .collect();

    summaries.sort_by(|a, b| b.velocity.total_cmp(&a.velocity));
    summaries
}

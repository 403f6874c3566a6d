//! Offline trend backends
//!
//! `sample` produces stable data: the random stream is seeded from a SHA-256
//! digest of the request, so the same keyword, window and region always give
//! the same series. `random` draws from OS entropy and is only useful as
//! placeholder data.

use async_trait::async_trait;
use chrono::{DurationRound, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::{check_query, ProviderResult, TrendDataProvider};
use crate::models::{
    InterestOverTime, Region, RegionInterest, RegionScore, RelationFrame, RelationKind,
    RelationTable, Resolution, Timeframe, TrendQuery,
};

const TOPIC_SUFFIXES: &[&str] = &["technology", "news", "trends", "industry", "research", "market"];

const QUERY_PATTERNS: &[&str] = &[
    "what is {}",
    "{} examples",
    "how does {} work",
    "{} jobs",
    "{} course",
    "best {} tools",
];

/// Subdivisions used for non-country breakdowns
const US_STATES: &[(&str, &str)] = &[
    ("US-CA", "California"),
    ("US-TX", "Texas"),
    ("US-NY", "New York"),
    ("US-WA", "Washington"),
    ("US-FL", "Florida"),
    ("US-IL", "Illinois"),
];

const COMPASS: &[(&str, &str)] = &[
    ("N", "North"),
    ("S", "South"),
    ("E", "East"),
    ("W", "West"),
    ("C", "Central"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Sample,
    Random,
}

/// Backend that fabricates plausible trend data without network access
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    mode: Mode,
}

impl SyntheticProvider {
    /// Deterministic sample data
    pub fn sample() -> Self {
        Self { mode: Mode::Sample }
    }

    /// Unseeded random data
    pub fn random() -> Self {
        Self { mode: Mode::Random }
    }

    fn rng_for(&self, parts: &[&str]) -> ChaCha8Rng {
        match self.mode {
            Mode::Sample => ChaCha8Rng::seed_from_u64(seed_from(parts)),
            Mode::Random => ChaCha8Rng::from_entropy(),
        }
    }
}

/// First eight bytes of the SHA-256 digest of `parts`
fn seed_from(parts: &[&str]) -> u64 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Bounded random walk, rescaled so the peak is exactly 100
fn random_walk<R: Rng>(rng: &mut R, points: usize) -> Vec<u32> {
    let mut level: i32 = rng.gen_range(20..=70);
    let mut walk = Vec::with_capacity(points);
    for _ in 0..points {
        level = (level + rng.gen_range(-8..=8)).clamp(0, 100);
        walk.push(level as u32);
    }

    let peak = walk.iter().copied().max().unwrap_or(0);
    if peak == 0 {
        return walk;
    }
    walk.into_iter().map(|v| v * 100 / peak).collect()
}

fn relation_row(column: &str, text: String, value: u32, formatted: String) -> BTreeMap<String, Value> {
    let mut row = BTreeMap::new();
    row.insert(column.to_string(), Value::String(text));
    row.insert("value".to_string(), Value::from(value));
    row.insert("formattedValue".to_string(), Value::String(formatted));
    row
}

fn candidates(keyword: &str, kind: RelationKind) -> Vec<String> {
    match kind {
        RelationKind::Topics => TOPIC_SUFFIXES
            .iter()
            .map(|suffix| format!("{keyword} {suffix}"))
            .collect(),
        RelationKind::Queries => QUERY_PATTERNS
            .iter()
            .map(|pattern| pattern.replace("{}", keyword))
            .collect(),
    }
}

fn areas(region: Region, resolution: Resolution) -> Vec<(String, String)> {
    if region == Region::Worldwide || resolution == Resolution::Country {
        return Region::all()
            .into_iter()
            .filter(|r| *r != Region::Worldwide)
            .map(|r| (r.code().to_string(), r.name().to_string()))
            .collect();
    }

    if region == Region::UnitedStates {
        return US_STATES
            .iter()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect();
    }

    COMPASS
        .iter()
        .map(|(suffix, direction)| {
            (
                format!("{}-{suffix}", region.code()),
                format!("{direction} {}", region.name()),
            )
        })
        .collect()
}

#[async_trait]
impl TrendDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        match self.mode {
            Mode::Sample => "sample",
            Mode::Random => "random",
        }
    }

    async fn interest_over_time(&self, query: &TrendQuery) -> ProviderResult<InterestOverTime> {
        check_query(query)?;

        let step = query.timeframe.resolution();
        let points = (query.timeframe.span().num_seconds() / step.num_seconds()).max(1) as usize;
        // align to the step so sample timestamps are stable within a window
        let end = Utc::now().duration_trunc(step).unwrap_or_else(|_| Utc::now());

        let series: Vec<Vec<u32>> = query
            .keywords
            .iter()
            .map(|keyword| {
                let mut rng = self.rng_for(&[
                    "interest",
                    keyword,
                    query.timeframe.as_str(),
                    query.region.code(),
                ]);
                random_walk(&mut rng, points)
            })
            .collect();

        let mut interest = InterestOverTime::with_keywords(&query.keywords);
        for i in 0..points {
            let timestamp = end - step * (points - 1 - i) as i32;
            let row: Vec<u32> = series.iter().map(|s| s[i]).collect();
            interest.push_row(timestamp, &query.keywords, &row);
        }

        tracing::debug!(
            provider = self.name(),
            keywords = ?query.keywords,
            rows = interest.len(),
            "Generated synthetic interest"
        );
        Ok(interest)
    }

    async fn related(
        &self,
        keyword: &str,
        kind: RelationKind,
        timeframe: Timeframe,
        region: Region,
    ) -> ProviderResult<RelationTable> {
        check_query(&TrendQuery::new(vec![keyword.to_string()], timeframe, region))?;

        let mut rng = self.rng_for(&[
            "related",
            keyword,
            &kind.to_string(),
            timeframe.as_str(),
            region.code(),
        ]);
        let column = kind.identifying_column();
        let names = candidates(keyword, kind);

        let mut value = 100;
        let top_rows = names
            .iter()
            .map(|name| {
                let row = relation_row(column, name.clone(), value, value.to_string());
                value = value.saturating_sub(rng.gen_range(5..=20)).max(1);
                row
            })
            .collect();

        let mut rising_names = names.clone();
        rising_names.reverse();
        let rising_rows = rising_names
            .into_iter()
            .take(3)
            .map(|name| {
                let growth: u32 = rng.gen_range(50..=5000);
                let formatted = if growth >= 5000 {
                    "Breakout".to_string()
                } else {
                    format!("+{growth}%")
                };
                relation_row(column, name, growth, formatted)
            })
            .collect();

        Ok(RelationTable::new(
            Some(RelationFrame { rows: top_rows }),
            Some(RelationFrame { rows: rising_rows }),
        ))
    }

    async fn interest_by_region(
        &self,
        query: &TrendQuery,
        resolution: Resolution,
    ) -> ProviderResult<RegionInterest> {
        check_query(query)?;

        let resolution = if query.region == Region::Worldwide {
            Resolution::Country
        } else {
            resolution
        };

        let regions = areas(query.region, resolution)
            .into_iter()
            .map(|(geo_code, geo_name)| {
                let scores = query
                    .keywords
                    .iter()
                    .map(|keyword| {
                        let mut rng = self.rng_for(&["region", keyword, &geo_code]);
                        (keyword.clone(), rng.gen_range(0..=100u8))
                    })
                    .collect();
                RegionScore {
                    geo_code,
                    geo_name,
                    scores,
                }
            })
            .collect();

        Ok(RegionInterest {
            resolution,
            regions,
        })
    }
}

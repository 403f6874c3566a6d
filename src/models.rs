// Core data structures shared by the providers, the generator and the CLI

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Relative time window a trends query is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "past-hour")]
    PastHour,
    #[serde(rename = "past-4-hours")]
    PastFourHours,
    #[serde(rename = "past-day")]
    PastDay,
    #[default]
    #[serde(rename = "past-7-days")]
    PastSevenDays,
    #[serde(rename = "past-30-days")]
    PastThirtyDays,
    #[serde(rename = "past-90-days")]
    PastNinetyDays,
    #[serde(rename = "past-12-months")]
    PastTwelveMonths,
    #[serde(rename = "past-5-years")]
    PastFiveYears,
}

impl Timeframe {
    /// Token understood by the trends service (`req.time` field)
    pub fn token(&self) -> &'static str {
        match self {
            Self::PastHour => "now 1-H",
            Self::PastFourHours => "now 4-H",
            Self::PastDay => "now 1-d",
            Self::PastSevenDays => "now 7-d",
            Self::PastThirtyDays => "today 1-m",
            Self::PastNinetyDays => "today 3-m",
            Self::PastTwelveMonths => "today 12-m",
            Self::PastFiveYears => "today 5-y",
        }
    }

    /// Stable identifier used in config files and CLI flags
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PastHour => "past-hour",
            Self::PastFourHours => "past-4-hours",
            Self::PastDay => "past-day",
            Self::PastSevenDays => "past-7-days",
            Self::PastThirtyDays => "past-30-days",
            Self::PastNinetyDays => "past-90-days",
            Self::PastTwelveMonths => "past-12-months",
            Self::PastFiveYears => "past-5-years",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::PastHour => "Past hour",
            Self::PastFourHours => "Past 4 hours",
            Self::PastDay => "Past day",
            Self::PastSevenDays => "Past 7 days",
            Self::PastThirtyDays => "Past 30 days",
            Self::PastNinetyDays => "Past 90 days",
            Self::PastTwelveMonths => "Past 12 months",
            Self::PastFiveYears => "Past 5 years",
        }
    }

    /// Total window covered by the timeframe
    pub fn span(&self) -> Duration {
        match self {
            Self::PastHour => Duration::hours(1),
            Self::PastFourHours => Duration::hours(4),
            Self::PastDay => Duration::days(1),
            Self::PastSevenDays => Duration::days(7),
            Self::PastThirtyDays => Duration::days(30),
            Self::PastNinetyDays => Duration::days(90),
            Self::PastTwelveMonths => Duration::days(365),
            Self::PastFiveYears => Duration::days(5 * 365),
        }
    }

    /// Spacing between data points the service reports for this window
    pub fn resolution(&self) -> Duration {
        match self {
            Self::PastHour | Self::PastFourHours => Duration::minutes(1),
            Self::PastDay => Duration::minutes(8),
            Self::PastSevenDays => Duration::hours(1),
            Self::PastThirtyDays | Self::PastNinetyDays => Duration::days(1),
            Self::PastTwelveMonths | Self::PastFiveYears => Duration::weeks(1),
        }
    }

    /// Parse from identifier, label or service token (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::all().into_iter().find(|tf| {
            needle == tf.as_str()
                || needle == tf.label().to_lowercase()
                || needle == tf.token().to_lowercase()
        })
    }

    /// All supported timeframes, shortest first
    pub fn all() -> Vec<Self> {
        vec![
            Self::PastHour,
            Self::PastFourHours,
            Self::PastDay,
            Self::PastSevenDays,
            Self::PastThirtyDays,
            Self::PastNinetyDays,
            Self::PastTwelveMonths,
            Self::PastFiveYears,
        ]
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Geographic scope of a trends query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Region {
    #[default]
    Worldwide,
    UnitedStates,
    UnitedKingdom,
    Canada,
    Australia,
    India,
    Germany,
    France,
    Japan,
}

impl Region {
    /// Country code sent to the service (empty for worldwide)
    pub fn code(&self) -> &'static str {
        match self {
            Self::Worldwide => "",
            Self::UnitedStates => "US",
            Self::UnitedKingdom => "GB",
            Self::Canada => "CA",
            Self::Australia => "AU",
            Self::India => "IN",
            Self::Germany => "DE",
            Self::France => "FR",
            Self::Japan => "JP",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Worldwide => "Worldwide",
            Self::UnitedStates => "United States",
            Self::UnitedKingdom => "United Kingdom",
            Self::Canada => "Canada",
            Self::Australia => "Australia",
            Self::India => "India",
            Self::Germany => "Germany",
            Self::France => "France",
            Self::Japan => "Japan",
        }
    }

    /// Parse from country code or display name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        if needle.is_empty() || needle == "ww" || needle == "world" {
            return Some(Self::Worldwide);
        }
        Self::all()
            .into_iter()
            .find(|r| needle == r.code().to_lowercase() || needle == r.name().to_lowercase())
    }

    /// All supported regions
    pub fn all() -> Vec<Self> {
        vec![
            Self::Worldwide,
            Self::UnitedStates,
            Self::UnitedKingdom,
            Self::Canada,
            Self::Australia,
            Self::India,
            Self::Germany,
            Self::France,
            Self::Japan,
        ]
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which relation table a request is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Topics,
    Queries,
}

impl RelationKind {
    /// Column holding the human readable identifier of each row
    pub fn identifying_column(&self) -> &'static str {
        match self {
            Self::Topics => "topic_title",
            Self::Queries => "query",
        }
    }

    /// Explore widget id carrying this table
    pub fn widget_id(&self) -> &'static str {
        match self {
            Self::Topics => "RELATED_TOPICS",
            Self::Queries => "RELATED_QUERIES",
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Topics => write!(f, "topics"),
            Self::Queries => write!(f, "queries"),
        }
    }
}

/// One subset (`rising` or `top`) of a relation table
///
/// Rows are loosely typed: besides the identifying column the service
/// reports numeric values, formatted values, links and topic metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationFrame {
    pub rows: Vec<BTreeMap<String, Value>>,
}

impl RelationFrame {
    /// Build a frame holding a single text column
    pub fn from_texts<I, S>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = values
            .into_iter()
            .map(|v| {
                let mut row = BTreeMap::new();
                row.insert(column.to_string(), Value::String(v.into()));
                row
            })
            .collect();
        Self { rows }
    }

    /// Values of `column` in row order, skipping rows without it
    pub fn text_column(&self, column: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| match row.get(column)? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Names of all columns present in any row
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for key in self.rows.iter().flat_map(|row| row.keys()) {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Topics or queries associated with a keyword, split into `rising` and `top`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationTable {
    pub top: Option<RelationFrame>,
    pub rising: Option<RelationFrame>,
}

impl RelationTable {
    pub fn new(top: Option<RelationFrame>, rising: Option<RelationFrame>) -> Self {
        Self { top, rising }
    }

    /// Candidate identifiers for article slots.
    ///
    /// The `top` subset wins whenever its identifying column yields anything;
    /// `rising` is only consulted as a fallback.
    pub fn candidates(&self, column: &str) -> Vec<String> {
        let top = self
            .top
            .as_ref()
            .map(|frame| frame.text_column(column))
            .unwrap_or_default();
        if !top.is_empty() {
            return top;
        }

        self.rising
            .as_ref()
            .map(|frame| frame.text_column(column))
            .unwrap_or_default()
    }

    /// True when neither subset has any rows
    pub fn is_empty(&self) -> bool {
        self.top.as_ref().map_or(true, RelationFrame::is_empty)
            && self.rising.as_ref().map_or(true, RelationFrame::is_empty)
    }
}

/// Time-indexed interest scores (0-100), one column per keyword
///
/// Every column has exactly one score per timestamp. Keywords keep the order
/// they were first seen in and appear once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterestOverTime {
    pub timestamps: Vec<DateTime<Utc>>,
    #[serde(default)]
    order: Vec<String>,
    pub series: BTreeMap<String, Vec<u8>>,
}

impl InterestOverTime {
    /// Empty table with a column for every distinct keyword
    pub fn with_keywords(keywords: &[String]) -> Self {
        let mut interest = Self::default();
        for keyword in keywords {
            interest.add_column(keyword);
        }
        interest
    }

    fn add_column(&mut self, keyword: &str) {
        if self.series.contains_key(keyword) {
            return;
        }
        // zero-fill so the new column lines up with earlier rows
        self.series.insert(keyword.to_string(), vec![0; self.timestamps.len()]);
        self.order.push(keyword.to_string());
    }

    /// Append one row. `values` are matched to `keywords` by position; a
    /// repeated keyword takes its first value. Missing values become 0 and
    /// values above 100 are clamped.
    pub fn push_row(&mut self, timestamp: DateTime<Utc>, keywords: &[String], values: &[u32]) {
        for keyword in keywords {
            self.add_column(keyword);
        }
        self.timestamps.push(timestamp);

        for (keyword, column) in self.series.iter_mut() {
            let score = keywords
                .iter()
                .position(|k| k == keyword)
                .and_then(|i| values.get(i))
                .copied()
                .unwrap_or(0)
                .min(100) as u8;
            column.push(score);
        }
    }

    /// Scores for one keyword
    pub fn column(&self, keyword: &str) -> Option<&[u8]> {
        self.series.get(keyword).map(Vec::as_slice)
    }

    /// Keywords in column order
    pub fn keywords(&self) -> Vec<&str> {
        if self.order.len() == self.series.len() {
            return self.order.iter().map(String::as_str).collect();
        }
        self.series.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// True when there are no rows
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Granularity of an interest-by-region breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Resolution {
    Country,
    #[default]
    Region,
    City,
    Dma,
}

impl Resolution {
    /// Token understood by the trends service
    pub fn token(&self) -> &'static str {
        match self {
            Self::Country => "COUNTRY",
            Self::Region => "REGION",
            Self::City => "CITY",
            Self::Dma => "DMA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "country" => Some(Self::Country),
            "region" => Some(Self::Region),
            "city" => Some(Self::City),
            "dma" | "metro" => Some(Self::Dma),
            _ => None,
        }
    }
}

/// Interest score of every keyword in one geographic area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionScore {
    pub geo_code: String,
    pub geo_name: String,
    pub scores: BTreeMap<String, u8>,
}

/// Interest broken down by geographic area
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionInterest {
    pub resolution: Resolution,
    pub regions: Vec<RegionScore>,
}

impl RegionInterest {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Areas sorted by descending interest in `keyword`
    pub fn ranked(&self, keyword: &str) -> Vec<(&str, u8)> {
        let mut ranked: Vec<_> = self
            .regions
            .iter()
            .filter_map(|r| r.scores.get(keyword).map(|&s| (r.geo_name.as_str(), s)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// Parameters of one trends request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendQuery {
    pub keywords: Vec<String>,
    pub timeframe: Timeframe,
    pub region: Region,
}

impl TrendQuery {
    pub fn new(keywords: Vec<String>, timeframe: Timeframe, region: Region) -> Self {
        Self {
            keywords,
            timeframe,
            region,
        }
    }

    /// Same window and region, single keyword
    pub fn for_keyword(&self, keyword: &str) -> Self {
        Self {
            keywords: vec![keyword.to_string()],
            timeframe: self.timeframe,
            region: self.region,
        }
    }
}

/// Everything fetched for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendsSnapshot {
    pub query: TrendQuery,
    pub fetched_at: DateTime<Utc>,
    pub interest: InterestOverTime,
    pub related_topics: BTreeMap<String, RelationTable>,
    pub related_queries: BTreeMap<String, RelationTable>,
}

impl TrendsSnapshot {
    /// Related topics for `keyword`, if any were fetched
    pub fn topics_for(&self, keyword: &str) -> Option<&RelationTable> {
        self.related_topics.get(keyword)
    }

    /// Related queries for `keyword`, if any were fetched
    pub fn queries_for(&self, keyword: &str) -> Option<&RelationTable> {
        self.related_queries.get(keyword)
    }
}

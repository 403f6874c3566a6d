//! Live trends backend
//!
//! Talks to the public trends web API the same way the web client does:
//! - prime session cookies with a plain page load
//! - `explore` the comparison to obtain one widget (token + request) per view
//! - fetch each view from its `widgetdata` endpoint
//!
//! Every JSON body starts with an anti-XSSI guard (`)]}'`) that is stripped
//! before parsing. Requests go through a governor rate limiter and are retried
//! with exponential backoff on 429 and 5xx responses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE},
    Client, StatusCode,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use super::{check_query, ProviderResult, TrendDataProvider};
use crate::config::ProviderConfig;
use crate::models::{
    InterestOverTime, Region, RegionInterest, RegionScore, RelationFrame, RelationKind,
    RelationTable, Resolution, Timeframe, TrendQuery,
};
use crate::utils::error::{FetchError, ParseError};
use crate::utils::retry::{with_retry_if, RetryConfig};

const EXPLORE_PATH: &str = "/trends/api/explore";
const MULTILINE_PATH: &str = "/trends/api/widgetdata/multiline";
const RELATED_PATH: &str = "/trends/api/widgetdata/relatedsearches";
const COMPARED_GEO_PATH: &str = "/trends/api/widgetdata/comparedgeo";

const TIMESERIES_WIDGET: &str = "TIMESERIES";
const GEO_MAP_WIDGET: &str = "GEO_MAP";

const USER_AGENT: &str = concat!("trendscribe/", env!("CARGO_PKG_VERSION"));

/// Trends backend speaking the web client's JSON API
pub struct GoogleTrendsProvider {
    /// HTTP client with cookie store, compression and timeouts
    client: Client,

    /// Rate limiter shared by every request this provider sends
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    retry: RetryConfig,

    /// Service root, without trailing slash
    base_url: String,

    host_language: String,

    tz_offset: i32,

    /// Set once the cookie priming request succeeded
    primed: AtomicBool,
}

impl GoogleTrendsProvider {
    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for a malformed base URL and
    /// `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        Self::with_base_url(&config.base_url, config)
    }

    /// Create a provider that sends every request to `base_url` (mock servers)
    pub fn with_base_url(base_url: &str, config: &ProviderConfig) -> ProviderResult<Self> {
        url::Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        if let Ok(language) = HeaderValue::from_str(&config.host_language) {
            headers.insert(ACCEPT_LANGUAGE, language);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .gzip(true)
            .cookie_store(true)
            .build()
            .map_err(FetchError::from)?;

        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            retry: RetryConfig::new(config.max_retries, config.backoff_ms),
            base_url: base_url.trim_end_matches('/').to_string(),
            host_language: config.host_language.clone(),
            tz_offset: config.tz_offset,
            primed: AtomicBool::new(false),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn locale_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("hl", self.host_language.clone()),
            ("tz", self.tz_offset.to_string()),
        ]
    }

    /// Load the landing page once so the cookie store holds a session cookie.
    /// Failure is logged and retried on the next call.
    async fn prime_cookies(&self) {
        if self.primed.load(Ordering::Acquire) {
            return;
        }

        let geo = self
            .host_language
            .rsplit('-')
            .next()
            .unwrap_or_default()
            .to_uppercase();

        self.rate_limiter.until_ready().await;
        match self
            .client
            .get(self.endpoint("/"))
            .query(&[("geo", geo.as_str())])
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                self.primed.store(true, Ordering::Release);
                debug!(geo = %geo, "Primed session cookies");
            }
            Ok(response) => {
                warn!(status = response.status().as_u16(), "Cookie priming rejected");
            }
            Err(e) => {
                warn!(error = %e, "Cookie priming failed");
            }
        }
    }

    /// One rate-limited GET. Non-success statuses become errors.
    async fn send_once(&self, url: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { FetchError::Timeout } else { FetchError::Http(e) })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.text().await?);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            Err(FetchError::RateLimit)
        } else {
            Err(FetchError::ServerError(status.as_u16()))
        }
    }

    /// GET `path` with retries and decode the guarded JSON body
    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> ProviderResult<Value> {
        let url = self.endpoint(path);
        let body = with_retry_if(&self.retry, || self.send_once(&url, params), FetchError::is_recoverable)
            .await?;

        Ok(parse_payload(&body)?)
    }

    /// Run an explore request for the comparison and return its widgets
    async fn explore(
        &self,
        keywords: &[String],
        timeframe: Timeframe,
        region: Region,
    ) -> ProviderResult<Vec<Widget>> {
        self.prime_cookies().await;

        let items: Vec<Value> = keywords
            .iter()
            .map(|keyword| {
                json!({
                    "keyword": keyword,
                    "time": timeframe.token(),
                    "geo": region.code(),
                })
            })
            .collect();
        let request = json!({ "comparisonItem": items, "category": 0, "property": "" });

        let mut params = self.locale_params();
        params.push(("req", request.to_string()));

        let payload = self.get_json(EXPLORE_PATH, &params).await?;
        let explore: ExploreResponse = serde_json::from_value(payload).map_err(ParseError::from)?;

        debug!(
            keywords = ?keywords,
            widgets = explore.widgets.len(),
            "Explore request completed"
        );
        Ok(explore.widgets)
    }

    async fn widget_data(&self, path: &str, widget: &Widget, request: &Value) -> ProviderResult<Value> {
        if widget.token.is_empty() {
            return Err(ParseError::UnexpectedShape(format!("widget {} has no token", widget.id)).into());
        }

        let mut params = self.locale_params();
        params.push(("req", request.to_string()));
        params.push(("token", widget.token.clone()));
        self.get_json(path, &params).await
    }
}

#[async_trait]
impl TrendDataProvider for GoogleTrendsProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn interest_over_time(&self, query: &TrendQuery) -> ProviderResult<InterestOverTime> {
        check_query(query)?;

        let widgets = self
            .explore(&query.keywords, query.timeframe, query.region)
            .await?;
        let widget = find_widget(&widgets, TIMESERIES_WIDGET)?;
        let payload = self
            .widget_data(MULTILINE_PATH, widget, &widget.request)
            .await?;

        let interest = parse_timeline(payload, &query.keywords)?;
        info!(
            keywords = ?query.keywords,
            timeframe = query.timeframe.as_str(),
            region = query.region.code(),
            rows = interest.len(),
            "Fetched interest over time"
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
        let keywords = vec![keyword.to_string()];
        check_query(&TrendQuery::new(keywords.clone(), timeframe, region))?;

        let widgets = self.explore(&keywords, timeframe, region).await?;
        let widget = find_widget(&widgets, kind.widget_id())?;
        let payload = self
            .widget_data(RELATED_PATH, widget, &widget.request)
            .await?;

        let table = parse_related(payload)?;
        debug!(
            keyword = %keyword,
            kind = %kind,
            top = table.top.as_ref().map_or(0, RelationFrame::len),
            rising = table.rising.as_ref().map_or(0, RelationFrame::len),
            "Fetched related table"
        );
        Ok(table)
    }

    async fn interest_by_region(
        &self,
        query: &TrendQuery,
        resolution: Resolution,
    ) -> ProviderResult<RegionInterest> {
        check_query(query)?;

        // worldwide comparisons only break down by country
        let resolution = if query.region == Region::Worldwide {
            Resolution::Country
        } else {
            resolution
        };

        let widgets = self
            .explore(&query.keywords, query.timeframe, query.region)
            .await?;
        let widget = find_widget(&widgets, GEO_MAP_WIDGET)?;

        let mut request = widget.request.clone();
        if let Some(fields) = request.as_object_mut() {
            fields.insert("resolution".to_string(), json!(resolution.token()));
            fields.insert("includeLowSearchVolumeGeos".to_string(), json!(true));
        }

        let payload = self.widget_data(COMPARED_GEO_PATH, widget, &request).await?;
        let interest = parse_geo(payload, &query.keywords, resolution)?;
        info!(
            keywords = ?query.keywords,
            resolution = resolution.token(),
            areas = interest.regions.len(),
            "Fetched interest by region"
        );
        Ok(interest)
    }
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Clone, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    request: Value,
}

/// Widget ids carry a suffix when several keywords are compared
fn find_widget<'a>(widgets: &'a [Widget], id: &str) -> Result<&'a Widget, ParseError> {
    widgets
        .iter()
        .find(|w| w.id == id || w.id.starts_with(&format!("{id}_")))
        .ok_or_else(|| ParseError::WidgetNotFound(id.to_string()))
}

/// Remove the `)]}'` guard (and the comma some endpoints add after it)
pub(crate) fn strip_xssi_prefix(body: &str) -> &str {
    let body = body.trim_start();
    body.strip_prefix(")]}'")
        .map(|rest| rest.trim_start_matches(',').trim_start())
        .unwrap_or(body)
}

pub(crate) fn parse_payload(body: &str) -> Result<Value, ParseError> {
    Ok(serde_json::from_str(strip_xssi_prefix(body))?)
}

#[derive(Debug, Deserialize)]
struct TimelinePayload {
    default: TimelineData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineData {
    #[serde(default)]
    timeline_data: Vec<TimelinePoint>,
}

/// Partial (still-collecting) points are kept; their flag is not exposed
#[derive(Debug, Deserialize)]
struct TimelinePoint {
    time: String,
    #[serde(default)]
    value: Vec<u32>,
}

fn parse_timeline(payload: Value, keywords: &[String]) -> Result<InterestOverTime, ParseError> {
    let payload: TimelinePayload = serde_json::from_value(payload)?;
    let mut interest = InterestOverTime::with_keywords(keywords);

    for point in payload.default.timeline_data {
        let seconds: i64 = point
            .time
            .parse()
            .map_err(|_| ParseError::InvalidTimestamp(point.time.clone()))?;
        let timestamp: DateTime<Utc> = DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| ParseError::InvalidTimestamp(point.time.clone()))?;
        interest.push_row(timestamp, keywords, &point.value);
    }

    Ok(interest)
}

#[derive(Debug, Deserialize)]
struct RelatedPayload {
    default: RankedLists,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedLists {
    #[serde(default)]
    ranked_list: Vec<RankedList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedList {
    #[serde(default)]
    ranked_keyword: Vec<Map<String, Value>>,
}

/// `rankedList[0]` is the top subset, `rankedList[1]` the rising one.
/// Empty subsets are reported as absent.
fn parse_related(payload: Value) -> Result<RelationTable, ParseError> {
    let payload: RelatedPayload = serde_json::from_value(payload)?;
    let mut lists = payload.default.ranked_list.into_iter();

    let top = lists.next().and_then(ranked_frame);
    let rising = lists.next().and_then(ranked_frame);
    Ok(RelationTable::new(top, rising))
}

fn ranked_frame(list: RankedList) -> Option<RelationFrame> {
    if list.ranked_keyword.is_empty() {
        return None;
    }

    let rows = list.ranked_keyword.into_iter().map(flatten_row).collect();
    Some(RelationFrame { rows })
}

/// Lift nested `topic: {mid, title, type}` into `topic_mid`, `topic_title`, `topic_type`
fn flatten_row(row: Map<String, Value>) -> BTreeMap<String, Value> {
    let mut flat = BTreeMap::new();
    for (key, value) in row {
        match value {
            Value::Object(nested) if key == "topic" => {
                for (field, inner) in nested {
                    flat.insert(format!("topic_{field}"), inner);
                }
            }
            other => {
                flat.insert(key, other);
            }
        }
    }
    flat
}

#[derive(Debug, Deserialize)]
struct GeoPayload {
    default: GeoData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoData {
    #[serde(default)]
    geo_map_data: Vec<GeoEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoEntry {
    #[serde(default)]
    geo_code: String,
    #[serde(default)]
    geo_name: String,
    #[serde(default)]
    value: Vec<u32>,
}

fn parse_geo(
    payload: Value,
    keywords: &[String],
    resolution: Resolution,
) -> Result<RegionInterest, ParseError> {
    let payload: GeoPayload = serde_json::from_value(payload)?;

    let regions = payload
        .default
        .geo_map_data
        .into_iter()
        .map(|entry| RegionScore {
            scores: keywords
                .iter()
                .enumerate()
                .map(|(i, k)| (k.clone(), entry.value.get(i).copied().unwrap_or(0).min(100) as u8))
                .collect(),
            geo_code: entry.geo_code,
            geo_name: entry.geo_name,
        })
        .collect();

    Ok(RegionInterest { resolution, regions })
}

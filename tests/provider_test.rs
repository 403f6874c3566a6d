//! Integration tests for the trends backends using wiremock
//!
//! These tests validate the live backend's request flow (cookie priming,
//! explore, widget data) and the service's failure handling against mock
//! servers.

mod common;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use trendscribe::models::{Region, RelationKind, Resolution, Timeframe, TrendQuery};
use trendscribe::provider::{
    FetchOperation, GoogleTrendsProvider, ProviderError, SyntheticProvider, TrendDataProvider,
    TrendsService,
};
use trendscribe::utils::error::{FetchError, ParseError};
use trendscribe::utils::split_keywords;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{fast_provider_config, mount_explore, mount_widget};

fn query(keywords: &[&str]) -> TrendQuery {
    TrendQuery::new(
        keywords.iter().map(|k| k.to_string()).collect(),
        Timeframe::PastSevenDays,
        Region::UnitedStates,
    )
}

fn provider(server: &MockServer) -> GoogleTrendsProvider {
    GoogleTrendsProvider::new(&fast_provider_config(&server.uri())).unwrap()
}

/// Test interest over time through explore and multiline
#[tokio::test]
async fn test_interest_over_time() {
    let server = MockServer::start().await;
    mount_explore(&server).await;
    mount_widget(
        &server,
        "multiline",
        "ts-token",
        &json!({
            "default": {
                "timelineData": [
                    {"time": "1700000000", "formattedTime": "Nov 14", "value": [10, 55]},
                    {"time": "1700003600", "formattedTime": "Nov 14", "value": [20, 100], "isPartial": true}
                ]
            }
        }),
    )
    .await;

    let interest = provider(&server)
        .interest_over_time(&query(&["AI", "machine learning"]))
        .await
        .unwrap();

    assert_eq!(interest.len(), 2);
    assert_eq!(interest.column("AI"), Some(&[10u8, 20][..]));
    assert_eq!(interest.column("machine learning"), Some(&[55u8, 100][..]));
    assert_eq!(interest.timestamps[0].timestamp(), 1_700_000_000);
}

/// Test related topics are split into top and rising with flattened topic fields
#[tokio::test]
async fn test_related_topics() {
    let server = MockServer::start().await;
    mount_explore(&server).await;
    mount_widget(
        &server,
        "relatedsearches",
        "topics-token",
        &json!({
            "default": {
                "rankedList": [
                    {"rankedKeyword": [
                        {"topic": {"mid": "/m/0mkz", "title": "Artificial intelligence", "type": "Field of study"},
                         "value": 100, "formattedValue": "100"},
                        {"topic": {"mid": "/m/01", "title": "ChatGPT", "type": "Software"},
                         "value": 40, "formattedValue": "40"}
                    ]},
                    {"rankedKeyword": [
                        {"topic": {"mid": "/m/02", "title": "Gemini", "type": "Software"},
                         "value": 5000, "formattedValue": "Breakout"}
                    ]}
                ]
            }
        }),
    )
    .await;

    let table = provider(&server)
        .related("AI", RelationKind::Topics, Timeframe::PastSevenDays, Region::UnitedStates)
        .await
        .unwrap();

    assert_eq!(
        table.candidates("topic_title"),
        vec!["Artificial intelligence", "ChatGPT"]
    );
    let rising = table.rising.unwrap();
    assert_eq!(rising.text_column("topic_title"), vec!["Gemini"]);
    assert_eq!(rising.text_column("formattedValue"), vec!["Breakout"]);
}

/// Test an empty top list falls back to the rising list
#[tokio::test]
async fn test_related_queries_without_top() {
    let server = MockServer::start().await;
    mount_explore(&server).await;
    mount_widget(
        &server,
        "relatedsearches",
        "queries-token",
        &json!({
            "default": {
                "rankedList": [
                    {"rankedKeyword": []},
                    {"rankedKeyword": [{"query": "ai art", "value": 350, "formattedValue": "+350%"}]}
                ]
            }
        }),
    )
    .await;

    let table = provider(&server)
        .related("AI", RelationKind::Queries, Timeframe::PastSevenDays, Region::UnitedStates)
        .await
        .unwrap();

    assert!(table.top.is_none());
    assert_eq!(table.candidates("query"), vec!["ai art"]);
}

/// Test worldwide region breakdown is requested per country
#[tokio::test]
async fn test_interest_by_region_worldwide() {
    let server = MockServer::start().await;
    mount_explore(&server).await;
    mount_widget(
        &server,
        "comparedgeo",
        "geo-token",
        &json!({
            "default": {
                "geoMapData": [
                    {"geoCode": "US", "geoName": "United States", "value": [80]},
                    {"geoCode": "IN", "geoName": "India", "value": [100]}
                ]
            }
        }),
    )
    .await;

    let query = TrendQuery::new(vec!["AI".into()], Timeframe::PastSevenDays, Region::Worldwide);
    let regions = provider(&server)
        .interest_by_region(&query, Resolution::City)
        .await
        .unwrap();

    assert_eq!(regions.resolution, Resolution::Country);
    assert_eq!(regions.ranked("AI"), vec![("India", 100), ("United States", 80)]);

    let requests = server.received_requests().await.unwrap();
    let geo_request = requests
        .iter()
        .find(|r| r.url.path().ends_with("/comparedgeo"))
        .unwrap();
    let req = geo_request
        .url
        .query_pairs()
        .find(|(k, _)| k == "req")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert!(req.contains("\"resolution\":\"COUNTRY\""));
}

/// Test rate limited responses are retried
#[tokio::test]
async fn test_rate_limit_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_explore(&server).await;
    mount_widget(
        &server,
        "multiline",
        "ts-token",
        &json!({"default": {"timelineData": [{"time": "1700000000", "value": [42]}]}}),
    )
    .await;

    let interest = provider(&server).interest_over_time(&query(&["AI"])).await;
    assert!(interest.is_ok(), "Should succeed after retries: {:?}", interest.err());
}

/// Test 404 does not retry
#[tokio::test]
async fn test_404_no_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider(&server).interest_over_time(&query(&["AI"])).await;
    assert!(matches!(
        result,
        Err(ProviderError::Fetch(FetchError::ServerError(404)))
    ));
}

/// Test retries give up after the configured attempts
#[tokio::test]
async fn test_max_retries_exceeded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let result = provider(&server).interest_over_time(&query(&["AI"])).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().is_recoverable());
}

/// Test a missing widget is a parse error
#[tokio::test]
async fn test_missing_widget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .respond_with(ResponseTemplate::new(200).set_body_string(")]}'\n{\"widgets\": []}"))
        .mount(&server)
        .await;

    let result = provider(&server).interest_over_time(&query(&["AI"])).await;
    assert!(matches!(
        result,
        Err(ProviderError::Parse(ParseError::WidgetNotFound(_)))
    ));
}

/// Test cookie priming failure does not stop the request flow
#[tokio::test]
async fn test_priming_failure_is_not_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::explore_body()))
        .mount(&server)
        .await;
    mount_widget(
        &server,
        "multiline",
        "ts-token",
        &json!({"default": {"timelineData": []}}),
    )
    .await;

    let interest = provider(&server)
        .interest_over_time(&query(&["AI"]))
        .await
        .unwrap();
    assert!(interest.is_empty());
}

/// Test too many keywords are rejected before any request
#[tokio::test]
async fn test_too_many_keywords() {
    let server = MockServer::start().await;

    let result = provider(&server)
        .interest_over_time(&query(&["a", "b", "c", "d", "e", "f"]))
        .await;
    assert!(matches!(result, Err(ProviderError::InvalidQuery(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

/// Test the service turns every failure into empty results and issues
#[tokio::test]
async fn test_service_failures_become_empty_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let service = TrendsService::new(Arc::new(provider(&server)), Duration::from_secs(5));
    let query = query(&["AI", "machine learning"]);

    assert!(service.interest_over_time(&query).await.is_empty());

    let topics = service.related_topics(&query).await;
    assert_eq!(topics.len(), 2);
    assert!(topics.values().all(|t| t.is_empty()));

    let report = service.fetch_all(&query).await;
    assert!(!report.is_complete());
    // one interest issue plus one per keyword for each relation kind
    assert_eq!(report.issues.len(), 5);
    assert_eq!(report.issues[0].operation, FetchOperation::InterestOverTime);
}

/// Test the service enforces its deadline
#[tokio::test]
async fn test_service_timeout() {
    let server = MockServer::start().await;
    mount_explore(&server).await;

    Mock::given(method("GET"))
        .and(path("/trends/api/widgetdata/multiline"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let service = TrendsService::new(Arc::new(provider(&server)), Duration::from_millis(300));
    let interest = service.interest_over_time(&query(&["AI"])).await;
    assert!(interest.is_empty());
}

/// Test the sample backend is deterministic per query
#[tokio::test]
async fn test_sample_provider_is_deterministic() {
    let provider = SyntheticProvider::sample();
    let query = query(&["AI"]);

    let first = provider.interest_over_time(&query).await.unwrap();
    let second = provider.interest_over_time(&query).await.unwrap();
    assert_eq!(first.column("AI"), second.column("AI"));
    assert_eq!(first.column("AI").unwrap().iter().max(), Some(&100));
}

/// Test repeated keywords are rejected before any request
#[tokio::test]
async fn test_repeated_keywords_rejected() {
    let server = MockServer::start().await;

    let result = provider(&server)
        .interest_over_time(&query(&["AI", "AI"]))
        .await;
    assert!(matches!(result, Err(ProviderError::InvalidQuery(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

/// Test a keyword list typed twice yields one aligned column
#[tokio::test]
async fn test_split_keywords_feed_one_column_per_keyword() {
    let keywords = split_keywords("AI, AI, data science");
    let query = TrendQuery::new(keywords, Timeframe::PastSevenDays, Region::UnitedStates);

    let interest = SyntheticProvider::sample()
        .interest_over_time(&query)
        .await
        .unwrap();

    assert_eq!(interest.keywords(), vec!["AI", "data science"]);
    for keyword in interest.keywords() {
        assert_eq!(interest.column(keyword).unwrap().len(), interest.len());
    }
}

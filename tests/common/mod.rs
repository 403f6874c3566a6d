//! Common test utilities

use serde_json::{json, Value};
use trendscribe::config::ProviderConfig;
use trendscribe::models::{RelationFrame, RelationTable};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Provider settings that keep mock-server tests fast
#[allow(dead_code)]
pub fn fast_provider_config(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        base_url: base_url.to_string(),
        requests_per_second: 1000,
        backoff_ms: 1,
        max_retries: 2,
        request_timeout_secs: 5,
        ..ProviderConfig::default()
    }
}

/// Related table holding only the identifying column
#[allow(dead_code)]
pub fn relation_table(column: &str, top: &[&str], rising: &[&str]) -> RelationTable {
    fn frame(column: &str, values: &[&str]) -> Option<RelationFrame> {
        (!values.is_empty()).then(|| RelationFrame::from_texts(column, values.iter().copied()))
    }
    RelationTable::new(frame(column, top), frame(column, rising))
}

/// Body with the anti-XSSI guard the live service prepends
#[allow(dead_code)]
pub fn guarded(body: &Value) -> String {
    format!(")]}}'\n{body}")
}

#[allow(dead_code)]
pub fn widget(id: &str, token: &str) -> Value {
    json!({
        "id": id,
        "token": token,
        "request": { "widget": id, "restriction": { "geo": {} } }
    })
}

/// Explore response listing one widget of every kind
#[allow(dead_code)]
pub fn explore_body() -> String {
    guarded(&json!({
        "widgets": [
            widget("TIMESERIES", "ts-token"),
            widget("GEO_MAP", "geo-token"),
            widget("RELATED_TOPICS", "topics-token"),
            widget("RELATED_QUERIES", "queries-token"),
        ]
    }))
}

/// Mount the cookie priming page and the explore endpoint
#[allow(dead_code)]
pub async fn mount_explore(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .respond_with(ResponseTemplate::new(200).set_body_string(explore_body()))
        .mount(server)
        .await;
}

/// Mount a widget data endpoint answering requests carrying `token`
#[allow(dead_code)]
pub async fn mount_widget(server: &MockServer, endpoint: &str, token: &str, payload: &Value) {
    Mock::given(method("GET"))
        .and(path(format!("/trends/api/widgetdata/{endpoint}")))
        .and(query_param("token", token))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(")]}}',\n{payload}")))
        .mount(server)
        .await;
}

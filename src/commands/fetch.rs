use anyhow::Result;
use serde_json::Value;

use trendscribe::analytics::{summarize, KeywordSummary, DEFAULT_RECENT_POINTS};
use trendscribe::config::Config;
use trendscribe::models::{RelationFrame, RelationKind, RelationTable, Resolution, TrendsSnapshot};
use trendscribe::storage::ArticleWriter;
use trendscribe::utils::truncate_text;

use super::{build_query, build_service};

/// Rows shown per relation subset
const ROWS_PER_SUBSET: usize = 5;

pub struct FetchParams {
    pub keywords: String,
    pub timeframe: String,
    pub region: String,
    pub by_region: Option<String>,
    pub save_snapshot: bool,
    pub csv: bool,
}

pub async fn fetch(config: Config, params: FetchParams) -> Result<()> {
    let query = build_query(&params.keywords, &params.timeframe, &params.region)?;
    let service = build_service(&config)?;

    println!("Fetching Search Trends");
    println!("======================");
    println!("Keywords:  {}", query.keywords.join(", "));
    println!("Timeframe: {}", query.timeframe);
    println!("Region:    {}", query.region.name());
    println!("Backend:   {}", service.provider_name());

    let report = service.fetch_all(&query).await;
    for issue in &report.issues {
        println!("Warning: error fetching {issue}");
    }

    print_overview(&report.snapshot);

    for keyword in &query.keywords {
        print_relations(keyword, RelationKind::Topics, report.snapshot.topics_for(keyword));
        print_relations(keyword, RelationKind::Queries, report.snapshot.queries_for(keyword));
    }

    if let Some(resolution) = params.by_region.as_deref() {
        let resolution = Resolution::parse(resolution).unwrap_or_default();
        let regions = service.interest_by_region(&query, resolution).await;

        for keyword in &query.keywords {
            println!("\nInterest by area for '{keyword}'");
            let ranked = regions.ranked(keyword);
            if ranked.is_empty() {
                println!("  (no data)");
            }
            for (name, score) in ranked.into_iter().take(10) {
                println!("  {name:<24} {score:>3}");
            }
        }
    }

    if params.save_snapshot || params.csv {
        let writer = ArticleWriter::new(&config.output.dir, false)?;
        if params.save_snapshot {
            let path = writer.save_snapshot(&report.snapshot)?;
            println!("\nSnapshot saved to {}", path.display());
        }
        if params.csv {
            let path = writer.save_interest_csv(&report.snapshot.interest)?;
            println!("Interest data saved to {}", path.display());
        }
    }

    Ok(())
}

fn print_overview(snapshot: &TrendsSnapshot) {
    println!("\nInterest Over Time");
    println!("------------------");

    if snapshot.interest.is_empty() {
        println!("No interest data available for these keywords.");
        return;
    }

    println!(
        "{:<24} {:>5} {:>5} {:>7} {:>8}  Trend",
        "Keyword", "Peak", "Now", "Mean", "Change"
    );
    for summary in summarize(&snapshot.interest, DEFAULT_RECENT_POINTS) {
        let change = KeywordSummary::percent_change(&snapshot.interest, &summary.keyword)
            .map_or_else(|| "n/a".to_string(), |c| format!("{c:+.0}%"));

        println!(
            "{:<24} {:>5} {:>5} {:>7.1} {:>8}  {} {}",
            truncate_text(&summary.keyword, 24),
            summary.peak,
            summary.latest,
            summary.mean,
            change,
            summary.direction.symbol(),
            summary.direction
        );
    }
    println!(
        "{} data points from {} to {}",
        snapshot.interest.len(),
        snapshot
            .interest
            .timestamps
            .first()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
        snapshot
            .interest
            .timestamps
            .last()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    );
}

fn print_relations(keyword: &str, kind: RelationKind, table: Option<&RelationTable>) {
    println!("\nRelated {kind} for '{keyword}'");

    let Some(table) = table.filter(|t| !t.is_empty()) else {
        println!("  No related {kind} found.");
        return;
    };

    let column = kind.identifying_column();
    print_subset("Top", table.top.as_ref(), column);
    print_subset("Rising", table.rising.as_ref(), column);
}

fn print_subset(label: &str, frame: Option<&RelationFrame>, column: &str) {
    let Some(frame) = frame.filter(|f| !f.is_empty()) else {
        return;
    };

    println!("  {label}:");
    for row in frame.rows.iter().take(ROWS_PER_SUBSET) {
        let name = row.get(column).map(cell_text).unwrap_or_default();
        let value = row
            .get("formattedValue")
            .or_else(|| row.get("value"))
            .map(cell_text)
            .unwrap_or_default();
        println!("    {:<40} {value}", truncate_text(&name, 40));
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

use super::read_file;
use crate::argparse::SearchArgs;
use anyhow::{Context, Result};
use tabular::{Row, Table};
use tm_filter::{parse_canonical, render_tree, SearchRequest, SearchResponse, StrategyRegistry};
use tm_search::{Config, SearchClient};
use tracing::{info, warn};

pub async fn handle_search_command(
    args: SearchArgs,
    registry: &StrategyRegistry,
    config: &Config,
) -> Result<()> {
    let payload = read_file(&args.file)?;
    let mut request = paged_request(&payload, args.page, args.per_page, config.search.per_page)?;
    request.filter_tree = registry.normalize(&request.filter_tree);

    info!(
        "Searching {} (page {}): {}",
        config.backend.endpoint,
        request.page,
        render_tree(&request.filter_tree)
    );

    let client = SearchClient::new(&config.backend)?;
    match client.search(&request).await? {
        Some(response) => print!("{}", results_table(&response)),
        None => warn!("Search was superseded by a newer one"),
    }
    Ok(())
}

/// Paging comes from the flags first, then the payload, then `default_per_page`.
pub(crate) fn paged_request(
    payload: &str,
    page: Option<u32>,
    per_page: Option<u32>,
    default_per_page: u32,
) -> Result<SearchRequest> {
    let mut request = parse_canonical(payload).context("Invalid query payload")?;
    let payload_sets_per_page = serde_json::from_str::<serde_json::Value>(payload)
        .map(|value| value.get("per_page").is_some_and(|v| !v.is_null()))
        .unwrap_or(false);

    if let Some(page) = page {
        request.page = page;
    }
    request.per_page = match per_page {
        Some(per_page) => per_page,
        None if payload_sets_per_page => request.per_page,
        None => default_per_page,
    };
    Ok(request)
}

pub(crate) fn results_table(response: &SearchResponse) -> String {
    let mut table = Table::new("{:>}  {:<}  {:<}  {:<}  {:<}  {:>}").with_row(Row::from_cells(
        ["Serial", "Mark", "Status", "Filed", "Registered", "Score"]
            .iter()
            .cloned(),
    ));
    for hit in &response.results {
        table.add_row(
            Row::new()
                .with_cell(hit.serial_number)
                .with_cell(&hit.mark_identification)
                .with_cell(&hit.status_code)
                .with_cell(hit.filing_date.as_deref().unwrap_or("-"))
                .with_cell(hit.registration_date.as_deref().unwrap_or("-"))
                .with_cell(
                    hit.combined_score
                        .map(|score| format!("{:.1}", score))
                        .unwrap_or_else(|| "-".to_string()),
                ),
        );
    }

    let pagination = &response.pagination;
    format!(
        "{}\nPage {} of {} ({} results)\n",
        table.to_string().trim_end_matches('\n'),
        pagination.current_page,
        pagination.total_pages,
        pagination.total_results
    )
}

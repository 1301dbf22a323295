use tabled::Table;

use crate::{cli, error, types::ElementTableRow, warning};

pub async fn search(query: &str, types: &[String], limit: u32) {
    let client = cli::connect().await;

    let pb = cli::spinner(&format!("Searching for '{}'...", query));
    let result = client.search(query, types, limit, 0).await;
    pb.finish_and_clear();

    let hits = match result {
        Ok(hits) => hits,
        Err(e) => error!("Search failed. Err: {}", e),
    };

    if hits.is_empty() {
        warning!("No results for '{}'", query);
        return;
    }

    let rows: Vec<ElementTableRow> = hits
        .iter()
        .map(|element| ElementTableRow {
            kind: element.kind().to_string(),
            name: element.cached_name().unwrap_or_default(),
            uri: element.uri().to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));
}

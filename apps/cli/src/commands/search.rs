//! Open Library search. Public, no credential involved.

use pageturner_sync::OpenLibraryClient;

use super::print_json;
use crate::error::CliResult;
use crate::state::AppState;

pub async fn run(state: &AppState, query: &str, json: bool) -> CliResult<()> {
    let library = OpenLibraryClient::new(&state.config)?;
    let docs = library.search(query).await?;
    if json {
        print_json(&docs);
        return Ok(());
    }

    if docs.is_empty() {
        println!("No results for \"{}\".", query.trim());
    }
    for doc in &docs {
        let year = doc
            .first_publish_year
            .map(|y| format!(" ({y})"))
            .unwrap_or_default();
        println!("{}{year}", doc.title);
        println!("    {}", doc.authors());
        if let Some(cover) = library.cover_url(doc) {
            println!("    {cover}");
        }
    }
    Ok(())
}

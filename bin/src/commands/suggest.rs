use crate::{cli::OutputFormat, headless::HeadlessProvider};
use anyhow::Result;
use civmap::{Config, Coordinate, Suggestion, SuggestionEngine};
use serde::Serialize;
use std::{path::Path, sync::Arc, time::Duration};

const POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Serialize)]
struct SuggestionRow {
    name: String,
    description: String,
    coords: Coordinate,
}

impl From<Suggestion> for SuggestionRow {
    fn from(suggestion: Suggestion) -> Self {
        Self {
            name: suggestion.name,
            description: suggestion.description,
            coords: suggestion.coords,
        }
    }
}

/// Type `query` into a fresh engine and wait for its answer.
pub async fn lookup(
    config: &Config,
    provider: Arc<HeadlessProvider>,
    query: &str,
) -> Vec<Suggestion> {
    let engine = SuggestionEngine::new(provider, config.suggest_settings());
    engine.set_query(query);
    while engine.is_pending() {
        tokio::time::sleep(POLL).await;
    }
    engine.suggestions()
}

pub async fn handle(
    config: &Config,
    query: &str,
    gazetteer: &Path,
    format: OutputFormat,
) -> Result<()> {
    let provider = Arc::new(HeadlessProvider::load(gazetteer)?);
    let suggestions = lookup(config, provider, query).await;

    match format {
        OutputFormat::Json => {
            let rows: Vec<SuggestionRow> = suggestions.into_iter().map(Into::into).collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        },
        OutputFormat::Text => {
            if suggestions.is_empty() {
                println!("No suggestions for {query:?}");
            }
            for (index, suggestion) in suggestions.iter().enumerate() {
                println!("{}. {} {}", index + 1, suggestion.name, suggestion.coords);
                if !suggestion.description.is_empty() {
                    println!("   {}", suggestion.description);
                }
            }
        },
    }
    Ok(())
}

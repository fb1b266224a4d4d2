use crate::cli::OutputFormat;
use anyhow::Result;
use civmap::MarkerStore;
use std::path::Path;

pub fn handle(markers: &Path, format: OutputFormat) -> Result<()> {
    let store = MarkerStore::load_json(markers)?;
    let stats = store.stats();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            println!("Total:       {}", stats.total);
            println!("Moderation:  {}", stats.pending);
            println!("In progress: {}", stats.in_progress);
            println!("Resolved:    {}", stats.resolved);
            for entry in &stats.by_category {
                println!("  {:<10} {:>4} {:>3}%", entry.category.label(), entry.count, entry.percent);
            }
        },
    }
    Ok(())
}

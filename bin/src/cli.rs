use civmap::Category;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line interface configuration
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file, instead of the discovered or built-in one
    #[arg(long, global = true, env = "CIVMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file or directory
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up address suggestions as the address field would
    Suggest {
        /// Text typed into the address field
        query: String,

        /// JSON gazetteer answering the lookups
        #[arg(long)]
        gazetteer: PathBuf,
    },

    /// Draw a marker file onto a headless map and list the placemarks
    Render {
        /// JSON marker file
        #[arg(long)]
        markers: PathBuf,

        /// Only show these categories (repeatable)
        #[arg(long = "category", value_parser = parse_category)]
        categories: Vec<Category>,
    },

    /// Dashboard statistics for a marker file
    Stats {
        /// JSON marker file
        #[arg(long)]
        markers: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_category(label: &str) -> Result<Category, String> {
    label.parse().map_err(|e: civmap::Error| e.to_string())
}

use clap::Parser;
use civmap::Config;
use civmap_bin::{
    cli::{Cli, Command},
    commands,
};
use civmap_log::LogConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log = civmap_log::init(LogConfig {
        log_file_path: cli.log_file.clone(),
    })
    .map_err(|e| eprintln!("Warning: Failed to initialize logging: {e}"))
    .ok();

    let result = run(cli).await;

    // Flush the log file before exiting.
    drop(log);
    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let discovered = Config::discover();
    let config = Config::load_with_overrides(cli.config.as_deref(), discovered.as_deref())?;

    match cli.command {
        Command::Suggest { query, gazetteer } => {
            commands::suggest::handle(&config, &query, &gazetteer, cli.format).await
        },
        Command::Render {
            markers,
            categories,
        } => commands::render::handle(&config, &markers, &categories, cli.format).await,
        Command::Stats { markers } => commands::stats::handle(&markers, cli.format),
    }
}

use crate::{cli::OutputFormat, headless::HeadlessProvider};
use anyhow::{Context, Result};
use civmap::{Category, Config, Coordinate, MapView, MarkerStore, Placemark};
use serde::Serialize;
use std::{path::Path, sync::Arc};

#[derive(Debug, Serialize)]
struct PlacemarkRow {
    title: String,
    category: String,
    status: String,
    icon_color: String,
    status_color: String,
    position: Coordinate,
    author: String,
    date: String,
    image: Option<String>,
}

impl From<Placemark> for PlacemarkRow {
    fn from(placemark: Placemark) -> Self {
        let balloon = placemark.balloon;
        Self {
            title: balloon.title,
            category: balloon.category,
            status: balloon.status,
            icon_color: placemark.icon_color.to_string(),
            status_color: balloon.status_color.to_string(),
            position: placemark.position,
            author: balloon.author,
            date: balloon.date.to_string(),
            image: balloon.image,
        }
    }
}

/// Mount a headless map with the markers of `categories` (all if empty) and
/// return what ended up drawn on it.
pub async fn draw(
    config: &Config,
    store: &MarkerStore,
    categories: &[Category],
) -> Result<Vec<Placemark>> {
    let provider = Arc::new(HeadlessProvider::new(Vec::new()));
    let map = MapView::new(provider.clone(), config)?;

    map.set_markers(store.filtered(categories));
    map.mount()?;
    map.mounted().await;

    let surface = provider.surface().context("map surface was not created")?;
    let placemarks = surface.placemarks();
    map.teardown();
    Ok(placemarks)
}

pub async fn handle(
    config: &Config,
    markers: &Path,
    categories: &[Category],
    format: OutputFormat,
) -> Result<()> {
    let store = MarkerStore::load_json(markers)?;
    let placemarks = draw(config, &store, categories).await?;

    match format {
        OutputFormat::Json => {
            let rows: Vec<PlacemarkRow> = placemarks.into_iter().map(Into::into).collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        },
        OutputFormat::Text => {
            for placemark in &placemarks {
                let balloon = &placemark.balloon;
                println!(
                    "{} {} [{}] {} ({}, {})",
                    placemark.icon_color,
                    placemark.position,
                    balloon.category,
                    balloon.title,
                    balloon.status,
                    balloon.date
                );
            }
            println!("{} placemarks", placemarks.len());
        },
    }
    Ok(())
}

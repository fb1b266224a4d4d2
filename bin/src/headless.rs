//! A [`MapProvider`] with no widget behind it.
//!
//! Geocoding answers from a JSON gazetteer and the surface only records what
//! would have been drawn, so the map core can run from a terminal.

use anyhow::Context as _;
use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use civmap::{
    CenterTransition, Coordinate, GeoObject, MapProvider, MapSurface, Placemark, SurfaceOptions,
};
use parking_lot::Mutex;
use serde::Deserialize;
use std::{path::Path, sync::Arc};

/// One known address.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GazetteerEntry {
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    pub coords: Coordinate,
}

pub struct HeadlessProvider {
    gazetteer: Vec<GazetteerEntry>,
    surface: Mutex<Option<Arc<HeadlessSurface>>>,
}

impl HeadlessProvider {
    pub fn new(gazetteer: Vec<GazetteerEntry>) -> Self {
        Self {
            gazetteer,
            surface: Mutex::new(None),
        }
    }

    /// Read a JSON array of [`GazetteerEntry`].
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read gazetteer: {}", path.display()))?;
        let entries: Vec<GazetteerEntry> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse gazetteer: {}", path.display()))?;
        tracing::debug!(entries = entries.len(), "gazetteer loaded");
        Ok(Self::new(entries))
    }

    /// The surface handed out by the last `create_surface`.
    pub fn surface(&self) -> Option<Arc<HeadlessSurface>> {
        self.surface.lock().clone()
    }
}

#[async_trait]
impl MapProvider for HeadlessProvider {
    async fn ready(&self) {}

    fn create_surface(&self, options: &SurfaceOptions) -> civmap::Result<Arc<dyn MapSurface>> {
        let surface = Arc::new(HeadlessSurface::new(options.center));
        *self.surface.lock() = Some(surface.clone());
        Ok(surface)
    }

    /// Case-insensitive substring match against the address, in file order.
    async fn geocode(&self, query: &str, max_results: usize) -> civmap::Result<Vec<GeoObject>> {
        let needle = query.to_lowercase();
        Ok(self
            .gazetteer
            .iter()
            .filter(|entry| entry.address.to_lowercase().contains(&needle))
            .take(max_results)
            .map(|entry| GeoObject {
                address_line: entry.address.clone(),
                description: entry.description.clone(),
                coords: entry.coords,
            })
            .collect())
    }
}

pub struct HeadlessSurface {
    inner: Mutex<SurfaceInner>,
}

struct SurfaceInner {
    center: Coordinate,
    placemarks: Vec<Placemark>,
    settle: Vec<Sender<Coordinate>>,
    destroyed: bool,
}

impl HeadlessSurface {
    fn new(center: Coordinate) -> Self {
        Self {
            inner: Mutex::new(SurfaceInner {
                center,
                placemarks: Vec::new(),
                settle: Vec::new(),
                destroyed: false,
            }),
        }
    }

    pub fn placemarks(&self) -> Vec<Placemark> {
        self.inner.lock().placemarks.clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.lock().destroyed
    }
}

impl MapSurface for HeadlessSurface {
    fn center(&self) -> Coordinate {
        self.inner.lock().center
    }

    fn set_center(&self, center: Coordinate, transition: CenterTransition) {
        tracing::info!(%center, duration = ?transition.duration, "center moved");
        self.inner.lock().center = center;
    }

    fn add_placemark(&self, placemark: Placemark) {
        self.inner.lock().placemarks.push(placemark);
    }

    fn remove_all(&self) {
        self.inner.lock().placemarks.clear();
    }

    fn set_updating(&self, updating: bool) {
        tracing::trace!(updating, "surface dimmed");
    }

    fn subscribe_settle(&self) -> Receiver<Coordinate> {
        let (tx, rx) = async_channel::unbounded();
        self.inner.lock().settle.push(tx);
        rx
    }

    fn destroy(&self) {
        let mut inner = self.inner.lock();
        inner.destroyed = true;
        for sender in inner.settle.drain(..) {
            sender.close();
        }
    }
}

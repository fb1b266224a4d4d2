//! The composed map: viewport, placemarks and address suggestions.
//!
//! [`MapView`] wires the three parts together the way the page uses them:
//! the viewport owns the surface, the render synchronizer draws onto it once
//! it exists, and picking an address suggestion re-centers the viewport.

use crate::{
    config::Config,
    coords::Coordinate,
    error::Result,
    event::{EventBus, MapEvent},
    marker::Marker,
    provider::MapProvider,
    render_sync::RenderSynchronizer,
    suggest::{Suggestion, SuggestionEngine},
    viewport::{ViewportController, ViewportState},
};
use async_channel::Receiver;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct MapView {
    provider: Arc<dyn MapProvider>,
    viewport: Arc<ViewportController>,
    renderer: Arc<RenderSynchronizer>,
    suggestions: SuggestionEngine,
    events: EventBus,
    /// Waits for the library and activates the viewport
    mounting: Mutex<Option<JoinHandle<()>>>,
    /// Set by teardown. Activation plus attach and the whole of teardown
    /// run under this lock, so neither interleaves with the other.
    torn_down: Arc<Mutex<bool>>,
}

impl MapView {
    pub fn new(provider: Arc<dyn MapProvider>, config: &Config) -> Result<Self> {
        let events = EventBus::new();
        Ok(Self {
            viewport: Arc::new(ViewportController::new(
                config.viewport.center,
                config.viewport_settings(),
                events.clone(),
            )),
            renderer: Arc::new(RenderSynchronizer::new(
                config.placemark_style()?,
                config.fade_delay(),
            )),
            suggestions: SuggestionEngine::new(provider.clone(), config.suggest_settings()),
            provider,
            events,
            mounting: Mutex::new(None),
            torn_down: Arc::new(Mutex::new(false)),
        })
    }

    /// Start mounting. Returns immediately; the surface appears once the
    /// provider is ready, and the current markers are drawn onto it then.
    ///
    /// Must be called within a tokio runtime.
    pub fn mount(&self) -> Result<()> {
        self.viewport.begin_mount()?;

        let provider = self.provider.clone();
        let viewport = self.viewport.clone();
        let renderer = self.renderer.clone();
        let torn_down = self.torn_down.clone();
        let task = tokio::spawn(async move {
            provider.ready().await;
            let torn_down = torn_down.lock();
            if *torn_down {
                return;
            }
            match viewport.activate(provider.as_ref()) {
                Ok(Some(surface)) => renderer.attach(surface),
                Ok(None) => {},
                Err(e) => tracing::warn!("failed to create map surface: {e}"),
            }
        });
        *self.mounting.lock() = Some(task);
        Ok(())
    }

    /// Wait for an in-progress [`Self::mount`] to finish.
    pub async fn mounted(&self) {
        let task = self.mounting.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    pub fn subscribe(&self) -> Receiver<MapEvent> {
        self.events.subscribe()
    }

    /// Replace the marker list wholesale.
    pub fn set_markers(&self, markers: Arc<[Marker]>) {
        self.renderer.set_markers(markers);
    }

    /// See [`ViewportController::request_center`].
    pub fn request_center(&self, center: Coordinate) -> bool {
        self.viewport.request_center(center)
    }

    /// See [`SuggestionEngine::set_query`].
    pub fn set_query(&self, query: impl Into<String>) {
        self.suggestions.set_query(query);
    }

    /// Pick the suggestion at `index`: fill the address field with it and
    /// re-center on it.
    pub fn select_suggestion(&self, index: usize) -> Option<Suggestion> {
        let suggestion = self.suggestions.select(index)?;
        self.viewport.request_center(suggestion.coords);
        self.events.publish(MapEvent::SuggestionSelected {
            name: suggestion.name.clone(),
            coords: suggestion.coords,
        });
        Some(suggestion)
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.suggestions.suggestions()
    }

    /// Current text of the address field.
    pub fn query(&self) -> String {
        self.suggestions.query()
    }

    pub fn center(&self) -> Coordinate {
        self.viewport.center()
    }

    pub fn state(&self) -> ViewportState {
        self.viewport.state()
    }

    /// Whether the map is dimmed for a pending placemark refresh.
    pub fn is_updating(&self) -> bool {
        self.renderer.is_updating()
    }

    /// Placemarks drawn by the last refresh.
    pub fn rendered(&self) -> usize {
        self.renderer.rendered()
    }

    /// Unmount: cancel every timer and task, then destroy the surface.
    ///
    /// If the surface is being created on another thread, waits for it and
    /// destroys it as well.
    pub fn teardown(&self) {
        let mut torn_down = self.torn_down.lock();
        *torn_down = true;
        if let Some(task) = self.mounting.lock().take() {
            task.abort();
        }
        self.suggestions.clear();
        self.renderer.detach();
        self.viewport.teardown();
    }
}

impl Drop for MapView {
    fn drop(&mut self) {
        self.teardown();
    }
}

//! Fake mapping capability for tests.
//!
//! [`FakeMapProvider`] and [`FakeSurface`] record every call made through the
//! [`MapProvider`] and [`MapSurface`] traits and let tests script readiness,
//! geocoder answers and response latency, so timing-sensitive behavior can be
//! asserted deterministically under a paused tokio clock.

use crate::{
    coords::{Bounds, Coordinate},
    error::{Error, Result},
    marker::{Category, Marker, MarkerId, Status},
    provider::{CenterTransition, GeoObject, MapProvider, MapSurface, Placemark, SurfaceOptions},
};
use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};
use tokio::sync::watch;

/// Build a coordinate from literals known to be finite.
pub fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).expect("test coordinates are finite")
}

/// Envelope roughly covering the Tyoply Stan district.
pub fn district_bounds() -> Bounds {
    Bounds::new(coord(55.60, 37.46), coord(55.66, 37.56))
}

/// A pending report with the given category at `(lat, lon)`.
pub fn marker(id: MarkerId, category: Category, (lat, lon): (f64, f64)) -> Marker {
    Marker {
        id,
        category,
        status: Status::Pending,
        coords: coord(lat, lon),
        title: format!("Отметка {id}"),
        description: "Описание проблемы".to_string(),
        author: "Житель".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 5, 12).expect("valid date"),
        image: None,
        avatar: "https://i.pravatar.cc/48".to_string(),
    }
}

/// Scripted [`MapProvider`] that records its calls.
#[derive(Clone)]
pub struct FakeMapProvider {
    inner: Arc<Mutex<FakeProviderInner>>,
    ready: Arc<watch::Sender<bool>>,
}

#[derive(Default)]
struct FakeProviderInner {
    /// Programmed geocoder answers by exact query
    answers: HashMap<String, Vec<GeoObject>>,
    /// Artificial latency per query
    delays: HashMap<String, Duration>,
    /// Queries that answer with an error
    failing: HashSet<String>,
    /// Every geocode call as (query, max_results)
    geocode_calls: Vec<(String, usize)>,
    /// Every surface handed out, oldest first
    surfaces: Vec<FakeSurface>,
    fail_surface_creation: bool,
    /// Blocks the calling thread inside `create_surface`
    surface_delay: Option<Duration>,
}

impl FakeMapProvider {
    /// A provider whose library is already loaded.
    pub fn ready_now() -> Self {
        let (ready, _) = watch::channel(true);
        Self {
            inner: Arc::new(Mutex::new(FakeProviderInner::default())),
            ready: Arc::new(ready),
        }
    }

    /// Mark the library as still loading until [`Self::announce_ready`].
    pub fn not_ready(self) -> Self {
        self.ready.send_replace(false);
        self
    }

    pub fn announce_ready(&self) {
        self.ready.send_replace(true);
    }

    pub fn with_geocode(
        self,
        query: &str,
        results: Vec<(&str, Option<&str>, (f64, f64))>,
    ) -> Self {
        let objects = results
            .into_iter()
            .map(|(line, description, (lat, lon))| GeoObject {
                address_line: line.to_string(),
                description: description.map(str::to_string),
                coords: coord(lat, lon),
            })
            .collect();
        self.inner.lock().answers.insert(query.to_string(), objects);
        self
    }

    pub fn with_delay(self, query: &str, delay: Duration) -> Self {
        self.inner.lock().delays.insert(query.to_string(), delay);
        self
    }

    pub fn failing_on(self, query: &str) -> Self {
        self.inner.lock().failing.insert(query.to_string());
        self
    }

    pub fn failing_surface_creation(self) -> Self {
        self.inner.lock().fail_surface_creation = true;
        self
    }

    /// Make `create_surface` block its thread for `delay`, like a slow widget.
    pub fn with_surface_delay(self, delay: Duration) -> Self {
        self.inner.lock().surface_delay = Some(delay);
        self
    }

    pub fn geocode_calls(&self) -> Vec<(String, usize)> {
        self.inner.lock().geocode_calls.clone()
    }

    /// The most recently created surface.
    pub fn surface(&self) -> Option<FakeSurface> {
        self.inner.lock().surfaces.last().cloned()
    }

    pub fn surfaces_created(&self) -> usize {
        self.inner.lock().surfaces.len()
    }
}

#[async_trait]
impl MapProvider for FakeMapProvider {
    async fn ready(&self) {
        let mut ready = self.ready.subscribe();
        while !*ready.borrow_and_update() {
            if ready.changed().await.is_err() {
                return;
            }
        }
    }

    fn create_surface(&self, options: &SurfaceOptions) -> Result<Arc<dyn MapSurface>> {
        let delay = self.inner.lock().surface_delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let mut inner = self.inner.lock();
        if inner.fail_surface_creation {
            return Err(Error::provider("surface creation refused"));
        }
        let surface = FakeSurface::new(options.clone());
        inner.surfaces.push(surface.clone());
        Ok(Arc::new(surface))
    }

    async fn geocode(&self, query: &str, max_results: usize) -> Result<Vec<GeoObject>> {
        let delay = {
            let mut inner = self.inner.lock();
            inner
                .geocode_calls
                .push((query.to_string(), max_results));
            inner.delays.get(query).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let inner = self.inner.lock();
        if inner.failing.contains(query) {
            return Err(Error::provider(format!("geocoder rejected {query:?}")));
        }
        Ok(inner.answers.get(query).cloned().unwrap_or_default())
    }
}

/// Recording [`MapSurface`].
#[derive(Clone)]
pub struct FakeSurface {
    inner: Arc<Mutex<FakeSurfaceInner>>,
}

struct FakeSurfaceInner {
    options: SurfaceOptions,
    center: Coordinate,
    placemarks: Vec<Placemark>,
    set_center_calls: Vec<(Coordinate, CenterTransition)>,
    remove_all_calls: usize,
    /// Every value passed to `set_updating`, in order
    updating_history: Vec<bool>,
    settle_subscribers: Vec<Sender<Coordinate>>,
    destroyed: bool,
    /// Drawing and moving calls received after `destroy`
    calls_after_destroy: usize,
}

impl FakeSurfaceInner {
    fn note_call(&mut self) {
        if self.destroyed {
            self.calls_after_destroy += 1;
        }
    }
}

impl FakeSurface {
    fn new(options: SurfaceOptions) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeSurfaceInner {
                center: options.center,
                options,
                placemarks: Vec::new(),
                set_center_calls: Vec::new(),
                remove_all_calls: 0,
                updating_history: Vec::new(),
                settle_subscribers: Vec::new(),
                destroyed: false,
                calls_after_destroy: 0,
            })),
        }
    }

    /// Simulate the user dragging the map to `center` and letting go.
    pub fn user_pan(&self, center: Coordinate) {
        let subscribers = {
            let mut inner = self.inner.lock();
            inner.center = center;
            inner.settle_subscribers.clone()
        };
        for subscriber in subscribers {
            let _ = subscriber.try_send(center);
        }
    }

    pub fn options(&self) -> SurfaceOptions {
        self.inner.lock().options.clone()
    }

    pub fn placemarks(&self) -> Vec<Placemark> {
        self.inner.lock().placemarks.clone()
    }

    pub fn set_center_calls(&self) -> Vec<(Coordinate, CenterTransition)> {
        self.inner.lock().set_center_calls.clone()
    }

    pub fn remove_all_calls(&self) -> usize {
        self.inner.lock().remove_all_calls
    }

    pub fn updating_history(&self) -> Vec<bool> {
        self.inner.lock().updating_history.clone()
    }

    /// Whether the surface is currently dimmed.
    pub fn is_dimmed(&self) -> bool {
        self.inner
            .lock()
            .updating_history
            .last()
            .copied()
            .unwrap_or(false)
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.lock().destroyed
    }

    /// Number of drawing or moving calls made on the destroyed surface.
    pub fn calls_after_destroy(&self) -> usize {
        self.inner.lock().calls_after_destroy
    }

    pub fn settle_subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .settle_subscribers
            .iter()
            .filter(|s| !s.is_closed())
            .count()
    }
}

impl MapSurface for FakeSurface {
    fn center(&self) -> Coordinate {
        self.inner.lock().center
    }

    fn set_center(&self, center: Coordinate, transition: CenterTransition) {
        let mut inner = self.inner.lock();
        inner.note_call();
        inner.set_center_calls.push((center, transition));
        inner.center = center;
    }

    fn add_placemark(&self, placemark: Placemark) {
        let mut inner = self.inner.lock();
        inner.note_call();
        inner.placemarks.push(placemark);
    }

    fn remove_all(&self) {
        let mut inner = self.inner.lock();
        inner.note_call();
        inner.remove_all_calls += 1;
        inner.placemarks.clear();
    }

    fn set_updating(&self, updating: bool) {
        let mut inner = self.inner.lock();
        inner.note_call();
        inner.updating_history.push(updating);
    }

    fn subscribe_settle(&self) -> Receiver<Coordinate> {
        let (tx, rx) = async_channel::unbounded();
        self.inner.lock().settle_subscribers.push(tx);
        rx
    }

    fn destroy(&self) {
        let mut inner = self.inner.lock();
        inner.destroyed = true;
        inner.placemarks.clear();
        for subscriber in inner.settle_subscribers.drain(..) {
            subscriber.close();
        }
    }
}

//! Keeps the placemarks on a [`MapSurface`] equal to the current marker list.
//!
//! Every update is a full replace: all placemarks are removed and one is
//! added per marker. The first population happens as soon as a surface is
//! attached. Later updates dim the surface, wait for the fade delay, redraw
//! from the newest list and restore the surface. An update arriving during
//! the fade reschedules the redraw instead of stacking a second one.

use crate::{
    debounce::Debouncer,
    marker::Marker,
    palette::Palette,
    provider::{Balloon, MapSurface, Placemark},
};
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};

/// Turns markers into placemarks.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacemarkStyle {
    pub palette: Palette,
    /// Image shown for reports submitted without a photo.
    pub placeholder_image: Option<String>,
}

impl PlacemarkStyle {
    pub fn placemark(&self, marker: &Marker) -> Placemark {
        Placemark {
            position: marker.coords,
            icon_color: self.palette.category_color(marker.category).clone(),
            balloon: Balloon {
                category: marker.category.label().to_string(),
                status: marker.status.label().to_string(),
                status_color: self.palette.status_color(marker.status).clone(),
                title: marker.title.clone(),
                description: marker.description.clone(),
                author: marker.author.clone(),
                date: marker.date,
                image: marker
                    .image
                    .clone()
                    .or_else(|| self.placeholder_image.clone()),
                avatar: marker.avatar.clone(),
            },
        }
    }
}

pub struct RenderSynchronizer {
    inner: Arc<Mutex<SyncInner>>,
    fade: Debouncer,
}

struct SyncInner {
    style: PlacemarkStyle,
    /// Surface borrowed from the viewport while it is active
    surface: Option<Arc<dyn MapSurface>>,
    /// Newest marker list; the deferred redraw always reads this
    markers: Arc<[Marker]>,
    /// Placemarks drawn by the last redraw
    rendered: usize,
    updating: bool,
}

impl SyncInner {
    fn redraw(&mut self) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        surface.remove_all();
        for marker in self.markers.iter() {
            surface.add_placemark(self.style.placemark(marker));
        }
        self.rendered = self.markers.len();
        tracing::debug!(markers = self.rendered, "placemarks redrawn");
    }

    fn set_updating(&mut self, updating: bool) {
        self.updating = updating;
        if let Some(surface) = &self.surface {
            surface.set_updating(updating);
        }
    }
}

impl RenderSynchronizer {
    pub fn new(style: PlacemarkStyle, fade_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SyncInner {
                style,
                surface: None,
                markers: Arc::from(Vec::new()),
                rendered: 0,
                updating: false,
            })),
            fade: Debouncer::new(fade_delay),
        }
    }

    /// Start drawing onto `surface`, immediately and without a fade.
    pub fn attach(&self, surface: Arc<dyn MapSurface>) {
        self.fade.cancel();
        let mut inner = self.inner.lock();
        inner.surface = Some(surface);
        inner.updating = false;
        inner.redraw();
    }

    /// Replace the marker list.
    ///
    /// Before a surface is attached the list is only stored. Afterwards the
    /// surface is dimmed right away and the redraw is deferred by the fade
    /// delay, superseding any redraw still pending.
    pub fn set_markers(&self, markers: Arc<[Marker]>) {
        {
            let mut inner = self.inner.lock();
            inner.markers = markers;
            if inner.surface.is_none() {
                return;
            }
            inner.set_updating(true);
        }

        let inner = self.inner.clone();
        self.fade.schedule(async move {
            let mut inner = inner.lock();
            inner.redraw();
            inner.set_updating(false);
        });
    }

    /// Stop drawing and release the surface handle.
    ///
    /// Cancels a pending redraw whatever phase the fade is in.
    pub fn detach(&self) {
        self.fade.cancel();
        let mut inner = self.inner.lock();
        if inner.updating {
            inner.set_updating(false);
        }
        inner.surface = None;
    }

    pub fn is_updating(&self) -> bool {
        self.inner.lock().updating
    }

    /// Whether a deferred redraw is scheduled.
    pub fn is_pending(&self) -> bool {
        self.fade.is_pending()
    }

    /// Number of placemarks drawn by the last redraw.
    pub fn rendered(&self) -> usize {
        self.inner.lock().rendered
    }

    pub fn markers(&self) -> Arc<[Marker]> {
        self.inner.lock().markers.clone()
    }
}

//! Single source of truth for the map center.
//!
//! [`ViewportController`] owns the [`MapSurface`] for its whole life:
//!
//! ```text
//! Uninitialized -> AwaitingLibrary -> Active -> TornDown
//!        \________________\_____________________/
//! ```
//!
//! Application requests flow down to the surface only when they actually move
//! it; settle reports flow up to subscribers and are never written back.

use crate::{
    coords::{Bounds, Coordinate},
    error::{InvalidTransitionSnafu, Result},
    event::{EventBus, MapEvent},
    provider::{CenterTransition, MapProvider, MapSurface, SurfaceOptions},
};
use parking_lot::Mutex;
use snafu::ensure;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportState {
    Uninitialized,
    AwaitingLibrary,
    Active,
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSettings {
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub restrict: Bounds,
    /// Duration of the animated move issued by [`ViewportController::request_center`].
    pub recenter_duration: Duration,
}

pub struct ViewportController {
    settings: ViewportSettings,
    inner: Arc<Mutex<ViewportInner>>,
    events: EventBus,
}

struct ViewportInner {
    state: ViewportState,
    /// Application-held center, refreshed by requests and settle reports
    center: Coordinate,
    surface: Option<Arc<dyn MapSurface>>,
    /// Forwards settle reports while the surface is active
    settle_listener: Option<JoinHandle<()>>,
}

impl ViewportController {
    pub fn new(center: Coordinate, settings: ViewportSettings, events: EventBus) -> Self {
        Self {
            settings,
            inner: Arc::new(Mutex::new(ViewportInner {
                state: ViewportState::Uninitialized,
                center,
                surface: None,
                settle_listener: None,
            })),
            events,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.inner.lock().state
    }

    /// The freshest known center.
    pub fn center(&self) -> Coordinate {
        self.inner.lock().center
    }

    /// The active surface, if any.
    pub fn surface(&self) -> Option<Arc<dyn MapSurface>> {
        self.inner.lock().surface.clone()
    }

    /// Mount and wait for the library, then create the surface.
    ///
    /// Returns `Ok(None)` if the controller was torn down while waiting.
    pub async fn mount(
        &self,
        provider: &dyn MapProvider,
    ) -> Result<Option<Arc<dyn MapSurface>>> {
        self.begin_mount()?;
        provider.ready().await;
        self.activate(provider)
    }

    /// Uninitialized -> AwaitingLibrary.
    pub fn begin_mount(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        ensure!(
            inner.state == ViewportState::Uninitialized,
            InvalidTransitionSnafu {
                from: inner.state,
                to: ViewportState::AwaitingLibrary,
            }
        );
        inner.state = ViewportState::AwaitingLibrary;
        tracing::debug!("viewport awaiting map library");
        Ok(())
    }

    /// AwaitingLibrary -> Active, once the library announced readiness.
    ///
    /// Creates the surface at the current center and starts forwarding its
    /// settle reports. A controller torn down in the meantime stays torn down
    /// and creates nothing.
    ///
    /// Must be called within a tokio runtime.
    pub fn activate(&self, provider: &dyn MapProvider) -> Result<Option<Arc<dyn MapSurface>>> {
        let mut inner = self.inner.lock();
        if inner.state == ViewportState::TornDown {
            tracing::debug!("viewport torn down before the map library was ready");
            return Ok(None);
        }
        ensure!(
            inner.state == ViewportState::AwaitingLibrary,
            InvalidTransitionSnafu {
                from: inner.state,
                to: ViewportState::Active,
            }
        );

        let surface = provider.create_surface(&SurfaceOptions {
            center: inner.center,
            zoom: self.settings.zoom,
            min_zoom: self.settings.min_zoom,
            max_zoom: self.settings.max_zoom,
            restrict: self.settings.restrict,
        })?;

        let settle = surface.subscribe_settle();
        let shared = self.inner.clone();
        let events = self.events.clone();
        inner.settle_listener = Some(tokio::spawn(async move {
            while let Ok(center) = settle.recv().await {
                shared.lock().center = center;
                tracing::trace!(%center, "map settled");
                events.publish(MapEvent::CenterChanged(center));
            }
        }));

        inner.surface = Some(surface.clone());
        inner.state = ViewportState::Active;
        tracing::debug!(center = %inner.center, "map surface active");
        Ok(Some(surface))
    }

    /// Make `center` the application center.
    ///
    /// Moves an active surface only if its reported center differs from
    /// `center` at six fractional digits. Returns whether a move was issued.
    pub fn request_center(&self, center: Coordinate) -> bool {
        // Held while driving the surface so teardown cannot destroy it mid-call.
        let mut inner = self.inner.lock();
        inner.center = center;
        let surface = match (&inner.surface, inner.state) {
            (Some(surface), ViewportState::Active) => surface,
            _ => return false,
        };

        if surface.center().same_position(&center) {
            return false;
        }

        tracing::debug!(%center, "re-centering map");
        surface.set_center(
            center,
            CenterTransition {
                duration: self.settings.recenter_duration,
                check_zoom_range: true,
            },
        );
        true
    }

    /// Enter the terminal state and destroy the surface.
    ///
    /// Idempotent.
    pub fn teardown(&self) {
        let (surface, listener) = {
            let mut inner = self.inner.lock();
            if inner.state == ViewportState::TornDown {
                return;
            }
            inner.state = ViewportState::TornDown;
            (inner.surface.take(), inner.settle_listener.take())
        };

        if let Some(listener) = listener {
            listener.abort();
        }
        if let Some(surface) = surface {
            surface.destroy();
        }
        tracing::debug!("viewport torn down");
    }
}

impl Drop for ViewportController {
    fn drop(&mut self) {
        self.teardown();
    }
}

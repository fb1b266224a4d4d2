//! Map core for the neighbourhood incident-reporting site.
//!
//! Keeps an external map widget in step with the application's report list,
//! turns typed addresses into geocoded suggestions, and holds the single
//! authoritative map center.
//!
//! # Architecture
//!
//! ```text
//! MapProvider trait (injected mapping library)
//!   |
//!   +-- MapView
//!         +-- ViewportController  (owns the MapSurface, center sync)
//!         +-- RenderSynchronizer  (marker list -> placemarks, fade)
//!         +-- SuggestionEngine    (debounced geocoding)
//!
//! MarkerStore -> Arc<[Marker]> -> MapView::set_markers
//! ```
//!
//! Both debounced channels go through one [`Debouncer`]. Tests drive
//! everything through [`test::FakeMapProvider`] under a paused tokio clock.

pub mod config;
pub mod coords;
pub mod debounce;
pub mod error;
pub mod event;
pub mod map_view;
pub mod marker;
pub mod palette;
pub mod provider;
pub mod render_sync;
pub mod store;
pub mod suggest;
pub mod viewport;

#[cfg(any(test, feature = "test-support"))]
pub mod test;

pub use config::Config;
pub use coords::{Bounds, Coordinate};
pub use debounce::Debouncer;
pub use error::{Error, Result};
pub use event::{EventBus, MapEvent};
pub use map_view::MapView;
pub use marker::{Category, Marker, MarkerId, Status};
pub use palette::{Color, Palette};
pub use provider::{
    Balloon, CenterTransition, GeoObject, MapProvider, MapSurface, Placemark, SurfaceOptions,
};
pub use render_sync::{PlacemarkStyle, RenderSynchronizer};
pub use store::{Author, CategoryCount, Draft, MarkerStore, Stats};
pub use suggest::{SuggestSettings, Suggestion, SuggestionEngine};
pub use viewport::{ViewportController, ViewportSettings, ViewportState};

//! Abstractions over the external mapping capability.
//!
//! The [`MapProvider`] trait enables dependency injection: an application
//! wires in whatever mapping library it embeds, while tests use
//! [`FakeMapProvider`](crate::test::FakeMapProvider). Nothing in this crate
//! reaches for a global mapping object.

use crate::{
    coords::{Bounds, Coordinate},
    error::Result,
    palette::Color,
};
use async_channel::Receiver;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::{sync::Arc, time::Duration};

/// Entry point to the external mapping library.
#[async_trait]
pub trait MapProvider: Send + Sync {
    /// Resolves once the library has loaded.
    ///
    /// May never resolve if the library never loads; callers treat that as a
    /// stalled feature rather than an error.
    async fn ready(&self);

    /// Construct a map surface. Only called after [`MapProvider::ready`] resolved.
    fn create_surface(&self, options: &SurfaceOptions) -> Result<Arc<dyn MapSurface>>;

    /// Resolve free text to at most `max_results` addresses.
    async fn geocode(&self, query: &str, max_results: usize) -> Result<Vec<GeoObject>>;
}

/// A live map widget created by a [`MapProvider`].
///
/// Owned by the [`ViewportController`](crate::ViewportController); the render
/// synchronizer borrows a handle between creation and destruction.
pub trait MapSurface: Send + Sync {
    /// Center currently shown by the widget.
    fn center(&self) -> Coordinate;

    /// Move the widget, animated over `transition.duration`.
    fn set_center(&self, center: Coordinate, transition: CenterTransition);

    fn add_placemark(&self, placemark: Placemark);

    fn remove_all(&self);

    /// Dim (`true`) or restore (`false`) the widget during a marker refresh.
    fn set_updating(&self, updating: bool);

    /// Centers reported each time the user finishes panning or zooming.
    fn subscribe_settle(&self) -> Receiver<Coordinate>;

    /// Release every resource held by the widget.
    fn destroy(&self);
}

/// Construction parameters for a [`MapSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOptions {
    pub center: Coordinate,
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Allowed-navigation envelope; clamping is the surface's job.
    pub restrict: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterTransition {
    pub duration: Duration,
    pub check_zoom_range: bool,
}

/// One geocoder hit.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoObject {
    pub address_line: String,
    pub description: Option<String>,
    pub coords: Coordinate,
}

/// Visual primitive drawn for one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub position: Coordinate,
    pub icon_color: Color,
    pub balloon: Balloon,
}

/// Detail content shown when a placemark is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct Balloon {
    pub category: String,
    pub status: String,
    pub status_color: Color,
    pub title: String,
    pub description: String,
    pub author: String,
    pub date: NaiveDate,
    /// Photo, or the configured placeholder when the report has none.
    pub image: Option<String>,
    pub avatar: String,
}

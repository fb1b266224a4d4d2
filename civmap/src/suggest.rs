//! Address autocomplete over the provider's geocoder.
//!
//! [`SuggestionEngine`] records every change of the address field, waits for
//! the typing to settle, then asks the geocoder for candidates. Only the
//! newest request may publish results: each keystroke bumps a generation
//! counter and responses carrying an older generation are dropped.

use crate::{
    coords::Coordinate,
    debounce::Debouncer,
    provider::{GeoObject, MapProvider},
};
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};

/// A candidate address shown under the address field.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub name: String,
    pub description: String,
    pub coords: Coordinate,
}

impl From<GeoObject> for Suggestion {
    fn from(object: GeoObject) -> Self {
        Self {
            name: object.address_line,
            description: object.description.unwrap_or_default(),
            coords: object.coords,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestSettings {
    /// Quiescence window before a query is dispatched.
    pub debounce: Duration,
    /// Queries shorter than this many characters never reach the geocoder.
    pub min_query_chars: usize,
    pub max_results: usize,
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_chars: 3,
            max_results: 5,
        }
    }
}

pub struct SuggestionEngine {
    provider: Arc<dyn MapProvider>,
    settings: SuggestSettings,
    inner: Arc<Mutex<SuggestInner>>,
    dispatch: Debouncer,
}

#[derive(Default)]
struct SuggestInner {
    /// Current text of the address field
    query: String,
    suggestions: Vec<Suggestion>,
    /// Bumped on every change that supersedes outstanding lookups
    generation: u64,
}

impl SuggestionEngine {
    pub fn new(provider: Arc<dyn MapProvider>, settings: SuggestSettings) -> Self {
        Self {
            provider,
            dispatch: Debouncer::new(settings.debounce),
            settings,
            inner: Arc::new(Mutex::new(SuggestInner::default())),
        }
    }

    /// Record a new value of the address field.
    ///
    /// Short queries clear the list before returning. Longer ones restart the
    /// quiescence window; when it elapses the engine waits for the provider to
    /// become ready and geocodes the query.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.query.clone_from(&query);
            if query.chars().count() < self.settings.min_query_chars {
                inner.suggestions.clear();
                None
            } else {
                Some(inner.generation)
            }
        };

        let Some(generation) = generation else {
            self.dispatch.cancel();
            return;
        };

        let provider = self.provider.clone();
        let inner = self.inner.clone();
        let max_results = self.settings.max_results;
        self.dispatch.schedule(async move {
            provider.ready().await;
            tracing::debug!(%query, max_results, "geocoding address query");
            let result = provider.geocode(&query, max_results).await;

            let mut inner = inner.lock();
            if inner.generation != generation {
                tracing::debug!(%query, "dropping superseded geocode response");
                return;
            }
            match result {
                Ok(objects) => {
                    inner.suggestions = objects
                        .into_iter()
                        .take(max_results)
                        .map(Suggestion::from)
                        .collect();
                },
                Err(e) => tracing::warn!(%query, "geocoding failed: {e}"),
            }
        });
    }

    /// Accept the suggestion at `index`.
    ///
    /// Clears the list and replaces the field text with the suggestion's name
    /// without scheduling a lookup for it. The caller re-centers the map on
    /// the returned coordinate.
    pub fn select(&self, index: usize) -> Option<Suggestion> {
        let mut inner = self.inner.lock();
        let suggestion = inner.suggestions.get(index)?.clone();
        inner.generation += 1;
        inner.suggestions.clear();
        inner.query.clone_from(&suggestion.name);
        drop(inner);

        self.dispatch.cancel();
        Some(suggestion)
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.inner.lock().suggestions.clone()
    }

    pub fn query(&self) -> String {
        self.inner.lock().query.clone()
    }

    /// Whether a lookup is waiting out the debounce window or in flight.
    pub fn is_pending(&self) -> bool {
        self.dispatch.is_pending()
    }

    /// Drop the list and any pending or in-flight lookup.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.suggestions.clear();
        drop(inner);

        self.dispatch.cancel();
    }
}

//! In-memory report records and the operations the pages perform on them.
//!
//! The store hands the map a fresh `Arc<[Marker]>` after every change; the
//! map never sees incremental updates.

use crate::{
    coords::Coordinate,
    error::{
        DuplicateMarkerSnafu, EmptyAddressSnafu, MarkerIdsExhaustedSnafu, Result,
        UnknownMarkerSnafu,
    },
    marker::{Category, Marker, MarkerId, Status},
};
use chrono::NaiveDate;
use serde::Serialize;
use snafu::{ensure, OptionExt as _};
use std::{collections::HashSet, path::Path, sync::Arc};

/// What the "new report" form collects.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub address: String,
    pub category: Category,
    pub description: String,
    pub image: Option<String>,
    pub coords: Coordinate,
}

/// Who is submitting.
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
    /// Share of all reports, rounded to a whole percent.
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    /// Accepted and being worked on.
    pub in_progress: usize,
    pub resolved: usize,
    /// Most reported first; categories without reports are omitted.
    pub by_category: Vec<CategoryCount>,
}

#[derive(Debug, Default)]
pub struct MarkerStore {
    markers: Vec<Marker>,
    next_id: MarkerId,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store. Ids must be unique.
    pub fn from_markers(markers: Vec<Marker>) -> Result<Self> {
        let mut seen = HashSet::new();
        for marker in &markers {
            ensure!(seen.insert(marker.id), DuplicateMarkerSnafu { id: marker.id });
        }
        let next_id = match markers.iter().map(|m| m.id).max() {
            Some(max) => following(max)?,
            None => 0,
        };
        Ok(Self { markers, next_id })
    }

    /// Read a JSON array of markers.
    pub fn load_json(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context as _;

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read markers file: {}", path.display()))?;
        let markers: Vec<Marker> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse markers file: {}", path.display()))?;
        Ok(Self::from_markers(markers)?)
    }

    /// File a new report as pending. The address doubles as its title.
    pub fn submit(&mut self, draft: Draft, author: &Author, date: NaiveDate) -> Result<&Marker> {
        let title = draft.address.trim();
        ensure!(!title.is_empty(), EmptyAddressSnafu);
        let next_id = following(self.next_id)?;

        let marker = Marker {
            id: self.next_id,
            category: draft.category,
            status: Status::Pending,
            coords: draft.coords,
            title: title.to_string(),
            description: draft.description,
            author: author.name.clone(),
            date,
            image: draft.image,
            avatar: author.avatar.clone(),
        };
        self.next_id = next_id;
        tracing::info!(id = marker.id, category = %marker.category, "report submitted");

        self.markers.push(marker);
        Ok(&self.markers[self.markers.len() - 1])
    }

    pub fn set_status(&mut self, id: MarkerId, status: Status) -> Result<()> {
        let marker = self
            .markers
            .iter_mut()
            .find(|m| m.id == id)
            .context(UnknownMarkerSnafu { id })?;
        tracing::info!(id, from = %marker.status, to = %status, "report status changed");
        marker.status = status;
        Ok(())
    }

    pub fn remove(&mut self, id: MarkerId) -> Result<Marker> {
        let index = self
            .markers
            .iter()
            .position(|m| m.id == id)
            .context(UnknownMarkerSnafu { id })?;
        tracing::info!(id, "report removed");
        Ok(self.markers.remove(index))
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Everything, for the map.
    pub fn snapshot(&self) -> Arc<[Marker]> {
        Arc::from(self.markers.as_slice())
    }

    /// Markers in any of `active`; an empty filter shows everything.
    pub fn filtered(&self, active: &[Category]) -> Arc<[Marker]> {
        if active.is_empty() {
            return self.snapshot();
        }
        self.markers
            .iter()
            .filter(|m| active.contains(&m.category))
            .cloned()
            .collect()
    }

    /// Reports filed by `author`, newest first.
    pub fn by_author(&self, author: &str) -> Vec<&Marker> {
        let mut reports: Vec<_> = self.markers.iter().filter(|m| m.author == author).collect();
        reports.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        reports
    }

    /// Reports waiting for a moderator.
    pub fn moderation_queue(&self) -> usize {
        self.count_status(Status::Pending)
    }

    pub fn stats(&self) -> Stats {
        let total = self.markers.len();
        let mut by_category: Vec<CategoryCount> = Category::ALL
            .into_iter()
            .map(|category| {
                let count = self.markers.iter().filter(|m| m.category == category).count();
                CategoryCount {
                    category,
                    count,
                    percent: percent(count, total),
                }
            })
            .filter(|c| c.count > 0)
            .collect();
        by_category.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));

        Stats {
            total,
            pending: self.count_status(Status::Pending),
            in_progress: self.count_status(Status::Accepted),
            resolved: self.count_status(Status::Resolved),
            by_category,
        }
    }

    fn count_status(&self, status: Status) -> usize {
        self.markers.iter().filter(|m| m.status == status).count()
    }
}

fn following(id: MarkerId) -> Result<MarkerId> {
    id.checked_add(1).context(MarkerIdsExhaustedSnafu { id })
}

fn percent(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((count * 100 + total / 2) / total) as u8
}

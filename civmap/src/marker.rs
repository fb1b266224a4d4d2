//! Report records shown on the map.

use crate::{
    coords::Coordinate,
    error::{Error, Result},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub type MarkerId = u64;

/// Kind of problem a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Свалка")]
    Dump,
    #[serde(rename = "Яма")]
    Pothole,
    #[serde(rename = "Освещение")]
    Lighting,
    #[serde(rename = "Граффити")]
    Graffiti,
    #[serde(rename = "Парковка")]
    Parking,
    #[serde(rename = "Другое")]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Dump,
        Category::Pothole,
        Category::Lighting,
        Category::Graffiti,
        Category::Parking,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Dump => "Свалка",
            Category::Pothole => "Яма",
            Category::Lighting => "Освещение",
            Category::Graffiti => "Граффити",
            Category::Parking => "Парковка",
            Category::Other => "Другое",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| Error::UnknownCategory {
                label: s.to_string(),
            })
    }
}

/// Moderation workflow: pending -> accepted -> resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "на модерации")]
    Pending,
    #[serde(rename = "принято")]
    Accepted,
    #[serde(rename = "решено")]
    Resolved,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::Accepted, Status::Resolved];

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "на модерации",
            Status::Accepted => "принято",
            Status::Resolved => "решено",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Status::ALL
            .into_iter()
            .find(|st| st.label() == s)
            .ok_or_else(|| Error::UnknownStatus {
                label: s.to_string(),
            })
    }
}

/// A user-submitted report pinned to the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub category: Category,
    pub status: Status,
    pub coords: Coordinate,
    pub title: String,
    pub description: String,
    pub author: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub avatar: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_label() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>().unwrap(), category);
        }
        assert!("Мусор".parse::<Category>().is_err());
    }

    #[test]
    fn status_labels_match_workflow() {
        assert_eq!("на модерации".parse::<Status>().unwrap(), Status::Pending);
        assert_eq!(Status::Resolved.to_string(), "решено");
        assert!("closed".parse::<Status>().is_err());
    }

    #[test]
    fn deserializes_marker_without_image() {
        let json = r#"{
            "id": 1,
            "category": "Свалка",
            "status": "принято",
            "coords": [55.63, 37.51],
            "title": "Мусор у подъезда",
            "description": "Не вывозят неделю",
            "author": "Иван",
            "date": "2024-05-12"
        }"#;

        let marker: Marker = serde_json::from_str(json).unwrap();
        assert_eq!(marker.category, Category::Dump);
        assert_eq!(marker.status, Status::Accepted);
        assert_eq!(marker.image, None);
        assert_eq!(marker.avatar, "");
        assert_eq!(marker.coords.lat(), 55.63);
    }
}

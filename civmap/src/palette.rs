//! Category and status colors used for placemark icons and badges.

use crate::{
    error::{InvalidColorSnafu, Result},
    marker::{Category, Status},
};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::{collections::HashMap, fmt};

/// Accent used when a category has no configured color.
pub const FALLBACK_COLOR: &str = "#1E98FF";

/// A `#RRGGBB` color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let valid = value.len() == 7
            && value.starts_with('#')
            && value[1..].chars().all(|c| c.is_ascii_hexdigit());
        ensure!(valid, InvalidColorSnafu { value });
        Ok(Self(value.to_ascii_uppercase()))
    }

    /// For literals already in canonical form.
    pub(crate) fn from_static(hex: &'static str) -> Self {
        Self(hex.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Color {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self> {
        Color::parse(value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    categories: HashMap<Category, Color>,
    statuses: HashMap<Status, Color>,
    fallback: Color,
}

impl Palette {
    pub fn new(fallback: Color) -> Self {
        Self {
            categories: HashMap::new(),
            statuses: HashMap::new(),
            fallback,
        }
    }

    pub fn with_category(mut self, category: Category, color: Color) -> Self {
        self.categories.insert(category, color);
        self
    }

    pub fn with_status(mut self, status: Status, color: Color) -> Self {
        self.statuses.insert(status, color);
        self
    }

    /// Icon accent for `category`, or the fallback.
    pub fn category_color(&self, category: Category) -> &Color {
        self.categories.get(&category).unwrap_or(&self.fallback)
    }

    /// Badge color for `status`, or the fallback.
    pub fn status_color(&self, status: Status) -> &Color {
        self.statuses.get(&status).unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &Color {
        &self.fallback
    }
}

//! Configuration for the map core, loaded from `config.toml`.
//!
//! # Resolution
//!
//! [`Config::load_with_overrides`] picks the file: CLI override > discovered
//! path (see [`Config::discover`]) > the embedded default. Every key is
//! optional; missing keys take the defaults listed in `civmap/config.toml`.
//!
//! Palette keys are category and status labels (`"Свалка"`, `"решено"`, ...)
//! and are checked when the file is loaded, as is the viewport: zoom limits in
//! order, start zoom between them, start center inside `restrict`.

use crate::{
    coords::{Bounds, Coordinate},
    error::Result as CivmapResult,
    marker::{Category, Status},
    palette::{Color, Palette, FALLBACK_COLOR},
    render_sync::PlacemarkStyle,
    suggest::SuggestSettings,
    viewport::ViewportSettings,
};
use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub suggest: SuggestConfig,
    pub render: RenderConfig,
    pub viewport: ViewportConfig,
    pub palette: PaletteConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestConfig {
    pub debounce_ms: u64,
    pub min_query_chars: usize,
    pub max_results: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Delay between dimming the map and redrawing its placemarks.
    pub fade_delay_ms: u64,
    pub placeholder_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportConfig {
    pub recenter_duration_ms: u64,
    /// Initial application center.
    pub center: Coordinate,
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub restrict: Bounds,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteConfig {
    pub fallback: Color,
    pub categories: HashMap<String, Color>,
    pub statuses: HashMap<String, Color>,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_chars: 3,
            max_results: 5,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fade_delay_ms: 300,
            placeholder_image: Some("https://via.placeholder.com/240x120".to_string()),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            recenter_duration_ms: 500,
            center: Coordinate::new_unchecked(55.6227, 37.5058),
            zoom: 14,
            min_zoom: 13,
            max_zoom: 18,
            restrict: Bounds::new(
                Coordinate::new_unchecked(55.6000, 37.4600),
                Coordinate::new_unchecked(55.6600, 37.5600),
            ),
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let color = Color::from_static;
        let categories = [
            (Category::Dump, "#8B4513"),
            (Category::Pothole, "#F97316"),
            (Category::Lighting, "#EAB308"),
            (Category::Graffiti, "#A855F7"),
            (Category::Parking, "#3B82F6"),
            (Category::Other, "#64748B"),
        ];
        let statuses = [
            (Status::Pending, "#F59E0B"),
            (Status::Accepted, "#3B82F6"),
            (Status::Resolved, "#10B981"),
        ];
        Self {
            fallback: color(FALLBACK_COLOR),
            categories: categories
                .into_iter()
                .map(|(c, hex)| (c.label().to_string(), color(hex)))
                .collect(),
            statuses: statuses
                .into_iter()
                .map(|(s, hex)| (s.label().to_string(), color(hex)))
                .collect(),
        }
    }
}

impl ViewportConfig {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.min_zoom <= self.max_zoom,
            "viewport min_zoom {} is above max_zoom {}",
            self.min_zoom,
            self.max_zoom
        );
        ensure!(
            (self.min_zoom..=self.max_zoom).contains(&self.zoom),
            "viewport zoom {} is outside {}..={}",
            self.zoom,
            self.min_zoom,
            self.max_zoom
        );
        ensure!(
            self.restrict.contains(&self.center),
            "viewport center {} is outside the restrict envelope",
            self.center
        );
        Ok(())
    }
}

impl Config {
    /// Read and deserialize a TOML config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration with priority: CLI override > discovered path > defaults.
    pub fn load_with_overrides(
        cli_override: Option<&Path>,
        discovered_path: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = cli_override {
            return Self::load(path);
        }
        if let Some(path) = discovered_path {
            return Self::load(path);
        }
        Self::load_embedded()
    }

    /// `<config_dir>/civmap/config.toml`, if it exists.
    pub fn discover() -> Option<PathBuf> {
        let path = dirs::config_dir()?.join("civmap").join("config.toml");
        if path.is_file() {
            tracing::info!("using config file {}", path.display());
            Some(path)
        } else {
            tracing::debug!("no config file at {}", path.display());
            None
        }
    }

    fn load_embedded() -> Result<Self> {
        Self::parse(include_str!("../config.toml")).context("Failed to parse embedded config.toml")
    }

    fn parse(source: &str) -> Result<Self> {
        let config: Config = toml::from_str(source)?;
        config.palette()?;
        config.viewport.validate()?;
        Ok(config)
    }

    pub fn suggest_settings(&self) -> SuggestSettings {
        SuggestSettings {
            debounce: Duration::from_millis(self.suggest.debounce_ms),
            min_query_chars: self.suggest.min_query_chars,
            max_results: self.suggest.max_results,
        }
    }

    pub fn viewport_settings(&self) -> ViewportSettings {
        ViewportSettings {
            zoom: self.viewport.zoom,
            min_zoom: self.viewport.min_zoom,
            max_zoom: self.viewport.max_zoom,
            restrict: self.viewport.restrict,
            recenter_duration: Duration::from_millis(self.viewport.recenter_duration_ms),
        }
    }

    pub fn fade_delay(&self) -> Duration {
        Duration::from_millis(self.render.fade_delay_ms)
    }

    /// Resolve the label-keyed palette tables.
    pub fn palette(&self) -> CivmapResult<Palette> {
        let mut palette = Palette::new(self.palette.fallback.clone());
        for (label, color) in &self.palette.categories {
            palette = palette.with_category(label.parse::<Category>()?, color.clone());
        }
        for (label, color) in &self.palette.statuses {
            palette = palette.with_status(label.parse::<Status>()?, color.clone());
        }
        Ok(palette)
    }

    pub fn placemark_style(&self) -> CivmapResult<PlacemarkStyle> {
        Ok(PlacemarkStyle {
            palette: self.palette()?,
            placeholder_image: self.render.placeholder_image.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn embedded_matches_default() {
        let embedded = Config::load_embedded().unwrap();
        assert_eq!(embedded, Config::default());
    }

    #[test]
    fn loads_empty_config() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[suggest]\ndebounce_ms = 150\n\n[viewport]\ncenter = [55.64, 37.52]\n",
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.suggest_settings().debounce, Duration::from_millis(150));
        assert_eq!(config.suggest_settings().max_results, 5);
        assert_eq!(config.viewport.center, Coordinate::new(55.64, 37.52).unwrap());
        assert_eq!(config.viewport.zoom, 14);
    }

    #[test]
    fn errors_on_invalid_toml() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("config.toml");
        std::fs::write(&config_path, "invalid toml {{{{").unwrap();

        let result = Config::load(&config_path);
        assert!(result.unwrap_err().to_string().contains("Failed to parse"));
    }

    #[test]
    fn errors_on_nonexistent_file() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("nonexistent.toml");

        let result = Config::load(&config_path);
        assert!(result.unwrap_err().to_string().contains("Failed to read"));
    }

    #[test]
    fn rejects_unknown_palette_label() {
        let err = Config::parse("[palette.categories]\n\"Мусор\" = \"#000000\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("Мусор"));
    }

    #[test]
    fn rejects_bad_color_and_unknown_fields() {
        assert!(Config::parse("[palette]\nfallback = \"blue\"\n").is_err());
        assert!(Config::parse("[render]\nfade_ms = 10\n").is_err());
    }

    #[test]
    fn rejects_inconsistent_viewport() {
        let err = Config::parse("[viewport]\nmin_zoom = 16\nmax_zoom = 12\n").unwrap_err();
        assert!(err.to_string().contains("min_zoom"));

        let err = Config::parse("[viewport]\nzoom = 19\n").unwrap_err();
        assert!(err.to_string().contains("zoom 19"));

        let err = Config::parse("[viewport]\ncenter = [55.75, 37.61]\n").unwrap_err();
        assert!(err.to_string().contains("restrict"));

        let config = Config::parse("[viewport]\nzoom = 13\nmin_zoom = 13\n").unwrap();
        assert_eq!(config.viewport.zoom, 13);
    }

    #[test]
    fn cli_override_takes_priority() {
        let tmp_dir = tempdir().unwrap();
        let cli_path = tmp_dir.path().join("cli.toml");
        let discovered_path = tmp_dir.path().join("discovered.toml");
        std::fs::write(&cli_path, "[render]\nfade_delay_ms = 100\n").unwrap();
        std::fs::write(&discovered_path, "[render]\nfade_delay_ms = 900\n").unwrap();

        let config = Config::load_with_overrides(Some(&cli_path), Some(&discovered_path)).unwrap();
        assert_eq!(config.fade_delay(), Duration::from_millis(100));

        let config = Config::load_with_overrides(None, Some(&discovered_path)).unwrap();
        assert_eq!(config.fade_delay(), Duration::from_millis(900));
    }

    #[test]
    fn default_palette_covers_every_label() {
        let palette = Config::default().palette().unwrap();
        assert_eq!(palette.category_color(Category::Dump).as_str(), "#8B4513");
        assert_eq!(palette.status_color(Status::Resolved).as_str(), "#10B981");
    }
}

use layers::{AnnotationSides, CountryStyle};
use serde::{Deserialize, Serialize};

/// Source file names resolved against the base data URL when no explicit
/// override is configured.
const COUNTRIES_FILE: &str = "countries-simplified.geojson";
const DISPUTED_FILE: &str = "disputed-lines.geojson";

/// Construction-time configuration for the map component, typically
/// deserialized from the embedding page's dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    pub width: f64,
    pub height: f64,
    /// `(w, h)` aspect ratio; when set, the viewport height is derived
    /// from the width and the configured height is ignored.
    pub aspect: Option<(f64, f64)>,
    pub base_data_url: String,
    pub countries_url: Option<String>,
    pub disputed_url: Option<String>,
    /// Pre-selects and frames this country as soon as data is loaded.
    pub iso: Option<String>,
    /// Suppresses all pointer wiring (hover, click, pan, zoom).
    pub disable_interactivity: bool,
    /// Suppresses only the zoom-gesture binding.
    pub disable_scroll_zoom: bool,
    pub style: CountryStyle,
    pub annotation_sides: AnnotationSides,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 500.0,
            aspect: None,
            base_data_url: "/".to_string(),
            countries_url: None,
            disputed_url: None,
            iso: None,
            disable_interactivity: false,
            disable_scroll_zoom: false,
            style: CountryStyle::default(),
            annotation_sides: AnnotationSides::default(),
        }
    }
}

impl MapOptions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Effective viewport; an aspect ratio forces the height.
    pub fn viewport(&self) -> (f64, f64) {
        match self.aspect {
            Some((aw, ah)) if aw > 0.0 => (self.width, self.width * ah / aw),
            _ => (self.width, self.height),
        }
    }

    pub fn countries_source_url(&self) -> String {
        match &self.countries_url {
            Some(url) => url.clone(),
            None => format!("{}{}", self.normalized_base_url(), COUNTRIES_FILE),
        }
    }

    pub fn disputed_source_url(&self) -> String {
        match &self.disputed_url {
            Some(url) => url.clone(),
            None => format!("{}{}", self.normalized_base_url(), DISPUTED_FILE),
        }
    }

    fn normalized_base_url(&self) -> String {
        if self.base_data_url.ends_with('/') {
            self.base_data_url.clone()
        } else {
            format!("{}/", self.base_data_url)
        }
    }
}

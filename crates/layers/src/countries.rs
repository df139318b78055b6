use formats::{CountryCollection, CountryFeature};
use scene::{Projection, SelectionState};
use serde::{Deserialize, Serialize};

/// Countries below this source area (km²) qualify for point-marker
/// rendering when flagged as small territories.
pub const SMALL_COUNTRY_AREA_KM2: f64 = 20_000.0;
/// Marker radius in unscaled planar units.
pub const MARKER_RADIUS: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryStyle {
    pub default_fill: String,
    pub highlight_fill: String,
}

impl Default for CountryStyle {
    fn default() -> Self {
        Self {
            default_fill: "#F5F3F2".to_string(),
            highlight_fill: "#00A792".to_string(),
        }
    }
}

/// One filled country shape, fill already resolved against highlight state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryPath {
    pub isocode: String,
    pub name: String,
    pub rings: Vec<Vec<[f64; 2]>>,
    pub fill: String,
    pub highlighted: bool,
}

/// Point marker standing in for a small territory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryMarker {
    pub isocode: String,
    pub name: String,
    pub center: [f64; 2],
    pub radius: f64,
    pub fill: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CountrySnapshot {
    pub paths: Vec<CountryPath>,
    pub markers: Vec<CountryMarker>,
    /// Markers stay in the snapshot but should not be drawn while the
    /// camera is zoomed past 1:1.
    pub markers_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountriesLayer {
    pub style: CountryStyle,
}

impl CountriesLayer {
    pub fn new(style: CountryStyle) -> Self {
        Self { style }
    }

    pub fn extract(
        &self,
        countries: &CountryCollection,
        projection: &Projection,
        selection: &SelectionState,
        markers_hidden: bool,
    ) -> CountrySnapshot {
        let mut paths = Vec::new();
        let mut markers = Vec::new();

        for feature in &countries.features {
            if renders_as_marker(feature) {
                markers.push(self.marker_for(feature, projection, selection));
            } else {
                paths.push(self.path_for(feature, projection, selection));
            }
        }

        // A dataset of nothing but small territories still renders shapes.
        if paths.is_empty() && !countries.features.is_empty() {
            paths = countries
                .features
                .iter()
                .map(|f| self.path_for(f, projection, selection))
                .collect();
        }

        CountrySnapshot {
            paths,
            markers,
            markers_hidden,
        }
    }

    fn path_for(
        &self,
        feature: &CountryFeature,
        projection: &Projection,
        selection: &SelectionState,
    ) -> CountryPath {
        let highlighted = self.is_highlighted(feature, selection);
        CountryPath {
            isocode: feature.primary_code().to_string(),
            name: feature.name.clone(),
            rings: projection
                .path_for(&feature.geometry)
                .into_iter()
                .map(|ring| ring.into_iter().map(|v| [v.x, v.y]).collect())
                .collect(),
            fill: self.fill_for(highlighted),
            highlighted,
        }
    }

    fn marker_for(
        &self,
        feature: &CountryFeature,
        projection: &Projection,
        selection: &SelectionState,
    ) -> CountryMarker {
        let highlighted = self.is_highlighted(feature, selection);
        let center = projection.centroid_of(&feature.geometry);
        CountryMarker {
            isocode: feature.primary_code().to_string(),
            name: feature.name.clone(),
            center: [center.x, center.y],
            radius: MARKER_RADIUS,
            fill: self.fill_for(highlighted),
            highlighted,
        }
    }

    fn is_highlighted(&self, feature: &CountryFeature, selection: &SelectionState) -> bool {
        let a2 = feature
            .iso_a2
            .as_deref()
            .is_some_and(|code| selection.is_highlighted(code));
        let a3 = feature
            .iso_a3
            .as_deref()
            .is_some_and(|code| selection.is_highlighted(code));
        a2 || a3
    }

    fn fill_for(&self, highlighted: bool) -> String {
        if highlighted {
            self.style.highlight_fill.clone()
        } else {
            self.style.default_fill.clone()
        }
    }
}

fn renders_as_marker(feature: &CountryFeature) -> bool {
    feature.area_km < SMALL_COUNTRY_AREA_KM2 && feature.small_territory
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geojson::{GeoFeature, Geometry};

/// A country entity from the countries source.
///
/// Source property mapping: `ISO_A2` (optional), `ISO_A3`, `NAME`, `areakm`,
/// `TA6_COUNTRY` (small-territory marker eligibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryFeature {
    pub geometry: Geometry,
    pub iso_a2: Option<String>,
    pub iso_a3: Option<String>,
    pub name: String,
    pub area_km: f64,
    pub small_territory: bool,
}

impl CountryFeature {
    /// Code match used by selection: `iso_a2` first, `iso_a3` fallback.
    pub fn matches_code(&self, code: &str) -> bool {
        if let Some(a2) = &self.iso_a2
            && a2 == code
        {
            return true;
        }
        self.iso_a3.as_deref() == Some(code)
    }

    /// The code carried in outbound notifications.
    pub fn primary_code(&self) -> &str {
        self.iso_a2
            .as_deref()
            .or(self.iso_a3.as_deref())
            .unwrap_or_default()
    }
}

/// Insertion-ordered country collection; order mirrors the source file and
/// carries no meaning beyond duplicate-lookup tie-breaking.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CountryCollection {
    pub features: Vec<CountryFeature>,
}

/// A disputed border from the disputed-lines source. Derived annotation
/// data (centroids, label anchors, leaders) never lives here; it belongs to
/// the per-show overlay snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputedLine {
    pub geometry: Geometry,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisputedCollection {
    pub lines: Vec<DisputedLine>,
}

#[derive(Debug)]
pub enum ModelError {
    MissingProperty { index: usize, key: &'static str },
    InvalidProperty { index: usize, key: &'static str, reason: String },
    MissingIsoCode { index: usize },
    WrongGeometry { index: usize, expected: &'static str },
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::MissingProperty { index, key } => {
                write!(f, "feature {index} is missing property {key}")
            }
            ModelError::InvalidProperty { index, key, reason } => {
                write!(f, "feature {index} has invalid property {key}: {reason}")
            }
            ModelError::MissingIsoCode { index } => {
                write!(f, "feature {index} carries neither ISO_A2 nor ISO_A3")
            }
            ModelError::WrongGeometry { index, expected } => {
                write!(f, "feature {index} must carry {expected} geometry")
            }
        }
    }
}

impl std::error::Error for ModelError {}

impl CountryCollection {
    pub fn from_geo_features(features: Vec<GeoFeature>) -> Result<Self, ModelError> {
        let mut out = Vec::with_capacity(features.len());
        for (index, feature) in features.into_iter().enumerate() {
            out.push(country_from_feature(index, feature)?);
        }
        Ok(Self { features: out })
    }
}

impl DisputedCollection {
    pub fn from_geo_features(features: Vec<GeoFeature>) -> Result<Self, ModelError> {
        let mut out = Vec::with_capacity(features.len());
        for (index, feature) in features.into_iter().enumerate() {
            out.push(disputed_from_feature(index, feature)?);
        }
        Ok(Self { lines: out })
    }
}

fn country_from_feature(index: usize, feature: GeoFeature) -> Result<CountryFeature, ModelError> {
    match feature.geometry {
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => {}
        _ => {
            return Err(ModelError::WrongGeometry {
                index,
                expected: "Polygon or MultiPolygon",
            });
        }
    }

    let iso_a2 = optional_code(feature.properties.get("ISO_A2"));
    let iso_a3 = optional_code(feature.properties.get("ISO_A3"));
    if iso_a2.is_none() && iso_a3.is_none() {
        return Err(ModelError::MissingIsoCode { index });
    }

    let name = feature
        .properties
        .get("NAME")
        .and_then(|v| v.as_str())
        .ok_or(ModelError::MissingProperty { index, key: "NAME" })?
        .to_string();

    let area_km = feature
        .properties
        .get("areakm")
        .and_then(|v| v.as_f64())
        .ok_or(ModelError::MissingProperty {
            index,
            key: "areakm",
        })?;
    if !area_km.is_finite() || area_km < 0.0 {
        return Err(ModelError::InvalidProperty {
            index,
            key: "areakm",
            reason: format!("must be a non-negative number, got {area_km}"),
        });
    }

    let small_territory = feature
        .properties
        .get("TA6_COUNTRY")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    Ok(CountryFeature {
        geometry: feature.geometry,
        iso_a2,
        iso_a3,
        name,
        area_km,
        small_territory,
    })
}

fn disputed_from_feature(index: usize, feature: GeoFeature) -> Result<DisputedLine, ModelError> {
    match feature.geometry {
        Geometry::LineString(_) | Geometry::MultiLineString(_) => {}
        _ => {
            return Err(ModelError::WrongGeometry {
                index,
                expected: "LineString or MultiLineString",
            });
        }
    }

    let label = feature
        .properties
        .get("label")
        .and_then(|v| v.as_str())
        .ok_or(ModelError::MissingProperty {
            index,
            key: "label",
        })?
        .to_string();

    Ok(DisputedLine {
        geometry: feature.geometry,
        label,
    })
}

fn optional_code(value: Option<&Value>) -> Option<String> {
    let code = value?.as_str()?.trim();
    if code.is_empty() {
        return None;
    }
    Some(code.to_string())
}

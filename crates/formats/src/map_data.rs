use std::collections::HashMap;

use crate::geojson::{GeoCollection, GeoJsonError};
use crate::model::{CountryCollection, CountryFeature, DisputedCollection, ModelError};

/// Fetch seam for the two map sources. The transport (HTTP, bundled assets,
/// test fixtures) is the embedder's concern; the loader only needs payload
/// text keyed by URL.
pub trait FeatureSource {
    fn fetch(&self, url: &str) -> Result<String, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub url: String,
    pub reason: String,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to fetch {}: {}", self.url, self.reason)
    }
}

impl std::error::Error for SourceError {}

#[derive(Debug)]
pub enum LoadError {
    Fetch(SourceError),
    Parse { url: String, source: GeoJsonError },
    Model { url: String, source: ModelError },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Fetch(e) => write!(f, "{e}"),
            LoadError::Parse { url, source } => write!(f, "failed to parse {url}: {source}"),
            LoadError::Model { url, source } => write!(f, "invalid data in {url}: {source}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// The loaded map data. Immutable once constructed; consumers hold
/// read-only references.
#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    countries: CountryCollection,
    disputed: DisputedCollection,
}

impl MapData {
    /// Loads both sources, failing fast on the first error. No partial
    /// state escapes: either a complete `MapData` or a single `LoadError`.
    /// Failed loads are not retried.
    pub fn load_all(
        source: &dyn FeatureSource,
        countries_url: &str,
        disputed_url: &str,
    ) -> Result<Self, LoadError> {
        let countries_payload = source.fetch(countries_url).map_err(LoadError::Fetch)?;
        let disputed_payload = source.fetch(disputed_url).map_err(LoadError::Fetch)?;

        let countries_raw =
            GeoCollection::from_geojson_str(&countries_payload).map_err(|e| LoadError::Parse {
                url: countries_url.to_string(),
                source: e,
            })?;
        let disputed_raw =
            GeoCollection::from_geojson_str(&disputed_payload).map_err(|e| LoadError::Parse {
                url: disputed_url.to_string(),
                source: e,
            })?;

        let countries = CountryCollection::from_geo_features(countries_raw.features).map_err(
            |e| LoadError::Model {
                url: countries_url.to_string(),
                source: e,
            },
        )?;
        let disputed = DisputedCollection::from_geo_features(disputed_raw.features).map_err(
            |e| LoadError::Model {
                url: disputed_url.to_string(),
                source: e,
            },
        )?;

        Ok(Self {
            countries,
            disputed,
        })
    }

    pub fn countries(&self) -> &CountryCollection {
        &self.countries
    }

    pub fn disputed(&self) -> &DisputedCollection {
        &self.disputed
    }

    /// Iso-code lookup: per feature, `iso_a2` is checked before `iso_a3`.
    /// Source data is expected to keep codes unique; if it does not, the
    /// first feature in collection order wins.
    pub fn find_by_iso_code(&self, code: &str) -> Option<&CountryFeature> {
        self.countries
            .features
            .iter()
            .find(|f| f.matches_code(code))
    }
}

/// In-memory source keyed by URL, for tests and bundled-asset embeddings.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    payloads: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, payload: impl Into<String>) {
        self.payloads.insert(url.into(), payload.into());
    }
}

impl FeatureSource for MemorySource {
    fn fetch(&self, url: &str) -> Result<String, SourceError> {
        self.payloads.get(url).cloned().ok_or_else(|| SourceError {
            url: url.to_string(),
            reason: "no payload registered".to_string(),
        })
    }
}

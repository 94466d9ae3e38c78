use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteInput {
    pub postcode: String,
    pub required_height_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindEstimate {
    pub speed_ms: f64,
    pub pressure_kpa: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub position: LatLon,
    pub display_label: String,
}

/// 正向地理編碼的候選結果
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCandidate {
    pub position: LatLon,
    pub display_label: String,
}

/// 反向地理編碼只取郵遞區號
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReverseAddress {
    pub postcode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FenceOption {
    pub id: String,
    pub name: String,
    pub capacity_kpa: f64,
    pub max_height_m: f64,
    pub image_ref: String,
}

/// Chosen catalog ids, kept in catalog-id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the id ends up selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// User-visible reason shown under the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location not found.")]
    NotFound,
    #[error("Could not fetch map location.")]
    FetchFailed,
    #[error("Could not load map library.")]
    MapUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    Click(LatLon),
    MarkerDragEnd(LatLon),
}

impl MapEvent {
    pub fn position(&self) -> LatLon {
        match self {
            MapEvent::Click(at) | MapEvent::MarkerDragEnd(at) => *at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

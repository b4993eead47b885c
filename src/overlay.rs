//! Published overlay artifact and its GeoJSON contract.

use crate::geo::{GeoPoint, Instant};
use crate::terminator::{Hemisphere, NightPolygon};
use serde::Serialize;

/// Night polygon tagged with the instant it was computed for. Never mutated
/// once built; the scheduler replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySnapshot {
    instant: Instant,
    polygon: NightPolygon,
}

#[derive(Debug, Serialize)]
pub struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: [Feature<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: Properties,
    geometry: Polygon<'a>,
}

#[derive(Debug, Serialize)]
pub struct Properties {}

#[derive(Debug, Serialize)]
pub struct Polygon<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: [&'a [GeoPoint]; 1],
}

impl OverlaySnapshot {
    pub fn new(instant: Instant, polygon: NightPolygon) -> Self {
        Self { instant, polygon }
    }

    pub fn instant(&self) -> Instant {
        self.instant
    }

    pub fn polygon(&self) -> &NightPolygon {
        &self.polygon
    }

    pub fn dark_hemisphere(&self) -> Hemisphere {
        self.polygon.dark_hemisphere()
    }

    pub fn is_night(&self, point: GeoPoint) -> bool {
        self.polygon.contains(point)
    }

    pub fn feature_collection(&self) -> FeatureCollection<'_> {
        FeatureCollection {
            kind: "FeatureCollection",
            features: [Feature {
                kind: "Feature",
                properties: Properties {},
                geometry: Polygon {
                    kind: "Polygon",
                    coordinates: [self.polygon.ring()],
                },
            }],
        }
    }

    pub fn to_geojson(&self, pretty: bool) -> serde_json::Result<String> {
        let fc = self.feature_collection();
        if pretty {
            serde_json::to_string_pretty(&fc)
        } else {
            serde_json::to_string(&fc)
        }
    }
}

//! Night polygon assembly.
//!
//! The terminator samples form an open curve from -180° to 180°. Two cap
//! vertices on the dark pole close it into a ring hugging that pole. Both
//! cases wind counter-clockwise in (lon, lat):
//!
//! ```text
//! South: (-180,-90) → (180,-90) → samples east→west → (-180,-90)
//! North: (-180, 90) → samples west→east → (180, 90) → (-180, 90)
//! ```

use super::Hemisphere;
use crate::error::{EngineError, EngineResult};
use crate::geo::GeoPoint;

/// Closed ring covering the dark hemisphere. First point equals last point.
#[derive(Debug, Clone, PartialEq)]
pub struct NightPolygon {
    dark: Hemisphere,
    ring: Vec<GeoPoint>,
}

impl NightPolygon {
    pub fn ring(&self) -> &[GeoPoint] {
        &self.ring
    }

    pub fn dark_hemisphere(&self) -> Hemisphere {
        self.dark
    }

    /// Even-odd test in the equirectangular (lon, lat) plane.
    pub fn contains(&self, point: GeoPoint) -> bool {
        let (x, y) = (point.lon(), point.lat());
        let mut inside = false;
        for edge in self.ring.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            if (a.lat() > y) != (b.lat() > y) {
                let cross = a.lon() + (y - a.lat()) / (b.lat() - a.lat()) * (b.lon() - a.lon());
                if x < cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

pub fn assemble(samples: &[GeoPoint], dark: Hemisphere) -> EngineResult<NightPolygon> {
    if samples.len() < 2 {
        return Err(EngineError::TooFewSamples(samples.len()));
    }

    let pole = dark.pole_latitude();
    let west_cap = GeoPoint::new(-180.0, pole)?;
    let east_cap = GeoPoint::new(180.0, pole)?;

    let mut ring = Vec::with_capacity(samples.len() + 3);
    ring.push(west_cap);
    match dark {
        Hemisphere::South => {
            ring.push(east_cap);
            ring.extend(samples.iter().rev().copied());
        }
        Hemisphere::North => {
            ring.extend(samples.iter().copied());
            ring.push(east_cap);
        }
    }
    ring.push(west_cap);

    Ok(NightPolygon { dark, ring })
}

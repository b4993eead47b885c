//! Solar position provider seam.
//!
//! The terminator engine only needs one capability: the sun's altitude above
//! the local horizon for an instant and a point. [`SolarPosition`] is that
//! seam. [`SpaSun`] is the provider the binary ships with, backed by the NREL
//! solar position algorithm from `solar_positioning`. No refraction correction
//! is applied, so altitude 0 is the geometric horizon.

use crate::error::SolarError;
use crate::geo::{wrap_longitude, GeoPoint, Instant};
use solar_positioning::spa;
use sunrise_sunset_calculator::SunriseSunsetParameters;

/// ΔT (TT − UT) in seconds. Its effect on the terminator is far below the
/// sampler's resolution, so a fixed present-day value is used.
const DELTA_T: f64 = 69.0;

/// Source of solar altitude. Implementations must be pure functions of their
/// inputs.
pub trait SolarPosition {
    /// Degrees of the sun above the horizon at `point`; negative below it.
    fn altitude(&self, instant: Instant, point: GeoPoint) -> Result<f64, SolarError>;
}

impl<T: SolarPosition + ?Sized> SolarPosition for &T {
    fn altitude(&self, instant: Instant, point: GeoPoint) -> Result<f64, SolarError> {
        (**self).altitude(instant, point)
    }
}

impl<T: SolarPosition + ?Sized> SolarPosition for Box<T> {
    fn altitude(&self, instant: Instant, point: GeoPoint) -> Result<f64, SolarError> {
        (**self).altitude(instant, point)
    }
}

/// Topocentric sun direction at one point, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunDirection {
    /// Clockwise from north.
    pub azimuth: f64,
    pub zenith: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpaSun;

impl SpaSun {
    pub fn direction(&self, instant: Instant, point: GeoPoint) -> Result<SunDirection, SolarError> {
        let position = spa::solar_position(
            instant.datetime(),
            point.lat(),
            point.lon(),
            0.0,
            DELTA_T,
            None,
        )
        .map_err(|e| SolarError::new(format!("spa: {e}")))?;
        Ok(SunDirection {
            azimuth: position.azimuth(),
            zenith: position.zenith_angle(),
        })
    }

    /// Point where the sun is at the zenith: the destination one zenith
    /// distance from (0°, 0°) along the sun's azimuth.
    pub fn subsolar_point(&self, instant: Instant) -> Result<GeoPoint, SolarError> {
        let dir = self.direction(instant, GeoPoint::ORIGIN)?;
        let (bearing, dist) = (dir.azimuth.to_radians(), dir.zenith.to_radians());
        let lat = (dist.sin() * bearing.cos()).asin().to_degrees();
        let lon = (bearing.sin() * dist.sin()).atan2(dist.cos()).to_degrees();
        GeoPoint::new(wrap_longitude(lon), lat.clamp(-90.0, 90.0))
            .map_err(|e| SolarError::new(e.to_string()))
    }
}

impl SolarPosition for SpaSun {
    fn altitude(&self, instant: Instant, point: GeoPoint) -> Result<f64, SolarError> {
        Ok(90.0 - self.direction(instant, point)?.zenith)
    }
}

/// Sunrise and sunset for the UTC day around an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub sunrise: Instant,
    pub sunset: Instant,
}

/// Returns `None` when the calculator has no event for the day (polar day or
/// polar night).
pub fn sun_times(instant: Instant, point: GeoPoint) -> Option<SunTimes> {
    let params = SunriseSunsetParameters::new(instant.unix_seconds(), point.lat(), point.lon());
    let result = params.calculate().ok()?;
    Some(SunTimes {
        sunrise: Instant::from_unix(result.rise).ok()?,
        sunset: Instant::from_unix(result.set).ok()?,
    })
}

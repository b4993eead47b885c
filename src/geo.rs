//! Instants and geographic points

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, SubsecRound, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A UTC point in time with second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(DateTime<Utc>);

impl Instant {
    pub fn from_unix(secs: i64) -> EngineResult<Self> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or(EngineError::InvalidInstant(secs))
    }

    /// Current system time, sub-second part dropped.
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(0))
    }

    /// Parse RFC 3339 (`2024-06-20T20:51:00Z`) or plain Unix seconds.
    pub fn parse(s: &str) -> EngineResult<Self> {
        let s = s.trim();
        if let Ok(secs) = s.parse::<i64>() {
            return Self::from_unix(secs);
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc).trunc_subsecs(0)))
            .map_err(|_| EngineError::UnparsableInstant(s.to_string()))
    }

    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Mean solar time at `lon`: UTC shifted by one hour per 15° of longitude.
    pub fn local_solar_time(&self, lon: f64) -> NaiveTime {
        let offset_ms = (lon / 15.0 * 3_600_000.0).round() as i64;
        (self.0 + Duration::milliseconds(offset_ms)).time()
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl FromStr for Instant {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Longitude/latitude pair in degrees.
///
/// Always within lon ∈ [-180, 180], lat ∈ [-90, 90]. Serializes as a GeoJSON
/// position `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    lon: f64,
    lat: f64,
}

impl GeoPoint {
    pub const NORTH_POLE: GeoPoint = GeoPoint { lon: 0.0, lat: 90.0 };
    pub const ORIGIN: GeoPoint = GeoPoint { lon: 0.0, lat: 0.0 };

    pub fn new(lon: f64, lat: f64) -> EngineResult<Self> {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            // NaN fails both range checks as well
            return Err(EngineError::InvalidCoordinate { lon, lat });
        }
        Ok(Self { lon, lat })
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// HUD style coordinates, e.g. `40.7128° N  74.0060° W`
    pub fn format_hud(&self) -> String {
        format!(
            "{:.4}° {}  {:.4}° {}",
            self.lat.abs(),
            if self.lat >= 0.0 { "N" } else { "S" },
            self.lon.abs(),
            if self.lon >= 0.0 { "E" } else { "W" },
        )
    }
}

impl Serialize for GeoPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.lon, self.lat].serialize(serializer)
    }
}

/// Wrap any longitude into [-180, 180).
pub fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parse_rfc3339_and_unix_agree() {
        let a = Instant::parse("2024-03-20T03:06:00Z").unwrap();
        let b = Instant::parse("1710903960").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "2024-03-20T03:06:00Z");
    }

    #[test]
    fn parse_drops_subseconds_and_offsets() {
        let a = Instant::parse("2024-06-20T22:51:00.750+02:00").unwrap();
        assert_eq!(a.to_string(), "2024-06-20T20:51:00Z");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            Instant::parse("yesterday"),
            Err(EngineError::UnparsableInstant(_))
        ));
        assert!(matches!(
            Instant::from_unix(i64::MAX),
            Err(EngineError::InvalidInstant(_))
        ));
    }

    #[test]
    fn geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(180.0, 90.0).is_ok());
        assert!(GeoPoint::new(-180.0, -90.0).is_ok());
        assert!(GeoPoint::new(180.5, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -90.1).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn hud_format_uses_hemisphere_letters() {
        let nyc = GeoPoint::new(-74.006, 40.7128).unwrap();
        assert_eq!(nyc.format_hud(), "40.7128° N  74.0060° W");
        let sydney = GeoPoint::new(151.2, -33.9).unwrap();
        assert_eq!(sydney.format_hud(), "33.9000° S  151.2000° E");
    }

    #[test]
    fn local_solar_time_shifts_by_longitude() {
        let noon = Instant::parse("2024-01-01T12:00:00Z").unwrap();
        let t = noon.local_solar_time(90.0);
        assert_eq!((t.hour(), t.minute()), (18, 0));
        let t = noon.local_solar_time(-180.0);
        assert_eq!((t.hour(), t.minute()), (0, 0));
    }

    #[test]
    fn serializes_as_position() {
        let p = GeoPoint::new(12.5, -3.0).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "[12.5,-3.0]");
    }

    #[test]
    fn longitude_wrapping() {
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(-180.0), -180.0);
    }
}

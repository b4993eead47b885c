use super::altitude_at;
use crate::error::EngineResult;
use crate::geo::{GeoPoint, Instant};
use crate::solar::SolarPosition;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// Latitude of this hemisphere's pole.
    pub fn pole_latitude(self) -> f64 {
        match self {
            Hemisphere::North => 90.0,
            Hemisphere::South => -90.0,
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Hemisphere::North => "north",
            Hemisphere::South => "south",
        })
    }
}

/// Decides which pole lies in darkness from one altitude evaluation at a
/// fixed reference point: sun above the horizon there means the south side
/// is dark, otherwise the north side is.
///
/// The default reference is the north pole, whose altitude is the solar
/// declination at every instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereSelector {
    reference: GeoPoint,
}

impl Default for HemisphereSelector {
    fn default() -> Self {
        Self {
            reference: GeoPoint::NORTH_POLE,
        }
    }
}

impl HemisphereSelector {
    pub fn with_reference(reference: GeoPoint) -> Self {
        Self { reference }
    }

    pub fn select_dark_hemisphere<S>(&self, solar: &S, instant: Instant) -> EngineResult<Hemisphere>
    where
        S: SolarPosition + ?Sized,
    {
        let altitude = altitude_at(solar, instant, self.reference)?;
        Ok(if altitude > 0.0 {
            Hemisphere::South
        } else {
            Hemisphere::North
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolarError;
    use crate::solar::SpaSun;

    struct Fixed(f64);

    impl SolarPosition for Fixed {
        fn altitude(&self, _: Instant, _: GeoPoint) -> Result<f64, SolarError> {
            Ok(self.0)
        }
    }

    fn at(s: &str) -> Instant {
        Instant::parse(s).unwrap()
    }

    #[test]
    fn sign_of_reference_altitude_picks_the_pole() {
        let selector = HemisphereSelector::default();
        let when = Instant::from_unix(0).unwrap();
        assert_eq!(selector.select_dark_hemisphere(&Fixed(12.0), when).unwrap(), Hemisphere::South);
        assert_eq!(selector.select_dark_hemisphere(&Fixed(-0.5), when).unwrap(), Hemisphere::North);
        // exactly on the horizon counts as not visible
        assert_eq!(selector.select_dark_hemisphere(&Fixed(0.0), when).unwrap(), Hemisphere::North);
    }

    #[test]
    fn seasons_with_default_reference() {
        let selector = HemisphereSelector::default();
        // June: northern summer, any hour of the day
        for t in ["2024-06-20T00:00:00Z", "2024-06-20T12:00:00Z", "2024-06-20T20:51:00Z"] {
            assert_eq!(selector.select_dark_hemisphere(&SpaSun, at(t)).unwrap(), Hemisphere::South);
        }
        assert_eq!(
            selector.select_dark_hemisphere(&SpaSun, at("2024-12-21T09:20:00Z")).unwrap(),
            Hemisphere::North
        );
    }

    #[test]
    fn equatorial_reference_follows_local_daylight() {
        let selector = HemisphereSelector::with_reference(GeoPoint::ORIGIN);
        assert_eq!(
            selector.select_dark_hemisphere(&SpaSun, at("2024-06-20T12:00:00Z")).unwrap(),
            Hemisphere::South
        );
        assert_eq!(
            selector.select_dark_hemisphere(&SpaSun, at("2024-06-21T00:00:00Z")).unwrap(),
            Hemisphere::North
        );
    }

    #[test]
    fn pole_latitudes() {
        assert_eq!(Hemisphere::North.pole_latitude(), 90.0);
        assert_eq!(Hemisphere::South.pole_latitude(), -90.0);
        assert_eq!(Hemisphere::South.to_string(), "south");
    }
}

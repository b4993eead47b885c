//! Terminator sampler: one fixed-budget binary search per grid meridian.

use super::altitude_at;
use crate::error::{EngineError, EngineResult};
use crate::geo::{GeoPoint, Instant};
use crate::solar::SolarPosition;

pub const DEFAULT_LONGITUDE_STEP: f64 = 5.0;
pub const DEFAULT_SEARCH_ITERATIONS: u32 = 10;

/// Smallest accepted step, 36 001 meridians.
pub const MIN_LONGITUDE_STEP: f64 = 0.01;

/// More halvings than this no longer change an f64 latitude.
const MAX_SEARCH_ITERATIONS: u32 = 52;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminatorSampler {
    longitude_step: f64,
    iterations: u32,
}

impl Default for TerminatorSampler {
    fn default() -> Self {
        Self {
            longitude_step: DEFAULT_LONGITUDE_STEP,
            iterations: DEFAULT_SEARCH_ITERATIONS,
        }
    }
}

impl TerminatorSampler {
    pub fn new(longitude_step: f64, iterations: u32) -> EngineResult<Self> {
        if !(MIN_LONGITUDE_STEP..=180.0).contains(&longitude_step) {
            return Err(EngineError::InvalidParameter(format!(
                "longitude step must be in [{MIN_LONGITUDE_STEP}, 180], got {longitude_step}"
            )));
        }
        if iterations == 0 || iterations > MAX_SEARCH_ITERATIONS {
            return Err(EngineError::InvalidParameter(format!(
                "search iterations must be in 1..={MAX_SEARCH_ITERATIONS}, got {iterations}"
            )));
        }
        Ok(Self {
            longitude_step,
            iterations,
        })
    }

    pub fn longitude_step(&self) -> f64 {
        self.longitude_step
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Grid longitudes from -180 to 180 inclusive. The last entry is always
    /// exactly 180 even when the step does not divide 360.
    pub fn grid(&self) -> Vec<f64> {
        let mut lons = Vec::with_capacity((360.0 / self.longitude_step).ceil() as usize + 1);
        let mut i = 0u32;
        loop {
            let lon = (-180.0 + f64::from(i) * self.longitude_step).min(180.0);
            lons.push(lon);
            if lon >= 180.0 {
                break;
            }
            i += 1;
        }
        lons
    }

    /// Terminator samples ordered west to east.
    ///
    /// One altitude evaluation at the north pole orients every meridian search: the
    /// pole's altitude is the solar declination, so its sign says which end of
    /// each meridian is sunlit. A meridian with no crossing (declination of
    /// exactly zero) converges onto a pole, which is still a valid boundary.
    pub fn sample<S>(&self, solar: &S, instant: Instant) -> EngineResult<Vec<GeoPoint>>
    where
        S: SolarPosition + ?Sized,
    {
        let north_lit = altitude_at(solar, instant, GeoPoint::NORTH_POLE)? > 0.0;

        self.grid()
            .into_iter()
            .map(|lon| {
                let (mut low, mut high) = (-90.0_f64, 90.0_f64);
                for _ in 0..self.iterations {
                    let mid = (low + high) / 2.0;
                    let lit = altitude_at(solar, instant, GeoPoint::new(lon, mid)?)? > 0.0;
                    // Pull in the bound on the same side as the midpoint.
                    if lit == north_lit {
                        high = mid;
                    } else {
                        low = mid;
                    }
                }
                GeoPoint::new(lon, (low + high) / 2.0)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolarError;
    use crate::solar::SpaSun;
    use std::cell::Cell;

    /// Sun fixed above a declination with a flat hour angle: the terminator
    /// sits at a constant latitude on every meridian.
    struct Band {
        boundary: f64,
        north_lit: bool,
    }

    impl SolarPosition for Band {
        fn altitude(&self, _: Instant, point: GeoPoint) -> Result<f64, SolarError> {
            let above = point.lat() - self.boundary;
            Ok(if self.north_lit { above } else { -above })
        }
    }

    struct Counting<'a> {
        calls: &'a Cell<usize>,
    }

    impl SolarPosition for Counting<'_> {
        fn altitude(&self, _: Instant, point: GeoPoint) -> Result<f64, SolarError> {
            self.calls.set(self.calls.get() + 1);
            Ok(point.lat())
        }
    }

    fn epoch() -> Instant {
        Instant::from_unix(0).unwrap()
    }

    #[test]
    fn default_grid_has_73_points() {
        let grid = TerminatorSampler::default().grid();
        assert_eq!(grid.len(), 73);
        assert_eq!(grid[0], -180.0);
        assert_eq!(grid[36], 0.0);
        assert_eq!(grid[72], 180.0);
    }

    #[test]
    fn finest_grid_is_bounded() {
        let grid = TerminatorSampler::new(MIN_LONGITUDE_STEP, 1).unwrap().grid();
        assert!(grid.len() <= 36_002, "{} meridians", grid.len());
        assert_eq!(*grid.last().unwrap(), 180.0);
    }

    #[test]
    fn uneven_step_still_ends_on_antimeridian() {
        let grid = TerminatorSampler::new(7.0, 10).unwrap().grid();
        assert_eq!(*grid.last().unwrap(), 180.0);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(TerminatorSampler::new(0.0, 10).is_err());
        assert!(TerminatorSampler::new(-5.0, 10).is_err());
        assert!(TerminatorSampler::new(f64::NAN, 10).is_err());
        assert!(TerminatorSampler::new(181.0, 10).is_err());
        assert!(TerminatorSampler::new(f64::INFINITY, 10).is_err());
        assert!(TerminatorSampler::new(1e-300, 10).is_err());
        assert!(TerminatorSampler::new(0.009, 10).is_err());
        assert!(TerminatorSampler::new(MIN_LONGITUDE_STEP, 10).is_ok());
        assert!(TerminatorSampler::new(5.0, 0).is_err());
        assert!(TerminatorSampler::new(5.0, 53).is_err());
    }

    #[test]
    fn finds_boundary_with_either_orientation() {
        let sampler = TerminatorSampler::default();
        for north_lit in [true, false] {
            let band = Band { boundary: 33.3, north_lit };
            let samples = sampler.sample(&band, epoch()).unwrap();
            for s in &samples {
                assert!((s.lat() - 33.3).abs() < 0.2, "lat {} north_lit {north_lit}", s.lat());
            }
        }
    }

    #[test]
    fn evaluation_budget_is_fixed() {
        let calls = Cell::new(0);
        let sampler = TerminatorSampler::default();
        sampler.sample(&Counting { calls: &calls }, epoch()).unwrap();
        // one orientation lookup plus 73 meridians × 10 halvings
        assert_eq!(calls.get(), 1 + 73 * 10);
    }

    #[test]
    fn more_iterations_tighten_the_estimate() {
        let band = Band { boundary: -12.345, north_lit: true };
        let fine = TerminatorSampler::new(30.0, 30).unwrap();
        for s in fine.sample(&band, epoch()).unwrap() {
            assert!((s.lat() + 12.345).abs() < 1e-6);
        }
    }

    #[test]
    fn samples_are_ordered_west_to_east() {
        let when = Instant::parse("2024-06-20T20:51:00Z").unwrap();
        let samples = TerminatorSampler::default().sample(&SpaSun, when).unwrap();
        assert!(samples.windows(2).all(|w| w[0].lon() < w[1].lon()));
    }

    #[test]
    fn upstream_error_aborts_sampling() {
        struct Broken;
        impl SolarPosition for Broken {
            fn altitude(&self, _: Instant, _: GeoPoint) -> Result<f64, SolarError> {
                Err(SolarError::new("no ephemeris"))
            }
        }
        let err = TerminatorSampler::default().sample(&Broken, epoch()).unwrap_err();
        assert!(err.is_upstream());
    }
}

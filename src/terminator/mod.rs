//! Day/night terminator engine
//!
//! Sampler → hemisphere selector → polygon assembler, run for one instant.

pub mod hemisphere;
pub mod polygon;
pub mod sampler;

pub use hemisphere::{Hemisphere, HemisphereSelector};
pub use polygon::{assemble, NightPolygon};
pub use sampler::TerminatorSampler;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::geo::{GeoPoint, Instant};
use crate::overlay::OverlaySnapshot;
use crate::solar::SolarPosition;

/// Query the provider and reject non-finite answers.
pub(crate) fn altitude_at<S>(solar: &S, instant: Instant, point: GeoPoint) -> EngineResult<f64>
where
    S: SolarPosition + ?Sized,
{
    let (lon, lat) = (point.lon(), point.lat());
    let altitude = solar
        .altitude(instant, point)
        .map_err(|source| EngineError::Solar { lon, lat, source })?;
    if !altitude.is_finite() {
        return Err(EngineError::NonFiniteAltitude { lon, lat });
    }
    Ok(altitude)
}

pub struct NightEngine<S> {
    solar: S,
    sampler: TerminatorSampler,
    selector: HemisphereSelector,
}

impl<S: SolarPosition> NightEngine<S> {
    pub fn new(solar: S, config: &EngineConfig) -> EngineResult<Self> {
        let sampler = TerminatorSampler::new(config.longitude_step, config.search_iterations)?;
        let selector = HemisphereSelector::with_reference(config.reference);
        Ok(Self::with_parts(solar, sampler, selector))
    }

    pub fn with_parts(solar: S, sampler: TerminatorSampler, selector: HemisphereSelector) -> Self {
        Self {
            solar,
            sampler,
            selector,
        }
    }

    pub fn solar(&self) -> &S {
        &self.solar
    }

    pub fn sampler(&self) -> &TerminatorSampler {
        &self.sampler
    }

    pub fn sample(&self, instant: Instant) -> EngineResult<Vec<GeoPoint>> {
        self.sampler.sample(&self.solar, instant)
    }

    pub fn dark_hemisphere(&self, instant: Instant) -> EngineResult<Hemisphere> {
        self.selector.select_dark_hemisphere(&self.solar, instant)
    }

    pub fn night_polygon(&self, instant: Instant) -> EngineResult<NightPolygon> {
        let samples = self.sample(instant)?;
        let dark = self.dark_hemisphere(instant)?;
        assemble(&samples, dark)
    }

    pub fn snapshot(&self, instant: Instant) -> EngineResult<OverlaySnapshot> {
        Ok(OverlaySnapshot::new(instant, self.night_polygon(instant)?))
    }
}

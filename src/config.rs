use crate::geo::GeoPoint;
use crate::terminator::sampler::{DEFAULT_LONGITUDE_STEP, DEFAULT_SEARCH_ITERATIONS};
use std::time::Duration;

/// How often the night overlay is recomputed
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(60);

/// Configuration for the terminator engine and its scheduler
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub longitude_step: f64,
    pub search_iterations: u32,
    pub refresh_period: Duration,
    /// Where the dark-pole decision samples the sun
    pub reference: GeoPoint,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            longitude_step: DEFAULT_LONGITUDE_STEP,
            search_iterations: DEFAULT_SEARCH_ITERATIONS,
            refresh_period: DEFAULT_REFRESH_PERIOD,
            reference: GeoPoint::NORTH_POLE,
        }
    }
}

/// Configuration for the live terminal map
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub engine: EngineConfig,
    pub time_step: f32,
    pub home: Option<GeoPoint>,
    pub locate: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            time_step: 0.25,
            home: None,
            locate: false,
        }
    }
}

use crate::config::EngineConfig;
use crate::geo::GeoPoint;
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub watch: WatchSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct EngineSettings {
    pub longitude_step: Option<f64>,
    pub search_iterations: Option<u32>,
    pub refresh_secs: Option<u64>,
    pub reference: Option<LatLon>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WatchSettings {
    pub frame_time: Option<f32>,
    pub home: Option<LatLon>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!("Ignoring malformed settings {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                warn!("Cannot read settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nightside")
            .join("config.toml")
    }

    /// Engine parameters with defaults for anything unset or unusable.
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        let refresh_period = match self.engine.refresh_secs {
            Some(0) => {
                warn!("Ignoring refresh_secs = 0, using {:?}", defaults.refresh_period);
                defaults.refresh_period
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.refresh_period,
        };
        EngineConfig {
            longitude_step: self.engine.longitude_step.unwrap_or(defaults.longitude_step),
            search_iterations: self.engine.search_iterations.unwrap_or(defaults.search_iterations),
            refresh_period,
            reference: self
                .engine
                .reference
                .and_then(|r| r.point("reference"))
                .unwrap_or(defaults.reference),
        }
    }

    /// Configured home location, if present and in range.
    pub fn home(&self) -> Option<GeoPoint> {
        self.watch.home?.point("home location")
    }
}

impl LatLon {
    fn point(self, what: &str) -> Option<GeoPoint> {
        match GeoPoint::new(self.lon, self.lat) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("Ignoring {} in settings: {}", what, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let s = Settings::parse("").unwrap();
        assert_eq!(s.engine_config(), EngineConfig::default());
        assert!(s.home().is_none());
    }

    #[test]
    fn partial_engine_section() {
        let s = Settings::parse("[engine]\nlongitude_step = 2.5\n").unwrap();
        let cfg = s.engine_config();
        assert_eq!(cfg.longitude_step, 2.5);
        assert_eq!(cfg.search_iterations, 10);
        assert_eq!(cfg.refresh_period, Duration::from_secs(60));
    }

    #[test]
    fn full_file() {
        let s = Settings::parse(
            r#"
            [engine]
            longitude_step = 1.0
            search_iterations = 16
            refresh_secs = 30

            [watch]
            frame_time = 0.5
            home = { lat = 51.5, lon = -0.1 }
            "#,
        )
        .unwrap();
        let cfg = s.engine_config();
        assert_eq!(cfg.search_iterations, 16);
        assert_eq!(cfg.refresh_period, Duration::from_secs(30));
        assert_eq!(s.watch.frame_time, Some(0.5));
        let home = s.home().unwrap();
        assert_eq!((home.lon(), home.lat()), (-0.1, 51.5));
    }

    #[test]
    fn out_of_range_home_is_dropped() {
        let s = Settings::parse("[watch]\nhome = { lat = 123.0, lon = 0.0 }\n").unwrap();
        assert!(s.home().is_none());
    }

    #[test]
    fn zero_refresh_falls_back_to_default() {
        let s = Settings::parse("[engine]\nrefresh_secs = 0\n").unwrap();
        assert_eq!(s.engine_config().refresh_period, Duration::from_secs(60));
    }

    #[test]
    fn reference_point_is_configurable() {
        let s = Settings::parse("[engine]\nreference = { lat = 0.0, lon = 0.0 }\n").unwrap();
        assert_eq!(s.engine_config().reference, GeoPoint::ORIGIN);
        let s = Settings::parse("[engine]\nreference = { lat = -91.0, lon = 0.0 }\n").unwrap();
        assert_eq!(s.engine_config().reference, GeoPoint::NORTH_POLE);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let s = Settings::load_from(Path::new("/nonexistent/nightside/config.toml"));
        assert!(s.watch.frame_time.is_none());
    }
}

//! Error types for the terminator engine.

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure reported by a solar position provider.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct SolarError(pub String);

impl SolarError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("coordinate out of range: longitude {lon}, latitude {lat}")]
    InvalidCoordinate { lon: f64, lat: f64 },

    #[error("instant out of range: {0} seconds since the Unix epoch")]
    InvalidInstant(i64),

    #[error("cannot parse instant `{0}` (expected RFC 3339 or Unix seconds)")]
    UnparsableInstant(String),

    #[error("a night polygon needs at least 2 terminator samples, got {0}")]
    TooFewSamples(usize),

    #[error("invalid engine parameter: {0}")]
    InvalidParameter(String),

    #[error("solar position failed at ({lon}, {lat}): {source}")]
    Solar {
        lon: f64,
        lat: f64,
        #[source]
        source: SolarError,
    },

    #[error("solar altitude at ({lon}, {lat}) is not finite")]
    NonFiniteAltitude { lon: f64, lat: f64 },
}

impl EngineError {
    /// Errors raised by the solar provider rather than by the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(self, EngineError::Solar { .. } | EngineError::NonFiniteAltitude { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_classification() {
        let solar = EngineError::Solar {
            lon: 0.0,
            lat: 0.0,
            source: SolarError::new("ephemeris offline"),
        };
        assert!(solar.is_upstream());
        assert!(EngineError::NonFiniteAltitude { lon: 5.0, lat: 1.0 }.is_upstream());
        assert!(!EngineError::TooFewSamples(1).is_upstream());
    }

    #[test]
    fn messages_name_the_offending_values() {
        let err = EngineError::InvalidCoordinate { lon: 200.0, lat: 0.0 };
        assert!(err.to_string().contains("200"));
        let err = EngineError::Solar {
            lon: 10.0,
            lat: -3.5,
            source: SolarError::new("boom"),
        };
        assert!(err.to_string().ends_with("boom"));
    }
}

//! Best-effort "current location" from IP geolocation

use crate::geo::GeoPoint;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::time::Duration;

const LOOKUP_URL: &str = "https://ipapi.co/json/";

#[derive(Debug, Deserialize)]
struct GeoResponse {
    latitude: f64,
    longitude: f64,
    city: Option<String>,
    region: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub point: GeoPoint,
    pub name: String,
}

fn parse_response(geo: GeoResponse) -> Result<Located> {
    let point = GeoPoint::new(geo.longitude, geo.latitude)?;
    let name = format!(
        "{}{}",
        geo.city.unwrap_or_default(),
        geo.region.map(|r| format!(", {}", r)).unwrap_or_default()
    );
    Ok(Located { point, name })
}

fn lookup() -> Result<Located> {
    let response = ureq::get(LOOKUP_URL)
        .timeout(Duration::from_secs(3))
        .call()
        .context("location request failed")?;
    let geo: GeoResponse = response.into_json().context("malformed location response")?;
    parse_response(geo)
}

/// Look up the caller's approximate location. Failures are logged, never fatal.
pub fn current_location() -> Option<Located> {
    match lookup() {
        Ok(found) => {
            debug!("Located at {} ({})", found.point.format_hud(), found.name);
            Some(found)
        }
        Err(e) => {
            warn!("Could not determine current location: {:#}", e);
            None
        }
    }
}

//! Reverse-geocoding client for labeling custom locations.
//!
//! The one place the surrounding workflow touches the network: turning a
//! coordinate into an address when a reviewer labels a new geofence. Lookups
//! are best-effort and failable with no retry guarantee, and requests are
//! spaced at least one second apart to respect the provider's rate limit.

use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::{EngineError, Result};
use crate::GpsPoint;

/// Minimum spacing between requests.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";

/// Rate-limited reverse-geocoding client.
pub struct GeocodeClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    last_request: Option<Instant>,
}

impl GeocodeClient {
    /// Create a client against the default endpoint.
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Create a client against a custom endpoint (e.g. a self-hosted
    /// geocoder or a test server).
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("fieldtrace/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EngineError::Geocode {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            last_request: None,
        })
    }

    /// Look up the display address for a coordinate.
    ///
    /// Blocks as needed to keep requests at least one second apart. Returns
    /// `Ok(None)` when the provider has no address for the point. One
    /// attempt only — callers decide whether an address is worth retrying
    /// later.
    pub fn reverse(&mut self, point: &GpsPoint) -> Result<Option<String>> {
        self.throttle();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
            ])
            .send()
            .map_err(|e| EngineError::Geocode {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(EngineError::Geocode {
                reason: format!("status {}", response.status()),
            });
        }

        let body: serde_json::Value = response.json().map_err(|e| EngineError::Geocode {
            reason: e.to_string(),
        })?;

        let address = body
            .get("display_name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        if address.is_none() {
            debug!(
                "no address for ({}, {})",
                point.latitude, point.longitude
            );
        }

        Ok(address)
    }

    fn throttle(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                thread::sleep(MIN_REQUEST_INTERVAL - elapsed);
            }
        }
        self.last_request = Some(Instant::now());
    }
}

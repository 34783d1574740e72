//! Curve snapshot types.
//!
//! `CurveMessage` is the JSON shape pushed (event stream) or polled (GET) from
//! the curve backend. The backend guarantees equal-length tenor/rate arrays;
//! we check it only to log, never to reject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Fitted curve produced by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveFit {
    /// Tenor grid (years) the fitted curve is evaluated on.
    pub grid_years: Vec<f64>,
    /// Fitted rates (percent) at each grid tenor.
    pub rates: Vec<f64>,
    /// Polynomial coefficients of the fit, lowest order first.
    pub polynomial_coefficients: Vec<f64>,
}

/// Timestamped yield curve snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveMessage {
    /// Snapshot time as sent by the producer (RFC 3339).
    pub timestamp: String,
    /// Observed tenors in years.
    pub tenor_years: Vec<f64>,
    /// Observed rates (percent), parallel to `tenor_years`.
    pub raw_rates: Vec<f64>,
    /// Fitted curve.
    pub fit: CurveFit,
}

/// A single (tenor, rate) observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub tenor: f64,
    pub rate: f64,
}

impl CurveMessage {
    /// Parse a snapshot from a JSON payload.
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Raw observations as points. Stops at the shorter of the two arrays.
    pub fn raw_points(&self) -> Vec<CurvePoint> {
        zip_points(&self.tenor_years, &self.raw_rates)
    }

    /// Fitted curve as points. Stops at the shorter of the two arrays.
    pub fn fit_points(&self) -> Vec<CurvePoint> {
        zip_points(&self.fit.grid_years, &self.fit.rates)
    }

    /// Check that parallel arrays have equal length.
    pub fn validate(&self) -> Result<()> {
        if self.tenor_years.len() != self.raw_rates.len() {
            return Err(CoreError::LengthMismatch {
                series: "raw",
                left: self.tenor_years.len(),
                right: self.raw_rates.len(),
            });
        }
        if self.fit.grid_years.len() != self.fit.rates.len() {
            return Err(CoreError::LengthMismatch {
                series: "fit",
                left: self.fit.grid_years.len(),
                right: self.fit.rates.len(),
            });
        }
        Ok(())
    }

    /// Parse `timestamp` as RFC 3339.
    pub fn parsed_timestamp(&self) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| CoreError::InvalidTimestamp(format!("{}: {e}", self.timestamp)))
    }
}

fn zip_points(tenors: &[f64], rates: &[f64]) -> Vec<CurvePoint> {
    tenors
        .iter()
        .zip(rates)
        .map(|(&tenor, &rate)| CurvePoint { tenor, rate })
        .collect()
}

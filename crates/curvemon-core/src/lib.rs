//! Core types for curvemon.
//!
//! This crate provides the single data transfer shape shared by every other
//! crate in the workspace:
//! - `CurveMessage`: a timestamped yield curve snapshot (raw rates + fit)
//! - `CurveFit`: the fitted-curve sub-object produced by the backend
//! - `CurvePoint`: a (tenor, rate) pair used for charting

pub mod curve;
pub mod error;

pub use curve::{CurveFit, CurveMessage, CurvePoint};
pub use error::{CoreError, Result};

//! curvemon - live yield curve monitor.
//!
//! Wires the pieces together:
//! - Feed acquisition (event stream or polling)
//! - Dashboard state, text view and SVG chart
//! - Static site serving, gateway event handling and packaging

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};

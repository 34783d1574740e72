//! curvemon-dashboard - View side of the curve monitor.
//!
//! Feed events are folded into a shared [`DashboardState`]; snapshots of that
//! state are rendered either as a terminal text view or as a standalone SVG
//! chart of raw rates and the fitted curve.
//!
//! # Usage
//!
//! ```ignore
//! use curvemon_dashboard::{render_text, ChartModel, DashboardState};
//!
//! let state = DashboardState::new();
//! while let Some(event) = events.recv().await {
//!     state.apply(event);
//!     let snapshot = state.collect_snapshot();
//!     println!("{}", render_text(&snapshot));
//!     if let Some(chart) = snapshot.curve.as_ref().and_then(ChartModel::build) {
//!         std::fs::write("curve.svg", chart.render_svg())?;
//!     }
//! }
//! ```

pub mod chart;
mod config;
mod state;
mod types;
pub mod view;

pub use chart::{ChartModel, LinearScale};
pub use config::DashboardConfig;
pub use state::{DashboardState, RETRY_MESSAGE};
pub use types::DashboardSnapshot;
pub use view::{render_text, status_label};

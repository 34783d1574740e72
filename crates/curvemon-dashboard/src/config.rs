//! Dashboard configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How the watch loop presents the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Print the text view on every update.
    #[serde(default = "default_print_text")]
    pub print_text: bool,
    /// Print each snapshot as a JSON line instead of the text view.
    #[serde(default)]
    pub json: bool,
    /// Write the chart here after each new curve (disabled when unset).
    #[serde(default)]
    pub svg_out: Option<PathBuf>,
}

fn default_print_text() -> bool {
    true
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            print_text: default_print_text(),
            json: false,
            svg_out: None,
        }
    }
}

//! Text view of the dashboard.

use std::fmt::{Display, Write as _};

use chrono::{DateTime, Local, TimeZone};
use curvemon_feed::ConnectionState;

use crate::types::DashboardSnapshot;

pub const TITLE: &str = "Curve Fitter Monitor";
pub const SUBTITLE: &str = "Streaming live rates and fitted curves";
pub const PLACEHOLDER: &str = "Waiting for the first curve...";

/// Human label for the connection indicator.
pub fn status_label(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Open => "Live",
        ConnectionState::Error => "Reconnecting",
        ConnectionState::Connecting => "Connecting",
    }
}

/// Format a producer timestamp in the local time zone.
pub fn format_timestamp(value: &str) -> String {
    format_timestamp_in(value, &Local)
}

/// Format a producer timestamp in `tz`. Unparseable input is shown verbatim.
pub fn format_timestamp_in<Tz>(value: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => ts
            .with_timezone(tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => value.to_string(),
    }
}

/// Tenors as shortest decimal text, e.g. `0.25, 1, 30`.
pub fn format_tenors(tenors: &[f64]) -> String {
    tenors
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rates with three decimals, e.g. `5.310, 4.420`.
pub fn format_rates(rates: &[f64]) -> String {
    rates
        .iter()
        .map(|r| format!("{r:.3}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the whole dashboard as plain text.
pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    render_text_in(snapshot, &Local)
}

pub fn render_text_in<Tz>(snapshot: &DashboardSnapshot, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}  [{}]", status_label(snapshot.connection));
    let _ = writeln!(out, "{SUBTITLE}");
    out.push('\n');

    match &snapshot.curve {
        Some(curve) => {
            let _ = writeln!(out, "Snapshot");
            let _ = writeln!(
                out,
                "  Timestamp   {}",
                format_timestamp_in(&curve.timestamp, tz)
            );
            let _ = writeln!(out, "  Raw Tenors  {}", format_tenors(&curve.tenor_years));
            let _ = writeln!(out, "  Raw Rates   {}", format_rates(&curve.raw_rates));
        }
        None => {
            let _ = writeln!(out, "{PLACEHOLDER}");
        }
    }

    if let Some(error) = &snapshot.last_error {
        let _ = writeln!(out, "\n! {error}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use curvemon_core::{CurveFit, CurveMessage};

    fn snapshot(curve: Option<CurveMessage>, connection: ConnectionState) -> DashboardSnapshot {
        DashboardSnapshot {
            connection,
            curve,
            last_error: None,
            version: 1,
            updated_at_ms: None,
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(ConnectionState::Open), "Live");
        assert_eq!(status_label(ConnectionState::Error), "Reconnecting");
        assert_eq!(status_label(ConnectionState::Connecting), "Connecting");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_tenors(&[0.25, 1.0, 30.0]), "0.25, 1, 30");
        assert_eq!(format_rates(&[5.31, 4.4199]), "5.310, 4.420");
        assert_eq!(format_rates(&[]), "");
    }

    #[test]
    fn test_timestamp_formatting() {
        assert_eq!(
            format_timestamp_in("2024-05-01T12:00:00+02:00", &Utc),
            "2024-05-01 10:00:00"
        );
        assert_eq!(format_timestamp_in("not a time", &Utc), "not a time");
    }

    #[test]
    fn test_placeholder_before_first_curve() {
        let text = render_text_in(&snapshot(None, ConnectionState::Connecting), &Utc);
        assert!(text.starts_with("Curve Fitter Monitor  [Connecting]"));
        assert!(text.contains(PLACEHOLDER));
        assert!(!text.contains("Snapshot"));
    }

    #[test]
    fn test_details_and_error_banner() {
        let curve = CurveMessage {
            timestamp: "2024-05-01T12:00:00Z".to_string(),
            tenor_years: vec![0.5, 2.0],
            raw_rates: vec![5.2, 4.75],
            fit: CurveFit {
                grid_years: vec![],
                rates: vec![],
                polynomial_coefficients: vec![],
            },
        };
        let mut snap = snapshot(Some(curve), ConnectionState::Error);
        snap.last_error = Some("Connection lost. Retrying automatically...".to_string());

        let text = render_text_in(&snap, &Utc);
        assert!(text.contains("[Reconnecting]"));
        assert!(text.contains("  Timestamp   2024-05-01 12:00:00"));
        assert!(text.contains("  Raw Tenors  0.5, 2"));
        assert!(text.contains("  Raw Rates   5.200, 4.750"));
        assert!(text.ends_with("! Connection lost. Retrying automatically...\n"));
    }
}

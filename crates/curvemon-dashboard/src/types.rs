//! Dashboard snapshot types.
//!
//! Used for the terminal view and for JSON output of the watch loop.

use curvemon_core::CurveMessage;
use curvemon_feed::ConnectionState;
use serde::{Serialize, Serializer};

/// Point-in-time copy of the dashboard state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Feed connection state.
    #[serde(serialize_with = "serialize_connection")]
    pub connection: ConnectionState,
    /// Latest curve, if any arrived yet.
    pub curve: Option<CurveMessage>,
    /// User-facing error text while retrying.
    pub last_error: Option<String>,
    /// Number of events applied.
    pub version: u64,
    /// When the last event was applied (Unix milliseconds).
    pub updated_at_ms: Option<i64>,
}

fn serialize_connection<S: Serializer>(
    state: &ConnectionState,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(state.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = DashboardSnapshot {
            connection: ConnectionState::Error,
            curve: None,
            last_error: Some("retrying".to_string()),
            version: 3,
            updated_at_ms: Some(1706400000000),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"connection\":\"error\""));
        assert!(json.contains("\"curve\":null"));
        assert!(json.contains("\"updated_at_ms\":1706400000000"));
    }
}

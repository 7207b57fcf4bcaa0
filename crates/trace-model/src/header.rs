//! Trace header: the first line of every trace file.

use pathreplay_platform_core::{CoordinateSpace, ScreenGeometry};
use serde::{Deserialize, Serialize};

/// Current header schema version.
pub const SCHEMA_VERSION: &str = "1.0";

/// Metadata written once, before any sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Space every position in the trace is expressed in.
    pub coordinate_space: CoordinateSpace,

    /// Wall-clock time at recording start (RFC 3339).
    #[serde(default)]
    pub epoch_wall: String,

    /// Nominal sampling period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_ms: Option<u64>,

    /// Geometry of the machine that recorded the trace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<ScreenGeometry>,
}

impl TraceHeader {
    /// Header for a new recording.
    pub fn new(
        coordinate_space: CoordinateSpace,
        geometry: ScreenGeometry,
        period_ms: u64,
        epoch_wall: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            coordinate_space,
            epoch_wall: epoch_wall.into(),
            period_ms: Some(period_ms),
            geometry: Some(geometry),
        }
    }

    /// Header synthesized for a file written before headers existed.
    pub fn legacy(coordinate_space: CoordinateSpace) -> Self {
        Self {
            schema_version: "0".to_string(),
            coordinate_space,
            epoch_wall: String::new(),
            period_ms: None,
            geometry: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_json_carries_space_tag() {
        let header = TraceHeader::new(
            CoordinateSpace::Unit,
            ScreenGeometry::uniform(1920, 1080).unwrap(),
            1000,
            "2026-01-01T00:00:00Z",
        );
        let json = serde_json::to_string(&header).unwrap();
        assert!(json.contains("\"coordinate_space\":\"unit\""));
        assert!(json.contains("\"period_ms\":1000"));
    }

    #[test]
    fn minimal_header_parses() {
        let raw = r#"{"schema_version":"1.0","coordinate_space":"logical"}"#;
        let header: TraceHeader = serde_json::from_str(raw).unwrap();
        assert_eq!(header.coordinate_space, CoordinateSpace::Logical);
        assert_eq!(header.geometry, None);
        assert_eq!(header.period_ms, None);
    }

    #[test]
    fn header_without_space_tag_is_rejected() {
        let raw = r#"{"schema_version":"1.0"}"#;
        assert!(serde_json::from_str::<TraceHeader>(raw).is_err());
    }
}

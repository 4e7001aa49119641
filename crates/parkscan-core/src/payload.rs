//! # Scanned Payload
//!
//! Parsing of the text decoded from a coupon QR code.
//!
//! ## Payload Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Coupon QR Payload                                  │
//! │                                                                         │
//! │  https://m.example.com/coupon?parkinglotcouponuser=42__X9KQ             │
//! │  ─────────────────────────────┬───────────────────┬──┬──┬────           │
//! │                               │                   │  │  │               │
//! │                         marker token             id  │ code             │
//! │                                                 delimiter               │
//! │                                                                         │
//! │  1. Locate the first marker token                                      │
//! │  2. Take the text up to the next marker (or end of string)             │
//! │  3. Split on "__", dropping trailing empty segments                    │
//! │  4. Require exactly two non-empty segments                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation happens here, before the coupon client builds any request,
//! so a malformed scan never reaches the network.

use crate::error::PayloadError;
use crate::{MARKER_TOKEN, SEGMENT_DELIMITER};

/// Result type for payload parsing.
pub type PayloadResult<T> = Result<T, PayloadError>;

/// A scanned string that carries a coupon-user id and redemption code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedPayload {
    raw: String,
    id: String,
    code: String,
}

impl ScannedPayload {
    /// Parses a decoded barcode text.
    ///
    /// ## Example
    /// ```rust
    /// use parkscan_core::payload::ScannedPayload;
    /// use parkscan_core::PayloadError;
    ///
    /// assert!(ScannedPayload::parse("x?parkinglotcouponuser=7__AB").is_ok());
    /// assert_eq!(
    ///     ScannedPayload::parse("https://example.com"),
    ///     Err(PayloadError::MissingMarker)
    /// );
    /// ```
    pub fn parse(raw: &str) -> PayloadResult<Self> {
        let section = parameter_section(raw).ok_or(PayloadError::MissingMarker)?;
        let segments = split_segments(section);

        if segments.len() != 2 {
            return Err(PayloadError::WrongSegmentCount {
                found: segments.len(),
            });
        }

        let (id, code) = (segments[0], segments[1]);
        if id.is_empty() {
            return Err(PayloadError::EmptySegment { field: "id" });
        }
        if code.is_empty() {
            return Err(PayloadError::EmptySegment { field: "code" });
        }

        Ok(ScannedPayload {
            raw: raw.to_string(),
            id: id.to_string(),
            code: code.to_string(),
        })
    }

    /// Returns true if the text carries the coupon marker at all.
    ///
    /// Used to tell coupon scans apart from generic URLs before parsing.
    pub fn has_marker(raw: &str) -> bool {
        raw.contains(MARKER_TOKEN)
    }

    /// The full scanned text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The coupon-user identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The redemption code.
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl std::fmt::Display for ScannedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.id, SEGMENT_DELIMITER, self.code)
    }
}

/// Text between the first marker and the next one (or the end).
fn parameter_section(raw: &str) -> Option<&str> {
    let start = raw.find(MARKER_TOKEN)? + MARKER_TOKEN.len();
    let rest = &raw[start..];
    Some(match rest.find(MARKER_TOKEN) {
        Some(end) => &rest[..end],
        None => rest,
    })
}

/// Splits on the delimiter, dropping trailing empty segments.
fn split_segments(section: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = section.split(SEGMENT_DELIMITER).collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "https://m.example.com/coupon?parkinglotcouponuser=42__X9KQ";

    #[test]
    fn test_parse_valid_payload() {
        let payload = ScannedPayload::parse(VALID).unwrap();
        assert_eq!(payload.id(), "42");
        assert_eq!(payload.code(), "X9KQ");
        assert_eq!(payload.raw(), VALID);
        assert_eq!(payload.to_string(), "42__X9KQ");
    }

    #[test]
    fn test_missing_marker() {
        for raw in ["", "https://example.com", "parkinglotcouponuser", "42__X9KQ"] {
            assert_eq!(
                ScannedPayload::parse(raw),
                Err(PayloadError::MissingMarker),
                "input: {raw}"
            );
            assert!(!ScannedPayload::has_marker(raw));
        }
    }

    #[test]
    fn test_wrong_segment_count() {
        let cases = [
            ("x?parkinglotcouponuser=", 0),
            ("x?parkinglotcouponuser=42", 1),
            ("x?parkinglotcouponuser=42__", 1),
            ("x?parkinglotcouponuser=1__2__3", 3),
        ];
        for (raw, found) in cases {
            assert_eq!(
                ScannedPayload::parse(raw),
                Err(PayloadError::WrongSegmentCount { found }),
                "input: {raw}"
            );
        }
    }

    #[test]
    fn test_trailing_delimiter_is_dropped() {
        let payload = ScannedPayload::parse("x?parkinglotcouponuser=42__X9KQ____").unwrap();
        assert_eq!(payload.code(), "X9KQ");
    }

    #[test]
    fn test_empty_id_segment() {
        assert_eq!(
            ScannedPayload::parse("x?parkinglotcouponuser=__X9KQ"),
            Err(PayloadError::EmptySegment { field: "id" })
        );
    }

    #[test]
    fn test_section_stops_at_second_marker() {
        let raw = "a?parkinglotcouponuser=42__X9KQ&b=parkinglotcouponuser=9__Z";
        let payload = ScannedPayload::parse(raw).unwrap();
        assert_eq!(payload.id(), "42");
        assert_eq!(payload.code(), "X9KQ&b=");
    }
}

//! User-facing strings shown by the scanning station.
//!
//! Kept in one place so every front end renders the same wording.

/// Status line while the scanner waits for a code.
pub const STATUS_INITIALIZING: &str = "initializing";

/// Status line while a coupon request is outstanding.
pub const STATUS_REQUESTING: &str = "requesting...";

/// Scanned code is not a usable coupon.
pub const MALFORMED_PAYLOAD: &str = "this code cannot be used";

/// Transport could not reach the server.
pub const NETWORK_UNREACHABLE: &str = "check network connection";

/// Server answered 404: the coupon belongs to another lot.
pub const COUPON_NOT_FOR_LOCATION: &str = "coupon not valid for this location";

/// Fallback when no better message applies.
pub const COUPON_FETCH_FAILED: &str = "failed to fetch coupon";

/// Message for any other HTTP status.
pub fn http_status(status: u16) -> String {
    format!("error: {status}")
}

/// Message for unexpected or undecodable responses.
pub fn unknown_error(detail: &str) -> String {
    format!("unknown error: {detail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_messages() {
        assert_eq!(http_status(503), "error: 503");
        assert_eq!(unknown_error("eof"), "unknown error: eof");
    }
}

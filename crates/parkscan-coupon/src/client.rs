//! # Coupon Client
//!
//! HTTP client for the parking API's coupon check endpoint.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Coupon Check Endpoint                            │
//! │                                                                         │
//! │  POST /parking/parkinglotcouponusers/{id}/parkinglot/{lot}              │
//! │       /code/{code}/check?no_use=1                                       │
//! │       ─────────────────────────────                                     │
//! │       inspect(): returns the coupon without consuming it               │
//! │                                                                         │
//! │  POST /parking/parkinglotcouponusers/{id}/parkinglot/{lot}              │
//! │       /code/{code}/check                                                │
//! │       ─────────────────────                                             │
//! │       redeem(): consumes the coupon and returns it with check=true     │
//! │                                                                         │
//! │  {id} and {code} come from the scanned payload, {lot} from config.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The client is built once by the composing application and shared by
//! reference; there is no process-wide instance.

use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use parkscan_core::{Coupon, ScannedPayload};

use crate::config::CouponClientConfig;
use crate::error::{CouponError, CouponResult};

// =============================================================================
// Service Seam
// =============================================================================

/// Coupon operations the capture coordinator depends on.
///
/// Implemented by [`CouponClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait CouponService: Send + Sync {
    /// Looks up the coupon behind a scanned payload without consuming it.
    async fn inspect(&self, raw: &str) -> CouponResult<Coupon>;

    /// Claims the coupon behind a scanned payload.
    async fn redeem(&self, raw: &str) -> CouponResult<Coupon>;
}

// =============================================================================
// HTTP Client
// =============================================================================

/// REST client bound to one host and one parking lot.
#[derive(Debug, Clone)]
pub struct CouponClient {
    config: CouponClientConfig,
    base: Url,
    http: reqwest::Client,
}

impl CouponClient {
    /// Creates a client from validated configuration.
    pub fn new(config: CouponClientConfig) -> CouponResult<Self> {
        config.validate()?;

        let base = Url::parse(&config.host)?;
        if base.cannot_be_a_base() {
            return Err(CouponError::InvalidConfig(format!(
                "Host cannot be used as a base URL: {}",
                config.host
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;

        info!(host = %base, parkinglot = %config.parkinglot, "Coupon client ready");

        Ok(CouponClient { config, base, http })
    }

    /// Builds the check URL for a payload.
    ///
    /// `consume = false` appends `no_use=1` so the server only reports.
    pub fn check_url(&self, payload: &ScannedPayload, consume: bool) -> CouponResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CouponError::InvalidConfig("host cannot be a base URL".into()))?
            .pop_if_empty()
            .extend([
                "parking",
                "parkinglotcouponusers",
                payload.id(),
                "parkinglot",
                self.config.parkinglot.as_str(),
                "code",
                payload.code(),
                "check",
            ]);

        if !consume {
            url.set_query(Some("no_use=1"));
        }

        Ok(url)
    }

    /// Validates the payload and posts to the check endpoint.
    async fn check(&self, raw: &str, consume: bool) -> CouponResult<Coupon> {
        let payload = ScannedPayload::parse(raw).map_err(|e| {
            debug!(error = %e, "Rejected scanned payload");
            CouponError::from(e)
        })?;

        let url = self.check_url(&payload, consume)?;
        debug!(id = %payload.id(), consume, %url, "Sending coupon check");

        let response = self.http.post(url).send().await.map_err(|e| {
            warn!(error = %e, "Coupon request failed");
            CouponError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), id = %payload.id(), "Coupon check rejected");
            return Err(CouponError::Http {
                status: status.as_u16(),
            });
        }

        let coupon: Coupon = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to decode coupon response");
            if e.is_decode() {
                CouponError::Unexpected(e.to_string())
            } else {
                CouponError::from(e)
            }
        })?;

        info!(
            id = %payload.id(),
            name = %coupon.name(),
            checked = coupon.check,
            "Coupon check complete"
        );
        Ok(coupon)
    }
}

#[async_trait]
impl CouponService for CouponClient {
    async fn inspect(&self, raw: &str) -> CouponResult<Coupon> {
        self.check(raw, false).await
    }

    async fn redeem(&self, raw: &str) -> CouponResult<Coupon> {
        self.check(raw, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(host: &str) -> CouponClient {
        CouponClient::new(CouponClientConfig {
            host: host.into(),
            parkinglot: "lot-001".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_check_url_inspect() {
        let payload = ScannedPayload::parse("x?parkinglotcouponuser=42__X9KQ").unwrap();
        let url = client("https://api.example.com").check_url(&payload, false).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/parking/parkinglotcouponusers/42/parkinglot/lot-001/code/X9KQ/check?no_use=1"
        );
    }

    #[test]
    fn test_check_url_redeem_with_base_path() {
        let payload = ScannedPayload::parse("x?parkinglotcouponuser=42__X9KQ").unwrap();
        let url = client("https://api.example.com/v1/").check_url(&payload, true).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/parking/parkinglotcouponusers/42/parkinglot/lot-001/code/X9KQ/check"
        );
    }

    #[test]
    fn test_check_url_escapes_segments() {
        let payload = ScannedPayload::parse("x?parkinglotcouponuser=4/2__A B").unwrap();
        let url = client("https://api.example.com").check_url(&payload, true).unwrap();
        assert!(url.path().contains("/4%2F2/"));
        assert!(url.path().contains("/A%20B/"));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = CouponClient::new(CouponClientConfig {
            host: "api.example.com".into(),
            parkinglot: "lot-001".into(),
            ..Default::default()
        });
        assert!(matches!(result, Err(CouponError::InvalidConfig(_))));
    }
}

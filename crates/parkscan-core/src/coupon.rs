//! # Coupon
//!
//! The coupon record returned by the parking API's check endpoint.
//!
//! ## Wire Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Coupon (JSON)                                   │
//! │                                                                         │
//! │  {                                                                      │
//! │    "parkinglot_coupon_name": "2h free parking",                         │
//! │    "parkinglot": "lot-001",                                             │
//! │    "check": false,                                                      │
//! │    "used_at": "2015-03-7T14:05:00",   ◄── day may be unpadded           │
//! │    "price": 0.0,                                                        │
//! │    "origin_price": 10.0,                                                │
//! │    "desc": "Valid on weekdays"                                          │
//! │  }                                                                      │
//! │                                                                         │
//! │  Missing or null fields fall back to defaults, and prices may arrive   │
//! │  as numeric strings ("10.00"). The record is never rejected because    │
//! │  an optional attribute is absent or unparseable.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::USED_AT_FORMAT;

/// A parking-lot coupon as known by the server.
///
/// Constructed only from server responses; there are no mutators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coupon {
    /// Display name of the coupon.
    #[serde(deserialize_with = "null_as_default")]
    pub parkinglot_coupon_name: String,

    /// Parking lot the coupon belongs to.
    pub parkinglot: Option<String>,

    /// True when the coupon has been checked (used).
    #[serde(deserialize_with = "lenient_bool")]
    pub check: bool,

    /// Raw server timestamp of the last use.
    pub used_at: Option<String>,

    /// Current (discounted) price.
    #[serde(deserialize_with = "lenient_f64")]
    pub price: f64,

    /// Original price before the discount.
    #[serde(deserialize_with = "lenient_f64")]
    pub origin_price: f64,

    /// Free-text description.
    pub desc: Option<String>,

    /// Description under its long key. Some endpoints send both.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parkinglot_coupon_desc: Option<String>,
}

impl Coupon {
    /// Display name.
    pub fn name(&self) -> &str {
        &self.parkinglot_coupon_name
    }

    /// Description, or an empty string.
    ///
    /// `desc` wins over `parkinglot_coupon_desc` unless it is blank.
    pub fn description(&self) -> &str {
        [&self.desc, &self.parkinglot_coupon_desc]
            .into_iter()
            .filter_map(|d| d.as_deref())
            .find(|d| !d.trim().is_empty())
            .unwrap_or_default()
    }

    /// Parses `used_at`. A malformed timestamp is treated as absent.
    ///
    /// Only the leading `date T time` part is read; a zone designator or
    /// fractional seconds after it are ignored.
    pub fn used_at(&self) -> Option<NaiveDateTime> {
        let raw = self.used_at.as_deref()?;
        NaiveDateTime::parse_and_remainder(raw.trim(), USED_AT_FORMAT)
            .ok()
            .map(|(parsed, _rest)| parsed)
    }

    /// Timestamp to show for this coupon.
    ///
    /// A checked coupon was consumed by the request that returned it, so
    /// its use time is `now`; otherwise the server's `used_at` applies.
    pub fn effective_used_at(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        if self.check {
            Some(now)
        } else {
            self.used_at()
        }
    }

    /// Amount saved relative to the original price, never negative.
    pub fn discount(&self) -> f64 {
        (self.origin_price - self.price).max(0.0)
    }
}

// =============================================================================
// Lenient Field Decoding
// =============================================================================

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a number, a numeric string, or null (as 0).
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    match Option::<Price>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Price::Number(n)) => Ok(n),
        Some(Price::Text(s)) => match s.trim() {
            "" => Ok(0.0),
            s => s.parse::<f64>().map_err(serde::de::Error::custom),
        },
    }
}

/// Accepts a bool, `"true"`/`"false"`, or null (as false).
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => s.trim().eq_ignore_ascii_case("true"),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "parkinglot_coupon_name": "2h free",
            "parkinglot": "lot-001",
            "check": false,
            "used_at": "2015-03-07T14:05:00",
            "price": 0.0,
            "origin_price": 10.0,
            "desc": "Weekdays only"
        }"#;
        let coupon: Coupon = serde_json::from_str(json).unwrap();
        assert_eq!(coupon.name(), "2h free");
        assert_eq!(coupon.description(), "Weekdays only");
        assert_eq!(coupon.used_at(), Some(at(2015, 3, 7, 14, 5, 0)));
        assert!((coupon.discount() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_fields_default() {
        let coupon: Coupon = serde_json::from_str("{}").unwrap();
        assert_eq!(coupon, Coupon::default());
        assert!(coupon.used_at().is_none());
    }

    #[test]
    fn test_long_desc_key() {
        let coupon: Coupon =
            serde_json::from_str(r#"{"parkinglot_coupon_desc": "Night rate"}"#).unwrap();
        assert_eq!(coupon.description(), "Night rate");

        let both: Coupon = serde_json::from_str(
            r#"{"desc": "Weekdays", "parkinglot_coupon_desc": "Night rate"}"#,
        )
        .unwrap();
        assert_eq!(both.description(), "Weekdays");

        let blank_short: Coupon =
            serde_json::from_str(r#"{"desc": " ", "parkinglot_coupon_desc": "Night rate"}"#)
                .unwrap();
        assert_eq!(blank_short.description(), "Night rate");
    }

    #[test]
    fn test_prices_as_strings() {
        let coupon: Coupon =
            serde_json::from_str(r#"{"price": "2.50", "origin_price": "10.00"}"#).unwrap();
        assert!((coupon.price - 2.5).abs() < f64::EPSILON);
        assert!((coupon.origin_price - 10.0).abs() < f64::EPSILON);
        assert!((coupon.discount() - 7.5).abs() < f64::EPSILON);

        let integer: Coupon = serde_json::from_str(r#"{"origin_price": 10}"#).unwrap();
        assert!((integer.origin_price - 10.0).abs() < f64::EPSILON);

        assert!(serde_json::from_str::<Coupon>(r#"{"price": "free"}"#).is_err());
    }

    #[test]
    fn test_nulls_default() {
        let json = r#"{
            "parkinglot_coupon_name": null,
            "check": null,
            "price": null,
            "origin_price": null,
            "used_at": null,
            "desc": null
        }"#;
        let coupon: Coupon = serde_json::from_str(json).unwrap();
        assert_eq!(coupon, Coupon::default());
    }

    #[test]
    fn test_check_as_string() {
        let coupon: Coupon = serde_json::from_str(r#"{"check": "true"}"#).unwrap();
        assert!(coupon.check);
    }

    #[test]
    fn test_unpadded_day_parses() {
        let coupon = Coupon {
            used_at: Some("2015-03-7T09:00:00".into()),
            ..Default::default()
        };
        assert_eq!(coupon.used_at(), Some(at(2015, 3, 7, 9, 0, 0)));
    }

    #[test]
    fn test_used_at_ignores_trailing_zone_and_fraction() {
        for raw in [
            "2015-03-25T10:11:12Z",
            "2015-03-25T10:11:12+08:00",
            "2015-03-25T10:11:12.123456",
        ] {
            let coupon = Coupon {
                used_at: Some(raw.into()),
                ..Default::default()
            };
            assert_eq!(coupon.used_at(), Some(at(2015, 3, 25, 10, 11, 12)), "input: {raw}");
        }
    }

    #[test]
    fn test_malformed_used_at_is_absent() {
        for raw in ["yesterday", "2015-03-07", "2015-13-01T00:00:00", ""] {
            let coupon = Coupon {
                used_at: Some(raw.into()),
                ..Default::default()
            };
            assert!(coupon.used_at().is_none(), "input: {raw}");
        }
    }

    #[test]
    fn test_effective_used_at_when_checked() {
        let now = at(2024, 1, 2, 3, 4, 5);
        let coupon = Coupon {
            check: true,
            used_at: Some("2015-03-07T14:05:00".into()),
            ..Default::default()
        };
        assert_eq!(coupon.effective_used_at(now), Some(now));

        let unchecked = Coupon {
            check: false,
            ..coupon
        };
        assert_eq!(
            unchecked.effective_used_at(now),
            Some(at(2015, 3, 7, 14, 5, 0))
        );
    }
}

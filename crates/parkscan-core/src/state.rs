//! # Scan States and Policies
//!
//! ## Capture State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Capture States                                     │
//! │                                                                         │
//! │               restart (only from SUCCESS)                               │
//! │   ┌─────────┐ ─────────────────────────────► ┌─────────┐               │
//! │   │ SUCCESS │                                 │ PREVIEW │ ◄──┐          │
//! │   └─────────┘ ◄───────────────────────────── └────┬────┘    │          │
//! │     (initial)        decode succeeded              │  decode failed     │
//! │                                                    └────────┘          │
//! │                                                                         │
//! │   any state ──── shutdown ────► ┌──────┐                                │
//! │                                 │ DONE │  (terminal)                    │
//! │                                 └──────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// =============================================================================
// Scan State
// =============================================================================

/// State of the capture coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    /// A decode request is outstanding.
    Preview,

    /// Ready to accept a result or re-arm the camera.
    #[default]
    Success,

    /// Shutting down; nothing else is dispatched.
    Done,
}

impl ScanState {
    /// True once the coordinator has shut down.
    pub fn is_done(&self) -> bool {
        matches!(self, ScanState::Done)
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanState::Preview => write!(f, "preview"),
            ScanState::Success => write!(f, "success"),
            ScanState::Done => write!(f, "done"),
        }
    }
}

// =============================================================================
// Scan Purpose
// =============================================================================

/// What the host wants done with a scan result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPurpose {
    /// Hand the first result back to the caller and stop.
    Decode,

    /// Look up and redeem parking coupons.
    #[default]
    Redeem,

    /// Keep scanning without acting on results.
    Preview,
}

impl std::fmt::Display for ScanPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanPurpose::Decode => write!(f, "decode"),
            ScanPurpose::Redeem => write!(f, "redeem"),
            ScanPurpose::Preview => write!(f, "preview"),
        }
    }
}

impl std::str::FromStr for ScanPurpose {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "decode" => Ok(ScanPurpose::Decode),
            "redeem" | "coupon" => Ok(ScanPurpose::Redeem),
            "preview" => Ok(ScanPurpose::Preview),
            other => Err(CoreError::UnknownVariant {
                kind: "scan purpose",
                value: other.to_string(),
                allowed: "decode, redeem, preview",
            }),
        }
    }
}

// =============================================================================
// Duplicate Policy
// =============================================================================

/// How a scan identical to the last handled one is treated.
///
/// ## Policy Comparison
/// ```text
/// REPROCESS (default)                 │  DEBOUNCE
/// ───────────────────                 │  ────────
/// • Every scan is handled             │  • Same text twice in a row is
/// • Rescanning after a failure        │    skipped and the preview is
///   retries the request               │    re-armed instead
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Handle every scan.
    #[default]
    Reprocess,

    /// Skip consecutive identical scans.
    Debounce,
}

impl DuplicatePolicy {
    /// Returns true if `current` should be skipped given the last handled text.
    pub fn should_skip(&self, last: Option<&str>, current: &str) -> bool {
        match self {
            DuplicatePolicy::Reprocess => false,
            DuplicatePolicy::Debounce => last == Some(current),
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicatePolicy::Reprocess => write!(f, "reprocess"),
            DuplicatePolicy::Debounce => write!(f, "debounce"),
        }
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reprocess" | "off" => Ok(DuplicatePolicy::Reprocess),
            "debounce" | "on" => Ok(DuplicatePolicy::Debounce),
            other => Err(CoreError::UnknownVariant {
                kind: "duplicate policy",
                value: other.to_string(),
                allowed: "reprocess, debounce",
            }),
        }
    }
}

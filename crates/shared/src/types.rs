//! Common types used across the redirect pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on percent-decoding passes for a single target
pub const MAX_DECODE_PASSES: u8 = 5;

/// HTTP status used for broker redirects (302 Found)
pub const REDIRECT_STATUS: u16 = 302;

// =============================================================================
// Request
// =============================================================================

/// An incoming `/encode` request as seen by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRequest {
    /// Request URL including the query string (origin-form or absolute)
    pub url: String,
    /// Value of the `Referer` header, if any
    pub referrer: Option<String>,
}

impl IncomingRequest {
    pub fn new(url: impl Into<String>, referrer: Option<String>) -> Self {
        Self {
            url: url.into(),
            referrer,
        }
    }

    /// Referrer with empty header values treated as absent
    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref().filter(|r| !r.is_empty())
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// A target URL after bounded iterative percent-decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTarget {
    pub value: String,
    /// Number of decode passes that completed successfully
    pub passes: u8,
}

impl DecodedTarget {
    pub fn new(value: impl Into<String>, passes: u8) -> Self {
        Self {
            value: value.into(),
            passes,
        }
    }

    /// True when decoding stopped because the pass limit was reached
    pub fn hit_pass_limit(&self) -> bool {
        self.passes >= MAX_DECODE_PASSES
    }
}

// =============================================================================
// Verification
// =============================================================================

/// Why a request failed verification. Logged, never returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    EmptyUrl,
    InvalidHost,
    InvalidReferrer,
    Unparseable,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::EmptyUrl => "empty_url",
            RejectReason::InvalidHost => "invalid_host",
            RejectReason::InvalidReferrer => "invalid_referrer",
            RejectReason::Unparseable => "unparseable",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of host/referrer verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    Valid,
    Invalid(RejectReason),
}

impl VerificationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            VerificationResult::Valid => None,
            VerificationResult::Invalid(reason) => Some(*reason),
        }
    }
}

// =============================================================================
// Redirect
// =============================================================================

/// Final redirect instruction handed back to the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResult {
    pub location: String,
    pub status: u16,
}

impl RedirectResult {
    /// A temporary (302) redirect to `location`
    pub fn found(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: REDIRECT_STATUS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_referrer_is_absent() {
        let request = IncomingRequest::new("/encode?url=x", Some(String::new()));
        assert_eq!(request.referrer(), None);

        let request = IncomingRequest::new("/encode?url=x", Some("https://lib.edu".into()));
        assert_eq!(request.referrer(), Some("https://lib.edu"));
    }

    #[test]
    fn test_pass_limit() {
        assert!(!DecodedTarget::new("a", 1).hit_pass_limit());
        assert!(DecodedTarget::new("a", MAX_DECODE_PASSES).hit_pass_limit());
    }

    #[test]
    fn test_reject_reason_serialization() {
        assert_eq!(
            serde_json::to_string(&RejectReason::InvalidHost).unwrap(),
            "\"invalid_host\""
        );
        assert_eq!(RejectReason::InvalidReferrer.to_string(), "invalid_referrer");
    }

    #[test]
    fn test_verification_result_reason() {
        assert!(VerificationResult::Valid.is_valid());
        assert_eq!(VerificationResult::Valid.reason(), None);
        assert_eq!(
            VerificationResult::Invalid(RejectReason::EmptyUrl).reason(),
            Some(RejectReason::EmptyUrl)
        );
    }

    #[test]
    fn test_redirect_found_status() {
        let redirect = RedirectResult::found("https://broker/redirector?url=x");
        assert_eq!(redirect.status, 302);
    }
}

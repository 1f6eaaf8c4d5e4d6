// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition types and reasons for `DNSZone` resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   aws:
//!     zoneId: /hostedzone/Z0123456789ABCDEFGHIJ
//!   nameServers:
//!     - ns-1.awsdns-01.org.
//!     - ns-2.awsdns-02.co.uk.
//!   conditions:
//!     - type: ZoneAvailable
//!       status: "True"
//!       reason: ZoneAvailable
//!       message: "Hosted zone /hostedzone/Z0123456789ABCDEFGHIJ is available"
//!     - type: InsufficientCredentials
//!       status: "False"
//!       reason: AccessGranted
//!       message: "credentials are valid"
//! ```

// ============================================================================
// Condition Status Values
// ============================================================================

/// Condition status when the signal is raised
pub const CONDITION_STATUS_TRUE: &str = "True";

/// Condition status when the signal is cleared
pub const CONDITION_STATUS_FALSE: &str = "False";

// ============================================================================
// Condition Types
// ============================================================================

/// Raised when the provider rejects a call because the credentials lack a permission.
pub const CONDITION_TYPE_INSUFFICIENT_CREDENTIALS: &str = "InsufficientCredentials";

/// Raised when the provider cannot authenticate the credentials at all.
pub const CONDITION_TYPE_AUTHENTICATION_FAILURE: &str = "AuthenticationFailure";

/// Reports whether the hosted zone exists and its name servers are known.
pub const CONDITION_TYPE_ZONE_AVAILABLE: &str = "ZoneAvailable";

// ============================================================================
// Credential Reasons
// ============================================================================

/// The provider answered `AccessDenied`/`AccessDeniedException`.
pub const REASON_ACCESS_DENIED: &str = "AccessDenied";

/// No access denial was observed on the last pass.
pub const REASON_ACCESS_GRANTED: &str = "AccessGranted";

/// The provider answered `InvalidSignatureException`/`UnrecognizedClientException`.
pub const REASON_AUTHENTICATION_FAILED: &str = "AuthenticationFailed";

/// No authentication failure was observed on the last pass.
pub const REASON_AUTHENTICATION_SUCCEEDED: &str = "AuthenticationSucceeded";

/// Message stored with `InsufficientCredentials=True`.
///
/// The raw provider message embeds the caller identity, which may be generated
/// per session; storing it would rewrite status on every pass.
pub const MESSAGE_ACCESS_DENIED: &str =
    "AccessDenied error encountered (see controller logs for details)";

/// Message stored with `InsufficientCredentials=False`.
pub const MESSAGE_CREDENTIALS_VALID: &str = "credentials are valid";

/// Message stored with `AuthenticationFailure=False`.
pub const MESSAGE_CREDENTIALS_AUTHENTICATED: &str = "credentials authenticated";

// ============================================================================
// Zone Reasons
// ============================================================================

/// Hosted zone exists and name servers were retrieved.
pub const REASON_ZONE_AVAILABLE: &str = "ZoneAvailable";

/// The last pass failed before the zone could be confirmed.
pub const REASON_ZONE_NOT_AVAILABLE: &str = "ZoneNotAvailable";

/// The resource is being deleted and the hosted zone is being torn down.
pub const REASON_ZONE_DELETING: &str = "ZoneDeleting";

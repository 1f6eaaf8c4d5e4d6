// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the zonekeeper operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all zonekeeper CRDs
pub const API_GROUP: &str = "zonekeeper.firestoned.io";

/// API version for all zonekeeper CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "zonekeeper.firestoned.io/v1alpha1";

/// Kind name for `DNSZone` resource
pub const KIND_DNS_ZONE: &str = "DNSZone";

/// Finalizer placed on every `DNSZone` so the hosted zone is removed before the resource
pub const DNSZONE_FINALIZER: &str = "zonekeeper.firestoned.io/finalizer";

// ============================================================================
// Route53 Constants
// ============================================================================

/// Region used when a `DNSZone` does not override it.
///
/// Route53 is a global service; its control plane lives in us-east-1.
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Tag key marking a hosted zone as owned by a `DNSZone` resource.
///
/// The value is `<namespace>/<name>` of the owning resource.
pub const DNSZONE_OWNER_TAG: &str = "zonekeeper.firestoned.io/dnszone";

/// Resource type filter passed to the resource groups tagging API
pub const HOSTED_ZONE_RESOURCE_TYPE_FILTER: &str = "route53:hostedzone";

/// Resource prefix of a hosted zone ARN (`arn:aws:route53:::hostedzone/<id>`)
pub const HOSTED_ZONE_ARN_RESOURCE: &str = "hostedzone";

/// Maximum tags added and maximum tag keys removed by one `ChangeTagsForResource` call
pub const MAX_TAG_CHANGES_PER_CALL: usize = 10;

/// Page size used when listing hosted zones by name
pub const HOSTED_ZONES_PAGE_SIZE: i32 = 50;

/// Page size used when sweeping record sets from a hosted zone
pub const RECORD_SETS_PAGE_SIZE: i32 = 100;

/// Page size of the apex NS lookup; exactly one record set is expected
pub const NAME_SERVER_QUERY_PAGE_SIZE: i32 = 1;

/// Name server record type
pub const RECORD_TYPE_NS: &str = "NS";

/// Start of authority record type
pub const RECORD_TYPE_SOA: &str = "SOA";

// ============================================================================
// Route53 Error Codes
// ============================================================================

/// Returned by `GetHostedZone` when the id does not exist
pub const ERROR_CODE_NO_SUCH_HOSTED_ZONE: &str = "NoSuchHostedZone";

/// Returned by `CreateHostedZone` when the caller reference was already used
pub const ERROR_CODE_HOSTED_ZONE_ALREADY_EXISTS: &str = "HostedZoneAlreadyExists";

/// Returned by `DeleteHostedZone` while non-apex records remain
pub const ERROR_CODE_HOSTED_ZONE_NOT_EMPTY: &str = "HostedZoneNotEmpty";

/// Error codes meaning the credentials lack a permission
pub const ACCESS_DENIED_ERROR_CODES: &[&str] = &["AccessDeniedException", "AccessDenied"];

/// Error codes meaning the credentials could not be authenticated
pub const AUTHENTICATION_FAILURE_ERROR_CODES: &[&str] =
    &["InvalidSignatureException", "UnrecognizedClientException"];

// ============================================================================
// Controller Constants
// ============================================================================

/// Requeue interval once a zone is available (5 minutes)
pub const REQUEUE_WHEN_READY_SECS: u64 = 300;

/// Requeue interval while a zone is not yet available (30 seconds)
pub const REQUEUE_WHEN_NOT_READY_SECS: u64 = 30;

/// Requeue interval after a failed reconciliation (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Worker threads of the controller runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

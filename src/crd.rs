// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for hosted zone management.
//!
//! # Resource Types
//!
//! - [`DNSZone`] - Declares a DNS zone that must exist as a Route53 hosted zone
//!
//! # Example: Declaring a DNS Zone
//!
//! ```rust,no_run
//! use zonekeeper::crd::{AWSDNSZoneSpec, AWSResourceTag, DNSZoneSpec};
//!
//! let spec = DNSZoneSpec {
//!     zone: "apps.example.com".to_string(),
//!     aws: Some(AWSDNSZoneSpec {
//!         region: None,
//!         additional_tags: vec![AWSResourceTag {
//!             key: "team".to_string(),
//!             value: "platform".to_string(),
//!         }],
//!     }),
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition, e.g. `InsufficientCredentials`, `AuthenticationFailure`, `ZoneAvailable`.
    pub r#type: String,

    /// Status of the condition: True or False.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    /// Last time the condition was written (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_probe_time: Option<String>,
}

/// A single tag applied to the hosted zone in addition to the ownership tag.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct AWSResourceTag {
    /// Tag key
    pub key: String,

    /// Tag value
    pub value: String,
}

/// AWS specific settings of a `DNSZone`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AWSDNSZoneSpec {
    /// Region the Route53 and tagging clients are scoped to.
    ///
    /// Defaults to us-east-1 when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Tags applied to the hosted zone. Keys must be unique.
    #[serde(default)]
    pub additional_tags: Vec<AWSResourceTag>,
}

/// AWS specific state of a `DNSZone`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AWSDNSZoneStatus {
    /// Route53 hosted zone id, once discovered or created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

/// `DNSZone` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DNSZoneStatus {
    /// Provider specific state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AWSDNSZoneStatus>,

    /// Authoritative name servers of the hosted zone, in provider order.
    #[serde(default)]
    pub name_servers: Vec<String>,

    /// Generation of the spec that was last synced to the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_generation: Option<i64>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl DNSZoneStatus {
    /// Route53 hosted zone id recorded in status, if any.
    #[must_use]
    pub fn zone_id(&self) -> Option<&str> {
        self.aws.as_ref().and_then(|aws| aws.zone_id.as_deref())
    }
}

/// `DNSZone` declares a DNS zone hosted by AWS Route53.
///
/// The operator creates the hosted zone when it is missing, keeps its tags in
/// line with the spec, reports its name servers, and removes it (records first)
/// when the resource is deleted.
///
/// # Example
///
/// ```yaml
/// apiVersion: zonekeeper.firestoned.io/v1alpha1
/// kind: DNSZone
/// metadata:
///   name: apps-example-com
///   namespace: dns-system
/// spec:
///   zone: apps.example.com
///   aws:
///     additionalTags:
///       - key: team
///         value: platform
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "zonekeeper.firestoned.io",
    version = "v1alpha1",
    kind = "DNSZone",
    namespaced,
    shortname = "dz",
    doc = "DNSZone declares a DNS zone that is hosted by AWS Route53. The operator creates the hosted zone, reconciles its tags and reports its authoritative name servers.",
    printcolumn = r#"{"name":"Zone","type":"string","jsonPath":".spec.zone"}"#,
    printcolumn = r#"{"name":"ZoneID","type":"string","jsonPath":".status.aws.zoneId"}"#
)]
#[kube(status = "DNSZoneStatus")]
#[serde(rename_all = "camelCase")]
pub struct DNSZoneSpec {
    /// DNS zone name (e.g., "apps.example.com"), without a trailing dot.
    #[schemars(regex(
        pattern = r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)*[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$"
    ))]
    pub zone: String,

    /// AWS specific settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AWSDNSZoneSpec>,
}

impl DNSZoneSpec {
    /// Region override, or `None` when the default region applies.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.aws
            .as_ref()
            .and_then(|aws| aws.region.as_deref())
            .filter(|region| !region.is_empty())
    }

    /// User declared tags, in declaration order.
    #[must_use]
    pub fn additional_tags(&self) -> &[AWSResourceTag] {
        self.aws
            .as_ref()
            .map_or(&[], |aws| aws.additional_tags.as_slice())
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route53 client abstraction.
//!
//! The actuator talks to AWS exclusively through [`Route53Api`], which exposes the
//! handful of Route53 and resource groups tagging operations it needs, one page at
//! a time. [`sdk::SdkRoute53Client`] is the production implementation; tests use an
//! in-memory fake.
//!
//! All methods return [`ProviderError`] so that service error codes survive the
//! trip back to the actuator's error classifier.

pub mod sdk;

#[cfg(test)]
pub mod test_mocks;

use async_trait::async_trait;

use crate::dns_errors::ProviderError;

/// Prefix Route53 puts in front of hosted zone ids.
pub const HOSTED_ZONE_ID_PREFIX: &str = "/hostedzone/";

/// Strip [`HOSTED_ZONE_ID_PREFIX`] from a hosted zone id, if present.
///
/// The tag operations address the zone by its bare id (`Z0123456789ABCDEFGHIJ`); the
/// SDK does not strip the prefix for them and would percent-encode it into the path.
#[must_use]
pub fn bare_hosted_zone_id(id: &str) -> &str {
    id.strip_prefix(HOSTED_ZONE_ID_PREFIX).unwrap_or(id)
}

/// A Route53 hosted zone as returned by the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostedZone {
    /// Provider id, e.g. `/hostedzone/Z0123456789ABCDEFGHIJ`.
    ///
    /// `GetHostedZone`, `ListResourceRecordSets`, `ChangeResourceRecordSets` and
    /// `DeleteHostedZone` accept this form as is. The tag operations take the bare id,
    /// see [`bare_hosted_zone_id`].
    pub id: String,
    /// Fully qualified zone name, with trailing dot
    pub name: String,
    /// Caller reference supplied at creation time
    pub caller_reference: String,
}

/// A resource tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Alias target of an alias record set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasTarget {
    pub hosted_zone_id: String,
    pub dns_name: String,
    pub evaluate_target_health: bool,
}

/// A Route53 resource record set.
///
/// Carries every routing attribute Route53 matches on, so a listed record set can be
/// submitted back verbatim in a DELETE change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordSet {
    /// Fully qualified name, with trailing dot
    pub name: String,
    /// Record type, e.g. "A", "NS", "SOA"
    pub record_type: String,
    pub set_identifier: Option<String>,
    pub ttl: Option<i64>,
    /// Record values in provider order
    pub values: Vec<String>,
    pub alias_target: Option<AliasTarget>,
    pub weight: Option<i64>,
    pub region: Option<String>,
    pub failover: Option<String>,
    pub multi_value_answer: Option<bool>,
    pub health_check_id: Option<String>,
}

/// Change applied to a record set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeAction {
    Delete,
    Upsert,
}

/// One entry of a `ChangeResourceRecordSets` batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordSetChange {
    pub action: ChangeAction,
    pub record_set: RecordSet,
}

/// Position and size of a `ListResourceRecordSets` page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordSetsQuery {
    pub start_record_name: Option<String>,
    pub start_record_type: Option<String>,
    pub start_record_identifier: Option<String>,
    pub max_items: i32,
}

/// One page of record sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordSetsPage {
    pub record_sets: Vec<RecordSet>,
    pub is_truncated: bool,
    pub next_record_name: Option<String>,
    pub next_record_type: Option<String>,
    pub next_record_identifier: Option<String>,
}

/// One page of hosted zones, ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostedZonesPage {
    pub hosted_zones: Vec<HostedZone>,
    pub is_truncated: bool,
    pub next_dns_name: Option<String>,
    pub next_hosted_zone_id: Option<String>,
}

/// One page of a resource groups tagging search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaggedResourcesPage {
    /// ARNs of the matching resources
    pub resource_arns: Vec<String>,
    /// Token of the next page; `None` once the search is exhausted
    pub pagination_token: Option<String>,
}

/// Route53 operations consumed by the hosted zone actuator.
///
/// Implementations must not retry internally; the reconcile loop retries whole passes.
///
/// Zone ids are passed as [`HostedZone::id`] returns them, except for
/// [`list_tags_for_hosted_zone`](Self::list_tags_for_hosted_zone) and
/// [`change_tags_for_hosted_zone`](Self::change_tags_for_hosted_zone), which take the
/// bare id.
#[async_trait]
pub trait Route53Api: Send + Sync {
    /// `CreateHostedZone` with a caller supplied idempotency token.
    async fn create_hosted_zone(
        &self,
        name: &str,
        caller_reference: &str,
    ) -> Result<HostedZone, ProviderError>;

    /// `GetHostedZone`
    async fn get_hosted_zone(&self, id: &str) -> Result<HostedZone, ProviderError>;

    /// `ListHostedZonesByName`, starting at `dns_name` (and `hosted_zone_id` when continuing).
    async fn list_hosted_zones_by_name(
        &self,
        dns_name: &str,
        hosted_zone_id: Option<&str>,
        max_items: i32,
    ) -> Result<HostedZonesPage, ProviderError>;

    /// `ListResourceRecordSets`
    async fn list_resource_record_sets(
        &self,
        zone_id: &str,
        query: &RecordSetsQuery,
    ) -> Result<RecordSetsPage, ProviderError>;

    /// `ChangeResourceRecordSets` with a single change batch.
    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        changes: Vec<RecordSetChange>,
    ) -> Result<(), ProviderError>;

    /// `ListTagsForResource` for a hosted zone, addressed by its bare id.
    async fn list_tags_for_hosted_zone(&self, zone_id: &str) -> Result<Vec<Tag>, ProviderError>;

    /// `ChangeTagsForResource` for a hosted zone, addressed by its bare id. At most 10
    /// additions and 10 removals.
    async fn change_tags_for_hosted_zone(
        &self,
        zone_id: &str,
        add_tags: Vec<Tag>,
        remove_tag_keys: Vec<String>,
    ) -> Result<(), ProviderError>;

    /// `DeleteHostedZone`
    async fn delete_hosted_zone(&self, id: &str) -> Result<(), ProviderError>;

    /// Resource groups tagging `GetResources` filtered by resource type and one tag.
    async fn get_resources_by_tag(
        &self,
        resource_type_filter: &str,
        tag_key: &str,
        tag_value: &str,
        pagination_token: Option<&str>,
    ) -> Result<TaggedResourcesPage, ProviderError>;
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory Route53 used by unit tests.
//!
//! Keeps hosted zones, tags and record sets in a mutex guarded state, pages through
//! them the way Route53 does, and records every mutating call so tests can assert on
//! the exact requests the actuator sends. Errors can be scripted per operation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{
    bare_hosted_zone_id, ChangeAction, HostedZone, HostedZonesPage, RecordSet, RecordSetChange,
    RecordSetsPage, RecordSetsQuery, Route53Api, Tag, TaggedResourcesPage, HOSTED_ZONE_ID_PREFIX,
};
use crate::actuator::dotted;
use crate::constants::{
    ERROR_CODE_HOSTED_ZONE_ALREADY_EXISTS, ERROR_CODE_HOSTED_ZONE_NOT_EMPTY,
    ERROR_CODE_NO_SUCH_HOSTED_ZONE, MAX_TAG_CHANGES_PER_CALL, RECORD_TYPE_NS, RECORD_TYPE_SOA,
};
use crate::crd::{AWSDNSZoneSpec, AWSResourceTag, DNSZone, DNSZoneSpec};
use crate::dns_errors::ProviderError;

pub const OP_CREATE_HOSTED_ZONE: &str = "CreateHostedZone";
pub const OP_GET_HOSTED_ZONE: &str = "GetHostedZone";
pub const OP_LIST_HOSTED_ZONES_BY_NAME: &str = "ListHostedZonesByName";
pub const OP_LIST_RESOURCE_RECORD_SETS: &str = "ListResourceRecordSets";
pub const OP_CHANGE_RESOURCE_RECORD_SETS: &str = "ChangeResourceRecordSets";
pub const OP_LIST_TAGS_FOR_RESOURCE: &str = "ListTagsForResource";
pub const OP_CHANGE_TAGS_FOR_RESOURCE: &str = "ChangeTagsForResource";
pub const OP_DELETE_HOSTED_ZONE: &str = "DeleteHostedZone";
pub const OP_GET_RESOURCES: &str = "GetResources";

/// Namespace of the resources built by [`test_dnszone`].
pub const TEST_NAMESPACE: &str = "dns-system";
/// Name of the resources built by [`test_dnszone`].
pub const TEST_NAME: &str = "example";
/// UID of the resources built by [`test_dnszone`].
pub const TEST_UID: &str = "6f1c0b5e-0c8a-4d5e-9a51-2f0f5c7d1e11";

/// Build a `DNSZone` for `zone` with the given additional tags.
pub fn test_dnszone(zone: &str, additional_tags: &[(&str, &str)]) -> DNSZone {
    let aws = if additional_tags.is_empty() {
        None
    } else {
        Some(AWSDNSZoneSpec {
            region: None,
            additional_tags: additional_tags
                .iter()
                .map(|(key, value)| AWSResourceTag {
                    key: (*key).to_string(),
                    value: (*value).to_string(),
                })
                .collect(),
        })
    };

    let mut dnszone = DNSZone::new(
        TEST_NAME,
        DNSZoneSpec {
            zone: zone.to_string(),
            aws,
        },
    );
    dnszone.metadata.namespace = Some(TEST_NAMESPACE.to_string());
    dnszone.metadata.uid = Some(TEST_UID.to_string());
    dnszone.metadata.generation = Some(1);
    dnszone
}

/// Value of the ownership tag for resources built by [`test_dnszone`].
pub fn test_owner_tag_value() -> String {
    format!("{TEST_NAMESPACE}/{TEST_NAME}")
}

/// A service error with the given code.
pub fn service_error(operation: &str, code: &str, message: &str) -> ProviderError {
    ProviderError::service(operation, code, message)
}

/// A plain record set with one value.
pub fn record(name: &str, record_type: &str, value: &str) -> RecordSet {
    RecordSet {
        name: name.to_string(),
        record_type: record_type.to_string(),
        ttl: Some(300),
        values: vec![value.to_string()],
        ..RecordSet::default()
    }
}

/// One `ChangeTagsForResource` request as received by the fake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagChangeCall {
    pub zone_id: String,
    pub add_tags: Vec<Tag>,
    pub remove_tag_keys: Vec<String>,
}

#[derive(Default)]
struct FakeState {
    /// Zones by bare id (no `/hostedzone/` prefix)
    zones: HashMap<String, HostedZone>,
    tags: HashMap<String, Vec<Tag>>,
    record_sets: HashMap<String, Vec<RecordSet>>,
    /// ARNs returned by the tag search in addition to the tagged zones
    extra_arns: Vec<String>,
    search_page_size: Option<usize>,
    record_pages: VecDeque<RecordSetsPage>,
    errors: HashMap<&'static str, VecDeque<ProviderError>>,
    next_zone: usize,

    calls: Vec<&'static str>,
    tag_changes: Vec<TagChangeCall>,
    record_changes: Vec<Vec<RecordSetChange>>,
    record_queries: Vec<RecordSetsQuery>,
    zone_name_queries: Vec<(String, Option<String>)>,
    search_tokens: Vec<Option<String>>,
    deleted_zones: Vec<String>,
}

impl FakeState {
    fn take_error(&mut self, operation: &'static str) -> Result<(), ProviderError> {
        self.calls.push(operation);
        match self.errors.get_mut(operation).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn zone(&self, id: &str) -> Result<&HostedZone, ProviderError> {
        self.zones.get(bare_id(id)).ok_or_else(|| {
            service_error(
                OP_GET_HOSTED_ZONE,
                ERROR_CODE_NO_SUCH_HOSTED_ZONE,
                &format!("No hosted zone found with ID: {}", bare_id(id)),
            )
        })
    }
}

fn bare_id(id: &str) -> &str {
    bare_hosted_zone_id(id)
}

/// The tag API only knows bare ids; a prefixed id names a zone that does not exist.
fn tagged_zone_id(operation: &str, id: &str) -> Result<(), ProviderError> {
    if id.starts_with(HOSTED_ZONE_ID_PREFIX) {
        return Err(service_error(
            operation,
            ERROR_CODE_NO_SUCH_HOSTED_ZONE,
            &format!("No hosted zone found with ID: {id}"),
        ));
    }
    Ok(())
}

fn arn_for(id: &str) -> String {
    format!("arn:aws:route53:::hostedzone/{}", bare_id(id))
}

fn record_key(record_set: &RecordSet) -> (&str, &str, Option<&str>) {
    (
        record_set.name.as_str(),
        record_set.record_type.as_str(),
        record_set.set_identifier.as_deref(),
    )
}

/// In-memory [`Route53Api`].
///
/// Cloning shares the state, so a test can keep a handle while the actuator owns
/// another.
#[derive(Clone, Default)]
pub struct FakeRoute53 {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRoute53 {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Add a zone named `name` with its apex NS and SOA record sets. Returns it.
    pub fn add_zone(&self, name: &str, caller_reference: &str) -> HostedZone {
        let mut state = self.state();
        state.next_zone += 1;
        let bare = format!("ZFAKE{:04}", state.next_zone);
        let apex = dotted(name);
        let zone = HostedZone {
            id: format!("/hostedzone/{bare}"),
            name: apex.clone(),
            caller_reference: caller_reference.to_string(),
        };

        let name_servers = RecordSet {
            name: apex.clone(),
            record_type: RECORD_TYPE_NS.to_string(),
            ttl: Some(172_800),
            values: vec![
                "ns-2048.awsdns-64.com.".to_string(),
                "ns-0.awsdns-00.net.".to_string(),
                "ns-1536.awsdns-00.co.uk.".to_string(),
                "ns-1024.awsdns-00.org.".to_string(),
            ],
            ..RecordSet::default()
        };
        let soa = record(
            &apex,
            RECORD_TYPE_SOA,
            "ns-2048.awsdns-64.com. awsdns-hostmaster.amazon.com. 1 7200 900 1209600 86400",
        );

        state.zones.insert(bare.clone(), zone.clone());
        state.record_sets.insert(bare.clone(), vec![soa, name_servers]);
        state.tags.insert(bare, Vec::new());
        zone
    }

    /// Add a zone carrying the ownership tag of [`test_dnszone`].
    pub fn add_owned_zone(&self, name: &str, caller_reference: &str) -> HostedZone {
        let zone = self.add_zone(name, caller_reference);
        self.set_tags(
            &zone.id,
            vec![Tag::new(
                crate::constants::DNSZONE_OWNER_TAG,
                test_owner_tag_value(),
            )],
        );
        zone
    }

    pub fn set_tags(&self, zone_id: &str, tags: Vec<Tag>) {
        self.state().tags.insert(bare_id(zone_id).to_string(), tags);
    }

    pub fn tags(&self, zone_id: &str) -> Vec<Tag> {
        self.state()
            .tags
            .get(bare_id(zone_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn add_record_set(&self, zone_id: &str, record_set: RecordSet) {
        self.state()
            .record_sets
            .entry(bare_id(zone_id).to_string())
            .or_default()
            .push(record_set);
    }

    pub fn record_sets(&self, zone_id: &str) -> Vec<RecordSet> {
        self.state()
            .record_sets
            .get(bare_id(zone_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Make the tag search also return `arn`.
    pub fn add_search_result(&self, arn: &str) {
        self.state().extra_arns.push(arn.to_string());
    }

    /// Return tag search results `page_size` at a time.
    pub fn set_search_page_size(&self, page_size: usize) {
        self.state().search_page_size = Some(page_size);
    }

    /// Serve `page` for the next `ListResourceRecordSets` call instead of the stored records.
    pub fn push_record_page(&self, page: RecordSetsPage) {
        self.state().record_pages.push_back(page);
    }

    /// Fail the next call of `operation` with `err`.
    pub fn fail_next(&self, operation: &'static str, err: ProviderError) {
        self.state()
            .errors
            .entry(operation)
            .or_default()
            .push_back(err);
    }

    pub fn has_zone(&self, zone_id: &str) -> bool {
        self.state().zones.contains_key(bare_id(zone_id))
    }

    pub fn zone_count(&self) -> usize {
        self.state().zones.len()
    }

    /// Number of calls made to `operation`, failed ones included.
    pub fn call_count(&self, operation: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    pub fn tag_changes(&self) -> Vec<TagChangeCall> {
        self.state().tag_changes.clone()
    }

    pub fn record_changes(&self) -> Vec<Vec<RecordSetChange>> {
        self.state().record_changes.clone()
    }

    pub fn record_queries(&self) -> Vec<RecordSetsQuery> {
        self.state().record_queries.clone()
    }

    pub fn zone_name_queries(&self) -> Vec<(String, Option<String>)> {
        self.state().zone_name_queries.clone()
    }

    pub fn search_tokens(&self) -> Vec<Option<String>> {
        self.state().search_tokens.clone()
    }

    pub fn deleted_zones(&self) -> Vec<String> {
        self.state().deleted_zones.clone()
    }
}

#[async_trait]
impl Route53Api for FakeRoute53 {
    async fn create_hosted_zone(
        &self,
        name: &str,
        caller_reference: &str,
    ) -> Result<HostedZone, ProviderError> {
        {
            let mut state = self.state();
            state.take_error(OP_CREATE_HOSTED_ZONE)?;
            if state
                .zones
                .values()
                .any(|zone| zone.caller_reference == caller_reference)
            {
                return Err(service_error(
                    OP_CREATE_HOSTED_ZONE,
                    ERROR_CODE_HOSTED_ZONE_ALREADY_EXISTS,
                    &format!("A hosted zone has already been created with the specified caller reference {caller_reference}"),
                ));
            }
        }
        Ok(self.add_zone(name, caller_reference))
    }

    async fn get_hosted_zone(&self, id: &str) -> Result<HostedZone, ProviderError> {
        let mut state = self.state();
        state.take_error(OP_GET_HOSTED_ZONE)?;
        state.zone(id).cloned()
    }

    async fn list_hosted_zones_by_name(
        &self,
        dns_name: &str,
        hosted_zone_id: Option<&str>,
        max_items: i32,
    ) -> Result<HostedZonesPage, ProviderError> {
        let mut state = self.state();
        state.take_error(OP_LIST_HOSTED_ZONES_BY_NAME)?;
        state
            .zone_name_queries
            .push((dns_name.to_string(), hosted_zone_id.map(str::to_string)));

        let mut zones: Vec<HostedZone> = state.zones.values().cloned().collect();
        zones.sort_by(|a, b| (&a.name, bare_id(&a.id)).cmp(&(&b.name, bare_id(&b.id))));

        let start = zones
            .iter()
            .position(|zone| match hosted_zone_id {
                Some(id) => {
                    (zone.name.as_str(), bare_id(&zone.id)) >= (dns_name, bare_id(id))
                }
                None => zone.name.as_str() >= dns_name,
            })
            .unwrap_or(zones.len());
        let end = (start + usize::try_from(max_items).unwrap()).min(zones.len());
        let next = zones.get(end).cloned();

        Ok(HostedZonesPage {
            hosted_zones: zones[start..end].to_vec(),
            is_truncated: next.is_some(),
            next_dns_name: next.as_ref().map(|zone| zone.name.clone()),
            next_hosted_zone_id: next.map(|zone| zone.id),
        })
    }

    async fn list_resource_record_sets(
        &self,
        zone_id: &str,
        query: &RecordSetsQuery,
    ) -> Result<RecordSetsPage, ProviderError> {
        let mut state = self.state();
        state.take_error(OP_LIST_RESOURCE_RECORD_SETS)?;
        state.record_queries.push(query.clone());
        state.zone(zone_id)?;

        if let Some(page) = state.record_pages.pop_front() {
            return Ok(page);
        }

        let records = state
            .record_sets
            .get(bare_id(zone_id))
            .cloned()
            .unwrap_or_default();

        let start = match &query.start_record_name {
            None => 0,
            Some(name) => records
                .iter()
                .position(|record_set| {
                    record_set.name == dotted(name)
                        && query
                            .start_record_type
                            .as_ref()
                            .is_none_or(|t| record_set.record_type == *t)
                        && query
                            .start_record_identifier
                            .as_ref()
                            .is_none_or(|id| record_set.set_identifier.as_ref() == Some(id))
                })
                .unwrap_or(records.len()),
        };
        let end = (start + usize::try_from(query.max_items).unwrap()).min(records.len());
        let next = records.get(end);

        Ok(RecordSetsPage {
            record_sets: records[start..end].to_vec(),
            is_truncated: next.is_some(),
            next_record_name: next.map(|record_set| record_set.name.clone()),
            next_record_type: next.map(|record_set| record_set.record_type.clone()),
            next_record_identifier: next.and_then(|record_set| record_set.set_identifier.clone()),
        })
    }

    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        changes: Vec<RecordSetChange>,
    ) -> Result<(), ProviderError> {
        let mut state = self.state();
        state.take_error(OP_CHANGE_RESOURCE_RECORD_SETS)?;
        state.zone(zone_id)?;
        state.record_changes.push(changes.clone());

        let records = state
            .record_sets
            .entry(bare_id(zone_id).to_string())
            .or_default();
        for change in changes {
            let existing = records
                .iter()
                .position(|record_set| record_key(record_set) == record_key(&change.record_set));
            match (change.action, existing) {
                (ChangeAction::Delete, Some(index)) if records[index] == change.record_set => {
                    records.remove(index);
                }
                (ChangeAction::Delete, _) => {
                    return Err(service_error(
                        OP_CHANGE_RESOURCE_RECORD_SETS,
                        "InvalidChangeBatch",
                        &format!(
                            "Tried to delete resource record set [name='{}', type='{}'] but it was not found",
                            change.record_set.name, change.record_set.record_type
                        ),
                    ));
                }
                (ChangeAction::Upsert, Some(index)) => records[index] = change.record_set,
                (ChangeAction::Upsert, None) => records.push(change.record_set),
            }
        }
        Ok(())
    }

    async fn list_tags_for_hosted_zone(&self, zone_id: &str) -> Result<Vec<Tag>, ProviderError> {
        let mut state = self.state();
        state.take_error(OP_LIST_TAGS_FOR_RESOURCE)?;
        tagged_zone_id(OP_LIST_TAGS_FOR_RESOURCE, zone_id)?;
        state.zone(zone_id)?;
        Ok(state
            .tags
            .get(bare_id(zone_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn change_tags_for_hosted_zone(
        &self,
        zone_id: &str,
        add_tags: Vec<Tag>,
        remove_tag_keys: Vec<String>,
    ) -> Result<(), ProviderError> {
        let mut state = self.state();
        state.take_error(OP_CHANGE_TAGS_FOR_RESOURCE)?;
        tagged_zone_id(OP_CHANGE_TAGS_FOR_RESOURCE, zone_id)?;
        state.zone(zone_id)?;
        state.tag_changes.push(TagChangeCall {
            zone_id: zone_id.to_string(),
            add_tags: add_tags.clone(),
            remove_tag_keys: remove_tag_keys.clone(),
        });

        if add_tags.len() > MAX_TAG_CHANGES_PER_CALL || remove_tag_keys.len() > MAX_TAG_CHANGES_PER_CALL
        {
            return Err(service_error(
                OP_CHANGE_TAGS_FOR_RESOURCE,
                "InvalidInput",
                "too many tag changes in one request",
            ));
        }

        let tags = state.tags.entry(bare_id(zone_id).to_string()).or_default();
        tags.retain(|tag| !remove_tag_keys.contains(&tag.key));
        for tag in add_tags {
            tags.retain(|existing| existing.key != tag.key);
            tags.push(tag);
        }
        Ok(())
    }

    async fn delete_hosted_zone(&self, id: &str) -> Result<(), ProviderError> {
        let mut state = self.state();
        state.take_error(OP_DELETE_HOSTED_ZONE)?;
        let apex = state.zone(id)?.name.clone();

        let not_empty = state
            .record_sets
            .get(bare_id(id))
            .is_some_and(|records| {
                records.iter().any(|record_set| {
                    record_set.name != apex
                        || (record_set.record_type != RECORD_TYPE_NS
                            && record_set.record_type != RECORD_TYPE_SOA)
                })
            });
        if not_empty {
            return Err(service_error(
                OP_DELETE_HOSTED_ZONE,
                ERROR_CODE_HOSTED_ZONE_NOT_EMPTY,
                "The specified hosted zone contains non-required resource record sets and so cannot be deleted.",
            ));
        }

        let bare = bare_id(id).to_string();
        state.zones.remove(&bare);
        state.record_sets.remove(&bare);
        state.tags.remove(&bare);
        state.deleted_zones.push(id.to_string());
        Ok(())
    }

    async fn get_resources_by_tag(
        &self,
        _resource_type_filter: &str,
        tag_key: &str,
        tag_value: &str,
        pagination_token: Option<&str>,
    ) -> Result<TaggedResourcesPage, ProviderError> {
        let mut state = self.state();
        state.take_error(OP_GET_RESOURCES)?;
        state.search_tokens.push(pagination_token.map(str::to_string));

        let mut arns: Vec<String> = state
            .tags
            .iter()
            .filter(|(_, tags)| {
                tags.iter()
                    .any(|tag| tag.key == tag_key && tag.value == tag_value)
            })
            .map(|(id, _)| arn_for(id))
            .collect();
        arns.sort();
        arns.extend(state.extra_arns.iter().cloned());

        let start: usize = pagination_token.map_or(0, |token| token.parse().unwrap());
        let page_size = state.search_page_size.unwrap_or(100);
        let end = (start + page_size).min(arns.len());

        Ok(TaggedResourcesPage {
            resource_arns: arns[start..end].to_vec(),
            pagination_token: (end < arns.len()).then(|| end.to_string()),
        })
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! [`Route53Api`] implementation backed by the official AWS SDK.
//!
//! Credentials come from the default provider chain (environment, profile, web
//! identity, IMDS). The resource groups tagging client is regional, so both clients
//! are built for the region requested by the `DNSZone`.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_resourcegroupstagging::types::TagFilter;
use aws_sdk_route53::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_route53::types::{
    AliasTarget as SdkAliasTarget, Change, ChangeAction as SdkChangeAction, ChangeBatch,
    HostedZone as SdkHostedZone, ResourceRecord, ResourceRecordSet, ResourceRecordSetFailover,
    ResourceRecordSetRegion, RrType, Tag as SdkTag, TagResourceType,
};
use tracing::{debug, info};

use super::{
    bare_hosted_zone_id, AliasTarget, ChangeAction, HostedZone, HostedZonesPage, RecordSet,
    RecordSetChange, RecordSetsPage, RecordSetsQuery, Route53Api, Tag, TaggedResourcesPage,
};
use crate::dns_errors::ProviderError;

/// Route53 and resource groups tagging clients scoped to one region.
#[derive(Clone, Debug)]
pub struct SdkRoute53Client {
    route53: aws_sdk_route53::Client,
    tagging: aws_sdk_resourcegroupstagging::Client,
    region: String,
}

impl SdkRoute53Client {
    /// Build both clients for `region` from the default AWS configuration chain.
    pub async fn new(region: &str) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        info!(region = %region, "Route53 client initialized");

        Self::from_clients(
            aws_sdk_route53::Client::new(&sdk_config),
            aws_sdk_resourcegroupstagging::Client::new(&sdk_config),
            region,
        )
    }

    /// Wrap clients that are already configured, e.g. for a custom endpoint.
    #[must_use]
    pub fn from_clients(
        route53: aws_sdk_route53::Client,
        tagging: aws_sdk_resourcegroupstagging::Client,
        region: impl Into<String>,
    ) -> Self {
        Self {
            route53,
            tagging,
            region: region.into(),
        }
    }

    /// Region the clients are scoped to.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }
}

/// Convert an SDK error into a [`ProviderError`], keeping the service error code.
fn map_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if let Some(service_err) = err.as_service_error() {
        return match service_err.code() {
            Some(code) => {
                ProviderError::service(operation, code, service_err.message().unwrap_or_default())
            }
            None => ProviderError::MalformedResponse {
                operation: operation.to_string(),
                detail: format!("service error without code: {}", DisplayErrorContext(&err)),
            },
        };
    }
    debug!(operation, "Route53 request failed before a service response");
    ProviderError::transport(operation, DisplayErrorContext(&err).to_string())
}

fn invalid_request(operation: &str, err: impl std::fmt::Display) -> ProviderError {
    ProviderError::InvalidRequest {
        operation: operation.to_string(),
        detail: err.to_string(),
    }
}

fn missing_hosted_zone(operation: &str) -> ProviderError {
    ProviderError::MalformedResponse {
        operation: operation.to_string(),
        detail: "response has no HostedZone".to_string(),
    }
}

fn hosted_zone_from_sdk(zone: &SdkHostedZone) -> HostedZone {
    HostedZone {
        id: zone.id().to_string(),
        name: zone.name().to_string(),
        caller_reference: zone.caller_reference().to_string(),
    }
}

fn record_set_from_sdk(record_set: &ResourceRecordSet) -> RecordSet {
    RecordSet {
        name: record_set.name().to_string(),
        record_type: record_set.r#type().as_str().to_string(),
        set_identifier: record_set.set_identifier().map(str::to_string),
        ttl: record_set.ttl(),
        values: record_set
            .resource_records()
            .iter()
            .map(|record| record.value().to_string())
            .collect(),
        alias_target: record_set.alias_target().map(|alias| AliasTarget {
            hosted_zone_id: alias.hosted_zone_id().to_string(),
            dns_name: alias.dns_name().to_string(),
            evaluate_target_health: alias.evaluate_target_health(),
        }),
        weight: record_set.weight(),
        region: record_set.region().map(|r| r.as_str().to_string()),
        failover: record_set.failover().map(|f| f.as_str().to_string()),
        multi_value_answer: record_set.multi_value_answer(),
        health_check_id: record_set.health_check_id().map(str::to_string),
    }
}

fn record_set_to_sdk(
    operation: &str,
    record_set: RecordSet,
) -> Result<ResourceRecordSet, ProviderError> {
    let resource_records = if record_set.values.is_empty() {
        None
    } else {
        Some(
            record_set
                .values
                .into_iter()
                .map(|value| ResourceRecord::builder().value(value).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| invalid_request(operation, e))?,
        )
    };

    let alias_target = record_set
        .alias_target
        .map(|alias| {
            SdkAliasTarget::builder()
                .hosted_zone_id(alias.hosted_zone_id)
                .dns_name(alias.dns_name)
                .evaluate_target_health(alias.evaluate_target_health)
                .build()
        })
        .transpose()
        .map_err(|e| invalid_request(operation, e))?;

    ResourceRecordSet::builder()
        .name(record_set.name)
        .r#type(RrType::from(record_set.record_type.as_str()))
        .set_set_identifier(record_set.set_identifier)
        .set_ttl(record_set.ttl)
        .set_resource_records(resource_records)
        .set_alias_target(alias_target)
        .set_weight(record_set.weight)
        .set_region(
            record_set
                .region
                .as_deref()
                .map(ResourceRecordSetRegion::from),
        )
        .set_failover(
            record_set
                .failover
                .as_deref()
                .map(ResourceRecordSetFailover::from),
        )
        .set_multi_value_answer(record_set.multi_value_answer)
        .set_health_check_id(record_set.health_check_id)
        .build()
        .map_err(|e| invalid_request(operation, e))
}

#[async_trait]
impl Route53Api for SdkRoute53Client {
    async fn create_hosted_zone(
        &self,
        name: &str,
        caller_reference: &str,
    ) -> Result<HostedZone, ProviderError> {
        const OPERATION: &str = "CreateHostedZone";
        let output = self
            .route53
            .create_hosted_zone()
            .name(name)
            .caller_reference(caller_reference)
            .send()
            .await
            .map_err(|e| map_sdk_error(OPERATION, e))?;

        output
            .hosted_zone()
            .map(hosted_zone_from_sdk)
            .ok_or_else(|| missing_hosted_zone(OPERATION))
    }

    async fn get_hosted_zone(&self, id: &str) -> Result<HostedZone, ProviderError> {
        const OPERATION: &str = "GetHostedZone";
        let output = self
            .route53
            .get_hosted_zone()
            .id(id)
            .send()
            .await
            .map_err(|e| map_sdk_error(OPERATION, e))?;

        output
            .hosted_zone()
            .map(hosted_zone_from_sdk)
            .ok_or_else(|| missing_hosted_zone(OPERATION))
    }

    async fn list_hosted_zones_by_name(
        &self,
        dns_name: &str,
        hosted_zone_id: Option<&str>,
        max_items: i32,
    ) -> Result<HostedZonesPage, ProviderError> {
        let output = self
            .route53
            .list_hosted_zones_by_name()
            .dns_name(dns_name)
            .set_hosted_zone_id(hosted_zone_id.map(str::to_string))
            .max_items(max_items)
            .send()
            .await
            .map_err(|e| map_sdk_error("ListHostedZonesByName", e))?;

        Ok(HostedZonesPage {
            hosted_zones: output
                .hosted_zones()
                .iter()
                .map(hosted_zone_from_sdk)
                .collect(),
            is_truncated: output.is_truncated(),
            next_dns_name: output.next_dns_name().map(str::to_string),
            next_hosted_zone_id: output.next_hosted_zone_id().map(str::to_string),
        })
    }

    async fn list_resource_record_sets(
        &self,
        zone_id: &str,
        query: &RecordSetsQuery,
    ) -> Result<RecordSetsPage, ProviderError> {
        let output = self
            .route53
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .set_start_record_name(query.start_record_name.clone())
            .set_start_record_type(query.start_record_type.as_deref().map(RrType::from))
            .set_start_record_identifier(query.start_record_identifier.clone())
            .max_items(query.max_items)
            .send()
            .await
            .map_err(|e| map_sdk_error("ListResourceRecordSets", e))?;

        Ok(RecordSetsPage {
            record_sets: output
                .resource_record_sets()
                .iter()
                .map(record_set_from_sdk)
                .collect(),
            is_truncated: output.is_truncated(),
            next_record_name: output.next_record_name().map(str::to_string),
            next_record_type: output.next_record_type().map(|t| t.as_str().to_string()),
            next_record_identifier: output.next_record_identifier().map(str::to_string),
        })
    }

    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        changes: Vec<RecordSetChange>,
    ) -> Result<(), ProviderError> {
        const OPERATION: &str = "ChangeResourceRecordSets";
        let sdk_changes = changes
            .into_iter()
            .map(|change| {
                let action = match change.action {
                    ChangeAction::Delete => SdkChangeAction::Delete,
                    ChangeAction::Upsert => SdkChangeAction::Upsert,
                };
                Change::builder()
                    .action(action)
                    .resource_record_set(record_set_to_sdk(OPERATION, change.record_set)?)
                    .build()
                    .map_err(|e| invalid_request(OPERATION, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let batch = ChangeBatch::builder()
            .set_changes(Some(sdk_changes))
            .build()
            .map_err(|e| invalid_request(OPERATION, e))?;

        self.route53
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| map_sdk_error(OPERATION, e))?;
        Ok(())
    }

    async fn list_tags_for_hosted_zone(&self, zone_id: &str) -> Result<Vec<Tag>, ProviderError> {
        let output = self
            .route53
            .list_tags_for_resource()
            .resource_type(TagResourceType::Hostedzone)
            .resource_id(bare_hosted_zone_id(zone_id))
            .send()
            .await
            .map_err(|e| map_sdk_error("ListTagsForResource", e))?;

        Ok(output
            .resource_tag_set()
            .map(|set| {
                set.tags()
                    .iter()
                    .map(|tag| {
                        Tag::new(
                            tag.key().unwrap_or_default(),
                            tag.value().unwrap_or_default(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn change_tags_for_hosted_zone(
        &self,
        zone_id: &str,
        add_tags: Vec<Tag>,
        remove_tag_keys: Vec<String>,
    ) -> Result<(), ProviderError> {
        let add_tags: Vec<SdkTag> = add_tags
            .into_iter()
            .map(|tag| SdkTag::builder().key(tag.key).value(tag.value).build())
            .collect();

        self.route53
            .change_tags_for_resource()
            .resource_type(TagResourceType::Hostedzone)
            .resource_id(bare_hosted_zone_id(zone_id))
            .set_add_tags((!add_tags.is_empty()).then_some(add_tags))
            .set_remove_tag_keys((!remove_tag_keys.is_empty()).then_some(remove_tag_keys))
            .send()
            .await
            .map_err(|e| map_sdk_error("ChangeTagsForResource", e))?;
        Ok(())
    }

    async fn delete_hosted_zone(&self, id: &str) -> Result<(), ProviderError> {
        self.route53
            .delete_hosted_zone()
            .id(id)
            .send()
            .await
            .map_err(|e| map_sdk_error("DeleteHostedZone", e))?;
        Ok(())
    }

    async fn get_resources_by_tag(
        &self,
        resource_type_filter: &str,
        tag_key: &str,
        tag_value: &str,
        pagination_token: Option<&str>,
    ) -> Result<TaggedResourcesPage, ProviderError> {
        let output = self
            .tagging
            .get_resources()
            .resource_type_filters(resource_type_filter)
            .tag_filters(TagFilter::builder().key(tag_key).values(tag_value).build())
            .set_pagination_token(pagination_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| map_sdk_error("GetResources", e))?;

        Ok(TaggedResourcesPage {
            resource_arns: output
                .resource_tag_mapping_list()
                .iter()
                .filter_map(|mapping| mapping.resource_arn().map(str::to_string))
                .collect(),
            // The tagging API signals the last page with an empty token
            pagination_token: output
                .pagination_token()
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
#[path = "sdk_tests.rs"]
mod sdk_tests;

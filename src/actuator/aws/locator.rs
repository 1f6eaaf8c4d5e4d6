// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hosted zone discovery.
//!
//! A zone is located in one of three ways:
//!
//! 1. The zone id cached in the `DNSZone` status
//! 2. A resource groups tagging search for the ownership tag
//!    (`zonekeeper.firestoned.io/dnszone=<namespace>/<name>`)
//! 3. After `CreateHostedZone` reports the zone as existing, a by-name listing
//!    searching for the `DNSZone` UID as caller reference
//!
//! Candidates from (1) and (2) are only accepted when their name matches the spec.

use tracing::{debug, error, warn};

use super::AwsActuator;
use crate::actuator::dotted;
use crate::constants::{
    DNSZONE_OWNER_TAG, HOSTED_ZONES_PAGE_SIZE, HOSTED_ZONE_ARN_RESOURCE,
    HOSTED_ZONE_RESOURCE_TYPE_FILTER,
};
use crate::dns_errors::{ActuatorError, ProviderError};
use crate::route53::{bare_hosted_zone_id, HostedZone, Route53Api, Tag};

/// Extract the hosted zone id from a Route53 hosted zone ARN.
///
/// The ARN must have six colon separated parts, the last being
/// `hostedzone/<id>`.
///
/// # Example
///
/// ```rust
/// use zonekeeper::actuator::aws::locator::hosted_zone_id_from_arn;
///
/// assert_eq!(
///     hosted_zone_id_from_arn("arn:aws:route53:::hostedzone/Z123"),
///     Some("Z123".to_string())
/// );
/// assert_eq!(hosted_zone_id_from_arn("arn:aws:route53:::healthcheck/abc"), None);
/// ```
#[must_use]
pub fn hosted_zone_id_from_arn(arn: &str) -> Option<String> {
    let parts: Vec<&str> = arn.split(':').collect();
    if parts.len() != 6 || parts[0] != "arn" {
        return None;
    }

    match parts[5].split('/').collect::<Vec<_>>().as_slice() {
        [HOSTED_ZONE_ARN_RESOURCE, id] if !id.is_empty() => Some((*id).to_string()),
        _ => None,
    }
}

impl<C: Route53Api> AwsActuator<C> {
    /// Resolve `hosted_zone` and `current_tags`, leaving both empty when nothing matches.
    pub(super) async fn locate(&mut self) -> Result<(), ActuatorError> {
        self.hosted_zone = None;
        self.current_tags.clear();

        let zone_ids = if let Some(zone_id) = self.status.zone_id() {
            debug!("Zone id from status: {}", zone_id);
            vec![zone_id.to_string()]
        } else {
            debug!("No zone id in status, searching for zone by tags");
            self.find_zone_ids_by_tag()
                .await
                .inspect_err(|e| error!("Failed to search for zone by tags: {}", e))?
        };

        if zone_ids.is_empty() {
            debug!("No matching existing hosted zone found");
            return Ok(());
        }

        let expected_name = dotted(&self.dnszone.spec.zone);
        let mut matches = 0usize;

        for zone_id in zone_ids {
            let hosted_zone = match self.client.get_hosted_zone(&zone_id).await {
                Ok(hosted_zone) => hosted_zone,
                Err(e) if e.is_not_found() => {
                    debug!("Hosted zone {} not found", zone_id);
                    continue;
                }
                Err(e) => {
                    error!("Cannot get hosted zone {}: {}", zone_id, e);
                    return Err(e.into());
                }
            };

            if hosted_zone.name != expected_name {
                debug!(
                    "Hosted zone {} is named {}, expected {}",
                    zone_id, hosted_zone.name, expected_name
                );
                continue;
            }

            debug!("Found hosted zone {}", hosted_zone.id);
            matches += 1;
            // Later matches replace earlier ones
            self.set_hosted_zone(hosted_zone);
        }

        if matches > 1 {
            warn!(
                "{} hosted zones named {} are owned by this DNSZone, using {}",
                matches,
                expected_name,
                self.status.zone_id().unwrap_or_default()
            );
        }

        let Some(zone_id) = self.hosted_zone.as_ref().map(|zone| zone.id.clone()) else {
            debug!("No existing hosted zone matches {}", expected_name);
            return Ok(());
        };

        debug!("Fetching tags of zone {}", zone_id);
        self.current_tags = self.existing_tags(&zone_id).await?;
        Ok(())
    }

    /// Ids of all hosted zones carrying this `DNSZone`'s ownership tag.
    pub(super) async fn find_zone_ids_by_tag(&self) -> Result<Vec<String>, ProviderError> {
        let tag_value = self.owner_tag_value();
        let mut zone_ids = Vec::new();
        let mut pagination_token: Option<String> = None;

        loop {
            let page = self
                .client
                .get_resources_by_tag(
                    HOSTED_ZONE_RESOURCE_TYPE_FILTER,
                    DNSZONE_OWNER_TAG,
                    &tag_value,
                    pagination_token.as_deref(),
                )
                .await?;

            for arn in &page.resource_arns {
                match hosted_zone_id_from_arn(arn) {
                    Some(zone_id) => zone_ids.push(zone_id),
                    None => error!("Unexpected hostedzone ARN: {}", arn),
                }
            }

            match page.pagination_token {
                Some(token) => pagination_token = Some(token),
                None => break,
            }
        }

        debug!(
            "Tag search for {}={} returned {} zone(s)",
            DNSZONE_OWNER_TAG,
            tag_value,
            zone_ids.len()
        );
        Ok(zone_ids)
    }

    /// Find the zone created with `caller_reference` among zones named `domain`.
    ///
    /// `domain` must be fully qualified. The listing is ordered by name, so the
    /// search ends at the first zone with another name.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError::HostedZoneNotFound`] when no zone named `domain`
    /// has the caller reference, or the provider error of a failed page.
    pub(super) async fn find_zone_by_caller_reference(
        &self,
        domain: &str,
        caller_reference: &str,
    ) -> Result<HostedZone, ActuatorError> {
        let not_found = || ActuatorError::HostedZoneNotFound {
            domain: domain.to_string(),
            caller_reference: caller_reference.to_string(),
        };

        let mut dns_name = domain.to_string();
        let mut hosted_zone_id: Option<String> = None;

        loop {
            let page = self
                .client
                .list_hosted_zones_by_name(&dns_name, hosted_zone_id.as_deref(), HOSTED_ZONES_PAGE_SIZE)
                .await?;

            for zone in page.hosted_zones {
                if zone.caller_reference == caller_reference {
                    debug!("Found hosted zone {} by caller reference", zone.id);
                    return Ok(zone);
                }
                if zone.name != domain {
                    return Err(not_found());
                }
            }

            if !page.is_truncated {
                return Err(not_found());
            }

            let Some(next_dns_name) = page.next_dns_name else {
                return Err(ProviderError::MalformedResponse {
                    operation: "ListHostedZonesByName".to_string(),
                    detail: "truncated page without NextDNSName".to_string(),
                }
                .into());
            };
            dns_name = next_dns_name;
            hosted_zone_id = page.next_hosted_zone_id;
        }
    }

    /// Tags currently attached to a hosted zone.
    pub(super) async fn existing_tags(&self, zone_id: &str) -> Result<Vec<Tag>, ActuatorError> {
        self.client
            .list_tags_for_hosted_zone(bare_hosted_zone_id(zone_id))
            .await
            .inspect_err(|e| error!("Cannot get tags for zone {}: {}", zone_id, e))
            .map_err(ActuatorError::from)
    }
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod locator_tests;

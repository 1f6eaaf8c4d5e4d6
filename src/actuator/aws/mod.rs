// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route53 hosted zone actuator.
//!
//! [`AwsActuator`] implements [`Actuator`] on top of any [`Route53Api`]. The work is
//! split by concern:
//!
//! - [`locator`] - find the zone by cached id, by ownership tag, or by caller reference
//! - [`tags`] - compute and apply tag changes in batches
//! - [`records`] - sweep record sets before deletion
//! - [`conditions`] - turn provider errors into credential health conditions

pub mod conditions;
pub mod locator;
pub mod records;
pub mod tags;

use async_trait::async_trait;
use kube::ResourceExt;
use tracing::{debug, error, info};

use super::{dotted, Actuator};
use crate::constants::{NAME_SERVER_QUERY_PAGE_SIZE, RECORD_TYPE_NS};
use crate::crd::{AWSDNSZoneStatus, DNSZone, DNSZoneStatus};
use crate::dns_errors::ActuatorError;
use crate::route53::{HostedZone, RecordSetsQuery, Route53Api, Tag};

/// Reconciles one `DNSZone` against Route53 for a single pass.
///
/// A new actuator is expected to be created for each reconciliation; it is never
/// shared between passes or resources.
pub struct AwsActuator<C> {
    /// Route53 client, already scoped to the zone's region
    client: C,

    /// The `DNSZone` that represents the desired state
    dnszone: DNSZone,

    /// Working copy of the status, written back by the caller
    status: DNSZoneStatus,

    /// The Route53 hosted zone, once located or created
    hosted_zone: Option<HostedZone>,

    /// Tags currently attached to `hosted_zone`
    current_tags: Vec<Tag>,
}

impl<C: Route53Api> AwsActuator<C> {
    /// Create an actuator for one reconciliation pass of `dnszone`.
    #[must_use]
    pub fn new(client: C, dnszone: &DNSZone) -> Self {
        Self {
            client,
            dnszone: dnszone.clone(),
            status: dnszone.status.clone().unwrap_or_default(),
            hosted_zone: None,
            current_tags: Vec::new(),
        }
    }

    /// The hosted zone resolved by `refresh` or `create`.
    #[must_use]
    pub fn hosted_zone(&self) -> Option<&HostedZone> {
        self.hosted_zone.as_ref()
    }

    /// Tags loaded for the resolved hosted zone.
    #[must_use]
    pub fn current_tags(&self) -> &[Tag] {
        &self.current_tags
    }

    /// Consume the actuator and return the working status.
    #[must_use]
    pub fn into_status(self) -> DNSZoneStatus {
        self.status
    }

    /// Value of the ownership tag: `<namespace>/<name>` of the `DNSZone`.
    fn owner_tag_value(&self) -> String {
        format!(
            "{}/{}",
            self.dnszone.namespace().unwrap_or_default(),
            self.dnszone.name_any()
        )
    }

    /// Cache the zone and record its id in the working status.
    fn set_hosted_zone(&mut self, hosted_zone: HostedZone) {
        self.status.aws = Some(AWSDNSZoneStatus {
            zone_id: Some(hosted_zone.id.clone()),
        });
        self.hosted_zone = Some(hosted_zone);
    }

    fn require_hosted_zone(&self) -> Result<&HostedZone, ActuatorError> {
        self.hosted_zone
            .as_ref()
            .ok_or(ActuatorError::HostedZoneUnpopulated)
    }
}

#[async_trait]
impl<C: Route53Api> Actuator for AwsActuator<C> {
    async fn refresh(&mut self) -> Result<(), ActuatorError> {
        self.locate().await
    }

    async fn create(&mut self) -> Result<(), ActuatorError> {
        let domain = self.dnszone.spec.zone.clone();
        let caller_reference = self.dnszone.uid().ok_or_else(|| {
            ActuatorError::MissingCallerReference {
                name: self.dnszone.name_any(),
            }
        })?;

        info!("Creating route53 hostedzone for {}", domain);
        let hosted_zone = match self
            .client
            .create_hosted_zone(&domain, &caller_reference)
            .await
        {
            Ok(hosted_zone) => {
                debug!("Hosted zone {} successfully created", hosted_zone.id);
                hosted_zone
            }
            Err(e) if e.is_already_exists() => {
                debug!(
                    "Hosted zone {} already exists, looking up by caller reference {}",
                    domain, caller_reference
                );
                self.find_zone_by_caller_reference(&dotted(&domain), &caller_reference)
                    .await
                    .inspect_err(|e| {
                        error!("Failed to find zone {} by caller reference: {}", domain, e);
                    })?
            }
            Err(e) => {
                error!("Error creating hosted zone {}: {}", domain, e);
                return Err(e.into());
            }
        };

        debug!("Fetching tags of zone {}", hosted_zone.id);
        let existing_tags = self.existing_tags(&hosted_zone.id).await?;

        self.set_hosted_zone(hosted_zone);
        self.current_tags = existing_tags;

        // A tagging failure leaves the zone in place. The retry finds it again
        // through the caller reference and only repeats the tag sync.
        self.sync_tags().await.inspect_err(|e| {
            error!("Failed to apply tags to newly created zone {}: {}", domain, e);
        })
    }

    fn exists(&self) -> bool {
        self.hosted_zone.is_some()
    }

    async fn update_metadata(&mut self) -> Result<(), ActuatorError> {
        self.require_hosted_zone()?;

        // Tags are the only metadata that can be synced on an existing zone
        self.sync_tags().await
    }

    async fn delete(&mut self) -> Result<(), ActuatorError> {
        let zone_id = self.require_hosted_zone()?.id.clone();
        let zone = self.dnszone.spec.zone.clone();

        info!("Deleting route53 recordsets in hostedzone {} ({})", zone, zone_id);
        self.delete_record_sets(&zone_id).await?;

        info!("Deleting route53 hostedzone {} ({})", zone, zone_id);
        if let Err(e) = self.client.delete_hosted_zone(&zone_id).await {
            if e.is_not_empty() {
                // Someone added a record after the sweep; the next pass sweeps again
                info!("Cannot delete hosted zone {}: {}", zone_id, e);
            } else {
                error!("Cannot delete hosted zone {}: {}", zone_id, e);
            }
            return Err(e.into());
        }

        Ok(())
    }

    async fn get_name_servers(&self) -> Result<Vec<String>, ActuatorError> {
        let zone_id = &self.require_hosted_zone()?.id;
        let zone = &self.dnszone.spec.zone;

        debug!("Listing NS records of hosted zone {}", zone_id);
        let query = RecordSetsQuery {
            start_record_name: Some(zone.clone()),
            start_record_type: Some(RECORD_TYPE_NS.to_string()),
            start_record_identifier: None,
            max_items: NAME_SERVER_QUERY_PAGE_SIZE,
        };
        let page = self
            .client
            .list_resource_record_sets(zone_id, &query)
            .await
            .inspect_err(|e| error!("Error listing recordsets for zone {}: {}", zone_id, e))?;

        let [record_set] = page.record_sets.as_slice() else {
            let err = ActuatorError::UnexpectedRecordSetCount(page.record_sets.len());
            error!("{}", err);
            return Err(err);
        };
        if record_set.record_type != RECORD_TYPE_NS {
            let err = ActuatorError::NameServerRecordNotFound;
            error!("{}", err);
            return Err(err);
        }
        if record_set.name != dotted(zone) {
            let err = ActuatorError::NameServerRecordNameMismatch { zone: zone.clone() };
            error!("{}", err);
            return Err(err);
        }

        debug!(
            "Found hosted zone {} name servers: {:?}",
            zone_id, record_set.values
        );
        Ok(record_set.values.clone())
    }

    fn set_conditions_for_error(&mut self, err: Option<&ActuatorError>) -> bool {
        let current = std::mem::take(&mut self.status.conditions);
        let (conditions, changed) = conditions::apply_error_conditions(current, err);
        self.status.conditions = conditions;
        changed
    }

    fn status(&self) -> &DNSZoneStatus {
        &self.status
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `DNSZone` reconciliation against Route53.
//!
//! A pass is driven through the [`Actuator`] trait so it can run against any provider
//! backend:
//!
//! - [`reconcile_zone_pass`] - refresh, create or update the zone, read its name servers
//! - [`delete_zone_pass`] - refresh, sweep records and delete the zone
//!
//! Both return the status the pass produced together with its result; the status is
//! persisted even when the pass fails so credential conditions reach the user.
//! [`reconcile_dnszone`] wires this into the Kubernetes controller: finalizer
//! handling, Route53 client selection and status persistence.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use kube::ResourceExt;
use tracing::{debug, info, warn};

use super::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use super::status::{upsert_condition, DNSZoneStatusUpdater, UpdateConditionCheck};
use crate::actuator::aws::AwsActuator;
use crate::actuator::{effective_region, Actuator};
use crate::constants::DNSZONE_FINALIZER;
use crate::context::Context;
use crate::crd::{DNSZone, DNSZoneStatus};
use crate::dns_errors::ActuatorError;
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_ZONE_AVAILABLE,
    MESSAGE_ACCESS_DENIED, REASON_ZONE_AVAILABLE, REASON_ZONE_DELETING, REASON_ZONE_NOT_AVAILABLE,
};

/// Status and result of one reconciliation pass.
#[derive(Debug)]
pub struct ZonePassOutcome {
    /// Status to persist, produced even when the pass failed
    pub status: DNSZoneStatus,
    /// Result of the provider operations
    pub result: Result<(), ActuatorError>,
}

/// Run one create/update pass for `dnszone`.
///
/// 1. Refresh to locate the existing zone
/// 2. Create it when missing, otherwise update its metadata
/// 3. Read its name servers
/// 4. Classify the outcome into credential conditions
///
/// On success the status carries the name servers, the synced generation and
/// `ZoneAvailable=True`. On failure `ZoneAvailable` is `False` and the previous name
/// servers are kept.
pub async fn reconcile_zone_pass<A>(actuator: &mut A, dnszone: &DNSZone) -> ZonePassOutcome
where
    A: Actuator + ?Sized,
{
    let result = sync_hosted_zone(actuator).await;
    actuator.set_conditions_for_error(result.as_ref().err());

    let mut status = actuator.status().clone();
    let conditions = std::mem::take(&mut status.conditions);

    let (conditions, _) = match &result {
        Ok(name_servers) => {
            status.name_servers.clone_from(name_servers);
            status.last_sync_generation = dnszone.metadata.generation;
            upsert_condition(
                conditions,
                CONDITION_TYPE_ZONE_AVAILABLE,
                CONDITION_STATUS_TRUE,
                REASON_ZONE_AVAILABLE,
                &format!("Hosted zone {} is available", status.zone_id().unwrap_or_default()),
                UpdateConditionCheck::IfReasonOrMessageChange,
            )
        }
        Err(e) => upsert_condition(
            conditions,
            CONDITION_TYPE_ZONE_AVAILABLE,
            CONDITION_STATUS_FALSE,
            REASON_ZONE_NOT_AVAILABLE,
            &zone_unavailable_message(e),
            UpdateConditionCheck::IfReasonOrMessageChange,
        ),
    };
    status.conditions = conditions;

    ZonePassOutcome {
        status,
        result: result.map(|_| ()),
    }
}

async fn sync_hosted_zone<A>(actuator: &mut A) -> Result<Vec<String>, ActuatorError>
where
    A: Actuator + ?Sized,
{
    actuator.refresh().await?;

    if actuator.exists() {
        debug!("Hosted zone exists, updating metadata");
        actuator.update_metadata().await?;
    } else {
        actuator.create().await?;
    }

    actuator.get_name_servers().await
}

/// Run one deletion pass.
///
/// Nothing is deleted when no zone can be located; the pass then succeeds so the
/// finalizer can be released.
pub async fn delete_zone_pass<A>(actuator: &mut A) -> ZonePassOutcome
where
    A: Actuator + ?Sized,
{
    let result = delete_hosted_zone(actuator).await;
    actuator.set_conditions_for_error(result.as_ref().err());

    let mut status = actuator.status().clone();
    if let Err(e) = &result {
        let (conditions, _) = upsert_condition(
            std::mem::take(&mut status.conditions),
            CONDITION_TYPE_ZONE_AVAILABLE,
            CONDITION_STATUS_FALSE,
            REASON_ZONE_DELETING,
            &zone_unavailable_message(e),
            UpdateConditionCheck::IfReasonOrMessageChange,
        );
        status.conditions = conditions;
    }

    ZonePassOutcome { status, result }
}

async fn delete_hosted_zone<A>(actuator: &mut A) -> Result<(), ActuatorError>
where
    A: Actuator + ?Sized,
{
    actuator.refresh().await?;

    if !actuator.exists() {
        info!("No hosted zone found, nothing to delete");
        return Ok(());
    }

    actuator.delete().await
}

/// Condition message for a failed pass.
///
/// Access denied messages embed caller identities and are replaced by a fixed text.
#[must_use]
pub fn zone_unavailable_message(err: &ActuatorError) -> String {
    if err
        .provider_error()
        .is_some_and(crate::dns_errors::ProviderError::is_access_denied)
    {
        return MESSAGE_ACCESS_DENIED.to_string();
    }
    err.to_string()
}

/// Whether `err` only means the zone still had records when deletion was attempted.
///
/// Such failures are expected while other controllers are still removing records and
/// are retried without being reported as errors.
#[must_use]
pub fn is_zone_not_empty(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ActuatorError>()
        .and_then(ActuatorError::provider_error)
        .is_some_and(crate::dns_errors::ProviderError::is_not_empty)
}

/// Reconcile a `DNSZone` resource.
///
/// Adds the finalizer, runs a pass and persists the resulting status. A resource that
/// is being deleted gets a deletion pass instead, and loses its finalizer once the
/// hosted zone is gone.
///
/// Returns the status the pass produced, or `None` when the resource was being deleted.
///
/// # Errors
///
/// Returns an error if a Kubernetes API call fails or the pass fails. Status is
/// persisted before a failed pass is reported.
pub async fn reconcile_dnszone(
    ctx: Arc<Context>,
    dnszone: DNSZone,
) -> Result<Option<DNSZoneStatus>> {
    let namespace = dnszone.namespace().unwrap_or_default();
    let name = dnszone.name_any();
    let client = &ctx.client;

    info!(
        "Reconciling DNSZone: {}/{} ({})",
        namespace, name, dnszone.spec.zone
    );

    let region = effective_region(&dnszone.spec);
    let route53 = ctx.route53_client(region).await;
    let mut actuator = AwsActuator::new(route53, &dnszone);

    if dnszone.metadata.deletion_timestamp.is_some() {
        if !has_finalizer(&dnszone, DNSZONE_FINALIZER) {
            debug!("DNSZone {}/{} has no finalizer, nothing to clean up", namespace, name);
            return Ok(None);
        }

        info!("DNSZone {}/{} is being deleted", namespace, name);
        let outcome = delete_zone_pass(&mut actuator).await;
        if outcome.result.is_err() {
            persist_status(client, &dnszone, outcome.status).await?;
        }
        outcome
            .result
            .with_context(|| format!("Failed to delete hosted zone for {namespace}/{name}"))?;

        remove_finalizer(client, &dnszone, DNSZONE_FINALIZER).await?;
        return Ok(None);
    }

    ensure_finalizer(client, &dnszone, DNSZONE_FINALIZER).await?;

    let outcome = reconcile_zone_pass(&mut actuator, &dnszone).await;
    persist_status(client, &dnszone, outcome.status.clone()).await?;

    outcome
        .result
        .with_context(|| format!("Failed to reconcile hosted zone for {namespace}/{name}"))?;
    Ok(Some(outcome.status))
}

async fn persist_status(
    client: &kube::Client,
    dnszone: &DNSZone,
    status: DNSZoneStatus,
) -> Result<()> {
    let mut status_updater = DNSZoneStatusUpdater::new(dnszone);
    status_updater.set_status(status);
    if let Err(e) = status_updater.apply(client).await {
        warn!(
            "Failed to update status of DNSZone {}/{}: {}",
            dnszone.namespace().unwrap_or_default(),
            dnszone.name_any(),
            e
        );
        return Err(e);
    }
    Ok(())
}

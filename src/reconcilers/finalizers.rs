// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic finalizer management for namespaced Kubernetes resources.
//!
//! A `DNSZone` carries a finalizer for as long as a Route53 hosted zone may exist for
//! it, so the hosted zone is always deleted before the resource disappears.
//!
//! # Example
//!
//! ```rust,ignore
//! use zonekeeper::constants::DNSZONE_FINALIZER;
//! use zonekeeper::reconcilers::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
//!
//! async fn reconcile(client: Client, dnszone: DNSZone) -> Result<()> {
//!     if dnszone.metadata.deletion_timestamp.is_some() {
//!         if has_finalizer(&dnszone, DNSZONE_FINALIZER) {
//!             // Delete the hosted zone...
//!             remove_finalizer(&client, &dnszone, DNSZONE_FINALIZER).await?;
//!         }
//!         return Ok(());
//!     }
//!
//!     ensure_finalizer(&client, &dnszone, DNSZONE_FINALIZER).await?;
//!     // Normal reconciliation...
//!     Ok(())
//! }
//! ```

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::info;

/// Whether `finalizer` is present on the resource.
#[must_use]
pub fn has_finalizer<T: Resource>(resource: &T, finalizer: &str) -> bool {
    resource
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|existing| existing == finalizer))
}

/// Add a finalizer to a resource if not already present.
///
/// The operation is idempotent: nothing is sent when the finalizer is already present.
///
/// # Arguments
///
/// * `client` - Kubernetes client for accessing the API
/// * `resource` - The resource to add the finalizer to
/// * `finalizer` - The finalizer string to add
///
/// # Errors
///
/// Returns an error if the API patch operation fails.
pub async fn ensure_finalizer<T>(client: &Client, resource: &T, finalizer: &str) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    if has_finalizer(resource, finalizer) {
        return Ok(());
    }

    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();

    info!(
        "Adding finalizer {} to {}/{} {}",
        finalizer,
        namespace,
        name,
        T::kind(&())
    );

    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.push(finalizer.to_string());

    let api: Api<T> = Api::namespaced(client.clone(), &namespace);
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}

/// Remove a finalizer from a resource.
///
/// The operation is idempotent: nothing is sent when the finalizer is already absent.
///
/// # Arguments
///
/// * `client` - Kubernetes client for accessing the API
/// * `resource` - The resource to remove the finalizer from
/// * `finalizer` - The finalizer string to remove
///
/// # Errors
///
/// Returns an error if the API patch operation fails.
pub async fn remove_finalizer<T>(client: &Client, resource: &T, finalizer: &str) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    if !has_finalizer(resource, finalizer) {
        return Ok(());
    }

    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();

    info!(
        "Removing finalizer {} from {}/{} {}",
        finalizer,
        namespace,
        name,
        T::kind(&())
    );

    let finalizers = remaining_finalizers(resource, finalizer);

    let api: Api<T> = Api::namespaced(client.clone(), &namespace);
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}

/// Finalizers left on the resource once `finalizer` is removed, in their original order.
#[must_use]
pub fn remaining_finalizers<T: Resource>(resource: &T, finalizer: &str) -> Vec<String> {
    resource
        .meta()
        .finalizers
        .iter()
        .flatten()
        .filter(|existing| existing.as_str() != finalizer)
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;

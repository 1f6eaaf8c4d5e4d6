// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hosted zone actuators.
//!
//! An actuator brings one provider hosted zone in line with one `DNSZone` for the
//! duration of a single reconciliation pass. It holds no state across passes: every
//! pass starts with [`Actuator::refresh`] and rediscovers the zone from the status or
//! from provider side tags.
//!
//! # Pass Lifecycle
//!
//! 1. **Refresh** - locate the existing zone, if any
//! 2. **Mutate** - at most one of `create`, `update_metadata`, `delete`
//! 3. **Report** - optionally `get_name_servers`
//! 4. **Classify** - `set_conditions_for_error` with the pass result
//!
//! The working status returned by [`Actuator::status`] is written back by the caller.

pub mod aws;

use async_trait::async_trait;

use crate::constants::DEFAULT_AWS_REGION;
use crate::crd::{DNSZoneSpec, DNSZoneStatus};
use crate::dns_errors::ActuatorError;

/// Operations a reconciler performs against a provider hosted zone.
///
/// Implementations are created per pass and discarded afterwards.
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Locate the provider zone for the `DNSZone`.
    ///
    /// Finding nothing is not an error; [`Actuator::exists`] then reports `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider lookup fails.
    async fn refresh(&mut self) -> Result<(), ActuatorError>;

    /// Create the provider zone and apply the expected tags.
    ///
    /// Safe to call again after a partial failure: an earlier creation is found again
    /// through the resource's idempotency token.
    ///
    /// # Errors
    ///
    /// Returns an error if creation, lookup or tagging fails.
    async fn create(&mut self) -> Result<(), ActuatorError>;

    /// Whether `refresh` or `create` resolved a provider zone.
    fn exists(&self) -> bool;

    /// Bring the metadata (tags) of the resolved zone in line with the spec.
    ///
    /// # Errors
    ///
    /// Returns an error if no zone is resolved or tagging fails.
    async fn update_metadata(&mut self) -> Result<(), ActuatorError>;

    /// Delete every deletable record of the resolved zone, then the zone itself.
    ///
    /// # Errors
    ///
    /// Returns an error if no zone is resolved, the sweep fails, or the provider
    /// refuses the deletion.
    async fn delete(&mut self) -> Result<(), ActuatorError>;

    /// Authoritative name servers of the resolved zone, in provider order.
    ///
    /// # Errors
    ///
    /// Returns an error if no zone is resolved or the apex NS record set is not
    /// exactly what is expected.
    async fn get_name_servers(&self) -> Result<Vec<String>, ActuatorError>;

    /// Update credential health conditions for the outcome of a pass.
    ///
    /// `None` reports success and clears both signals.
    ///
    /// # Returns
    ///
    /// `true` if any condition was written.
    fn set_conditions_for_error(&mut self, err: Option<&ActuatorError>) -> bool;

    /// Working status: zone id and conditions as produced so far in this pass.
    fn status(&self) -> &DNSZoneStatus;
}

/// Region the provider clients are scoped to for a `DNSZone`.
///
/// # Example
///
/// ```rust
/// use zonekeeper::actuator::effective_region;
/// use zonekeeper::crd::DNSZoneSpec;
///
/// let spec = DNSZoneSpec { zone: "example.com".to_string(), aws: None };
/// assert_eq!(effective_region(&spec), "us-east-1");
/// ```
#[must_use]
pub fn effective_region(spec: &DNSZoneSpec) -> &str {
    spec.region().unwrap_or(DEFAULT_AWS_REGION)
}

/// Fully qualified form of a domain name (trailing dot appended when missing).
#[must_use]
pub fn dotted(domain: &str) -> String {
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{domain}.")
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for `DNSZone` resources.
//!
//! # Condition Format
//!
//! Kubernetes conditions follow a standard format:
//! - `type`: The aspect of the resource being reported (e.g., "`ZoneAvailable`")
//! - `status`: "True" or "False"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp when the status last flipped
//! - `lastProbeTime`: RFC3339 timestamp when the condition was last written
//!
//! Condition updates are pure: [`set_condition_with_change_check`] takes the current
//! list and returns the new list together with a flag telling whether anything was
//! written. Persisting the result is the job of [`DNSZoneStatusUpdater`].
//!
//! # Example
//!
//! ```rust
//! use zonekeeper::reconcilers::status::{set_condition_with_change_check, UpdateConditionCheck};
//!
//! let (conditions, changed) = set_condition_with_change_check(
//!     Vec::new(),
//!     "InsufficientCredentials",
//!     "True",
//!     "AccessDenied",
//!     "AccessDenied error encountered",
//!     UpdateConditionCheck::IfReasonOrMessageChange,
//! );
//! assert!(changed);
//! assert_eq!(conditions.len(), 1);
//! ```

use crate::crd::{Condition, DNSZone, DNSZoneStatus};
use crate::status_reasons::CONDITION_STATUS_FALSE;
use anyhow::Result;
use chrono::Utc;
use kube::api::Patch;
use kube::{api::PatchParams, Api, Client, ResourceExt};
use serde_json::json;
use tracing::debug;

/// Policy deciding whether a condition whose status is unchanged gets overwritten.
///
/// A status flip is always written regardless of the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateConditionCheck {
    /// Always overwrite. Used when clearing a signal so recovery is always recorded.
    Always,
    /// Overwrite only when the reason or message differs from the stored one.
    /// Used when raising a signal so repeated identical failures do not churn status.
    IfReasonOrMessageChange,
}

impl UpdateConditionCheck {
    fn should_update(
        self,
        existing: &Condition,
        status: &str,
        reason: &str,
        message: &str,
    ) -> bool {
        if existing.status != status {
            return true;
        }
        match self {
            Self::Always => true,
            Self::IfReasonOrMessageChange => {
                existing.reason.as_deref() != Some(reason)
                    || existing.message.as_deref() != Some(message)
            }
        }
    }
}

/// Create a new Kubernetes condition with the current timestamp.
///
/// Both `lastTransitionTime` and `lastProbeTime` are set to now.
///
/// # Example
///
/// ```rust
/// # use zonekeeper::reconcilers::status::create_condition;
/// let condition = create_condition(
///     "ZoneAvailable",
///     "True",
///     "ZoneAvailable",
///     "Hosted zone is available"
/// );
/// assert_eq!(condition.r#type, "ZoneAvailable");
/// assert_eq!(condition.status, "True");
/// ```
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    let now = Utc::now().to_rfc3339();
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(now.clone()),
        last_probe_time: Some(now),
    }
}

/// Find a condition by type in a list of conditions.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Set a condition, returning the new list and whether anything was written.
///
/// The condition is replaced in place when its type is present, or appended when it
/// is not; a type never appears twice. A `False` condition whose type is absent is
/// not appended, since there is no raised signal to clear.
///
/// `lastTransitionTime` moves only when the status flips; `lastProbeTime` moves on
/// every write.
///
/// # Arguments
///
/// * `conditions` - Current conditions, consumed
/// * `condition_type` - The type of condition
/// * `status` - "True" or "False"
/// * `reason` - A programmatic identifier in `CamelCase`
/// * `message` - A human-readable explanation
/// * `check` - Overwrite policy applied when the status is unchanged
///
/// # Returns
///
/// The resulting conditions and `true` when a condition was added or overwritten.
#[must_use]
pub fn set_condition_with_change_check(
    mut conditions: Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    check: UpdateConditionCheck,
) -> (Vec<Condition>, bool) {
    if status == CONDITION_STATUS_FALSE && find_condition(&conditions, condition_type).is_none()
    {
        return (conditions, false);
    }
    upsert_condition(conditions, condition_type, status, reason, message, check)
}

/// Set a condition, appending it when its type is absent whatever its status.
///
/// Used for conditions that report state rather than a raised signal, such as
/// `ZoneAvailable`, which must show `False` on a zone that was never available.
/// Overwrite and timestamp rules match [`set_condition_with_change_check`].
#[must_use]
pub fn upsert_condition(
    mut conditions: Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    check: UpdateConditionCheck,
) -> (Vec<Condition>, bool) {
    let now = Utc::now().to_rfc3339();

    let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) else {
        conditions.push(create_condition(condition_type, status, reason, message));
        return (conditions, true);
    };

    if !check.should_update(existing, status, reason, message) {
        return (conditions, false);
    }

    if existing.status != status {
        existing.last_transition_time = Some(now.clone());
    }
    existing.status = status.to_string();
    existing.reason = Some(reason.to_string());
    existing.message = Some(message.to_string());
    existing.last_probe_time = Some(now);

    (conditions, true)
}

/// Compare two condition lists to check if they are semantically equal.
///
/// Timestamps are ignored; only type, status, reason and message are compared.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    for new_cond in new {
        match current.iter().find(|c| c.r#type == new_cond.r#type) {
            None => return false,
            Some(curr_cond) => {
                if curr_cond.status != new_cond.status
                    || curr_cond.reason != new_cond.reason
                    || curr_cond.message != new_cond.message
                {
                    return false;
                }
            }
        }
    }

    true
}

/// Centralized status updater for `DNSZone` resources.
///
/// Collects the status produced by a reconciliation pass and applies it in a single
/// Kubernetes API call, skipping the call when nothing changed semantically. This keeps
/// repeated identical passes from triggering watch events.
///
/// # Example
///
/// ```rust,ignore
/// use zonekeeper::reconcilers::status::DNSZoneStatusUpdater;
///
/// async fn persist(client: Client, zone: DNSZone, status: DNSZoneStatus) -> Result<()> {
///     let mut status_updater = DNSZoneStatusUpdater::new(&zone);
///     status_updater.set_status(status);
///     status_updater.apply(&client).await?;
///     Ok(())
/// }
/// ```
pub struct DNSZoneStatusUpdater {
    namespace: String,
    name: String,
    current_status: Option<DNSZoneStatus>,
    new_status: DNSZoneStatus,
}

impl DNSZoneStatusUpdater {
    /// Create a new status updater for a `DNSZone`.
    ///
    /// Initializes with the current status from the zone, or creates a new empty status.
    #[must_use]
    pub fn new(dnszone: &DNSZone) -> Self {
        let current_status = dnszone.status.clone();
        let new_status = current_status.clone().unwrap_or_default();

        Self {
            namespace: dnszone.namespace().unwrap_or_default(),
            name: dnszone.name_any(),
            current_status,
            new_status,
        }
    }

    /// Replace the pending status (in-memory only, no API call).
    pub fn set_status(&mut self, status: DNSZoneStatus) {
        self.new_status = status;
    }

    /// Pending status.
    #[must_use]
    pub fn status(&self) -> &DNSZoneStatus {
        &self.new_status
    }

    /// Check if the status has actually changed compared to the current status.
    ///
    /// Returns `true` if there are semantic changes that warrant an API update.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        match &self.current_status {
            None => true,
            Some(current) => {
                current.aws != self.new_status.aws
                    || current.name_servers != self.new_status.name_servers
                    || current.last_sync_generation != self.new_status.last_sync_generation
                    || !conditions_equal(&current.conditions, &self.new_status.conditions)
            }
        }
    }

    /// Apply the collected status changes to Kubernetes (single atomic API call).
    ///
    /// Only makes the API call if there are actual changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes API call fails.
    pub async fn apply(&self, client: &Client) -> Result<()> {
        if !self.has_changes() {
            debug!(
                "DNSZone {}/{} status unchanged, skipping update",
                self.namespace, self.name
            );
            return Ok(());
        }

        let api: Api<DNSZone> = Api::namespaced(client.clone(), &self.namespace);

        let patch = json!({
            "status": self.new_status
        });

        api.patch_status(&self.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        debug!(
            "Updated DNSZone {}/{} status: {} condition(s), zone id {:?}",
            self.namespace,
            self.name,
            self.new_status.conditions.len(),
            self.new_status.zone_id()
        );

        Ok(())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;

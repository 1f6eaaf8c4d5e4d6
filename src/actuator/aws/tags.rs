// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hosted zone tag reconciliation.
//!
//! The expected tags are the ownership tag plus the spec's additional tags. The diff
//! against the existing tags is applied with `ChangeTagsForResource`, which accepts at
//! most [`MAX_TAG_CHANGES_PER_CALL`] additions and as many removals per call.

use kube::ResourceExt;
use tracing::{debug, error, info};

use super::AwsActuator;
use crate::constants::{DNSZONE_OWNER_TAG, MAX_TAG_CHANGES_PER_CALL};
use crate::crd::DNSZone;
use crate::dns_errors::ActuatorError;
use crate::route53::{bare_hosted_zone_id, Route53Api, Tag};

/// Tags to add and tags to remove to go from the existing to the expected set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub to_add: Vec<Tag>,
    pub to_delete: Vec<Tag>,
}

impl TagDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }
}

/// Arguments of one `ChangeTagsForResource` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagChangeBatch {
    pub add_tags: Vec<Tag>,
    pub remove_tag_keys: Vec<String>,
}

/// Tags a hosted zone owned by `dnszone` should carry.
///
/// The ownership tag comes first, followed by the additional tags in spec order.
#[must_use]
pub fn expected_tags(dnszone: &DNSZone) -> Vec<Tag> {
    let owner = format!(
        "{}/{}",
        dnszone.namespace().unwrap_or_default(),
        dnszone.name_any()
    );

    std::iter::once(Tag::new(DNSZONE_OWNER_TAG, owner))
        .chain(
            dnszone
                .spec
                .additional_tags()
                .iter()
                .map(|tag| Tag::new(tag.key.clone(), tag.value.clone())),
        )
        .collect()
}

/// Diff existing tags against expected tags.
///
/// Every existing tag starts as a removal candidate. Each expected tag cancels an
/// identical (key and value) candidate, or is scheduled for addition when there is
/// none. The candidates left over are scheduled for removal.
///
/// # Example
///
/// ```rust
/// use zonekeeper::actuator::aws::tags::diff_tags;
/// use zonekeeper::route53::Tag;
///
/// let existing = vec![Tag::new("team", "dns"), Tag::new("env", "dev")];
/// let expected = vec![Tag::new("team", "dns"), Tag::new("env", "prod")];
///
/// let diff = diff_tags(&existing, &expected);
/// assert_eq!(diff.to_add, vec![Tag::new("env", "prod")]);
/// assert_eq!(diff.to_delete, vec![Tag::new("env", "dev")]);
/// ```
#[must_use]
pub fn diff_tags(existing: &[Tag], expected: &[Tag]) -> TagDiff {
    let mut to_delete = existing.to_vec();
    let mut to_add = Vec::new();

    for tag in expected {
        match to_delete.iter().position(|candidate| candidate == tag) {
            Some(index) => {
                to_delete.remove(index);
            }
            None => to_add.push(tag.clone()),
        }
    }

    TagDiff { to_add, to_delete }
}

/// Split a diff into provider sized batches.
///
/// Additions and removals are stepped with one shared index, so batch `n` carries
/// additions `[10n, 10n+10)` and removals `[10n, 10n+10)`. The number of batches is
/// `ceil(max(adds, removes) / 10)`; an empty diff yields no batches.
#[must_use]
pub fn tag_change_batches(diff: &TagDiff) -> Vec<TagChangeBatch> {
    let remove_keys: Vec<&str> = diff.to_delete.iter().map(|tag| tag.key.as_str()).collect();
    let total = diff.to_add.len().max(remove_keys.len());

    (0..total)
        .step_by(MAX_TAG_CHANGES_PER_CALL)
        .map(|start| TagChangeBatch {
            add_tags: window(&diff.to_add, start).to_vec(),
            remove_tag_keys: window(&remove_keys, start)
                .iter()
                .map(|key| (*key).to_string())
                .collect(),
        })
        .collect()
}

fn window<T>(items: &[T], start: usize) -> &[T] {
    if start >= items.len() {
        return &[];
    }
    let end = (start + MAX_TAG_CHANGES_PER_CALL).min(items.len());
    &items[start..end]
}

impl<C: Route53Api> AwsActuator<C> {
    /// Apply the diff between `current_tags` and the expected tags to the resolved zone.
    pub(super) async fn sync_tags(&mut self) -> Result<(), ActuatorError> {
        let zone_id = self.require_hosted_zone()?.id.clone();

        let expected = expected_tags(&self.dnszone);
        let diff = diff_tags(&self.current_tags, &expected);
        if diff.is_empty() {
            debug!("Tags of zone {} are up to date", zone_id);
            return Ok(());
        }

        for tag in &diff.to_add {
            info!("Adding tag {} to zone {}", tag, zone_id);
        }
        for tag in &diff.to_delete {
            info!("Removing tag {} from zone {}", tag, zone_id);
        }

        for batch in tag_change_batches(&diff) {
            debug!(
                "Changing tags of zone {}: {} addition(s), {} removal(s)",
                zone_id,
                batch.add_tags.len(),
                batch.remove_tag_keys.len()
            );
            self.client
                .change_tags_for_hosted_zone(
                    bare_hosted_zone_id(&zone_id),
                    batch.add_tags,
                    batch.remove_tag_keys,
                )
                .await
                .inspect_err(|e| error!("Cannot modify tags of zone {}: {}", zone_id, e))?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tags_tests;

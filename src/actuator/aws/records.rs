// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record set sweep run before a hosted zone is deleted.
//!
//! Route53 refuses to delete a zone holding anything but its apex NS and SOA record
//! sets. The sweep pages through the zone and deletes everything else, one change batch
//! per page.

use tracing::{debug, info};

use super::AwsActuator;
use crate::actuator::dotted;
use crate::constants::{RECORD_SETS_PAGE_SIZE, RECORD_TYPE_NS, RECORD_TYPE_SOA};
use crate::dns_errors::ActuatorError;
use crate::route53::{ChangeAction, RecordSet, RecordSetChange, RecordSetsQuery, Route53Api};

/// Whether a record set is the apex NS or SOA of `apex`, which Route53 manages itself.
///
/// `apex` must be fully qualified.
#[must_use]
pub fn is_apex_record_set(record_set: &RecordSet, apex: &str) -> bool {
    record_set.name == apex
        && (record_set.record_type == RECORD_TYPE_NS || record_set.record_type == RECORD_TYPE_SOA)
}

impl<C: Route53Api> AwsActuator<C> {
    /// Delete every record set of `zone_id` except the apex NS and SOA.
    ///
    /// # Returns
    ///
    /// The number of record sets deleted.
    pub(super) async fn delete_record_sets(&self, zone_id: &str) -> Result<usize, ActuatorError> {
        let apex = dotted(&self.dnszone.spec.zone);
        let mut query = RecordSetsQuery {
            max_items: RECORD_SETS_PAGE_SIZE,
            ..RecordSetsQuery::default()
        };
        let mut deleted = 0;

        loop {
            let page = self.client.list_resource_record_sets(zone_id, &query).await?;

            let changes: Vec<RecordSetChange> = page
                .record_sets
                .into_iter()
                .filter(|record_set| !is_apex_record_set(record_set, &apex))
                .inspect(|record_set| {
                    info!(
                        "Deleting recordset {} {} in zone {}",
                        record_set.name, record_set.record_type, zone_id
                    );
                })
                .map(|record_set| RecordSetChange {
                    action: ChangeAction::Delete,
                    record_set,
                })
                .collect();

            if changes.is_empty() {
                debug!("No deletable recordsets on this page of zone {}", zone_id);
            } else {
                deleted += changes.len();
                self.client
                    .change_resource_record_sets(zone_id, changes)
                    .await?;
            }

            if !page.is_truncated {
                break;
            }
            query.start_record_name = page.next_record_name;
            query.start_record_type = page.next_record_type;
            query.start_record_identifier = page.next_record_identifier;
        }

        debug!("Deleted {} recordset(s) from zone {}", deleted, zone_id);
        Ok(deleted)
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;

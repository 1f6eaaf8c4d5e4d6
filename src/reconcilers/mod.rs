// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers for `DNSZone` resources.
//!
//! # Reconciliation Architecture
//!
//! zonekeeper follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor `DNSZone` changes via the Kubernetes API
//! 2. **Reconcile** - Compare the desired zone (CRD spec) with the Route53 hosted zone
//! 3. **Update** - Create, tag or delete the hosted zone to match
//! 4. **Status** - Report zone id, name servers and conditions back to Kubernetes
//!
//! Every pass is self contained: the hosted zone is rediscovered from the status or
//! from its ownership tag, so a pass can be retried at any point.
//!
//! # Example: Using a Reconciler
//!
//! ```rust,no_run
//! use zonekeeper::context::Context;
//! use zonekeeper::crd::DNSZone;
//! use zonekeeper::reconcilers::reconcile_dnszone;
//! use std::sync::Arc;
//!
//! async fn reconcile_zone(ctx: Arc<Context>, dnszone: DNSZone) -> anyhow::Result<()> {
//!     let status = reconcile_dnszone(ctx, dnszone).await?;
//!     println!("name servers: {:?}", status.map(|s| s.name_servers));
//!     Ok(())
//! }
//! ```

pub mod dnszone;
pub mod finalizers;
pub mod status;


pub use dnszone::{delete_zone_pass, reconcile_dnszone, reconcile_zone_pass, ZonePassOutcome};

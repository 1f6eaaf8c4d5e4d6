// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # zonekeeper - Route53 hosted zones for Kubernetes
//!
//! zonekeeper is a Kubernetes operator that keeps an AWS Route53 hosted zone in line
//! with every `DNSZone` custom resource.
//!
//! ## Overview
//!
//! - Creates the hosted zone when it is missing, idempotently
//! - Keeps the zone's tags in line with the spec
//! - Reports the authoritative name servers in status
//! - Deletes the zone, records first, when the resource is deleted
//! - Surfaces credential problems as status conditions
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`actuator`] - Per-pass hosted zone operations
//! - [`route53`] - Route53 client abstraction and AWS SDK implementation
//! - [`reconcilers`] - Reconciliation logic and status handling
//! - [`dns_errors`] - Provider and actuator error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use zonekeeper::crd::{DNSZone, DNSZoneSpec};
//!
//! let dnszone = DNSZone::new(
//!     "example-com",
//!     DNSZoneSpec {
//!         zone: "example.com".to_string(),
//!         aws: None,
//!     },
//! );
//! ```

pub mod actuator;
pub mod constants;
pub mod context;
pub mod crd;
pub mod dns_errors;
pub mod reconcilers;
pub mod route53;
pub mod status_reasons;

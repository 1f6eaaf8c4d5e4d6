// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the `DNSZone` controller.
//!
//! The controller receives an `Arc<Context>` holding:
//! - Kubernetes client
//! - Route53 clients, one per region, created on first use
//!
//! Route53 clients only hold credentials and connection configuration. Hosted zone
//! state is never cached here; each pass rediscovers it.

use std::collections::HashMap;

use kube::Client;
use tokio::sync::Mutex;
use tracing::debug;

use crate::route53::sdk::SdkRoute53Client;

/// Shared context passed to the controller.
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// Route53 clients keyed by region
    route53_clients: Mutex<HashMap<String, SdkRoute53Client>>,
}

impl Context {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            route53_clients: Mutex::new(HashMap::new()),
        }
    }

    /// Route53 client scoped to `region`.
    ///
    /// The AWS configuration (credential provider chain, endpoints) is loaded the first
    /// time a region is requested. Credentials are refreshed by the SDK itself.
    pub async fn route53_client(&self, region: &str) -> SdkRoute53Client {
        let mut clients = self.route53_clients.lock().await;
        if let Some(client) = clients.get(region) {
            return client.clone();
        }

        debug!("Loading AWS configuration for region {}", region);
        let client = SdkRoute53Client::new(region).await;
        clients.insert(region.to_string(), client.clone());
        client
    }
}

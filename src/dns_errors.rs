// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route53 and actuator error types for zonekeeper.
//!
//! This module provides specialized error types for:
//! - Route53 and resource groups tagging API failures
//! - Hosted zone lookup and name server validation failures
//!
//! Provider errors keep the service error code so credential problems can be
//! surfaced as status conditions without inspecting error types at runtime.

use thiserror::Error;

use crate::constants::{
    ACCESS_DENIED_ERROR_CODES, AUTHENTICATION_FAILURE_ERROR_CODES,
    ERROR_CODE_HOSTED_ZONE_ALREADY_EXISTS, ERROR_CODE_HOSTED_ZONE_NOT_EMPTY,
    ERROR_CODE_NO_SUCH_HOSTED_ZONE,
};

/// Errors returned by a [`Route53Api`](crate::route53::Route53Api) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The service answered with a structured error.
    ///
    /// This is the only classifiable variant: `code` is the AWS error code
    /// (e.g. `NoSuchHostedZone`, `AccessDenied`).
    #[error("{operation} failed: {code}: {message}")]
    Service {
        /// API operation that failed (e.g. "GetHostedZone")
        operation: String,
        /// AWS error code
        code: String,
        /// Message returned by the service
        message: String,
    },

    /// The request never produced a service response (connection, timeout, dispatch).
    #[error("{operation} could not reach the provider: {detail}")]
    Transport {
        /// API operation that failed
        operation: String,
        /// Description of the failure
        detail: String,
    },

    /// The request could not be built from the supplied values.
    #[error("{operation} request is invalid: {detail}")]
    InvalidRequest {
        /// API operation that was being built
        operation: String,
        /// Description of what is invalid
        detail: String,
    },

    /// The service answered successfully but a required field was missing.
    #[error("{operation} returned a malformed response: {detail}")]
    MalformedResponse {
        /// API operation that returned the response
        operation: String,
        /// Description of what is missing
        detail: String,
    },
}

impl ProviderError {
    /// Build a structured service error.
    pub fn service(
        operation: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Service {
            operation: operation.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Build a transport error.
    pub fn transport(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    /// AWS error code, only present for structured service errors.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Service message, only present for structured service errors.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Service { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether this is a service error with the given code.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.code() == Some(code)
    }

    /// The hosted zone id does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.has_code(ERROR_CODE_NO_SUCH_HOSTED_ZONE)
    }

    /// A hosted zone was already created with the same caller reference.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        self.has_code(ERROR_CODE_HOSTED_ZONE_ALREADY_EXISTS)
    }

    /// The hosted zone still holds records other than the apex NS and SOA.
    #[must_use]
    pub fn is_not_empty(&self) -> bool {
        self.has_code(ERROR_CODE_HOSTED_ZONE_NOT_EMPTY)
    }

    /// The credentials lack a permission.
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        self.code()
            .is_some_and(|code| ACCESS_DENIED_ERROR_CODES.contains(&code))
    }

    /// The credentials could not be authenticated.
    #[must_use]
    pub fn is_authentication_failure(&self) -> bool {
        self.code()
            .is_some_and(|code| AUTHENTICATION_FAILURE_ERROR_CODES.contains(&code))
    }
}

/// Errors returned by the hosted zone actuator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// A provider call failed; the provider error is passed through unchanged.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// An operation that needs a resolved hosted zone ran before `refresh`/`create` found one.
    #[error("hosted zone is unpopulated")]
    HostedZoneUnpopulated,

    /// `CreateHostedZone` reported the zone as existing but the caller reference search missed it.
    #[error("hosted zone for '{domain}' with caller reference '{caller_reference}' not found")]
    HostedZoneNotFound {
        /// Domain that was searched
        domain: String,
        /// Caller reference that was searched for
        caller_reference: String,
    },

    /// The `DNSZone` has no UID to use as caller reference.
    #[error("DNSZone '{name}' has no UID to use as caller reference")]
    MissingCallerReference {
        /// Name of the resource
        name: String,
    },

    /// The apex NS lookup returned a number of record sets other than one.
    #[error("unexpected number of recordsets returned: {0}")]
    UnexpectedRecordSetCount(usize),

    /// The apex NS lookup returned a record set of another type.
    #[error("name server record not found")]
    NameServerRecordNotFound,

    /// The apex NS lookup returned a record set for another name.
    #[error("name server record not found for domain {zone}")]
    NameServerRecordNameMismatch {
        /// Zone whose apex was expected
        zone: String,
    },
}

impl ActuatorError {
    /// The underlying provider error, when the failure came from a provider call.
    #[must_use]
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "dns_errors_tests.rs"]
mod dns_errors_tests;

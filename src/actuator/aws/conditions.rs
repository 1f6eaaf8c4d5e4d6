// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credential health conditions derived from provider errors.
//!
//! Two conditions are managed:
//!
//! - `InsufficientCredentials` - raised on `AccessDenied` style codes. The provider
//!   message often embeds account and principal identifiers that differ between
//!   calls, so a fixed message is stored and the raw one only goes to the log.
//! - `AuthenticationFailure` - raised on `InvalidSignatureException` and
//!   `UnrecognizedClientException`, with the provider message verbatim.
//!
//! Raising uses [`UpdateConditionCheck::IfReasonOrMessageChange`]; clearing uses
//! [`UpdateConditionCheck::Always`].

use tracing::warn;

use crate::crd::Condition;
use crate::dns_errors::{ActuatorError, ProviderError};
use crate::reconcilers::status::{set_condition_with_change_check, UpdateConditionCheck};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_AUTHENTICATION_FAILURE,
    CONDITION_TYPE_INSUFFICIENT_CREDENTIALS, MESSAGE_ACCESS_DENIED,
    MESSAGE_CREDENTIALS_AUTHENTICATED, MESSAGE_CREDENTIALS_VALID, REASON_ACCESS_DENIED,
    REASON_ACCESS_GRANTED, REASON_AUTHENTICATION_FAILED, REASON_AUTHENTICATION_SUCCEEDED,
};

/// Update both credential conditions for the outcome of a pass.
///
/// A missing error, or one that carries no provider error code, clears both
/// conditions. A coded provider error raises the matching condition and clears the
/// other one.
///
/// # Returns
///
/// The new conditions and `true` if either condition was written.
#[must_use]
pub fn apply_error_conditions(
    conditions: Vec<Condition>,
    err: Option<&ActuatorError>,
) -> (Vec<Condition>, bool) {
    let coded = err
        .and_then(ActuatorError::provider_error)
        .filter(|provider_err| provider_err.code().is_some());

    let (conditions, credentials_changed) = insufficient_credentials(conditions, coded);
    let (conditions, authentication_changed) = authentication_failure(conditions, coded);

    (conditions, credentials_changed || authentication_changed)
}

fn insufficient_credentials(
    conditions: Vec<Condition>,
    err: Option<&ProviderError>,
) -> (Vec<Condition>, bool) {
    match err.filter(|e| e.is_access_denied()) {
        Some(e) => {
            warn!(
                "Access denied: {}: {}",
                e.code().unwrap_or_default(),
                e.message().unwrap_or_default()
            );
            set_condition_with_change_check(
                conditions,
                CONDITION_TYPE_INSUFFICIENT_CREDENTIALS,
                CONDITION_STATUS_TRUE,
                REASON_ACCESS_DENIED,
                MESSAGE_ACCESS_DENIED,
                UpdateConditionCheck::IfReasonOrMessageChange,
            )
        }
        None => set_condition_with_change_check(
            conditions,
            CONDITION_TYPE_INSUFFICIENT_CREDENTIALS,
            CONDITION_STATUS_FALSE,
            REASON_ACCESS_GRANTED,
            MESSAGE_CREDENTIALS_VALID,
            UpdateConditionCheck::Always,
        ),
    }
}

fn authentication_failure(
    conditions: Vec<Condition>,
    err: Option<&ProviderError>,
) -> (Vec<Condition>, bool) {
    match err.filter(|e| e.is_authentication_failure()) {
        Some(e) => set_condition_with_change_check(
            conditions,
            CONDITION_TYPE_AUTHENTICATION_FAILURE,
            CONDITION_STATUS_TRUE,
            REASON_AUTHENTICATION_FAILED,
            e.message().unwrap_or_default(),
            UpdateConditionCheck::IfReasonOrMessageChange,
        ),
        None => set_condition_with_change_check(
            conditions,
            CONDITION_TYPE_AUTHENTICATION_FAILURE,
            CONDITION_STATUS_FALSE,
            REASON_AUTHENTICATION_SUCCEEDED,
            MESSAGE_CREDENTIALS_AUTHENTICATED,
            UpdateConditionCheck::Always,
        ),
    }
}

#[cfg(test)]
#[path = "conditions_tests.rs"]
mod conditions_tests;

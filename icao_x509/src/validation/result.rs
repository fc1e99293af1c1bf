// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Validation verdict types and their JSON shape.

extern crate alloc;

use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Overall verdict of a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    /// Chain and signatures valid, everything in date
    Valid,
    /// Chain and signatures valid, but the leaf or a CSCA is expired
    ExpiredValid,
    Invalid,
    /// Not yet validated; only ever supplied by a store
    Pending,
    /// The certificate could not be processed
    Error,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValidationStatus::Valid => "VALID",
            ValidationStatus::ExpiredValid => "EXPIRED_VALID",
            ValidationStatus::Invalid => "INVALID",
            ValidationStatus::Pending => "PENDING",
            ValidationStatus::Error => "ERROR",
        })
    }
}

/// Kind of certificate submitted for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateType {
    Dsc,
    /// Non-conformant DSC
    DscNc,
    Csca,
}

impl fmt::Display for CertificateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CertificateType::Dsc => "DSC",
            CertificateType::DscNc => "DSC_NC",
            CertificateType::Csca => "CSCA",
        })
    }
}

/// Verdict for one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub trust_chain_valid: bool,
    pub trust_chain_path: Option<String>,
    pub signature_valid: bool,
    pub crl_checked: bool,
    pub revoked: bool,
    pub csca_found: bool,
    #[serde(rename = "cscaSubjectDN")]
    pub csca_subject_dn: Option<String>,
    pub csca_fingerprint: Option<String>,
    pub dsc_expired: bool,
    pub csca_expired: bool,
    pub validation_status: ValidationStatus,
    pub error_message: Option<String>,
}

impl ValidationResult {
    /// An empty result with the given status.
    pub fn with_status(status: ValidationStatus) -> Self {
        Self {
            trust_chain_valid: false,
            trust_chain_path: None,
            signature_valid: false,
            crl_checked: false,
            revoked: false,
            csca_found: false,
            csca_subject_dn: None,
            csca_fingerprint: None,
            dsc_expired: false,
            csca_expired: false,
            validation_status: status,
            error_message: None,
        }
    }

    /// Result for input that could not be processed.
    pub fn error<S: Into<String>>(message: S) -> Self {
        let mut result = Self::with_status(ValidationStatus::Error);
        result.error_message = Some(message.into());
        result
    }

    /// Trust chain and signatures hold, whatever the expiry flags say.
    pub fn is_trusted(&self) -> bool {
        matches!(
            self.validation_status,
            ValidationStatus::Valid | ValidationStatus::ExpiredValid
        )
    }
}

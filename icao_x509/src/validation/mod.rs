// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Validation orchestrator.
//!
//! [`ValidationService`] composes chain building, chain validation and
//! revocation checking into one [`ValidationResult`] per certificate.
//!
//! Domain failures never leave the service as `Err`: a broken chain, a bad
//! signature or an unparseable certificate are all reported through
//! `validation_status` and `error_message`. Only faults of the underlying
//! providers are returned as errors.
//!
//! Issuer certificates fetched while building a chain are owned by that
//! chain and released when it goes out of scope at the end of the call,
//! whichever way the call returns.

extern crate alloc;

use alloc::string::ToString;

use crate::certificate::Certificate;
use crate::chain::TrustChain;
use crate::config::ValidationConfig;
use crate::crypto_backend::{CryptoBackend, RingBackend};
use crate::error::{ChainError, Error, Result, TimeError};
use crate::provider::{CandidateCertificateProvider, CrlProvider};
use crate::time::{Time, TimeStatus};
use crate::x509::{ChainBuilder, ChainValidator, RevocationChecker};

#[cfg(feature = "std")]
mod batch;
mod result;

#[cfg(feature = "std")]
pub use batch::{BatchSummary, CancellationToken};
pub use result::{CertificateType, ValidationResult, ValidationStatus};

/// Trust chain validation service.
pub struct ValidationService<P, C, B: CryptoBackend = RingBackend> {
    candidates: P,
    crls: C,
    validator: ChainValidator<B>,
    config: ValidationConfig,
}

impl<P: CandidateCertificateProvider, C: CrlProvider> ValidationService<P, C, RingBackend> {
    /// Create a service using the Ring backend.
    pub fn new(candidates: P, crls: C, config: ValidationConfig) -> Result<Self> {
        Self::with_backend(candidates, crls, config, RingBackend)
    }
}

impl<P: CandidateCertificateProvider, C: CrlProvider, B: CryptoBackend> ValidationService<P, C, B> {
    pub fn with_backend(candidates: P, crls: C, config: ValidationConfig, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            candidates,
            crls,
            validator: ChainValidator::with_backend(backend),
            config,
        })
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn candidates(&self) -> &P {
        &self.candidates
    }

    pub fn crls(&self) -> &C {
        &self.crls
    }

    /// Validate `cert` at the current time.
    pub fn validate_certificate(
        &self,
        cert: &Certificate,
        cert_type: CertificateType,
    ) -> Result<ValidationResult> {
        let now = crate::time::current_time()
            .map_err(|_| Error::TimeError(TimeError::InvalidTime))?;
        self.validate_certificate_at(cert, cert_type, &now)
    }

    /// Parse DER or PEM bytes and validate them at the current time.
    pub fn validate_der(&self, bytes: &[u8], cert_type: CertificateType) -> Result<ValidationResult> {
        let now = crate::time::current_time()
            .map_err(|_| Error::TimeError(TimeError::InvalidTime))?;
        self.validate_der_at(bytes, cert_type, &now)
    }

    /// Parse DER or PEM bytes and validate them at `now`. Input that does
    /// not parse yields an `ERROR` result.
    pub fn validate_der_at(
        &self,
        bytes: &[u8],
        cert_type: CertificateType,
        now: &Time,
    ) -> Result<ValidationResult> {
        if bytes.is_empty() {
            return Ok(ValidationResult::error("no certificate supplied"));
        }
        match Certificate::from_bytes(bytes) {
            Ok(cert) => self.validate_certificate_at(&cert, cert_type, now),
            Err(e) => {
                log::debug!("rejecting unparseable {} certificate: {}", cert_type, e);
                Ok(ValidationResult::error(alloc::format!(
                    "failed to parse certificate: {}",
                    e
                )))
            }
        }
    }

    /// Validate `cert` at `now`.
    pub fn validate_certificate_at(
        &self,
        cert: &Certificate,
        cert_type: CertificateType,
        now: &Time,
    ) -> Result<ValidationResult> {
        let hybrid = self.config.hybrid_validity;
        let mut result = ValidationResult::with_status(ValidationStatus::Invalid);

        let leaf_status = cert.validity().status_at(now);
        let mut time_failure = None;
        if leaf_status != TimeStatus::Valid {
            log::debug!("{} is {:?} at {}", cert.subject_dn(), leaf_status, now);
            match cert_type {
                CertificateType::Csca => result.csca_expired = true,
                CertificateType::Dsc | CertificateType::DscNc => result.dsc_expired = true,
            }
            if !hybrid {
                time_failure = Some(match leaf_status {
                    TimeStatus::NotYetValid => ChainError::NotYetValid { depth: 0 },
                    _ => ChainError::Expired { depth: 0 },
                });
            }
        }

        let chain = ChainBuilder::new(&self.candidates).build(cert, self.config.max_depth)?;
        result.trust_chain_path = Some(chain.path());

        if chain.is_valid() {
            self.evaluate_chain(&chain, now, time_failure, &mut result);
        } else {
            result.error_message = Some(chain.message());
        }

        self.check_revocation(&chain, now, &mut result)?;

        log::debug!(
            "{} {}: {} ({})",
            cert_type,
            cert.subject_dn(),
            result.validation_status,
            result.error_message.as_deref().unwrap_or("ok")
        );
        Ok(result)
    }

    /// Fill in the verdict for a chain that reached a root.
    fn evaluate_chain(
        &self,
        chain: &TrustChain<'_>,
        now: &Time,
        time_failure: Option<ChainError>,
        result: &mut ValidationResult,
    ) {
        result.csca_found = true;
        if let Some(root) = chain.root() {
            result.csca_subject_dn = Some(root.subject_dn().to_string());
            result.csca_fingerprint = Some(root.fingerprint_sha256().to_string());
        }

        if self.validator.verify_node(chain, 0).is_err() {
            result.error_message = Some(ChainError::SignatureFailed { depth: 0 }.to_string());
            return;
        }

        let validation = self
            .validator
            .validate_at(chain, now, self.config.hybrid_validity);
        result.csca_expired |= validation.csca_expired;
        if !validation.signatures_valid {
            result.error_message = Some(validation.message());
            return;
        }
        result.signature_valid = true;

        if let Some(failure) = time_failure.or(validation.failure) {
            result.error_message = Some(failure.to_string());
            return;
        }

        result.trust_chain_valid = true;
        result.validation_status = if result.dsc_expired || result.csca_expired {
            ValidationStatus::ExpiredValid
        } else {
            ValidationStatus::Valid
        };
    }

    fn check_revocation(
        &self,
        chain: &TrustChain<'_>,
        now: &Time,
        result: &mut ValidationResult,
    ) -> Result<()> {
        let mut checker = RevocationChecker::with_backend(&self.crls, self.validator.backend());
        if !self.config.verify_crl_signature {
            checker = checker.skip_signature_verification();
        }
        let status = checker.check_chain_at(chain, now)?;
        result.crl_checked = status.checked;
        result.revoked = status.revoked;
        if status.revoked && result.error_message.is_none() {
            result.error_message = Some(status.message);
        }
        Ok(())
    }
}

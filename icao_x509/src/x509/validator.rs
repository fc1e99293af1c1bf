// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Trust chain validation.
//!
//! Checks every issuer node of a built chain (index 1 onwards): its
//! signature under the next node's key, and its validity period. The leaf
//! is checked by the orchestrator.
//!
//! Under the ICAO Doc 9303 Part 12 hybrid model an expired CSCA or link
//! certificate is recorded in [`ChainValidation::csca_expired`] but does not
//! invalidate the chain. With the hybrid model disabled the first time
//! failure is kept and the chain is invalid, though the remaining signatures
//! are still checked so a signature failure is reported in preference.

use crate::certificate::Certificate;
use crate::chain::TrustChain;
use crate::crypto_backend::{CryptoBackend, RingBackend};
use crate::error::{ChainError, Error, Result, TimeError};
use crate::time::{Time, TimeStatus};
use crate::x509::signature::verify_certificate_signature;

/// Outcome of validating a built chain.
///
/// Only issuer nodes are covered. The leaf's own validity, and with it the
/// DSC expiry flag, is evaluated by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainValidation {
    /// Every signature verified and, in strict mode, every node is in date
    pub valid: bool,
    /// Every signature verified
    pub signatures_valid: bool,
    /// Some CSCA or link certificate is outside its validity period
    pub csca_expired: bool,
    /// First hard failure; a signature failure replaces an earlier time failure
    pub failure: Option<ChainError>,
}

impl ChainValidation {
    /// Diagnostic message; empty when the chain is valid.
    pub fn message(&self) -> alloc::string::String {
        use alloc::string::ToString;
        self.failure
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// Trust chain validator.
pub struct ChainValidator<B: CryptoBackend = RingBackend> {
    /// Crypto backend for signature verification
    backend: B,
}

impl ChainValidator<RingBackend> {
    /// Create a new ChainValidator with the Ring backend
    pub fn new() -> Self {
        Self::with_backend(RingBackend)
    }
}

impl Default for ChainValidator<RingBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: CryptoBackend> ChainValidator<B> {
    /// Create a new ChainValidator with a specific backend
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Verify the signature of the node at `index` with its issuer's key.
    pub fn verify_node(&self, chain: &TrustChain<'_>, index: usize) -> Result<()> {
        let node = chain
            .nodes()
            .get(index)
            .ok_or_else(|| Error::internal("chain index out of range"))?;
        let issuer = chain
            .issuer_of(index)
            .ok_or_else(|| Error::internal("chain index out of range"))?;
        self.verify_signature(node.certificate(), issuer)
    }

    /// Verify certificate signature against issuer's public key.
    pub fn verify_signature(&self, cert: &Certificate, issuer: &Certificate) -> Result<()> {
        match verify_certificate_signature(&self.backend, cert, issuer) {
            Ok(()) => {
                log::trace!("signature of {} verified", cert.subject_dn());
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "signature of {} under {} failed: {}",
                    cert.subject_dn(),
                    issuer.subject_dn(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Validate `chain` at the current time.
    pub fn validate(&self, chain: &TrustChain<'_>, hybrid: bool) -> Result<ChainValidation> {
        let now = crate::time::current_time()
            .map_err(|_| Error::TimeError(TimeError::InvalidTime))?;
        Ok(self.validate_at(chain, &now, hybrid))
    }

    /// Validate `chain` at `now`.
    pub fn validate_at(&self, chain: &TrustChain<'_>, now: &Time, hybrid: bool) -> ChainValidation {
        let mut result = ChainValidation {
            valid: true,
            signatures_valid: true,
            csca_expired: false,
            failure: None,
        };

        for (depth, node) in chain.nodes().iter().enumerate().skip(1) {
            let cert = node.certificate();

            let status = cert.validity().status_at(now);
            if status != TimeStatus::Valid {
                log::warn!(
                    "{} at depth {} is {:?} (notAfter {})",
                    cert.subject_dn(),
                    depth,
                    status,
                    cert.validity().not_after
                );
                result.csca_expired = true;
                if !hybrid && result.failure.is_none() {
                    result.valid = false;
                    result.failure = Some(match status {
                        TimeStatus::NotYetValid => ChainError::NotYetValid { depth },
                        _ => ChainError::Expired { depth },
                    });
                }
            }

            if self.verify_node(chain, depth).is_err() {
                result.valid = false;
                result.signatures_valid = false;
                result.failure = Some(ChainError::SignatureFailed { depth });
                break;
            }
        }

        log::debug!(
            "validated chain {}: valid={} csca_expired={}",
            chain.path(),
            result.valid,
            result.csca_expired
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryTrustStore;
    use crate::x509::ChainBuilder;

    fn load_cert(relative: &str) -> Certificate {
        let path = format!("{}/../test_key/icao/{}", env!("CARGO_MANIFEST_DIR"), relative);
        let der = std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {}", path, e));
        Certificate::from_der(&der).unwrap()
    }

    fn now() -> Time {
        Time::from_ymd(2026, 6, 1).unwrap()
    }

    fn store(files: &[&str]) -> InMemoryTrustStore {
        files
            .iter()
            .fold(InMemoryTrustStore::new(), |s, f| s.with_certificate(load_cert(f)))
    }

    #[test]
    fn test_valid_link_chain() {
        let store = store(&["csca_de.der", "link_de.der"]);
        let leaf = load_cert("dsc_de.der");
        let chain = ChainBuilder::new(&store).build(&leaf, 5).unwrap();
        let validator = ChainValidator::new();
        let result = validator.validate_at(&chain, &now(), true);
        assert!(result.valid);
        assert!(result.signatures_valid);
        assert!(!result.csca_expired);
        assert_eq!(result.message(), "");
        assert!(validator.verify_node(&chain, 0).is_ok());
        assert!(validator.verify_node(&chain, 3).is_err());
    }

    #[test]
    fn test_substituted_root_fails_at_depth_one() {
        let store = store(&["csca_de_substituted.der", "link_de.der"]);
        let leaf = load_cert("dsc_de.der");
        let chain = ChainBuilder::new(&store).build(&leaf, 5).unwrap();
        assert!(chain.is_valid());
        let result = ChainValidator::new().validate_at(&chain, &now(), true);
        assert!(!result.valid);
        assert!(!result.signatures_valid);
        assert_eq!(result.failure, Some(ChainError::SignatureFailed { depth: 1 }));
        assert_eq!(result.message(), "signature verification failed at depth 1");
    }

    #[test]
    fn test_expired_csca_hybrid_and_strict() {
        let store = store(&["csca_it_expired.der"]);
        let leaf = load_cert("dsc_it.der");
        let chain = ChainBuilder::new(&store).build(&leaf, 5).unwrap();
        let validator = ChainValidator::new();

        let hybrid = validator.validate_at(&chain, &now(), true);
        assert!(hybrid.valid);
        assert!(hybrid.csca_expired);

        let strict = validator.validate_at(&chain, &now(), false);
        assert!(!strict.valid);
        assert!(strict.signatures_valid);
        assert_eq!(strict.failure, Some(ChainError::Expired { depth: 1 }));
    }

    #[test]
    fn test_not_yet_valid_csca() {
        let store = store(&["csca_de.der", "link_de.der"]);
        let leaf = load_cert("dsc_de.der");
        let chain = ChainBuilder::new(&store).build(&leaf, 5).unwrap();
        // before the link certificate's notBefore (2022-01-01)
        let early = Time::from_ymd(2020, 1, 1).unwrap();
        let validator = ChainValidator::new();
        assert!(validator.validate_at(&chain, &early, true).csca_expired);
        assert_eq!(
            validator.validate_at(&chain, &early, false).failure,
            Some(ChainError::NotYetValid { depth: 1 })
        );
    }
}

// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Revocation checking against the latest CRL of the leaf's issuer.
//!
//! The CRL issued by the leaf's own issuer is preferred, since a country can
//! run several CSCAs that each publish a list. When the provider has none
//! for that DN, the latest CRL of the issuer's country is used, or of the
//! full issuer DN when the issuer has no country attribute. A stale CRL is
//! still used and the staleness is reported in the message. Revocation is
//! independent of chain validity.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::certificate::Certificate;
use crate::chain::TrustChain;
use crate::crl::{Crl, RevocationReason};
use crate::crypto_backend::{CryptoBackend, RingBackend};
use crate::dn;
use crate::error::{CrlError, Error, Result, TimeError};
use crate::provider::CrlProvider;
use crate::time::Time;
use crate::x509::signature::verify_crl_signature;

/// Outcome of a revocation check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevocationStatus {
    /// A usable CRL was found and consulted
    pub checked: bool,
    pub revoked: bool,
    /// The CRL consulted was past its nextUpdate
    pub stale: bool,
    pub reason: Option<RevocationReason>,
    pub message: String,
}

/// CRL lookup key for `cert`: upper-case issuer country, else issuer DN.
pub fn crl_key(cert: &Certificate) -> String {
    cert.issuer_country()
        .unwrap_or_else(|| cert.issuer_dn().to_string())
}

/// Revocation checker.
pub struct RevocationChecker<'a, C: ?Sized, B: CryptoBackend = RingBackend> {
    provider: &'a C,
    backend: &'a B,
    verify_signature: bool,
}

impl<'a, C: CrlProvider + ?Sized> RevocationChecker<'a, C, RingBackend> {
    pub fn new(provider: &'a C) -> Self {
        Self::with_backend(provider, &RingBackend)
    }
}

impl<'a, C: CrlProvider + ?Sized, B: CryptoBackend> RevocationChecker<'a, C, B> {
    pub fn with_backend(provider: &'a C, backend: &'a B) -> Self {
        Self {
            provider,
            backend,
            verify_signature: true,
        }
    }

    /// Use CRLs without verifying their signature
    pub fn skip_signature_verification(mut self) -> Self {
        self.verify_signature = false;
        self
    }

    /// Check `leaf` at the current time.
    pub fn check(&self, leaf: &Certificate) -> Result<RevocationStatus> {
        let now = crate::time::current_time()
            .map_err(|_| Error::TimeError(TimeError::InvalidTime))?;
        self.check_at(leaf, &now)
    }

    /// Check `leaf` at `now`. No issuer certificate is known, so the CRL
    /// signature cannot be verified.
    pub fn check_at(&self, leaf: &Certificate, now: &Time) -> Result<RevocationStatus> {
        self.check_with_issuers_at(leaf, &[], now)
    }

    /// Check the leaf of `chain`, verifying the CRL with a chain node's key
    /// when one of them issued it.
    pub fn check_chain_at(&self, chain: &TrustChain<'_>, now: &Time) -> Result<RevocationStatus> {
        let issuers: Vec<&Certificate> = chain.iter().skip(1).collect();
        self.check_with_issuers_at(chain.leaf(), &issuers, now)
    }

    pub fn check_with_issuers_at(
        &self,
        leaf: &Certificate,
        issuers: &[&Certificate],
        now: &Time,
    ) -> Result<RevocationStatus> {
        let key = crl_key(leaf);
        let crl = match self.find_crl(leaf, &key)? {
            Some(crl) => crl,
            None => {
                log::debug!("no CRL for {}", key);
                return Ok(RevocationStatus {
                    message: CrlError::Unavailable(key).to_string(),
                    ..Default::default()
                });
            }
        };

        if self.verify_signature && !self.crl_signature_ok(&crl, issuers) {
            return Ok(RevocationStatus {
                message: CrlError::SignatureInvalid.to_string(),
                ..Default::default()
            });
        }

        let mut status = RevocationStatus {
            checked: true,
            ..Default::default()
        };
        let mut notes = Vec::new();

        if crl.is_stale_at(now) {
            status.stale = true;
            let next = crl
                .next_update()
                .map(ToString::to_string)
                .unwrap_or_default();
            log::warn!("CRL for {} is stale (nextUpdate {})", key, next);
            notes.push(alloc::format!("CRL for {} is stale (nextUpdate {})", key, next));
        }

        match crl.find_revoked(leaf.serial_number()) {
            Some(entry) => {
                status.revoked = true;
                status.reason = Some(entry.reason);
                log::debug!(
                    "serial {} revoked on {} ({})",
                    leaf.serial_hex(),
                    entry.revocation_date,
                    entry.reason
                );
                notes.push(alloc::format!(
                    "certificate serial {} revoked ({})",
                    leaf.serial_hex(),
                    entry.reason
                ));
            }
            None => notes.push(String::from("certificate not revoked")),
        }

        status.message = notes.join("; ");
        Ok(status)
    }

    fn find_crl(&self, leaf: &Certificate, key: &str) -> Result<Option<Crl>> {
        if key != leaf.issuer_dn() {
            if let Some(crl) = self.provider.find_latest(leaf.issuer_dn())? {
                if dn::equal(crl.issuer_dn(), leaf.issuer_dn()) {
                    return Ok(Some(crl));
                }
            }
            log::trace!("no CRL from {}, falling back to {}", leaf.issuer_dn(), key);
        }
        self.provider.find_latest(key)
    }

    /// False only when a chain node issued the CRL and its key rejects the
    /// CRL signature. Unsigned CRLs and CRLs from issuers outside the chain
    /// are accepted.
    fn crl_signature_ok(&self, crl: &Crl, issuers: &[&Certificate]) -> bool {
        if crl.signed_part().is_none() {
            return true;
        }
        let issuer = match issuers
            .iter()
            .find(|cert| dn::equal(cert.subject_dn(), crl.issuer_dn()))
        {
            Some(issuer) => issuer,
            None => {
                log::debug!("CRL issuer {} not in chain, signature not checked", crl.issuer_dn());
                return true;
            }
        };
        match verify_crl_signature(self.backend, crl, issuer) {
            Ok(()) => true,
            Err(e) => {
                log::error!("CRL signature from {} rejected: {}", crl.issuer_dn(), e);
                false
            }
        }
    }
}

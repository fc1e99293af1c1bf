// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Lookup seams between the validation engine and certificate storage.
//!
//! The engine never talks to a database directly. It asks a
//! [`CandidateCertificateProvider`] for issuer candidates by subject DN, a
//! [`CrlProvider`] for the latest CRL of a country or issuer, and, for batch
//! revalidation, a [`RevalidationStore`] for pending work.
//!
//! Provider errors are the only faults that escape validation as `Err`;
//! everything else is reported inside a `ValidationResult`.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::certificate::Certificate;
use crate::crl::Crl;
use crate::dn;
use crate::error::{Error, Result};
use crate::validation::{CertificateType, ValidationResult};

/// Source of issuer candidates.
pub trait CandidateCertificateProvider {
    /// All certificates whose subject DN equals `subject_dn` under
    /// [`dn::equal`]. The caller owns the returned certificates.
    fn find_by_subject_dn(&self, subject_dn: &str) -> Result<Vec<Certificate>>;
}

/// Source of CRLs.
pub trait CrlProvider {
    /// Most recent CRL for `key`, which is either an upper-case country code
    /// or a full issuer DN. The revocation checker asks for the issuer DN
    /// first and falls back to the country.
    fn find_latest(&self, key: &str) -> Result<Option<Crl>>;
}

/// A stored certificate waiting for (re)validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCertificate {
    pub id: String,
    pub cert_type: CertificateType,
    pub der: Vec<u8>,
}

/// Persistence used by batch revalidation.
pub trait RevalidationStore {
    /// Up to `limit` stored DSCs to revalidate.
    fn pending_dsc(&self, limit: usize) -> Result<Vec<PendingCertificate>>;

    /// Persist the outcome for the certificate identified by `id`.
    fn store_result(&self, id: &str, result: &ValidationResult) -> Result<()>;
}

macro_rules! forward_provider_impls {
    ($($wrapper:ty),*) => {$(
        impl<T: CandidateCertificateProvider + ?Sized> CandidateCertificateProvider for $wrapper {
            fn find_by_subject_dn(&self, subject_dn: &str) -> Result<Vec<Certificate>> {
                (**self).find_by_subject_dn(subject_dn)
            }
        }

        impl<T: CrlProvider + ?Sized> CrlProvider for $wrapper {
            fn find_latest(&self, key: &str) -> Result<Option<Crl>> {
                (**self).find_latest(key)
            }
        }

        impl<T: RevalidationStore + ?Sized> RevalidationStore for $wrapper {
            fn pending_dsc(&self, limit: usize) -> Result<Vec<PendingCertificate>> {
                (**self).pending_dsc(limit)
            }

            fn store_result(&self, id: &str, result: &ValidationResult) -> Result<()> {
                (**self).store_result(id, result)
            }
        }
    )*};
}

forward_provider_impls!(&T, Arc<T>, alloc::boxed::Box<T>);

/// Certificates and CRLs held in memory.
///
/// Useful for master-list imports and tests. Lookups go through the DN
/// normalizer, so slash-form and RFC 2253 queries both match.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrustStore {
    certificates: Vec<Certificate>,
    crls: Vec<Crl>,
}

impl InMemoryTrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_certificate(&mut self, cert: Certificate) {
        self.certificates.push(cert);
    }

    pub fn add_crl(&mut self, crl: Crl) {
        self.crls.push(crl);
    }

    pub fn with_certificate(mut self, cert: Certificate) -> Self {
        self.add_certificate(cert);
        self
    }

    pub fn with_crl(mut self, crl: Crl) -> Self {
        self.add_crl(crl);
        self
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }
}

impl CandidateCertificateProvider for InMemoryTrustStore {
    fn find_by_subject_dn(&self, subject_dn: &str) -> Result<Vec<Certificate>> {
        let wanted = dn::normalize(subject_dn);
        Ok(self
            .certificates
            .iter()
            .filter(|cert| dn::normalize(cert.subject_dn()) == wanted)
            .cloned()
            .collect())
    }
}

impl CrlProvider for InMemoryTrustStore {
    fn find_latest(&self, key: &str) -> Result<Option<Crl>> {
        let key = key.trim();
        Ok(self
            .crls
            .iter()
            .filter(|crl| {
                crl.issuer_country()
                    .map_or(false, |country| country.eq_ignore_ascii_case(key))
                    || dn::equal(crl.issuer_dn(), key)
            })
            .max_by(|a, b| a.this_update().cmp(b.this_update()))
            .cloned())
    }
}

/// Spreads lookups over several replicas of the same provider.
///
/// Each call starts at the next replica in turn; when a replica fails the
/// remaining ones are tried before the last error is returned.
#[derive(Debug, Default)]
pub struct RoundRobin<P> {
    replicas: Vec<P>,
    next: AtomicUsize,
}

impl<P> RoundRobin<P> {
    pub fn new(replicas: Vec<P>) -> Self {
        Self {
            replicas,
            next: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    fn call<T>(&self, mut f: impl FnMut(&P) -> Result<T>) -> Result<T> {
        let count = self.replicas.len();
        if count == 0 {
            return Err(Error::provider("no replicas configured"));
        }
        let start = self.next.fetch_add(1, Ordering::Relaxed) % count;
        let mut last_err = None;
        for offset in 0..count {
            let index = (start + offset) % count;
            match f(&self.replicas[index]) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    log::warn!("replica {} failed: {}", index, e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| Error::provider("all replicas failed")))
    }
}

impl<P: CandidateCertificateProvider> CandidateCertificateProvider for RoundRobin<P> {
    fn find_by_subject_dn(&self, subject_dn: &str) -> Result<Vec<Certificate>> {
        self.call(|replica| replica.find_by_subject_dn(subject_dn))
    }
}

impl<P: CrlProvider> CrlProvider for RoundRobin<P> {
    fn find_latest(&self, key: &str) -> Result<Option<Crl>> {
        self.call(|replica| replica.find_latest(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    fn load(relative: &str) -> Vec<u8> {
        let path = format!("{}/../test_key/icao/{}", env!("CARGO_MANIFEST_DIR"), relative);
        std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {}", path, e))
    }

    fn store() -> InMemoryTrustStore {
        InMemoryTrustStore::new()
            .with_certificate(Certificate::from_der(&load("csca_fr.der")).unwrap())
            .with_certificate(Certificate::from_der(&load("csca_de.der")).unwrap())
            .with_certificate(Certificate::from_der(&load("csca_de_substituted.der")).unwrap())
            .with_crl(Crl::from_der(&load("crl_fr_stale.der")).unwrap())
            .with_crl(Crl::from_der(&load("crl_fr.der")).unwrap())
    }

    #[test]
    fn test_find_by_subject_dn_any_format() {
        let store = store();
        assert_eq!(store.find_by_subject_dn("CN=Root-FR,O=Gouv,C=FR").unwrap().len(), 1);
        assert_eq!(store.find_by_subject_dn("/C=FR/O=Gouv/CN=Root-FR").unwrap().len(), 1);
        assert_eq!(store.find_by_subject_dn("cn=root de, o=bund, c=de").unwrap().len(), 2);
        assert!(store.find_by_subject_dn("CN=Nobody").unwrap().is_empty());
    }

    #[test]
    fn test_find_latest_crl() {
        let store = store();
        let crl = store.find_latest("FR").unwrap().unwrap();
        assert_eq!(crl.crl_number_hex().as_deref(), Some("07"));
        assert!(store.find_latest("fr").unwrap().is_some());
        assert!(store
            .find_latest("CN=Root-FR,O=Gouv,C=FR")
            .unwrap()
            .is_some());
        assert!(store.find_latest("DE").unwrap().is_none());
    }

    #[test]
    fn test_find_latest_by_issuer_dn() {
        let store = InMemoryTrustStore::new()
            .with_crl(Crl::from_der(&load("crl_nl.der")).unwrap())
            .with_crl(Crl::from_der(&load("crl_nl_2.der")).unwrap());
        let by_country = store.find_latest("NL").unwrap().unwrap();
        assert_eq!(by_country.issuer_dn(), "CN=Root-NL 2,O=Staat,C=NL");
        let by_dn = store.find_latest("/C=NL/O=Staat/CN=Root-NL").unwrap().unwrap();
        assert_eq!(by_dn.issuer_dn(), "CN=Root-NL,O=Staat,C=NL");
    }

    struct Flaky {
        fail: bool,
        calls: Cell<usize>,
    }

    impl CandidateCertificateProvider for Flaky {
        fn find_by_subject_dn(&self, _subject_dn: &str) -> Result<Vec<Certificate>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(Error::provider("connection refused"))
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[test]
    fn test_round_robin_rotates_and_fails_over() {
        let pool = RoundRobin::new(vec![
            Flaky {
                fail: false,
                calls: Cell::new(0),
            },
            Flaky {
                fail: true,
                calls: Cell::new(0),
            },
        ]);
        pool.find_by_subject_dn("CN=X").unwrap();
        pool.find_by_subject_dn("CN=X").unwrap();
        // second call started at the failing replica and fell back to the first
        assert_eq!(pool.replicas[0].calls.get(), 2);
        assert_eq!(pool.replicas[1].calls.get(), 1);
    }

    #[test]
    fn test_round_robin_all_failing() {
        let pool = RoundRobin::new(vec![Flaky {
            fail: true,
            calls: Cell::new(0),
        }]);
        let err = pool.find_by_subject_dn("CN=X").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Provider);

        let empty: RoundRobin<Flaky> = RoundRobin::new(Vec::new());
        assert!(empty.find_by_subject_dn("CN=X").is_err());
    }
}

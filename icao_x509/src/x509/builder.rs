// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Trust chain construction.
//!
//! Walks from a leaf certificate towards a self-signed CSCA, resolving one
//! issuer per hop from the candidate provider. Every DN comparison goes
//! through [`crate::dn`], so repository and presented certificates may use
//! different DN encodings.
//!
//! Construction failures (no candidate, broken chain, cycle, depth) are not
//! errors: they come back as an invalid [`TrustChain`] carrying the partial
//! path and a diagnostic. Only provider faults are returned as `Err`.

extern crate alloc;

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use crate::certificate::Certificate;
use crate::chain::{NodeRole, TrustChain};
use crate::dn;
use crate::error::{ChainError, Error, Result};
use crate::provider::CandidateCertificateProvider;

/// Issuer candidates fetched during one build.
///
/// Certificates are moved out of the pool into the chain when selected;
/// whatever is left is dropped with the pool.
struct CandidatePool<'p, P: ?Sized> {
    provider: &'p P,
    certificates: Vec<Certificate>,
    queried: BTreeSet<String>,
}

impl<'p, P: CandidateCertificateProvider + ?Sized> CandidatePool<'p, P> {
    fn new(provider: &'p P) -> Self {
        Self {
            provider,
            certificates: Vec::new(),
            queried: BTreeSet::new(),
        }
    }

    /// Query the provider for `issuer_dn` unless that DN was already asked for.
    fn extend(&mut self, issuer_dn: &str) -> Result<()> {
        let key = dn::normalize(issuer_dn);
        if !self.queried.insert(key) {
            return Ok(());
        }
        let found = self.provider.find_by_subject_dn(issuer_dn)?;
        log::trace!("provider returned {} candidate(s) for {}", found.len(), issuer_dn);
        self.certificates.extend(found);
        Ok(())
    }

    /// Remove and return the issuer of `current`.
    ///
    /// Among candidates whose subject matches the wanted DN, the one whose
    /// Subject Key Identifier equals the Authority Key Identifier of
    /// `current` wins; otherwise the first match in provider order.
    fn take_issuer(&mut self, current: &Certificate, wanted: &str) -> Option<Certificate> {
        let aki = current.authority_key_identifier();
        let mut first_match = None;
        for (index, candidate) in self.certificates.iter().enumerate() {
            if dn::normalize(candidate.subject_dn()) != wanted {
                continue;
            }
            if aki.is_some() && candidate.subject_key_identifier() == aki {
                first_match = Some(index);
                break;
            }
            if first_match.is_none() {
                first_match = Some(index);
            }
        }
        first_match.map(|index| self.certificates.remove(index))
    }
}

/// Builds trust chains from a candidate provider.
pub struct ChainBuilder<'p, P: ?Sized> {
    provider: &'p P,
}

impl<'p, P: CandidateCertificateProvider + ?Sized> ChainBuilder<'p, P> {
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    /// Build the chain above `leaf`, taking at most `max_depth` issuer hops.
    pub fn build<'c>(&self, leaf: &'c Certificate, max_depth: usize) -> Result<TrustChain<'c>> {
        if max_depth == 0 {
            return Err(Error::config("max_depth must be at least 1"));
        }

        let chain = TrustChain::start(leaf);
        let leaf_issuer = leaf.issuer_dn();
        if leaf_issuer.trim().is_empty() {
            return Ok(chain.fail(ChainError::IssuerDnMissing { depth: 0 }));
        }

        let mut pool = CandidatePool::new(self.provider);
        pool.extend(leaf_issuer)?;
        if pool.certificates.is_empty() {
            log::debug!("no CSCA candidates for {}", leaf_issuer);
            return Ok(chain.fail(ChainError::NoCscaFound(String::from(leaf_issuer))));
        }

        let chain = walk(chain, &mut pool, max_depth)?;
        log::debug!(
            "chain for {}: {} ({})",
            leaf.subject_dn(),
            chain.path(),
            if chain.is_valid() { "complete" } else { "incomplete" }
        );
        Ok(chain)
    }
}

fn walk<'c, P: CandidateCertificateProvider + ?Sized>(
    mut chain: TrustChain<'c>,
    pool: &mut CandidatePool<'_, P>,
    max_depth: usize,
) -> Result<TrustChain<'c>> {
    let mut visited = BTreeSet::new();
    visited.insert(dn::normalize(chain.leaf().subject_dn()));

    let mut depth = 0;
    while depth < max_depth {
        depth += 1;

        let current = chain.last_certificate();
        if current.is_self_signed() {
            return Ok(chain.complete());
        }

        let issuer_dn = current.issuer_dn();
        if issuer_dn.trim().is_empty() {
            return Ok(chain.fail(ChainError::IssuerDnMissing { depth }));
        }

        let wanted = dn::normalize(issuer_dn);
        if !visited.insert(wanted.clone()) {
            log::warn!("circular reference to {} at depth {}", issuer_dn, depth);
            return Ok(chain.fail(ChainError::CircularReference { depth }));
        }

        pool.extend(issuer_dn)?;
        let issuer = match pool.take_issuer(current, &wanted) {
            Some(issuer) => issuer,
            None => {
                log::debug!("no issuer {} at depth {}", issuer_dn, depth);
                return Ok(chain.fail(ChainError::ChainBroken { depth }));
            }
        };

        let role = if !issuer.is_self_signed() && issuer.is_link_certificate() {
            NodeRole::LinkCertificate
        } else {
            NodeRole::RootCsca
        };
        log::trace!("depth {}: {} ({:?})", depth, issuer.subject_dn(), role);

        let reached_root = issuer.is_self_signed();
        chain.push(issuer, role);
        if reached_root {
            return Ok(chain.complete());
        }
    }

    Ok(chain.fail(ChainError::DepthExceeded { max_depth }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryTrustStore;
    use core::cell::RefCell;

    fn load_cert(relative: &str) -> Certificate {
        let path = format!("{}/../test_key/icao/{}", env!("CARGO_MANIFEST_DIR"), relative);
        let der = std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {}", path, e));
        Certificate::from_der(&der).unwrap()
    }

    fn store(files: &[&str]) -> InMemoryTrustStore {
        files
            .iter()
            .fold(InMemoryTrustStore::new(), |s, f| s.with_certificate(load_cert(f)))
    }

    /// Records every DN the builder asks for.
    struct Recording<'a> {
        inner: &'a InMemoryTrustStore,
        queries: RefCell<Vec<String>>,
    }

    impl CandidateCertificateProvider for Recording<'_> {
        fn find_by_subject_dn(&self, subject_dn: &str) -> Result<Vec<Certificate>> {
            self.queries.borrow_mut().push(subject_dn.to_string());
            self.inner.find_by_subject_dn(subject_dn)
        }
    }

    #[test]
    fn test_direct_chain() {
        let store = store(&["csca_fr.der"]);
        let leaf = load_cert("dsc_fr.der");
        let chain = ChainBuilder::new(&store).build(&leaf, 5).unwrap();
        assert!(chain.is_valid());
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.nodes()[1].role(), NodeRole::RootCsca);
        assert_eq!(chain.path(), "DSC → CN=Root-FR");
    }

    #[test]
    fn test_link_chain_queries_each_dn_once() {
        let store = store(&["csca_de.der", "link_de.der"]);
        let provider = Recording {
            inner: &store,
            queries: RefCell::new(Vec::new()),
        };
        let leaf = load_cert("dsc_de.der");
        let chain = ChainBuilder::new(&provider).build(&leaf, 5).unwrap();
        assert!(chain.is_valid());
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.nodes()[1].role(), NodeRole::LinkCertificate);
        assert_eq!(chain.nodes()[2].role(), NodeRole::RootCsca);
        assert_eq!(chain.path(), "DSC → CN=Link DE → CN=Root DE");
        assert_eq!(provider.queries.borrow().len(), 2);
    }

    #[test]
    fn test_ca_without_key_cert_sign_is_tagged_root() {
        let store = store(&["csca_fr.der", "ca_fr_no_key_usage.der"]);
        let leaf = load_cert("dsc_fr_sub.der");
        let chain = ChainBuilder::new(&store).build(&leaf, 5).unwrap();
        assert!(chain.is_valid());
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.nodes()[1].role(), NodeRole::RootCsca);
        assert_eq!(chain.nodes()[2].role(), NodeRole::RootCsca);
        assert_eq!(chain.path(), "DSC → CN=Sub-FR → CN=Root-FR");
    }

    #[test]
    fn test_key_identifier_tie_break() {
        // The substituted root is listed first but its SKI does not match.
        let store = store(&["csca_de_substituted.der", "csca_de.der", "link_de.der"]);
        let leaf = load_cert("dsc_de.der");
        let chain = ChainBuilder::new(&store).build(&leaf, 5).unwrap();
        let genuine = load_cert("csca_de.der");
        assert_eq!(
            chain.root().unwrap().fingerprint_sha256(),
            genuine.fingerprint_sha256()
        );
    }

    #[test]
    fn test_no_csca_found() {
        let store = store(&["csca_fr.der"]);
        let leaf = load_cert("dsc_orphan.der");
        let chain = ChainBuilder::new(&store).build(&leaf, 5).unwrap();
        assert!(!chain.is_valid());
        assert_eq!(chain.len(), 1);
        assert!(chain.message().contains("no CSCA found"));
    }

    #[test]
    fn test_chain_broken() {
        // The link is found but its root is missing.
        let store = store(&["link_de.der"]);
        let leaf = load_cert("dsc_de.der");
        let chain = ChainBuilder::new(&store).build(&leaf, 5).unwrap();
        assert!(!chain.is_valid());
        assert_eq!(chain.failure(), Some(&ChainError::ChainBroken { depth: 2 }));
        assert_eq!(chain.path(), "DSC → CN=Link DE");
    }

    #[test]
    fn test_cycle_detected() {
        let store = store(&["cycle_x.der", "cycle_y.der"]);
        let leaf = load_cert("dsc_cycle.der");
        let chain = ChainBuilder::new(&store).build(&leaf, 5).unwrap();
        assert!(!chain.is_valid());
        assert_eq!(
            chain.failure(),
            Some(&ChainError::CircularReference { depth: 3 })
        );
        assert_eq!(chain.len(), 3);
        let subjects: BTreeSet<String> = chain.iter().map(|c| dn::normalize(c.subject_dn())).collect();
        assert_eq!(subjects.len(), chain.len());
    }

    #[test]
    fn test_depth_bound() {
        let store = store(&["csca_de.der", "link_de.der"]);
        let leaf = load_cert("dsc_de.der");

        let chain = ChainBuilder::new(&store).build(&leaf, 1).unwrap();
        assert!(!chain.is_valid());
        assert_eq!(chain.failure(), Some(&ChainError::DepthExceeded { max_depth: 1 }));
        assert!(chain.len() <= 2);
        assert_eq!(chain.message(), "maximum chain depth 1 exceeded");

        let chain = ChainBuilder::new(&store).build(&leaf, 2).unwrap();
        assert!(chain.is_valid());
        assert_eq!(chain.len(), 3);

        assert!(ChainBuilder::new(&store).build(&leaf, 0).is_err());
    }

    #[test]
    fn test_self_signed_leaf() {
        let store = store(&["csca_fr.der"]);
        let leaf = load_cert("csca_fr.der");
        let chain = ChainBuilder::new(&store).build(&leaf, 5).unwrap();
        assert!(chain.is_valid());
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.path(), "DSC");
    }

    struct Failing;

    impl CandidateCertificateProvider for Failing {
        fn find_by_subject_dn(&self, _subject_dn: &str) -> Result<Vec<Certificate>> {
            Err(Error::provider("directory unavailable"))
        }
    }

    #[test]
    fn test_provider_fault_propagates() {
        let leaf = load_cert("dsc_fr.der");
        let err = ChainBuilder::new(&Failing).build(&leaf, 5).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Provider);
    }
}

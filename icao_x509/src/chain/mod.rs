// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Trust chain types.
//!
//! A [`TrustChain`] is ordered from the leaf (index 0) towards the root.
//! The leaf is borrowed from the caller; every issuer above it is owned by
//! the chain, so dropping the chain releases each fetched certificate
//! exactly once.

extern crate alloc;

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::certificate::Certificate;
use crate::error::ChainError;

/// Maximum number of characters of a certificate identity shown in a path.
const SHORT_IDENTITY_LEN: usize = 30;

/// Role of a node within a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// The certificate being validated
    Leaf,
    /// An intermediate CA certificate bridging two CSCAs
    LinkCertificate,
    /// The terminating CSCA, or the last node reached
    RootCsca,
}

/// One certificate in a trust chain.
#[derive(Debug, Clone)]
pub struct TrustChainNode<'a> {
    certificate: Cow<'a, Certificate>,
    role: NodeRole,
}

impl<'a> TrustChainNode<'a> {
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn is_self_signed(&self) -> bool {
        self.certificate.is_self_signed()
    }

    pub fn is_link_certificate(&self) -> bool {
        self.certificate.is_link_certificate()
    }
}

/// Short display identity: the CN truncated to 30 characters, or the start
/// of the subject DN when there is no CN.
pub fn short_identity(cert: &Certificate) -> String {
    match cert.subject().common_name() {
        Some(cn) => alloc::format!("CN={}", truncate(&cn)),
        None => truncate(cert.subject_dn()),
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(SHORT_IDENTITY_LEN).collect()
}

/// Result of chain construction.
#[derive(Debug, Clone)]
pub struct TrustChain<'a> {
    nodes: Vec<TrustChainNode<'a>>,
    valid: bool,
    failure: Option<ChainError>,
}

impl<'a> TrustChain<'a> {
    /// Starts a chain at `leaf`.
    pub(crate) fn start(leaf: &'a Certificate) -> Self {
        Self {
            nodes: alloc::vec![TrustChainNode {
                certificate: Cow::Borrowed(leaf),
                role: NodeRole::Leaf,
            }],
            valid: false,
            failure: None,
        }
    }

    /// Appends an issuer; the chain takes ownership of it.
    pub(crate) fn push(&mut self, cert: Certificate, role: NodeRole) {
        self.nodes.push(TrustChainNode {
            certificate: Cow::Owned(cert),
            role,
        });
    }

    pub(crate) fn complete(mut self) -> Self {
        self.valid = true;
        self.failure = None;
        self
    }

    pub(crate) fn fail(mut self, failure: ChainError) -> Self {
        self.valid = false;
        self.failure = Some(failure);
        self
    }

    /// The certificate most recently appended.
    pub(crate) fn last_certificate(&self) -> &Certificate {
        // A chain always holds at least its leaf.
        &self.nodes[self.nodes.len() - 1].certificate
    }

    /// True when the chain terminates at a self-signed certificate.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Why chain construction stopped, if it failed.
    pub fn failure(&self) -> Option<&ChainError> {
        self.failure.as_ref()
    }

    /// Diagnostic message; empty for a valid chain.
    pub fn message(&self) -> String {
        self.failure
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn nodes(&self) -> &[TrustChainNode<'a>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf(&self) -> &Certificate {
        &self.nodes[0].certificate
    }

    /// The terminating self-signed certificate of a valid chain.
    pub fn root(&self) -> Option<&Certificate> {
        if self.valid {
            self.nodes.last().map(|node| node.certificate())
        } else {
            None
        }
    }

    /// Issuer of the node at `index`: the next node, or the node itself
    /// when it is the last one.
    pub fn issuer_of(&self, index: usize) -> Option<&Certificate> {
        let node = self.nodes.get(index)?;
        Some(
            self.nodes
                .get(index + 1)
                .map_or(node.certificate(), |issuer| issuer.certificate()),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Certificate> {
        self.nodes.iter().map(|node| node.certificate())
    }

    /// Human readable path, e.g. `DSC → CN=Link DE → CN=Root DE`.
    pub fn path(&self) -> String {
        let mut path = String::from("DSC");
        for node in self.nodes.iter().skip(1) {
            path.push_str(" → ");
            path.push_str(&short_identity(node.certificate()));
        }
        path
    }
}

impl fmt::Display for TrustChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! ICAO Doc 9303 trust chain validation
//!
//! Validates Document Signer and CSCA certificates of the electronic
//! passport PKI: builds the chain from a certificate up to a self-signed
//! CSCA, possibly through link certificates, verifies every signature,
//! applies the Doc 9303 Part 12 hybrid validity model and checks the
//! issuer's CRL.
//!
//! # Features
//! - Parse X.509 v3 certificates and CRLs from DER/PEM
//! - Format independent DN comparison (`/C=FR/CN=X` equals `CN=X,C=FR`)
//! - Chain building through pluggable certificate and CRL providers
//! - Serializable validation verdicts and batch revalidation
//!
//! # Example
//! ```no_run
//! use icao_x509::prelude::*;
//!
//! # fn example(store: InMemoryTrustStore, dsc_der: &[u8]) -> icao_x509::Result<()> {
//! let service = ValidationService::new(store.clone(), store, ValidationConfig::default())?;
//! let result = service.validate_der(dsc_der, CertificateType::Dsc)?;
//! println!("{}", result.validation_status);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod certificate;
pub mod chain;
pub mod config;
pub mod crl;
pub mod crypto_backend;
pub mod dn;
pub mod error;
pub mod provider;
pub mod time;
pub mod validation;
pub mod x509;

pub use certificate::{Certificate, CertificateKind};
pub use chain::{NodeRole, TrustChain, TrustChainNode};
pub use config::ValidationConfig;
pub use crl::{Crl, RevocationReason, RevokedEntry};
pub use error::{ChainError, Error, ErrorKind, Result};
pub use provider::{
    CandidateCertificateProvider, CrlProvider, InMemoryTrustStore, PendingCertificate,
    RevalidationStore, RoundRobin,
};
#[cfg(feature = "std")]
pub use validation::{BatchSummary, CancellationToken};
pub use validation::{CertificateType, ValidationResult, ValidationService, ValidationStatus};
pub use x509::{ChainBuilder, ChainValidator, RevocationChecker};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::provider::{CandidateCertificateProvider, CrlProvider, InMemoryTrustStore};
    pub use crate::validation::{
        CertificateType, ValidationResult, ValidationService, ValidationStatus,
    };
    pub use crate::{Certificate, Crl, Error, Result, ValidationConfig};
}

// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Signature verification of certificates and CRLs under an issuer key.
//!
//! The signed bytes are always the ones retained at parse time, never a
//! re-encoding, so signatures made over non-canonical DER still verify.

extern crate alloc;

use alloc::string::ToString;
use const_oid::ObjectIdentifier;
use spki::AlgorithmIdentifier;

use super::oids;
use crate::certificate::{Certificate, SubjectPublicKeyInfo};
use crate::crl::Crl;
use crate::crypto_backend::{CryptoBackend, SignatureAlgorithm};
use crate::error::{Error, Result, SignatureError};

/// Curve OID of an EC public key; `None` for other key types.
fn curve_oid(spki: &SubjectPublicKeyInfo) -> Option<ObjectIdentifier> {
    // RSA parameters are NULL and must not be decoded as an OID.
    if spki.algorithm.oid != oids::ECPUBLICKEY {
        return None;
    }
    spki.algorithm
        .parameters
        .as_ref()
        .and_then(|p| p.decode_as::<ObjectIdentifier>().ok())
}

/// Verify `signature` over `tbs` with the key in `issuer_spki`.
pub fn verify_signed_data<B: CryptoBackend + ?Sized>(
    backend: &B,
    algorithm: &AlgorithmIdentifier<der::Any>,
    tbs: &[u8],
    signature: &[u8],
    issuer_spki: &SubjectPublicKeyInfo,
) -> Result<()> {
    let curve = curve_oid(issuer_spki);
    let sig_algo = SignatureAlgorithm::from_oid_with_params(
        &algorithm.oid,
        curve.as_ref(),
        algorithm.parameters.as_ref(),
    )
    .map_err(|e| {
        log::warn!("unsupported signature algorithm {}: {}", algorithm.oid, e);
        e
    })?;

    log::trace!(
        "verify_signed_data: {:?}, tbs {} bytes, signature {} bytes",
        sig_algo,
        tbs.len(),
        signature.len()
    );

    backend.verify_signature(
        sig_algo,
        tbs,
        signature,
        issuer_spki.subject_public_key.raw_bytes(),
    )
}

/// Verify that `cert` was signed by the key of `issuer`.
pub fn verify_certificate_signature<B: CryptoBackend + ?Sized>(
    backend: &B,
    cert: &Certificate,
    issuer: &Certificate,
) -> Result<()> {
    if cert.signature_algorithm.oid != cert.tbs_certificate.signature.oid {
        return Err(Error::SignatureError(SignatureError::AlgorithmMismatch {
            cert_algo: cert.signature_algorithm.oid.to_string(),
            tbs_algo: cert.tbs_certificate.signature.oid.to_string(),
        }));
    }

    verify_signed_data(
        backend,
        cert.signature_algorithm(),
        cert.tbs_bytes(),
        cert.signature_bytes(),
        issuer.subject_public_key_info(),
    )
}

/// Verify that `crl` was signed by the key of `issuer`.
pub fn verify_crl_signature<B: CryptoBackend + ?Sized>(
    backend: &B,
    crl: &Crl,
    issuer: &Certificate,
) -> Result<()> {
    let signed = crl
        .signed_part()
        .ok_or_else(|| Error::missing_field("CRL signature"))?;
    verify_signed_data(
        backend,
        &signed.algorithm,
        &signed.tbs,
        signed.signature.raw_bytes(),
        issuer.subject_public_key_info(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_backend::RingBackend;

    fn load(relative: &str) -> Vec<u8> {
        let path = format!("{}/../test_key/icao/{}", env!("CARGO_MANIFEST_DIR"), relative);
        std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {}", path, e))
    }

    fn load_cert(relative: &str) -> Certificate {
        Certificate::from_der(&load(relative)).unwrap()
    }

    #[test]
    fn test_dsc_signed_by_csca() {
        let csca = load_cert("csca_fr.der");
        let dsc = load_cert("dsc_fr.der");
        verify_certificate_signature(&RingBackend, &dsc, &csca).unwrap();
        verify_certificate_signature(&RingBackend, &csca, &csca).unwrap();
    }

    #[test]
    fn test_link_chain_signatures() {
        let root = load_cert("csca_de.der");
        let link = load_cert("link_de.der");
        let dsc = load_cert("dsc_de.der");
        verify_certificate_signature(&RingBackend, &dsc, &link).unwrap();
        verify_certificate_signature(&RingBackend, &link, &root).unwrap();
        assert!(verify_certificate_signature(&RingBackend, &dsc, &root).is_err());
    }

    #[test]
    fn test_substituted_root_fails() {
        let substituted = load_cert("csca_de_substituted.der");
        let link = load_cert("link_de.der");
        let err = verify_certificate_signature(&RingBackend, &link, &substituted).unwrap_err();
        assert!(matches!(
            err,
            Error::SignatureError(SignatureError::VerificationFailed)
        ));
    }

    #[test]
    fn test_crl_signature() {
        let csca = load_cert("csca_fr.der");
        let crl = Crl::from_der(&load("crl_fr.der")).unwrap();
        verify_crl_signature(&RingBackend, &crl, &csca).unwrap();

        let forged = Crl::from_der(&load("crl_fr_forged.der")).unwrap();
        assert!(verify_crl_signature(&RingBackend, &forged, &csca).is_err());
    }

    #[test]
    fn test_curve_oid_only_for_ec_keys() {
        let csca = load_cert("csca_fr.der");
        assert_eq!(
            curve_oid(csca.subject_public_key_info()),
            Some(oids::ECDSA_P256)
        );
    }
}

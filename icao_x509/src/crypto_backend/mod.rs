// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Cryptographic backend abstraction for signature verification.
//!
//! Chain validation, leaf verification and CRL verification all go through
//! [`CryptoBackend`], so a deployment can swap in a different provider
//! (an HSM bridge, a FIPS module) without touching the validation logic.
//! [`RingBackend`] is the default.

extern crate alloc;

use crate::error::{Error, Result};
use const_oid::ObjectIdentifier;

mod ring;
pub use self::ring::*;

/// Signature algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// ECDSA with P-256 curve and SHA-256
    EcdsaP256Sha256,
    /// ECDSA with P-256 curve and SHA-384
    EcdsaP256Sha384,
    /// ECDSA with P-384 curve and SHA-256
    EcdsaP384Sha256,
    /// ECDSA with P-384 curve and SHA-384
    EcdsaP384Sha384,
    /// RSA PKCS#1 v1.5 with SHA-1, still found on older CSCAs
    RsaPkcs1Sha1,
    /// RSA PKCS#1 v1.5 with SHA-256
    RsaPkcs1Sha256,
    /// RSA PKCS#1 v1.5 with SHA-384
    RsaPkcs1Sha384,
    /// RSA PKCS#1 v1.5 with SHA-512
    RsaPkcs1Sha512,
    /// RSA PSS with SHA-256
    RsaPssSha256,
    /// RSA PSS with SHA-384
    RsaPssSha384,
    /// RSA PSS with SHA-512
    RsaPssSha512,
    /// EdDSA Ed25519
    Ed25519,
}

const ECDSA_WITH_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
const ECDSA_WITH_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");
const RSA_WITH_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");
const RSA_WITH_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
const RSA_WITH_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
const RSA_WITH_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");
const RSA_PSS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.10");
const ED25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

const SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");

impl SignatureAlgorithm {
    /// Resolve a signature algorithm from the signature OID, the issuer's
    /// curve OID (ECDSA only) and the signature parameters (RSA-PSS only).
    pub fn from_oid_with_params(
        sig_oid: &ObjectIdentifier,
        curve_oid: Option<&ObjectIdentifier>,
        params: Option<&der::Any>,
    ) -> Result<Self> {
        match *sig_oid {
            ECDSA_WITH_SHA256 => match curve_oid {
                Some(&SECP256R1) => Ok(SignatureAlgorithm::EcdsaP256Sha256),
                Some(&SECP384R1) => Ok(SignatureAlgorithm::EcdsaP384Sha256),
                Some(oid) => Err(Error::unsupported_algorithm(alloc::format!(
                    "ECDSA-SHA256 with unsupported curve OID: {}",
                    oid
                ))),
                None => Err(Error::unsupported_algorithm(
                    "ECDSA-SHA256 requires a curve OID in the public key parameters",
                )),
            },
            ECDSA_WITH_SHA384 => match curve_oid {
                Some(&SECP256R1) => Ok(SignatureAlgorithm::EcdsaP256Sha384),
                Some(&SECP384R1) => Ok(SignatureAlgorithm::EcdsaP384Sha384),
                Some(oid) => Err(Error::unsupported_algorithm(alloc::format!(
                    "ECDSA-SHA384 with unsupported curve OID: {}",
                    oid
                ))),
                None => Err(Error::unsupported_algorithm(
                    "ECDSA-SHA384 requires a curve OID in the public key parameters",
                )),
            },
            RSA_WITH_SHA1 => Ok(SignatureAlgorithm::RsaPkcs1Sha1),
            RSA_WITH_SHA256 => Ok(SignatureAlgorithm::RsaPkcs1Sha256),
            RSA_WITH_SHA384 => Ok(SignatureAlgorithm::RsaPkcs1Sha384),
            RSA_WITH_SHA512 => Ok(SignatureAlgorithm::RsaPkcs1Sha512),
            RSA_PSS => Self::parse_rsa_pss_params(params),
            ED25519_OID => Ok(SignatureAlgorithm::Ed25519),
            _ => Err(Error::unsupported_algorithm(alloc::format!(
                "OID: {}",
                sig_oid
            ))),
        }
    }

    /// Parse RSASSA-PSS-params to determine the hash algorithm.
    ///
    /// ```asn1
    /// RSASSA-PSS-params ::= SEQUENCE {
    ///     hashAlgorithm     [0] HashAlgorithm DEFAULT sha1,
    ///     maskGenAlgorithm  [1] MaskGenAlgorithm DEFAULT mgf1SHA1,
    ///     saltLength        [2] INTEGER DEFAULT 20,
    ///     trailerField      [3] TrailerField DEFAULT trailerFieldBC
    /// }
    /// ```
    fn parse_rsa_pss_params(params: Option<&der::Any>) -> Result<Self> {
        use der::{Reader, SliceReader, TagMode, TagNumber};
        use spki::AlgorithmIdentifier;

        const SHA256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");
        const SHA384_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.2");
        const SHA512_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3");

        let params = params.ok_or_else(|| {
            Error::unsupported_algorithm("RSA-PSS without parameters (SHA-1 default)")
        })?;

        let mut reader = SliceReader::new(params.value())
            .map_err(|_| Error::unsupported_algorithm("Invalid RSA-PSS parameters encoding"))?;

        let hash_oid: Option<ObjectIdentifier> = reader
            .context_specific::<AlgorithmIdentifier<der::Any>>(TagNumber::N0, TagMode::Explicit)
            .ok()
            .flatten()
            .map(|ai| ai.oid);

        match hash_oid {
            Some(SHA256_OID) => Ok(SignatureAlgorithm::RsaPssSha256),
            Some(SHA384_OID) => Ok(SignatureAlgorithm::RsaPssSha384),
            Some(SHA512_OID) => Ok(SignatureAlgorithm::RsaPssSha512),
            Some(oid) => Err(Error::unsupported_algorithm(alloc::format!(
                "RSA-PSS with unsupported hash OID: {}",
                oid
            ))),
            None => Err(Error::unsupported_algorithm(
                "RSA-PSS without hashAlgorithm (SHA-1 default)",
            )),
        }
    }
}

/// Crypto backend trait for signature verification.
pub trait CryptoBackend {
    /// Verify `signature` over `tbs_data` with the raw subject public key bytes.
    fn verify_signature(
        &self,
        algorithm: SignatureAlgorithm,
        tbs_data: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<()>;
}

impl<B: CryptoBackend + ?Sized> CryptoBackend for &B {
    fn verify_signature(
        &self,
        algorithm: SignatureAlgorithm,
        tbs_data: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<()> {
        (**self).verify_signature(algorithm, tbs_data, signature, public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecdsa_curve_selection() {
        assert_eq!(
            SignatureAlgorithm::from_oid_with_params(&ECDSA_WITH_SHA256, Some(&SECP256R1), None)
                .unwrap(),
            SignatureAlgorithm::EcdsaP256Sha256
        );
        assert_eq!(
            SignatureAlgorithm::from_oid_with_params(&ECDSA_WITH_SHA384, Some(&SECP384R1), None)
                .unwrap(),
            SignatureAlgorithm::EcdsaP384Sha384
        );
    }

    #[test]
    fn test_ecdsa_brainpool_rejected() {
        // brainpoolP256r1 is common on CSCAs but not supported by the ring backend.
        let brainpool = ObjectIdentifier::new_unwrap("1.3.36.3.3.2.8.1.1.7");
        let err = SignatureAlgorithm::from_oid_with_params(
            &ECDSA_WITH_SHA256,
            Some(&brainpool),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("1.3.36.3.3.2.8.1.1.7"));
    }

    #[test]
    fn test_ecdsa_missing_curve_rejected() {
        assert!(SignatureAlgorithm::from_oid_with_params(&ECDSA_WITH_SHA256, None, None).is_err());
    }

    #[test]
    fn test_rsa_pkcs1() {
        let cases = [
            (RSA_WITH_SHA1, SignatureAlgorithm::RsaPkcs1Sha1),
            (RSA_WITH_SHA256, SignatureAlgorithm::RsaPkcs1Sha256),
            (RSA_WITH_SHA384, SignatureAlgorithm::RsaPkcs1Sha384),
            (RSA_WITH_SHA512, SignatureAlgorithm::RsaPkcs1Sha512),
        ];
        for (oid, expected) in cases {
            assert_eq!(
                SignatureAlgorithm::from_oid_with_params(&oid, None, None).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn test_rsa_pss_without_params_rejected() {
        assert!(SignatureAlgorithm::from_oid_with_params(&RSA_PSS, None, None).is_err());
    }

    #[test]
    fn test_unknown_oid() {
        let oid = ObjectIdentifier::new_unwrap("1.2.3.4");
        assert!(SignatureAlgorithm::from_oid_with_params(&oid, None, None).is_err());
    }
}

// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! X.509 v3 extensions used by ICAO PKI certificates and CRLs.
//!
//! - Basic Constraints: separates CSCA and Link certificates from DSCs
//! - Key Usage: `keyCertSign` marks a certificate able to sign other certificates
//! - Subject / Authority Key Identifier: disambiguates re-keyed CSCAs that
//!   share a subject DN
//! - CRL Reason Code: why a serial was revoked

extern crate alloc;

use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;

use const_oid::ObjectIdentifier;
use der::{
    asn1::{AnyRef, OctetStringRef},
    Decode, DecodeValue, FixedTag, Header, Reader, Sequence, Tag, TagNumber, Tagged,
};

pub use crate::certificate::{Extension, Extensions};
use crate::error::{Error, ExtensionError};

/// Basic Constraints - 2.5.29.19
pub const BASIC_CONSTRAINTS: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.19");

/// Key Usage - 2.5.29.15
pub const KEY_USAGE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.15");

/// Authority Key Identifier - 2.5.29.35
pub const AUTHORITY_KEY_IDENTIFIER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.35");

/// Subject Key Identifier - 2.5.29.14
pub const SUBJECT_KEY_IDENTIFIER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.14");

/// CRL Number - 2.5.29.20
pub const CRL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.20");

/// CRL entry Reason Code - 2.5.29.21
pub const CRL_REASON_CODE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.21");

// ============================================================================
// Basic Constraints - RFC 5280 Section 4.2.1.9
// ============================================================================

/// ```asn1
/// BasicConstraints ::= SEQUENCE {
///     cA                      BOOLEAN DEFAULT FALSE,
///     pathLenConstraint       INTEGER (0..MAX) OPTIONAL
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
pub struct BasicConstraints {
    #[asn1(default = "default_false")]
    pub ca: bool,

    #[asn1(optional = "true")]
    pub path_len_constraint: Option<u32>,
}

fn default_false() -> bool {
    false
}

impl BasicConstraints {
    pub fn from_extension(ext: &Extension) -> crate::error::Result<Self> {
        Self::from_der(ext.value())
            .map_err(|e| Error::extension(ExtensionError::BasicConstraints(e.to_string())))
    }
}

// ============================================================================
// Key Usage - RFC 5280 Section 4.2.1.3
// ============================================================================

/// Key Usage bit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage {
    bits: u16,
}

impl KeyUsage {
    // Bit 0 of the DER BIT STRING is the MSB of the first byte; the two raw
    // bytes are kept as a big-endian u16.
    pub const DIGITAL_SIGNATURE: u16 = 1 << 15;
    pub const NON_REPUDIATION: u16 = 1 << 14;
    pub const KEY_ENCIPHERMENT: u16 = 1 << 13;
    pub const DATA_ENCIPHERMENT: u16 = 1 << 12;
    pub const KEY_AGREEMENT: u16 = 1 << 11;
    pub const KEY_CERT_SIGN: u16 = 1 << 10;
    pub const CRL_SIGN: u16 = 1 << 9;

    pub fn new(bits: u16) -> Self {
        Self { bits }
    }

    /// Check if a usage bit is set.
    pub fn has(&self, usage: u16) -> bool {
        (self.bits & usage) != 0
    }

    /// Parse Key Usage from the DER BIT STRING carried by the extension.
    pub fn from_der(bytes: &[u8]) -> Result<Self, der::Error> {
        let bit_string = der::asn1::BitString::from_der(bytes)?;
        let raw_bytes = bit_string.raw_bytes();

        let bits = match raw_bytes.len() {
            0 => 0,
            1 => u16::from_be_bytes([raw_bytes[0], 0]),
            _ => u16::from_be_bytes([raw_bytes[0], raw_bytes[1]]),
        };

        Ok(Self { bits })
    }

    pub fn from_extension(ext: &Extension) -> crate::error::Result<Self> {
        Self::from_der(ext.value())
            .map_err(|e| Error::extension(ExtensionError::KeyUsage(e.to_string())))
    }
}

impl fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(u16, &str); 7] = [
            (KeyUsage::DIGITAL_SIGNATURE, "digitalSignature"),
            (KeyUsage::NON_REPUDIATION, "nonRepudiation"),
            (KeyUsage::KEY_ENCIPHERMENT, "keyEncipherment"),
            (KeyUsage::DATA_ENCIPHERMENT, "dataEncipherment"),
            (KeyUsage::KEY_AGREEMENT, "keyAgreement"),
            (KeyUsage::KEY_CERT_SIGN, "keyCertSign"),
            (KeyUsage::CRL_SIGN, "cRLSign"),
        ];
        let usages: Vec<&str> = NAMES
            .iter()
            .filter(|(bit, _)| self.has(*bit))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", usages.join(", "))
    }
}

// ============================================================================
// Key identifiers - RFC 5280 Sections 4.2.1.1 and 4.2.1.2
// ============================================================================

/// Parse the key identifier octets of a Subject Key Identifier extension.
pub fn subject_key_identifier(ext: &Extension) -> crate::error::Result<Vec<u8>> {
    OctetStringRef::from_der(ext.value())
        .map(|octets| octets.as_bytes().to_vec())
        .map_err(|e| Error::extension(ExtensionError::KeyIdentifier(e.to_string())))
}

/// ```asn1
/// AuthorityKeyIdentifier ::= SEQUENCE {
///     keyIdentifier             [0] KeyIdentifier           OPTIONAL,
///     authorityCertIssuer       [1] GeneralNames            OPTIONAL,
///     authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL
/// }
/// ```
///
/// Only the key identifier is retained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Option<Vec<u8>>,
}

impl<'a> DecodeValue<'a> for AuthorityKeyIdentifier {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let key_tag = Tag::ContextSpecific {
                constructed: false,
                number: TagNumber::N0,
            };
            let mut key_identifier = None;
            while !reader.is_finished() {
                let field = AnyRef::decode(reader)?;
                if field.tag() == key_tag {
                    key_identifier = Some(field.value().to_vec());
                }
            }
            Ok(Self { key_identifier })
        })
    }
}

impl FixedTag for AuthorityKeyIdentifier {
    const TAG: Tag = Tag::Sequence;
}

impl AuthorityKeyIdentifier {
    pub fn from_extension(ext: &Extension) -> crate::error::Result<Self> {
        Self::from_der(ext.value())
            .map_err(|e| Error::extension(ExtensionError::KeyIdentifier(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_constraints_ca() {
        // SEQUENCE { BOOLEAN TRUE, INTEGER 0 }
        let der = [0x30, 0x06, 0x01, 0x01, 0xFF, 0x02, 0x01, 0x00];
        let bc = BasicConstraints::from_der(&der).unwrap();
        assert!(bc.ca);
        assert_eq!(bc.path_len_constraint, Some(0));
    }

    #[test]
    fn test_basic_constraints_end_entity() {
        let bc = BasicConstraints::from_der(&[0x30, 0x00]).unwrap();
        assert!(!bc.ca);
        assert_eq!(bc.path_len_constraint, None);
    }

    #[test]
    fn test_key_usage_ca_bits() {
        // BIT STRING, 1 unused bit, keyCertSign | cRLSign
        let ku = KeyUsage::from_der(&[0x03, 0x02, 0x01, 0x06]).unwrap();
        assert!(ku.has(KeyUsage::KEY_CERT_SIGN));
        assert!(ku.has(KeyUsage::CRL_SIGN));
        assert!(!ku.has(KeyUsage::DIGITAL_SIGNATURE));
        assert_eq!(ku.to_string(), "keyCertSign, cRLSign");
    }

    #[test]
    fn test_key_usage_digital_signature() {
        let ku = KeyUsage::from_der(&[0x03, 0x02, 0x07, 0x80]).unwrap();
        assert!(ku.has(KeyUsage::DIGITAL_SIGNATURE));
        assert!(!ku.has(KeyUsage::KEY_CERT_SIGN));
    }

    #[test]
    fn test_authority_key_identifier() {
        // SEQUENCE { [0] 01 02 03 04 }
        let der = [0x30, 0x06, 0x80, 0x04, 0x01, 0x02, 0x03, 0x04];
        let aki = AuthorityKeyIdentifier::from_der(&der).unwrap();
        assert_eq!(aki.key_identifier, Some(vec![1, 2, 3, 4]));

        let empty = AuthorityKeyIdentifier::from_der(&[0x30, 0x00]).unwrap();
        assert_eq!(empty.key_identifier, None);
    }

    #[test]
    fn test_malformed_extension_values() {
        // NULL where a BIT STRING / SEQUENCE / OCTET STRING is expected
        let null = vec![0x05, 0x00];
        let ku = Extension::new(KEY_USAGE, true, null.clone()).unwrap();
        assert!(matches!(
            KeyUsage::from_extension(&ku),
            Err(Error::ExtensionError(ExtensionError::KeyUsage(_)))
        ));
        let bc = Extension::new(BASIC_CONSTRAINTS, true, null.clone()).unwrap();
        assert!(matches!(
            BasicConstraints::from_extension(&bc),
            Err(Error::ExtensionError(ExtensionError::BasicConstraints(_)))
        ));
        let ski = Extension::new(SUBJECT_KEY_IDENTIFIER, false, null.clone()).unwrap();
        assert!(matches!(
            subject_key_identifier(&ski),
            Err(Error::ExtensionError(ExtensionError::KeyIdentifier(_)))
        ));
        let aki = Extension::new(AUTHORITY_KEY_IDENTIFIER, false, null).unwrap();
        assert!(AuthorityKeyIdentifier::from_extension(&aki).is_err());
    }

    #[test]
    fn test_subject_key_identifier() {
        let ext = Extension::new(SUBJECT_KEY_IDENTIFIER, false, vec![0x04, 0x02, 0xAB, 0xCD])
            .unwrap();
        assert_eq!(subject_key_identifier(&ext).unwrap(), vec![0xAB, 0xCD]);
    }
}

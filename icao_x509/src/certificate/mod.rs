// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! X.509 v3 certificate structure and parsing.
//!
//! A [`Certificate`] is immutable once loaded. Besides the decoded RFC 5280
//! fields it keeps the exact DER it was parsed from, the exact bytes of the
//! signed `tbsCertificate`, and a few values derived once at load time:
//! the RFC 2253 subject and issuer DNs, the SHA-256 fingerprint, the
//! decoded Basic Constraints, Key Usage and key identifiers, and the
//! [`CertificateKind`]. A certificate whose Basic Constraints, Key Usage or
//! key identifier extension does not decode is rejected.
//!
//! # Examples
//!
//! ```no_run
//! use icao_x509::Certificate;
//!
//! # fn example(der_bytes: &[u8]) -> icao_x509::Result<()> {
//! let cert = Certificate::from_der(der_bytes)?;
//! println!("{} issued by {}", cert.subject_dn(), cert.issuer_dn());
//! println!("kind: {:?}, sha256: {}", cert.kind(), cert.fingerprint_sha256());
//! # Ok(())
//! # }
//! ```

pub mod name;

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use der::{
    asn1::{AnyRef, BitString, UintRef},
    Decode, DecodeValue, Encode, Header, Reader, Sequence, SliceReader, Tag, TagMode, TagNumber,
    Tagged,
};
use spki::AlgorithmIdentifier;

use crate::certificate::name::Name;
use crate::dn;
use crate::error::{EncodingError, Error, ParseError, Result};
use crate::time::Validity;
use crate::x509::extensions::{
    subject_key_identifier, AuthorityKeyIdentifier, BasicConstraints, KeyUsage,
    AUTHORITY_KEY_IDENTIFIER, BASIC_CONSTRAINTS, KEY_USAGE, SUBJECT_KEY_IDENTIFIER,
};

pub use spki::SubjectPublicKeyInfo as SpkiInfo;

/// SubjectPublicKeyInfo with owned parameters.
pub type SubjectPublicKeyInfo = SpkiInfo<der::Any, BitString>;

const PEM_LABEL: &str = "CERTIFICATE";

// ============================================================================
// Version - RFC 5280 Section 4.1.2.1
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Version {
    V1 = 0,
    V2 = 1,
    #[default]
    V3 = 2,
}

impl Version {
    fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Version::V1),
            1 => Some(Version::V2),
            2 => Some(Version::V3),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", *self as u8 + 1)
    }
}

// ============================================================================
// Extensions - RFC 5280 Section 4.1.2.9
// ============================================================================

/// ```asn1
/// Extension  ::=  SEQUENCE  {
///     extnID      OBJECT IDENTIFIER,
///     critical    BOOLEAN DEFAULT FALSE,
///     extnValue   OCTET STRING
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
pub struct Extension {
    pub extn_id: const_oid::ObjectIdentifier,

    #[asn1(default = "default_false")]
    pub critical: bool,

    pub extn_value: der::asn1::OctetString,
}

fn default_false() -> bool {
    false
}

impl Extension {
    pub fn new(
        extn_id: const_oid::ObjectIdentifier,
        critical: bool,
        extn_value: Vec<u8>,
    ) -> Result<Self> {
        Ok(Self {
            extn_id,
            critical,
            extn_value: der::asn1::OctetString::new(extn_value).map_err(Error::Asn1)?,
        })
    }

    /// Get the extension value bytes (DER-encoded).
    pub fn value(&self) -> &[u8] {
        self.extn_value.as_bytes()
    }
}

/// SEQUENCE OF Extension, shared by certificates, CRLs and CRL entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extensions {
    pub extensions: Vec<Extension>,
}

impl Extensions {
    pub fn iter(&self) -> core::slice::Iter<'_, Extension> {
        self.extensions.iter()
    }

    /// Find an extension by OID.
    pub fn find(&self, oid: &const_oid::ObjectIdentifier) -> Option<&Extension> {
        self.extensions.iter().find(|e| &e.extn_id == oid)
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }
}

impl<'a> DecodeValue<'a> for Extensions {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |seq_reader| {
            let mut extensions = Vec::new();
            while !seq_reader.is_finished() {
                extensions.push(Extension::decode(seq_reader)?);
            }
            Ok(Self { extensions })
        })
    }
}

impl der::FixedTag for Extensions {
    const TAG: Tag = Tag::Sequence;
}

// ============================================================================
// TBSCertificate - RFC 5280 Section 4.1
// ============================================================================

/// ```asn1
/// TBSCertificate  ::=  SEQUENCE  {
///     version         [0]  EXPLICIT Version DEFAULT v1,
///     serialNumber         CertificateSerialNumber,
///     signature            AlgorithmIdentifier,
///     issuer               Name,
///     validity             Validity,
///     subject              Name,
///     subjectPublicKeyInfo SubjectPublicKeyInfo,
///     issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
///     subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
///     extensions      [3]  EXPLICIT Extensions OPTIONAL
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TBSCertificate {
    pub version: Version,
    serial_number_bytes: Vec<u8>,
    pub signature: AlgorithmIdentifier<der::Any>,
    pub issuer: Name,
    pub validity: Validity,
    pub subject: Name,
    pub subject_public_key_info: SubjectPublicKeyInfo,
    pub extensions: Option<Extensions>,
}

impl TBSCertificate {
    /// Serial number as minimal big-endian two's-complement bytes.
    pub fn serial_number(&self) -> &[u8] {
        &self.serial_number_bytes
    }
}

impl<'a> DecodeValue<'a> for TBSCertificate {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let version = reader
                .context_specific::<UintRef<'a>>(TagNumber::N0, TagMode::Explicit)?
                .and_then(|v| match v.as_bytes() {
                    [value] => Version::from_value(*value),
                    _ => None,
                })
                .unwrap_or(Version::V1);

            let serial_number_bytes = decode_serial(reader)?;
            let signature = AlgorithmIdentifier::decode(reader)?;
            let issuer = Name::decode(reader)?;
            let validity = Validity::decode(reader)?;
            let subject = Name::decode(reader)?;
            let subject_public_key_info = SubjectPublicKeyInfo::decode(reader)?;

            // Unique identifiers are obsolete; they are consumed and dropped.
            let _issuer_unique_id =
                reader.context_specific::<BitString>(TagNumber::N1, TagMode::Implicit)?;
            let _subject_unique_id =
                reader.context_specific::<BitString>(TagNumber::N2, TagMode::Implicit)?;
            let extensions =
                reader.context_specific::<Extensions>(TagNumber::N3, TagMode::Explicit)?;

            Ok(Self {
                version,
                serial_number_bytes,
                signature,
                issuer,
                validity,
                subject,
                subject_public_key_info,
                extensions,
            })
        })
    }
}

impl der::FixedTag for TBSCertificate {
    const TAG: Tag = Tag::Sequence;
}

// ============================================================================
// Certificate kind
// ============================================================================

/// Role of a certificate in the ICAO PKI, derived once at load time.
///
/// - `Csca`: self-signed (normalized subject DN equals issuer DN)
/// - `LinkCertificate`: not self-signed, CA per Basic Constraints, and
///   carrying the `keyCertSign` Key Usage bit
/// - `Dsc`: everything else, typically a Document Signer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateKind {
    Csca,
    LinkCertificate,
    Dsc,
}

impl CertificateKind {
    fn classify(self_signed: bool, is_ca: bool, key_usage: Option<KeyUsage>) -> Self {
        if self_signed {
            CertificateKind::Csca
        } else if is_ca && key_usage.map_or(false, |ku| ku.has(KeyUsage::KEY_CERT_SIGN)) {
            CertificateKind::LinkCertificate
        } else {
            CertificateKind::Dsc
        }
    }
}

impl fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateKind::Csca => write!(f, "CSCA"),
            CertificateKind::LinkCertificate => write!(f, "Link"),
            CertificateKind::Dsc => write!(f, "DSC"),
        }
    }
}

// ============================================================================
// Certificate - RFC 5280 Section 4.1
// ============================================================================

/// X.509 Certificate.
///
/// ```asn1
/// Certificate  ::=  SEQUENCE  {
///     tbsCertificate       TBSCertificate,
///     signatureAlgorithm   AlgorithmIdentifier,
///     signatureValue       BIT STRING
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub tbs_certificate: TBSCertificate,
    pub signature_algorithm: AlgorithmIdentifier<der::Any>,
    pub signature_value: BitString,
    raw: Vec<u8>,
    tbs_raw: Vec<u8>,
    subject_dn: String,
    issuer_dn: String,
    fingerprint: String,
    basic_constraints: Option<BasicConstraints>,
    key_usage: Option<KeyUsage>,
    subject_key_id: Option<Vec<u8>>,
    authority_key_id: Option<Vec<u8>>,
    kind: CertificateKind,
}

fn find_extension<'a>(
    extensions: Option<&'a Extensions>,
    oid: &const_oid::ObjectIdentifier,
) -> Option<&'a Extension> {
    extensions.and_then(|exts| exts.find(oid))
}

/// Splits a signed structure (certificate or CRL) into its pieces, keeping
/// the signed portion byte-for-byte as it appeared in the input.
pub(crate) fn split_signed(
    bytes: &[u8],
) -> Result<(Vec<u8>, AlgorithmIdentifier<der::Any>, BitString)> {
    let mut reader = SliceReader::new(bytes).map_err(Error::Asn1)?;
    let header = Header::decode(&mut reader).map_err(Error::Asn1)?;
    header.tag.assert_eq(Tag::Sequence).map_err(Error::Asn1)?;
    let parts = reader
        .read_nested(header.length, |reader| {
            let tbs = AnyRef::decode(reader)?;
            tbs.tag().assert_eq(Tag::Sequence)?;
            let tbs_raw = tbs.to_der()?;
            let algorithm = AlgorithmIdentifier::decode(reader)?;
            let signature = BitString::decode(reader)?;
            Ok((tbs_raw, algorithm, signature))
        })
        .map_err(Error::Asn1)?;
    if !reader.is_finished() {
        return Err(Error::invalid_der("trailing data after signed structure"));
    }
    Ok(parts)
}

pub(crate) fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| alloc::format!("{:02x}", b)).collect()
}

pub(crate) fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| alloc::format!("{:02X}", b)).collect()
}

/// Drops redundant sign-extension bytes from a two's-complement integer.
pub(crate) fn canonical_serial(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while let [first, second, ..] = &bytes[start..] {
        let redundant = (*first == 0x00 && second & 0x80 == 0)
            || (*first == 0xFF && second & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    &bytes[start..]
}

/// Reads a CertificateSerialNumber as raw INTEGER content.
///
/// Deployed CSCAs issue negative and non-minimally encoded serials, which a
/// strict unsigned decode rejects; the content is kept as signed bytes and
/// reduced to its minimal form so lookups compare exactly.
pub(crate) fn decode_serial<'a, R: Reader<'a>>(reader: &mut R) -> der::Result<Vec<u8>> {
    let any = AnyRef::decode(reader)?;
    any.tag().assert_eq(Tag::Integer)?;
    if any.value().is_empty() {
        return Err(Tag::Integer.value_error());
    }
    Ok(canonical_serial(any.value()).to_vec())
}

fn trimmed_hex(bytes: &[u8]) -> String {
    let hex = hex_upper(bytes);
    match hex.trim_start_matches('0') {
        "" => "0".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Uppercase hex of a two's-complement serial, without leading zeros.
/// Negative serials are rendered as `-` followed by their magnitude.
pub(crate) fn serial_to_hex(serial: &[u8]) -> String {
    let serial = canonical_serial(serial);
    match serial.first() {
        Some(first) if first & 0x80 != 0 => {
            let mut magnitude: Vec<u8> = serial.iter().map(|b| !b).collect();
            for byte in magnitude.iter_mut().rev() {
                let (sum, carry) = byte.overflowing_add(1);
                *byte = sum;
                if !carry {
                    break;
                }
            }
            alloc::format!("-{}", trimmed_hex(&magnitude))
        }
        _ => trimmed_hex(serial),
    }
}

impl Certificate {
    /// Parse a Certificate from DER-encoded bytes.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let (tbs_raw, signature_algorithm, signature_value) = split_signed(bytes)?;
        let tbs_certificate = TBSCertificate::from_der(&tbs_raw).map_err(|e| {
            Error::ParseError(ParseError::MalformedCertificate(e.to_string()))
        })?;

        let extensions = tbs_certificate.extensions.as_ref();
        let basic_constraints = find_extension(extensions, &BASIC_CONSTRAINTS)
            .map(BasicConstraints::from_extension)
            .transpose()?;
        let key_usage = find_extension(extensions, &KEY_USAGE)
            .map(KeyUsage::from_extension)
            .transpose()?;
        let subject_key_id = find_extension(extensions, &SUBJECT_KEY_IDENTIFIER)
            .map(subject_key_identifier)
            .transpose()?;
        let authority_key_id = find_extension(extensions, &AUTHORITY_KEY_IDENTIFIER)
            .map(AuthorityKeyIdentifier::from_extension)
            .transpose()?
            .and_then(|aki| aki.key_identifier);

        let subject_dn = tbs_certificate.subject.to_rfc2253();
        let issuer_dn = tbs_certificate.issuer.to_rfc2253();
        let digest = ring::digest::digest(&ring::digest::SHA256, bytes);
        let self_signed = dn::equal(&subject_dn, &issuer_dn);
        let is_ca = basic_constraints.as_ref().map_or(false, |bc| bc.ca);

        Ok(Self {
            kind: CertificateKind::classify(self_signed, is_ca, key_usage),
            tbs_certificate,
            signature_algorithm,
            signature_value,
            raw: bytes.to_vec(),
            tbs_raw,
            subject_dn,
            issuer_dn,
            fingerprint: hex_lower(digest.as_ref()),
            basic_constraints,
            key_usage,
            subject_key_id,
            authority_key_id,
        })
    }

    /// Parse a Certificate from a PEM `CERTIFICATE` block.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let (label, der_bytes) = pem_rfc7468::decode_vec(pem.as_bytes())?;
        if label != PEM_LABEL {
            return Err(Error::EncodingError(EncodingError::InvalidPemLabel {
                expected: PEM_LABEL.to_string(),
                found: label.to_string(),
            }));
        }
        Self::from_der(&der_bytes)
    }

    /// Parse DER or PEM, deciding on the leading bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(b"-----BEGIN") {
            let pem = core::str::from_utf8(bytes)
                .map_err(|e| Error::EncodingError(EncodingError::InvalidPem(e.to_string())))?;
            Self::from_pem(pem)
        } else {
            Self::from_der(bytes)
        }
    }

    /// The DER bytes this certificate was parsed from.
    pub fn as_der(&self) -> &[u8] {
        &self.raw
    }

    /// Encode the certificate to PEM format.
    pub fn to_pem(&self) -> Result<String> {
        pem_rfc7468::encode_string(PEM_LABEL, pem_rfc7468::LineEnding::LF, &self.raw)
            .map_err(|e| Error::EncodingError(EncodingError::InvalidPem(e.to_string())))
    }

    /// The signed `tbsCertificate` bytes, exactly as encoded by the issuer.
    pub fn tbs_bytes(&self) -> &[u8] {
        &self.tbs_raw
    }

    pub fn signature_bytes(&self) -> &[u8] {
        self.signature_value.raw_bytes()
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier<der::Any> {
        &self.signature_algorithm
    }

    pub fn subject(&self) -> &Name {
        &self.tbs_certificate.subject
    }

    pub fn issuer(&self) -> &Name {
        &self.tbs_certificate.issuer
    }

    /// Subject DN in RFC 2253 form.
    pub fn subject_dn(&self) -> &str {
        &self.subject_dn
    }

    /// Issuer DN in RFC 2253 form.
    pub fn issuer_dn(&self) -> &str {
        &self.issuer_dn
    }

    pub fn serial_number(&self) -> &[u8] {
        self.tbs_certificate.serial_number()
    }

    /// Serial number as uppercase hex without leading zeros, `-` prefixed
    /// when negative.
    pub fn serial_hex(&self) -> String {
        serial_to_hex(self.serial_number())
    }

    pub fn validity(&self) -> &Validity {
        &self.tbs_certificate.validity
    }

    pub fn version(&self) -> Version {
        self.tbs_certificate.version
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.tbs_certificate.extensions.as_ref()
    }

    pub fn basic_constraints(&self) -> Option<&BasicConstraints> {
        self.basic_constraints.as_ref()
    }

    /// True when Basic Constraints marks the subject as a CA.
    pub fn is_ca(&self) -> bool {
        self.basic_constraints.as_ref().map_or(false, |bc| bc.ca)
    }

    pub fn key_usage(&self) -> Option<KeyUsage> {
        self.key_usage
    }

    pub fn subject_key_identifier(&self) -> Option<&[u8]> {
        self.subject_key_id.as_deref()
    }

    /// Key identifier of the Authority Key Identifier extension, if any.
    pub fn authority_key_identifier(&self) -> Option<&[u8]> {
        self.authority_key_id.as_deref()
    }

    pub fn subject_public_key_info(&self) -> &SubjectPublicKeyInfo {
        &self.tbs_certificate.subject_public_key_info
    }

    /// Lowercase hex SHA-256 over the full DER encoding.
    pub fn fingerprint_sha256(&self) -> &str {
        &self.fingerprint
    }

    pub fn kind(&self) -> CertificateKind {
        self.kind
    }

    /// Subject DN and issuer DN normalize to the same key.
    pub fn is_self_signed(&self) -> bool {
        self.kind == CertificateKind::Csca
    }

    pub fn is_link_certificate(&self) -> bool {
        self.kind == CertificateKind::LinkCertificate
    }

    /// Upper-cased country code of the issuer, if the issuer DN carries one.
    pub fn issuer_country(&self) -> Option<String> {
        self.issuer()
            .country()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Certificate ({}):", self.kind)?;
        writeln!(f, "  Version: {}", self.tbs_certificate.version)?;
        writeln!(f, "  Serial Number: {}", self.serial_hex())?;
        writeln!(f, "  Signature Algorithm: {}", self.signature_algorithm.oid)?;
        writeln!(f, "  Issuer: {}", self.issuer_dn)?;
        writeln!(f, "  Validity:")?;
        writeln!(f, "    Not Before: {}", self.validity().not_before)?;
        writeln!(f, "    Not After: {}", self.validity().not_after)?;
        writeln!(f, "  Subject: {}", self.subject_dn)?;
        write!(f, "  SHA-256: {}", self.fingerprint)
    }
}

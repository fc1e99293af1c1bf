// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! X.509 v2 Certificate Revocation Lists (RFC 5280 Section 5).
//!
//! ```asn1
//! CertificateList  ::=  SEQUENCE  {
//!     tbsCertList          TBSCertList,
//!     signatureAlgorithm   AlgorithmIdentifier,
//!     signatureValue       BIT STRING
//! }
//!
//! TBSCertList  ::=  SEQUENCE  {
//!     version                 Version OPTIONAL,
//!     signature               AlgorithmIdentifier,
//!     issuer                  Name,
//!     thisUpdate              Time,
//!     nextUpdate              Time OPTIONAL,
//!     revokedCertificates     SEQUENCE OF SEQUENCE  {
//!         userCertificate         CertificateSerialNumber,
//!         revocationDate          Time,
//!         crlEntryExtensions      Extensions OPTIONAL
//!     }  OPTIONAL,
//!     crlExtensions           [0] EXPLICIT Extensions OPTIONAL
//! }
//! ```

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use der::{
    asn1::{BitString, UintRef},
    Decode, DecodeValue, FixedTag, Header, Reader, Tag, TagMode, TagNumber,
};
use spki::AlgorithmIdentifier;

use crate::certificate::{
    canonical_serial, decode_serial, hex_upper, name::Name, serial_to_hex, split_signed,
    Extension, Extensions,
};
use crate::dn;
use crate::error::{Error, ParseError, Result};
use crate::time::Time;
use crate::x509::extensions::{CRL_NUMBER, CRL_REASON_CODE};

/// CRLReason (RFC 5280 Section 5.3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevocationReason {
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
}

impl RevocationReason {
    /// Maps an ENUMERATED reason code; unknown codes become `Unspecified`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => RevocationReason::KeyCompromise,
            2 => RevocationReason::CaCompromise,
            3 => RevocationReason::AffiliationChanged,
            4 => RevocationReason::Superseded,
            5 => RevocationReason::CessationOfOperation,
            6 => RevocationReason::CertificateHold,
            8 => RevocationReason::RemoveFromCrl,
            9 => RevocationReason::PrivilegeWithdrawn,
            10 => RevocationReason::AaCompromise,
            _ => RevocationReason::Unspecified,
        }
    }

    fn from_extension(ext: &Extension) -> Self {
        // ENUMERATED, one content byte
        match ext.value() {
            [0x0A, 0x01, code] => Self::from_code(*code),
            _ => RevocationReason::Unspecified,
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RevocationReason::Unspecified => "unspecified",
            RevocationReason::KeyCompromise => "keyCompromise",
            RevocationReason::CaCompromise => "cACompromise",
            RevocationReason::AffiliationChanged => "affiliationChanged",
            RevocationReason::Superseded => "superseded",
            RevocationReason::CessationOfOperation => "cessationOfOperation",
            RevocationReason::CertificateHold => "certificateHold",
            RevocationReason::RemoveFromCrl => "removeFromCRL",
            RevocationReason::PrivilegeWithdrawn => "privilegeWithdrawn",
            RevocationReason::AaCompromise => "aACompromise",
        };
        f.write_str(name)
    }
}

/// One revoked serial number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedEntry {
    serial: Vec<u8>,
    pub revocation_date: Time,
    pub reason: RevocationReason,
}

impl RevokedEntry {
    /// `serial` is big-endian two's-complement INTEGER content.
    pub fn new(serial: &[u8], revocation_date: Time, reason: RevocationReason) -> Self {
        Self {
            serial: canonical_serial(serial).to_vec(),
            revocation_date,
            reason,
        }
    }

    pub fn serial_number(&self) -> &[u8] {
        &self.serial
    }

    pub fn serial_hex(&self) -> String {
        serial_to_hex(&self.serial)
    }
}

impl<'a> DecodeValue<'a> for RevokedEntry {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let serial = decode_serial(reader)?;
            let revocation_date = Time::decode(reader)?;
            let reason = if reader.is_finished() {
                RevocationReason::Unspecified
            } else {
                Extensions::decode(reader)?
                    .find(&CRL_REASON_CODE)
                    .map_or(RevocationReason::Unspecified, RevocationReason::from_extension)
            };
            Ok(RevokedEntry::new(&serial, revocation_date, reason))
        })
    }
}

impl FixedTag for RevokedEntry {
    const TAG: Tag = Tag::Sequence;
}

struct TbsCertList {
    issuer: Name,
    this_update: Time,
    next_update: Option<Time>,
    entries: Vec<RevokedEntry>,
    extensions: Option<Extensions>,
}

impl<'a> DecodeValue<'a> for TbsCertList {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            if reader.peek_tag()? == Tag::Integer {
                let _version = u8::decode(reader)?;
            }
            let _signature = AlgorithmIdentifier::<der::Any>::decode(reader)?;
            let issuer = Name::decode(reader)?;
            let this_update = Time::decode(reader)?;

            let next_update = if !reader.is_finished()
                && matches!(reader.peek_tag()?, Tag::UtcTime | Tag::GeneralizedTime)
            {
                Some(Time::decode(reader)?)
            } else {
                None
            };

            let mut entries = Vec::new();
            if !reader.is_finished() && reader.peek_tag()? == Tag::Sequence {
                let list_header = Header::decode(reader)?;
                reader.read_nested(list_header.length, |list| {
                    while !list.is_finished() {
                        entries.push(RevokedEntry::decode(list)?);
                    }
                    Ok(())
                })?;
            }

            let extensions =
                reader.context_specific::<Extensions>(TagNumber::N0, TagMode::Explicit)?;

            Ok(Self {
                issuer,
                this_update,
                next_update,
                entries,
                extensions,
            })
        })
    }
}

impl FixedTag for TbsCertList {
    const TAG: Tag = Tag::Sequence;
}

/// The signed portion of a CRL parsed from DER.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCrl {
    /// `tbsCertList` bytes exactly as encoded by the issuer
    pub tbs: Vec<u8>,
    pub algorithm: AlgorithmIdentifier<der::Any>,
    pub signature: BitString,
}

/// A certificate revocation list, either parsed from DER or assembled by a
/// provider from its own storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crl {
    issuer_dn: String,
    issuer_country: Option<String>,
    this_update: Time,
    next_update: Option<Time>,
    entries: Vec<RevokedEntry>,
    crl_number: Option<Vec<u8>>,
    signed: Option<SignedCrl>,
}

impl Crl {
    /// Builds an unsigned CRL. No signature check is possible on it.
    pub fn new(
        issuer_dn: &str,
        this_update: Time,
        next_update: Option<Time>,
        entries: Vec<RevokedEntry>,
    ) -> Self {
        let country = dn::extract_attribute(issuer_dn, "C").to_uppercase();
        Self {
            issuer_dn: issuer_dn.to_string(),
            issuer_country: Some(country).filter(|c| !c.is_empty()),
            this_update,
            next_update,
            entries,
            crl_number: None,
            signed: None,
        }
    }

    /// Parse a DER-encoded CertificateList.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let (tbs, algorithm, signature) = split_signed(bytes)?;
        let tbs_list = TbsCertList::from_der(&tbs)
            .map_err(|e| Error::ParseError(ParseError::MalformedCrl(e.to_string())))?;

        let crl_number = tbs_list
            .extensions
            .as_ref()
            .and_then(|exts| exts.find(&CRL_NUMBER))
            .and_then(|ext| UintRef::from_der(ext.value()).ok())
            .map(|n| n.as_bytes().to_vec());

        Ok(Self {
            issuer_dn: tbs_list.issuer.to_rfc2253(),
            issuer_country: tbs_list
                .issuer
                .country()
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty()),
            this_update: tbs_list.this_update,
            next_update: tbs_list.next_update,
            entries: tbs_list.entries,
            crl_number,
            signed: Some(SignedCrl {
                tbs,
                algorithm,
                signature,
            }),
        })
    }

    /// Issuer DN in RFC 2253 form.
    pub fn issuer_dn(&self) -> &str {
        &self.issuer_dn
    }

    /// Upper-cased issuer country code, if any.
    pub fn issuer_country(&self) -> Option<&str> {
        self.issuer_country.as_deref()
    }

    pub fn this_update(&self) -> &Time {
        &self.this_update
    }

    pub fn next_update(&self) -> Option<&Time> {
        self.next_update.as_ref()
    }

    pub fn entries(&self) -> &[RevokedEntry] {
        &self.entries
    }

    /// CRL Number extension as uppercase hex.
    pub fn crl_number_hex(&self) -> Option<String> {
        self.crl_number.as_deref().map(hex_upper)
    }

    pub fn signed_part(&self) -> Option<&SignedCrl> {
        self.signed.as_ref()
    }

    /// A CRL is stale once `now` is past its nextUpdate. A CRL without
    /// nextUpdate never goes stale.
    pub fn is_stale_at(&self, now: &Time) -> bool {
        self.next_update.map_or(false, |next| now.is_after(&next))
    }

    /// Looks up a two's-complement serial number; redundant sign bytes are
    /// ignored.
    pub fn find_revoked(&self, serial: &[u8]) -> Option<&RevokedEntry> {
        let serial = canonical_serial(serial);
        self.entries.iter().find(|e| e.serial.as_slice() == serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_crl(relative: &str) -> Crl {
        let path = format!("{}/../test_key/icao/{}", env!("CARGO_MANIFEST_DIR"), relative);
        let der = std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {}", path, e));
        Crl::from_der(&der).unwrap_or_else(|e| panic!("parse {}: {}", path, e))
    }

    #[test]
    fn test_parse_crl() {
        let crl = load_crl("crl_fr.der");
        assert_eq!(crl.issuer_dn(), "CN=Root-FR,O=Gouv,C=FR");
        assert_eq!(crl.issuer_country(), Some("FR"));
        assert_eq!(crl.this_update(), &Time::from_ymd(2026, 1, 1).unwrap());
        assert_eq!(crl.next_update(), Some(&Time::from_ymd(2027, 1, 1).unwrap()));
        assert_eq!(crl.entries().len(), 3);
        assert_eq!(crl.crl_number_hex().as_deref(), Some("07"));
        assert!(crl.signed_part().is_some());
    }

    #[test]
    fn test_reason_codes() {
        let crl = load_crl("crl_fr.der");
        let reasons: Vec<(String, RevocationReason)> = crl
            .entries()
            .iter()
            .map(|e| (e.serial_hex(), e.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("2002".to_string(), RevocationReason::KeyCompromise),
                ("3003".to_string(), RevocationReason::Superseded),
                ("4004".to_string(), RevocationReason::Unspecified),
            ]
        );
    }

    #[test]
    fn test_find_revoked() {
        let crl = load_crl("crl_fr.der");
        let entry = crl.find_revoked(&[0x20, 0x02]).unwrap();
        assert_eq!(entry.reason, RevocationReason::KeyCompromise);
        assert_eq!(entry.revocation_date, Time::from_ymd(2025, 6, 1).unwrap());
        assert!(crl.find_revoked(&[0x00, 0x20, 0x02]).is_some());
        assert!(crl.find_revoked(&[0x10, 0x01]).is_none());
    }

    #[test]
    fn test_negative_and_padded_serials() {
        let crl = load_crl("crl_nl.der");
        let serials: Vec<String> = crl.entries().iter().map(RevokedEntry::serial_hex).collect();
        assert_eq!(serials, vec!["2002", "-FF", "-FEFE", "3003"]);

        let entry = crl.find_revoked(&[0xFF, 0x01, 0x02]).unwrap();
        assert_eq!(entry.reason, RevocationReason::CaCompromise);
        assert!(crl.find_revoked(&[0xFF, 0xFF, 0x01, 0x02]).is_some());
        assert!(crl.find_revoked(&[0x30, 0x03]).is_some());
        // the magnitude of a negative serial is a different serial
        assert!(crl.find_revoked(&[0x00, 0xFE, 0xFE]).is_none());
        assert!(crl.find_revoked(&[0xFF]).is_none());
    }

    #[test]
    fn test_staleness() {
        let now = Time::from_ymd(2026, 6, 1).unwrap();
        assert!(!load_crl("crl_fr.der").is_stale_at(&now));
        assert!(load_crl("crl_fr_stale.der").is_stale_at(&now));

        let unbounded = Crl::new("CN=Root-IT,C=IT", now, None, Vec::new());
        assert!(!unbounded.is_stale_at(&Time::from_ymd(2099, 1, 1).unwrap()));
    }

    #[test]
    fn test_in_memory_crl() {
        let now = Time::from_ymd(2026, 1, 1).unwrap();
        let crl = Crl::new(
            "/C=it/O=Stato/CN=Root-IT",
            now,
            None,
            vec![RevokedEntry::new(
                &[0x00, 0x21],
                now,
                RevocationReason::from_code(5),
            )],
        );
        assert_eq!(crl.issuer_country(), Some("IT"));
        assert!(crl.signed_part().is_none());
        let entry = crl.find_revoked(&[0x21]).unwrap();
        assert_eq!(entry.reason, RevocationReason::CessationOfOperation);
        assert_eq!(entry.reason.to_string(), "cessationOfOperation");
    }

    #[test]
    fn test_unknown_reason_code() {
        assert_eq!(RevocationReason::from_code(7), RevocationReason::Unspecified);
        assert_eq!(RevocationReason::from_code(42), RevocationReason::Unspecified);
    }
}

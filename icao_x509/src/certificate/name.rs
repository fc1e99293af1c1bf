// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Distinguished Name (DN) support for X.509 certificates and CRLs.
//!
//! Names are decoded from DER and rendered in RFC 2253 order (most specific
//! RDN first, comma separated), which is the string form handed to
//! certificate providers and to the [`crate::dn`] normalizer.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use const_oid::ObjectIdentifier;
use der::{
    asn1::SetOfVec, Decode, DecodeValue, Encode, EncodeValue, Error, ErrorKind, Header, Length,
    Reader, Sequence, Tag, ValueOrd, Writer,
};

/// Common Name (CN) - 2.5.4.3
pub const CN: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");

/// Surname (SN) - 2.5.4.4
pub const SURNAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.4");

/// Serial Number - 2.5.4.5
pub const SERIAL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");

/// Country (C) - 2.5.4.6
pub const COUNTRY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");

/// Locality (L) - 2.5.4.7
pub const LOCALITY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");

/// State or Province (ST) - 2.5.4.8
pub const STATE_OR_PROVINCE_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");

/// Organization (O) - 2.5.4.10
pub const ORGANIZATION_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");

/// Organizational Unit (OU) - 2.5.4.11
pub const ORGANIZATIONAL_UNIT_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");

/// Domain Component (DC) - 0.9.2342.19200300.100.1.25
pub const DOMAIN_COMPONENT: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.25");

/// Email Address - 1.2.840.113549.1.9.1
pub const EMAIL_ADDRESS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");

// Universal tag bytes of the DirectoryString choices. UniversalString (0x1C)
// has no `der::Tag` variant, so values are kept as raw TLV bytes.
const TAG_UTF8: u8 = 0x0C;
const TAG_PRINTABLE: u8 = 0x13;
const TAG_TELETEX: u8 = 0x14;
const TAG_IA5: u8 = 0x16;
const TAG_UNIVERSAL: u8 = 0x1C;
const TAG_BMP: u8 = 0x1E;

/// Decodes DirectoryString content into UTF-8.
fn directory_string_to_utf8(tag: u8, content: &[u8]) -> Result<String, Error> {
    match tag {
        TAG_UTF8 | TAG_PRINTABLE | TAG_IA5 => core::str::from_utf8(content)
            .map(ToString::to_string)
            .map_err(|_| {
                ErrorKind::Value {
                    tag: Tag::Utf8String,
                }
                .into()
            }),
        // T61 is treated as Latin-1, which is what issuers put there in practice.
        TAG_TELETEX => Ok(content.iter().map(|&b| b as char).collect()),
        TAG_BMP => {
            if content.len() % 2 != 0 {
                return Err(ErrorKind::Length {
                    tag: Tag::BmpString,
                }
                .into());
            }
            let units: Vec<u16> = content
                .chunks(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            String::from_utf16(&units).map_err(|_| {
                ErrorKind::Value {
                    tag: Tag::BmpString,
                }
                .into()
            })
        }
        TAG_UNIVERSAL => {
            if content.len() % 4 != 0 {
                return Err(ErrorKind::Length {
                    tag: Tag::TeletexString,
                }
                .into());
            }
            content
                .chunks(4)
                .map(|c| {
                    char::from_u32(u32::from_be_bytes([c[0], c[1], c[2], c[3]])).ok_or_else(
                        || {
                            ErrorKind::Value {
                                tag: Tag::TeletexString,
                            }
                            .into()
                        },
                    )
                })
                .collect()
        }
        other => Err(ErrorKind::TagUnexpected {
            expected: Some(Tag::Utf8String),
            actual: Tag::try_from(other).unwrap_or(Tag::Null),
        }
        .into()),
    }
}

/// Encodes a short TLV. Used when names are built in memory.
fn encode_tlv(tag: u8, content: &[u8]) -> Result<Vec<u8>, Error> {
    let len = Length::try_from(content.len())?;
    let mut out = Vec::with_capacity(content.len() + 4);
    out.push(tag);
    out.extend_from_slice(&len.to_der()?);
    out.extend_from_slice(content);
    Ok(out)
}

/// Single attribute of an RDN.
///
/// The value is kept as its raw DER TLV so that string types not
/// representable in [`der::Tag`] still decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    /// Attribute type (OID)
    pub oid: ObjectIdentifier,
    raw_value: Vec<u8>,
}

impl<'a> DecodeValue<'a> for AttributeTypeAndValue {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |nested| {
            let oid = ObjectIdentifier::decode(nested)?;
            let remaining = nested.remaining_len();
            let raw_value = nested.read_vec(remaining)?;
            if raw_value.is_empty() {
                return Err(ErrorKind::Length { tag: Tag::Sequence }.into());
            }
            Ok(Self { oid, raw_value })
        })
    }
}

impl EncodeValue for AttributeTypeAndValue {
    fn value_len(&self) -> der::Result<Length> {
        self.oid.encoded_len()? + Length::try_from(self.raw_value.len())?
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        self.oid.encode(writer)?;
        writer.write(&self.raw_value)
    }
}

impl Sequence<'_> for AttributeTypeAndValue {}

impl ValueOrd for AttributeTypeAndValue {
    fn value_cmp(&self, other: &Self) -> der::Result<core::cmp::Ordering> {
        match self.oid.cmp(&other.oid) {
            core::cmp::Ordering::Equal => Ok(self.raw_value.cmp(&other.raw_value)),
            other_order => Ok(other_order),
        }
    }
}

impl AttributeTypeAndValue {
    /// Builds an attribute with a UTF8String value.
    pub fn new_utf8(oid: ObjectIdentifier, value: &str) -> Result<Self, Error> {
        Ok(Self {
            oid,
            raw_value: encode_tlv(TAG_UTF8, value.as_bytes())?,
        })
    }

    /// Builds an attribute with a PrintableString value.
    pub fn new_printable(oid: ObjectIdentifier, value: &str) -> Result<Self, Error> {
        der::asn1::PrintableStringRef::new(value)?;
        Ok(Self {
            oid,
            raw_value: encode_tlv(TAG_PRINTABLE, value.as_bytes())?,
        })
    }

    fn value_content(&self) -> der::Result<&[u8]> {
        let mut reader = der::SliceReader::new(&self.raw_value)?;
        let _tag = reader.read_byte()?;
        let len = Length::decode(&mut reader)?;
        reader.read_slice(len)
    }

    /// Get the attribute value as a UTF-8 string.
    pub fn value_as_str(&self) -> Result<String, Error> {
        let tag = self.raw_value.first().copied().unwrap_or(0);
        directory_string_to_utf8(tag, self.value_content()?)
    }

    /// Short name of the attribute type, or `None` for unknown types.
    pub fn attr_name(&self) -> Option<&'static str> {
        match self.oid {
            CN => Some("CN"),
            SURNAME => Some("SN"),
            SERIAL_NUMBER => Some("SERIALNUMBER"),
            COUNTRY_NAME => Some("C"),
            LOCALITY_NAME => Some("L"),
            STATE_OR_PROVINCE_NAME => Some("ST"),
            ORGANIZATION_NAME => Some("O"),
            ORGANIZATIONAL_UNIT_NAME => Some("OU"),
            DOMAIN_COMPONENT => Some("DC"),
            EMAIL_ADDRESS => Some("emailAddress"),
            _ => None,
        }
    }
}

/// Escapes an attribute value for RFC 2253 output.
fn escape_rfc2253(value: &str, out: &mut String) {
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        let needs_escape = matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';')
            || (i == 0 && (c == '#' || c == ' '))
            || (i == last && c == ' ');
        if needs_escape {
            out.push('\\');
        }
        out.push(c);
    }
}

impl fmt::Display for AttributeTypeAndValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.attr_name() {
            Some(name) => write!(f, "{}=", name)?,
            None => write!(f, "{}=", self.oid)?,
        }
        match self.value_as_str() {
            Ok(value) => {
                let mut escaped = String::with_capacity(value.len());
                escape_rfc2253(&value, &mut escaped);
                f.write_str(&escaped)
            }
            // Undecodable values fall back to the hex form of their encoding.
            Err(_) => {
                f.write_str("#")?;
                self.raw_value
                    .iter()
                    .try_for_each(|b| write!(f, "{:02x}", b))
            }
        }
    }
}

/// RelativeDistinguishedName (RDN) is a SET OF AttributeTypeAndValue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeDistinguishedName {
    pub attributes: SetOfVec<AttributeTypeAndValue>,
}

impl RelativeDistinguishedName {
    /// Create a new RDN with a single attribute.
    pub fn new(attr: AttributeTypeAndValue) -> Result<Self, Error> {
        let mut attributes = SetOfVec::new();
        attributes
            .insert(attr)
            .map_err(|_| ErrorKind::Value { tag: Tag::Set })?;
        Ok(Self { attributes })
    }
}

impl<'a> DecodeValue<'a> for RelativeDistinguishedName {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        let attributes = SetOfVec::decode_value(reader, header)?;
        Ok(Self { attributes })
    }
}

impl der::FixedTag for RelativeDistinguishedName {
    const TAG: Tag = Tag::Set;
}

impl fmt::Display for RelativeDistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{}", attr)?;
        }
        Ok(())
    }
}

/// RDNSequence represents a Distinguished Name (DN).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RDNSequence {
    /// Sequence of RDNs, ordered from root to leaf as encoded
    pub rdns: Vec<RelativeDistinguishedName>,
}

impl<'a> DecodeValue<'a> for RDNSequence {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let mut rdns = Vec::new();
            while !reader.is_finished() {
                rdns.push(RelativeDistinguishedName::decode(reader)?);
            }
            Ok(Self { rdns })
        })
    }
}

impl der::FixedTag for RDNSequence {
    const TAG: Tag = Tag::Sequence;
}

impl RDNSequence {
    pub fn from_rdns(rdns: Vec<RelativeDistinguishedName>) -> Self {
        Self { rdns }
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Find the first attribute with the given OID.
    pub fn find_attr(&self, oid: ObjectIdentifier) -> Option<&AttributeTypeAndValue> {
        self.rdns
            .iter()
            .flat_map(|rdn| rdn.attributes.iter())
            .find(|attr| attr.oid == oid)
    }

    /// Get the Common Name (CN) if present.
    pub fn common_name(&self) -> Option<String> {
        self.find_attr(CN).and_then(|a| a.value_as_str().ok())
    }

    /// Get the Country (C) if present.
    pub fn country(&self) -> Option<String> {
        self.find_attr(COUNTRY_NAME)
            .and_then(|a| a.value_as_str().ok())
    }

    /// Renders the name in RFC 2253 form, e.g. `CN=Root-FR,O=Gouv,C=FR`.
    pub fn to_rfc2253(&self) -> String {
        let rdns: Vec<String> = self.rdns.iter().rev().map(|r| r.to_string()).collect();
        rdns.join(",")
    }
}

impl fmt::Display for RDNSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc2253())
    }
}

/// Type alias for Name (which is just RDNSequence in practice).
pub type Name = RDNSequence;

#[cfg(test)]
mod tests {
    use super::*;

    fn rdn(oid: ObjectIdentifier, value: &str) -> RelativeDistinguishedName {
        RelativeDistinguishedName::new(AttributeTypeAndValue::new_utf8(oid, value).unwrap())
            .unwrap()
    }

    #[test]
    fn test_attribute_value() {
        let attr = AttributeTypeAndValue::new_printable(COUNTRY_NAME, "FR").unwrap();
        assert_eq!(attr.value_as_str().unwrap(), "FR");
        assert_eq!(attr.attr_name(), Some("C"));
        assert_eq!(attr.to_string(), "C=FR");
    }

    #[test]
    fn test_rfc2253_order() {
        let name = Name::from_rdns(vec![
            rdn(COUNTRY_NAME, "FR"),
            rdn(ORGANIZATION_NAME, "Gouv"),
            rdn(CN, "Root-FR"),
        ]);
        assert_eq!(name.to_rfc2253(), "CN=Root-FR,O=Gouv,C=FR");
        assert_eq!(name.common_name().as_deref(), Some("Root-FR"));
        assert_eq!(name.country().as_deref(), Some("FR"));
    }

    #[test]
    fn test_rfc2253_escaping() {
        let name = Name::from_rdns(vec![rdn(COUNTRY_NAME, "DE"), rdn(CN, "Doe, John")]);
        assert_eq!(name.to_string(), "CN=Doe\\, John,C=DE");

        let name = Name::from_rdns(vec![rdn(CN, " #lead")]);
        assert_eq!(name.to_string(), "CN=\\ #lead");
    }

    #[test]
    fn test_unknown_oid_uses_dotted_form() {
        let oid = ObjectIdentifier::new_unwrap("2.5.4.97");
        let name = Name::from_rdns(vec![rdn(oid, "VATFR-123")]);
        assert_eq!(name.to_string(), "2.5.4.97=VATFR-123");
    }

    #[test]
    fn test_bmp_string() {
        let content = [0x00, b'D', 0x00, b'E'];
        assert_eq!(directory_string_to_utf8(TAG_BMP, &content).unwrap(), "DE");
        assert!(directory_string_to_utf8(TAG_BMP, &content[..3]).is_err());
    }

    #[test]
    fn test_undecodable_value_renders_as_hex() {
        let attr = AttributeTypeAndValue {
            oid: CN,
            raw_value: vec![0x0C, 0x01, 0xFF],
        };
        assert_eq!(attr.to_string(), "CN=#0c01ff");
    }

    #[test]
    fn test_teletex_latin1() {
        assert_eq!(
            directory_string_to_utf8(TAG_TELETEX, &[b'M', 0xFC, b'n']).unwrap(),
            "M\u{fc}n"
        );
    }

    #[test]
    fn test_decode_name() {
        // SEQUENCE { SET { SEQUENCE { OID 2.5.4.6, PrintableString "IT" } } }
        let der = [
            0x30, 0x0D, 0x31, 0x0B, 0x30, 0x09, 0x06, 0x03, 0x55, 0x04, 0x06, 0x13, 0x02, b'I',
            b'T',
        ];
        let name = Name::from_der(&der).unwrap();
        assert_eq!(name.to_string(), "C=IT");
        assert!(!name.is_empty());
    }
}

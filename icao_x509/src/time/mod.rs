// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Time handling for certificate and CRL validity checks.
//!
//! Both UTCTime and GeneralizedTime are accepted, as defined in RFC 5280.
//! UTCTime years 50-99 are interpreted as 1950-1999 and 00-49 as 2000-2049.
//!
//! Every time-dependent check in this crate has an `_at` variant taking the
//! reference instant explicitly; the plain variants use [`current_time`].

use core::cmp::Ordering;
use core::fmt;
use core::time::Duration;
use der::{
    asn1::{GeneralizedTime, UtcTime},
    Decode, DecodeValue, FixedTag, Header, Reader, Result, Tag,
};

/// A timestamp that can be either UTCTime or GeneralizedTime.
///
/// Equality and ordering compare the instant, not the encoding.
#[derive(Debug, Clone, Copy)]
pub enum Time {
    /// UTCTime format (YYMMDDHHMMSSZ)
    UtcTime(UtcTime),
    /// GeneralizedTime format (YYYYMMDDHHMMSSZ)
    GeneralizedTime(GeneralizedTime),
}

impl Time {
    /// Creates a time from seconds since the Unix epoch.
    pub fn from_unix_secs(secs: u64) -> Result<Self> {
        let gen = GeneralizedTime::from_unix_duration(Duration::from_secs(secs))?;
        Ok(Time::GeneralizedTime(gen))
    }

    /// Creates a time at midnight UTC of the given calendar day.
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self> {
        let dt = der::DateTime::new(year, month, day, 0, 0, 0)?;
        Ok(Time::GeneralizedTime(GeneralizedTime::from_date_time(dt)))
    }

    /// Returns the DateTime representation.
    pub fn to_date_time(&self) -> der::DateTime {
        match self {
            Time::UtcTime(utc) => utc.to_date_time(),
            Time::GeneralizedTime(gen) => gen.to_date_time(),
        }
    }

    /// Seconds since the Unix epoch.
    pub fn unix_secs(&self) -> u64 {
        self.to_date_time().unix_duration().as_secs()
    }

    /// Checks if this time is before another time.
    pub fn is_before(&self, other: &Time) -> bool {
        self.cmp(other) == Ordering::Less
    }

    /// Checks if this time is after another time.
    pub fn is_after(&self, other: &Time) -> bool {
        self.cmp(other) == Ordering::Greater
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        let self_dt = self.to_date_time();
        let other_dt = other.to_date_time();
        self_dt.unix_duration().cmp(&other_dt.unix_duration())
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = self.to_date_time();
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minutes(),
            dt.seconds()
        )
    }
}

impl<'a> DecodeValue<'a> for Time {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
        match header.tag {
            Tag::UtcTime => Ok(Time::UtcTime(UtcTime::decode_value(reader, header)?)),
            Tag::GeneralizedTime => Ok(Time::GeneralizedTime(GeneralizedTime::decode_value(
                reader, header,
            )?)),
            tag => Err(der::Error::from(der::ErrorKind::TagUnexpected {
                expected: Some(Tag::UtcTime),
                actual: tag,
            })),
        }
    }
}

impl<'a> Decode<'a> for Time {
    fn decode<R: Reader<'a>>(reader: &mut R) -> Result<Self> {
        let header = Header::decode(reader)?;
        Self::decode_value(reader, header)
    }
}

/// Position of an instant relative to a validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStatus {
    /// notBefore <= now <= notAfter
    Valid,
    /// now < notBefore
    NotYetValid,
    /// now > notAfter
    Expired,
}

/// Certificate validity period.
///
/// ```text
/// Validity ::= SEQUENCE {
///     notBefore      Time,
///     notAfter       Time
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity {
    /// The time before which the certificate is not valid.
    pub not_before: Time,
    /// The time after which the certificate is not valid.
    pub not_after: Time,
}

impl Validity {
    pub const fn new(not_before: Time, not_after: Time) -> Self {
        Validity {
            not_before,
            not_after,
        }
    }

    /// Classifies `check_time` against this window. Both bounds are inclusive.
    pub fn status_at(&self, check_time: &Time) -> TimeStatus {
        if check_time.is_before(&self.not_before) {
            TimeStatus::NotYetValid
        } else if check_time.is_after(&self.not_after) {
            TimeStatus::Expired
        } else {
            TimeStatus::Valid
        }
    }

    /// Checks if the certificate is valid at the given time.
    pub fn is_valid_at(&self, check_time: &Time) -> bool {
        self.status_at(check_time) == TimeStatus::Valid
    }

    /// Checks if the certificate has expired at the given time.
    pub fn is_expired_at(&self, check_time: &Time) -> bool {
        self.status_at(check_time) == TimeStatus::Expired
    }

    /// Checks if the validity period is well-formed.
    pub fn is_well_formed(&self) -> bool {
        !self.not_after.is_before(&self.not_before)
    }
}

impl<'a> DecodeValue<'a> for Validity {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
        reader.read_nested(header.length, |reader| {
            let not_before = Time::decode(reader)?;
            let not_after = Time::decode(reader)?;
            Ok(Validity {
                not_before,
                not_after,
            })
        })
    }
}

impl FixedTag for Validity {
    const TAG: Tag = Tag::Sequence;
}

/// Gets current time as X.509 Time.
pub fn current_time() -> Result<Time> {
    #[cfg(feature = "std")]
    {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|_| der::Error::from(der::ErrorKind::DateTime))?;
        Time::from_unix_secs(now.as_secs())
    }

    #[cfg(not(feature = "std"))]
    {
        Err(der::Error::from(der::ErrorKind::DateTime))
    }
}

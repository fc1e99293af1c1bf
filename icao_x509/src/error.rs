// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Error types for ICAO trust-chain validation.
//!
//! Parsing and cryptographic failures are reported through [`Error`]. Chain
//! building and validation diagnostics live in [`ChainError`], whose `Display`
//! output is the human readable message carried by a `TrustChain` and by a
//! `ValidationResult`. [`ErrorKind`] folds every error into the small taxonomy
//! the orchestrator uses to pick a validation status.

extern crate alloc;

use alloc::string::{String, ToString};
use core::fmt;

/// Result type alias for trust-chain operations
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for certificate parsing, chain building and validation.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Errors during DER/ASN.1 parsing
    ParseError(ParseError),

    /// Errors during DER/ASN.1 parsing (from der crate)
    Asn1(der::Error),

    /// Errors related to cryptographic signature verification
    SignatureError(SignatureError),

    /// Errors related to time validation
    TimeError(TimeError),

    /// Unsupported or invalid cryptographic algorithms
    AlgorithmError(AlgorithmError),

    /// Certificate extension errors
    ExtensionError(ExtensionError),

    /// Chain building and chain validation failures
    ChainError(ChainError),

    /// CRL lookup or CRL integrity failures
    CrlError(CrlError),

    /// Certificate encoding errors (PEM/DER conversion)
    EncodingError(EncodingError),

    /// Invalid engine configuration
    ConfigError(String),

    /// A certificate or CRL provider failed to answer a query
    ProviderError(String),

    /// Internal error (should not occur in normal operation)
    InternalError(String),
}

/// Coarse classification of an [`Error`].
///
/// Every error raised while validating a certificate maps to exactly one
/// kind; the orchestrator turns the kind into a validation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or unparseable input certificate
    Input,
    /// Issuer DN unresolvable or no matching issuer candidate
    Lookup,
    /// A normalized issuer DN repeated during the chain walk
    Cycle,
    /// No root reached within the configured depth
    DepthExceeded,
    /// Cryptographic verification failed somewhere in the chain
    SignatureVerification,
    /// Expiration treated as a hard failure (hybrid model disabled)
    TimeValidity,
    /// CRL unavailable or unusable
    CrlLookup,
    /// Invalid configuration supplied by the caller
    Config,
    /// A provider failed with a low-level fault
    Provider,
    /// Internal error
    Internal,
}

/// Errors that occur during DER/ASN.1 parsing
#[derive(Debug, Clone)]
pub enum ParseError {
    /// Invalid DER encoding
    InvalidDer(String),

    /// Missing required field
    MissingField(String),

    /// Malformed certificate structure
    MalformedCertificate(String),

    /// Malformed CRL structure
    MalformedCrl(String),

    /// Error from der crate
    DerError(String),
}

/// Errors related to cryptographic signature verification
#[derive(Debug, Clone)]
pub enum SignatureError {
    /// Signature verification failed
    VerificationFailed,

    /// Signature algorithm mismatch between outer and signed structure
    AlgorithmMismatch { cert_algo: String, tbs_algo: String },

}

/// Errors related to time validation
#[derive(Debug, Clone)]
pub enum TimeError {
    /// The current time could not be determined
    InvalidTime,
}

/// Errors related to cryptographic algorithms
#[derive(Debug, Clone)]
pub enum AlgorithmError {
    /// Algorithm not supported
    Unsupported(String),
}

/// A recognised certificate extension whose value does not decode
#[derive(Debug, Clone)]
pub enum ExtensionError {
    /// Basic Constraints extension errors
    BasicConstraints(String),

    /// Key Usage extension errors
    KeyUsage(String),

    /// Key identifier extension errors
    KeyIdentifier(String),
}

/// Chain building and chain validation failures.
///
/// The `Display` text of each variant is the diagnostic message reported to
/// callers, so it is kept short and stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The issuer DN of the certificate at `depth` is empty
    IssuerDnMissing { depth: usize },

    /// The provider returned no candidate for the leaf's issuer
    NoCscaFound(String),

    /// No candidate matched the issuer DN needed at `depth`
    ChainBroken { depth: usize },

    /// The issuer DN needed at `depth` was already visited
    CircularReference { depth: usize },

    /// No self-signed root was reached within `max_depth` hops
    DepthExceeded { max_depth: usize },

    /// The certificate at `depth` does not verify under its issuer's key
    SignatureFailed { depth: usize },

    /// The certificate at `depth` has expired and expiry is a hard failure
    Expired { depth: usize },

    /// The certificate at `depth` is not yet valid and this is a hard failure
    NotYetValid { depth: usize },
}

/// CRL lookup and CRL integrity failures
#[derive(Debug, Clone)]
pub enum CrlError {
    /// No CRL is available for the given key
    Unavailable(String),

    /// The CRL signature does not verify under its issuer's key
    SignatureInvalid,
}

/// Errors related to certificate encoding
#[derive(Debug, Clone)]
pub enum EncodingError {
    /// Invalid PEM format
    InvalidPem(String),

    /// PEM label mismatch
    InvalidPemLabel { expected: String, found: String },
}

// ============================================================================
// Error Display Implementation (works in both std and no_std)
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ParseError(e) => write!(f, "Parse error: {}", e),
            Error::Asn1(e) => write!(f, "ASN.1 error: {}", e),
            Error::SignatureError(e) => write!(f, "Signature error: {}", e),
            Error::TimeError(e) => write!(f, "Time validation error: {}", e),
            Error::AlgorithmError(e) => write!(f, "Algorithm error: {}", e),
            Error::ExtensionError(e) => write!(f, "Extension error: {}", e),
            Error::ChainError(e) => write!(f, "Chain validation error: {}", e),
            Error::CrlError(e) => write!(f, "CRL error: {}", e),
            Error::EncodingError(e) => write!(f, "Encoding error: {}", e),
            Error::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Error::ProviderError(msg) => write!(f, "Provider error: {}", msg),
            Error::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidDer(msg) => write!(f, "Invalid DER encoding: {}", msg),
            ParseError::MissingField(field) => write!(f, "Missing required field: {}", field),
            ParseError::MalformedCertificate(msg) => write!(f, "Malformed certificate: {}", msg),
            ParseError::MalformedCrl(msg) => write!(f, "Malformed CRL: {}", msg),
            ParseError::DerError(msg) => write!(f, "DER error: {}", msg),
        }
    }
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureError::VerificationFailed => write!(f, "Signature verification failed"),
            SignatureError::AlgorithmMismatch {
                cert_algo,
                tbs_algo,
            } => {
                write!(
                    f,
                    "Signature algorithm mismatch: outer={}, signed={}",
                    cert_algo, tbs_algo
                )
            }
        }
    }
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeError::InvalidTime => write!(f, "Invalid time"),
        }
    }
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmError::Unsupported(algo) => write!(f, "Unsupported algorithm: {}", algo),
        }
    }
}

impl fmt::Display for ExtensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionError::BasicConstraints(msg) => {
                write!(f, "Basic Constraints error: {}", msg)
            }
            ExtensionError::KeyUsage(msg) => write!(f, "Key Usage error: {}", msg),
            ExtensionError::KeyIdentifier(msg) => write!(f, "Key identifier error: {}", msg),
        }
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::IssuerDnMissing { depth: 0 } => write!(f, "cannot extract issuer DN"),
            ChainError::IssuerDnMissing { depth } => {
                write!(f, "cannot extract issuer DN at depth {}", depth)
            }
            ChainError::NoCscaFound(issuer) => write!(f, "no CSCA found for issuer {}", issuer),
            ChainError::ChainBroken { depth } => write!(f, "chain broken at depth {}", depth),
            ChainError::CircularReference { depth } => {
                write!(f, "circular reference at depth {}", depth)
            }
            ChainError::DepthExceeded { max_depth } => {
                write!(f, "maximum chain depth {} exceeded", max_depth)
            }
            ChainError::SignatureFailed { depth } => {
                write!(f, "signature verification failed at depth {}", depth)
            }
            ChainError::Expired { depth } => write!(f, "certificate expired at depth {}", depth),
            ChainError::NotYetValid { depth } => {
                write!(f, "certificate not yet valid at depth {}", depth)
            }
        }
    }
}

impl fmt::Display for CrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrlError::Unavailable(key) => write!(f, "no CRL available for {}", key),
            CrlError::SignatureInvalid => write!(f, "CRL signature verification failed"),
        }
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::InvalidPem(msg) => write!(f, "Invalid PEM: {}", msg),
            EncodingError::InvalidPemLabel { expected, found } => {
                write!(
                    f,
                    "Invalid PEM label: expected '{}', found '{}'",
                    expected, found
                )
            }
        }
    }
}

// ============================================================================
// std::error::Error implementation (when std feature is enabled)
// ============================================================================

#[cfg(feature = "std")]
impl std::error::Error for Error {}

// ============================================================================
// Conversions from external crate errors
// ============================================================================

/// Convert from der crate errors
impl From<der::Error> for Error {
    fn from(err: der::Error) -> Self {
        Error::ParseError(ParseError::DerError(err.to_string()))
    }
}

/// Convert from PEM decoding errors
impl From<pem_rfc7468::Error> for Error {
    fn from(err: pem_rfc7468::Error) -> Self {
        Error::EncodingError(EncodingError::InvalidPem(err.to_string()))
    }
}

impl From<ChainError> for Error {
    fn from(err: ChainError) -> Self {
        Error::ChainError(err)
    }
}

// ============================================================================
// Classification and helper constructors
// ============================================================================

impl ChainError {
    /// Classify this chain failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChainError::IssuerDnMissing { .. }
            | ChainError::NoCscaFound(_)
            | ChainError::ChainBroken { .. } => ErrorKind::Lookup,
            ChainError::CircularReference { .. } => ErrorKind::Cycle,
            ChainError::DepthExceeded { .. } => ErrorKind::DepthExceeded,
            ChainError::SignatureFailed { .. } => ErrorKind::SignatureVerification,
            ChainError::Expired { .. } | ChainError::NotYetValid { .. } => {
                ErrorKind::TimeValidity
            }
        }
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ParseError(_)
            | Error::Asn1(_)
            | Error::EncodingError(_)
            | Error::ExtensionError(_) => ErrorKind::Input,
            Error::SignatureError(_) | Error::AlgorithmError(_) => ErrorKind::SignatureVerification,
            Error::TimeError(_) => ErrorKind::TimeValidity,
            Error::ChainError(e) => e.kind(),
            Error::CrlError(_) => ErrorKind::CrlLookup,
            Error::ConfigError(_) => ErrorKind::Config,
            Error::ProviderError(_) => ErrorKind::Provider,
            Error::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Create a parse error for invalid DER
    pub fn invalid_der<S: Into<String>>(msg: S) -> Self {
        Error::ParseError(ParseError::InvalidDer(msg.into()))
    }

    /// Create a signature verification failure
    pub fn signature_failed() -> Self {
        Error::SignatureError(SignatureError::VerificationFailed)
    }

    /// Create an unsupported algorithm error
    pub fn unsupported_algorithm<S: Into<String>>(algo: S) -> Self {
        Error::AlgorithmError(AlgorithmError::Unsupported(algo.into()))
    }

    /// Create an extension decoding error
    pub fn extension(err: ExtensionError) -> Self {
        Error::ExtensionError(err)
    }

    /// Create a missing field error
    pub fn missing_field<S: Into<String>>(field: S) -> Self {
        Error::ParseError(ParseError::MissingField(field.into()))
    }

    /// Create a "no CSCA found" lookup error
    pub fn no_csca_found<S: Into<String>>(issuer: S) -> Self {
        Error::ChainError(ChainError::NoCscaFound(issuer.into()))
    }

    /// Create a provider fault
    pub fn provider<S: Into<String>>(msg: S) -> Self {
        Error::ProviderError(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    /// Create an internal error (should be rare)
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::InternalError(msg.into())
    }
}

// ============================================================================
// Tests
// ============================================================================

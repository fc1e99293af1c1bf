// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Engine configuration.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default number of issuer hops the chain builder may take.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Options for trust chain validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationConfig {
    /// Maximum number of issuer hops above the leaf
    pub max_depth: usize,

    /// ICAO Doc 9303 Part 12 hybrid model: expiry is reported, not fatal
    pub hybrid_validity: bool,

    /// Verify the CRL signature when its issuer is part of the chain
    pub verify_crl_signature: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            hybrid_validity: true,
            verify_crl_signature: true,
        }
    }
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum chain depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Treat expiry anywhere in the chain as a hard failure
    pub fn strict_validity(mut self) -> Self {
        self.hybrid_validity = false;
        self
    }

    /// Use CRLs without checking their signature
    pub fn skip_crl_signature(mut self) -> Self {
        self.verify_crl_signature = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::config("max_depth must be at least 1"));
        }
        Ok(())
    }

    /// Defaults overridden by `ICAO_X509_MAX_DEPTH`,
    /// `ICAO_X509_HYBRID_VALIDITY` and `ICAO_X509_VERIFY_CRL_SIGNATURE`.
    #[cfg(feature = "std")]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(feature = "std")]
    fn from_lookup(lookup: impl Fn(&str) -> Option<std::string::String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = lookup("ICAO_X509_MAX_DEPTH") {
            config.max_depth = v
                .trim()
                .parse()
                .map_err(|_| Error::config(alloc::format!("invalid ICAO_X509_MAX_DEPTH: {}", v)))?;
        }
        if let Some(v) = lookup("ICAO_X509_HYBRID_VALIDITY") {
            config.hybrid_validity = v != "false" && v != "0";
        }
        if let Some(v) = lookup("ICAO_X509_VERIFY_CRL_SIGNATURE") {
            config.verify_crl_signature = v != "false" && v != "0";
        }
        config.validate()?;
        Ok(config)
    }
}

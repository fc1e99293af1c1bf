// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! X.509 extensions, signature verification and the trust chain engine:
//! chain building, chain validation and revocation checking.

pub mod builder;
pub mod extensions;
pub mod oids;
pub mod revocation;
pub mod signature;
pub mod validator;

pub use builder::ChainBuilder;
pub use extensions::*;
pub use revocation::{crl_key, RevocationChecker, RevocationStatus};
pub use signature::{verify_certificate_signature, verify_crl_signature, verify_signed_data};
pub use validator::{ChainValidation, ChainValidator};

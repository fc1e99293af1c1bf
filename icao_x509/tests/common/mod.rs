// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

#![allow(dead_code)]

use icao_x509::time::Time;
use icao_x509::{Certificate, Crl, InMemoryTrustStore};

/// Reference instant for every test: 2026-06-01T00:00:00Z.
pub const NOW_UNIX_SECS: u64 = 1_780_272_000;

pub fn now() -> Time {
    Time::from_unix_secs(NOW_UNIX_SECS).unwrap()
}

pub fn setup_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_key_path(relative: &str) -> String {
    format!("{}/../test_key/icao/{}", env!("CARGO_MANIFEST_DIR"), relative)
}

pub fn load(relative: &str) -> Vec<u8> {
    let path = test_key_path(relative);
    std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {}", path, e))
}

pub fn cert(relative: &str) -> Certificate {
    Certificate::from_der(&load(relative)).unwrap()
}

pub fn crl(relative: &str) -> Crl {
    Crl::from_der(&load(relative)).unwrap()
}

/// Store holding `certs` and `crls`, in that order.
pub fn store(certs: &[&str], crls: &[&str]) -> InMemoryTrustStore {
    let store = certs
        .iter()
        .fold(InMemoryTrustStore::new(), |s, f| s.with_certificate(cert(f)));
    crls.iter().fold(store, |s, f| s.with_crl(crl(f)))
}

/// The full fixture set with the genuine German root.
pub fn full_store() -> InMemoryTrustStore {
    store(
        &[
            "csca_fr.der",
            "csca_de.der",
            "link_de.der",
            "csca_it_expired.der",
            "cycle_x.der",
            "cycle_y.der",
        ],
        &["crl_fr.der"],
    )
}

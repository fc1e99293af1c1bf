// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

mod common;

use std::sync::Mutex;

use common::{full_store, load, now, setup_logger};
use icao_x509::prelude::*;
use icao_x509::{BatchSummary, CancellationToken, PendingCertificate, RevalidationStore};

struct MemoryStore {
    items: Vec<PendingCertificate>,
    failing_id: Option<&'static str>,
    cancel_after_store: Option<CancellationToken>,
    stored: Mutex<Vec<(String, ValidationStatus)>>,
}

impl MemoryStore {
    fn new(items: Vec<PendingCertificate>) -> Self {
        Self {
            items,
            failing_id: None,
            cancel_after_store: None,
            stored: Mutex::new(Vec::new()),
        }
    }
}

impl RevalidationStore for MemoryStore {
    fn pending_dsc(&self, limit: usize) -> icao_x509::Result<Vec<PendingCertificate>> {
        Ok(self.items.iter().take(limit).cloned().collect())
    }

    fn store_result(&self, id: &str, result: &ValidationResult) -> icao_x509::Result<()> {
        if self.failing_id == Some(id) {
            return Err(Error::provider("write conflict"));
        }
        self.stored
            .lock()
            .unwrap()
            .push((id.to_string(), result.validation_status));
        if let Some(token) = &self.cancel_after_store {
            token.cancel();
        }
        Ok(())
    }
}

fn item(id: &str, der: Vec<u8>) -> PendingCertificate {
    PendingCertificate {
        id: id.to_string(),
        cert_type: CertificateType::Dsc,
        der,
    }
}

fn items() -> Vec<PendingCertificate> {
    vec![
        item("fr", load("dsc_fr.der")),
        item("fr-old", load("dsc_fr_expired.der")),
        item("orphan", load("dsc_orphan.der")),
        item("garbage", b"\x30\x03\x02\x01".to_vec()),
        item("de", load("dsc_de.der")),
    ]
}

fn service() -> ValidationService<InMemoryTrustStore, InMemoryTrustStore> {
    ValidationService::new(full_store(), full_store(), ValidationConfig::default()).unwrap()
}

#[test]
fn test_batch_tallies_and_continues_past_failures() {
    setup_logger();
    let mut store = MemoryStore::new(items());
    store.failing_id = Some("de");

    let summary = service()
        .revalidate_dsc_certificates_at(&store, 100, &now(), None)
        .unwrap();
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.valid, 1);
    assert_eq!(summary.expired_valid, 1);
    assert_eq!(summary.invalid, 1);
    assert_eq!(summary.pending, 0);
    assert_eq!(summary.error, 2);
    assert!(!summary.cancelled);

    let stored = store.stored.lock().unwrap();
    assert_eq!(
        *stored,
        vec![
            ("fr".to_string(), ValidationStatus::Valid),
            ("fr-old".to_string(), ValidationStatus::ExpiredValid),
            ("orphan".to_string(), ValidationStatus::Invalid),
            ("garbage".to_string(), ValidationStatus::Error),
        ]
    );
}

#[test]
fn test_batch_respects_limit() {
    setup_logger();
    let store = MemoryStore::new(items());
    let summary = service()
        .revalidate_dsc_certificates_at(&store, 2, &now(), None)
        .unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.valid + summary.expired_valid, 2);
}

#[test]
fn test_batch_cancellation_between_items() {
    setup_logger();
    let token = CancellationToken::new();
    let mut store = MemoryStore::new(items());
    store.cancel_after_store = Some(token.clone());

    let summary = service()
        .revalidate_dsc_certificates_at(&store, 100, &now(), Some(&token))
        .unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.processed, 1);
    assert_eq!(store.stored.lock().unwrap().len(), 1);

    let summary = service()
        .revalidate_dsc_certificates_at(&store, 100, &now(), Some(&token))
        .unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.processed, 0);
}

struct BrokenStore;

impl RevalidationStore for BrokenStore {
    fn pending_dsc(&self, _limit: usize) -> icao_x509::Result<Vec<PendingCertificate>> {
        Err(Error::provider("database offline"))
    }

    fn store_result(&self, _id: &str, _result: &ValidationResult) -> icao_x509::Result<()> {
        Ok(())
    }
}

#[test]
fn test_batch_fails_when_pending_list_unavailable() {
    setup_logger();
    assert!(service()
        .revalidate_dsc_certificates_at(&BrokenStore, 10, &now(), None)
        .is_err());
}

#[test]
fn test_batch_summary_json() {
    let summary = BatchSummary {
        processed: 3,
        valid: 1,
        expired_valid: 1,
        invalid: 1,
        duration_ms: 12,
        ..Default::default()
    };
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["expiredValid"], 1);
    assert_eq!(json["durationMs"], 12);
    assert_eq!(json["cancelled"], false);
    assert_eq!(json.as_object().unwrap().len(), 8);
}

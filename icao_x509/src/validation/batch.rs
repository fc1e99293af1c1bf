// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Batch revalidation of stored DSCs.
//!
//! A failing item never aborts the batch: it is counted as `error` and the
//! loop moves on. Cancellation is observed between items.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use super::{ValidationResult, ValidationService, ValidationStatus};
use crate::crypto_backend::CryptoBackend;
use crate::error::{Error, Result, TimeError};
use crate::provider::{CandidateCertificateProvider, CrlProvider, RevalidationStore};
use crate::time::Time;

/// Shared flag used to stop a running batch.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Tallies of one revalidation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub processed: usize,
    pub valid: usize,
    pub expired_valid: usize,
    pub invalid: usize,
    pub pending: usize,
    pub error: usize,
    pub duration_ms: u64,
    /// The run stopped early because its token was cancelled
    pub cancelled: bool,
}

impl BatchSummary {
    fn record(&mut self, result: &ValidationResult) {
        match result.validation_status {
            ValidationStatus::Valid => self.valid += 1,
            ValidationStatus::ExpiredValid => self.expired_valid += 1,
            ValidationStatus::Invalid => self.invalid += 1,
            ValidationStatus::Pending => self.pending += 1,
            ValidationStatus::Error => self.error += 1,
        }
    }
}

impl<P: CandidateCertificateProvider, C: CrlProvider, B: CryptoBackend> ValidationService<P, C, B> {
    /// Revalidate up to `limit` pending DSCs from `store` at the current time.
    pub fn revalidate_dsc_certificates<S: RevalidationStore + ?Sized>(
        &self,
        store: &S,
        limit: usize,
    ) -> Result<BatchSummary> {
        let now = crate::time::current_time()
            .map_err(|_| Error::TimeError(TimeError::InvalidTime))?;
        self.revalidate_dsc_certificates_at(store, limit, &now, None)
    }

    /// Revalidate up to `limit` pending DSCs at `now`, stopping between
    /// items once `cancel` fires.
    ///
    /// Fails only when the pending list itself cannot be fetched.
    pub fn revalidate_dsc_certificates_at<S: RevalidationStore + ?Sized>(
        &self,
        store: &S,
        limit: usize,
        now: &Time,
        cancel: Option<&CancellationToken>,
    ) -> Result<BatchSummary> {
        let started = Instant::now();
        let mut summary = BatchSummary::default();

        let pending = store.pending_dsc(limit)?;
        log::info!("revalidating {} DSC(s)", pending.len());

        for item in pending.iter().take(limit) {
            if cancel.map_or(false, CancellationToken::is_cancelled) {
                log::warn!("revalidation cancelled after {} item(s)", summary.processed);
                summary.cancelled = true;
                break;
            }
            summary.processed += 1;

            let outcome = self
                .validate_der_at(&item.der, item.cert_type, now)
                .and_then(|result| store.store_result(&item.id, &result).map(|()| result));
            match outcome {
                Ok(result) => summary.record(&result),
                Err(e) => {
                    log::warn!("revalidation of {} failed: {}", item.id, e);
                    summary.error += 1;
                }
            }
        }

        summary.duration_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "revalidation done: processed={} valid={} expired_valid={} invalid={} pending={} error={} in {}ms",
            summary.processed,
            summary.valid,
            summary.expired_valid,
            summary.invalid,
            summary.pending,
            summary.error,
            summary.duration_ms
        );
        Ok(summary)
    }
}

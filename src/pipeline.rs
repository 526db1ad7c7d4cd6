//! Email intake pipeline: scan -> classify -> draft.
//!
//! Each stage is user-driven and runs exactly once per action; there are no
//! implicit retries. The working set of scanned candidates is ephemeral -
//! a new scan replaces it wholesale. Re-submission of the same in-flight
//! action is rejected with [`ApiError::AlreadyInFlight`]; distinct actions
//! (classifying two different candidates, a draft while a classify runs)
//! proceed concurrently.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::{CacheStore, Mutation};
use crate::config::ScanConfig;
use crate::error::{ApiError, Result};
use crate::gateway::ApiGateway;
use crate::models::{DraftReceipt, DraftRecord, ProcessedEmail, ScannedCandidate, StatsSnapshot};

/// Backend default page size for the processed list; views narrow the
/// cached list client-side instead of refetching per filter.
const PROCESSED_LIMIT: u32 = 50;

/// Outcome of classifying the whole working set.
#[derive(Debug, Default)]
pub struct BatchClassifyOutcome {
    pub processed: Vec<ProcessedEmail>,
    pub failures: Vec<(String, ApiError)>,
}

#[derive(Debug, Default)]
struct Inflight {
    scan: bool,
    classify: HashSet<String>,
    draft: HashSet<i64>,
}

/// The scan -> classify -> draft workflow plus the email-domain reads.
pub struct EmailPipeline<G> {
    gateway: G,
    cache: Arc<CacheStore>,
    scan_config: ScanConfig,
    // Working set between a scan and the classify actions; never persisted
    candidates: Mutex<Vec<ScannedCandidate>>,
    inflight: Mutex<Inflight>,
}

impl<G: ApiGateway> EmailPipeline<G> {
    pub fn new(gateway: G, cache: Arc<CacheStore>, scan_config: ScanConfig) -> Self {
        Self {
            gateway,
            cache,
            scan_config,
            candidates: Mutex::new(Vec::new()),
            inflight: Mutex::new(Inflight::default()),
        }
    }

    /// Current working set.
    pub fn candidates(&self) -> Vec<ScannedCandidate> {
        self.candidates.lock().expect("candidates lock poisoned").clone()
    }

    /// Scan the connected mailbox with the configured defaults.
    pub async fn scan(&self) -> Result<Vec<ScannedCandidate>> {
        let max_results = self.scan_config.max_results;
        let query = self.scan_config.query.clone();
        self.scan_with(max_results, &query).await
    }

    /// Scan the connected mailbox. The result replaces the working set
    /// wholesale - candidates from a previous scan are discarded, classified
    /// or not. An empty result is a valid terminal outcome.
    pub async fn scan_with(&self, max_results: u32, query: &str) -> Result<Vec<ScannedCandidate>> {
        let status = self
            .cache
            .connection_status
            .get_or_fetch(|| async { self.gateway.connection_status().await })
            .await?;
        if !status.connected {
            return Err(ApiError::MailboxNotConnected);
        }

        {
            let mut inflight = self.inflight.lock().expect("inflight lock poisoned");
            if inflight.scan {
                return Err(ApiError::AlreadyInFlight("scan"));
            }
            inflight.scan = true;
        }

        let result = self.gateway.scan_mailbox(max_results, query).await;
        self.inflight.lock().expect("inflight lock poisoned").scan = false;

        let scan = result?;
        info!("Scan returned {} candidates", scan.emails.len());

        let mut candidates = self.candidates.lock().expect("candidates lock poisoned");
        *candidates = scan.emails.clone();
        Ok(scan.emails)
    }

    /// Classify one scanned candidate.
    ///
    /// On success the candidate leaves the working set and the declared
    /// caches (processed emails, stats, learned skills) are invalidated.
    /// On failure the candidate stays put and the action can be repeated.
    pub async fn classify(&self, external_id: &str) -> Result<ProcessedEmail> {
        {
            let candidates = self.candidates.lock().expect("candidates lock poisoned");
            if !candidates.iter().any(|c| c.external_id == external_id) {
                return Err(ApiError::Validation(format!(
                    "No scanned candidate with id '{}'",
                    external_id
                )));
            }
        }

        {
            let mut inflight = self.inflight.lock().expect("inflight lock poisoned");
            if !inflight.classify.insert(external_id.to_string()) {
                return Err(ApiError::AlreadyInFlight("classification"));
            }
        }

        let result = self.gateway.classify_email(external_id).await;
        self.inflight
            .lock()
            .expect("inflight lock poisoned")
            .classify
            .remove(external_id);

        let processed = result?;
        self.settle_classified(std::slice::from_ref(&processed)).await;
        Ok(processed)
    }

    /// Classify every candidate currently in the working set with bounded
    /// concurrency. Per-item failures are collected; each failed candidate
    /// stays in the working set for a manual retry.
    pub async fn classify_all(&self) -> Result<BatchClassifyOutcome> {
        let ids: Vec<String> = {
            let candidates = self.candidates.lock().expect("candidates lock poisoned");
            let inflight = self.inflight.lock().expect("inflight lock poisoned");
            candidates
                .iter()
                .map(|c| c.external_id.clone())
                .filter(|id| !inflight.classify.contains(id))
                .collect()
        };
        if ids.is_empty() {
            return Ok(BatchClassifyOutcome::default());
        }

        {
            let mut inflight = self.inflight.lock().expect("inflight lock poisoned");
            for id in &ids {
                inflight.classify.insert(id.clone());
            }
        }

        let results: Vec<(String, Result<ProcessedEmail>)> = stream::iter(ids.clone())
            .map(|id| async move {
                let result = self.gateway.classify_email(&id).await;
                (id, result)
            })
            .buffer_unordered(self.scan_config.batch_concurrency)
            .collect()
            .await;

        {
            let mut inflight = self.inflight.lock().expect("inflight lock poisoned");
            for id in &ids {
                inflight.classify.remove(id);
            }
        }

        let mut outcome = BatchClassifyOutcome::default();
        for (id, result) in results {
            match result {
                Ok(processed) => outcome.processed.push(processed),
                Err(e) => {
                    debug!("Classification of {} failed: {}", id, e);
                    outcome.failures.push((id, e));
                }
            }
        }

        if !outcome.processed.is_empty() {
            self.settle_classified(&outcome.processed).await;
        }
        if !outcome.failures.is_empty() {
            warn!(
                "{} of {} classifications failed",
                outcome.failures.len(),
                outcome.processed.len() + outcome.failures.len()
            );
        }
        Ok(outcome)
    }

    /// Create a reply draft for a processed email; `resume_id` of `None`
    /// means the default resume. Not idempotent: each call produces a new
    /// draft and a new increment of the drafts-created counter. A fresh
    /// idempotency key is attached per call so the backend could harden
    /// double submission later without a client change.
    pub async fn create_draft(
        &self,
        processed_email_id: i64,
        resume_id: Option<i64>,
    ) -> Result<DraftReceipt> {
        {
            let mut inflight = self.inflight.lock().expect("inflight lock poisoned");
            if !inflight.draft.insert(processed_email_id) {
                return Err(ApiError::AlreadyInFlight("draft creation"));
            }
        }

        let key = Uuid::new_v4().to_string();
        let result = self
            .gateway
            .create_draft(processed_email_id, resume_id, &key)
            .await;
        self.inflight
            .lock()
            .expect("inflight lock poisoned")
            .draft
            .remove(&processed_email_id);

        let receipt = result?;
        info!("Draft {} created for processed email {}", receipt.draft_id, processed_email_id);
        self.cache.apply(Mutation::CreateDraft).await;
        Ok(receipt)
    }

    /// Processed emails, read through the cache. `recruiter_only` narrows
    /// the cached list client-side.
    pub async fn processed_emails(&self, recruiter_only: bool) -> Result<Vec<ProcessedEmail>> {
        let all = self
            .cache
            .processed_emails
            .get_or_fetch(|| async { self.gateway.list_processed(false, PROCESSED_LIMIT).await })
            .await?;
        if recruiter_only {
            Ok(all
                .iter()
                .filter(|e| e.is_recruiter_email)
                .cloned()
                .collect())
        } else {
            Ok(all.as_ref().clone())
        }
    }

    /// One processed email by id (detail view); not cached.
    pub async fn processed_email(&self, id: i64) -> Result<ProcessedEmail> {
        self.gateway.get_processed(id).await
    }

    /// Dashboard statistics, read through the cache.
    pub async fn stats(&self) -> Result<Arc<StatsSnapshot>> {
        self.cache
            .stats
            .get_or_fetch(|| async { self.gateway.fetch_stats().await })
            .await
    }

    /// Previously created drafts, read through the cache.
    pub async fn drafts(&self) -> Result<Arc<Vec<DraftRecord>>> {
        self.cache
            .drafts
            .get_or_fetch(|| async { self.gateway.list_drafts().await })
            .await
    }

    /// Remove classified candidates from the working set and invalidate
    /// the declared caches. Single point of invalidation for classification.
    async fn settle_classified(&self, processed: &[ProcessedEmail]) {
        {
            let mut candidates = self.candidates.lock().expect("candidates lock poisoned");
            candidates.retain(|c| !processed.iter().any(|p| p.external_id == c.external_id));
        }
        self.cache.apply(Mutation::ClassifyEmail).await;
    }
}

//! Resource-keyed cache with staleness and declared invalidation sets.
//!
//! Each logical resource (stats, connection status, processed emails,
//! skills, learned skills, resumes, drafts) lives in its own [`CacheCell`].
//! Reads go through `get_or_fetch`: a fresh value is returned immediately,
//! otherwise the cell's fetch mutex coalesces concurrent readers down to a
//! single in-flight fetch. Every mutation declares the set of keys it may
//! have affected; [`CacheStore::apply`] marks those stale so the next read
//! refetches. This is what keeps the dashboard stats, the email list, and
//! the skills trends mutually consistent without a push channel.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    ConnectionStatus, DraftRecord, LearnedSkillRecord, ProcessedEmail, Resume, SkillRecord,
    StatsSnapshot,
};

/// Logical resource names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Stats,
    ConnectionStatus,
    ProcessedEmails,
    Skills,
    LearnedSkills,
    Resumes,
    Drafts,
}

/// Mutations with declared effect sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    ClassifyEmail,
    CreateDraft,
    ConnectMailbox,
    DisconnectMailbox,
    CreateSkill,
    UpdateSkill,
    DeleteSkill,
    BulkImportSkills,
    ConvertLearnedSkill,
    CreateResume,
    UpdateResume,
    DeleteResume,
    SetDefaultResume,
}

/// Declared effect sets: which cached resources each mutation may have
/// changed. Centralizing this table replaces scattered imperative
/// "refresh this list" calls at every mutation site.
static EFFECT_SETS: Lazy<HashMap<Mutation, &'static [ResourceKey]>> = Lazy::new(|| {
    use Mutation::*;
    use ResourceKey::*;

    let mut map: HashMap<Mutation, &'static [ResourceKey]> = HashMap::new();
    map.insert(ClassifyEmail, &[ProcessedEmails, Stats, LearnedSkills]);
    map.insert(CreateDraft, &[Drafts, Stats]);
    map.insert(ConnectMailbox, &[ConnectionStatus]);
    map.insert(DisconnectMailbox, &[ConnectionStatus]);
    map.insert(CreateSkill, &[Skills]);
    map.insert(UpdateSkill, &[Skills]);
    map.insert(DeleteSkill, &[Skills]);
    map.insert(BulkImportSkills, &[Skills]);
    map.insert(ConvertLearnedSkill, &[Skills, LearnedSkills]);
    map.insert(CreateResume, &[Resumes]);
    map.insert(UpdateResume, &[Resumes]);
    map.insert(DeleteResume, &[Resumes]);
    map.insert(SetDefaultResume, &[Resumes]);
    map
});

/// Effect set for a mutation.
pub fn effect_set(mutation: Mutation) -> &'static [ResourceKey] {
    EFFECT_SETS
        .get(&mutation)
        .copied()
        .unwrap_or(&[])
}

#[derive(Debug)]
struct CellState<T> {
    value: Option<Arc<T>>,
    stale: bool,
    // Bumped on every invalidation so a fetch that was in flight when the
    // invalidation landed cannot mark the cell fresh
    epoch: u64,
}

/// A single cached resource with staleness tracking and coalesced refetch.
#[derive(Debug)]
pub struct CacheCell<T> {
    state: Mutex<CellState<T>>,
    fetch_lock: Mutex<()>,
}

impl<T> CacheCell<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CellState {
                value: None,
                stale: false,
                epoch: 0,
            }),
            fetch_lock: Mutex::new(()),
        }
    }

    /// Return the cached value, refetching if the cell is absent or stale.
    /// Concurrent callers coalesce to one in-flight fetch: late arrivals
    /// wait on the fetch lock and pick up the freshly stored value.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.fresh_value().await {
            return Ok(value);
        }

        let _guard = self.fetch_lock.lock().await;

        // Re-check: a coalesced fetch may have completed while waiting
        let epoch_at_fetch = {
            let state = self.state.lock().await;
            if let (Some(value), false) = (&state.value, state.stale) {
                return Ok(Arc::clone(value));
            }
            state.epoch
        };

        let value = Arc::new(fetch().await?);

        let mut state = self.state.lock().await;
        state.value = Some(Arc::clone(&value));
        // An invalidation that landed mid-flight leaves the cell stale
        state.stale = state.epoch != epoch_at_fetch;
        Ok(value)
    }

    /// The cached value if present and not stale.
    pub async fn fresh_value(&self) -> Option<Arc<T>> {
        let state = self.state.lock().await;
        match (&state.value, state.stale) {
            (Some(value), false) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Mark the cell stale; the next read refetches.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.stale = true;
        state.epoch += 1;
    }

    /// Drop the value entirely (session teardown).
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.value = None;
        state.stale = false;
        state.epoch += 1;
    }

    pub async fn is_stale(&self) -> bool {
        self.state.lock().await.stale
    }
}

impl<T> Default for CacheCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One cell per logical resource.
#[derive(Debug, Default)]
pub struct CacheStore {
    pub stats: CacheCell<StatsSnapshot>,
    pub connection_status: CacheCell<ConnectionStatus>,
    pub processed_emails: CacheCell<Vec<ProcessedEmail>>,
    pub skills: CacheCell<Vec<SkillRecord>>,
    pub learned_skills: CacheCell<Vec<LearnedSkillRecord>>,
    pub resumes: CacheCell<Vec<Resume>>,
    pub drafts: CacheCell<Vec<DraftRecord>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the named resources stale.
    pub async fn invalidate(&self, keys: &[ResourceKey]) {
        for key in keys {
            match key {
                ResourceKey::Stats => self.stats.invalidate().await,
                ResourceKey::ConnectionStatus => self.connection_status.invalidate().await,
                ResourceKey::ProcessedEmails => self.processed_emails.invalidate().await,
                ResourceKey::Skills => self.skills.invalidate().await,
                ResourceKey::LearnedSkills => self.learned_skills.invalidate().await,
                ResourceKey::Resumes => self.resumes.invalidate().await,
                ResourceKey::Drafts => self.drafts.invalidate().await,
            }
        }
    }

    /// Apply a mutation's declared effect set.
    pub async fn apply(&self, mutation: Mutation) {
        let keys = effect_set(mutation);
        debug!("Mutation {:?} invalidates {:?}", mutation, keys);
        self.invalidate(keys).await;
    }

    /// Drop every cached value (logout).
    pub async fn clear(&self) {
        self.stats.clear().await;
        self.connection_status.clear().await;
        self.processed_emails.clear().await;
        self.skills.clear().await;
        self.learned_skills.clear().await;
        self.resumes.clear().await;
        self.drafts.clear().await;
    }

    pub async fn is_stale(&self, key: ResourceKey) -> bool {
        match key {
            ResourceKey::Stats => self.stats.is_stale().await,
            ResourceKey::ConnectionStatus => self.connection_status.is_stale().await,
            ResourceKey::ProcessedEmails => self.processed_emails.is_stale().await,
            ResourceKey::Skills => self.skills.is_stale().await,
            ResourceKey::LearnedSkills => self.learned_skills.is_stale().await,
            ResourceKey::Resumes => self.resumes.is_stale().await,
            ResourceKey::Drafts => self.drafts.is_stale().await,
        }
    }
}

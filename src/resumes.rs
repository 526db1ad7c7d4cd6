//! Resume management: CRUD, default selection, and document download.

use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheStore, Mutation};
use crate::error::{ApiError, Result};
use crate::gateway::ApiGateway;
use crate::models::{Resume, ResumeDraft, ResumeUpdate};

/// Manages the user's resumes over the gateway and cache.
pub struct ResumeManager<G> {
    gateway: G,
    cache: Arc<CacheStore>,
}

impl<G: ApiGateway> ResumeManager<G> {
    pub fn new(gateway: G, cache: Arc<CacheStore>) -> Self {
        Self { gateway, cache }
    }

    /// All resumes, read through the cache.
    pub async fn resumes(&self) -> Result<Vec<Resume>> {
        let all = self
            .cache
            .resumes
            .get_or_fetch(|| async { self.gateway.list_resumes().await })
            .await?;
        Ok(all.as_ref().clone())
    }

    /// The default resume from the cached list, if one is marked.
    pub async fn default_resume(&self) -> Result<Option<Resume>> {
        let all = self
            .cache
            .resumes
            .get_or_fetch(|| async { self.gateway.list_resumes().await })
            .await?;
        Ok(all.iter().find(|r| r.is_default).cloned())
    }

    pub async fn resume(&self, id: i64) -> Result<Resume> {
        self.gateway.get_resume(id).await
    }

    pub async fn create(&self, draft: &ResumeDraft) -> Result<Resume> {
        if draft.name.trim().is_empty() {
            return Err(ApiError::Validation("Resume name is required".to_string()));
        }
        let resume = self.gateway.create_resume(draft).await?;
        info!("Created resume '{}'", resume.name);
        self.cache.apply(Mutation::CreateResume).await;
        Ok(resume)
    }

    pub async fn update(&self, id: i64, update: &ResumeUpdate) -> Result<Resume> {
        let resume = self.gateway.update_resume(id, update).await?;
        self.cache.apply(Mutation::UpdateResume).await;
        Ok(resume)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.gateway.delete_resume(id).await?;
        info!("Deleted resume {}", id);
        self.cache.apply(Mutation::DeleteResume).await;
        Ok(())
    }

    /// Mark a resume as the default used when draft creation names none.
    pub async fn set_default(&self, id: i64) -> Result<()> {
        self.gateway.set_default_resume(id).await?;
        self.cache.apply(Mutation::SetDefaultResume).await;
        Ok(())
    }

    /// Download the rendered document as bytes; the caller decides where
    /// it lands.
    pub async fn download_pdf(&self, id: i64) -> Result<Vec<u8>> {
        self.gateway.download_resume_pdf(id).await
    }
}

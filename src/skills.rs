//! Skills profile management: confirmed skills and learned-skill signals.
//!
//! Confirmed skills are user-owned profile entries; learned skills are
//! frequency-ranked signals the backend derives from recruiter emails.
//! Converting a learned skill into the profile leaves the learned record in
//! place - the trends view keeps showing it.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheStore, Mutation};
use crate::error::{ApiError, Result};
use crate::gateway::ApiGateway;
use crate::models::{ConvertOutcome, ImportSummary, LearnedSkillRecord, SkillDraft, SkillRecord};

/// Manages the skills profile over the gateway and cache.
pub struct SkillsManager<G> {
    gateway: G,
    cache: Arc<CacheStore>,
}

impl<G: ApiGateway> SkillsManager<G> {
    pub fn new(gateway: G, cache: Arc<CacheStore>) -> Self {
        Self { gateway, cache }
    }

    /// Confirmed profile skills, read through the cache. `category`
    /// narrows the cached list client-side.
    pub async fn skills(&self, category: Option<&str>) -> Result<Vec<SkillRecord>> {
        let all = self
            .cache
            .skills
            .get_or_fetch(|| async { self.gateway.list_skills(None).await })
            .await?;
        match category {
            Some(category) => Ok(all
                .iter()
                .filter(|s| s.category == category)
                .cloned()
                .collect()),
            None => Ok(all.as_ref().clone()),
        }
    }

    /// Learned-skill signals ranked by occurrence, read through the cache.
    pub async fn learned_skills(&self, category: Option<&str>) -> Result<Vec<LearnedSkillRecord>> {
        let all = self
            .cache
            .learned_skills
            .get_or_fetch(|| async { self.gateway.list_learned_skills(None).await })
            .await?;
        match category {
            Some(category) => Ok(all
                .iter()
                .filter(|s| s.category == category)
                .cloned()
                .collect()),
            None => Ok(all.as_ref().clone()),
        }
    }

    pub async fn create_skill(&self, draft: &SkillDraft) -> Result<SkillRecord> {
        validate_skill(draft)?;
        let skill = self.gateway.create_skill(draft).await?;
        info!("Created skill '{}'", skill.name);
        self.cache.apply(Mutation::CreateSkill).await;
        Ok(skill)
    }

    pub async fn update_skill(&self, id: i64, draft: &SkillDraft) -> Result<SkillRecord> {
        validate_skill(draft)?;
        let skill = self.gateway.update_skill(id, draft).await?;
        self.cache.apply(Mutation::UpdateSkill).await;
        Ok(skill)
    }

    pub async fn delete_skill(&self, id: i64) -> Result<()> {
        self.gateway.delete_skill(id).await?;
        self.cache.apply(Mutation::DeleteSkill).await;
        Ok(())
    }

    /// Promote a learned skill into the confirmed profile. Invalidates both
    /// the skills and learned-skills caches; the learned record itself is
    /// not removed by the backend.
    pub async fn convert_learned(
        &self,
        learned_id: i64,
        proficiency: &str,
        years_experience: Option<f32>,
    ) -> Result<ConvertOutcome> {
        if proficiency.trim().is_empty() {
            return Err(ApiError::Validation(
                "Proficiency is required".to_string(),
            ));
        }
        let outcome = self
            .gateway
            .convert_learned_skill(learned_id, proficiency, years_experience)
            .await?;
        info!("Converted learned skill {} into skill {}", learned_id, outcome.skill_id);
        self.cache.apply(Mutation::ConvertLearnedSkill).await;
        Ok(outcome)
    }

    /// Bulk import skills; duplicates are skipped server-side.
    pub async fn bulk_import(&self, drafts: &[SkillDraft]) -> Result<ImportSummary> {
        if drafts.is_empty() {
            return Err(ApiError::Validation(
                "Nothing to import".to_string(),
            ));
        }
        for draft in drafts {
            validate_skill(draft)?;
        }
        let summary = self.gateway.bulk_import_skills(drafts).await?;
        info!(
            "Imported {} skills, skipped {} duplicates",
            summary.imported, summary.skipped
        );
        self.cache.apply(Mutation::BulkImportSkills).await;
        Ok(summary)
    }

    /// Category name -> skill count for the confirmed profile.
    pub async fn categories(&self) -> Result<HashMap<String, u32>> {
        self.gateway.skill_categories().await
    }
}

fn validate_skill(draft: &SkillDraft) -> Result<()> {
    if draft.name.trim().is_empty() {
        return Err(ApiError::Validation("Skill name is required".to_string()));
    }
    if draft.category.trim().is_empty() {
        return Err(ApiError::Validation(
            "Skill category is required".to_string(),
        ));
    }
    Ok(())
}

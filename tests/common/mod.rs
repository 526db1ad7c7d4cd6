//! Common test utilities and fixtures

use chrono::Utc;
use huntdesk::error::Result;
use huntdesk::models::{
    AuthorizationUrl, ConnectionStatus, ConvertOutcome, DraftReceipt, DraftRecord, FederatedGrant,
    ImportSummary, LearnedSkillRecord, ProcessedEmail, Resume, ResumeDraft, ResumeUpdate,
    ScanResult, ScannedCandidate, SecondFactorSetup, SkillDraft, SkillRecord, StatsSnapshot,
    TokenGrant, UserProfile,
};
use mockall::mock;
use std::collections::HashMap;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once per binary; RUST_LOG controls verbosity.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Create a scanned candidate with default values
pub fn create_candidate(external_id: &str, subject: &str) -> ScannedCandidate {
    ScannedCandidate {
        external_id: external_id.to_string(),
        subject: subject.to_string(),
        sender: format!("Recruiter <recruiter@{}.example.com>", external_id),
        snippet: "We came across your profile...".to_string(),
        date: Utc::now(),
    }
}

/// Create a scan result wrapping the given candidates
pub fn create_scan_result(candidates: Vec<ScannedCandidate>) -> ScanResult {
    ScanResult {
        emails: candidates,
        next_page_token: None,
    }
}

/// Create a processed (classified) email for a candidate id
pub fn create_processed(id: i64, external_id: &str, recruiter: bool) -> ProcessedEmail {
    ProcessedEmail {
        id,
        external_id: external_id.to_string(),
        subject: "Senior Rust Engineer opportunity".to_string(),
        sender: "Dana Reyes <dana@talentlift.io>".to_string(),
        job_title: recruiter.then(|| "Senior Rust Engineer".to_string()),
        company: recruiter.then(|| "TalentLift".to_string()),
        job_requirements: vec!["5+ years systems programming".to_string()],
        technologies: vec!["rust".to_string(), "tokio".to_string()],
        is_recruiter_email: recruiter,
        confidence: if recruiter { 0.92 } else { 0.15 },
        processed_at: Utc::now(),
    }
}

/// Create a stats snapshot with the given counters
pub fn create_stats(processed: u64, recruiters: u64, drafts: u64) -> StatsSnapshot {
    StatsSnapshot {
        total_emails_processed: processed,
        recruiter_emails_found: recruiters,
        drafts_created: drafts,
        skills_learned: 3,
        top_requested_skills: Vec::new(),
    }
}

/// Create a draft receipt
pub fn create_receipt(draft_id: i64) -> DraftReceipt {
    DraftReceipt {
        draft_id,
        provider_draft_id: Some(format!("prov-{}", draft_id)),
        reply_text: "Thanks for reaching out...".to_string(),
        matched_skills: vec!["rust".to_string()],
    }
}

/// Create a user profile
pub fn create_profile(email: &str, second_factor: bool) -> UserProfile {
    UserProfile {
        id: 1,
        email: email.to_string(),
        full_name: Some("Jess Carter".to_string()),
        is_second_factor_enabled: second_factor,
        auth_provider: "email".to_string(),
        mailbox_connected: true,
        created_at: Utc::now(),
    }
}

/// Create a direct token grant (no second factor)
pub fn create_grant(token: &str) -> TokenGrant {
    TokenGrant {
        access_token: token.to_string(),
        token_type: "bearer".to_string(),
        requires_second_factor: false,
    }
}

/// Create a grant signaling the second-factor challenge
pub fn create_challenge_grant() -> TokenGrant {
    TokenGrant {
        access_token: String::new(),
        token_type: "bearer".to_string(),
        requires_second_factor: true,
    }
}

/// Create a connection status
pub fn create_status(connected: bool) -> ConnectionStatus {
    ConnectionStatus {
        connected,
        has_token: connected,
    }
}

/// Create a learned skill record
pub fn create_learned(id: i64, name: &str, count: u32) -> LearnedSkillRecord {
    LearnedSkillRecord {
        id,
        skill_name: name.to_string(),
        category: "languages".to_string(),
        occurrence_count: count,
        last_seen: Utc::now(),
        contexts: Vec::new(),
    }
}

/// Create a confirmed skill record
pub fn create_skill(id: i64, name: &str, source: &str) -> SkillRecord {
    SkillRecord {
        id,
        name: name.to_string(),
        category: "languages".to_string(),
        proficiency: "intermediate".to_string(),
        years_experience: None,
        proof_points: Vec::new(),
        keywords: Vec::new(),
        source: source.to_string(),
        created_at: Utc::now(),
    }
}

// Mock implementation of ApiGateway for testing
mock! {
    pub ApiGateway {}

    #[async_trait::async_trait]
    impl huntdesk::gateway::ApiGateway for ApiGateway {
        async fn register(&self, email: &str, password: &str) -> Result<UserProfile>;
        #[mockall::concretize]
        async fn login(
            &self,
            email: &str,
            password: &str,
            one_time_code: Option<&str>,
        ) -> Result<TokenGrant>;
        async fn exchange_federated_credential(&self, credential: &str) -> Result<FederatedGrant>;
        async fn current_user(&self) -> Result<UserProfile>;
        async fn begin_second_factor_setup(&self) -> Result<SecondFactorSetup>;
        async fn verify_second_factor_setup(&self, code: &str) -> Result<()>;
        async fn disable_second_factor(&self, code: &str) -> Result<()>;
        async fn connection_auth_url(&self) -> Result<AuthorizationUrl>;
        async fn connection_status(&self) -> Result<ConnectionStatus>;
        async fn disconnect_mailbox(&self) -> Result<()>;
        async fn scan_mailbox(&self, max_results: u32, query: &str) -> Result<ScanResult>;
        async fn classify_email(&self, external_id: &str) -> Result<ProcessedEmail>;
        async fn create_draft(
            &self,
            processed_email_id: i64,
            resume_id: Option<i64>,
            idempotency_key: &str,
        ) -> Result<DraftReceipt>;
        async fn list_processed(&self, recruiter_only: bool, limit: u32) -> Result<Vec<ProcessedEmail>>;
        async fn get_processed(&self, id: i64) -> Result<ProcessedEmail>;
        async fn list_drafts(&self) -> Result<Vec<DraftRecord>>;
        async fn fetch_stats(&self) -> Result<StatsSnapshot>;
        async fn list_resumes(&self) -> Result<Vec<Resume>>;
        async fn get_resume(&self, id: i64) -> Result<Resume>;
        async fn create_resume(&self, draft: &ResumeDraft) -> Result<Resume>;
        async fn update_resume(&self, id: i64, update: &ResumeUpdate) -> Result<Resume>;
        async fn delete_resume(&self, id: i64) -> Result<()>;
        async fn set_default_resume(&self, id: i64) -> Result<()>;
        async fn download_resume_pdf(&self, id: i64) -> Result<Vec<u8>>;
        #[mockall::concretize]
        async fn list_skills(&self, category: Option<&str>) -> Result<Vec<SkillRecord>>;
        async fn create_skill(&self, draft: &SkillDraft) -> Result<SkillRecord>;
        async fn update_skill(&self, id: i64, draft: &SkillDraft) -> Result<SkillRecord>;
        async fn delete_skill(&self, id: i64) -> Result<()>;
        #[mockall::concretize]
        async fn list_learned_skills(&self, category: Option<&str>) -> Result<Vec<LearnedSkillRecord>>;
        async fn convert_learned_skill(
            &self,
            id: i64,
            proficiency: &str,
            years_experience: Option<f32>,
        ) -> Result<ConvertOutcome>;
        async fn bulk_import_skills(&self, skills: &[SkillDraft]) -> Result<ImportSummary>;
        async fn skill_categories(&self) -> Result<HashMap<String, u32>>;
    }
}

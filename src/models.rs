use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate message surfaced by a mailbox scan.
///
/// Ephemeral: lives in the pipeline working set between a scan and a
/// classify action and is replaced wholesale by the next scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScannedCandidate {
    pub external_id: String,
    pub subject: String,
    pub sender: String,
    pub snippet: String,
    pub date: DateTime<Utc>,
}

/// Result of one mailbox scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub emails: Vec<ScannedCandidate>,
    pub next_page_token: Option<String>,
}

/// A classified email. Immutable from the client's perspective; the backend
/// owns the record and the client holds a cached read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedEmail {
    pub id: i64,
    pub external_id: String,
    pub subject: String,
    pub sender: String,
    pub job_title: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub job_requirements: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub is_recruiter_email: bool,
    pub confidence: f32,
    pub processed_at: DateTime<Utc>,
}

/// Acknowledgment returned by a create-draft operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftReceipt {
    pub draft_id: i64,
    pub provider_draft_id: Option<String>,
    pub reply_text: String,
    #[serde(default)]
    pub matched_skills: Vec<String>,
}

/// A previously created draft, as listed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub id: i64,
    pub processed_email_id: i64,
    pub subject: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate dashboard counters. Derived server-side, read-only,
/// invalidated client-side on any mutation that could change it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_emails_processed: u64,
    pub recruiter_emails_found: u64,
    pub drafts_created: u64,
    pub skills_learned: u64,
    #[serde(default)]
    pub top_requested_skills: Vec<TopSkill>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopSkill {
    pub name: String,
    pub category: String,
    pub count: u32,
}

/// A user-confirmed profile skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRecord {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub proficiency: String,
    pub years_experience: Option<f32>,
    #[serde(default)]
    pub proof_points: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating or replacing a skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDraft {
    pub name: String,
    pub category: String,
    pub proficiency: String,
    pub years_experience: Option<f32>,
    #[serde(default)]
    pub proof_points: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A frequency-ranked skill signal derived from processed recruiter emails.
/// Promotion to a [`SkillRecord`] does not remove the learned record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedSkillRecord {
    pub id: i64,
    pub skill_name: String,
    pub category: String,
    pub occurrence_count: u32,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub contexts: Vec<String>,
}

/// Outcome of promoting a learned skill into the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOutcome {
    pub skill_id: i64,
}

/// Outcome of a bulk skill import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: u32,
    pub skipped: u32,
}

/// A stored resume. Section contents are opaque to this client; only the
/// backend interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub id: i64,
    pub name: String,
    pub personal_info: serde_json::Value,
    pub summary: String,
    pub skills: serde_json::Value,
    pub experience: serde_json::Value,
    pub education: serde_json::Value,
    #[serde(default)]
    pub projects: serde_json::Value,
    #[serde(default)]
    pub certifications: Vec<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeDraft {
    pub name: String,
    pub personal_info: serde_json::Value,
    pub summary: String,
    pub skills: serde_json::Value,
    pub experience: serde_json::Value,
    pub education: serde_json::Value,
    #[serde(default)]
    pub projects: serde_json::Value,
    #[serde(default)]
    pub certifications: Vec<String>,
}

/// Partial update for a resume; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
}

/// The authenticated user snapshot held by the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub is_second_factor_enabled: bool,
    #[serde(default = "default_auth_provider")]
    pub auth_provider: String,
    #[serde(default)]
    pub mailbox_connected: bool,
    pub created_at: DateTime<Utc>,
}

fn default_auth_provider() -> String {
    "email".to_string()
}

/// Token grant from the password login path. An empty token with
/// `requires_second_factor` set signals the challenge path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub requires_second_factor: bool,
}

/// Token grant from the federated-credential exchange. Never requires a
/// second factor; the identity provider enforces it out of band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedGrant {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub is_new_user: bool,
}

/// Second-factor enrollment material: the shared secret, a rendered QR
/// code, and the provisioning URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondFactorSetup {
    pub secret: String,
    pub qr_code: String,
    pub uri: String,
}

/// External mailbox connection state. Read-mostly; gates the intake pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(default)]
    pub has_token: bool,
}

/// Authorization URL handed to the user to connect the external mailbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationUrl {
    pub auth_url: String,
    pub state: String,
}

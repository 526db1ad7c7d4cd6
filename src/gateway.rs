//! Typed gateway to the HuntDesk backend.
//!
//! The [`ApiGateway`] trait exposes one method per REST operation so the
//! session machine, pipeline, and services can be tested against a mock.
//! [`HttpGateway`] is the production implementation: it owns bearer-token
//! attachment, response-status mapping, and the global unauthorized side
//! effect (any 401 revokes the shared [`TokenStore`]).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::auth::TokenStore;
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::models::{
    AuthorizationUrl, ConnectionStatus, ConvertOutcome, DraftReceipt, DraftRecord, FederatedGrant,
    ImportSummary, LearnedSkillRecord, ProcessedEmail, Resume, ResumeDraft, ResumeUpdate,
    ScanResult, SecondFactorSetup, SkillDraft, SkillRecord, StatsSnapshot, TokenGrant, UserProfile,
};

/// Trait defining backend operations for easier testing
#[async_trait]
pub trait ApiGateway: Send + Sync {
    // Auth
    async fn register(&self, email: &str, password: &str) -> Result<UserProfile>;

    /// Password login. The one-time code is only sent on the second-factor
    /// retry; the backend has no separate challenge endpoint.
    async fn login(
        &self,
        email: &str,
        password: &str,
        one_time_code: Option<&str>,
    ) -> Result<TokenGrant>;

    /// Exchange a federated identity assertion for a session token.
    async fn exchange_federated_credential(&self, credential: &str) -> Result<FederatedGrant>;

    async fn current_user(&self) -> Result<UserProfile>;

    async fn begin_second_factor_setup(&self) -> Result<SecondFactorSetup>;

    async fn verify_second_factor_setup(&self, code: &str) -> Result<()>;

    async fn disable_second_factor(&self, code: &str) -> Result<()>;

    // External mailbox connection
    async fn connection_auth_url(&self) -> Result<AuthorizationUrl>;

    async fn connection_status(&self) -> Result<ConnectionStatus>;

    async fn disconnect_mailbox(&self) -> Result<()>;

    // Email intake
    async fn scan_mailbox(&self, max_results: u32, query: &str) -> Result<ScanResult>;

    async fn classify_email(&self, external_id: &str) -> Result<ProcessedEmail>;

    /// Create a reply draft for a processed email. `resume_id` of `None`
    /// means "use the default resume". The idempotency key is forwarded as
    /// a header; the backend does not currently deduplicate on it.
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

    // Resumes
    async fn list_resumes(&self) -> Result<Vec<Resume>>;

    async fn get_resume(&self, id: i64) -> Result<Resume>;

    async fn create_resume(&self, draft: &ResumeDraft) -> Result<Resume>;

    async fn update_resume(&self, id: i64, update: &ResumeUpdate) -> Result<Resume>;

    async fn delete_resume(&self, id: i64) -> Result<()>;

    async fn set_default_resume(&self, id: i64) -> Result<()>;

    /// Download the rendered resume document as raw bytes.
    async fn download_resume_pdf(&self, id: i64) -> Result<Vec<u8>>;

    // Skills
    async fn list_skills(&self, category: Option<&str>) -> Result<Vec<SkillRecord>>;

    async fn create_skill(&self, draft: &SkillDraft) -> Result<SkillRecord>;

    async fn update_skill(&self, id: i64, draft: &SkillDraft) -> Result<SkillRecord>;

    async fn delete_skill(&self, id: i64) -> Result<()>;

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

/// Error body shape used by the backend for non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    one_time_code: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct FederatedRequest<'a> {
    credential: &'a str,
}

#[derive(Debug, Serialize)]
struct CodeRequest<'a> {
    code: &'a str,
}

#[derive(Debug, Serialize)]
struct DraftRequest {
    processed_email_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    resume_id: Option<i64>,
}

/// Production gateway over HTTP
///
/// All authenticated calls attach the bearer token from the shared
/// [`TokenStore`]; if the token is absent the call is rejected locally with
/// [`ApiError::SessionExpired`] before any network attempt.
pub struct HttpGateway {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<TokenStore>,
}

impl HttpGateway {
    /// Create a new gateway against the configured backend.
    pub fn new(config: &ApiConfig, tokens: Arc<TokenStore>) -> Result<Self> {
        // Parse once so a malformed base URL fails at construction
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("Invalid api.base_url: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            http,
            tokens,
        })
    }

    /// The token store this gateway attaches and revokes.
    pub fn token_store(&self) -> Arc<TokenStore> {
        Arc::clone(&self.tokens)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Bearer token for a protected call, or a local rejection.
    fn bearer(&self) -> Result<String> {
        self.tokens.get().ok_or(ApiError::SessionExpired)
    }

    /// Map a non-2xx response on an unauthenticated endpoint. Credential
    /// failures (401/400) are inline auth errors, not a session teardown -
    /// there is no session to tear down yet.
    async fn check_public(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let detail = read_detail(resp).await;
        match status.as_u16() {
            400 | 401 => Err(ApiError::Auth(detail)),
            404 => Err(ApiError::NotFound(detail)),
            _ => Err(ApiError::OperationFailed {
                status: status.as_u16(),
                message: detail,
            }),
        }
    }

    /// Map a non-2xx response on a protected endpoint. Any 401 revokes the
    /// token store, forcing the session machine down no matter which
    /// component triggered the call.
    async fn check_authed(&self, resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status.as_u16() == 401 {
            self.tokens.revoke();
            return Err(ApiError::SessionExpired);
        }
        let detail = read_detail(resp).await;
        match status.as_u16() {
            404 => Err(ApiError::NotFound(detail)),
            _ => Err(ApiError::OperationFailed {
                status: status.as_u16(),
                message: detail,
            }),
        }
    }

    async fn execute_public<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let resp = req.send().await?;
        let resp = Self::check_public(resp).await?;
        Ok(resp.json().await?)
    }

    async fn execute_authed<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let token = self.bearer()?;
        let resp = req.bearer_auth(token).send().await?;
        let resp = self.check_authed(resp).await?;
        Ok(resp.json().await?)
    }

    /// Authenticated call whose response body carries nothing the client
    /// keeps (the backend answers with a human-readable message).
    async fn execute_authed_empty(&self, req: reqwest::RequestBuilder) -> Result<()> {
        let token = self.bearer()?;
        let resp = req.bearer_auth(token).send().await?;
        self.check_authed(resp).await?;
        Ok(())
    }
}

/// Pull the backend's `detail` message out of an error body, falling back
/// to the raw text when the body isn't the expected shape.
async fn read_detail(resp: reqwest::Response) -> String {
    let status = resp.status();
    match resp.text().await {
        Ok(body) => match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => parsed.detail,
            Err(_) if !body.is_empty() => body,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        },
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}

/// Invalid one-time codes come back as 400 on the second-factor endpoints;
/// surface them as auth errors rather than generic operation failures.
fn auth_on_bad_request(error: ApiError) -> ApiError {
    match error {
        ApiError::OperationFailed { status: 400, message } => ApiError::Auth(message),
        other => other,
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    async fn register(&self, email: &str, password: &str) -> Result<UserProfile> {
        debug!("Registering account for {}", email);
        self.execute_public(
            self.http
                .post(self.endpoint("/api/auth/register"))
                .json(&RegisterRequest { email, password }),
        )
        .await
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
        one_time_code: Option<&str>,
    ) -> Result<TokenGrant> {
        debug!("Logging in {}", email);
        self.execute_public(
            self.http
                .post(self.endpoint("/api/auth/login"))
                .json(&LoginRequest {
                    email,
                    password,
                    one_time_code,
                }),
        )
        .await
    }

    async fn exchange_federated_credential(&self, credential: &str) -> Result<FederatedGrant> {
        debug!("Exchanging federated credential");
        self.execute_public(
            self.http
                .post(self.endpoint("/api/auth/federated"))
                .json(&FederatedRequest { credential }),
        )
        .await
    }

    async fn current_user(&self) -> Result<UserProfile> {
        self.execute_authed(self.http.get(self.endpoint("/api/auth/me")))
            .await
    }

    async fn begin_second_factor_setup(&self) -> Result<SecondFactorSetup> {
        self.execute_authed(self.http.post(self.endpoint("/api/auth/2fa/setup")))
            .await
    }

    async fn verify_second_factor_setup(&self, code: &str) -> Result<()> {
        self.execute_authed_empty(
            self.http
                .post(self.endpoint("/api/auth/2fa/verify"))
                .json(&CodeRequest { code }),
        )
        .await
        .map_err(auth_on_bad_request)
    }

    async fn disable_second_factor(&self, code: &str) -> Result<()> {
        self.execute_authed_empty(
            self.http
                .post(self.endpoint("/api/auth/2fa/disable"))
                .json(&CodeRequest { code }),
        )
        .await
        .map_err(auth_on_bad_request)
    }

    async fn connection_auth_url(&self) -> Result<AuthorizationUrl> {
        self.execute_authed(self.http.get(self.endpoint("/api/mailbox/auth/url")))
            .await
    }

    async fn connection_status(&self) -> Result<ConnectionStatus> {
        self.execute_authed(self.http.get(self.endpoint("/api/mailbox/status")))
            .await
    }

    async fn disconnect_mailbox(&self) -> Result<()> {
        self.execute_authed_empty(self.http.delete(self.endpoint("/api/mailbox/disconnect")))
            .await
    }

    async fn scan_mailbox(&self, max_results: u32, query: &str) -> Result<ScanResult> {
        debug!("Scanning mailbox (max_results={}, query={:?})", max_results, query);
        self.execute_authed(
            self.http
                .get(self.endpoint("/api/emails/scan"))
                .query(&[("max_results", max_results.to_string())])
                .query(&[("query", query)]),
        )
        .await
    }

    async fn classify_email(&self, external_id: &str) -> Result<ProcessedEmail> {
        debug!("Classifying email {}", external_id);
        self.execute_authed(
            self.http
                .post(self.endpoint(&format!("/api/emails/classify/{}", external_id))),
        )
        .await
    }

    async fn create_draft(
        &self,
        processed_email_id: i64,
        resume_id: Option<i64>,
        idempotency_key: &str,
    ) -> Result<DraftReceipt> {
        debug!("Creating draft for processed email {}", processed_email_id);
        self.execute_authed(
            self.http
                .post(self.endpoint("/api/emails/draft"))
                .header("X-Idempotency-Key", idempotency_key)
                .json(&DraftRequest {
                    processed_email_id,
                    resume_id,
                }),
        )
        .await
    }

    async fn list_processed(
        &self,
        recruiter_only: bool,
        limit: u32,
    ) -> Result<Vec<ProcessedEmail>> {
        self.execute_authed(
            self.http
                .get(self.endpoint("/api/emails/processed"))
                .query(&[
                    ("recruiter_only", recruiter_only.to_string()),
                    ("limit", limit.to_string()),
                ]),
        )
        .await
    }

    async fn get_processed(&self, id: i64) -> Result<ProcessedEmail> {
        self.execute_authed(
            self.http
                .get(self.endpoint(&format!("/api/emails/processed/{}", id))),
        )
        .await
    }

    async fn list_drafts(&self) -> Result<Vec<DraftRecord>> {
        self.execute_authed(self.http.get(self.endpoint("/api/emails/drafts")))
            .await
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot> {
        self.execute_authed(self.http.get(self.endpoint("/api/emails/stats")))
            .await
    }

    async fn list_resumes(&self) -> Result<Vec<Resume>> {
        self.execute_authed(self.http.get(self.endpoint("/api/resumes/")))
            .await
    }

    async fn get_resume(&self, id: i64) -> Result<Resume> {
        self.execute_authed(self.http.get(self.endpoint(&format!("/api/resumes/{}", id))))
            .await
    }

    async fn create_resume(&self, draft: &ResumeDraft) -> Result<Resume> {
        self.execute_authed(
            self.http
                .post(self.endpoint("/api/resumes/"))
                .json(draft),
        )
        .await
    }

    async fn update_resume(&self, id: i64, update: &ResumeUpdate) -> Result<Resume> {
        self.execute_authed(
            self.http
                .put(self.endpoint(&format!("/api/resumes/{}", id)))
                .json(update),
        )
        .await
    }

    async fn delete_resume(&self, id: i64) -> Result<()> {
        self.execute_authed_empty(
            self.http
                .delete(self.endpoint(&format!("/api/resumes/{}", id))),
        )
        .await
    }

    async fn set_default_resume(&self, id: i64) -> Result<()> {
        self.execute_authed_empty(
            self.http
                .post(self.endpoint(&format!("/api/resumes/{}/set-default", id))),
        )
        .await
    }

    async fn download_resume_pdf(&self, id: i64) -> Result<Vec<u8>> {
        let token = self.bearer()?;
        let resp = self
            .http
            .get(self.endpoint(&format!("/api/resumes/{}/pdf", id)))
            .bearer_auth(token)
            .send()
            .await?;
        let resp = self.check_authed(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn list_skills(&self, category: Option<&str>) -> Result<Vec<SkillRecord>> {
        let mut req = self.http.get(self.endpoint("/api/skills/"));
        if let Some(category) = category {
            req = req.query(&[("category", category)]);
        }
        self.execute_authed(req).await
    }

    async fn create_skill(&self, draft: &SkillDraft) -> Result<SkillRecord> {
        self.execute_authed(self.http.post(self.endpoint("/api/skills/")).json(draft))
            .await
    }

    async fn update_skill(&self, id: i64, draft: &SkillDraft) -> Result<SkillRecord> {
        self.execute_authed(
            self.http
                .put(self.endpoint(&format!("/api/skills/{}", id)))
                .json(draft),
        )
        .await
    }

    async fn delete_skill(&self, id: i64) -> Result<()> {
        self.execute_authed_empty(
            self.http
                .delete(self.endpoint(&format!("/api/skills/{}", id))),
        )
        .await
    }

    async fn list_learned_skills(&self, category: Option<&str>) -> Result<Vec<LearnedSkillRecord>> {
        let mut req = self.http.get(self.endpoint("/api/skills/learned"));
        if let Some(category) = category {
            req = req.query(&[("category", category)]);
        }
        self.execute_authed(req).await
    }

    async fn convert_learned_skill(
        &self,
        id: i64,
        proficiency: &str,
        years_experience: Option<f32>,
    ) -> Result<ConvertOutcome> {
        let mut req = self
            .http
            .post(self.endpoint(&format!("/api/skills/learned/{}/convert", id)))
            .query(&[("proficiency", proficiency)]);
        if let Some(years) = years_experience {
            req = req.query(&[("years_experience", years.to_string())]);
        }
        self.execute_authed(req).await
    }

    async fn bulk_import_skills(&self, skills: &[SkillDraft]) -> Result<ImportSummary> {
        self.execute_authed(
            self.http
                .post(self.endpoint("/api/skills/bulk-import"))
                .json(&skills),
        )
        .await
    }

    async fn skill_categories(&self) -> Result<HashMap<String, u32>> {
        self.execute_authed(self.http.get(self.endpoint("/api/skills/categories")))
            .await
    }
}

// Implement ApiGateway for Arc<HttpGateway> to allow shared ownership across
// the session machine, pipeline, and services
#[async_trait]
impl<G: ApiGateway> ApiGateway for Arc<G> {
    async fn register(&self, email: &str, password: &str) -> Result<UserProfile> {
        self.as_ref().register(email, password).await
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
        one_time_code: Option<&str>,
    ) -> Result<TokenGrant> {
        self.as_ref().login(email, password, one_time_code).await
    }

    async fn exchange_federated_credential(&self, credential: &str) -> Result<FederatedGrant> {
        self.as_ref().exchange_federated_credential(credential).await
    }

    async fn current_user(&self) -> Result<UserProfile> {
        self.as_ref().current_user().await
    }

    async fn begin_second_factor_setup(&self) -> Result<SecondFactorSetup> {
        self.as_ref().begin_second_factor_setup().await
    }

    async fn verify_second_factor_setup(&self, code: &str) -> Result<()> {
        self.as_ref().verify_second_factor_setup(code).await
    }

    async fn disable_second_factor(&self, code: &str) -> Result<()> {
        self.as_ref().disable_second_factor(code).await
    }

    async fn connection_auth_url(&self) -> Result<AuthorizationUrl> {
        self.as_ref().connection_auth_url().await
    }

    async fn connection_status(&self) -> Result<ConnectionStatus> {
        self.as_ref().connection_status().await
    }

    async fn disconnect_mailbox(&self) -> Result<()> {
        self.as_ref().disconnect_mailbox().await
    }

    async fn scan_mailbox(&self, max_results: u32, query: &str) -> Result<ScanResult> {
        self.as_ref().scan_mailbox(max_results, query).await
    }

    async fn classify_email(&self, external_id: &str) -> Result<ProcessedEmail> {
        self.as_ref().classify_email(external_id).await
    }

    async fn create_draft(
        &self,
        processed_email_id: i64,
        resume_id: Option<i64>,
        idempotency_key: &str,
    ) -> Result<DraftReceipt> {
        self.as_ref()
            .create_draft(processed_email_id, resume_id, idempotency_key)
            .await
    }

    async fn list_processed(
        &self,
        recruiter_only: bool,
        limit: u32,
    ) -> Result<Vec<ProcessedEmail>> {
        self.as_ref().list_processed(recruiter_only, limit).await
    }

    async fn get_processed(&self, id: i64) -> Result<ProcessedEmail> {
        self.as_ref().get_processed(id).await
    }

    async fn list_drafts(&self) -> Result<Vec<DraftRecord>> {
        self.as_ref().list_drafts().await
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot> {
        self.as_ref().fetch_stats().await
    }

    async fn list_resumes(&self) -> Result<Vec<Resume>> {
        self.as_ref().list_resumes().await
    }

    async fn get_resume(&self, id: i64) -> Result<Resume> {
        self.as_ref().get_resume(id).await
    }

    async fn create_resume(&self, draft: &ResumeDraft) -> Result<Resume> {
        self.as_ref().create_resume(draft).await
    }

    async fn update_resume(&self, id: i64, update: &ResumeUpdate) -> Result<Resume> {
        self.as_ref().update_resume(id, update).await
    }

    async fn delete_resume(&self, id: i64) -> Result<()> {
        self.as_ref().delete_resume(id).await
    }

    async fn set_default_resume(&self, id: i64) -> Result<()> {
        self.as_ref().set_default_resume(id).await
    }

    async fn download_resume_pdf(&self, id: i64) -> Result<Vec<u8>> {
        self.as_ref().download_resume_pdf(id).await
    }

    async fn list_skills(&self, category: Option<&str>) -> Result<Vec<SkillRecord>> {
        self.as_ref().list_skills(category).await
    }

    async fn create_skill(&self, draft: &SkillDraft) -> Result<SkillRecord> {
        self.as_ref().create_skill(draft).await
    }

    async fn update_skill(&self, id: i64, draft: &SkillDraft) -> Result<SkillRecord> {
        self.as_ref().update_skill(id, draft).await
    }

    async fn delete_skill(&self, id: i64) -> Result<()> {
        self.as_ref().delete_skill(id).await
    }

    async fn list_learned_skills(&self, category: Option<&str>) -> Result<Vec<LearnedSkillRecord>> {
        self.as_ref().list_learned_skills(category).await
    }

    async fn convert_learned_skill(
        &self,
        id: i64,
        proficiency: &str,
        years_experience: Option<f32>,
    ) -> Result<ConvertOutcome> {
        self.as_ref()
            .convert_learned_skill(id, proficiency, years_experience)
            .await
    }

    async fn bulk_import_skills(&self, skills: &[SkillDraft]) -> Result<ImportSummary> {
        self.as_ref().bulk_import_skills(skills).await
    }

    async fn skill_categories(&self) -> Result<HashMap<String, u32>> {
        self.as_ref().skill_categories().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_on_bad_request_maps_400() {
        let mapped = auth_on_bad_request(ApiError::OperationFailed {
            status: 400,
            message: "Invalid verification code".to_string(),
        });
        assert!(matches!(mapped, ApiError::Auth(msg) if msg.contains("Invalid")));
    }

    #[test]
    fn test_auth_on_bad_request_passes_other_errors() {
        let mapped = auth_on_bad_request(ApiError::SessionExpired);
        assert!(matches!(mapped, ApiError::SessionExpired));

        let mapped = auth_on_bad_request(ApiError::OperationFailed {
            status: 503,
            message: "unavailable".to_string(),
        });
        assert!(matches!(mapped, ApiError::OperationFailed { status: 503, .. }));
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let tokens = Arc::new(TokenStore::new());
        let config = ApiConfig {
            base_url: "http://localhost:8000/".to_string(),
            timeout_secs: 5,
        };
        let gateway = HttpGateway::new(&config, tokens).unwrap();
        assert_eq!(
            gateway.endpoint("/api/emails/scan"),
            "http://localhost:8000/api/emails/scan"
        );
    }

    #[test]
    fn test_new_rejects_malformed_base_url() {
        let tokens = Arc::new(TokenStore::new());
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            timeout_secs: 5,
        };
        assert!(HttpGateway::new(&config, tokens).is_err());
    }

    #[tokio::test]
    async fn test_protected_call_rejected_locally_without_token() {
        let tokens = Arc::new(TokenStore::new());
        let config = ApiConfig {
            // Port is intentionally unroutable: the call must fail before
            // any connection is attempted
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
        };
        let gateway = HttpGateway::new(&config, tokens).unwrap();

        let err = gateway.fetch_stats().await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
    }
}

//! Session and authentication state machine.
//!
//! Tracks identity state across the password, one-time-code, and federated
//! login paths, plus registration and second-factor enrollment. The machine
//! observes the shared [`TokenStore`]: any unauthorized response recorded
//! there (by the gateway, from any call site) forces the state back to
//! `Unauthenticated` the next time the machine is touched.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::TokenStore;
use crate::error::{ApiError, Result};
use crate::gateway::ApiGateway;
use crate::models::{SecondFactorSetup, UserProfile};

/// Observable authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    PendingSecondFactor,
    Authenticated,
}

/// Outcome of a credentials submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Token granted directly; the session is authenticated.
    Authenticated,
    /// The account requires a one-time code; credentials are retained for
    /// the retry and the machine waits in `PendingSecondFactor`.
    SecondFactorRequired,
}

#[derive(Debug, Clone)]
enum State {
    Unauthenticated,
    // The backend has no dedicated challenge endpoint; the code retry
    // re-posts the original credentials, so they are retained here
    PendingSecondFactor { email: String, password: String },
    Authenticated { user: Option<UserProfile> },
}

/// Session state machine over a gateway.
pub struct Session<G> {
    gateway: G,
    tokens: Arc<TokenStore>,
    state: State,
    // Kept across cancel/logout so a login form can be prefilled
    last_email: Option<String>,
    seen_revocations: u64,
}

impl<G: ApiGateway> Session<G> {
    pub fn new(gateway: G, tokens: Arc<TokenStore>) -> Self {
        let seen_revocations = tokens.revocation_generation();
        Self {
            gateway,
            tokens,
            state: State::Unauthenticated,
            last_email: None,
            seen_revocations,
        }
    }

    /// Current state, after folding in any revocation recorded since the
    /// last touch.
    pub fn state(&mut self) -> AuthState {
        self.sync_revocations();
        match self.state {
            State::Unauthenticated => AuthState::Unauthenticated,
            State::PendingSecondFactor { .. } => AuthState::PendingSecondFactor,
            State::Authenticated { .. } => AuthState::Authenticated,
        }
    }

    /// The authenticated user snapshot, if one has been fetched.
    pub fn user(&mut self) -> Option<&UserProfile> {
        self.sync_revocations();
        match &self.state {
            State::Authenticated { user } => user.as_ref(),
            _ => None,
        }
    }

    /// Last email submitted to a login path; survives cancel and logout.
    pub fn last_email(&self) -> Option<&str> {
        self.last_email.as_deref()
    }

    /// Submit email/password credentials.
    ///
    /// Transitions `Unauthenticated -> Authenticated` on a direct grant, or
    /// `Unauthenticated -> PendingSecondFactor` when the backend signals a
    /// one-time-code requirement. On failure the state is unchanged.
    pub async fn submit_credentials(&mut self, email: &str, password: &str) -> Result<LoginOutcome> {
        self.sync_revocations();
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        if !matches!(self.state, State::Unauthenticated) {
            return Err(ApiError::Validation(
                "A login is already in progress or completed".to_string(),
            ));
        }

        let grant = self.gateway.login(email, password, None).await?;
        self.last_email = Some(email.to_string());

        if grant.requires_second_factor {
            debug!("Second factor required for {}", email);
            self.state = State::PendingSecondFactor {
                email: email.to_string(),
                password: password.to_string(),
            };
            return Ok(LoginOutcome::SecondFactorRequired);
        }

        self.install_grant(grant.access_token).await;
        info!("Authenticated via password login");
        Ok(LoginOutcome::Authenticated)
    }

    /// Submit the one-time code for a pending challenge.
    ///
    /// Only valid from `PendingSecondFactor`. An incorrect code leaves the
    /// machine in `PendingSecondFactor` with the credentials retained.
    pub async fn submit_second_factor(&mut self, code: &str) -> Result<()> {
        self.sync_revocations();
        let (email, password) = match &self.state {
            State::PendingSecondFactor { email, password } => {
                (email.clone(), password.clone())
            }
            _ => {
                return Err(ApiError::Validation(
                    "No second-factor challenge is pending".to_string(),
                ))
            }
        };
        validate_code(code)?;

        let grant = match self.gateway.login(&email, &password, Some(code)).await {
            Ok(grant) => grant,
            Err(e) => {
                debug!("Second-factor attempt failed: {}", e);
                return Err(e);
            }
        };

        if grant.access_token.is_empty() {
            return Err(ApiError::Auth("One-time code was not accepted".to_string()));
        }

        self.install_grant(grant.access_token).await;
        info!("Authenticated after second-factor challenge");
        Ok(())
    }

    /// Abandon a pending challenge, discarding the retained credentials.
    /// The entered email is kept for form prefill.
    pub fn cancel_second_factor(&mut self) {
        self.sync_revocations();
        if matches!(self.state, State::PendingSecondFactor { .. }) {
            debug!("Second-factor challenge cancelled");
            self.state = State::Unauthenticated;
        }
    }

    /// Exchange a federated identity assertion for a session.
    ///
    /// Usable whenever the session is not authenticated, regardless of
    /// password-path progress; a pending challenge is discarded. Federated
    /// login never visits `PendingSecondFactor` - the identity provider
    /// enforces any second factor out of band.
    pub async fn login_with_federated_credential(&mut self, credential: &str) -> Result<()> {
        self.sync_revocations();
        if credential.trim().is_empty() {
            return Err(ApiError::Validation(
                "Federated credential is required".to_string(),
            ));
        }
        if matches!(self.state, State::Authenticated { .. }) {
            return Err(ApiError::Validation(
                "Already authenticated".to_string(),
            ));
        }

        let grant = self.gateway.exchange_federated_credential(credential).await?;
        self.install_grant(grant.access_token).await;
        info!("Authenticated via federated credential (new_user={})", grant.is_new_user);
        Ok(())
    }

    /// Register a new account. Validates locally before any network call;
    /// backend success does NOT authenticate - the caller must log in.
    pub async fn register_account(
        &mut self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<UserProfile> {
        self.sync_revocations();
        validate_registration(email, password, confirm_password)?;

        let profile = self.gateway.register(email, password).await?;
        self.last_email = Some(email.to_string());
        info!("Registered account for {}", profile.email);
        Ok(profile)
    }

    /// Re-fetch the authenticated user snapshot.
    pub async fn refresh_profile(&mut self) -> Result<&UserProfile> {
        self.sync_revocations();
        if !matches!(self.state, State::Authenticated { .. }) {
            return Err(ApiError::Validation("Not authenticated".to_string()));
        }

        let user = match self.gateway.current_user().await {
            Ok(user) => user,
            Err(e) => {
                if e.is_session_fatal() {
                    self.sync_revocations();
                }
                return Err(e);
            }
        };
        self.state = State::Authenticated { user: Some(user) };
        match &self.state {
            State::Authenticated { user: Some(user) } => Ok(user),
            _ => unreachable!("state was just set"),
        }
    }

    /// Tear the session down from any state: clears the token and the
    /// cached user snapshot.
    pub fn logout(&mut self) {
        self.tokens.clear();
        self.state = State::Unauthenticated;
        // Folding in the current generation keeps a pre-logout revocation
        // from re-firing on the next touch
        self.seen_revocations = self.tokens.revocation_generation();
        info!("Logged out");
    }

    /// Start second-factor enrollment. Only available from `Authenticated`;
    /// returns the shared secret and provisioning URI to present to the user.
    pub async fn begin_enrollment(&mut self) -> Result<SecondFactorSetup> {
        self.sync_revocations();
        if !matches!(self.state, State::Authenticated { .. }) {
            return Err(ApiError::Validation("Not authenticated".to_string()));
        }
        self.gateway.begin_second_factor_setup().await
    }

    /// Activate the enrolled second factor with a code from the user's
    /// authenticator. An incorrect code fails without state change.
    pub async fn confirm_enrollment(&mut self, code: &str) -> Result<()> {
        self.sync_revocations();
        if !matches!(self.state, State::Authenticated { .. }) {
            return Err(ApiError::Validation("Not authenticated".to_string()));
        }
        validate_code(code)?;

        self.gateway.verify_second_factor_setup(code).await?;
        if let State::Authenticated { user: Some(user) } = &mut self.state {
            user.is_second_factor_enabled = true;
        }
        info!("Second factor enabled");
        Ok(())
    }

    /// Deactivate the second factor. Requires the current code; an
    /// incorrect code fails without state change.
    pub async fn disable_second_factor(&mut self, code: &str) -> Result<()> {
        self.sync_revocations();
        if !matches!(self.state, State::Authenticated { .. }) {
            return Err(ApiError::Validation("Not authenticated".to_string()));
        }
        validate_code(code)?;

        self.gateway.disable_second_factor(code).await?;
        if let State::Authenticated { user: Some(user) } = &mut self.state {
            user.is_second_factor_enabled = false;
        }
        info!("Second factor disabled");
        Ok(())
    }

    /// Install a granted token and fetch the user snapshot. The snapshot
    /// fetch is best-effort: a failure leaves the session authenticated
    /// with no snapshot (a later 401 still tears it down via the store).
    async fn install_grant(&mut self, access_token: String) {
        self.tokens.set(access_token);
        let user = match self.gateway.current_user().await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Authenticated but profile fetch failed: {}", e);
                None
            }
        };
        self.state = State::Authenticated { user };
        self.seen_revocations = self.tokens.revocation_generation();
    }

    /// Fold in revocations recorded by the gateway since the last touch.
    /// Forces `Authenticated | PendingSecondFactor -> Unauthenticated`.
    fn sync_revocations(&mut self) {
        let generation = self.tokens.revocation_generation();
        if generation == self.seen_revocations {
            return;
        }
        self.seen_revocations = generation;
        if !matches!(self.state, State::Unauthenticated) {
            warn!("Session revoked; forcing state to Unauthenticated");
            self.state = State::Unauthenticated;
        }
    }
}

/// One-time codes are exactly six ASCII digits; anything else is a local
/// validation failure that never reaches the network.
fn validate_code(code: &str) -> Result<()> {
    if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::Validation(
            "One-time code must be exactly 6 digits".to_string(),
        ));
    }
    Ok(())
}

fn validate_registration(email: &str, password: &str, confirm_password: &str) -> Result<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ApiError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    if password.chars().count() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if password != confirm_password {
        return Err(ApiError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert!(validate_code("123456").is_ok());
        assert!(validate_code("000000").is_ok());
        assert!(validate_code("12345").is_err());
        assert!(validate_code("1234567").is_err());
        assert!(validate_code("12345a").is_err());
        assert!(validate_code("").is_err());
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration("a@b.com", "password1", "password1").is_ok());

        // Short password
        let err = validate_registration("a@b.com", "short", "short").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // Mismatch
        let err = validate_registration("a@b.com", "password1", "password2").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // Implausible email
        assert!(validate_registration("not-an-email", "password1", "password1").is_err());
        assert!(validate_registration("", "password1", "password1").is_err());
    }
}

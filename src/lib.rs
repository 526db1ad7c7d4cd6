//! HuntDesk Client
//!
//! A typed client for the HuntDesk job-search assistant backend. It owns the
//! three pieces of real state in the system and keeps them consistent:
//!
//! - **Session**: the authentication state machine across the password,
//!   one-time-code, and federated login paths, including second-factor
//!   enrollment and the global teardown on any unauthorized response.
//! - **Email intake**: the user-driven scan -> classify -> draft pipeline
//!   over the connected mailbox, with its ephemeral candidate working set.
//! - **Cache consistency**: resource-keyed caches with declared
//!   invalidation sets, so a classification is reflected in the email list,
//!   the dashboard statistics, and the skills trends on their next read.
//!
//! # Example Usage
//!
//! ```no_run
//! use huntdesk::{
//!     auth::TokenStore, cache::CacheStore, config::Config, gateway::HttpGateway,
//!     pipeline::EmailPipeline, session::Session,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> huntdesk::Result<()> {
//!     let config = Config::load("huntdesk.toml".as_ref()).await?;
//!
//!     let tokens = Arc::new(TokenStore::new());
//!     let gateway = Arc::new(HttpGateway::new(&config.api, Arc::clone(&tokens))?);
//!     let cache = Arc::new(CacheStore::new());
//!
//!     let mut session = Session::new(Arc::clone(&gateway), Arc::clone(&tokens));
//!     session.submit_credentials("user@example.com", "hunter22secret").await?;
//!
//!     let pipeline = EmailPipeline::new(gateway, cache, config.scan.clone());
//!     let candidates = pipeline.scan().await?;
//!     for candidate in &candidates {
//!         let processed = pipeline.classify(&candidate.external_id).await?;
//!         if processed.is_recruiter_email {
//!             pipeline.create_draft(processed.id, None).await?;
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - Shared bearer-token store and session-revoked broadcast
//! - [`account`] - External mailbox connection management
//! - [`cache`] - Resource-keyed caches, staleness, declared effect sets
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result alias
//! - [`gateway`] - Typed backend gateway (trait + HTTP implementation)
//! - [`models`] - Core data structures
//! - [`pipeline`] - Email intake pipeline and email-domain reads
//! - [`resumes`] - Resume management
//! - [`session`] - Session and authentication state machine
//! - [`skills`] - Skills profile and learned-skill signals

pub mod account;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod pipeline;
pub mod resumes;
pub mod session;
pub mod skills;

// Re-export commonly used types for convenience
pub use error::{ApiError, Result};

// Core data models
pub use models::{
    ConnectionStatus, DraftReceipt, LearnedSkillRecord, ProcessedEmail, ScannedCandidate,
    SkillRecord, StatsSnapshot, UserProfile,
};

// Gateway types
pub use gateway::{ApiGateway, HttpGateway};

// Session types
pub use session::{AuthState, LoginOutcome, Session};

// Cache types
pub use cache::{CacheStore, Mutation, ResourceKey};

// Pipeline types
pub use pipeline::{BatchClassifyOutcome, EmailPipeline};

// Config types
pub use config::{ApiConfig, Config, ScanConfig};

// Token store
pub use auth::TokenStore;

// Managers
pub use account::ConnectionManager;
pub use resumes::ResumeManager;
pub use skills::SkillsManager;

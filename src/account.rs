//! External mailbox connection management.
//!
//! Connection state is read-mostly and gates the intake pipeline; the
//! status read goes through the cache, and connect/disconnect invalidate it.

use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheStore, Mutation};
use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::{AuthorizationUrl, ConnectionStatus};

/// Manages the external mailbox connection for the authenticated user.
pub struct ConnectionManager<G> {
    gateway: G,
    cache: Arc<CacheStore>,
}

impl<G: ApiGateway> ConnectionManager<G> {
    pub fn new(gateway: G, cache: Arc<CacheStore>) -> Self {
        Self { gateway, cache }
    }

    /// Authorization URL to hand to the user. The provider redirects back
    /// to the backend, which stores the mailbox tokens; the client only
    /// observes the resulting connection status.
    pub async fn authorization_url(&self) -> Result<AuthorizationUrl> {
        let url = self.gateway.connection_auth_url().await?;
        // The user is about to complete the flow out of band; whatever
        // status we had cached is about to go out of date
        self.cache.apply(Mutation::ConnectMailbox).await;
        Ok(url)
    }

    /// Connection status, read through the cache.
    pub async fn status(&self) -> Result<ConnectionStatus> {
        let status = self
            .cache
            .connection_status
            .get_or_fetch(|| async { self.gateway.connection_status().await })
            .await?;
        Ok(*status)
    }

    /// Disconnect the mailbox. Invalidates the cached status; the intake
    /// pipeline is gated off until a reconnect.
    pub async fn disconnect(&self) -> Result<()> {
        self.gateway.disconnect_mailbox().await?;
        info!("Mailbox disconnected");
        self.cache.apply(Mutation::DisconnectMailbox).await;
        Ok(())
    }
}

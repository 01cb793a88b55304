//! Session hook: turns bearer tokens into signed-in user profiles
//!
//! ```text
//! IdentityProvider ──SessionEvent──▶ SessionHook ──▶ profile cache (token → User)
//! EventBus ─────────RecordEvent(users)──┘
//! ```
//!
//! The cache is filled on sign-in and emptied on sign-out. Changes to a
//! profile (role, status, deletion) evict every cached entry of that user so
//! the next request reloads it.

use super::identity::{IdentityProvider, SessionEvent};
use crate::core::auth::AuthContext;
use crate::core::entity::{Entity, Status};
use crate::core::error::{AuthError, BackofficeError, BackofficeResult};
use crate::core::events::{EventBus, EventEnvelope};
use crate::core::service::{Collection, DataService};
use crate::core::store::DocumentStore;
use crate::entities::User;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionHook {
    identity: Arc<dyn IdentityProvider>,
    users: Collection<User>,
    profiles: Arc<RwLock<HashMap<String, User>>>,
}

impl SessionHook {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            identity,
            users: Collection::new(store),
            profiles: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Follow session and profile changes in the background
    pub fn spawn(&self, events: &EventBus) -> JoinHandle<()> {
        let hook = self.clone();
        let mut sessions = self.identity.subscribe();
        let mut records = events.subscribe();

        tokio::spawn(async move {
            tracing::debug!("session hook started");
            loop {
                tokio::select! {
                    event = sessions.recv() => match event {
                        Ok(event) => hook.on_session_event(event).await,
                        Err(broadcast::error::RecvError::Lagged(count)) => {
                            tracing::warn!(count, "session hook lagged, clearing profile cache");
                            hook.profiles.write().await.clear();
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    event = records.recv() => match event {
                        Ok(envelope) => hook.on_record_event(&envelope).await,
                        Err(broadcast::error::RecvError::Lagged(count)) => {
                            tracing::warn!(count, "session hook lagged, clearing profile cache");
                            hook.profiles.write().await.clear();
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("session hook stopped");
        })
    }

    async fn on_session_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::SignedIn(session) => match self.users.get(&session.user_id).await {
                Ok(Some(profile)) => {
                    self.profiles.write().await.insert(session.token, profile);
                }
                Ok(None) => {
                    tracing::warn!(user_id = %session.user_id, "signed in without a profile");
                }
                Err(e) => {
                    tracing::error!(user_id = %session.user_id, error = %e, "failed to load profile");
                }
            },
            SessionEvent::SignedOut { token, .. } => {
                self.profiles.write().await.remove(&token);
            }
        }
    }

    async fn on_record_event(&self, envelope: &EventEnvelope) {
        if envelope.event.collection() != <User as Entity>::resource_name() {
            return;
        }
        for user_id in envelope.event.record_ids() {
            self.evict_user(&user_id).await;
        }
    }

    /// Drop every cached profile of a user
    pub async fn evict_user(&self, user_id: &Uuid) {
        self.profiles
            .write()
            .await
            .retain(|_, profile| profile.id != *user_id);
    }

    async fn profile(&self, token: &str, user_id: &Uuid) -> BackofficeResult<Option<User>> {
        if let Some(profile) = self.profiles.read().await.get(token) {
            return Ok(Some(profile.clone()));
        }

        let profile = self.users.get(user_id).await?;
        if let Some(profile) = &profile {
            self.profiles
                .write()
                .await
                .insert(token.to_string(), profile.clone());
        }
        Ok(profile)
    }

    /// Resolve a bearer token into the active profile of its account
    ///
    /// A bad token is unauthorized; a missing or inactive profile is forbidden.
    pub async fn resolve(&self, token: &str) -> BackofficeResult<User> {
        let Some(session) = self.identity.session(token).await? else {
            return Err(AuthError::unauthorized("invalid or expired session").into());
        };

        let Some(profile) = self.profile(token, &session.user_id).await? else {
            return Err(BackofficeError::Auth(AuthError::forbidden(
                "no profile exists for this account",
            )));
        };

        if profile.status == Status::Inactive {
            return Err(AuthError::forbidden("this account is inactive").into());
        }

        Ok(profile)
    }

    /// Resolve an optional bearer token into an auth context; no token is anonymous
    pub async fn authenticate(&self, token: Option<&str>) -> BackofficeResult<AuthContext> {
        let Some(token) = token else {
            return Ok(AuthContext::Anonymous);
        };

        let profile = self.resolve(token).await?;
        Ok(AuthContext::User {
            user_id: profile.id,
            email: profile.email,
            name: profile.name,
            role: profile.role.as_str().to_string(),
        })
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    /// Number of cached profiles
    pub async fn cached(&self) -> usize {
        self.profiles.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::InMemoryIdentityProvider;
    use crate::core::events::RecordEvent;
    use crate::core::service::record_from_payload;
    use crate::storage::InMemoryDocumentStore;
    use serde_json::json;
    use std::time::Duration;

    async fn setup(status: &str) -> (SessionHook, Arc<InMemoryIdentityProvider>, String, Uuid) {
        setup_with_ttl(status, chrono::Duration::hours(8)).await
    }

    async fn setup_with_ttl(
        status: &str,
        ttl: chrono::Duration,
    ) -> (SessionHook, Arc<InMemoryIdentityProvider>, String, Uuid) {
        let identity = Arc::new(InMemoryIdentityProvider::new(ttl));
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());

        let account = identity.sign_up("ana@empresa.com", "s3cret-pass").await.unwrap();
        let profile: User = record_from_payload(
            json!({"name": "Ana", "email": "ana@empresa.com", "role": "operator", "status": status}),
            Some(account.id),
        )
        .unwrap();
        Collection::<User>::new(store.clone())
            .create(profile)
            .await
            .unwrap();

        let hook = SessionHook::new(identity.clone(), store);
        let session = identity.sign_in("ana@empresa.com", "s3cret-pass").await.unwrap();
        (hook, identity, session.token, account.id)
    }

    #[tokio::test]
    async fn test_anonymous_without_token() {
        let (hook, ..) = setup("active").await;
        assert_eq!(hook.authenticate(None).await.unwrap(), AuthContext::Anonymous);
    }

    #[tokio::test]
    async fn test_token_resolves_profile() {
        let (hook, _, token, user_id) = setup("active").await;
        let ctx = hook.authenticate(Some(&token)).await.unwrap();
        assert_eq!(ctx.user_id(), Some(user_id));
        assert_eq!(ctx.role(), Some("operator"));
        assert_eq!(hook.cached().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_token_unauthorized() {
        let (hook, ..) = setup("active").await;
        let err = hook.authenticate(Some("nope")).await.unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_inactive_profile_forbidden() {
        let (hook, _, token, _) = setup("inactive").await;
        let err = hook.authenticate(Some(&token)).await.unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_sign_out_and_profile_changes_evict_cache() {
        let (hook, identity, token, user_id) = setup("active").await;
        let bus = EventBus::new(16);
        let handle = hook.spawn(&bus);

        hook.authenticate(Some(&token)).await.unwrap();
        assert_eq!(hook.cached().await, 1);

        bus.publish(
            RecordEvent::StatusChanged {
                collection: "users".to_string(),
                record_ids: vec![user_id],
                status: Some(Status::Inactive),
            },
            None,
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hook.cached().await, 0);

        hook.authenticate(Some(&token)).await.unwrap();
        identity.sign_out(&token).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hook.cached().await, 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_expired_sessions_leave_the_cache_on_next_sign_in() {
        let (hook, identity, token, _) =
            setup_with_ttl("active", chrono::Duration::milliseconds(200)).await;
        let bus = EventBus::new(16);
        let handle = hook.spawn(&bus);

        hook.authenticate(Some(&token)).await.unwrap();
        assert_eq!(hook.cached().await, 1);

        tokio::time::sleep(Duration::from_millis(250)).await;
        let fresh = identity.sign_in("ana@empresa.com", "s3cret-pass").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(hook.cached().await, 1);
        assert!(hook.profiles.read().await.contains_key(&fresh.token));

        handle.abort();
    }
}

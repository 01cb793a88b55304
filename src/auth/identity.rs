//! Identity provider: accounts, password sign-in and bearer sessions

use crate::core::error::AuthError;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

/// A sign-in account (the profile lives in the users collection)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Session lifecycle notifications
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut { token: String, user_id: Uuid },
}

/// Managed authentication backend
///
/// Errors are [`AuthError`]s wrapped in `anyhow`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account; fails when the e-mail is taken
    async fn sign_up(&self, email: &str, password: &str) -> Result<Account>;

    /// Check credentials and open a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Close a session; unknown tokens are ignored
    async fn sign_out(&self, token: &str) -> Result<()>;

    /// Resolve a bearer token to a live session
    async fn session(&self, token: &str) -> Result<Option<Session>>;

    /// Remove an account and all of its sessions
    async fn delete_account(&self, user_id: &Uuid) -> Result<()>;

    /// Stream of sign-in/sign-out events from now on
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

struct StoredAccount {
    account: Account,
    salt: String,
    password_hash: String,
}

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Random 32-byte hex token
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// In-memory identity provider for development and tests
///
/// Passwords are stored as salted SHA-256 digests; sessions expire after the
/// configured TTL.
#[derive(Clone)]
pub struct InMemoryIdentityProvider {
    accounts: Arc<RwLock<HashMap<Uuid, StoredAccount>>>,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    session_ttl: Duration,
    events: broadcast::Sender<SessionEvent>,
}

impl InMemoryIdentityProvider {
    pub fn new(session_ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_ttl,
            events,
        }
    }
}

impl InMemoryIdentityProvider {
    /// Drop sessions past their expiry that were never presented again
    fn purge_expired(&self) -> Result<()> {
        let expired: Vec<Session> = {
            let mut sessions = self
                .sessions
                .write()
                .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
            let tokens: Vec<String> = sessions
                .values()
                .filter(|s| s.is_expired())
                .map(|s| s.token.clone())
                .collect();
            tokens
                .iter()
                .filter_map(|token| sessions.remove(token))
                .collect()
        };

        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "purged expired sessions");
        }
        for session in expired {
            let _ = self.events.send(SessionEvent::SignedOut {
                token: session.token,
                user_id: session.user_id,
            });
        }
        Ok(())
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new(Duration::hours(8))
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Account> {
        let email = normalize_email(email);
        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if accounts.values().any(|a| a.account.email == email) {
            return Err(AuthError::EmailInUse { email }.into());
        }

        let salt = generate_token();
        let account = Account {
            id: Uuid::new_v4(),
            email,
            created_at: Utc::now(),
        };
        accounts.insert(
            account.id,
            StoredAccount {
                account: account.clone(),
                password_hash: hash_password(&salt, password),
                salt,
            },
        );

        tracing::info!(user_id = %account.id, email = %account.email, "account created");
        Ok(account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email);
        let account = {
            let accounts = self
                .accounts
                .read()
                .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
            accounts
                .values()
                .find(|a| {
                    a.account.email == email
                        && hash_password(&a.salt, password) == a.password_hash
                })
                .map(|a| a.account.clone())
        };
        let Some(account) = account else {
            tracing::warn!(email = %email, "sign-in rejected");
            return Err(AuthError::InvalidCredentials.into());
        };

        self.purge_expired()?;

        let session = Session {
            token: generate_token(),
            user_id: account.id,
            email: account.email,
            expires_at: Utc::now() + self.session_ttl,
        };
        self.sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?
            .insert(session.token.clone(), session.clone());

        let _ = self.events.send(SessionEvent::SignedIn(session.clone()));
        tracing::info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        let removed = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?
            .remove(token);

        if let Some(session) = removed {
            let _ = self.events.send(SessionEvent::SignedOut {
                token: session.token,
                user_id: session.user_id,
            });
            tracing::info!(user_id = %session.user_id, "signed out");
        }
        Ok(())
    }

    async fn session(&self, token: &str) -> Result<Option<Session>> {
        let session = self
            .sessions
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?
            .get(token)
            .cloned();

        match session {
            Some(session) if session.is_expired() => {
                self.sign_out(token).await?;
                Err(AuthError::SessionExpired.into())
            }
            other => Ok(other),
        }
    }

    async fn delete_account(&self, user_id: &Uuid) -> Result<()> {
        self.accounts
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?
            .remove(user_id);

        let tokens: Vec<String> = self
            .sessions
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?
            .values()
            .filter(|s| s.user_id == *user_id)
            .map(|s| s.token.clone())
            .collect();
        for token in tokens {
            self.sign_out(&token).await?;
        }

        tracing::info!(user_id = %user_id, "account deleted");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

//! In-memory mocks and fixtures shared by unit tests.
//!
//! The storage mocks back their traits with `RwLock<HashMap>` so tests can
//! run without a database. Consume semantics mirror the real backends:
//! removing an entry under the write lock is atomic, which is what the
//! single-use guarantees in the ledgers rely on.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::identity::IdentityProvider;
use crate::storage::{
    AccessTokenStorage, AuthorizationCodeStorage, ClientStorage, RefreshTokenStorage,
};
use crate::types::{AccessToken, AuthorizationCode, Client, GrantType, RefreshToken, User, UserRole};

// ===== Fixtures =====

/// Builds an active client with all three grant types, one registered
/// redirect URI, and `read write` allowed scopes.
pub(crate) fn make_client(client_id: &str) -> Client {
    Client {
        client_id: client_id.to_string(),
        secret_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        name: "Test Client".to_string(),
        redirect_uris: vec!["https://app.example.com/callback".to_string()],
        allowed_scopes: vec!["read".to_string(), "write".to_string()],
        grant_types: vec![
            GrantType::AuthorizationCode,
            GrantType::RefreshToken,
            GrantType::Password,
        ],
        owner_user_id: None,
        active: true,
        created_at: OffsetDateTime::now_utc(),
    }
}

/// Builds an active user.
pub(crate) fn make_user() -> User {
    User {
        id: Uuid::new_v4(),
        email: "alice@example.com".to_string(),
        first_name: "Alice".to_string(),
        last_name: "Example".to_string(),
        role: UserRole::User,
        active: true,
    }
}

// ===== Client storage =====

pub(crate) struct MockClientStorage {
    clients: RwLock<HashMap<String, (Client, String)>>, // client_id -> (client, secret)
}

impl MockClientStorage {
    pub(crate) fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn add_client(&self, client: Client, secret: &str) {
        self.clients
            .write()
            .unwrap()
            .insert(client.client_id.clone(), (client, secret.to_string()));
    }
}

#[async_trait]
impl ClientStorage for MockClientStorage {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self
            .clients
            .read()
            .unwrap()
            .get(client_id)
            .map(|(c, _)| c.clone()))
    }

    async fn create(&self, client: &Client) -> AuthResult<Client> {
        self.add_client(client.clone(), "");
        Ok(client.clone())
    }

    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
        Ok(self
            .clients
            .read()
            .unwrap()
            .get(client_id)
            .map(|(_, s)| s == secret)
            .unwrap_or(false))
    }
}

// ===== Authorization code storage =====

pub(crate) struct MockAuthorizationCodeStorage {
    codes: RwLock<HashMap<String, AuthorizationCode>>,
}

impl MockAuthorizationCodeStorage {
    pub(crate) fn new() -> Self {
        Self {
            codes: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.codes.read().unwrap().len()
    }

    /// Overwrites a stored row, e.g. to backdate its expiry.
    pub(crate) fn replace(&self, code: AuthorizationCode) {
        self.codes
            .write()
            .unwrap()
            .insert(code.code.clone(), code);
    }
}

#[async_trait]
impl AuthorizationCodeStorage for MockAuthorizationCodeStorage {
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()> {
        self.codes
            .write()
            .unwrap()
            .insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        // remove() under the write lock is the atomic read-and-delete
        Ok(self.codes.write().unwrap().remove(code))
    }

    async fn delete(&self, code: &str) -> AuthResult<bool> {
        Ok(self.codes.write().unwrap().remove(code).is_some())
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let mut codes = self.codes.write().unwrap();
        let before = codes.len();
        codes.retain(|_, c| !c.is_expired());
        Ok((before - codes.len()) as u64)
    }
}

// ===== Access token storage =====

pub(crate) struct MockAccessTokenStorage {
    tokens: RwLock<HashMap<String, AccessToken>>, // token_hash -> token
}

impl MockAccessTokenStorage {
    pub(crate) fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.read().unwrap().len()
    }

    /// Overwrites a stored row, e.g. to backdate its expiry.
    pub(crate) fn replace(&self, token: AccessToken) {
        self.tokens
            .write()
            .unwrap()
            .insert(token.token_hash.clone(), token);
    }
}

#[async_trait]
impl AccessTokenStorage for MockAccessTokenStorage {
    async fn upsert(&self, token: &AccessToken) -> AuthResult<()> {
        self.tokens
            .write()
            .unwrap()
            .insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<AccessToken>> {
        Ok(self.tokens.read().unwrap().get(token_hash).cloned())
    }

    async fn delete_by_hash(&self, token_hash: &str) -> AuthResult<bool> {
        Ok(self.tokens.write().unwrap().remove(token_hash).is_some())
    }

    async fn delete_for_owner(&self, client_id: &str, user_id: Uuid) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().unwrap();
        let before = tokens.len();
        tokens.retain(|_, t| !(t.client_id == client_id && t.user_id == Some(user_id)));
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().unwrap();
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired());
        Ok((before - tokens.len()) as u64)
    }
}

// ===== Refresh token storage =====

pub(crate) struct MockRefreshTokenStorage {
    tokens: RwLock<HashMap<String, RefreshToken>>, // token_hash -> token
    fail_upserts: AtomicBool,
}

impl MockRefreshTokenStorage {
    pub(crate) fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            fail_upserts: AtomicBool::new(false),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.read().unwrap().len()
    }

    /// Overwrites a stored row, e.g. to backdate its expiry.
    pub(crate) fn replace(&self, token: RefreshToken) {
        self.tokens
            .write()
            .unwrap()
            .insert(token.token_hash.clone(), token);
    }

    /// Makes subsequent `upsert` calls fail with a storage error.
    pub(crate) fn set_fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RefreshTokenStorage for MockRefreshTokenStorage {
    async fn upsert(&self, token: &RefreshToken) -> AuthResult<()> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(AuthError::storage("refresh token upsert failed"));
        }
        self.tokens
            .write()
            .unwrap()
            .insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.tokens.read().unwrap().get(token_hash).cloned())
    }

    async fn delete_by_hash(&self, token_hash: &str) -> AuthResult<bool> {
        Ok(self.tokens.write().unwrap().remove(token_hash).is_some())
    }

    async fn delete_for_owner(&self, client_id: &str, user_id: Uuid) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().unwrap();
        let before = tokens.len();
        tokens.retain(|_, t| !(t.client_id == client_id && t.user_id == Some(user_id)));
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().unwrap();
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired());
        Ok((before - tokens.len()) as u64)
    }
}

// ===== Identity provider =====

pub(crate) struct MockIdentityProvider {
    users: RwLock<HashMap<String, (String, User)>>, // username -> (password, user)
}

impl MockIdentityProvider {
    pub(crate) fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn add_user(&self, user: User, password: &str) {
        self.users
            .write()
            .unwrap()
            .insert(user.email.clone(), (password.to_string(), user));
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<User> {
        let users = self.users.read().unwrap();
        match users.get(username) {
            Some((stored, user)) if stored == password && user.active => Ok(user.clone()),
            _ => Err(AuthError::unauthenticated("Invalid username or password")),
        }
    }

    async fn find_user(&self, user_id: Uuid) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|(_, u)| u.id == user_id)
            .map(|(_, u)| u.clone()))
    }
}

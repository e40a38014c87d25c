//! Token service.
//!
//! This module implements the three token-endpoint grant flows against the
//! code and token ledgers:
//!
//! - `authorization_code` - exchange a single-use code for a token pair
//! - `refresh_token` - mint a new access token from a refresh token
//! - `password` - resource owner credentials, checked by the identity
//!   collaborator
//!
//! It also exposes [`TokenService::verify_bearer`], the scope-checked
//! bearer validation used by the introspection endpoint and by
//! resource-protection middleware.
//!
//! All state is per-request; every flow either persists a complete token
//! pair or nothing.

use std::sync::Arc;

use tracing::{error, warn};

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::identity::IdentityProvider;
use crate::oauth::codes::CodeLedger;
use crate::scope;
use crate::token::ledger::{TokenLedger, TokenPair};
use crate::token::types::{TokenRequest, TokenResponse};
use crate::types::{AccessToken, Client, GrantType};

/// Token service implementing the token-endpoint grant flows.
///
/// Callers authenticate the client first (see
/// [`crate::oauth::authenticate_client`]) and pass the resolved [`Client`]
/// into each flow.
pub struct TokenService {
    /// Ledger of live authorization codes.
    codes: Arc<CodeLedger>,

    /// Ledger of live access and refresh tokens.
    tokens: Arc<TokenLedger>,

    /// Identity collaborator for the password grant.
    identity: Arc<dyn IdentityProvider>,

    /// Service configuration.
    config: AuthConfig,
}

impl TokenService {
    /// Creates a new token service.
    ///
    /// # Arguments
    ///
    /// * `codes` - Ledger of live authorization codes
    /// * `tokens` - Ledger of live access and refresh tokens
    /// * `identity` - Identity collaborator for the password grant
    /// * `config` - Service configuration
    #[must_use]
    pub fn new(
        codes: Arc<CodeLedger>,
        tokens: Arc<TokenLedger>,
        identity: Arc<dyn IdentityProvider>,
        config: AuthConfig,
    ) -> Self {
        Self {
            codes,
            tokens,
            identity,
            config,
        }
    }

    /// Exchanges an authorization code for a token pair.
    ///
    /// The code is consumed before any further checking, so a failed
    /// exchange still spends it; retrying with the same code yields
    /// `CodeNotFound`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client does not allow the authorization_code grant
    ///   (`UnsupportedGrantType`)
    /// - `code` or `redirect_uri` is missing (`InvalidRequest`)
    /// - No live code exists for the value, or the code belongs to a
    ///   different client (`CodeNotFound`, indistinguishable on purpose)
    /// - The code expired before the exchange (`CodeExpired`)
    /// - `redirect_uri` differs from the one the code was issued for
    ///   (`InvalidRequest`; the code is already spent)
    /// - No requested scope token is covered by the code (`InvalidScope`)
    pub async fn exchange_code(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        // 1. Validate grant type is allowed for this client
        if !client.is_grant_type_allowed(GrantType::AuthorizationCode) {
            return Err(AuthError::unsupported_grant_type(
                GrantType::AuthorizationCode.as_str(),
            ));
        }

        // 2. Validate required parameters
        let code_value = request
            .code
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("Missing required parameter: code"))?;
        let redirect_uri = request.redirect_uri.as_deref().ok_or_else(|| {
            AuthError::invalid_request("Missing required parameter: redirect_uri")
        })?;

        // 3. Consume the code before any further validation; later
        //    failures must still leave it spent
        let code = self.codes.consume(code_value).await?;

        // 4. The code must belong to the authenticated client. Reported as
        //    CodeNotFound so another client cannot probe code ownership.
        if code.client_id != client.client_id {
            warn!(
                client_id = %client.client_id,
                code_client_id = %code.client_id,
                "Authorization code presented by a different client"
            );
            return Err(AuthError::CodeNotFound);
        }

        // 5. The exchange redirect_uri must match the issuance one exactly
        if code.redirect_uri != redirect_uri {
            return Err(AuthError::invalid_request(
                "redirect_uri does not match the authorization request",
            ));
        }

        // 6. Re-negotiate scope over what the code carries
        let allowed = code
            .scope
            .as_deref()
            .map(scope::split)
            .unwrap_or_default();
        let requested = request.scope.as_deref().filter(|s| !s.trim().is_empty());
        let granted = match requested {
            Some(requested) => {
                let granted = scope::negotiate(requested, &allowed);
                if granted.is_empty() {
                    return Err(AuthError::invalid_scope(
                        "No requested scope is covered by the authorization code",
                    ));
                }
                Some(granted.join(" "))
            }
            None => code.scope.clone(),
        };

        // 7. Issue the pair, bound to the user the code was issued for
        let pair = self.tokens.issue_pair(client, code.user_id, granted).await?;

        Ok(pair_response(pair))
    }

    /// Mints a new access token from a refresh token.
    ///
    /// The requested scope may narrow the originally granted one but never
    /// widen it. Whether the refresh token itself is rotated follows
    /// `rotate_refresh_tokens`; when off, the presented token stays valid
    /// and is echoed back.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client does not allow the refresh_token grant
    ///   (`UnsupportedGrantType`)
    /// - `refresh_token` is missing (`InvalidRequest`)
    /// - No live token exists for the value, or it belongs to a different
    ///   client (`TokenNotFound`)
    /// - The token expired (`TokenExpired`; tokens without an expiry never
    ///   do)
    /// - The requested scope exceeds the stored one (`InsufficientScope`)
    pub async fn refresh(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        // 1. Validate grant type is allowed for this client
        if !client.is_grant_type_allowed(GrantType::RefreshToken) {
            return Err(AuthError::unsupported_grant_type(
                GrantType::RefreshToken.as_str(),
            ));
        }

        // 2. Validate required parameters
        let presented = request.refresh_token.as_deref().ok_or_else(|| {
            AuthError::invalid_request("Missing required parameter: refresh_token")
        })?;

        // 3. Look up the stored token
        let stored = self
            .tokens
            .lookup_refresh_token(presented)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        // 4. The token must belong to the authenticated client
        if stored.client_id != client.client_id {
            warn!(
                client_id = %client.client_id,
                token_client_id = %stored.client_id,
                "Refresh token presented by a different client"
            );
            return Err(AuthError::TokenNotFound);
        }

        // 5. Expiry; an absent expires_at never expires
        if stored.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        // 6. Scope may narrow but never widen the original grant
        let requested = request.scope.as_deref().filter(|s| !s.trim().is_empty());
        let granted = match requested {
            Some(requested) => {
                let stored_scope = stored.scope.as_deref().unwrap_or("");
                if !scope::is_satisfied_by(stored_scope, requested) {
                    return Err(AuthError::insufficient_scope(
                        "Requested scope exceeds the originally granted scope",
                    ));
                }
                Some(scope::split(requested).join(" "))
            }
            None => stored.scope.clone(),
        };

        // 7. Issue the new access token
        let (access_token, access) = self
            .tokens
            .issue_access_token(client, stored.user_id, granted.clone())
            .await?;

        // 8. Rotate the refresh token if configured; the old row is only
        //    revoked once the replacement is persisted
        let refresh_token = if self.config.rotate_refresh_tokens {
            let (new_refresh, _) = match self
                .tokens
                .issue_refresh_token(client, stored.user_id, granted)
                .await
            {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(
                        client_id = %client.client_id,
                        access_token_id = %access.id,
                        "Rotated refresh token persistence failed; revoking new access token"
                    );
                    if let Err(revoke_err) = self.tokens.revoke_access_token(&access_token).await
                    {
                        error!(
                            access_token_id = %access.id,
                            error = %revoke_err,
                            "Failed to revoke access token after rotation failure"
                        );
                    }
                    return Err(e);
                }
            };
            self.tokens.revoke_refresh_token(presented).await?;
            new_refresh
        } else {
            presented.to_string()
        };

        let mut response = TokenResponse::new(access_token, access.expires_in_secs());
        if let Some(scope) = access.scope {
            response = response.with_scope(scope);
        }
        Ok(response.with_refresh_token(refresh_token))
    }

    /// Issues a token pair from resource owner credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client does not allow the password grant
    ///   (`UnsupportedGrantType`)
    /// - `username` or `password` is missing (`InvalidRequest`)
    /// - The identity collaborator rejects the credentials
    ///   (`Unauthenticated`)
    /// - No requested scope token is allowed for the client (`InvalidScope`)
    pub async fn password(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        // 1. Validate grant type is allowed for this client
        if !client.is_grant_type_allowed(GrantType::Password) {
            return Err(AuthError::unsupported_grant_type(
                GrantType::Password.as_str(),
            ));
        }

        // 2. Validate required parameters
        let username = request
            .username
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("Missing required parameter: username"))?;
        let password = request
            .password
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("Missing required parameter: password"))?;

        // 3. Delegate the credential check to the identity collaborator
        let user = self.identity.authenticate(username, password).await?;

        // 4. Negotiate scope against the client's allowed set
        let requested = request.scope.as_deref().filter(|s| !s.trim().is_empty());
        let granted = match requested {
            Some(requested) => {
                let granted = scope::negotiate(requested, &client.allowed_scopes);
                if granted.is_empty() {
                    return Err(AuthError::invalid_scope(
                        "No requested scope is allowed for this client",
                    ));
                }
                Some(granted.join(" "))
            }
            None => None,
        };

        // 5. Issue the pair, bound to the authenticated user
        let pair = self.tokens.issue_pair(client, Some(user.id), granted).await?;

        Ok(pair_response(pair))
    }

    /// Validates a bearer access token, optionally against a required scope.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No live token exists for the value (`TokenNotFound`)
    /// - The token expired (`TokenExpired`)
    /// - A required scope is given and the token does not satisfy it;
    ///   a token without any scope satisfies nothing (`InsufficientScope`)
    pub async fn verify_bearer(
        &self,
        token: &str,
        required_scope: Option<&str>,
    ) -> AuthResult<AccessToken> {
        let stored = self
            .tokens
            .lookup_access_token(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if stored.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        if let Some(required) = required_scope
            && !scope::verify_scope(stored.scope.as_deref(), required)
        {
            return Err(AuthError::insufficient_scope(format!(
                "Token does not satisfy required scope '{required}'"
            )));
        }

        Ok(stored)
    }
}

/// Builds the RFC 6749 response body from a freshly issued pair.
fn pair_response(pair: TokenPair) -> TokenResponse {
    let mut response = TokenResponse::new(pair.access_token, pair.access.expires_in_secs());
    if let Some(scope) = pair.access.scope {
        response = response.with_scope(scope);
    }
    response.with_refresh_token(pair.refresh_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::authorize::AuthorizationRequest;
    use crate::oauth::service::AuthorizationService;
    use crate::testing::{
        MockAccessTokenStorage, MockAuthorizationCodeStorage, MockClientStorage,
        MockIdentityProvider, MockRefreshTokenStorage, make_client, make_user,
    };
    use crate::types::{RefreshToken, User, hash_token};
    use time::OffsetDateTime;
    use uuid::Uuid;

    struct Fixture {
        clients: Arc<MockClientStorage>,
        identity: Arc<MockIdentityProvider>,
        access: Arc<MockAccessTokenStorage>,
        refresh: Arc<MockRefreshTokenStorage>,
        authorization: AuthorizationService,
        service: TokenService,
    }

    fn make_fixture(config: AuthConfig) -> Fixture {
        let clients = Arc::new(MockClientStorage::new());
        let identity = Arc::new(MockIdentityProvider::new());
        let access = Arc::new(MockAccessTokenStorage::new());
        let refresh = Arc::new(MockRefreshTokenStorage::new());

        let codes = Arc::new(CodeLedger::new(
            Arc::new(MockAuthorizationCodeStorage::new()),
            config.authorization_code_lifetime,
        ));
        let tokens = Arc::new(TokenLedger::new(
            access.clone(),
            refresh.clone(),
            config.clone(),
        ));

        let authorization =
            AuthorizationService::new(clients.clone(), identity.clone(), codes.clone());
        let service = TokenService::new(codes, tokens, identity.clone(), config);

        Fixture {
            clients,
            identity,
            access,
            refresh,
            authorization,
            service,
        }
    }

    fn default_fixture() -> Fixture {
        make_fixture(AuthConfig::default())
    }

    /// Runs the /authorize half of the flow and returns the issued code.
    async fn authorize(fx: &Fixture, client_id: &str, scope: Option<&str>) -> String {
        let request = AuthorizationRequest {
            response_type: "code".to_string(),
            client_id: client_id.to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scope: scope.map(str::to_string),
            state: None,
        };
        fx.authorization
            .authorize(&request, None)
            .await
            .unwrap()
            .code
    }

    fn exchange_request(code: &str, redirect_uri: &str) -> TokenRequest {
        TokenRequest {
            grant_type: "authorization_code".to_string(),
            code: Some(code.to_string()),
            redirect_uri: Some(redirect_uri.to_string()),
            client_id: None,
            client_secret: None,
            refresh_token: None,
            scope: None,
            username: None,
            password: None,
        }
    }

    fn refresh_request(token: &str, scope: Option<&str>) -> TokenRequest {
        TokenRequest {
            grant_type: "refresh_token".to_string(),
            code: None,
            redirect_uri: None,
            client_id: None,
            client_secret: None,
            refresh_token: Some(token.to_string()),
            scope: scope.map(str::to_string),
            username: None,
            password: None,
        }
    }

    fn password_request(username: &str, password: &str, scope: Option<&str>) -> TokenRequest {
        TokenRequest {
            grant_type: "password".to_string(),
            code: None,
            redirect_uri: None,
            client_id: None,
            client_secret: None,
            refresh_token: None,
            scope: scope.map(str::to_string),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    /// Seeds a user and returns a refresh token stored for them, bypassing
    /// the flows, so expiry and scope can be set directly.
    fn seed_refresh_token(
        fx: &Fixture,
        client_id: &str,
        user: &User,
        scope: Option<&str>,
        expires_at: Option<OffsetDateTime>,
    ) -> String {
        let plaintext = crate::types::generate_token();
        fx.refresh.replace(RefreshToken {
            id: Uuid::new_v4(),
            token_hash: hash_token(&plaintext),
            client_id: client_id.to_string(),
            user_id: Some(user.id),
            scope: scope.map(str::to_string),
            created_at: OffsetDateTime::now_utc(),
            expires_at,
        });
        plaintext
    }

    // ===== authorization_code exchange =====

    #[tokio::test]
    async fn test_full_authorization_code_flow() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");

        // c1 allows "read write"; the request asks for more
        let code = authorize(&fx, "c1", Some("read write delete")).await;

        let response = fx
            .service
            .exchange_code(&exchange_request(&code, "https://app.example.com/callback"), &client)
            .await
            .unwrap();

        assert_eq!(response.scope.as_deref(), Some("read write"));
        assert_eq!(response.token_type, "Bearer");
        assert!(response.refresh_token.is_some());
        assert!(response.expires_in > 0);

        // The bearer token is live and carries the negotiated scope
        let verified = fx
            .service
            .verify_bearer(&response.access_token, Some("read"))
            .await
            .unwrap();
        assert_eq!(verified.scope.as_deref(), Some("read write"));

        // The code is spent; a second exchange cannot tell it from a
        // guessed value
        let second = fx
            .service
            .exchange_code(&exchange_request(&code, "https://app.example.com/callback"), &client)
            .await;
        assert!(matches!(second, Err(AuthError::CodeNotFound)));
    }

    #[tokio::test]
    async fn test_exchange_requires_grant_type() {
        let fx = default_fixture();
        let mut client = make_client("c1");
        client.grant_types = vec![GrantType::Password];
        fx.clients.add_client(client.clone(), "secret");

        let result = fx
            .service
            .exchange_code(&exchange_request("whatever", "https://app.example.com/callback"), &client)
            .await;
        assert!(matches!(result, Err(AuthError::UnsupportedGrantType { .. })));
    }

    #[tokio::test]
    async fn test_exchange_missing_parameters() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");

        let mut request = exchange_request("code", "https://app.example.com/callback");
        request.code = None;
        let result = fx.service.exchange_code(&request, &client).await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));

        let mut request = exchange_request("code", "https://app.example.com/callback");
        request.redirect_uri = None;
        let result = fx.service.exchange_code(&request, &client).await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_exchange_unknown_code() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");

        let result = fx
            .service
            .exchange_code(
                &exchange_request("not-a-real-code", "https://app.example.com/callback"),
                &client,
            )
            .await;
        assert!(matches!(result, Err(AuthError::CodeNotFound)));
    }

    #[tokio::test]
    async fn test_exchange_by_wrong_client_spends_the_code() {
        let fx = default_fixture();
        let c1 = make_client("c1");
        let mut c2 = make_client("c2");
        c2.redirect_uris = c1.redirect_uris.clone();
        fx.clients.add_client(c1.clone(), "secret");
        fx.clients.add_client(c2.clone(), "secret");

        let code = authorize(&fx, "c1", Some("read")).await;

        // c2 presents c1's code: reported exactly like a guessed value
        let result = fx
            .service
            .exchange_code(&exchange_request(&code, "https://app.example.com/callback"), &c2)
            .await;
        assert!(matches!(result, Err(AuthError::CodeNotFound)));

        // The attempt consumed the code, so the rightful client loses too
        let result = fx
            .service
            .exchange_code(&exchange_request(&code, "https://app.example.com/callback"), &c1)
            .await;
        assert!(matches!(result, Err(AuthError::CodeNotFound)));
    }

    #[tokio::test]
    async fn test_exchange_redirect_mismatch_spends_the_code() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");

        let code = authorize(&fx, "c1", Some("read")).await;

        let result = fx
            .service
            .exchange_code(
                &exchange_request(&code, "https://app.example.com/other"),
                &client,
            )
            .await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));

        // The failed exchange still consumed the code
        let retry = fx
            .service
            .exchange_code(&exchange_request(&code, "https://app.example.com/callback"), &client)
            .await;
        assert!(matches!(retry, Err(AuthError::CodeNotFound)));
    }

    #[tokio::test]
    async fn test_exchange_narrows_scope_on_request() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");

        let code = authorize(&fx, "c1", Some("read write")).await;

        let mut request = exchange_request(&code, "https://app.example.com/callback");
        request.scope = Some("read admin".to_string());

        // Tokens outside the code's scope are dropped, not granted
        let response = fx.service.exchange_code(&request, &client).await.unwrap();
        assert_eq!(response.scope.as_deref(), Some("read"));
    }

    #[tokio::test]
    async fn test_exchange_rejects_uncovered_scope() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");

        let code = authorize(&fx, "c1", Some("read")).await;

        let mut request = exchange_request(&code, "https://app.example.com/callback");
        request.scope = Some("write".to_string());

        let result = fx.service.exchange_code(&request, &client).await;
        assert!(matches!(result, Err(AuthError::InvalidScope { .. })));
    }

    #[tokio::test]
    async fn test_exchange_scopeless_code_issues_scopeless_tokens() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");

        let code = authorize(&fx, "c1", None).await;

        let response = fx
            .service
            .exchange_code(&exchange_request(&code, "https://app.example.com/callback"), &client)
            .await
            .unwrap();
        assert!(response.scope.is_none());
    }

    // ===== refresh_token =====

    #[tokio::test]
    async fn test_refresh_issues_new_access_token() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");
        let user = make_user();

        let token = seed_refresh_token(&fx, "c1", &user, Some("read write"), None);

        let response = fx
            .service
            .refresh(&refresh_request(&token, None), &client)
            .await
            .unwrap();

        // Stored scope flows through; the same refresh token is echoed
        assert_eq!(response.scope.as_deref(), Some("read write"));
        assert_eq!(response.refresh_token.as_deref(), Some(token.as_str()));

        let verified = fx
            .service
            .verify_bearer(&response.access_token, None)
            .await
            .unwrap();
        assert_eq!(verified.user_id, Some(user.id));
    }

    #[tokio::test]
    async fn test_refresh_never_escalates_scope() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");
        let user = make_user();

        let token = seed_refresh_token(&fx, "c1", &user, Some("read write"), None);

        let result = fx
            .service
            .refresh(&refresh_request(&token, Some("read write delete")), &client)
            .await;
        assert!(matches!(result, Err(AuthError::InsufficientScope { .. })));

        // Narrowing is allowed
        let response = fx
            .service
            .refresh(&refresh_request(&token, Some("read")), &client)
            .await
            .unwrap();
        assert_eq!(response.scope.as_deref(), Some("read"));
    }

    #[tokio::test]
    async fn test_refresh_unknown_token() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");

        let result = fx
            .service
            .refresh(&refresh_request("no-such-token", None), &client)
            .await;
        assert!(matches!(result, Err(AuthError::TokenNotFound)));
    }

    #[tokio::test]
    async fn test_refresh_token_of_other_client() {
        let fx = default_fixture();
        let c1 = make_client("c1");
        let c2 = make_client("c2");
        fx.clients.add_client(c1.clone(), "secret");
        fx.clients.add_client(c2.clone(), "secret");
        let user = make_user();

        let token = seed_refresh_token(&fx, "c1", &user, None, None);

        let result = fx
            .service
            .refresh(&refresh_request(&token, None), &c2)
            .await;
        assert!(matches!(result, Err(AuthError::TokenNotFound)));
    }

    #[tokio::test]
    async fn test_refresh_expiry_only_applies_when_set() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");
        let user = make_user();

        // A token without an expiry keeps working
        let eternal = seed_refresh_token(&fx, "c1", &user, None, None);
        assert!(
            fx.service
                .refresh(&refresh_request(&eternal, None), &client)
                .await
                .is_ok()
        );

        // A token with a past expiry is rejected
        let expired = seed_refresh_token(
            &fx,
            "c1",
            &user,
            None,
            Some(OffsetDateTime::now_utc() - time::Duration::seconds(1)),
        );
        let result = fx
            .service
            .refresh(&refresh_request(&expired, None), &client)
            .await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_refresh_without_rotation_keeps_token_valid() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");
        let user = make_user();

        let token = seed_refresh_token(&fx, "c1", &user, None, None);

        fx.service
            .refresh(&refresh_request(&token, None), &client)
            .await
            .unwrap();

        // Reuse succeeds: rotation is off by default
        assert!(
            fx.service
                .refresh(&refresh_request(&token, None), &client)
                .await
                .is_ok()
        );
        assert_eq!(fx.refresh.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_with_rotation_replaces_token() {
        let config = AuthConfig {
            rotate_refresh_tokens: true,
            ..AuthConfig::default()
        };
        let fx = make_fixture(config);
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");
        let user = make_user();

        let token = seed_refresh_token(&fx, "c1", &user, Some("read"), None);

        let response = fx
            .service
            .refresh(&refresh_request(&token, None), &client)
            .await
            .unwrap();

        let rotated = response.refresh_token.unwrap();
        assert_ne!(rotated, token);

        // The old token is revoked, the new one works
        let result = fx
            .service
            .refresh(&refresh_request(&token, None), &client)
            .await;
        assert!(matches!(result, Err(AuthError::TokenNotFound)));
        assert!(
            fx.service
                .refresh(&refresh_request(&rotated, None), &client)
                .await
                .is_ok()
        );
    }

    // ===== password =====

    #[tokio::test]
    async fn test_password_grant_issues_user_bound_pair() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");
        let user = make_user();
        fx.identity.add_user(user.clone(), "hunter2");

        let response = fx
            .service
            .password(
                &password_request("alice@example.com", "hunter2", Some("read delete")),
                &client,
            )
            .await
            .unwrap();

        // "delete" is not allowed for the client and is dropped
        assert_eq!(response.scope.as_deref(), Some("read"));
        assert!(response.refresh_token.is_some());

        let verified = fx
            .service
            .verify_bearer(&response.access_token, None)
            .await
            .unwrap();
        assert_eq!(verified.user_id, Some(user.id));
    }

    #[tokio::test]
    async fn test_password_grant_rejects_bad_credentials() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");
        let user = make_user();
        fx.identity.add_user(user, "hunter2");

        let result = fx
            .service
            .password(
                &password_request("alice@example.com", "wrong", None),
                &client,
            )
            .await;
        assert!(matches!(result, Err(AuthError::Unauthenticated { .. })));

        // No tokens were persisted for the failed attempt
        assert_eq!(fx.access.len(), 0);
        assert_eq!(fx.refresh.len(), 0);
    }

    #[tokio::test]
    async fn test_password_grant_missing_parameters() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");

        let mut request = password_request("alice@example.com", "hunter2", None);
        request.password = None;
        let result = fx.service.password(&request, &client).await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_password_grant_requires_grant_type() {
        let fx = default_fixture();
        let mut client = make_client("c1");
        client.grant_types = vec![GrantType::AuthorizationCode];
        fx.clients.add_client(client.clone(), "secret");

        let result = fx
            .service
            .password(&password_request("alice@example.com", "hunter2", None), &client)
            .await;
        assert!(matches!(result, Err(AuthError::UnsupportedGrantType { .. })));
    }

    // ===== verify_bearer =====

    #[tokio::test]
    async fn test_verify_bearer_scope_checks() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");
        let user = make_user();
        fx.identity.add_user(user, "hunter2");

        let response = fx
            .service
            .password(
                &password_request("alice@example.com", "hunter2", Some("read write")),
                &client,
            )
            .await
            .unwrap();
        let token = response.access_token;

        // Covered scopes pass, in any combination
        assert!(fx.service.verify_bearer(&token, Some("read")).await.is_ok());
        assert!(
            fx.service
                .verify_bearer(&token, Some("write read"))
                .await
                .is_ok()
        );

        // One uncovered token fails the whole check
        let result = fx
            .service
            .verify_bearer(&token, Some("read write delete"))
            .await;
        assert!(matches!(result, Err(AuthError::InsufficientScope { .. })));
    }

    #[tokio::test]
    async fn test_verify_bearer_fails_closed_on_scopeless_token() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");

        let code = authorize(&fx, "c1", None).await;
        let response = fx
            .service
            .exchange_code(&exchange_request(&code, "https://app.example.com/callback"), &client)
            .await
            .unwrap();

        // No required scope: the token itself is fine
        assert!(
            fx.service
                .verify_bearer(&response.access_token, None)
                .await
                .is_ok()
        );

        // Any required scope fails against a scopeless token
        let result = fx
            .service
            .verify_bearer(&response.access_token, Some("read"))
            .await;
        assert!(matches!(result, Err(AuthError::InsufficientScope { .. })));
    }

    #[tokio::test]
    async fn test_verify_bearer_unknown_and_expired() {
        let fx = default_fixture();
        let client = make_client("c1");
        fx.clients.add_client(client.clone(), "secret");

        let result = fx.service.verify_bearer("no-such-token", None).await;
        assert!(matches!(result, Err(AuthError::TokenNotFound)));

        let code = authorize(&fx, "c1", Some("read")).await;
        let response = fx
            .service
            .exchange_code(&exchange_request(&code, "https://app.example.com/callback"), &client)
            .await
            .unwrap();

        // Backdate the stored expiry
        let mut stored = fx
            .service
            .verify_bearer(&response.access_token, None)
            .await
            .unwrap();
        stored.expires_at = OffsetDateTime::now_utc() - time::Duration::seconds(1);
        fx.access.replace(stored);

        let result = fx.service.verify_bearer(&response.access_token, None).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }
}

//! OAuth authorization service.
//!
//! This module provides the authorization service that handles OAuth 2.0
//! authorization requests. It validates requests, resolves the user the
//! code will be bound to, negotiates scope, and issues the code through
//! the [`CodeLedger`].
//!
//! # User Resolution
//!
//! The user bound to an issued code is resolved in priority order:
//!
//! 1. The client's `owner_user_id`, when registered with one. Such a
//!    client always acts for that fixed user.
//! 2. The bearer-authenticated user, when the upstream authentication
//!    screen supplied one with the request.
//! 3. Neither: a client-only code, bound to no user.
//!
//! # Usage
//!
//! ```ignore
//! use tokensmith_auth::oauth::{AuthorizationService, AuthorizationRequest};
//!
//! let service = AuthorizationService::new(client_storage, identity, codes);
//!
//! let code = service.authorize(&request, authenticated_user).await?;
//! ```

use std::sync::Arc;

use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::identity::IdentityProvider;
use crate::oauth::authorize::AuthorizationRequest;
use crate::oauth::codes::CodeLedger;
use crate::scope;
use crate::storage::ClientStorage;
use crate::types::{AuthorizationCode, GrantType};

/// Authorization service for handling OAuth 2.0 authorization requests.
///
/// This service validates authorization requests and coordinates the
/// client store, the identity collaborator, and the code ledger to issue
/// single-use authorization codes.
pub struct AuthorizationService {
    /// Client storage for looking up registered clients.
    client_storage: Arc<dyn ClientStorage>,

    /// Identity collaborator for resolving owner users.
    identity: Arc<dyn IdentityProvider>,

    /// Ledger that mints and persists authorization codes.
    codes: Arc<CodeLedger>,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    ///
    /// # Arguments
    ///
    /// * `client_storage` - Storage for looking up registered clients
    /// * `identity` - Identity collaborator for resolving owner users
    /// * `codes` - Ledger that mints and persists authorization codes
    #[must_use]
    pub fn new(
        client_storage: Arc<dyn ClientStorage>,
        identity: Arc<dyn IdentityProvider>,
        codes: Arc<CodeLedger>,
    ) -> Self {
        Self {
            client_storage,
            identity,
            codes,
        }
    }

    /// Processes an authorization request.
    ///
    /// Validates the request parameters against the client registration,
    /// resolves the user the code will be bound to, negotiates the
    /// requested scope down to what the client allows, and issues the code.
    ///
    /// # Arguments
    ///
    /// * `request` - The authorization request to process
    /// * `authenticated_user` - User authenticated by the upstream
    ///   authentication screen, if any
    ///
    /// # Returns
    ///
    /// Returns the issued authorization code on success. The caller builds
    /// the response from its `code` and expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Client is not found (`InvalidClient`)
    /// - Client is inactive (`InvalidClient`)
    /// - `response_type` is not "code" (`UnsupportedResponseType`)
    /// - Redirect URI is not registered (`InvalidRequest`)
    /// - The client does not allow the authorization_code grant
    ///   (`UnsupportedGrantType`)
    /// - The client's registered owner user does not exist (`Internal`)
    /// - No requested scope token is allowed for the client (`InvalidScope`)
    ///
    /// # Security
    ///
    /// Never log the issued code value.
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
        authenticated_user: Option<Uuid>,
    ) -> AuthResult<AuthorizationCode> {
        // 1. Validate client exists and is active
        let client = self
            .client_storage
            .find_by_client_id(&request.client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

        if !client.active {
            return Err(AuthError::invalid_client("Client is inactive"));
        }

        // 2. Validate response_type
        if request.response_type != "code" {
            return Err(AuthError::unsupported_response_type(&request.response_type));
        }

        // 3. Validate redirect_uri
        if !client.is_redirect_uri_allowed(&request.redirect_uri) {
            return Err(AuthError::invalid_request(
                "redirect_uri is not registered for this client",
            ));
        }

        // 4. Validate grant type is allowed
        if !client.is_grant_type_allowed(GrantType::AuthorizationCode) {
            return Err(AuthError::unsupported_grant_type(
                GrantType::AuthorizationCode.as_str(),
            ));
        }

        // 5. Resolve the user the code is bound to
        let user_id = match client.owner_user_id {
            Some(owner_id) => {
                let owner = self.identity.find_user(owner_id).await?.ok_or_else(|| {
                    AuthError::internal(format!(
                        "Owner user {owner_id} registered for client {} does not exist",
                        client.client_id
                    ))
                })?;
                Some(owner.id)
            }
            None => authenticated_user,
        };

        // 6. Negotiate scope; a blank request counts as no request
        let requested = request.scope.as_deref().filter(|s| !s.trim().is_empty());
        let scope = match requested {
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

        // 7. Issue the code
        self.codes
            .issue(&client, user_id, &request.redirect_uri, scope)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        MockAuthorizationCodeStorage, MockClientStorage, MockIdentityProvider, make_client,
        make_user,
    };
    use std::time::Duration;

    struct Fixture {
        clients: Arc<MockClientStorage>,
        identity: Arc<MockIdentityProvider>,
        service: AuthorizationService,
    }

    fn make_service() -> Fixture {
        let clients = Arc::new(MockClientStorage::new());
        let identity = Arc::new(MockIdentityProvider::new());
        let codes = Arc::new(CodeLedger::new(
            Arc::new(MockAuthorizationCodeStorage::new()),
            Duration::from_secs(300),
        ));
        let service =
            AuthorizationService::new(clients.clone(), identity.clone(), codes);
        Fixture {
            clients,
            identity,
            service,
        }
    }

    fn make_request(client_id: &str, scope: Option<&str>) -> AuthorizationRequest {
        AuthorizationRequest {
            response_type: "code".to_string(),
            client_id: client_id.to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scope: scope.map(str::to_string),
            state: Some("state123".to_string()),
        }
    }

    #[tokio::test]
    async fn test_authorize_client_only_code() {
        let fx = make_service();
        fx.clients.add_client(make_client("app"), "secret");

        let code = fx
            .service
            .authorize(&make_request("app", Some("read")), None)
            .await
            .unwrap();

        assert_eq!(code.client_id, "app");
        assert!(code.user_id.is_none());
        assert_eq!(code.scope.as_deref(), Some("read"));
    }

    #[tokio::test]
    async fn test_authorize_unknown_client() {
        let fx = make_service();

        let result = fx
            .service
            .authorize(&make_request("ghost", None), None)
            .await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_authorize_inactive_client() {
        let fx = make_service();
        let mut client = make_client("app");
        client.active = false;
        fx.clients.add_client(client, "secret");

        let result = fx.service.authorize(&make_request("app", None), None).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_authorize_rejects_non_code_response_type() {
        let fx = make_service();
        fx.clients.add_client(make_client("app"), "secret");

        let mut request = make_request("app", None);
        request.response_type = "token".to_string();

        let result = fx.service.authorize(&request, None).await;
        assert!(matches!(
            result,
            Err(AuthError::UnsupportedResponseType { .. })
        ));
    }

    #[tokio::test]
    async fn test_authorize_rejects_unregistered_redirect_uri() {
        let fx = make_service();
        fx.clients.add_client(make_client("app"), "secret");

        let mut request = make_request("app", None);
        request.redirect_uri = "https://evil.example.com/callback".to_string();

        let result = fx.service.authorize(&request, None).await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_authorize_rejects_disallowed_grant() {
        let fx = make_service();
        let mut client = make_client("app");
        client.grant_types = vec![GrantType::Password];
        fx.clients.add_client(client, "secret");

        let result = fx.service.authorize(&make_request("app", None), None).await;
        assert!(matches!(
            result,
            Err(AuthError::UnsupportedGrantType { .. })
        ));
    }

    #[tokio::test]
    async fn test_authorize_binds_owner_user() {
        let fx = make_service();
        let owner = make_user();
        fx.identity.add_user(owner.clone(), "password");

        let mut client = make_client("app");
        client.owner_user_id = Some(owner.id);
        fx.clients.add_client(client, "secret");

        // The registered owner wins even when a bearer user is present
        let bearer = Uuid::new_v4();
        let code = fx
            .service
            .authorize(&make_request("app", None), Some(bearer))
            .await
            .unwrap();

        assert_eq!(code.user_id, Some(owner.id));
    }

    #[tokio::test]
    async fn test_authorize_missing_owner_is_internal_error() {
        let fx = make_service();
        let mut client = make_client("app");
        client.owner_user_id = Some(Uuid::new_v4());
        fx.clients.add_client(client, "secret");

        let result = fx.service.authorize(&make_request("app", None), None).await;
        assert!(matches!(result, Err(AuthError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_authorize_binds_bearer_user() {
        let fx = make_service();
        fx.clients.add_client(make_client("app"), "secret");

        let bearer = Uuid::new_v4();
        let code = fx
            .service
            .authorize(&make_request("app", None), Some(bearer))
            .await
            .unwrap();

        assert_eq!(code.user_id, Some(bearer));
    }

    #[tokio::test]
    async fn test_authorize_narrows_scope_to_allowed() {
        let fx = make_service();
        fx.clients.add_client(make_client("app"), "secret");

        let code = fx
            .service
            .authorize(&make_request("app", Some("read write delete")), None)
            .await
            .unwrap();

        assert_eq!(code.scope.as_deref(), Some("read write"));
    }

    #[tokio::test]
    async fn test_authorize_rejects_empty_intersection() {
        let fx = make_service();
        fx.clients.add_client(make_client("app"), "secret");

        let result = fx
            .service
            .authorize(&make_request("app", Some("admin")), None)
            .await;
        assert!(matches!(result, Err(AuthError::InvalidScope { .. })));
    }

    #[tokio::test]
    async fn test_authorize_without_scope_issues_scopeless_code() {
        let fx = make_service();
        fx.clients.add_client(make_client("app"), "secret");

        let code = fx
            .service
            .authorize(&make_request("app", None), None)
            .await
            .unwrap();
        assert!(code.scope.is_none());

        // A blank scope parameter behaves like an absent one
        let code = fx
            .service
            .authorize(&make_request("app", Some("   ")), None)
            .await
            .unwrap();
        assert!(code.scope.is_none());
    }
}

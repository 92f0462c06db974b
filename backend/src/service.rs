//! User management flows on top of the identity provider.

use std::sync::Arc;

use keycloak_admin::{CredentialRepresentation, IdentityProvider, UserRepresentation};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::mapper;
use crate::models::user::{UserCreateRequest, UserResponse};

/// Orchestrates user creation and lookup against the identity provider.
pub struct UserService {
    provider: Arc<dyn IdentityProvider>,
}

impl UserService {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Create an enabled user with a permanent password.
    ///
    /// Any provider fault is returned as [`AppError::Application`] with the provider's
    /// status and message. Duplicate detection is left to the provider.
    pub async fn create_user(&self, request: UserCreateRequest) -> Result<()> {
        let username = request.username.clone();
        let user = UserRepresentation {
            id: None,
            username: Some(request.username),
            email: Some(request.email),
            first_name: Some(request.first_name),
            last_name: Some(request.last_name),
            enabled: Some(true),
            credentials: vec![CredentialRepresentation::password(request.password)],
        };

        match self.provider.create_user(&user).await {
            Ok(id) => {
                tracing::info!(user_id = %id, username = %username, "Created user");
                Ok(())
            }
            Err(e) if e.is_conflict() => {
                tracing::info!(username = %username, "User already exists: {}", e.message());
                Err(AppError::application(e))
            }
            Err(e) => {
                tracing::warn!(username = %username, "Failed to create user: {}", e);
                Err(AppError::application(e))
            }
        }
    }

    /// Fetch a user with its realm roles and groups.
    ///
    /// Provider faults, including not-found, are propagated unchanged as
    /// [`AppError::Provider`].
    pub async fn get_user_by_id(&self, id: Uuid) -> Result<UserResponse> {
        let id = id.to_string();

        let user = self.provider.get_user(&id).await.map_err(|e| {
            if e.is_not_found() {
                tracing::info!(user_id = %id, "User not found");
            }
            e
        })?;
        let (roles, groups) = tokio::try_join!(
            self.provider.realm_roles_of(&id),
            self.provider.groups_of(&id),
        )?;

        tracing::debug!(user_id = %id, roles = roles.len(), groups = groups.len(), "Fetched user");
        Ok(mapper::to_response(user, roles, groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use keycloak_admin::{GroupRepresentation, ProviderError, RoleRepresentation};
    use mockall::mock;

    mock! {
        Provider {}

        #[async_trait]
        impl IdentityProvider for Provider {
            async fn create_user(&self, user: &UserRepresentation) -> std::result::Result<String, ProviderError>;
            async fn get_user(&self, id: &str) -> std::result::Result<UserRepresentation, ProviderError>;
            async fn realm_roles_of(&self, id: &str) -> std::result::Result<Vec<RoleRepresentation>, ProviderError>;
            async fn groups_of(&self, id: &str) -> std::result::Result<Vec<GroupRepresentation>, ProviderError>;
            async fn delete_user(&self, id: &str) -> std::result::Result<(), ProviderError>;
        }
    }

    fn request() -> UserCreateRequest {
        UserCreateRequest {
            username: "username_TestUser".to_string(),
            email: "email_test@example.com".to_string(),
            password: "password_".to_string(),
            first_name: "firstName_".to_string(),
            last_name: "lastName_".to_string(),
        }
    }

    fn service(provider: MockProvider) -> UserService {
        UserService::new(Arc::new(provider))
    }

    #[tokio::test]
    async fn test_create_user_sends_enabled_user_with_password() {
        let mut provider = MockProvider::new();
        provider
            .expect_create_user()
            .withf(|user| {
                user.username.as_deref() == Some("username_TestUser")
                    && user.email.as_deref() == Some("email_test@example.com")
                    && user.first_name.as_deref() == Some("firstName_")
                    && user.last_name.as_deref() == Some("lastName_")
                    && user.enabled == Some(true)
                    && user.credentials == vec![CredentialRepresentation::password("password_")]
            })
            .times(1)
            .returning(|_| Ok("60208bfd-25c0-49c6-8139-8059d997eeda".to_string()));

        assert!(service(provider).create_user(request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_user_keycloak_error_becomes_application_error() {
        let mut provider = MockProvider::new();
        provider.expect_create_user().times(1).returning(|_| {
            Err(ProviderError::Status {
                status: 400,
                message: "Keycloak error".to_string(),
            })
        });

        let err = service(provider).create_user(request()).await.unwrap_err();
        match err {
            AppError::Application { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(message.contains("Keycloak error"));
            }
            other => panic!("expected application error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_user_conflict_keeps_status() {
        let mut provider = MockProvider::new();
        provider.expect_create_user().returning(|_| {
            Err(ProviderError::Status {
                status: 409,
                message: "User exists with same username".to_string(),
            })
        });

        let err = service(provider).create_user(request()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("User exists with same username"));
    }

    #[tokio::test]
    async fn test_get_user_by_id_maps_user_roles_and_groups() {
        let user_id = Uuid::new_v4();
        let expected_id = user_id.to_string();

        let mut provider = MockProvider::new();
        let id = expected_id.clone();
        provider
            .expect_get_user()
            .withf(move |requested| requested == id)
            .times(1)
            .returning(|_| {
                Ok(UserRepresentation {
                    username: Some("testuser".to_string()),
                    first_name: Some("firstName".to_string()),
                    last_name: Some("lastName".to_string()),
                    email: Some("email@example.com".to_string()),
                    ..Default::default()
                })
            });
        let id = expected_id.clone();
        provider
            .expect_realm_roles_of()
            .withf(move |requested| requested == id)
            .times(1)
            .returning(|_| {
                Ok(vec![
                    RoleRepresentation::named("ROLE_USER"),
                    RoleRepresentation::named("MODERATOR"),
                ])
            });
        let id = expected_id;
        provider
            .expect_groups_of()
            .withf(move |requested| requested == id)
            .times(1)
            .returning(|_| {
                Ok(vec![
                    GroupRepresentation::named("TESTED_GROUP_A"),
                    GroupRepresentation::named("TESTED_GROUP_B"),
                ])
            });

        let response = service(provider).get_user_by_id(user_id).await.unwrap();
        assert_eq!(response.first_name.as_deref(), Some("firstName"));
        assert_eq!(response.last_name.as_deref(), Some("lastName"));
        assert_eq!(response.email.as_deref(), Some("email@example.com"));
        assert_eq!(response.roles, vec!["ROLE_USER", "MODERATOR"]);
        assert_eq!(response.groups, vec!["TESTED_GROUP_A", "TESTED_GROUP_B"]);
    }

    #[tokio::test]
    async fn test_get_user_by_id_propagates_fault_unchanged() {
        let mut provider = MockProvider::new();
        provider
            .expect_get_user()
            .returning(|_| Err(ProviderError::RequestFailed("Unexpected error".to_string())));

        let err = service(provider)
            .get_user_by_id(Uuid::new_v4())
            .await
            .unwrap_err();
        match err {
            AppError::Provider(ProviderError::RequestFailed(message)) => {
                assert_eq!(message, "Unexpected error");
            }
            other => panic!("expected propagated fault, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_user_by_id_not_found_is_not_normalized() {
        let mut provider = MockProvider::new();
        provider.expect_get_user().returning(|_| {
            Err(ProviderError::Status {
                status: 404,
                message: "User not found".to_string(),
            })
        });

        let err = service(provider)
            .get_user_by_id(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_get_user_by_id_role_fault_propagates() {
        let mut provider = MockProvider::new();
        provider
            .expect_get_user()
            .returning(|_| Ok(UserRepresentation::default()));
        provider.expect_realm_roles_of().returning(|_| {
            Err(ProviderError::Status {
                status: 403,
                message: "HTTP 403 Forbidden".to_string(),
            })
        });
        provider.expect_groups_of().returning(|_| Ok(vec![]));

        let err = service(provider)
            .get_user_by_id(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
    }
}

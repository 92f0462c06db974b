use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use keycloak_admin::{
    GroupRepresentation, IdentityProvider, ProviderError, RoleRepresentation, UserRepresentation,
};
use tokio::sync::RwLock;

struct StoredUser {
    user: UserRepresentation,
    roles: Vec<RoleRepresentation>,
    groups: Vec<GroupRepresentation>,
}

/// In-memory stand-in for Keycloak that behaves like the admin API on
/// duplicates (409) and unknown ids (404).
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    users: RwLock<Vec<StoredUser>>,
    create_failure: RwLock<Option<ProviderError>>,
    create_calls: AtomicUsize,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user with the given roles and groups, in provider order.
    pub async fn insert_user(
        &self,
        id: &str,
        user: UserRepresentation,
        roles: Vec<RoleRepresentation>,
        groups: Vec<GroupRepresentation>,
    ) {
        let user = UserRepresentation {
            id: Some(id.to_string()),
            ..user
        };
        self.users.write().await.push(StoredUser { user, roles, groups });
    }

    /// Make every subsequent create fail with `error`.
    pub async fn fail_creates_with(&self, error: ProviderError) {
        *self.create_failure.write().await = Some(error);
    }

    /// Number of create calls received, successful or not.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub async fn find_by_username(&self, username: &str) -> Option<UserRepresentation> {
        self.users
            .read()
            .await
            .iter()
            .find(|s| same(&s.user.username, username))
            .map(|s| s.user.clone())
    }

    async fn with_user<T>(
        &self,
        id: &str,
        f: impl FnOnce(&StoredUser) -> T,
    ) -> Result<T, ProviderError> {
        self.users
            .read()
            .await
            .iter()
            .find(|s| s.user.id.as_deref() == Some(id))
            .map(f)
            .ok_or_else(not_found)
    }
}

fn same(field: &Option<String>, value: &str) -> bool {
    field
        .as_deref()
        .map(|f| f.eq_ignore_ascii_case(value))
        .unwrap_or(false)
}

fn not_found() -> ProviderError {
    ProviderError::Status {
        status: 404,
        message: "User not found".to_string(),
    }
}

fn conflict(message: &str) -> ProviderError {
    ProviderError::Status {
        status: 409,
        message: message.to_string(),
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_user(&self, user: &UserRepresentation) -> Result<String, ProviderError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.create_failure.read().await.clone() {
            return Err(error);
        }

        let mut users = self.users.write().await;
        let username = user.username.as_deref().unwrap_or_default();
        let email = user.email.as_deref().unwrap_or_default();

        if users.iter().any(|s| same(&s.user.username, username)) {
            return Err(conflict("User exists with same username"));
        }
        if !email.is_empty() && users.iter().any(|s| same(&s.user.email, email)) {
            return Err(conflict("User exists with same email"));
        }

        let id = uuid::Uuid::new_v4().to_string();
        users.push(StoredUser {
            user: UserRepresentation {
                id: Some(id.clone()),
                credentials: vec![],
                ..user.clone()
            },
            roles: vec![RoleRepresentation::named("default-roles-itm")],
            groups: vec![],
        });

        Ok(id)
    }

    async fn get_user(&self, id: &str) -> Result<UserRepresentation, ProviderError> {
        self.with_user(id, |s| s.user.clone()).await
    }

    async fn realm_roles_of(&self, id: &str) -> Result<Vec<RoleRepresentation>, ProviderError> {
        self.with_user(id, |s| s.roles.clone()).await
    }

    async fn groups_of(&self, id: &str) -> Result<Vec<GroupRepresentation>, ProviderError> {
        self.with_user(id, |s| s.groups.clone()).await
    }

    async fn delete_user(&self, id: &str) -> Result<(), ProviderError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|s| s.user.id.as_deref() != Some(id));
        if users.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

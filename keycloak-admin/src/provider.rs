//! The identity provider port.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{GroupRepresentation, RoleRepresentation, UserRepresentation};

/// Administrative operations the backend performs against the identity provider.
///
/// Lists are returned in the order the provider sent them.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a user, returning the provider-assigned id.
    async fn create_user(&self, user: &UserRepresentation) -> Result<String, ProviderError>;

    async fn get_user(&self, id: &str) -> Result<UserRepresentation, ProviderError>;

    /// Realm-level role mappings of a user.
    async fn realm_roles_of(&self, id: &str) -> Result<Vec<RoleRepresentation>, ProviderError>;

    async fn groups_of(&self, id: &str) -> Result<Vec<GroupRepresentation>, ProviderError>;

    async fn delete_user(&self, id: &str) -> Result<(), ProviderError>;
}

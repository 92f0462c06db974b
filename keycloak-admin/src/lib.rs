//! Keycloak Admin Client
//!
//! Thin client over the Keycloak admin REST API covering the user lookups the
//! backend needs, exposed through the [`IdentityProvider`] port so callers can
//! swap in fakes.

pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod token;
pub mod types;

pub use client::KeycloakAdminClient;
pub use config::KeycloakConfig;
pub use error::ProviderError;
pub use provider::IdentityProvider;
pub use types::{
    CredentialRepresentation, GroupRepresentation, MappingsRepresentation, RoleRepresentation,
    UserRepresentation,
};

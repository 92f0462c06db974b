//! Projection of Keycloak user data into the API response.

use keycloak_admin::{GroupRepresentation, RoleRepresentation, UserRepresentation};

use crate::models::user::UserResponse;

/// Build a [`UserResponse`] from a user record, its realm roles and its groups.
///
/// Role and group names keep the order and duplicates of the input lists.
pub fn to_response(
    user: UserRepresentation,
    roles: Vec<RoleRepresentation>,
    groups: Vec<GroupRepresentation>,
) -> UserResponse {
    UserResponse {
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        roles: roles.into_iter().map(|r| r.name).collect(),
        groups: groups.into_iter().map(|g| g.name).collect(),
    }
}

//! Helpers for tests: configuration, signed tokens and an in-memory identity provider.

pub mod fake_provider;

pub use fake_provider::InMemoryIdentityProvider;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use keycloak_admin::KeycloakConfig;
use serde_json::json;

use crate::auth::AuthUser;
use crate::config::{AuthConfig, Config, CorsConfig, LoggingConfig, OidcConfig, ServerConfig};

/// Key id of the test signing key.
pub const TEST_KID: &str = "test-key";

/// PKCS#1 RSA private key used to sign test tokens.
pub const TEST_PRIVATE_KEY_PEM: &str = include_str!("test_key.pem");

/// Base64url modulus of [`TEST_PRIVATE_KEY_PEM`].
pub const TEST_KEY_MODULUS: &str = "1PeeQYIUdN2bkh4zODY6eC5ZeQU5FxhG5jzgSWi6SBT_tVHSnZA7UMi3Z1vBp8dT1FsVVMvgeMdMSXoUUPb_WyScp_sCySQ8PH5_P7e2Ua4Sb5zDts62AjGL-pqYxIVCgRjmGEABCld5GClSQ92I_lQ1OcccMqNA0YQb9ZyTFNwhParaqip6LxKEuXBzx96fVai3tCNcCM4qpJofHSZ8gNVFbCX3XH8NvPUzoM5ExNntg7weX7KNB_SJUuzCE_gxWrNk7qqrpCHB6nnrwDj7vjZ87Y2IvNaL-yW9K0rqXygQAWm_H0MW0ZZmg2Q5_13NQoIaTZOU785pXUcbbJ0RaQ";

/// JWKS document publishing the test signing key.
pub fn test_jwks() -> serde_json::Value {
    json!({
        "keys": [{
            "kid": TEST_KID,
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "n": TEST_KEY_MODULUS,
            "e": "AQAB"
        }]
    })
}

pub fn test_config(issuer: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8081,
            base_path: "/api".to_string(),
        },
        keycloak: KeycloakConfig::new("http://localhost:8080", "ITM", "backend-resources", "secret"),
        oidc: OidcConfig {
            issuer: issuer.to_string(),
            audience: None,
        },
        auth: AuthConfig::default(),
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        cors: CorsConfig::default(),
    }
}

#[derive(serde::Serialize)]
struct TestClaims {
    iss: String,
    sub: String,
    preferred_username: Option<String>,
    email: Option<String>,
    realm_access: serde_json::Value,
    exp: u64,
    iat: u64,
}

fn signing_key() -> EncodingKey {
    EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY_PEM.as_bytes()).expect("Invalid test signing key")
}

fn sign(claims: &TestClaims) -> String {
    let header = Header {
        alg: Algorithm::RS256,
        kid: Some(TEST_KID.to_string()),
        ..Default::default()
    };
    encode(&header, claims, &signing_key()).expect("Failed to encode JWT")
}

/// Keycloak-style access token with realm roles under `realm_access`.
pub fn generate_test_jwt(issuer: &str, username: &str, roles: Vec<&str>) -> String {
    let now = Utc::now();
    sign(&TestClaims {
        iss: issuer.to_string(),
        sub: uuid::Uuid::new_v4().to_string(),
        preferred_username: Some(username.to_string()),
        email: Some(format!("{}@example.com", username.to_lowercase())),
        realm_access: json!({ "roles": roles }),
        exp: (now + Duration::hours(1)).timestamp() as u64,
        iat: now.timestamp() as u64,
    })
}

pub fn generate_expired_jwt(issuer: &str, username: &str) -> String {
    let now = Utc::now();
    sign(&TestClaims {
        iss: issuer.to_string(),
        sub: uuid::Uuid::new_v4().to_string(),
        preferred_username: Some(username.to_string()),
        email: None,
        realm_access: json!({ "roles": ["MODERATOR"] }),
        exp: (now - Duration::hours(1)).timestamp() as u64,
        iat: (now - Duration::hours(2)).timestamp() as u64,
    })
}

pub fn test_auth_user(username: &str, roles: Vec<&str>) -> AuthUser {
    AuthUser {
        sub: uuid::Uuid::new_v4().to_string(),
        username: Some(username.to_string()),
        email: None,
        roles: roles.iter().map(|s| s.to_string()).collect(),
    }
}

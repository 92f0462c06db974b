use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Body of `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateRequest {
    #[validate(
        length(min = 2, max = 30, message = "Username should be between 2 and 30 characters long"),
        custom(function = "not_blank", message = "Username must not be blank")
    )]
    pub username: String,

    #[validate(
        email(message = "Email should be valid"),
        custom(function = "not_blank", message = "Email must not be blank")
    )]
    pub email: String,

    #[validate(
        length(min = 4, message = "Password should be at least 4 characters long"),
        custom(function = "not_blank", message = "Password must not be blank")
    )]
    pub password: String,

    #[validate(custom(function = "not_blank", message = "First name must not be blank"))]
    pub first_name: String,

    #[validate(custom(function = "not_blank", message = "Last name must not be blank"))]
    pub last_name: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Body of `GET /users/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> UserCreateRequest {
        UserCreateRequest {
            username: "username_TestUser".to_string(),
            email: "email_test@example.com".to_string(),
            password: "password_".to_string(),
            first_name: "firstName_".to_string(),
            last_name: "lastName_".to_string(),
        }
    }

    fn invalid_fields(request: &UserCreateRequest) -> Vec<String> {
        let mut fields: Vec<String> = request
            .validate()
            .unwrap_err()
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();
        fields
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_deserializes_camel_case() {
        let request: UserCreateRequest = serde_json::from_str(
            r#"{"username":"jdoe","email":"jdoe@example.com","password":"secret","firstName":"John","lastName":"Doe"}"#,
        )
        .unwrap();
        assert_eq!(request.first_name, "John");
        assert_eq!(request.last_name, "Doe");
    }

    #[test]
    fn test_blank_username_of_valid_length_rejected() {
        let request = UserCreateRequest {
            username: "   ".to_string(),
            ..valid()
        };
        assert_eq!(invalid_fields(&request), vec!["username"]);
    }

    #[test]
    fn test_username_bounds() {
        let at_min = UserCreateRequest {
            username: "ab".to_string(),
            ..valid()
        };
        let at_max = UserCreateRequest {
            username: "a".repeat(30),
            ..valid()
        };
        let over_max = UserCreateRequest {
            username: "a".repeat(31),
            ..valid()
        };
        assert!(at_min.validate().is_ok());
        assert!(at_max.validate().is_ok());
        assert_eq!(invalid_fields(&over_max), vec!["username"]);
    }

    #[test]
    fn test_password_minimum_length() {
        let at_min = UserCreateRequest {
            password: "pass".to_string(),
            ..valid()
        };
        let short = UserCreateRequest {
            password: "pas".to_string(),
            ..valid()
        };
        assert!(at_min.validate().is_ok());
        assert_eq!(invalid_fields(&short), vec!["password"]);
    }

    #[test]
    fn test_every_invalid_field_reported() {
        let request = UserCreateRequest {
            username: "".to_string(),
            email: "invalid_email".to_string(),
            password: "123".to_string(),
            first_name: "".to_string(),
            last_name: " ".to_string(),
        };
        assert_eq!(
            invalid_fields(&request),
            vec!["email", "first_name", "last_name", "password", "username"]
        );
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = UserResponse {
            first_name: Some("firstName_".to_string()),
            last_name: Some("lastName_".to_string()),
            email: Some("email_test@example.com".to_string()),
            roles: vec!["ROLE_USER".to_string()],
            groups: vec!["TESTED_GROUP_A".to_string(), "TESTED_GROUP_B".to_string()],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["firstName"], "firstName_");
        assert_eq!(json["lastName"], "lastName_");
        assert_eq!(json["roles"][0], "ROLE_USER");
        assert_eq!(json["groups"][1], "TESTED_GROUP_B");
    }
}

use serde::{Deserialize, Serialize};

use crate::users::model::{Role, User};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile fields an update may replace.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// New password with its confirmation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordConfirmRequest {
    pub password: String,
    pub password_confirmation: String,
}

/// Old password plus the new password pair, for self-service changes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateRequest {
    pub old_password: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public part of the user returned to clients. Password and timestamps
/// never appear here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub full_name: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            full_name: user.full_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serializes_camel_case_without_secrets() {
        let mut user = User::new(
            "jane@example.com",
            "janedoe",
            "$argon2$fake",
            "Jane",
            "Doe",
            Role::Admin,
        );
        user.id = 7;

        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "jane@example.com");
        assert_eq!(json["username"], "janedoe");
        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["lastName"], "Doe");
        assert_eq!(json["role"], 2);
        assert_eq!(json["fullName"], "Jane Doe");

        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert!(!keys.contains(&"password"));
        assert!(!keys.contains(&"createdAt"));
        assert!(!keys.contains(&"updatedAt"));
        assert!(!keys.contains(&"isDeleted"));
    }

    #[test]
    fn register_request_reads_camel_case_fields() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@b.co","username":"abcdef","password":"Aa1!aaaa",
                "firstName":"Jane","lastName":"Doe"}"#,
        )
        .unwrap();
        assert_eq!(req.first_name, "Jane");
        assert_eq!(req.last_name, "Doe");
    }

    #[test]
    fn password_update_request_reads_old_password() {
        let req: PasswordUpdateRequest = serde_json::from_str(
            r#"{"oldPassword":"old","password":"new","passwordConfirmation":"new"}"#,
        )
        .unwrap();
        assert_eq!(req.old_password, "old");
        assert_eq!(req.password_confirmation, "new");
    }
}

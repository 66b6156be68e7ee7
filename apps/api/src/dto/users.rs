use gatehouse_application::{CreateUserParams, UpdateUserParams};
use gatehouse_domain::User;
use serde::{Deserialize, Serialize};

/// Incoming payload for user creation.
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl From<&CreateUserRequest> for CreateUserParams {
    fn from(request: &CreateUserRequest) -> Self {
        Self {
            name: request.name.clone(),
            email: request.email.clone(),
            password: request.password.clone(),
        }
    }
}

/// Incoming payload for user updates. A blank password keeps the current one.
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl From<&UpdateUserRequest> for UpdateUserParams {
    fn from(request: &UpdateUserRequest) -> Self {
        Self {
            name: request.name.clone(),
            email: request.email.clone(),
            password: super::security::non_blank(request.password.as_deref()),
        }
    }
}

/// API representation of a user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id().as_i64(),
            name: user.name().to_owned(),
            email: user.email().as_str().to_owned(),
        }
    }
}

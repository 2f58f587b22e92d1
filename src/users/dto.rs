use serde::{Deserialize, Serialize};

use crate::auth::password::Password;
use crate::schema::ValidationError;
use crate::users::repo_types::{NewUser, PublicUser, UserPatch, USER_SCHEMA};

pub const LOGGED_IN: &str = "You are now logged in!";

fn normalize_email(email: String) -> String {
    email.trim().to_lowercase()
}

/// Body of `POST /api/users`.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = ValidationError;

    fn try_from(req: CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            username: USER_SCHEMA.require("username", req.username)?,
            email: normalize_email(USER_SCHEMA.require("email", req.email)?),
            password: Password::Plain(USER_SCHEMA.require("password", req.password)?),
        })
    }
}

/// Body of `PUT /api/users/:id`. Every field is optional.
#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email.map(normalize_email),
            password: req.password.map(Password::Plain),
        }
    }
}

/// Body of `POST /api/users/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Normalised email and plaintext, if both were supplied.
    pub fn into_parts(self) -> Option<(String, String)> {
        Some((normalize_email(self.email?), self.password?))
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub message: &'static str,
}

use std::fmt;

use serde::Serialize;
use sqlx::FromRow;

use crate::auth::password::{verify_password_async, CredentialError, Password};
use crate::repo::{Entity, Id};
use crate::schema::{Column, Constraint, Schema, ValidationError};

pub const USER_SCHEMA: Schema = Schema {
    table: "user",
    columns: &[
        Column::new("id").primary_key(),
        Column::new("username").constraints(&[Constraint::Required]),
        Column::new("email")
            .unique()
            .constraints(&[Constraint::Required, Constraint::Email]),
        Column::new("password").constraints(&[Constraint::Required, Constraint::MinLen(4)]),
    ],
};

/// User row as stored. `password` holds the hash, never plaintext.
#[derive(Clone, Serialize, FromRow)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl User {
    /// Checks a login attempt against the stored hash.
    pub async fn check_password(&self, plain: &str) -> Result<bool, CredentialError> {
        verify_password_async(plain, &self.password).await
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// User without the password column, for list/get/login responses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Id,
    pub username: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: Password,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<Password>,
}

impl Entity for User {
    type New = NewUser;
    type Patch = UserPatch;

    const SCHEMA: &'static Schema = &USER_SCHEMA;

    fn validate_new(new: &NewUser) -> Result<(), ValidationError> {
        USER_SCHEMA.check_insert("username", Some(&new.username))?;
        USER_SCHEMA.check_insert("email", Some(&new.email))?;
        if let Some(plain) = new.password.as_plain() {
            USER_SCHEMA.check_insert("password", Some(plain))?;
        }
        Ok(())
    }

    fn validate_patch(patch: &UserPatch) -> Result<(), ValidationError> {
        USER_SCHEMA.check_update("username", patch.username.as_deref())?;
        USER_SCHEMA.check_update("email", patch.email.as_deref())?;
        USER_SCHEMA.check_update(
            "password",
            patch.password.as_ref().and_then(Password::as_plain),
        )?;
        Ok(())
    }
}

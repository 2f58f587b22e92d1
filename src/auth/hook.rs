use async_trait::async_trait;

use crate::auth::password::Hasher;
use crate::repo::{RepoError, WriteHook};
use crate::users::repo_types::{NewUser, User, UserPatch};

/// Write hook that hashes the password of every user write that carries one.
pub struct HashPasswords {
    hasher: Hasher,
}

impl HashPasswords {
    pub fn new(hasher: Hasher) -> Self {
        Self { hasher }
    }
}

#[async_trait]
impl WriteHook<User> for HashPasswords {
    async fn before_create(&self, new: &mut NewUser) -> Result<(), RepoError> {
        self.hasher.seal(&mut new.password).await?;
        Ok(())
    }

    async fn before_update(&self, patch: &mut UserPatch) -> Result<(), RepoError> {
        if let Some(password) = patch.password.as_mut() {
            self.hasher.seal(password).await?;
        }
        Ok(())
    }
}

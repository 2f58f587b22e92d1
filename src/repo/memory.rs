//! In-process store with the same constraint semantics as the Postgres
//! schema: unique `user.email`, `post.user_id` foreign key, and cascading
//! post removal when their user is deleted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::posts::repo::PostStore;
use crate::posts::repo_types::{NewPost, Post, PostPatch, POST_SCHEMA};
use crate::repo::{Id, RepoError, Repository};
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, User, UserPatch, USER_SCHEMA};

#[derive(Default)]
struct Tables {
    users: BTreeMap<Id, User>,
    posts: BTreeMap<Id, Post>,
    user_seq: Id,
    post_seq: Id,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Id>) -> Result<(), RepoError> {
        let taken = self
            .users
            .values()
            .any(|u| u.email == email && Some(u.id) != except);
        if taken {
            return Err(RepoError::UniqueViolation {
                table: USER_SCHEMA.table.into(),
                column: "email".into(),
            });
        }
        Ok(())
    }

    fn user_exists(&self, user_id: Id) -> Result<(), RepoError> {
        if !self.users.contains_key(&user_id) {
            return Err(RepoError::ForeignKeyViolation {
                table: POST_SCHEMA.table.into(),
                column: "user_id".into(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failing: AtomicBool,
}

impl MemoryStore {
    /// Makes every subsequent call fail like a lost connection.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn available(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<User> for MemoryStore {
    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        self.available()?;
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<User>, RepoError> {
        self.available()?;
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        self.available()?;
        let hash = new.password.as_hash().ok_or(RepoError::UnhashedPassword)?;

        let mut tables = self.tables.write().await;
        tables.email_taken(&new.email, None)?;
        tables.user_seq += 1;
        let user = User {
            id: tables.user_seq,
            username: new.username,
            email: new.email,
            password: hash.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Id, patch: UserPatch) -> Result<Option<User>, RepoError> {
        self.available()?;
        let hash = match &patch.password {
            Some(password) => Some(password.as_hash().ok_or(RepoError::UnhashedPassword)?),
            None => None,
        };

        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &patch.email {
            tables.email_taken(email, Some(id))?;
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(hash) = hash {
            user.password = hash.to_string();
        }
        Ok(Some(user.clone()))
    }

    async fn destroy(&self, id: Id) -> Result<u64, RepoError> {
        self.available()?;
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(0);
        }
        // ON DELETE CASCADE
        tables.posts.retain(|_, p| p.user_id != id);
        Ok(1)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        self.available()?;
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl Repository<Post> for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        self.available()?;
        Ok(self.tables.read().await.posts.values().cloned().collect())
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<Post>, RepoError> {
        self.available()?;
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn create(&self, new: NewPost) -> Result<Post, RepoError> {
        self.available()?;
        let mut tables = self.tables.write().await;
        tables.user_exists(new.user_id)?;
        tables.post_seq += 1;
        let post = Post {
            id: tables.post_seq,
            title: new.title,
            user_id: new.user_id,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: Id, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        self.available()?;
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&id) {
            return Ok(None);
        }
        if let Some(user_id) = patch.user_id {
            tables.user_exists(user_id)?;
        }

        let Some(post) = tables.posts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(user_id) = patch.user_id {
            post.user_id = user_id;
        }
        Ok(Some(post.clone()))
    }

    async fn destroy(&self, id: Id) -> Result<u64, RepoError> {
        self.available()?;
        let removed = self.tables.write().await.posts.remove(&id);
        Ok(u64::from(removed.is_some()))
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn find_by_user(&self, user_id: Id) -> Result<Vec<Post>, RepoError> {
        self.available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::Password;

    fn hashed(email: &str) -> NewUser {
        NewUser {
            username: "u".into(),
            email: email.into(),
            password: Password::Hashed("$argon2id$stub".into()),
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_and_never_reused() {
        let store = MemoryStore::default();
        let a = Repository::<User>::create(&store, hashed("a@x.com")).await.unwrap();
        let b = Repository::<User>::create(&store, hashed("b@x.com")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        Repository::<User>::destroy(&store, b.id).await.unwrap();
        let c = Repository::<User>::create(&store, hashed("c@x.com")).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn email_is_unique_across_create_and_update() {
        let store = MemoryStore::default();
        Repository::<User>::create(&store, hashed("a@x.com")).await.unwrap();
        let b = Repository::<User>::create(&store, hashed("b@x.com")).await.unwrap();

        let err = Repository::<User>::create(&store, hashed("a@x.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::UniqueViolation { .. }));

        let steal = UserPatch {
            email: Some("a@x.com".into()),
            ..UserPatch::default()
        };
        let err = Repository::<User>::update(&store, b.id, steal).await.unwrap_err();
        assert!(matches!(err, RepoError::UniqueViolation { .. }));

        let keep = UserPatch {
            email: Some("b@x.com".into()),
            ..UserPatch::default()
        };
        assert!(Repository::<User>::update(&store, b.id, keep).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_of_missing_row_is_none() {
        let store = MemoryStore::default();
        let patch = UserPatch {
            username: Some("x".into()),
            ..UserPatch::default()
        };
        assert!(Repository::<User>::update(&store, 5, patch).await.unwrap().is_none());
        assert_eq!(Repository::<User>::destroy(&store, 5).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn post_requires_existing_user() {
        let store = MemoryStore::default();
        let orphan = NewPost {
            title: "t".into(),
            user_id: 1,
        };
        let err = Repository::<Post>::create(&store, orphan).await.unwrap_err();
        assert!(matches!(err, RepoError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn failing_store_reports_database_errors() {
        let store = MemoryStore::default();
        store.fail_all();
        let err = store.find_by_email("a@x.com").await.unwrap_err();
        assert!(matches!(err, RepoError::Database(_)));
    }
}

use async_trait::async_trait;

use crate::db::PgStore;
use crate::repo::{Id, Repo, RepoError, Repository};
use crate::users::repo_types::{NewUser, User, UserPatch, USER_SCHEMA};

/// Storage for `user` rows.
#[async_trait]
pub trait UserStore: Repository<User> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

pub type UserRepo = Repo<User, dyn UserStore>;

impl Repo<User, dyn UserStore> {
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        self.store().find_by_email(email).await
    }
}

#[async_trait]
impl Repository<User> for PgStore {
    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id",
            USER_SCHEMA.select_list(),
            USER_SCHEMA.ident()
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(self.pool())
            .await?;
        Ok(users)
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<User>, RepoError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            USER_SCHEMA.select_list(),
            USER_SCHEMA.ident()
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        let hash = new.password.as_hash().ok_or(RepoError::UnhashedPassword)?;
        let sql = format!(
            r#"
            INSERT INTO {} (username, email, password)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            USER_SCHEMA.ident(),
            USER_SCHEMA.select_list()
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&new.username)
            .bind(&new.email)
            .bind(hash)
            .fetch_one(self.pool())
            .await?;
        Ok(user)
    }

    async fn update(&self, id: Id, patch: UserPatch) -> Result<Option<User>, RepoError> {
        let hash = match &patch.password {
            Some(password) => Some(password.as_hash().ok_or(RepoError::UnhashedPassword)?),
            None => None,
        };
        let sql = format!(
            r#"
            UPDATE {}
               SET username = COALESCE($2, username),
                   email = COALESCE($3, email),
                   password = COALESCE($4, password)
             WHERE id = $1
            RETURNING {}
            "#,
            USER_SCHEMA.ident(),
            USER_SCHEMA.select_list()
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(patch.username.as_deref())
            .bind(patch.email.as_deref())
            .bind(hash)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn destroy(&self, id: Id) -> Result<u64, RepoError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", USER_SCHEMA.ident());
        let done = sqlx::query(&sql).bind(id).execute(self.pool()).await?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE email = $1",
            USER_SCHEMA.select_list(),
            USER_SCHEMA.ident()
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }
}

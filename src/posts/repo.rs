use async_trait::async_trait;

use crate::db::PgStore;
use crate::posts::repo_types::{NewPost, Post, PostPatch, POST_SCHEMA};
use crate::repo::{Id, Repo, RepoError, Repository};

/// Storage for `post` rows. Every row must reference an existing user.
#[async_trait]
pub trait PostStore: Repository<Post> {
    async fn find_by_user(&self, user_id: Id) -> Result<Vec<Post>, RepoError>;
}

pub type PostRepo = Repo<Post, dyn PostStore>;

impl Repo<Post, dyn PostStore> {
    pub async fn find_by_user(&self, user_id: Id) -> Result<Vec<Post>, RepoError> {
        self.store().find_by_user(user_id).await
    }
}

#[async_trait]
impl Repository<Post> for PgStore {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id",
            POST_SCHEMA.select_list(),
            POST_SCHEMA.ident()
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .fetch_all(self.pool())
            .await?;
        Ok(posts)
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<Post>, RepoError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            POST_SCHEMA.select_list(),
            POST_SCHEMA.ident()
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(post)
    }

    async fn create(&self, new: NewPost) -> Result<Post, RepoError> {
        let sql = format!(
            r#"
            INSERT INTO {} (title, user_id)
            VALUES ($1, $2)
            RETURNING {}
            "#,
            POST_SCHEMA.ident(),
            POST_SCHEMA.select_list()
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(&new.title)
            .bind(new.user_id)
            .fetch_one(self.pool())
            .await?;
        Ok(post)
    }

    async fn update(&self, id: Id, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        let sql = format!(
            r#"
            UPDATE {}
               SET title = COALESCE($2, title),
                   user_id = COALESCE($3, user_id)
             WHERE id = $1
            RETURNING {}
            "#,
            POST_SCHEMA.ident(),
            POST_SCHEMA.select_list()
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.user_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(post)
    }

    async fn destroy(&self, id: Id) -> Result<u64, RepoError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", POST_SCHEMA.ident());
        let done = sqlx::query(&sql).bind(id).execute(self.pool()).await?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn find_by_user(&self, user_id: Id) -> Result<Vec<Post>, RepoError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = $1 ORDER BY id",
            POST_SCHEMA.select_list(),
            POST_SCHEMA.ident()
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await?;
        Ok(posts)
    }
}

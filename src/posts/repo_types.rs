use serde::Serialize;
use sqlx::FromRow;

use crate::repo::{Entity, Id};
use crate::schema::{Column, Constraint, Schema, ValidationError};

pub const POST_SCHEMA: Schema = Schema {
    table: "post",
    columns: &[
        Column::new("id").primary_key(),
        Column::new("title").constraints(&[Constraint::Required]),
        Column::new("user_id")
            .references("user", "id")
            .constraints(&[Constraint::Required]),
    ],
};

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct Post {
    pub id: Id,
    pub title: String,
    pub user_id: Id,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub user_id: Id,
}

#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub user_id: Option<Id>,
}

impl Entity for Post {
    type New = NewPost;
    type Patch = PostPatch;

    const SCHEMA: &'static Schema = &POST_SCHEMA;

    fn validate_new(new: &NewPost) -> Result<(), ValidationError> {
        POST_SCHEMA.check_insert("title", Some(&new.title))
    }

    fn validate_patch(patch: &PostPatch) -> Result<(), ValidationError> {
        POST_SCHEMA.check_update("title", patch.title.as_deref())
    }
}

use serde::Deserialize;

use crate::posts::repo_types::{NewPost, PostPatch, POST_SCHEMA};
use crate::repo::Id;
use crate::schema::ValidationError;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub user_id: Option<Id>,
}

impl TryFrom<CreatePostRequest> for NewPost {
    type Error = ValidationError;

    fn try_from(req: CreatePostRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: POST_SCHEMA.require("title", req.title)?,
            user_id: POST_SCHEMA.require("user_id", req.user_id)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub user_id: Option<Id>,
}

impl From<UpdatePostRequest> for PostPatch {
    fn from(req: UpdatePostRequest) -> Self {
        Self {
            title: req.title,
            user_id: req.user_id,
        }
    }
}

//! In-memory repositories.
//!
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use workshop_core::domain::{Comment, Post};
use workshop_core::error::RepoError;
use workshop_core::ports::{CommentRepository, PostRepository};

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }
}

#[derive(Default)]
pub struct InMemoryCommentRepository {
    comments: RwLock<HashMap<Uuid, Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn add(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut comments = self.comments.write().await;
        if comments.contains_key(&comment.id) {
            return Err(RepoError::Constraint(format!(
                "comment {} already exists",
                comment.id
            )));
        }
        comments.insert(comment.id, comment.clone());
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_find_post() {
        let repo = InMemoryPostRepository::new();
        let post = Post::new("u1".to_string(), "Title".to_string(), String::new());

        repo.save(post.clone()).await.unwrap();

        let found = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Title");
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_duplicate_comment() {
        let repo = InMemoryCommentRepository::new();
        let comment = Comment::new(Uuid::new_v4(), "u1".to_string(), "hi".to_string());

        repo.add(comment.clone()).await.unwrap();
        let err = repo.add(comment).await.unwrap_err();

        assert!(matches!(err, RepoError::Constraint(_)));
    }
}

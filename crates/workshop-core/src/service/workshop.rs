//! Post and comment creation gated by per-user quotas.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, Post};
use crate::error::DomainError;
use crate::ports::{CommentRepository, LimitConfig, PostRepository, RateLimitInfo, RateLimiter};

pub const POSTS_LIMIT_KEY: &str = "posts_limit";
pub const COMMENTS_LIMIT_KEY: &str = "comments_limit";

/// Quota policies registered by [`Workshop::new`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkshopLimits {
    pub posts: LimitConfig,
    pub comments: LimitConfig,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_id: String,
    pub post_id: Uuid,
    pub content: String,
}

/// Workshop service.
pub struct Workshop {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    limiter: Arc<dyn RateLimiter>,
}

impl Workshop {
    pub fn new(
        limits: WorkshopLimits,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        limiter.register_group(POSTS_LIMIT_KEY, limits.posts);
        limiter.register_group(COMMENTS_LIMIT_KEY, limits.comments);

        Self {
            posts,
            comments,
            limiter,
        }
    }

    pub async fn create_post(&self, req: NewPost) -> Result<Post, DomainError> {
        if req.title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be empty".to_string()));
        }

        self.ensure_quota(POSTS_LIMIT_KEY, &req.author_id).await?;

        let post = Post::new(req.author_id, req.title, req.description);
        let post = self.posts.save(post).await?;

        self.record_usage(POSTS_LIMIT_KEY, &post.author_id).await;

        Ok(post)
    }

    pub async fn add_comment(&self, req: NewComment) -> Result<Comment, DomainError> {
        if req.content.trim().is_empty() {
            return Err(DomainError::Validation(
                "content must not be empty".to_string(),
            ));
        }

        self.ensure_quota(COMMENTS_LIMIT_KEY, &req.author_id).await?;

        if self.posts.find_by_id(req.post_id).await?.is_none() {
            return Err(DomainError::NotFound {
                entity_type: "post",
                id: req.post_id,
            });
        }

        let comment = Comment::new(req.post_id, req.author_id, req.content);
        let comment = self.comments.add(comment).await?;

        self.record_usage(COMMENTS_LIMIT_KEY, &comment.author_id).await;

        Ok(comment)
    }

    /// Fails closed: an unreadable quota rejects the action.
    async fn ensure_quota(
        &self,
        group: &str,
        user_id: &str,
    ) -> Result<RateLimitInfo, DomainError> {
        let info = self
            .limiter
            .check(group, user_id)
            .await
            .map_err(DomainError::LimitCheck)?;

        if info.is_exhausted() {
            tracing::warn!(
                group = %group,
                user_id = %user_id,
                reset_at = %info.reset_at,
                "Rate limit exceeded"
            );
            return Err(DomainError::RateLimitExceeded { info });
        }

        Ok(info)
    }

    /// The action already succeeded, so bookkeeping failures are only logged.
    async fn record_usage(&self, group: &str, user_id: &str) {
        if let Err(e) = self.limiter.trigger_increase(group, user_id).await {
            tracing::error!(
                group = %group,
                user_id = %user_id,
                error = %e,
                "Trigger increase limit error"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use crate::ports::RateLimitError;
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Limiter double with a fixed remaining quota and optional failures.
    #[derive(Default)]
    struct FakeLimiter {
        groups: Mutex<HashMap<String, LimitConfig>>,
        remaining: Mutex<u64>,
        fail_check: bool,
        fail_increase: bool,
        increases: Mutex<Vec<(String, String)>>,
    }

    impl FakeLimiter {
        fn with_remaining(remaining: u64) -> Self {
            Self {
                remaining: Mutex::new(remaining),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl RateLimiter for FakeLimiter {
        fn register_group(&self, group_key: &str, cfg: LimitConfig) {
            self.groups.lock().insert(group_key.to_string(), cfg);
        }

        async fn check(
            &self,
            group_key: &str,
            _subject_id: &str,
        ) -> Result<RateLimitInfo, RateLimitError> {
            if self.fail_check {
                return Err(RateLimitError::Transport("pipeline exec error".to_string()));
            }
            let limit = self
                .groups
                .lock()
                .get(group_key)
                .map(|cfg| cfg.limit)
                .unwrap_or_default();
            let remaining = *self.remaining.lock();
            Ok(RateLimitInfo {
                limit,
                current: limit.saturating_sub(remaining),
                remaining,
                reset_at: Utc::now(),
            })
        }

        async fn trigger_increase(
            &self,
            group_key: &str,
            subject_id: &str,
        ) -> Result<(), RateLimitError> {
            if self.fail_increase {
                return Err(RateLimitError::Transport("pipeline exec error".to_string()));
            }
            self.increases
                .lock()
                .push((group_key.to_string(), subject_id.to_string()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeRepo {
        posts: Mutex<HashMap<Uuid, Post>>,
        comments: Mutex<Vec<Comment>>,
    }

    #[async_trait]
    impl PostRepository for FakeRepo {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(self.posts.lock().get(&id).cloned())
        }

        async fn save(&self, post: Post) -> Result<Post, RepoError> {
            self.posts.lock().insert(post.id, post.clone());
            Ok(post)
        }
    }

    #[async_trait]
    impl CommentRepository for FakeRepo {
        async fn add(&self, comment: Comment) -> Result<Comment, RepoError> {
            self.comments.lock().push(comment.clone());
            Ok(comment)
        }
    }

    fn limits() -> WorkshopLimits {
        WorkshopLimits {
            posts: LimitConfig::new(30, Duration::from_secs(3600)),
            comments: LimitConfig::new(100, Duration::from_secs(1800)),
        }
    }

    fn workshop(limiter: Arc<FakeLimiter>, repo: Arc<FakeRepo>) -> Workshop {
        Workshop::new(limits(), repo.clone(), repo, limiter)
    }

    fn new_post(author: &str) -> NewPost {
        NewPost {
            author_id: author.to_string(),
            title: "Shader pack".to_string(),
            description: "Soft shadows".to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_registers_both_groups() {
        let limiter = Arc::new(FakeLimiter::with_remaining(1));
        let _ws = workshop(limiter.clone(), Arc::new(FakeRepo::default()));

        let groups = limiter.groups.lock();
        assert_eq!(groups.get(POSTS_LIMIT_KEY), Some(&limits().posts));
        assert_eq!(groups.get(COMMENTS_LIMIT_KEY), Some(&limits().comments));
    }

    #[tokio::test]
    async fn test_create_post_records_usage() {
        let limiter = Arc::new(FakeLimiter::with_remaining(5));
        let repo = Arc::new(FakeRepo::default());
        let ws = workshop(limiter.clone(), repo.clone());

        let post = ws.create_post(new_post("u1")).await.unwrap();

        assert_eq!(post.author_id, "u1");
        assert!(repo.posts.lock().contains_key(&post.id));
        assert_eq!(
            *limiter.increases.lock(),
            vec![(POSTS_LIMIT_KEY.to_string(), "u1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_create_post_rejected_when_quota_exhausted() {
        let limiter = Arc::new(FakeLimiter::with_remaining(0));
        let repo = Arc::new(FakeRepo::default());
        let ws = workshop(limiter.clone(), repo.clone());

        let err = ws.create_post(new_post("u1")).await.unwrap_err();

        match err {
            DomainError::RateLimitExceeded { info } => {
                assert_eq!(info.limit, 30);
                assert_eq!(info.remaining, 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(repo.posts.lock().is_empty());
        assert!(limiter.increases.lock().is_empty());
    }

    #[tokio::test]
    async fn test_create_post_fails_closed_on_check_error() {
        let limiter = Arc::new(FakeLimiter {
            fail_check: true,
            ..FakeLimiter::with_remaining(5)
        });
        let repo = Arc::new(FakeRepo::default());
        let ws = workshop(limiter, repo.clone());

        let err = ws.create_post(new_post("u1")).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::LimitCheck(RateLimitError::Transport(_))
        ));
        assert!(repo.posts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_create_post_survives_increase_failure() {
        let limiter = Arc::new(FakeLimiter {
            fail_increase: true,
            ..FakeLimiter::with_remaining(5)
        });
        let repo = Arc::new(FakeRepo::default());
        let ws = workshop(limiter, repo.clone());

        let post = ws.create_post(new_post("u1")).await.unwrap();

        assert!(repo.posts.lock().contains_key(&post.id));
    }

    #[tokio::test]
    async fn test_create_post_rejects_blank_title() {
        let limiter = Arc::new(FakeLimiter::with_remaining(5));
        let ws = workshop(limiter.clone(), Arc::new(FakeRepo::default()));

        let mut req = new_post("u1");
        req.title = "   ".to_string();
        let err = ws.create_post(req).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(limiter.increases.lock().is_empty());
    }

    #[tokio::test]
    async fn test_add_comment_to_missing_post() {
        let limiter = Arc::new(FakeLimiter::with_remaining(5));
        let ws = workshop(limiter.clone(), Arc::new(FakeRepo::default()));

        let post_id = Uuid::new_v4();
        let err = ws
            .add_comment(NewComment {
                author_id: "u1".to_string(),
                post_id,
                content: "nice".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound { id, .. } if id == post_id));
        assert!(limiter.increases.lock().is_empty());
    }

    #[tokio::test]
    async fn test_add_comment_records_usage() {
        let limiter = Arc::new(FakeLimiter::with_remaining(5));
        let repo = Arc::new(FakeRepo::default());
        let ws = workshop(limiter.clone(), repo.clone());
        let post = ws.create_post(new_post("author")).await.unwrap();

        let comment = ws
            .add_comment(NewComment {
                author_id: "u2".to_string(),
                post_id: post.id,
                content: "nice".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(comment.post_id, post.id);
        assert_eq!(repo.comments.lock().len(), 1);
        assert_eq!(
            limiter.increases.lock().last(),
            Some(&(COMMENTS_LIMIT_KEY.to_string(), "u2".to_string()))
        );
    }
}

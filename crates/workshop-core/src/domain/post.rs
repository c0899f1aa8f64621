use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Post entity - a piece of content published to the workshop.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: Uuid,
    /// Opaque user identifier resolved by the session layer.
    pub author_id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: String, title: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

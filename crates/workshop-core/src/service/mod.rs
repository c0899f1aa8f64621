//! Use cases built on top of the ports.

mod workshop;

pub use workshop::{
    COMMENTS_LIMIT_KEY, NewComment, NewPost, POSTS_LIMIT_KEY, Workshop, WorkshopLimits,
};

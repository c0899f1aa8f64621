//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use workshop_core::service::NewComment;
use workshop_shared::dto::{CommentResponse, CreateCommentRequest};

use crate::middleware::error::AppResult;
use crate::middleware::identity::Identity;
use crate::state::AppState;

/// POST /api/posts/{post_id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .workshop
        .add_comment(NewComment {
            author_id: identity.user_id,
            post_id: path.into_inner(),
            content: body.into_inner().content,
        })
        .await?;

    Ok(HttpResponse::Created().json(CommentResponse {
        id: comment.id.to_string(),
        post_id: comment.post_id.to_string(),
        author_id: comment.author_id,
        content: comment.content,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }))
}

//! Post handlers.

use actix_web::{HttpResponse, web};

use workshop_core::domain::Post;
use workshop_core::service::NewPost;
use workshop_shared::dto::{CreatePostRequest, PostResponse};

use crate::middleware::error::AppResult;
use crate::middleware::identity::Identity;
use crate::state::AppState;

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .workshop
        .create_post(NewPost {
            author_id: identity.user_id,
            title: req.title,
            description: req.description,
        })
        .await?;

    Ok(HttpResponse::Created().json(post_response(post)))
}

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        author_id: post.author_id,
        title: post.title,
        description: post.description,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::{App, test, web};
    use serde_json::{Value, json};
    use workshop_core::ports::LimitConfig;
    use workshop_infra::InMemoryCounterStore;

    use crate::config::AppConfig;
    use crate::handlers::configure_routes;
    use crate::middleware::identity::USER_ID_HEADER;
    use crate::state::AppState;

    fn config_with_post_limit(limit: u64) -> AppConfig {
        let mut config = AppConfig::from_lookup(|_| None);
        config.limits.posts = LimitConfig::new(limit, Duration::from_secs(3600));
        config
    }

    fn state_over(store: Arc<InMemoryCounterStore>, config: &AppConfig) -> AppState {
        AppState::with_store(store, config)
    }

    #[actix_web::test]
    async fn test_create_post_returns_created() {
        let state = state_over(Arc::new(InMemoryCounterStore::new()), &config_with_post_limit(30));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((USER_ID_HEADER, "user-1"))
            .set_json(json!({ "title": "Hello", "description": "First post" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["author_id"], "user-1");
        assert_eq!(body["title"], "Hello");
    }

    #[actix_web::test]
    async fn test_second_post_over_quota_is_rejected() {
        let state = state_over(Arc::new(InMemoryCounterStore::new()), &config_with_post_limit(1));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let post = || {
            test::TestRequest::post()
                .uri("/api/posts")
                .insert_header((USER_ID_HEADER, "user-1"))
                .set_json(json!({ "title": "Hello" }))
                .to_request()
        };

        let first = test::call_service(&app, post()).await;
        assert_eq!(first.status(), 201);

        let second = test::call_service(&app, post()).await;
        assert_eq!(second.status(), 429);
        assert_eq!(second.headers().get("X-RateLimit-Remaining").unwrap(), "0");
        assert!(second.headers().contains_key("Retry-After"));

        let body: Value = test::read_body_json(second).await;
        assert_eq!(body["status"], 429);
        assert!(body["reset_at"].is_string());
    }

    #[actix_web::test]
    async fn test_quota_is_per_user() {
        let state = state_over(Arc::new(InMemoryCounterStore::new()), &config_with_post_limit(1));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        for user in ["user-1", "user-2"] {
            let req = test::TestRequest::post()
                .uri("/api/posts")
                .insert_header((USER_ID_HEADER, user))
                .set_json(json!({ "title": "Hello" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 201);
        }
    }

    #[actix_web::test]
    async fn test_missing_identity_is_unauthorized() {
        let state = state_over(Arc::new(InMemoryCounterStore::new()), &config_with_post_limit(30));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "title": "Hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_unreachable_store_is_service_unavailable() {
        let store = Arc::new(InMemoryCounterStore::new());
        store.close();
        let state = state_over(store, &config_with_post_limit(30));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((USER_ID_HEADER, "user-1"))
            .set_json(json!({ "title": "Hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 503);
    }
}

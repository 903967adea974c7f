use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::error::Result;
use crate::post::Post;

/// Every post, newest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Post>>> {
    Ok(Json(state.posts.list().await?))
}

pub async fn handler(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Post>> {
    Ok(Json(state.posts.get(&post_id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use uuid::Uuid;

    use super::*;
    use crate::user::UserId;
    use crate::*;

    #[tokio::test]
    async fn test_list_newest_first() {
        let (state, _) = router::state().await;
        let app = app(state.clone());
        let author = UserId::parse(TEST_USER).unwrap();

        let mut ids = Vec::new();
        for text in ["P1", "P2", "P3"] {
            ids.push(state.posts.create(&author, text.into()).await.unwrap().id);
        }

        let response =
            make_request(Some(&state), app, Method::GET, "/posts", String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let posts: Vec<Post> = serde_json::from_slice(&body).unwrap();
        let texts = posts.iter().map(|p| p.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, vec!["P3", "P2", "P1"]);
        assert_eq!(posts[0].id, ids[2]);
    }

    #[tokio::test]
    async fn test_get_handler() {
        let (state, _) = router::state().await;
        let app = app(state.clone());
        let author = UserId::parse(TEST_USER).unwrap();
        let post = state.posts.create(&author, "hello".into()).await.unwrap();

        let response = make_request(
            Some(&state),
            app.clone(),
            Method::GET,
            &format!("/posts/{}", post.id),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Post = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, post);

        for path in [format!("/posts/{}", Uuid::new_v4()), "/posts/1234".to_owned()] {
            let response =
                make_request(Some(&state), app.clone(), Method::GET, &path, String::default())
                    .await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_list_requires_token() {
        let (state, _) = router::state().await;
        let app = app(state);

        let response = make_request(None, app, Method::GET, "/posts", String::default()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

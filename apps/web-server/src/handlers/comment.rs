//! Comment submission.

use actix_web::{HttpResponse, web};

use shutter_core::domain::NewComment;
use shutter_shared::dto::CommentForm;

use super::{current_user, redirect};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::session::Session;
use crate::state::AppState;

/// POST /comment
pub async fn create_comment(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let Some(me) = current_user(&state, &session).await? else {
        return redirect(&state, &session, "/login").await;
    };

    if !session.csrf_matches(&form.csrf_token) {
        return Err(AppError::Unprocessable);
    }

    let post_id: i32 = form
        .post_id
        .parse()
        .map_err(|_| AppError::BadRequest("post_id must be an integer".to_string()))?;

    let form = form.into_inner();
    state
        .comments
        .create_and_increment(NewComment {
            post_id,
            user_id: me.id,
            comment: form.comment,
        })
        .await?;

    redirect(&state, &session, &format!("/posts/{post_id}")).await
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;

    use crate::test_support::{TestApp, location};

    #[actix_web::test]
    async fn comment_bumps_counter_once() {
        let env = TestApp::new().await;
        let alice = env.add_user("alice", "secret1", 0).await;
        let post = env.add_post(alice.id, "hello").await;
        let (cookie, token) = env.log_in(alice.id).await;
        let app = test::init_service(env.app()).await;

        let post_id = post.id.to_string();
        let req = test::TestRequest::post()
            .uri("/comment")
            .cookie(cookie)
            .set_form([
                ("post_id", post_id.as_str()),
                ("comment", "lovely"),
                ("csrf_token", token.as_str()),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(location(&resp), format!("/posts/{}", post.id));
        assert_eq!(env.comment_counter(post.id).await, Some(1));
    }

    #[actix_web::test]
    async fn comment_rejections() {
        let env = TestApp::new().await;
        let alice = env.add_user("alice", "secret1", 0).await;
        let post = env.add_post(alice.id, "hello").await;
        let (cookie, token) = env.log_in(alice.id).await;
        let app = test::init_service(env.app()).await;
        let post_id = post.id.to_string();

        let req = test::TestRequest::post()
            .uri("/comment")
            .set_form([("post_id", post_id.as_str()), ("comment", "hi")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), "/login");

        let req = test::TestRequest::post()
            .uri("/comment")
            .cookie(cookie.clone())
            .set_form([
                ("post_id", post_id.as_str()),
                ("comment", "hi"),
                ("csrf_token", "forged"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri("/comment")
            .cookie(cookie.clone())
            .set_form([
                ("post_id", "abc"),
                ("comment", "hi"),
                ("csrf_token", token.as_str()),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/comment")
            .cookie(cookie)
            .set_form([
                ("post_id", "9999"),
                ("comment", "hi"),
                ("csrf_token", token.as_str()),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        assert_eq!(env.comment_counter(post.id).await, Some(0));
    }
}

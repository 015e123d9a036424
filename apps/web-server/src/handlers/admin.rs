//! Moderation: listing and banning users.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use shutter_core::domain::User;
use shutter_shared::dto::BanForm;

use super::{current_user, redirect, render};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::session::Session;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BannedPage {
    pub users: Vec<User>,
    pub me: User,
    pub csrf_token: String,
}

/// GET /admin/banned
pub async fn banned_page(state: web::Data<AppState>, session: Session) -> AppResult<HttpResponse> {
    let Some(me) = current_user(&state, &session).await? else {
        return redirect(&state, &session, "/").await;
    };
    if !me.is_admin() {
        return Err(AppError::Forbidden);
    }

    let users = state.users.list_bannable().await?;
    let page = BannedPage {
        users,
        me,
        csrf_token: session.csrf_token().to_string(),
    };
    render(&state, session, page).await
}

/// POST /admin/banned with repeated `uid[]` fields.
pub async fn ban_users(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<Vec<(String, String)>>,
) -> AppResult<HttpResponse> {
    let Some(me) = current_user(&state, &session).await? else {
        return redirect(&state, &session, "/").await;
    };
    if !me.is_admin() {
        return Err(AppError::Forbidden);
    }

    let form = BanForm::from_pairs(form.into_inner());
    if !session.csrf_matches(&form.csrf_token) {
        return Err(AppError::Unprocessable);
    }

    let banned = state.users.ban(&form.user_ids).await?;
    tracing::info!(admin_id = me.id, requested = form.user_ids.len(), banned, "Users banned");

    redirect(&state, &session, "/admin/banned").await
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;

    use crate::test_support::{TestApp, location};

    #[actix_web::test]
    async fn admin_pages_are_guarded() {
        let env = TestApp::new().await;
        let alice = env.add_user("alice", "secret1", 0).await;
        let (cookie, token) = env.log_in(alice.id).await;
        let app = test::init_service(env.app()).await;

        let req = test::TestRequest::get().uri("/admin/banned").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), "/");

        let req = test::TestRequest::get()
            .uri("/admin/banned")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/admin/banned")
            .cookie(cookie)
            .set_form([("uid[]", "1"), ("csrf_token", token.as_str())])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn ban_hides_posts_and_blocks_login() {
        let env = TestApp::new().await;
        let admin = env.add_user("admin", "secret1", 1).await;
        let alice = env.add_user("alice", "secret1", 0).await;
        let bob = env.add_user("bob", "secret1", 0).await;
        env.add_post(alice.id, "alice's").await;
        env.add_post(bob.id, "bob's").await;
        let (cookie, token) = env.log_in(admin.id).await;
        let app = test::init_service(env.app()).await;

        let req = test::TestRequest::get()
            .uri("/admin/banned")
            .cookie(cookie.clone())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["users"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::post()
            .uri("/admin/banned")
            .cookie(cookie.clone())
            .set_form([("uid[]", "forged")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let alice_id = alice.id.to_string();
        let req = test::TestRequest::post()
            .uri("/admin/banned")
            .cookie(cookie)
            .set_form([("uid[]", alice_id.as_str()), ("csrf_token", token.as_str())])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), "/admin/banned");

        let req = test::TestRequest::get().uri("/").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let posts = body["data"]["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["user"]["account_name"], "bob");

        let req = test::TestRequest::post()
            .uri("/login")
            .set_form([("account_name", "alice"), ("password", "secret1")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), "/login");
    }
}

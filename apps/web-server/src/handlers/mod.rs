//! HTTP handlers and route configuration.

mod account;
mod admin;
mod comment;
mod feed;
mod health;
mod image;
mod upload;

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::Serialize;

use shutter_core::domain::User;
use shutter_shared::ApiResponse;

use crate::middleware::error::AppResult;
use crate::middleware::session::Session;
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        // Accounts
        .route("/login", web::get().to(account::login_page))
        .route("/login", web::post().to(account::login))
        .route("/register", web::get().to(account::register_page))
        .route("/register", web::post().to(account::register))
        .route("/logout", web::get().to(account::logout))
        // Feed pages
        .route("/", web::get().to(feed::index))
        .route("/", web::post().to(upload::create_post))
        .route("/posts", web::get().to(feed::posts))
        .route("/posts/{id}", web::get().to(feed::post_detail))
        .route("/@{account_name}", web::get().to(feed::profile))
        // Writes and blobs
        .route("/comment", web::post().to(comment::create_comment))
        .route("/image/{id}.{ext}", web::get().to(image::serve_image))
        // Moderation
        .route("/admin/banned", web::get().to(admin::banned_page))
        .route("/admin/banned", web::post().to(admin::ban_users));
}

/// The logged-in user, if the session names one that still exists.
pub(crate) async fn current_user(state: &AppState, session: &Session) -> AppResult<Option<User>> {
    match session.user_id() {
        Some(id) => Ok(state.users.find_by_id(id).await?),
        None => Ok(None),
    }
}

/// 302 to `location`, persisting the session first.
pub(crate) async fn redirect(
    state: &AppState,
    session: &Session,
    location: &str,
) -> AppResult<HttpResponse> {
    state.sessions.save(session).await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(state.sessions.cookie(session))
        .finish())
}

/// Store a one-shot notice and redirect.
pub(crate) async fn flash_redirect(
    state: &AppState,
    mut session: Session,
    notice: &str,
    location: &str,
) -> AppResult<HttpResponse> {
    tracing::debug!(notice, location, "Flash notice");
    session.flash(notice);
    redirect(state, &session, location).await
}

/// 200 with the page payload and any pending notice, which is consumed.
pub(crate) async fn render<T: Serialize>(
    state: &AppState,
    mut session: Session,
    page: T,
) -> AppResult<HttpResponse> {
    let notice = session.data.take_notice();
    if notice.is_some() {
        state.sessions.save(&session).await?;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(page).with_notice(notice)))
}

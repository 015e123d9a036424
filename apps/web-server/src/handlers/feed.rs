//! Feed pages: home, cursor pagination, profile and post detail.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Serialize;

use shutter_core::domain::{FeedItem, User, UserStats};
use shutter_core::{CommentMode, POSTS_PER_PAGE};
use shutter_shared::dto::PostsQuery;

use super::{current_user, render};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::session::Session;
use crate::state::AppState;

#[derive(Serialize)]
pub struct IndexPage {
    pub posts: Vec<FeedItem>,
    pub me: Option<User>,
    pub csrf_token: String,
}

#[derive(Serialize)]
pub struct PostPage {
    pub post: FeedItem,
    pub me: Option<User>,
}

#[derive(Serialize)]
pub struct ProfilePage {
    pub user: User,
    pub posts: Vec<FeedItem>,
    pub stats: UserStats,
    pub me: Option<User>,
}

/// GET /
pub async fn index(state: web::Data<AppState>, session: Session) -> AppResult<HttpResponse> {
    let me = current_user(&state, &session).await?;

    let candidates = state
        .posts
        .find_recent(POSTS_PER_PAGE as u64, None)
        .await?;
    let posts = state
        .feed
        .assemble(candidates, session.csrf_token(), CommentMode::Preview)
        .await?;

    let page = IndexPage {
        posts,
        me,
        csrf_token: session.csrf_token().to_string(),
    };
    render(&state, session, page).await
}

/// GET /posts?max_created_at=<RFC 3339>
///
/// Without a usable cursor the answer is an empty 200; an empty page is 404.
pub async fn posts(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<PostsQuery>,
) -> AppResult<HttpResponse> {
    let Some(raw) = query.max_created_at.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(HttpResponse::Ok().finish());
    };
    let cursor = match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => t.with_timezone(&Utc),
        Err(e) => {
            tracing::info!(max_created_at = raw, error = %e, "Unparsable feed cursor");
            return Ok(HttpResponse::Ok().finish());
        }
    };

    let candidates = state
        .posts
        .find_recent(POSTS_PER_PAGE as u64, Some(cursor))
        .await?;
    let items = state
        .feed
        .assemble(candidates, session.csrf_token(), CommentMode::Preview)
        .await?;

    if items.is_empty() {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::Ok().json(items))
}

/// GET /posts/{id}
pub async fn post_detail(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id: i32 = path.parse().map_err(|_| AppError::NotFound)?;

    let candidates: Vec<_> = state.posts.find_by_id(id).await?.into_iter().collect();
    let post = state
        .feed
        .assemble(candidates, session.csrf_token(), CommentMode::Full)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::NotFound)?;

    let me = current_user(&state, &session).await?;
    render(&state, session, PostPage { post, me }).await
}

/// GET /@{account_name}
pub async fn profile(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_active_by_account_name(&path)
        .await?
        .ok_or(AppError::NotFound)?;

    let candidates = state.posts.find_by_user_id(user.id).await?;
    let post_ids: Vec<i32> = candidates.iter().map(|p| p.id).collect();

    let stats = UserStats {
        post_count: post_ids.len() as u64,
        comment_count: state.comments.count_by_user_id(user.id).await?,
        commented_count: state.comments.count_on_posts(&post_ids).await?,
    };

    let posts = state
        .feed
        .assemble(candidates, session.csrf_token(), CommentMode::Preview)
        .await?;

    let me = current_user(&state, &session).await?;
    let page = ProfilePage {
        user,
        posts,
        stats,
        me,
    };
    render(&state, session, page).await
}

//! Login, registration and logout.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::Serialize;

use shutter_core::domain::User;
use shutter_core::error::DomainError;
use shutter_shared::dto::{LoginForm, RegisterForm};

use super::{current_user, flash_redirect, redirect, render};
use crate::middleware::error::AppResult;
use crate::middleware::session::Session;
use crate::state::AppState;

pub(crate) const LOGIN_FAILED: &str = "Incorrect account name or password";
pub(crate) const REGISTRATION_INVALID: &str =
    "Account name must be at least 3 characters and password at least 6";
pub(crate) const ACCOUNT_TAKEN: &str = "Account name is already taken";

#[derive(Serialize)]
pub struct AccountPage {
    pub me: Option<User>,
}

/// GET /login
pub async fn login_page(state: web::Data<AppState>, session: Session) -> AppResult<HttpResponse> {
    if current_user(&state, &session).await?.is_some() {
        return redirect(&state, &session, "/").await;
    }

    render(&state, session, AccountPage { me: None }).await
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    mut session: Session,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    if current_user(&state, &session).await?.is_some() {
        return redirect(&state, &session, "/").await;
    }

    match state
        .accounts
        .authenticate(&form.account_name, &form.password)
        .await?
    {
        Some(user) => {
            state.sessions.log_in(&mut session, user.id).await?;
            tracing::info!(user_id = user.id, "User logged in");
            redirect(&state, &session, "/").await
        }
        None => flash_redirect(&state, session, LOGIN_FAILED, "/login").await,
    }
}

/// GET /register
pub async fn register_page(
    state: web::Data<AppState>,
    session: Session,
) -> AppResult<HttpResponse> {
    if current_user(&state, &session).await?.is_some() {
        return redirect(&state, &session, "/").await;
    }

    render(&state, session, AccountPage { me: None }).await
}

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    mut session: Session,
    form: web::Form<RegisterForm>,
) -> AppResult<HttpResponse> {
    if current_user(&state, &session).await?.is_some() {
        return redirect(&state, &session, "/").await;
    }

    match state
        .accounts
        .register(&form.account_name, &form.password)
        .await
    {
        Ok(user) => {
            state.sessions.log_in(&mut session, user.id).await?;
            redirect(&state, &session, "/").await
        }
        Err(DomainError::Validation(_)) => {
            flash_redirect(&state, session, REGISTRATION_INVALID, "/register").await
        }
        Err(DomainError::Duplicate(_)) => {
            flash_redirect(&state, session, ACCOUNT_TAKEN, "/register").await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /logout
pub async fn logout(state: web::Data<AppState>, session: Session) -> AppResult<HttpResponse> {
    state.sessions.destroy(&session).await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(state.sessions.removal_cookie())
        .finish())
}

//! Cookie sessions: extractor, persistence and CSRF checks.

use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures::future::LocalBoxFuture;
use rand::Rng;
use uuid::Uuid;

use shutter_core::ports::{SessionData, SessionError, SessionStore};

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl: Duration,
}

impl SessionConfig {
    pub const DEFAULT_COOKIE_NAME: &'static str = "shutter.session";
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: Self::DEFAULT_COOKIE_NAME.to_string(),
            ttl: Duration::from_secs(86_400),
        }
    }
}

/// The caller's session, loaded from the cookie or freshly minted.
///
/// Use this in handlers that read or change session state:
/// ```ignore
/// async fn page(session: Session) -> impl Responder {
///     format!("user {:?}", session.user_id())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub data: SessionData,
}

impl Session {
    fn fresh() -> Self {
        Self {
            id: new_session_id(),
            data: SessionData::default(),
        }
    }

    pub fn user_id(&self) -> Option<i32> {
        self.data.user_id
    }

    /// The token embedded in forms; empty until login.
    pub fn csrf_token(&self) -> &str {
        self.data.csrf_token.as_deref().unwrap_or("")
    }

    /// Whether a submitted form token equals the session's token.
    pub fn csrf_matches(&self, submitted: &str) -> bool {
        self.csrf_token() == submitted
    }

    /// Bind the session to a user under a new id with a new CSRF token.
    /// Returns the id the session had before.
    fn log_in(&mut self, user_id: i32) -> String {
        self.data.user_id = Some(user_id);
        self.data.csrf_token = Some(new_csrf_token());
        std::mem::replace(&mut self.id, new_session_id())
    }

    /// Queue a notice for the next rendered page.
    pub fn flash(&mut self, notice: impl Into<String>) {
        self.data.notice = Some(notice.into());
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// 16 random bytes, hex encoded.
pub fn new_csrf_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    hex::encode(bytes)
}

impl FromRequest for Session {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::Internal("Application state missing".to_string()))?;

            Ok(state.sessions.load(&req).await?)
        })
    }
}

/// Loads and persists sessions behind the session cookie.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    /// Resolve the request's session. Unknown or expired ids get a new session.
    pub async fn load(&self, req: &HttpRequest) -> Result<Session, SessionError> {
        let Some(cookie) = req.cookie(&self.config.cookie_name) else {
            return Ok(Session::fresh());
        };

        match self.store.load(cookie.value()).await? {
            Some(data) => Ok(Session {
                id: cookie.value().to_string(),
                data,
            }),
            None => {
                tracing::debug!("Session cookie without live session");
                Ok(Session::fresh())
            }
        }
    }

    pub async fn save(&self, session: &Session) -> Result<(), SessionError> {
        self.store
            .save(&session.id, &session.data, self.config.ttl)
            .await
    }

    pub async fn destroy(&self, session: &Session) -> Result<(), SessionError> {
        self.store.destroy(&session.id).await
    }

    /// Log the user in and forget the pre-login session id, so an id planted
    /// before login never becomes authenticated.
    pub async fn log_in(&self, session: &mut Session, user_id: i32) -> Result<(), SessionError> {
        let previous = session.log_in(user_id);
        self.store.destroy(&previous).await
    }

    /// Cookie carrying the session id.
    pub fn cookie(&self, session: &Session) -> Cookie<'static> {
        Cookie::build(self.config.cookie_name.clone(), session.id.clone())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.config.ttl.as_secs() as i64))
            .finish()
    }

    /// Cookie that makes the browser forget the session.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.config.cookie_name.clone(), "")
            .path("/")
            .finish();
        cookie.make_removal();
        cookie
    }
}

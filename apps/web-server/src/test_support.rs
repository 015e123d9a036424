//! In-memory wiring for handler tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use shutter_core::domain::{
    Comment, CommentCount, CommentWithAuthor, NewComment, NewPost, NewUser, Post, User,
};
use shutter_core::error::RepoError;
use shutter_core::ports::{
    BaseRepository, CommentRepository, PasswordService, PostRepository, SessionData,
    UserRepository,
};
use shutter_infra::{InMemorySessionStore, LocalImageStore, Sha512PasswordService};

use crate::handlers::configure_routes;
use crate::middleware::session::{Session, SessionConfig, new_csrf_token};
use crate::state::{AppState, Ports};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    counters: Vec<CommentCount>,
    /// Ticks once per inserted row so timestamps are strictly increasing.
    clock: i64,
}

impl Tables {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::seconds(self.clock)
    }

    fn user(&self, id: i32) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

/// One store backing all three repository ports.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

#[async_trait]
impl BaseRepository<User, i32> for MemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.lock().user(id).cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_active_by_account_name(&self, name: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.account_name == name && !u.is_banned())
            .cloned())
    }

    async fn account_name_exists(&self, name: &str) -> Result<bool, RepoError> {
        Ok(self.lock().users.iter().any(|u| u.account_name == name))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut t = self.lock();
        if t.users.iter().any(|u| u.account_name == new_user.account_name) {
            return Err(RepoError::Constraint("users_account_name_key".into()));
        }
        let user = User {
            id: t.users.len() as i32 + 1,
            account_name: new_user.account_name,
            passhash: new_user.passhash,
            authority: 0,
            del_flg: 0,
            created_at: t.tick(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError> {
        let t = self.lock();
        Ok(t.users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn list_bannable(&self) -> Result<Vec<User>, RepoError> {
        let t = self.lock();
        let mut users: Vec<User> = t
            .users
            .iter()
            .filter(|u| !u.is_admin() && !u.is_banned())
            .cloned()
            .collect();
        users.reverse();
        Ok(users)
    }

    async fn ban(&self, ids: &[i32]) -> Result<u64, RepoError> {
        let mut t = self.lock();
        let mut touched = 0;
        for user in t.users.iter_mut().filter(|u| ids.contains(&u.id)) {
            user.del_flg = 1;
            touched += 1;
        }
        Ok(touched)
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for MemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.lock().posts.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_recent(
        &self,
        limit: u64,
        max_created_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>, RepoError> {
        let t = self.lock();
        let mut posts: Vec<Post> = t
            .posts
            .iter()
            .filter(|p| t.user(p.user_id).is_some_and(|u| !u.is_banned()))
            .filter(|p| max_created_at.is_none_or(|cursor| p.created_at <= cursor))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<Post>, RepoError> {
        let t = self.lock();
        let mut posts: Vec<Post> = t
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn create_with_counter(
        &self,
        new_post: NewPost,
    ) -> Result<(Post, Vec<u8>), RepoError> {
        let mut t = self.lock();
        let post = Post {
            id: t.posts.len() as i32 + 1,
            user_id: new_post.user_id,
            body: new_post.body,
            mime: new_post.mime.as_str().to_string(),
            created_at: t.tick(),
        };
        t.posts.push(post.clone());
        t.counters.push(CommentCount {
            post_id: post.id,
            count: 0,
        });
        Ok((post, new_post.imgdata))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn counts_for_posts(&self, post_ids: &[i32]) -> Result<Vec<CommentCount>, RepoError> {
        let t = self.lock();
        Ok(t.counters
            .iter()
            .filter(|c| post_ids.contains(&c.post_id))
            .cloned()
            .collect())
    }

    async fn recent_for_posts(
        &self,
        post_ids: &[i32],
        limit: Option<u64>,
    ) -> Result<Vec<CommentWithAuthor>, RepoError> {
        let t = self.lock();
        let mut rows: Vec<CommentWithAuthor> = t
            .comments
            .iter()
            .filter(|c| post_ids.contains(&c.post_id))
            .filter_map(|c| {
                t.user(c.user_id).map(|u| CommentWithAuthor {
                    comment: c.clone(),
                    user: u.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.comment.created_at.cmp(&a.comment.created_at));
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn create_and_increment(&self, new_comment: NewComment) -> Result<Comment, RepoError> {
        let mut t = self.lock();
        if !t.counters.iter().any(|c| c.post_id == new_comment.post_id) {
            return Err(RepoError::NotFound);
        }
        let comment = Comment {
            id: t.comments.len() as i32 + 1,
            post_id: new_comment.post_id,
            user_id: new_comment.user_id,
            comment: new_comment.comment,
            created_at: t.tick(),
        };
        t.comments.push(comment.clone());
        if let Some(counter) = t
            .counters
            .iter_mut()
            .find(|c| c.post_id == new_comment.post_id)
        {
            counter.count += 1;
        }
        Ok(comment)
    }

    async fn count_by_user_id(&self, user_id: i32) -> Result<u64, RepoError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|c| c.user_id == user_id)
            .count() as u64)
    }

    async fn count_on_posts(&self, post_ids: &[i32]) -> Result<u64, RepoError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|c| post_ids.contains(&c.post_id))
            .count() as u64)
    }
}

/// Application state over [`MemoryStore`] and a temporary image directory.
pub struct TestApp {
    pub state: AppState,
    store: Arc<MemoryStore>,
    image_dir: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let image_dir = dir.path().join("image");
        let images = LocalImageStore::init(image_dir.clone()).await.unwrap();
        let store = Arc::new(MemoryStore::default());

        let ports = Ports {
            users: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            passwords: Arc::new(Sha512PasswordService::new()),
            images: Arc::new(images),
            sessions: Arc::new(InMemorySessionStore::new()),
        };

        Self {
            state: AppState::from_ports(ports, SessionConfig::default()),
            store,
            image_dir,
            _dir: dir,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .configure(configure_routes)
    }

    pub async fn add_user(&self, name: &str, password: &str, authority: i32) -> User {
        let passhash = Sha512PasswordService::new().hash(name, password);
        let user = self
            .store
            .create(NewUser {
                account_name: name.to_string(),
                passhash,
            })
            .await
            .unwrap();

        let mut t = self.store.lock();
        let row = t.users.iter_mut().find(|u| u.id == user.id).unwrap();
        row.authority = authority;
        row.clone()
    }

    pub async fn ban(&self, user_id: i32) {
        self.store.ban(&[user_id]).await.unwrap();
    }

    pub async fn add_post(&self, user_id: i32, body: &str) -> Post {
        self.store
            .create_with_counter(NewPost {
                user_id,
                body: body.to_string(),
                mime: shutter_core::domain::ImageMime::Png,
                imgdata: Vec::new(),
            })
            .await
            .unwrap()
            .0
    }

    pub async fn add_comment(&self, post_id: i32, user_id: i32, text: &str) -> Comment {
        self.store
            .create_and_increment(NewComment {
                post_id,
                user_id,
                comment: text.to_string(),
            })
            .await
            .unwrap()
    }

    /// Persist a logged-in session; returns its cookie and CSRF token.
    pub async fn log_in(&self, user_id: i32) -> (Cookie<'static>, String) {
        let token = new_csrf_token();
        let session = Session {
            id: format!("test-session-{user_id}"),
            data: SessionData {
                user_id: Some(user_id),
                csrf_token: Some(token.clone()),
                notice: None,
            },
        };
        self.state.sessions.save(&session).await.unwrap();
        (self.state.sessions.cookie(&session), token)
    }

    pub async fn comment_counter(&self, post_id: i32) -> Option<i64> {
        self.store
            .lock()
            .counters
            .iter()
            .find(|c| c.post_id == post_id)
            .map(|c| c.count)
    }

    pub async fn post_count(&self) -> usize {
        self.store.lock().posts.len()
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub async fn write_blob(&self, post_id: i32, ext: &str, bytes: &[u8]) {
        tokio::fs::write(self.image_dir.join(format!("{post_id}.{ext}")), bytes)
            .await
            .unwrap();
    }
}

pub fn location(resp: &ServiceResponse) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn session_cookie(resp: &ServiceResponse) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SessionConfig::DEFAULT_COOKIE_NAME)
        .map(|c| c.into_owned())
        .expect("response sets the session cookie")
}

/// GET request carrying a session cookie.
pub fn get_with(uri: &str, cookie: Cookie<'static>) -> test::TestRequest {
    test::TestRequest::get().uri(uri).cookie(cookie)
}

/// The flash notice of a rendered page, if any.
pub fn notice(body: &serde_json::Value) -> Option<String> {
    body.get("notice")
        .and_then(|n| n.as_str())
        .map(str::to_string)
}

/// A `multipart/form-data` upload body; returns the content type and payload.
pub fn multipart_body(
    csrf_token: &str,
    body: &str,
    file: Option<(&str, Vec<u8>)>,
) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "shutter-test-boundary";
    let mut out = Vec::new();

    for (name, value) in [("csrf_token", csrf_token), ("body", body)] {
        out.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    match file {
        Some((content_type, bytes)) => {
            out.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            out.extend_from_slice(&bytes);
            out.extend_from_slice(b"\r\n");
        }
        None => out.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"\"\r\nContent-Type: application/octet-stream\r\n\r\n\r\n"
            )
            .as_bytes(),
        ),
    }
    out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), out)
}
